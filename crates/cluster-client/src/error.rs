//! Cluster client errors

use crate::object::ObjectKey;
use thiserror::Error;

/// Errors that can occur when reading or writing cluster objects
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Kubernetes API error not covered by a more specific variant
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Object does not exist
    #[error("Not found: {0}")]
    NotFound(ObjectKey),

    /// Create collided with an existing object
    #[error("Already exists: {0}")]
    AlreadyExists(ObjectKey),

    /// Write was based on a stale resource version
    #[error("Conflict: {0}")]
    Conflict(ObjectKey),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Object is missing fields required to address it (e.g. a name)
    #[error("Invalid object: {0}")]
    InvalidObject(String),
}

impl ClusterError {
    /// Classifies a raw API error for the given object.
    pub(crate) fn from_api(err: kube::Error, key: ObjectKey) -> Self {
        match err {
            kube::Error::Api(ae) if ae.code == 404 => Self::NotFound(key),
            kube::Error::Api(ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
                Self::AlreadyExists(key)
            }
            kube::Error::Api(ae) if ae.code == 409 => Self::Conflict(key),
            other => Self::Kube(other),
        }
    }

    /// Whether the error means the object is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

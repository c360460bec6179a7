//! Controller-specific error types.
//!
//! Errors returned from a reconciliation are retried by the watcher with
//! backoff. Invalid profile specs are not errors; see `validation`.

use cluster_client::ClusterError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the PerformanceProfile Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Cluster object store error (read or write of a profile or component)
    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    /// Kubernetes client construction error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An object lacks a field needed to address or own it
    #[error("Missing object key: {0}")]
    MissingObjectKey(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

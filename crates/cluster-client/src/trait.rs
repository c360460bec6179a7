//! ClusterClient trait for mocking
//!
//! This trait abstracts the object store so reconciliation logic can run
//! against the live API server or an in-memory mock.

use crate::error::ClusterError;
use crate::object::ClusterObject;

/// Trait for cluster object store operations
///
/// Every read goes to the store; implementations must not cache.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ClusterClientTrait: Send + Sync {
    /// Read an object, `Ok(None)` when it does not exist
    async fn get<K: ClusterObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<K>, ClusterError>;

    /// Create an object; fails with `AlreadyExists` if the name is taken
    async fn create<K: ClusterObject>(&self, object: &K) -> Result<K, ClusterError>;

    /// Replace an object previously read, guarded by its resource version
    async fn replace<K: ClusterObject>(&self, object: &K) -> Result<K, ClusterError>;

    /// Apply a JSON merge patch to an existing object.
    ///
    /// Fields absent from `patch` are left untouched, including ones the
    /// typed kinds do not model. A `metadata.resourceVersion` in the patch
    /// turns it into a conditional update.
    async fn patch<K: ClusterObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<K, ClusterError>;

    /// Request deletion; fails with `NotFound` if the object does not exist
    async fn delete<K: ClusterObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), ClusterError>;
}

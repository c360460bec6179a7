//! Cluster client backed by the Kubernetes API server.

use crate::cluster_trait::ClusterClientTrait;
use crate::error::ClusterError;
use crate::object::{ClusterObject, ObjectKey};
use kube::Client;
use kube::ResourceExt;
use kube::api::{DeleteParams, Patch, PatchParams, PostParams};
use tracing::debug;

/// Object store accessor talking to the API server through `kube::Client`.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Wraps an already configured Kubernetes client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The wrapped Kubernetes client, for building watch streams.
    pub fn kube_client(&self) -> Client {
        self.client.clone()
    }
}

impl std::fmt::Debug for KubeClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterClient").finish_non_exhaustive()
    }
}

fn require_name<K: ClusterObject>(object: &K) -> Result<String, ClusterError> {
    object
        .meta()
        .name
        .clone()
        .ok_or_else(|| ClusterError::InvalidObject(format!("{} has no metadata.name", K::KIND)))
}

#[async_trait::async_trait]
impl ClusterClientTrait for KubeClusterClient {
    async fn get<K: ClusterObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<K>, ClusterError> {
        let key = ObjectKey::new(K::KIND, namespace, name);
        debug!("GET {}", key);
        K::api(self.client.clone(), namespace)
            .get_opt(name)
            .await
            .map_err(|e| ClusterError::from_api(e, key))
    }

    async fn create<K: ClusterObject>(&self, object: &K) -> Result<K, ClusterError> {
        require_name(object)?;
        let key = ObjectKey::of(object);
        debug!("CREATE {}", key);
        K::api(self.client.clone(), object.namespace().as_deref())
            .create(&PostParams::default(), object)
            .await
            .map_err(|e| ClusterError::from_api(e, key))
    }

    async fn replace<K: ClusterObject>(&self, object: &K) -> Result<K, ClusterError> {
        let name = require_name(object)?;
        let key = ObjectKey::of(object);
        debug!("REPLACE {}", key);
        K::api(self.client.clone(), object.namespace().as_deref())
            .replace(&name, &PostParams::default(), object)
            .await
            .map_err(|e| ClusterError::from_api(e, key))
    }

    async fn patch<K: ClusterObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<K, ClusterError> {
        let key = ObjectKey::new(K::KIND, namespace, name);
        debug!("PATCH {}", key);
        K::api(self.client.clone(), namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map_err(|e| ClusterError::from_api(e, key))
    }

    async fn delete<K: ClusterObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), ClusterError> {
        let key = ObjectKey::new(K::KIND, namespace, name);
        debug!("DELETE {}", key);
        K::api(self.client.clone(), namespace)
            .delete(name, &DeleteParams::background())
            .await
            .map(|_| ())
            .map_err(|e| ClusterError::from_api(e, key))
    }
}

//! Idempotent create/update/delete of a single component.

use crate::components::Component;
use cluster_client::{ClusterClientTrait, ClusterError, ObjectKey};
use kube::ResourceExt;
use tracing::{debug, info};

/// Result of converging one component onto its desired content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The object was absent and has been created
    Created,
    /// The live object differed and has been replaced
    Updated,
    /// The live object already matched
    Unchanged,
}

impl SyncOutcome {
    /// Whether a write was performed
    pub fn changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Result of removing one component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Deletion was requested
    Deleted,
    /// There was nothing to delete
    AlreadyAbsent,
}

/// Whether the live object is absent or differs from `desired`. Read-only.
pub async fn needs_sync<C, K>(client: &C, desired: &K) -> Result<bool, ClusterError>
where
    C: ClusterClientTrait,
    K: Component,
{
    let live: Option<K> = client
        .get(desired.namespace().as_deref(), &desired.name_any())
        .await?;
    Ok(live.is_none_or(|live| !live.matches(desired)))
}

/// Creates `desired` if absent, updates the live object if its content
/// differs, does nothing otherwise.
pub async fn sync<C, K>(client: &C, desired: &K) -> Result<SyncOutcome, ClusterError>
where
    C: ClusterClientTrait,
    K: Component,
{
    let key = ObjectKey::of(desired);
    let live: Option<K> = client
        .get(desired.namespace().as_deref(), &desired.name_any())
        .await?;

    match live {
        None => {
            client.create(desired).await?;
            info!("Created {}", key);
            Ok(SyncOutcome::Created)
        }
        Some(mut live) if !live.matches(desired) => {
            live.apply(desired);
            client.replace(&live).await?;
            info!("Updated {}", key);
            Ok(SyncOutcome::Updated)
        }
        Some(_) => {
            debug!("{} already up-to-date", key);
            Ok(SyncOutcome::Unchanged)
        }
    }
}

/// Deletes a component by identity. An absent object counts as removed.
pub async fn remove<C, K>(
    client: &C,
    namespace: Option<&str>,
    name: &str,
) -> Result<RemoveOutcome, ClusterError>
where
    C: ClusterClientTrait,
    K: Component,
{
    match client.delete::<K>(namespace, name).await {
        Ok(()) => {
            info!("Deleted {}", ObjectKey::new(K::KIND, namespace, name));
            Ok(RemoveOutcome::Deleted)
        }
        Err(e) if e.is_not_found() => {
            debug!("{} already absent", ObjectKey::new(K::KIND, namespace, name));
            Ok(RemoveOutcome::AlreadyAbsent)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{feature_gate, machine_config};
    use crate::test_utils::new_profile;
    use cluster_client::{MockClusterClient, Operation};
    use crds::{FeatureGate, MachineConfig};

    #[tokio::test]
    async fn test_sync_creates_then_is_unchanged() {
        let client = MockClusterClient::new();
        let desired = feature_gate::latency_sensitive();

        assert!(needs_sync(&client, &desired).await.unwrap());
        assert_eq!(sync(&client, &desired).await.unwrap(), SyncOutcome::Created);
        assert!(!needs_sync(&client, &desired).await.unwrap());
        assert_eq!(sync(&client, &desired).await.unwrap(), SyncOutcome::Unchanged);
        assert_eq!(client.mutations().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_updates_drifted_object() {
        let client = MockClusterClient::new();
        let desired = machine_config::new(&new_profile("manual"));
        let mut drifted = desired.clone();
        drifted.spec.kernel_arguments = vec!["quiet".to_string()];
        client.insert(drifted);

        assert_eq!(sync(&client, &desired).await.unwrap(), SyncOutcome::Updated);
        let live: MachineConfig = client.object(None, "worker-performance-manual").unwrap();
        assert_eq!(live.spec, desired.spec);
        assert_eq!(client.mutations()[0].operation, Operation::Replace);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let client = MockClusterClient::new();
        client.insert(feature_gate::latency_sensitive());

        let first = remove::<_, FeatureGate>(&client, None, "cluster").await.unwrap();
        let second = remove::<_, FeatureGate>(&client, None, "cluster").await.unwrap();
        assert_eq!(first, RemoveOutcome::Deleted);
        assert_eq!(second, RemoveOutcome::AlreadyAbsent);
    }

    #[tokio::test]
    async fn test_remove_surfaces_other_errors() {
        let client = MockClusterClient::new();
        client.insert(feature_gate::latency_sensitive());
        client.fail_on(Operation::Delete, cluster_client::ObjectKind::FeatureGate);

        let result = remove::<_, FeatureGate>(&client, None, "cluster").await;
        assert!(matches!(result, Err(ClusterError::Conflict(_))));
    }
}

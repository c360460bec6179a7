//! Mock ClusterClient for unit testing
//!
//! Keeps objects in memory as JSON, keyed by [`ObjectKey`], and mimics the
//! API server behaviours the controller relies on:
//! - resource versions are bumped on every write and checked on replace
//! - deleting an object that still carries finalizers only sets its
//!   deletion timestamp; the object disappears once the last finalizer is
//!   removed
//!
//! Every mutation is appended to a journal so tests can assert exactly
//! which writes a reconciliation performed.

use crate::cluster_trait::ClusterClientTrait;
use crate::error::ClusterError;
use crate::object::{ClusterObject, ObjectKey, ObjectKind};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Kind of write recorded in the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `create`
    Create,
    /// `replace`
    Replace,
    /// `patch` (JSON merge patch)
    Patch,
    /// `delete`
    Delete,
}

/// One recorded write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// Kind of write
    pub operation: Operation,
    /// Object written
    pub key: ObjectKey,
}

#[derive(Debug, Default)]
struct Store {
    objects: BTreeMap<ObjectKey, Value>,
    journal: Vec<Mutation>,
    failures: Vec<(Operation, ObjectKind)>,
    fail_reads: Vec<ObjectKind>,
    next_version: u64,
}

impl Store {
    fn bump(&mut self) -> String {
        self.next_version += 1;
        self.next_version.to_string()
    }

    fn should_fail(&self, operation: Operation, kind: ObjectKind) -> bool {
        self.failures.contains(&(operation, kind))
    }
}

/// Mock ClusterClient for testing
///
/// Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct MockClusterClient {
    store: Arc<Mutex<Store>>,
}

fn metadata_mut(value: &mut Value) -> Option<&mut serde_json::Map<String, Value>> {
    if value.get("metadata").is_none() {
        value.as_object_mut()?.insert("metadata".to_string(), Value::Object(Default::default()));
    }
    value.get_mut("metadata")?.as_object_mut()
}

fn has_finalizers(value: &Value) -> bool {
    value
        .pointer("/metadata/finalizers")
        .and_then(Value::as_array)
        .is_some_and(|f| !f.is_empty())
}

fn is_deleting(value: &Value) -> bool {
    value
        .pointer("/metadata/deletionTimestamp")
        .is_some_and(|t| !t.is_null())
}

/// RFC 7386 merge: objects merge key by key, `null` deletes, anything else
/// replaces the target value.
fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(entries) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(fields) = target {
        for (key, value) in entries {
            if value.is_null() {
                fields.remove(key);
            } else {
                merge_patch(fields.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

impl MockClusterClient {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an object without recording a mutation (for test setup).
    ///
    /// A uid and resource version are assigned when missing.
    pub fn insert<K: ClusterObject>(&self, object: K) {
        let key = ObjectKey::of(&object);
        let mut value = match serde_json::to_value(&object) {
            Ok(v) => v,
            Err(e) => panic!("mock insert of {key} failed to serialize: {e}"),
        };
        let mut store = self.lock();
        let version = store.bump();
        if let Some(meta) = metadata_mut(&mut value) {
            meta.entry("uid").or_insert_with(|| Value::String(format!("uid-{}", key.name)));
            meta.insert("resourceVersion".to_string(), Value::String(version));
        }
        store.objects.insert(key, value);
    }

    /// Seed a raw JSON object, including fields the typed kinds do not
    /// model. The key is taken from `metadata.name`/`metadata.namespace`.
    pub fn insert_value<K: ClusterObject>(&self, mut value: Value) {
        let name = value.pointer("/metadata/name").and_then(Value::as_str).unwrap_or_default();
        let namespace = value.pointer("/metadata/namespace").and_then(Value::as_str);
        let key = ObjectKey::new(K::KIND, namespace, name);
        let mut store = self.lock();
        let version = store.bump();
        if let Some(meta) = metadata_mut(&mut value) {
            meta.insert("resourceVersion".to_string(), Value::String(version));
        }
        store.objects.insert(key, value);
    }

    /// Raw stored JSON of an object (for assertions on unmodelled fields)
    pub fn value<K: ClusterObject>(&self, namespace: Option<&str>, name: &str) -> Option<Value> {
        let key = ObjectKey::new(K::KIND, namespace, name);
        self.lock().objects.get(&key).cloned()
    }

    /// Read an object directly from the store (for assertions)
    pub fn object<K: ClusterObject>(&self, namespace: Option<&str>, name: &str) -> Option<K> {
        let key = ObjectKey::new(K::KIND, namespace, name);
        let store = self.lock();
        store
            .objects
            .get(&key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Whether an object exists in the store
    pub fn contains<K: ClusterObject>(&self, namespace: Option<&str>, name: &str) -> bool {
        let key = ObjectKey::new(K::KIND, namespace, name);
        self.lock().objects.contains_key(&key)
    }

    /// All writes recorded since creation or the last [`Self::clear_mutations`]
    pub fn mutations(&self) -> Vec<Mutation> {
        self.lock().journal.clone()
    }

    /// Forget recorded writes
    pub fn clear_mutations(&self) {
        self.lock().journal.clear();
    }

    /// Make every `operation` on `kind` fail with a conflict until cleared
    pub fn fail_on(&self, operation: Operation, kind: ObjectKind) {
        self.lock().failures.push((operation, kind));
    }

    /// Make every read of `kind` fail until cleared
    pub fn fail_reads_of(&self, kind: ObjectKind) {
        self.lock().fail_reads.push(kind);
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        let mut store = self.lock();
        store.failures.clear();
        store.fail_reads.clear();
    }
}

#[async_trait::async_trait]
impl ClusterClientTrait for MockClusterClient {
    async fn get<K: ClusterObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<K>, ClusterError> {
        let key = ObjectKey::new(K::KIND, namespace, name);
        let store = self.lock();
        if store.fail_reads.contains(&K::KIND) {
            return Err(ClusterError::Conflict(key));
        }
        store
            .objects
            .get(&key)
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(ClusterError::from)
    }

    async fn create<K: ClusterObject>(&self, object: &K) -> Result<K, ClusterError> {
        if object.meta().name.is_none() {
            return Err(ClusterError::InvalidObject(format!("{} has no metadata.name", K::KIND)));
        }
        let key = ObjectKey::of(object);
        let mut value = serde_json::to_value(object)?;
        let mut store = self.lock();
        if store.should_fail(Operation::Create, K::KIND) {
            return Err(ClusterError::Conflict(key));
        }
        if store.objects.contains_key(&key) {
            return Err(ClusterError::AlreadyExists(key));
        }
        let version = store.bump();
        if let Some(meta) = metadata_mut(&mut value) {
            meta.insert("uid".to_string(), Value::String(format!("uid-{}-{}", key.name, version)));
            meta.insert("resourceVersion".to_string(), Value::String(version));
        }
        store.objects.insert(key.clone(), value.clone());
        store.journal.push(Mutation { operation: Operation::Create, key });
        Ok(serde_json::from_value(value)?)
    }

    async fn replace<K: ClusterObject>(&self, object: &K) -> Result<K, ClusterError> {
        if object.meta().name.is_none() {
            return Err(ClusterError::InvalidObject(format!("{} has no metadata.name", K::KIND)));
        }
        let key = ObjectKey::of(object);
        let mut value = serde_json::to_value(object)?;
        let mut store = self.lock();
        if store.should_fail(Operation::Replace, K::KIND) {
            return Err(ClusterError::Conflict(key));
        }
        let Some(current) = store.objects.get(&key) else {
            return Err(ClusterError::NotFound(key));
        };
        let current_version = current.pointer("/metadata/resourceVersion").cloned();
        let sent_version = value.pointer("/metadata/resourceVersion").cloned();
        if sent_version.is_some() && sent_version != current_version {
            return Err(ClusterError::Conflict(key));
        }
        // deletionTimestamp is owned by the server
        let deletion = current.pointer("/metadata/deletionTimestamp").cloned();
        let version = store.bump();
        if let Some(meta) = metadata_mut(&mut value) {
            meta.insert("resourceVersion".to_string(), Value::String(version));
            match deletion {
                Some(ts) => meta.insert("deletionTimestamp".to_string(), ts),
                None => meta.remove("deletionTimestamp"),
            };
        }
        store.journal.push(Mutation { operation: Operation::Replace, key: key.clone() });
        if is_deleting(&value) && !has_finalizers(&value) {
            store.objects.remove(&key);
        } else {
            store.objects.insert(key, value.clone());
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn patch<K: ClusterObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
        patch: &Value,
    ) -> Result<K, ClusterError> {
        let key = ObjectKey::new(K::KIND, namespace, name);
        let mut store = self.lock();
        if store.should_fail(Operation::Patch, K::KIND) {
            return Err(ClusterError::Conflict(key));
        }
        let Some(current) = store.objects.get(&key) else {
            return Err(ClusterError::NotFound(key));
        };
        let current_version = current.pointer("/metadata/resourceVersion").cloned();
        let sent_version = patch.pointer("/metadata/resourceVersion").filter(|v| !v.is_null());
        if sent_version.is_some() && sent_version != current_version.as_ref() {
            return Err(ClusterError::Conflict(key));
        }
        let deletion = current.pointer("/metadata/deletionTimestamp").cloned();
        let mut value = current.clone();
        merge_patch(&mut value, patch);
        let version = store.bump();
        if let Some(meta) = metadata_mut(&mut value) {
            meta.insert("resourceVersion".to_string(), Value::String(version));
            match deletion {
                Some(ts) => meta.insert("deletionTimestamp".to_string(), ts),
                None => meta.remove("deletionTimestamp"),
            };
        }
        // Validate the merged object still has the kind's shape
        let object: K = serde_json::from_value(value.clone())?;
        store.journal.push(Mutation { operation: Operation::Patch, key: key.clone() });
        if is_deleting(&value) && !has_finalizers(&value) {
            store.objects.remove(&key);
        } else {
            store.objects.insert(key, value);
        }
        Ok(object)
    }

    async fn delete<K: ClusterObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), ClusterError> {
        let key = ObjectKey::new(K::KIND, namespace, name);
        let mut store = self.lock();
        if store.should_fail(Operation::Delete, K::KIND) {
            return Err(ClusterError::Conflict(key));
        }
        let Some(current) = store.objects.get_mut(&key) else {
            return Err(ClusterError::NotFound(key));
        };
        if has_finalizers(current) {
            if !is_deleting(current) {
                let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
                if let Some(meta) = metadata_mut(current) {
                    meta.insert("deletionTimestamp".to_string(), Value::String(now));
                }
            }
        } else {
            store.objects.remove(&key);
        }
        store.journal.push(Mutation { operation: Operation::Delete, key });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::{MachineConfigPool, MachineConfigPoolSpec, PerformanceProfile};
    use kube::api::ObjectMeta;
    use serde_json::json;

    fn pool(name: &str, paused: bool) -> MachineConfigPool {
        MachineConfigPool {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            spec: MachineConfigPoolSpec {
                paused,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_and_records_mutation() {
        let client = MockClusterClient::new();
        client.create(&pool("p", true)).await.expect("create");

        let live: MachineConfigPool = client.get(None, "p").await.expect("get").expect("exists");
        assert!(live.spec.paused);
        assert!(live.metadata.resource_version.is_some());
        assert_eq!(
            client.mutations(),
            vec![Mutation {
                operation: Operation::Create,
                key: ObjectKey::new(ObjectKind::MachineConfigPool, None, "p"),
            }]
        );
    }

    #[tokio::test]
    async fn test_create_existing_fails() {
        let client = MockClusterClient::new();
        client.insert(pool("p", false));
        let err = client.create(&pool("p", true)).await.unwrap_err();
        assert!(matches!(err, ClusterError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_replace_with_stale_version_conflicts() {
        let client = MockClusterClient::new();
        client.insert(pool("p", false));
        let mut first: MachineConfigPool = client.get(None, "p").await.unwrap().unwrap();
        let mut second = first.clone();

        first.spec.paused = true;
        client.replace(&first).await.expect("first writer wins");

        second.spec.paused = true;
        let err = client.replace(&second).await.unwrap_err();
        assert!(matches!(err, ClusterError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let client = MockClusterClient::new();
        let err = client.delete::<MachineConfigPool>(None, "nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_finalizers_block_deletion_until_removed() {
        let client = MockClusterClient::new();
        let mut profile = PerformanceProfile::new("manual", Default::default());
        profile.metadata.finalizers = Some(vec!["example.io/finalizer".to_string()]);
        client.insert(profile);

        client.delete::<PerformanceProfile>(None, "manual").await.unwrap();
        let mut live: PerformanceProfile = client.get(None, "manual").await.unwrap().unwrap();
        assert!(live.is_deleting());

        live.metadata.finalizers = Some(vec![]);
        client.replace(&live).await.unwrap();
        assert!(!client.contains::<PerformanceProfile>(None, "manual"));
    }

    #[tokio::test]
    async fn test_merge_patch_keeps_unpatched_fields() {
        let client = MockClusterClient::new();
        client.insert_value::<MachineConfigPool>(json!({
            "apiVersion": "machineconfiguration.openshift.io/v1",
            "kind": "MachineConfigPool",
            "metadata": { "name": "p", "labels": { "team": "a" } },
            "spec": { "paused": false, "maxUnavailable": 3 }
        }));

        let patched: MachineConfigPool = client
            .patch(None, "p", &json!({ "spec": { "paused": true }, "metadata": { "labels": { "team": null } } }))
            .await
            .expect("patch");
        assert!(patched.spec.paused);

        let raw = client.value::<MachineConfigPool>(None, "p").expect("stored");
        assert_eq!(raw.pointer("/spec/maxUnavailable"), Some(&json!(3)));
        assert_eq!(raw.pointer("/metadata/labels/team"), None);
        assert_eq!(client.mutations()[0].operation, Operation::Patch);
    }

    #[tokio::test]
    async fn test_patch_with_stale_version_conflicts() {
        let client = MockClusterClient::new();
        client.insert(pool("p", false));
        let err = client
            .patch::<MachineConfigPool>(None, "p", &json!({ "metadata": { "resourceVersion": "0" } }))
            .await
            .unwrap_err();
        assert!(matches!(err, ClusterError::Conflict(_)));

        let err = client
            .patch::<MachineConfigPool>(None, "missing", &json!({}))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_patching_away_last_finalizer_completes_deletion() {
        let client = MockClusterClient::new();
        let mut profile = PerformanceProfile::new("manual", Default::default());
        profile.metadata.finalizers = Some(vec!["example.io/finalizer".to_string()]);
        client.insert(profile);
        client.delete::<PerformanceProfile>(None, "manual").await.unwrap();

        client
            .patch::<PerformanceProfile>(None, "manual", &json!({ "metadata": { "finalizers": [] } }))
            .await
            .unwrap();
        assert!(!client.contains::<PerformanceProfile>(None, "manual"));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let client = MockClusterClient::new();
        client.fail_on(Operation::Create, ObjectKind::MachineConfigPool);
        assert!(client.create(&pool("p", true)).await.is_err());
        client.fail_reads_of(ObjectKind::MachineConfigPool);
        assert!(client.get::<MachineConfigPool>(None, "p").await.is_err());

        client.clear_failures();
        client.create(&pool("p", true)).await.expect("create after clearing");
    }
}

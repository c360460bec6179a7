//! The closed set of object kinds the controller works with.

use crds::{FeatureGate, KubeletConfig, MachineConfig, MachineConfigPool, PerformanceProfile, Tuned};
use kube::{Api, Client, Resource, ResourceExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// Kind tag for every object the client can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    /// `performance.openshift.io/v1alpha1` PerformanceProfile
    PerformanceProfile,
    /// `machineconfiguration.openshift.io/v1` MachineConfigPool
    MachineConfigPool,
    /// `machineconfiguration.openshift.io/v1` MachineConfig
    MachineConfig,
    /// `machineconfiguration.openshift.io/v1` KubeletConfig
    KubeletConfig,
    /// `tuned.openshift.io/v1` Tuned
    Tuned,
    /// `config.openshift.io/v1` FeatureGate
    FeatureGate,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::PerformanceProfile => "PerformanceProfile",
            Self::MachineConfigPool => "MachineConfigPool",
            Self::MachineConfig => "MachineConfig",
            Self::KubeletConfig => "KubeletConfig",
            Self::Tuned => "Tuned",
            Self::FeatureGate => "FeatureGate",
        };
        f.write_str(kind)
    }
}

/// Fully qualified identity of one object: kind, optional namespace, name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    /// Kind of the object
    pub kind: ObjectKind,
    /// Namespace, `None` for cluster-scoped kinds
    pub namespace: Option<String>,
    /// Object name
    pub name: String,
}

impl ObjectKey {
    /// Identity from its parts
    pub fn new(kind: ObjectKind, namespace: Option<&str>, name: &str) -> Self {
        Self {
            kind,
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Identity of an existing object value
    pub fn of<K: ClusterObject>(object: &K) -> Self {
        Self {
            kind: K::KIND,
            namespace: object.namespace(),
            name: object.name_any(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} {}/{}", self.kind, ns, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// A kind the cluster client can read and write.
///
/// Implemented only for the types in this module; there is no dynamic
/// object access.
pub trait ClusterObject:
    Resource<DynamicType = ()> + Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Kind tag used in keys and logs
    const KIND: ObjectKind;

    /// Typed API handle for this kind. Cluster-scoped kinds ignore `namespace`.
    fn api(client: Client, namespace: Option<&str>) -> Api<Self>;
}

impl ClusterObject for PerformanceProfile {
    const KIND: ObjectKind = ObjectKind::PerformanceProfile;

    fn api(client: Client, _namespace: Option<&str>) -> Api<Self> {
        Api::all(client)
    }
}

impl ClusterObject for MachineConfigPool {
    const KIND: ObjectKind = ObjectKind::MachineConfigPool;

    fn api(client: Client, _namespace: Option<&str>) -> Api<Self> {
        Api::all(client)
    }
}

impl ClusterObject for MachineConfig {
    const KIND: ObjectKind = ObjectKind::MachineConfig;

    fn api(client: Client, _namespace: Option<&str>) -> Api<Self> {
        Api::all(client)
    }
}

impl ClusterObject for KubeletConfig {
    const KIND: ObjectKind = ObjectKind::KubeletConfig;

    fn api(client: Client, _namespace: Option<&str>) -> Api<Self> {
        Api::all(client)
    }
}

impl ClusterObject for FeatureGate {
    const KIND: ObjectKind = ObjectKind::FeatureGate;

    fn api(client: Client, _namespace: Option<&str>) -> Api<Self> {
        Api::all(client)
    }
}

impl ClusterObject for Tuned {
    const KIND: ObjectKind = ObjectKind::Tuned;

    fn api(client: Client, namespace: Option<&str>) -> Api<Self> {
        match namespace {
            Some(ns) => Api::namespaced(client, ns),
            None => Api::default_namespaced(client),
        }
    }
}

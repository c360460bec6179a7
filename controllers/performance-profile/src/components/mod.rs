//! Desired state of the objects derived from a PerformanceProfile.
//!
//! Each submodule is a pure `profile -> object` generator. Names are
//! derived from the profile name and a fixed role prefix, so every object
//! can be looked up directly without listing.

pub mod feature_gate;
pub mod kubelet_config;
pub mod machine_config;
pub mod machine_config_pool;
pub mod tuned;

use crate::error::ControllerError;
use cluster_client::ClusterObject;
use crds::{FeatureGate, KubeletConfig, MachineConfig, MachineConfigPool, PerformanceProfile, Tuned};
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

/// Role prefix of the pool, machine config and kubelet config
pub const ROLE_WORKER_PERFORMANCE: &str = "worker-performance";

/// Prefix of the per-profile real-time kernel tuned profile
pub const PROFILE_NAME_WORKER_RT: &str = "worker-rt";

/// Name of the shared network-latency tuned object
pub const PROFILE_NAME_NETWORK_LATENCY: &str = "network-latency";

/// Name of the cluster-wide FeatureGate singleton
pub const FEATURE_GATE_NAME: &str = "cluster";

/// Feature set enabled on the FeatureGate singleton
pub const FEATURE_SET_LATENCY_SENSITIVE: &str = "LatencySensitive";

/// Namespace the node tuning operator watches for Tuned objects
pub const DEFAULT_TUNED_NAMESPACE: &str = "openshift-cluster-node-tuning-operator";

/// Label key used by the machine-config operator to group by role
pub const MACHINE_CONFIG_ROLE_LABEL: &str = "machineconfiguration.openshift.io/role";

/// Node role label selecting the performance nodes by default
pub const NODE_ROLE_LABEL: &str = "node-role.kubernetes.io/worker-performance";

/// Name of a per-profile object: `"{role}-{profile}"`
pub fn component_name(profile_name: &str, role: &str) -> String {
    format!("{role}-{profile_name}")
}

/// Labels put on the generated MachineConfig (and matched by the pool)
pub(crate) fn machine_config_labels(profile: &PerformanceProfile) -> BTreeMap<String, String> {
    profile
        .spec
        .machine_config_label
        .clone()
        .unwrap_or_else(default_role_labels)
}

/// Labels put on the pool (and matched by the KubeletConfig)
pub(crate) fn machine_config_pool_labels(profile: &PerformanceProfile) -> BTreeMap<String, String> {
    profile
        .spec
        .machine_config_pool_selector
        .clone()
        .unwrap_or_else(default_role_labels)
}

fn default_role_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(
        MACHINE_CONFIG_ROLE_LABEL.to_string(),
        ROLE_WORKER_PERFORMANCE.to_string(),
    )])
}

/// A dependent kind the synchronizer can converge.
///
/// Sealed: implemented only for the five kinds derived from a profile.
/// Only the fields the controller manages are compared and written;
/// anything else on a live object, such as `spec.extra`, is left as found.
pub trait Component: ClusterObject + sealed::Sealed {
    /// Whether the live object already carries the desired content
    fn matches(&self, desired: &Self) -> bool;

    /// Overwrite the content of a live object with the desired content,
    /// keeping server-owned metadata such as the resource version
    fn apply(&mut self, desired: &Self);
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for crds::MachineConfigPool {}
    impl Sealed for crds::MachineConfig {}
    impl Sealed for crds::KubeletConfig {}
    impl Sealed for crds::Tuned {}
    impl Sealed for crds::FeatureGate {}
}

fn labels_match<K: Resource>(live: &K, desired: &K) -> bool {
    live.meta().labels.clone().unwrap_or_default() == desired.meta().labels.clone().unwrap_or_default()
}

fn apply_metadata<K: Resource>(live: &mut K, desired: &K) {
    live.meta_mut().labels = desired.meta().labels.clone();
    if desired.meta().owner_references.is_some() {
        live.meta_mut().owner_references = desired.meta().owner_references.clone();
    }
}

impl Component for MachineConfigPool {
    // `paused` is driven by the sequencers, not by content
    fn matches(&self, desired: &Self) -> bool {
        labels_match(self, desired)
            && self.spec.machine_config_selector == desired.spec.machine_config_selector
            && self.spec.node_selector == desired.spec.node_selector
    }

    fn apply(&mut self, desired: &Self) {
        apply_metadata(self, desired);
        self.spec.machine_config_selector = desired.spec.machine_config_selector.clone();
        self.spec.node_selector = desired.spec.node_selector.clone();
    }
}

impl Component for MachineConfig {
    fn matches(&self, desired: &Self) -> bool {
        labels_match(self, desired)
            && self.spec.config == desired.spec.config
            && self.spec.kernel_arguments == desired.spec.kernel_arguments
            && self.spec.kernel_type == desired.spec.kernel_type
    }

    fn apply(&mut self, desired: &Self) {
        apply_metadata(self, desired);
        self.spec.config = desired.spec.config.clone();
        self.spec.kernel_arguments = desired.spec.kernel_arguments.clone();
        self.spec.kernel_type = desired.spec.kernel_type.clone();
    }
}

impl Component for KubeletConfig {
    fn matches(&self, desired: &Self) -> bool {
        labels_match(self, desired)
            && self.spec.machine_config_pool_selector == desired.spec.machine_config_pool_selector
            && self.spec.kubelet_config == desired.spec.kubelet_config
    }

    fn apply(&mut self, desired: &Self) {
        apply_metadata(self, desired);
        self.spec.machine_config_pool_selector = desired.spec.machine_config_pool_selector.clone();
        self.spec.kubelet_config = desired.spec.kubelet_config.clone();
    }
}

impl Component for Tuned {
    fn matches(&self, desired: &Self) -> bool {
        labels_match(self, desired)
            && self.spec.profile == desired.spec.profile
            && self.spec.recommend == desired.spec.recommend
    }

    fn apply(&mut self, desired: &Self) {
        apply_metadata(self, desired);
        self.spec.profile = desired.spec.profile.clone();
        self.spec.recommend = desired.spec.recommend.clone();
    }
}

// Shared with the cluster's own configuration: only the feature set is ours
impl Component for FeatureGate {
    fn matches(&self, desired: &Self) -> bool {
        self.spec.feature_set == desired.spec.feature_set
    }

    fn apply(&mut self, desired: &Self) {
        self.spec.feature_set = desired.spec.feature_set.clone();
    }
}

/// Every object a profile should produce, computed in one pass.
#[derive(Debug, Clone)]
pub struct DesiredComponents {
    pub pool: MachineConfigPool,
    pub machine_config: MachineConfig,
    pub kubelet_config: KubeletConfig,
    pub tuned_network_latency: Tuned,
    pub tuned_real_time: Tuned,
    pub feature_gate: FeatureGate,
}

impl DesiredComponents {
    /// Generates all components for `profile`.
    ///
    /// Per-profile objects get a controller owner reference to the profile;
    /// the shared singletons get none.
    pub fn new(profile: &PerformanceProfile, tuned_namespace: &str) -> Result<Self, ControllerError> {
        let owner = profile.controller_owner_ref(&()).ok_or_else(|| {
            ControllerError::MissingObjectKey(format!(
                "PerformanceProfile {} has no metadata.uid",
                profile.name_any()
            ))
        })?;

        let mut pool = machine_config_pool::new(profile);
        let mut machine_config = machine_config::new(profile);
        let mut kubelet_config = kubelet_config::new(profile);
        let mut tuned_real_time = tuned::worker_real_time_kernel(profile, tuned_namespace);
        for meta in [
            pool.meta_mut(),
            machine_config.meta_mut(),
            kubelet_config.meta_mut(),
            tuned_real_time.meta_mut(),
        ] {
            meta.owner_references = Some(vec![owner.clone()]);
        }

        Ok(Self {
            pool,
            machine_config,
            kubelet_config,
            tuned_network_latency: tuned::network_latency(tuned_namespace),
            tuned_real_time,
            feature_gate: feature_gate::latency_sensitive(),
        })
    }
}

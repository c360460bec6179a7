//! Machine-config operator kinds
//!
//! `MachineConfigPool`, `MachineConfig` and `KubeletConfig` are owned by the
//! machine-config operator. Creating or changing a `MachineConfig` or a
//! `KubeletConfig` makes every node of an unpaused matching pool drain and
//! reboot, which is why the controller sequences them carefully.

use crate::selectors::LabelSelector;
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group of nodes that receive the same rendered machine configuration.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "machineconfiguration.openshift.io",
    version = "v1",
    kind = "MachineConfigPool",
    plural = "machineconfigpools",
    derive = "PartialEq",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct MachineConfigPoolSpec {
    /// Selects the MachineConfigs rendered into this pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_config_selector: Option<LabelSelector>,

    /// Selects the nodes belonging to this pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<LabelSelector>,

    /// While paused, rendered changes are not rolled out to member nodes
    #[serde(default)]
    pub paused: bool,

    /// Fields this controller does not manage, kept intact on replace
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl MachineConfigPool {
    /// Whether rollout to member nodes is currently gated
    pub fn is_paused(&self) -> bool {
        self.spec.paused
    }
}

/// Node-level configuration (ignition content, kernel arguments, kernel type).
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "machineconfiguration.openshift.io",
    version = "v1",
    kind = "MachineConfig",
    plural = "machineconfigs",
    derive = "PartialEq",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct MachineConfigSpec {
    /// Ignition config
    #[serde(default)]
    pub config: serde_json::Value,

    /// Extra kernel command-line arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kernel_arguments: Vec<String>,

    /// Kernel flavour, `"realtime"` or unset for the default kernel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_type: Option<String>,

    /// Fields this controller does not manage, kept intact on replace
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Kubelet settings rendered into the MachineConfigs of the selected pool.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "machineconfiguration.openshift.io",
    version = "v1",
    kind = "KubeletConfig",
    plural = "kubeletconfigs",
    derive = "PartialEq",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct KubeletConfigSpec {
    /// Pools this kubelet configuration applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_config_pool_selector: Option<LabelSelector>,

    /// Raw `KubeletConfiguration` fields
    #[serde(default)]
    pub kubelet_config: serde_json::Value,

    /// Fields this controller does not manage, kept intact on replace
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

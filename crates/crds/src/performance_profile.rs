//! PerformanceProfile CRD
//!
//! Declares the node tuning a group of worker nodes should receive:
//! isolated and reserved CPUs, huge pages, and the real-time kernel.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "performance.openshift.io",
    version = "v1alpha1",
    kind = "PerformanceProfile",
    plural = "performanceprofiles",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceProfileSpec {
    /// CPU partitioning between housekeeping and latency-sensitive workloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,

    /// Huge pages to pre-allocate on the kernel command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hugepages: Option<HugePages>,

    /// Labels applied to the generated MachineConfig.
    /// Defaults to `machineconfiguration.openshift.io/role=worker-performance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_config_label: Option<BTreeMap<String, String>>,

    /// Labels selecting the MachineConfigPool the KubeletConfig applies to.
    /// Defaults to `machineconfiguration.openshift.io/role=worker-performance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_config_pool_selector: Option<BTreeMap<String, String>>,

    /// Node labels selecting the nodes tuned by this profile.
    /// Defaults to `node-role.kubernetes.io/worker-performance=""`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    /// Real-time kernel settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_time_kernel: Option<RealTimeKernel>,
}

/// CPU sets, in the Linux cpuset list format (for example `"2-15"`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cpu {
    /// CPUs reserved for housekeeping (kubelet, system daemons)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved: Option<String>,

    /// CPUs isolated from the kernel scheduler for latency-sensitive workloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolated: Option<String>,

    /// CPUs available to general workloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_isolated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HugePages {
    /// Default huge page size (for example `"1G"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_hugepages_size: Option<String>,

    /// Huge page pools to allocate
    #[serde(default)]
    pub pages: Vec<HugePage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HugePage {
    /// Page size (for example `"2M"` or `"1G"`)
    pub size: String,

    /// Number of pages to allocate
    pub count: i32,

    /// NUMA node to allocate on; all nodes when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeKernel {
    /// Install the real-time kernel on selected nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl PerformanceProfile {
    /// Whether deletion has been requested (the deletion timestamp is set)
    pub fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Whether the real-time kernel was requested
    pub fn real_time_kernel_enabled(&self) -> bool {
        self.spec
            .real_time_kernel
            .as_ref()
            .and_then(|rt| rt.enabled)
            .unwrap_or(false)
    }
}

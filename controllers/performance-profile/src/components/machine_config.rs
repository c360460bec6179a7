//! MachineConfig carrying the node-level part of a profile: kernel
//! arguments for CPU isolation and huge pages, and the kernel type.

use super::{ROLE_WORKER_PERFORMANCE, component_name, machine_config_labels};
use crds::{HugePages, MachineConfig, MachineConfigSpec, PerformanceProfile};
use kube::ResourceExt;
use kube::api::ObjectMeta;
use serde_json::json;

const IGNITION_VERSION: &str = "3.2.0";
const KERNEL_TYPE_REALTIME: &str = "realtime";

pub fn new(profile: &PerformanceProfile) -> MachineConfig {
    let kernel_type = profile
        .real_time_kernel_enabled()
        .then(|| KERNEL_TYPE_REALTIME.to_string());

    MachineConfig {
        metadata: ObjectMeta {
            name: Some(component_name(&profile.name_any(), ROLE_WORKER_PERFORMANCE)),
            labels: Some(machine_config_labels(profile)),
            ..Default::default()
        },
        spec: MachineConfigSpec {
            config: json!({ "ignition": { "version": IGNITION_VERSION } }),
            kernel_arguments: kernel_arguments(profile),
            kernel_type,
            ..Default::default()
        },
    }
}

fn kernel_arguments(profile: &PerformanceProfile) -> Vec<String> {
    let mut args = vec![
        "nohz=on".to_string(),
        "nosoftlockup".to_string(),
        "skew_tick=1".to_string(),
        "intel_pstate=disable".to_string(),
    ];

    if let Some(isolated) = profile.spec.cpu.as_ref().and_then(|cpu| cpu.isolated.as_deref()) {
        args.push(format!("nohz_full={isolated}"));
        args.push(format!("rcu_nocbs={isolated}"));
    }

    if let Some(hugepages) = &profile.spec.hugepages {
        args.extend(hugepage_arguments(hugepages));
    }

    args
}

// Pages pinned to a NUMA node are allocated at runtime, not on the command line.
fn hugepage_arguments(hugepages: &HugePages) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(size) = &hugepages.default_hugepages_size {
        args.push(format!("default_hugepagesz={size}"));
    }
    for page in hugepages.pages.iter().filter(|p| p.node.is_none()) {
        args.push(format!("hugepagesz={}", page.size));
        args.push(format!("hugepages={}", page.count));
    }
    args
}

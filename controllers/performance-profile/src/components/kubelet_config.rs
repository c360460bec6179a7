//! KubeletConfig enabling the static CPU manager with the profile's
//! reserved CPUs.

use super::{ROLE_WORKER_PERFORMANCE, component_name, machine_config_pool_labels};
use crds::{KubeletConfig, KubeletConfigSpec, LabelSelector, PerformanceProfile};
use kube::ResourceExt;
use kube::api::ObjectMeta;
use serde_json::json;

pub fn new(profile: &PerformanceProfile) -> KubeletConfig {
    let reserved = profile
        .spec
        .cpu
        .as_ref()
        .and_then(|cpu| cpu.reserved.clone())
        .unwrap_or_default();

    KubeletConfig {
        metadata: ObjectMeta {
            name: Some(component_name(&profile.name_any(), ROLE_WORKER_PERFORMANCE)),
            ..Default::default()
        },
        spec: KubeletConfigSpec {
            machine_config_pool_selector: Some(LabelSelector::from_labels(machine_config_pool_labels(profile))),
            kubelet_config: json!({
                "apiVersion": "kubelet.config.k8s.io/v1beta1",
                "kind": "KubeletConfiguration",
                "cpuManagerPolicy": "static",
                "cpuManagerReconcilePeriod": "5s",
                "topologyManagerPolicy": "best-effort",
                "reservedSystemCPUs": reserved,
            }),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::new_profile;

    #[test]
    fn test_reserved_cpus_and_pool_selector() {
        let kc = new(&new_profile("manual"));
        assert_eq!(kc.name_any(), "worker-performance-manual");
        assert_eq!(kc.spec.kubelet_config["cpuManagerPolicy"], "static");
        assert_eq!(kc.spec.kubelet_config["reservedSystemCPUs"], "0-1");
        let selector = kc.spec.machine_config_pool_selector.expect("selector");
        assert!(!selector.match_labels.is_empty());
    }
}

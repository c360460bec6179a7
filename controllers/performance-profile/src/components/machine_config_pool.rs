//! MachineConfigPool grouping the nodes targeted by a profile.

use super::{NODE_ROLE_LABEL, ROLE_WORKER_PERFORMANCE, component_name, machine_config_labels, machine_config_pool_labels};
use crds::{LabelSelector, MachineConfigPool, MachineConfigPoolSpec, PerformanceProfile};
use kube::ResourceExt;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

/// Pool selecting the profile's nodes and its generated MachineConfig.
///
/// Returned unpaused; the provisioning sequencer decides the paused flag.
pub fn new(profile: &PerformanceProfile) -> MachineConfigPool {
    let node_selector = profile
        .spec
        .node_selector
        .clone()
        .unwrap_or_else(|| BTreeMap::from([(NODE_ROLE_LABEL.to_string(), String::new())]));

    MachineConfigPool {
        metadata: ObjectMeta {
            name: Some(component_name(&profile.name_any(), ROLE_WORKER_PERFORMANCE)),
            labels: Some(machine_config_pool_labels(profile)),
            ..Default::default()
        },
        spec: MachineConfigPoolSpec {
            machine_config_selector: Some(LabelSelector::from_labels(machine_config_labels(profile))),
            node_selector: Some(LabelSelector::from_labels(node_selector)),
            paused: false,
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::MACHINE_CONFIG_ROLE_LABEL;
    use crate::test_utils::new_profile;

    #[test]
    fn test_defaults() {
        let pool = new(&new_profile("manual"));
        assert_eq!(pool.name_any(), "worker-performance-manual");
        assert!(!pool.spec.paused);
        let node_selector = pool.spec.node_selector.expect("node selector");
        assert_eq!(node_selector.match_labels.get(NODE_ROLE_LABEL).map(String::as_str), Some(""));
        let mc_selector = pool.spec.machine_config_selector.expect("mc selector");
        assert_eq!(
            mc_selector.match_labels.get(MACHINE_CONFIG_ROLE_LABEL).map(String::as_str),
            Some("worker-performance")
        );
    }

    #[test]
    fn test_custom_node_selector() {
        let mut profile = new_profile("manual");
        profile.spec.node_selector = Some(BTreeMap::from([("rack".to_string(), "r1".to_string())]));
        let pool = new(&profile);
        assert_eq!(
            pool.spec.node_selector.expect("node selector").match_labels,
            BTreeMap::from([("rack".to_string(), "r1".to_string())])
        );
    }
}

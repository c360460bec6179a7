//! Tuned objects: the shared network-latency profile and the per-profile
//! real-time kernel profile layered on top of it.

use super::{PROFILE_NAME_NETWORK_LATENCY, PROFILE_NAME_WORKER_RT, component_name, machine_config_labels};
use crds::{PerformanceProfile, Tuned, TunedProfile, TunedRecommend, TunedSpec};
use kube::ResourceExt;
use kube::api::ObjectMeta;

const NETWORK_LATENCY_DATA: &str = "[main]
summary=Optimize for deterministic performance at the cost of increased power consumption, focused on low latency network performance
include=latency-performance

[vm]
transparent_hugepages=never

[sysctl]
net.core.busy_read=50
net.core.busy_poll=50
net.ipv4.tcp_fastopen=3
kernel.numa_balancing=0
";

const WORKER_RT_PRIORITY: u64 = 30;

/// Cluster-wide network-latency profile, shared by every PerformanceProfile
pub fn network_latency(namespace: &str) -> Tuned {
    Tuned {
        metadata: ObjectMeta {
            name: Some(PROFILE_NAME_NETWORK_LATENCY.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: TunedSpec {
            profile: vec![TunedProfile {
                name: PROFILE_NAME_NETWORK_LATENCY.to_string(),
                data: NETWORK_LATENCY_DATA.to_string(),
            }],
            recommend: Vec::new(),
            ..Default::default()
        },
    }
}

/// Real-time kernel profile recommended to the nodes of `profile`'s pool
pub fn worker_real_time_kernel(profile: &PerformanceProfile, namespace: &str) -> Tuned {
    let name = component_name(&profile.name_any(), PROFILE_NAME_WORKER_RT);
    let isolated = profile
        .spec
        .cpu
        .as_ref()
        .and_then(|cpu| cpu.isolated.as_deref())
        .unwrap_or_default();
    let data = format!(
        "[main]
summary=Real time profile for the {profile} performance profile
include={PROFILE_NAME_NETWORK_LATENCY}

[bootloader]
cmdline_isolation=isolcpus={isolated}

[sysctl]
kernel.hung_task_timeout_secs=600
kernel.nmi_watchdog=0
kernel.sched_rt_runtime_us=-1
vm.stat_interval=10
",
        profile = profile.name_any(),
    );

    Tuned {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: TunedSpec {
            profile: vec![TunedProfile { name: name.clone(), data }],
            recommend: vec![TunedRecommend {
                profile: name,
                priority: WORKER_RT_PRIORITY,
                machine_config_labels: Some(machine_config_labels(profile)),
            }],
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::new_profile;

    #[test]
    fn test_network_latency_is_profile_independent() {
        let tuned = network_latency("tuning");
        assert_eq!(tuned.name_any(), "network-latency");
        assert_eq!(tuned.namespace().as_deref(), Some("tuning"));
        assert!(tuned.spec.recommend.is_empty());
    }

    #[test]
    fn test_worker_rt_recommends_itself() {
        let tuned = worker_real_time_kernel(&new_profile("manual"), "tuning");
        assert_eq!(tuned.name_any(), "worker-rt-manual");
        assert_eq!(tuned.spec.recommend[0].profile, "worker-rt-manual");
        assert!(tuned.spec.profile[0].data.contains("isolcpus=2-3"));
        assert!(tuned.spec.profile[0].data.contains("include=network-latency"));
    }
}

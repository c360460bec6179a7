//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating profiles and seeding the mock
//! cluster with the objects a profile produces.

use crate::components::{DEFAULT_TUNED_NAMESPACE, DesiredComponents};
use crate::reconciler::finalizer::FINALIZER;
use crate::reconciler::{Directive, Reconciler};
use cluster_client::MockClusterClient;
use crds::*;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};

/// Helper to create a valid PerformanceProfile with a uid and no finalizer
pub fn new_profile(name: &str) -> PerformanceProfile {
    PerformanceProfile {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            uid: Some(format!("uid-{name}")),
            ..Default::default()
        },
        spec: PerformanceProfileSpec {
            cpu: Some(Cpu {
                reserved: Some("0-1".to_string()),
                isolated: Some("2-3".to_string()),
                non_isolated: None,
            }),
            hugepages: Some(HugePages {
                default_hugepages_size: Some("1G".to_string()),
                pages: vec![HugePage {
                    size: "1G".to_string(),
                    count: 4,
                    node: None,
                }],
            }),
            real_time_kernel: Some(RealTimeKernel { enabled: Some(true) }),
            ..Default::default()
        },
    }
}

/// Helper to add the controller finalizer to a profile
pub fn with_finalizer(mut profile: PerformanceProfile) -> PerformanceProfile {
    profile
        .metadata
        .finalizers
        .get_or_insert_with(Vec::new)
        .push(FINALIZER.to_string());
    profile
}

/// Helper to mark a profile as being deleted
pub fn deleting(mut profile: PerformanceProfile) -> PerformanceProfile {
    let timestamp: Time =
        serde_json::from_value(serde_json::json!("2026-01-01T00:00:00Z")).expect("valid timestamp");
    profile.metadata.deletion_timestamp = Some(timestamp);
    profile
}

/// Helper to create a reconciler backed by `client`
pub fn new_reconciler(client: MockClusterClient) -> Reconciler<MockClusterClient> {
    Reconciler::new(client, DEFAULT_TUNED_NAMESPACE)
}

/// Desired components of `profile` in the default tuned namespace
pub fn desired_components(profile: &PerformanceProfile) -> DesiredComponents {
    DesiredComponents::new(profile, DEFAULT_TUNED_NAMESPACE).expect("profile has a uid")
}

/// Seeds every component of `profile` as a fully applied profile leaves
/// them (pool unpaused)
pub fn seed_components(client: &MockClusterClient, profile: &PerformanceProfile) {
    let desired = desired_components(profile);
    client.insert(desired.pool);
    client.insert(desired.machine_config);
    client.insert(desired.kubelet_config);
    client.insert(desired.tuned_network_latency);
    client.insert(desired.tuned_real_time);
    client.insert(desired.feature_gate);
}

/// Reconciles `name` until it reports done, returning every directive seen.
///
/// Panics after `max_steps` calls to catch a sequence that never settles.
pub async fn reconcile_to_completion(
    reconciler: &Reconciler<MockClusterClient>,
    name: &str,
    max_steps: usize,
) -> Vec<Directive> {
    let mut directives = Vec::new();
    for _ in 0..max_steps {
        let directive = reconciler.reconcile(name).await.expect("reconcile succeeds");
        directives.push(directive);
        if directive == Directive::Done {
            return directives;
        }
    }
    panic!("{name} did not settle within {max_steps} reconciliations: {directives:?}");
}

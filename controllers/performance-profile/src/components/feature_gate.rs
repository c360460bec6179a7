//! Cluster FeatureGate enabling the latency-sensitive feature set.

use super::{FEATURE_GATE_NAME, FEATURE_SET_LATENCY_SENSITIVE};
use crds::{FeatureGate, FeatureGateSpec};
use kube::api::ObjectMeta;

pub fn latency_sensitive() -> FeatureGate {
    FeatureGate {
        metadata: ObjectMeta {
            name: Some(FEATURE_GATE_NAME.to_string()),
            ..Default::default()
        },
        spec: FeatureGateSpec {
            feature_set: FEATURE_SET_LATENCY_SENSITIVE.to_string(),
            ..Default::default()
        },
    }
}

//! FeatureGate (cluster configuration)
//!
//! Cluster-wide singleton named `cluster` enabling a named feature set.

use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "FeatureGate",
    plural = "featuregates",
    derive = "PartialEq",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct FeatureGateSpec {
    /// Named feature set, for example `"LatencySensitive"`
    #[serde(default)]
    pub feature_set: String,

    /// Fields this controller does not manage, kept intact on replace
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

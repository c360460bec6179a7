//! Tuned CRD (node tuning operator)
//!
//! A `Tuned` object carries tuned daemon profiles and the rules that
//! recommend them to nodes.

use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "tuned.openshift.io",
    version = "v1",
    kind = "Tuned",
    plural = "tuneds",
    derive = "PartialEq",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct TunedSpec {
    /// Tuned profiles, each an ini-style tuned.conf body
    #[serde(default)]
    pub profile: Vec<TunedProfile>,

    /// Rules selecting which profile a node receives
    #[serde(default)]
    pub recommend: Vec<TunedRecommend>,

    /// Fields this controller does not manage, kept intact on replace
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TunedProfile {
    /// Profile name referenced by `recommend[].profile`
    pub name: String,

    /// tuned.conf content
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TunedRecommend {
    /// Profile to apply
    pub profile: String,

    /// Lower values win when several rules match
    pub priority: u64,

    /// Match nodes whose pool renders MachineConfigs with these labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_config_labels: Option<BTreeMap<String, String>>,
}

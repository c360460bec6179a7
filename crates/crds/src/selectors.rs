//! Label selectors shared by the machine-config kinds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kubernetes-style label selector, restricted to `matchLabels`.
///
/// The machine-config operator also accepts `matchExpressions`, but the
/// controller only ever emits exact label matches.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Labels that must all be present with the given values
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
}

impl LabelSelector {
    /// Selector matching exactly the given labels
    pub fn from_labels(labels: BTreeMap<String, String>) -> Self {
        Self { match_labels: labels }
    }
}

//! Lifecycle barrier on the PerformanceProfile.
//!
//! While the finalizer is present the API server keeps the profile around
//! after deletion is requested, giving teardown a chance to run.

use cluster_client::{ClusterClientTrait, ClusterError};
use crds::PerformanceProfile;
use kube::ResourceExt;
use serde_json::{Value, json};

/// Finalizer shared by every PerformanceProfile managed by this controller
pub const FINALIZER: &str = "performance.openshift.io/finalizer";

/// Whether `profile` carries this controller's finalizer
pub fn has_finalizer(profile: &PerformanceProfile) -> bool {
    profile.finalizers().iter().any(|name| name == FINALIZER)
}

/// Adds the finalizer if missing.
///
/// Returns whether the profile was changed.
pub async fn ensure<C: ClusterClientTrait>(
    client: &C,
    profile: &PerformanceProfile,
) -> Result<bool, ClusterError> {
    if has_finalizer(profile) {
        return Ok(false);
    }
    let mut finalizers = profile.finalizers().to_vec();
    finalizers.push(FINALIZER.to_string());
    write_finalizers(client, profile, finalizers).await?;
    Ok(true)
}

/// Removes the finalizer if present.
///
/// Returns whether the profile was changed.
pub async fn release<C: ClusterClientTrait>(
    client: &C,
    profile: &PerformanceProfile,
) -> Result<bool, ClusterError> {
    if !has_finalizer(profile) {
        return Ok(false);
    }
    let finalizers: Vec<String> = profile
        .finalizers()
        .iter()
        .filter(|name| *name != FINALIZER)
        .cloned()
        .collect();
    write_finalizers(client, profile, finalizers).await?;
    Ok(true)
}

// A merge patch replaces the whole list, so it is pinned to the version it
// was computed from; a concurrent edit surfaces as a conflict and is retried.
async fn write_finalizers<C: ClusterClientTrait>(
    client: &C,
    profile: &PerformanceProfile,
    finalizers: Vec<String>,
) -> Result<(), ClusterError> {
    let mut metadata = json!({ "finalizers": finalizers });
    if let (Some(version), Value::Object(fields)) = (profile.resource_version(), &mut metadata) {
        fields.insert("resourceVersion".to_string(), Value::String(version));
    }
    client
        .patch::<PerformanceProfile>(None, &profile.name_any(), &json!({ "metadata": metadata }))
        .await?;
    Ok(())
}

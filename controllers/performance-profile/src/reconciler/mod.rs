//! Reconciliation of PerformanceProfile resources.
//!
//! The reconciler is level-triggered: every call re-reads the profile and
//! its components, infers which step of the lifecycle it is on, performs at
//! most one step and tells the caller when to look again. Nothing is cached
//! between calls, so duplicate or reordered events are harmless and a
//! crash at any point is recovered by the next call.
//!
//! - `provision`: creation/activation sequence while the profile is live
//! - `teardown`: deactivation/removal sequence once deletion is requested

pub mod finalizer;
mod provision;
pub mod sync;
mod teardown;

use crate::error::ControllerError;
use cluster_client::ClusterClientTrait;
use crds::{MachineConfigPool, PerformanceProfile};
use kube::ResourceExt;
use kube_runtime::controller::Action;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Delay before an unfinished profile is looked at again
pub const REQUEUE_DELAY: Duration = Duration::from_secs(10);

/// What the caller should do after a successful reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Nothing left to do until the profile or a component changes
    Done,
    /// Check again after the given delay
    RequeueAfter(Duration),
}

impl Directive {
    pub(crate) fn requeue() -> Self {
        Self::RequeueAfter(REQUEUE_DELAY)
    }
}

impl From<Directive> for Action {
    fn from(directive: Directive) -> Self {
        match directive {
            Directive::Done => Action::await_change(),
            Directive::RequeueAfter(delay) => Action::requeue(delay),
        }
    }
}

/// Reconciles PerformanceProfile resources against a cluster object store.
pub struct Reconciler<C> {
    pub(crate) client: C,
    pub(crate) tuned_namespace: String,
}

impl<C: ClusterClientTrait> Reconciler<C> {
    /// Creates a new reconciler instance.
    pub fn new(client: C, tuned_namespace: impl Into<String>) -> Self {
        Self {
            client,
            tuned_namespace: tuned_namespace.into(),
        }
    }

    /// Reconciles the PerformanceProfile called `name`.
    ///
    /// A profile that no longer exists needs nothing. A profile with a
    /// deletion timestamp is torn down, any other is provisioned.
    /// Store errors are returned for the caller to retry with backoff.
    pub async fn reconcile(&self, name: &str) -> Result<Directive, ControllerError> {
        let Some(profile) = self.client.get::<PerformanceProfile>(None, name).await? else {
            debug!("PerformanceProfile {} not found, nothing to do", name);
            return Ok(Directive::Done);
        };

        if profile.is_deleting() {
            info!("Reconciling deletion of PerformanceProfile {}", name);
            self.teardown(&profile).await
        } else {
            info!("Reconciling PerformanceProfile {}", name);
            self.provision(&profile).await
        }
    }

    /// Sets the pool's paused flag with a merge patch, leaving every other
    /// field of the live pool as it is.
    pub(crate) async fn set_pool_paused(
        &self,
        pool: &MachineConfigPool,
        paused: bool,
    ) -> Result<(), ControllerError> {
        let name = pool.name_any();
        let patch = json!({ "spec": { "paused": paused } });
        self.client.patch::<MachineConfigPool>(None, &name, &patch).await?;
        info!(
            "{} MachineConfigPool {}",
            if paused { "Paused" } else { "Unpaused" },
            name
        );
        Ok(())
    }
}

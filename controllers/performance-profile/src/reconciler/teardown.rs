//! Teardown sequence, run once the profile has a deletion timestamp.
//!
//! The pool is paused first so that removing its MachineConfig and
//! KubeletConfig does not start a rollout; only then are the per-profile
//! components removed and the finalizer released.
//!
//! The shared network-latency Tuned and the cluster FeatureGate are left in
//! place: other profiles may rely on them and nothing tracks how many do.

use super::sync;
use super::{Directive, Reconciler, finalizer};
use crate::components::{PROFILE_NAME_WORKER_RT, ROLE_WORKER_PERFORMANCE, component_name};
use crate::error::ControllerError;
use cluster_client::ClusterClientTrait;
use crds::{KubeletConfig, MachineConfig, MachineConfigPool, PerformanceProfile, Tuned};
use kube::ResourceExt;
use tracing::info;

impl<C: ClusterClientTrait> Reconciler<C> {
    pub(crate) async fn teardown(
        &self,
        profile: &PerformanceProfile,
    ) -> Result<Directive, ControllerError> {
        let name = profile.name_any();
        let component = component_name(&name, ROLE_WORKER_PERFORMANCE);

        let live_pool: Option<MachineConfigPool> = self.client.get(None, &component).await?;
        if let Some(pool) = live_pool {
            if !pool.is_paused() {
                self.set_pool_paused(&pool, true).await?;
                return Ok(Directive::requeue());
            }
        }

        sync::remove::<_, KubeletConfig>(&self.client, None, &component).await?;
        sync::remove::<_, MachineConfig>(&self.client, None, &component).await?;
        sync::remove::<_, Tuned>(
            &self.client,
            Some(&self.tuned_namespace),
            &component_name(&name, PROFILE_NAME_WORKER_RT),
        )
        .await?;
        sync::remove::<_, MachineConfigPool>(&self.client, None, &component).await?;

        if finalizer::release(&self.client, profile).await? {
            info!("Released finalizer of PerformanceProfile {}", name);
        }
        Ok(Directive::Done)
    }
}

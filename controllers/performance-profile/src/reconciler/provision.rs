//! Provisioning sequence.
//!
//! Steps, in order; the first that applies is performed and the rest wait
//! for the next call:
//! 1. add the finalizer
//! 2. stop on an invalid spec
//! 3. create the pool paused, or bring a drifted pool back in line (paused)
//! 4. pause a running pool before any component changes
//! 5. sync MachineConfig, FeatureGate and both Tuned objects
//! 6. sync KubeletConfig
//! 7. unpause the pool
//!
//! The pool stays paused while content is incomplete so nodes roll out the
//! full change set once instead of rebooting per object. KubeletConfig is
//! written last because it has the widest impact on running workloads.

use super::sync::{self, SyncOutcome};
use super::{Directive, Reconciler, finalizer};
use crate::components::{Component, DesiredComponents};
use crate::error::ControllerError;
use crate::validation;
use cluster_client::{ClusterClientTrait, ObjectKey};
use crds::{MachineConfigPool, PerformanceProfile};
use kube::ResourceExt;
use tracing::{debug, info, warn};

impl<C: ClusterClientTrait> Reconciler<C> {
    pub(crate) async fn provision(
        &self,
        profile: &PerformanceProfile,
    ) -> Result<Directive, ControllerError> {
        let name = profile.name_any();

        // The update re-triggers reconciliation
        if finalizer::ensure(&self.client, profile).await? {
            info!("Added finalizer to PerformanceProfile {}", name);
            return Ok(Directive::Done);
        }

        // Not retried: a fixed spec generates a new event
        if let Err(reason) = validation::validate(&profile.spec) {
            warn!("PerformanceProfile {} is invalid, not applying it: {}", name, reason);
            return Ok(Directive::Done);
        }

        let desired = DesiredComponents::new(profile, &self.tuned_namespace)?;

        let live_pool: Option<MachineConfigPool> =
            self.client.get(None, &desired.pool.name_any()).await?;
        let pool = match live_pool {
            None => {
                let mut pool = desired.pool.clone();
                pool.spec.paused = true;
                self.client.create(&pool).await?;
                info!("Created paused {}", ObjectKey::of(&pool));
                return Ok(Directive::requeue());
            }
            Some(mut pool) if !pool.matches(&desired.pool) => {
                pool.apply(&desired.pool);
                pool.spec.paused = true;
                self.client.replace(&pool).await?;
                info!("Updated and paused {}", ObjectKey::of(&pool));
                return Ok(Directive::requeue());
            }
            Some(pool) => pool,
        };

        let content_pending = self.content_needs_sync(&desired).await?;
        let kubelet_pending = sync::needs_sync(&self.client, &desired.kubelet_config).await?;

        if (content_pending || kubelet_pending) && !pool.is_paused() {
            self.set_pool_paused(&pool, true).await?;
            return Ok(Directive::requeue());
        }

        if content_pending {
            self.sync_content(&desired).await?;
            return Ok(Directive::requeue());
        }

        if kubelet_pending {
            sync::sync(&self.client, &desired.kubelet_config).await?;
            return Ok(Directive::requeue());
        }

        if pool.is_paused() {
            self.set_pool_paused(&pool, false).await?;
            return Ok(Directive::requeue());
        }

        debug!("PerformanceProfile {} is fully applied", name);
        Ok(Directive::Done)
    }

    /// Whether any object of the content batch is missing or drifted
    async fn content_needs_sync(&self, desired: &DesiredComponents) -> Result<bool, ControllerError> {
        Ok(sync::needs_sync(&self.client, &desired.machine_config).await?
            || sync::needs_sync(&self.client, &desired.feature_gate).await?
            || sync::needs_sync(&self.client, &desired.tuned_network_latency).await?
            || sync::needs_sync(&self.client, &desired.tuned_real_time).await?)
    }

    /// Converges the content batch; KubeletConfig is left alone
    async fn sync_content(&self, desired: &DesiredComponents) -> Result<(), ControllerError> {
        let outcomes: [SyncOutcome; 4] = [
            sync::sync(&self.client, &desired.machine_config).await?,
            sync::sync(&self.client, &desired.feature_gate).await?,
            sync::sync(&self.client, &desired.tuned_network_latency).await?,
            sync::sync(&self.client, &desired.tuned_real_time).await?,
        ];
        let changed = outcomes.iter().filter(|o| o.changed()).count();
        debug!("Content batch synced, {} object(s) written", changed);
        Ok(())
    }
}

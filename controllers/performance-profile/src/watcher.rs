//! Kubernetes resource watcher.
//!
//! Drives the reconciler from a `kube_runtime::Controller`. The runtime
//! queue provides the scheduling guarantees the reconciler relies on:
//! - events for the same profile are coalesced while it waits in the queue
//! - a profile is never reconciled by two workers at once
//! - different profiles are reconciled in parallel, up to the configured
//!   concurrency
//!
//! Besides PerformanceProfile itself, the per-profile components are
//! watched through their owner reference, so a component edited or deleted
//! behind the controller's back wakes its profile up again. Tuned objects
//! are namespaced while the profile is not, so they are mapped to their
//! owner by hand.

use crate::backoff::FibonacciBackoff;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use cluster_client::ClusterClientTrait;
use crds::{KubeletConfig, MachineConfig, MachineConfigPool, PerformanceProfile, Tuned};
use futures::StreamExt;
use kube::{Api, Client, Resource, ResourceExt};
use kube_runtime::{
    Controller, watcher,
    controller::{Action, Config as RuntimeConfig},
    reflector::ObjectRef,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Shared state handed to every reconciliation.
pub struct Context<C> {
    reconciler: Reconciler<C>,
    /// Retry delays, tracked per profile name
    backoffs: Mutex<HashMap<String, FibonacciBackoff>>,
    backoff_min: Duration,
    backoff_max: Duration,
}

impl<C> Context<C> {
    pub fn new(reconciler: Reconciler<C>, backoff_min: Duration, backoff_max: Duration) -> Self {
        Self {
            reconciler,
            backoffs: Mutex::new(HashMap::new()),
            backoff_min,
            backoff_max,
        }
    }

    /// Next retry delay for `name`, advancing its backoff
    fn next_backoff(&self, name: &str) -> Duration {
        let mut backoffs = self.backoffs.lock().unwrap_or_else(PoisonError::into_inner);
        backoffs
            .entry(name.to_string())
            .or_insert_with(|| FibonacciBackoff::new(self.backoff_min, self.backoff_max))
            .next_backoff()
    }

    /// Forget the failure history of `name` after a successful pass, so
    /// the map only holds profiles that are currently failing
    fn reset_backoff(&self, name: &str) {
        let mut backoffs = self.backoffs.lock().unwrap_or_else(PoisonError::into_inner);
        backoffs.remove(name);
    }
}

/// Reconciles one profile. Only the name of the queued object is used; the
/// reconciler reads the current state itself.
async fn reconcile<C: ClusterClientTrait>(
    profile: Arc<PerformanceProfile>,
    ctx: Arc<Context<C>>,
) -> Result<Action, ControllerError> {
    let name = profile.name_any();
    debug!("Reconciling PerformanceProfile {}", name);

    let directive = ctx.reconciler.reconcile(&name).await?;
    ctx.reset_backoff(&name);
    Ok(directive.into())
}

/// Requeues a failed profile with Fibonacci backoff.
fn error_policy<C>(
    profile: Arc<PerformanceProfile>,
    error: &ControllerError,
    ctx: Arc<Context<C>>,
) -> Action {
    let name = profile.name_any();
    let delay = ctx.next_backoff(&name);
    warn!(
        "Reconciliation of PerformanceProfile {} failed, retrying in {:?}: {}",
        name, delay, error
    );
    Action::requeue(delay)
}

/// Profiles owning `tuned`, as cluster-scoped references.
///
/// `Controller::owns` would key the owner in the Tuned's namespace, which
/// never matches a cluster-scoped profile.
fn tuned_owners(tuned: Tuned) -> Vec<ObjectRef<PerformanceProfile>> {
    let api_version = PerformanceProfile::api_version(&());
    let kind = PerformanceProfile::kind(&());
    tuned
        .owner_references()
        .iter()
        .filter(|owner| owner.api_version == api_version && owner.kind == kind)
        .map(|owner| ObjectRef::new(&owner.name))
        .collect()
}

/// Watches PerformanceProfile resources and the objects they own.
pub struct Watcher<C> {
    client: Client,
    context: Arc<Context<C>>,
    tuned_namespace: String,
    runtime_config: RuntimeConfig,
}

impl<C: ClusterClientTrait + 'static> Watcher<C> {
    /// Creates a new watcher instance.
    pub fn new(client: Client, reconciler: Reconciler<C>, config: &ControllerConfig) -> Self {
        Self {
            client,
            context: Arc::new(Context::new(reconciler, config.backoff_min, config.backoff_max)),
            tuned_namespace: config.tuned_namespace.clone(),
            runtime_config: RuntimeConfig::default()
                .debounce(config.debounce)
                .concurrency(config.concurrency),
        }
    }

    /// Starts watching PerformanceProfile resources. Runs until the
    /// watch streams end.
    pub async fn watch_performance_profiles(self) -> Result<(), ControllerError> {
        info!("Starting PerformanceProfile watcher");

        let profiles: Api<PerformanceProfile> = Api::all(self.client.clone());
        let pools: Api<MachineConfigPool> = Api::all(self.client.clone());
        let machine_configs: Api<MachineConfig> = Api::all(self.client.clone());
        let kubelet_configs: Api<KubeletConfig> = Api::all(self.client.clone());
        let tuneds: Api<Tuned> = Api::namespaced(self.client.clone(), &self.tuned_namespace);

        Controller::new(profiles, watcher::Config::default())
            .owns(pools, watcher::Config::default())
            .owns(machine_configs, watcher::Config::default())
            .owns(kubelet_configs, watcher::Config::default())
            .watches(tuneds, watcher::Config::default(), tuned_owners)
            .with_config(self.runtime_config)
            .shutdown_on_signal()
            .run(reconcile::<C>, error_policy::<C>, self.context)
            .for_each(|res| async move {
                match res {
                    Ok((obj, _action)) => debug!("Reconciled PerformanceProfile {}", obj.name),
                    Err(e) => error!("PerformanceProfile controller error: {}", e),
                }
            })
            .await;

        info!("PerformanceProfile watcher stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{new_profile, new_reconciler};
    use cluster_client::MockClusterClient;

    fn context() -> Arc<Context<MockClusterClient>> {
        Arc::new(Context::new(
            new_reconciler(MockClusterClient::new()),
            Duration::from_secs(5),
            Duration::from_secs(300),
        ))
    }

    #[test]
    fn test_error_policy_backs_off_per_profile() {
        let ctx = context();
        let a = Arc::new(new_profile("a"));
        let b = Arc::new(new_profile("b"));
        let err = ControllerError::Watch("boom".to_string());

        let delays: Vec<Action> = (0..4)
            .map(|_| error_policy(a.clone(), &err, ctx.clone()))
            .collect();
        assert_eq!(
            delays,
            vec![
                Action::requeue(Duration::from_secs(5)),
                Action::requeue(Duration::from_secs(5)),
                Action::requeue(Duration::from_secs(10)),
                Action::requeue(Duration::from_secs(15)),
            ]
        );

        // Independent history
        assert_eq!(
            error_policy(b, &err, ctx.clone()),
            Action::requeue(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_tuned_maps_to_cluster_scoped_owner() {
        let profile = new_profile("manual");
        let mut tuned = crate::components::tuned::worker_real_time_kernel(
            &profile,
            crate::components::DEFAULT_TUNED_NAMESPACE,
        );
        tuned.metadata.owner_references = profile.controller_owner_ref(&()).map(|owner| vec![owner]);

        assert_eq!(tuned_owners(tuned.clone()), vec![ObjectRef::new("manual")]);

        // Shared or foreign Tuned objects wake nobody
        tuned.metadata.owner_references = None;
        assert!(tuned_owners(tuned).is_empty());
    }

    #[tokio::test]
    async fn test_success_resets_backoff() {
        let ctx = context();
        let profile = Arc::new(new_profile("gone"));
        let err = ControllerError::Watch("boom".to_string());
        for _ in 0..3 {
            error_policy(profile.clone(), &err, ctx.clone());
        }

        // Absent from the store, so reconciliation succeeds immediately
        let action = reconcile(profile.clone(), ctx.clone()).await.unwrap();
        assert_eq!(action, Action::await_change());
        assert!(ctx.backoffs.lock().unwrap().is_empty());
        assert_eq!(
            error_policy(profile, &err, ctx),
            Action::requeue(Duration::from_secs(5))
        );
    }

    #[tokio::test]
    async fn test_reconcile_surfaces_errors() {
        let client = MockClusterClient::new();
        client.fail_reads_of(cluster_client::ObjectKind::PerformanceProfile);
        let ctx = Arc::new(Context::new(
            new_reconciler(client),
            Duration::from_secs(5),
            Duration::from_secs(300),
        ));

        let result = reconcile(Arc::new(new_profile("manual")), ctx).await;
        assert!(matches!(result, Err(ControllerError::Cluster(_))));
    }
}

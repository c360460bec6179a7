//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Kubernetes
//! client, the reconciler and the PerformanceProfile watcher together.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::watcher::Watcher;
use cluster_client::KubeClusterClient;
use kube::Client;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for PerformanceProfile management.
pub struct Controller {
    profile_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts its watcher.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing PerformanceProfile Controller");

        let kube_client = Client::try_default().await?;
        let cluster_client = KubeClusterClient::new(kube_client);
        let watch_client = cluster_client.kube_client();

        let reconciler = Reconciler::new(cluster_client, config.tuned_namespace.clone());
        let watcher = Watcher::new(watch_client, reconciler, &config);

        let profile_watcher = tokio::spawn(async move { watcher.watch_performance_profiles().await });

        Ok(Self { profile_watcher })
    }

    /// Runs until the watcher stops, which happens on SIGINT/SIGTERM.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("PerformanceProfile Controller running");

        self.profile_watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("PerformanceProfile watcher panicked: {}", e)))??;

        info!("PerformanceProfile Controller stopped");
        Ok(())
    }
}

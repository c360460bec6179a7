//! PerformanceProfile Controller
//!
//! Converges each PerformanceProfile into the objects that tune its nodes:
//! - MachineConfigPool: groups the nodes, paused while changes are staged
//! - MachineConfig: kernel arguments, huge pages, real-time kernel
//! - KubeletConfig: static CPU manager with the reserved CPUs
//! - Tuned: network-latency base profile and a per-profile real-time profile
//! - FeatureGate: cluster-wide LatencySensitive feature set
//!
//! Deleting a profile pauses its pool and removes the per-profile objects
//! before the profile itself is released.

mod backoff;
mod components;
mod config;
mod controller;
mod error;
mod reconciler;
mod validation;
mod watcher;
#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::controller::Controller;
use crate::error::ControllerError;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    // Crypto provider must be installed before the first TLS connection
    let _ = rustls::crypto::ring::default_provider().install_default();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting PerformanceProfile Controller");

    let config = ControllerConfig::from_env()?;
    info!("Configuration:");
    info!("  Tuned namespace: {}", config.tuned_namespace);
    info!("  Concurrency: {}", config.concurrency);
    info!("  Debounce: {:?}", config.debounce);
    info!("  Error backoff: {:?} to {:?}", config.backoff_min, config.backoff_max);

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}

//! Cluster Object Store Client
//!
//! A small typed accessor over the Kubernetes API for the closed set of
//! kinds the performance profile controller reads and writes.
//!
//! # Example
//!
//! ```no_run
//! use cluster_client::{ClusterClientTrait, KubeClusterClient};
//! use crds::MachineConfigPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = KubeClusterClient::new(kube::Client::try_default().await?);
//!
//! // Cluster-scoped kinds take no namespace
//! if let Some(pool) = client
//!     .get::<MachineConfigPool>(None, "worker-performance-manual")
//!     .await?
//! {
//!     println!("paused: {}", pool.spec.paused);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Typed kinds**: every operation is generic over [`ClusterObject`],
//!   implemented only for the profile and its dependent kinds
//! - **Not-found as data**: `get` returns `Ok(None)` for absent objects
//! - **Mocking**: `MockClusterClient` (feature `test-util`) keeps objects in
//!   memory and records every mutation

pub mod client;
pub mod error;
pub mod object;
#[path = "trait.rs"]
pub mod cluster_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeClusterClient;
pub use cluster_trait::ClusterClientTrait;
pub use error::ClusterError;
pub use object::{ClusterObject, ObjectKey, ObjectKind};
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockClusterClient, Mutation, Operation};

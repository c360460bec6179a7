//! Performance Profile CRD Definitions
//!
//! The `PerformanceProfile` custom resource owned by this project, plus typed
//! definitions of the cluster objects the controller derives from it.
//! The dependent kinds belong to other operators; only the fields the
//! controller reads or writes are modelled.

pub mod feature_gate;
pub mod machine_config;
pub mod performance_profile;
pub mod selectors;
pub mod tuned;

pub use feature_gate::*;
pub use machine_config::*;
pub use performance_profile::*;
pub use selectors::*;
pub use tuned::*;

//! Prints the `PerformanceProfile` CustomResourceDefinition as YAML.
//!
//! The dependent kinds (MachineConfigPool, MachineConfig, KubeletConfig,
//! Tuned, FeatureGate) are owned by other operators and are not emitted.

use crds::PerformanceProfile;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&PerformanceProfile::crd())?);
    Ok(())
}

//! Required-parameter checks on a PerformanceProfile spec.
//!
//! A profile failing these checks is left alone: nothing is created and
//! the reconciliation is not retried until the profile changes.

use crds::PerformanceProfileSpec;
use thiserror::Error;

/// Reason a profile cannot be acted on
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("you should provide the CPU section")]
    MissingCpu,

    #[error("you should provide the isolated CPU set")]
    MissingIsolatedCpus,

    #[error("you should provide the reserved CPU set")]
    MissingReservedCpus,

    #[error("huge page entry {0} has an empty size")]
    EmptyHugePageSize(usize),
}

/// Checks `spec` is complete enough to generate components from.
pub fn validate(spec: &PerformanceProfileSpec) -> Result<(), ValidationError> {
    let cpu = spec.cpu.as_ref().ok_or(ValidationError::MissingCpu)?;

    if cpu.isolated.as_deref().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingIsolatedCpus);
    }
    if cpu.reserved.as_deref().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingReservedCpus);
    }

    if let Some(hugepages) = &spec.hugepages {
        if let Some(index) = hugepages.pages.iter().position(|page| page.size.is_empty()) {
            return Err(ValidationError::EmptyHugePageSize(index));
        }
    }

    Ok(())
}

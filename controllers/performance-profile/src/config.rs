//! Controller configuration, read once from the environment at start-up.

use crate::components::DEFAULT_TUNED_NAMESPACE;
use crate::error::ControllerError;
use std::time::Duration;

/// Runtime settings of the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace the Tuned objects are written to
    pub tuned_namespace: String,
    /// Maximum number of profiles reconciled at the same time
    pub concurrency: u16,
    /// Quiet period after an event before a profile is reconciled
    pub debounce: Duration,
    /// First retry delay after a failed reconciliation
    pub backoff_min: Duration,
    /// Cap on the retry delay
    pub backoff_max: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tuned_namespace: DEFAULT_TUNED_NAMESPACE.to_string(),
            concurrency: 3,
            debounce: Duration::from_secs(1),
            backoff_min: Duration::from_secs(5),
            backoff_max: Duration::from_secs(300),
        }
    }
}

impl ControllerConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tuned_namespace = match lookup("TUNED_NAMESPACE") {
            Some(ns) if ns.trim().is_empty() => {
                return Err(ControllerError::InvalidConfig(
                    "TUNED_NAMESPACE must not be empty".to_string(),
                ));
            }
            Some(ns) => ns,
            None => defaults.tuned_namespace,
        };

        let concurrency = parse_or(&lookup, "RECONCILE_CONCURRENCY", defaults.concurrency)?;
        if concurrency == 0 {
            return Err(ControllerError::InvalidConfig(
                "RECONCILE_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        let debounce = Duration::from_secs(parse_or(
            &lookup,
            "RECONCILE_DEBOUNCE_SECS",
            defaults.debounce.as_secs(),
        )?);
        let backoff_min = Duration::from_secs(parse_or(
            &lookup,
            "ERROR_BACKOFF_MIN_SECS",
            defaults.backoff_min.as_secs(),
        )?);
        let backoff_max = Duration::from_secs(parse_or(
            &lookup,
            "ERROR_BACKOFF_MAX_SECS",
            defaults.backoff_max.as_secs(),
        )?);
        if backoff_max < backoff_min {
            return Err(ControllerError::InvalidConfig(format!(
                "ERROR_BACKOFF_MAX_SECS ({}) is below ERROR_BACKOFF_MIN_SECS ({})",
                backoff_max.as_secs(),
                backoff_min.as_secs()
            )));
        }

        Ok(Self {
            tuned_namespace,
            concurrency,
            debounce,
            backoff_min,
            backoff_max,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ControllerError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            ControllerError::InvalidConfig(format!("{key}={raw:?} is not valid: {e}"))
        }),
        None => Ok(default),
    }
}

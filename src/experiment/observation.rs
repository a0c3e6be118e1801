//! Observation - one behavior's execution record

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::Experiment;
use crate::error::Error;

/// The recorded outcome of running one behavior once.
///
/// Exactly one of [`value`](Self::value) and [`error`](Self::error) is set.
/// Immutable after creation.
pub struct Observation<T> {
    experiment: Experiment<T>,
    name: String,
    started_at: DateTime<Utc>,
    runtime: Duration,
    outcome: Result<T, Error>,
}

impl<T> Observation<T> {
    pub(crate) const fn new(
        experiment: Experiment<T>,
        name: String,
        started_at: DateTime<Utc>,
        runtime: Duration,
        outcome: Result<T, Error>,
    ) -> Self {
        Self {
            experiment,
            name,
            started_at,
            runtime,
            outcome,
        }
    }

    /// Get the experiment this observation belongs to.
    #[must_use]
    pub const fn experiment(&self) -> &Experiment<T> {
        &self.experiment
    }

    /// Get the behavior name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the wall-clock time the behavior was started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get the measured duration, including fault barrier overhead.
    #[must_use]
    pub const fn runtime(&self) -> Duration {
        self.runtime
    }

    /// Get the produced value, absent on failure.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// Get the produced error, absent on success.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }

    /// Check whether the behavior succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Get the value and error as a borrowed `Result`.
    #[must_use]
    pub const fn outcome(&self) -> Result<&T, &Error> {
        self.outcome.as_ref()
    }

    /// Normalize the value with the experiment's cleaner for display.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CleanerMissing`] when the experiment has no cleaner,
    /// or the cleaner's own error (or panic) otherwise.
    pub fn cleaned_value(&self) -> anyhow::Result<serde_json::Value> {
        let cleaner = self
            .experiment
            .cleaner()
            .ok_or_else(|| Error::CleanerMissing(self.experiment.name().to_string()))?;
        let value = self.value();
        crate::observer::fault_barrier(|| cleaner(value)).map_err(Error::into_anyhow)
    }
}

impl<T: fmt::Debug> fmt::Debug for Observation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observation")
            .field("experiment", &self.experiment.name())
            .field("name", &self.name)
            .field("started_at", &self.started_at)
            .field("runtime", &self.runtime)
            .field("outcome", &self.outcome)
            .finish()
    }
}

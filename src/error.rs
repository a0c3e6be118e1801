//! Error types for scientist
//!
//! Two disjoint classes live here:
//! - [`Error`] is what a *behavior* produced (its own failure, a caught panic,
//!   or a missing registration). It is data on an `Observation`, never thrown.
//! - [`ResultError`] is a failure of the orchestration machinery itself
//!   (comparator, ignore rule, pre-trial hook, publisher).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Scientist error types
#[derive(Error, Debug)]
pub enum Error {
    /// The requested behavior is not registered on the experiment
    #[error("Behavior {behavior:?} not found for experiment {experiment:?}")]
    BehaviorNotFound {
        /// Name that was looked up
        behavior: String,
        /// Experiment the lookup ran against
        experiment: String,
    },

    /// A behavior or hook panicked; the payload text is preserved
    #[error("{0}")]
    Panicked(String),

    /// `Observation::cleaned_value` was called on an experiment without a cleaner
    #[error("No cleaner configured for experiment {0:?}")]
    CleanerMissing(String),

    /// Error returned by user code
    #[error(transparent)]
    Behavior(#[from] anyhow::Error),
}

impl Error {
    /// Unwrap user errors back to `anyhow`, wrapping every other variant.
    pub(crate) fn into_anyhow(self) -> anyhow::Error {
        match self {
            Self::Behavior(err) => err,
            other => other.into(),
        }
    }
}

/// Orchestration step during which a [`ResultError`] was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Comparing the control value against a candidate value.
    Compare,
    /// Evaluating an ignore rule for a mismatched candidate.
    Ignore,
    /// Running the pre-trial hook.
    BeforeRun,
    /// Handing the finished result to the publisher.
    Publish,
}

impl Operation {
    /// Stable snake_case tag for this operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compare => "compare",
            Self::Ignore => "ignore",
            Self::BeforeRun => "before_run",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure of a pluggable hook, captured as data on the trial result.
#[derive(Error, Debug)]
#[error("{operation} failed for experiment {experiment:?}")]
pub struct ResultError {
    operation: Operation,
    experiment: String,
    source: anyhow::Error,
}

impl ResultError {
    /// Tag `source` with the operation and experiment it belongs to.
    #[must_use]
    pub fn new(
        operation: Operation,
        experiment: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self {
            operation,
            experiment: experiment.into(),
            source: source.into(),
        }
    }

    /// Get the operation during which the failure occurred.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Get the experiment name.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Get the underlying hook error.
    #[must_use]
    pub const fn inner(&self) -> &anyhow::Error {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_tags() {
        assert_eq!(Operation::Compare.to_string(), "compare");
        assert_eq!(Operation::Ignore.to_string(), "ignore");
        assert_eq!(Operation::BeforeRun.to_string(), "before_run");
        assert_eq!(Operation::Publish.to_string(), "publish");
    }

    #[test]
    fn test_operation_serde_matches_display() {
        let json = serde_json::to_string(&Operation::BeforeRun).unwrap();
        assert_eq!(json, "\"before_run\"");
    }

    #[test]
    fn test_result_error_source_chain() {
        let err = ResultError::new(Operation::Publish, "exp", anyhow::anyhow!("sink down"));
        let source = std::error::Error::source(&err).expect("source present");
        assert_eq!(source.to_string(), "sink down");
    }
}

//! Serializable summaries of finished trials
//!
//! Publishers usually want a flat record rather than the live
//! `ExperimentResult`. These types capture names, timings, cleaned values and
//! error messages, and serialize with serde.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Operation, ResultError};
use crate::experiment::{ExperimentResult, Observation};

/// Flat record of one observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservationSummary {
    /// Behavior name.
    pub name: String,
    /// Wall-clock start time.
    pub started_at: DateTime<Utc>,
    /// Measured duration in nanoseconds.
    pub runtime_ns: u64,
    /// Cleaned value, when the experiment has a cleaner that succeeded.
    pub value: Option<serde_json::Value>,
    /// Error message, when the behavior failed.
    pub error: Option<String>,
}

impl ObservationSummary {
    /// Summarize a single observation.
    #[must_use]
    pub fn from_observation<T>(observation: &Observation<T>) -> Self {
        let value = if observation.is_ok() {
            observation.cleaned_value().ok()
        } else {
            None
        };

        Self {
            name: observation.name().to_string(),
            started_at: observation.started_at(),
            runtime_ns: u64::try_from(observation.runtime().as_nanos()).unwrap_or(u64::MAX),
            value,
            error: observation.error().map(ToString::to_string),
        }
    }
}

/// Flat record of one orchestration error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultErrorSummary {
    /// Operation that failed.
    pub operation: Operation,
    /// Experiment name.
    pub experiment: String,
    /// Message of the underlying error.
    pub message: String,
}

impl From<&ResultError> for ResultErrorSummary {
    fn from(error: &ResultError) -> Self {
        Self {
            operation: error.operation(),
            experiment: error.experiment().to_string(),
            message: error.inner().to_string(),
        }
    }
}

/// Flat record of one trial.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultSummary {
    /// Experiment name.
    pub experiment: String,
    /// Control observation.
    pub control: ObservationSummary,
    /// Candidate observations in registration order.
    pub candidates: Vec<ObservationSummary>,
    /// Names of candidates whose mismatch was ignored.
    pub ignored: Vec<String>,
    /// Names of mismatched candidates.
    pub mismatched: Vec<String>,
    /// Orchestration errors.
    pub errors: Vec<ResultErrorSummary>,
}

impl ResultSummary {
    /// Summarize a finished trial.
    #[must_use]
    pub fn from_result<T>(result: &ExperimentResult<T>) -> Self {
        let names = |observations: &[Arc<Observation<T>>]| {
            observations
                .iter()
                .map(|o| o.name().to_string())
                .collect::<Vec<_>>()
        };

        Self {
            experiment: result.experiment().name().to_string(),
            control: ObservationSummary::from_observation(result.control()),
            candidates: result
                .candidates()
                .iter()
                .map(|o| ObservationSummary::from_observation(o))
                .collect(),
            ignored: names(result.ignored()),
            mismatched: names(result.mismatched()),
            errors: result.errors().iter().map(ResultErrorSummary::from).collect(),
        }
    }

    /// Check whether the trial found no unexplained difference and raised no errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mismatched.is_empty() && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::Experiment;

    #[test]
    fn test_summary_names_and_values() {
        let experiment = Experiment::builder("summary")
            .control(|| Ok(vec![1, 2]))
            .candidate(|| Ok(vec![2, 1]))
            .build();

        let summary = experiment.run("control").summary();

        assert_eq!(summary.experiment, "summary");
        assert_eq!(summary.control.name, "control");
        assert_eq!(summary.control.value, Some(serde_json::json!([1, 2])));
        assert_eq!(summary.candidates.len(), 1);
        assert_eq!(summary.mismatched, vec!["candidate".to_string()]);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_summary_without_cleaner_has_no_values() {
        let experiment = Experiment::builder_with_comparator("raw", |_: Option<&u8>, _| Ok(true))
            .control(|| Ok(1))
            .build();

        let summary = experiment.run("control").summary();

        assert!(summary.control.value.is_none());
        assert!(summary.control.error.is_none());
        assert!(summary.is_clean());
    }
}

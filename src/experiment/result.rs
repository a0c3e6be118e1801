//! Experiment Result - the outcome of one trial

use std::fmt;
use std::sync::Arc;

use super::{Experiment, Observation};
use crate::error::{Error, ResultError};
use crate::report::ResultSummary;

/// The outcome of one trial.
///
/// ## Invariants
///
/// - `observations()[0]` is the control, followed by the candidates in
///   registration order, so `observations().len() == candidates().len() + 1`.
/// - `ignored()` and `mismatched()` are disjoint subsequences of `candidates()`.
///
/// Observations are shared (`Arc`) between the sequences; use
/// [`Arc::ptr_eq`] to test membership.
pub struct ExperimentResult<T> {
    experiment: Experiment<T>,
    control: Arc<Observation<T>>,
    observations: Vec<Arc<Observation<T>>>,
    candidates: Vec<Arc<Observation<T>>>,
    ignored: Vec<Arc<Observation<T>>>,
    mismatched: Vec<Arc<Observation<T>>>,
    errors: Vec<ResultError>,
}

impl<T> ExperimentResult<T> {
    pub(crate) fn new(experiment: Experiment<T>, control: Observation<T>, capacity: usize) -> Self {
        let control = Arc::new(control);
        let mut observations = Vec::with_capacity(capacity + 1);
        observations.push(Arc::clone(&control));
        Self {
            experiment,
            control,
            observations,
            candidates: Vec::with_capacity(capacity),
            ignored: Vec::new(),
            mismatched: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn push_candidate(&mut self, candidate: Arc<Observation<T>>) {
        self.observations.push(Arc::clone(&candidate));
        self.candidates.push(candidate);
    }

    pub(crate) fn push_ignored(&mut self, candidate: Arc<Observation<T>>) {
        self.ignored.push(candidate);
    }

    pub(crate) fn push_mismatched(&mut self, candidate: Arc<Observation<T>>) {
        self.mismatched.push(candidate);
    }

    pub(crate) fn push_error(&mut self, error: ResultError) {
        self.errors.push(error);
    }

    /// Get the experiment that produced this result.
    #[must_use]
    pub const fn experiment(&self) -> &Experiment<T> {
        &self.experiment
    }

    /// Get the control observation.
    #[must_use]
    pub fn control(&self) -> &Observation<T> {
        &self.control
    }

    /// Get every observation, control first.
    #[must_use]
    pub fn observations(&self) -> &[Arc<Observation<T>>] {
        &self.observations
    }

    /// Get the candidate observations in registration order.
    #[must_use]
    pub fn candidates(&self) -> &[Arc<Observation<T>>] {
        &self.candidates
    }

    /// Get the mismatched candidates suppressed by an ignore rule.
    #[must_use]
    pub fn ignored(&self) -> &[Arc<Observation<T>>] {
        &self.ignored
    }

    /// Get the reported mismatches.
    #[must_use]
    pub fn mismatched(&self) -> &[Arc<Observation<T>>] {
        &self.mismatched
    }

    /// Get the orchestration errors raised during the trial.
    #[must_use]
    pub fn errors(&self) -> &[ResultError] {
        &self.errors
    }

    /// Get the control's value. This is what the caller should return.
    #[must_use]
    pub fn control_value(&self) -> Option<&T> {
        self.control.value()
    }

    /// Get the control's error, exactly as observed.
    #[must_use]
    pub fn control_error(&self) -> Option<&Error> {
        self.control.error()
    }

    /// Iterate the candidates that matched the control.
    pub fn matched(&self) -> impl Iterator<Item = &Arc<Observation<T>>> {
        self.candidates.iter().filter(|candidate| {
            !self.ignored.iter().any(|o| Arc::ptr_eq(o, candidate))
                && !self.mismatched.iter().any(|o| Arc::ptr_eq(o, candidate))
        })
    }

    /// Check whether any candidate was reported as mismatched.
    #[must_use]
    pub fn has_mismatches(&self) -> bool {
        !self.mismatched.is_empty()
    }

    /// Build a serializable summary of this result.
    #[must_use]
    pub fn summary(&self) -> ResultSummary {
        ResultSummary::from_result(self)
    }
}

impl<T: fmt::Debug> fmt::Debug for ExperimentResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |observations: &[Arc<Observation<T>>]| {
            observations
                .iter()
                .map(|o| o.name().to_string())
                .collect::<Vec<_>>()
        };

        f.debug_struct("ExperimentResult")
            .field("experiment", &self.experiment.name())
            .field("control", &self.control)
            .field("candidates", &self.candidates)
            .field("ignored", &names(&self.ignored))
            .field("mismatched", &names(&self.mismatched))
            .field("errors", &self.errors)
            .finish()
    }
}

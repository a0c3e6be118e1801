//! Experiment runner - one linear pass per trial
//!
//! ```text
//! before_run ─> observe(control) ─> observe(candidates...) ─> compare ─> ignore
//!                                                                          │
//!                    error reporter <── publish <── assemble result <──────┘
//! ```
//!
//! Hook failures never abort the trial. They degrade the classification of
//! the affected candidate and are recorded as [`ResultError`]s:
//! - a failing comparator counts as a mismatch
//! - a failing ignore rule counts as "not ignored"

use std::sync::Arc;

use crate::error::{Error, Operation, ResultError};
use crate::experiment::{Experiment, ExperimentResult, Observation};
use crate::observer::{fault_barrier, observe};
use crate::ExecutionMode;

/// Run one trial of `experiment` with `control` as the authoritative behavior.
///
/// Every registered behavior other than `control` is a candidate. The
/// control's value and error are returned untouched inside the result.
#[must_use]
pub fn run<T: Send + 'static>(experiment: &Experiment<T>, control: &str) -> ExperimentResult<T> {
    let span = tracing::debug_span!("experiment", experiment = experiment.name(), control);
    let _guard = span.enter();

    let before_run_error = experiment.before_run_hook().and_then(|hook| {
        fault_barrier(|| hook())
            .err()
            .map(|err| result_error(experiment, Operation::BeforeRun, err))
    });

    let (control_observation, candidates) = observe_all(experiment, control);

    let mut result =
        ExperimentResult::new(experiment.clone(), control_observation, candidates.len());
    if let Some(err) = before_run_error {
        result.push_error(err);
    }

    for candidate in candidates {
        let candidate = Arc::new(candidate);
        result.push_candidate(Arc::clone(&candidate));

        let mismatched = match mismatching(experiment, result.control(), &candidate) {
            Ok(mismatched) => mismatched,
            Err(err) => {
                result.push_error(result_error(experiment, Operation::Compare, err));
                true
            }
        };

        if !mismatched {
            continue;
        }

        let ignored = match ignoring(experiment, result.control(), &candidate) {
            Ok(ignored) => ignored,
            Err(err) => {
                result.push_error(result_error(experiment, Operation::Ignore, err));
                false
            }
        };

        if ignored {
            tracing::debug!(candidate = candidate.name(), "mismatch ignored");
            result.push_ignored(candidate);
        } else {
            tracing::debug!(candidate = candidate.name(), "mismatch");
            result.push_mismatched(candidate);
        }
    }

    if let Some(publisher) = experiment.publisher() {
        if let Err(err) = fault_barrier(|| publisher(&result)) {
            result.push_error(result_error(experiment, Operation::Publish, err));
        }
    }

    if !result.errors().is_empty() {
        let reporter = experiment.error_reporter();
        if let Err(err) = fault_barrier(|| {
            reporter(result.errors());
            Ok(())
        }) {
            tracing::error!(error = %err, "experiment error reporter failed");
        }
    }

    result
}

/// Observe the control, then every other behavior in registration order.
fn observe_all<T: Send + 'static>(
    experiment: &Experiment<T>,
    control: &str,
) -> (Observation<T>, Vec<Observation<T>>) {
    let names: Vec<&str> = experiment
        .behavior_names()
        .filter(|name| *name != control)
        .collect();

    match experiment.mode() {
        ExecutionMode::Sequential => {
            let control = observe(experiment, control);
            let candidates = names.iter().map(|name| observe(experiment, name)).collect();
            (control, candidates)
        }
        #[cfg(feature = "rayon")]
        ExecutionMode::Concurrent => {
            use rayon::prelude::*;

            // Worker threads do not inherit the caller's span.
            let span = tracing::Span::current();
            rayon::join(
                || span.in_scope(|| observe(experiment, control)),
                || {
                    names
                        .par_iter()
                        .map(|name| span.in_scope(|| observe(experiment, name)))
                        .collect()
                },
            )
        }
    }
}

fn mismatching<T>(
    experiment: &Experiment<T>,
    control: &Observation<T>,
    candidate: &Observation<T>,
) -> Result<bool, Error> {
    let compare = experiment.comparator();
    fault_barrier(|| compare(control.value(), candidate.value())).map(|matching| !matching)
}

/// First rule returning `true` wins; the first rule error stops evaluation.
fn ignoring<T>(
    experiment: &Experiment<T>,
    control: &Observation<T>,
    candidate: &Observation<T>,
) -> Result<bool, Error> {
    for rule in experiment.ignores() {
        if fault_barrier(|| rule(control.value(), candidate.value()))? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn result_error<T>(experiment: &Experiment<T>, operation: Operation, err: Error) -> ResultError {
    ResultError::new(operation, experiment.name(), err.into_anyhow())
}

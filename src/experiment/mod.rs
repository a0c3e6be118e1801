//! Experiment definition and trial records
//!
//! An [`Experiment`] names a set of behaviors (one of which is designated the
//! control at run time) and carries the pluggable hooks that drive a trial.
//! Running it yields an [`ExperimentResult`] made of [`Observation`]s.
//!
//! ## Schema Overview
//!
//! ```text
//! Experiment (1) ──run──> ExperimentResult (1 per trial)
//!                              │
//!                              ├── control: Observation
//!                              ├── observations: [control, candidates...]
//!                              ├── ignored ⊆ candidates
//!                              ├── mismatched ⊆ candidates
//!                              └── errors: [ResultError]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use scientist::experiment::Experiment;
//!
//! let experiment = Experiment::builder("widget-permissions")
//!     .control(|| Ok(5))
//!     .candidate(|| Ok(5))
//!     .build();
//!
//! let result = experiment.run("control");
//! assert_eq!(result.control_value(), Some(&5));
//! assert!(!result.has_mismatches());
//! ```

mod definition;
mod observation;
mod result;

pub use definition::{
    BeforeRunFn, BehaviorFn, CleanerFn, ComparatorFn, ErrorReporterFn, Experiment,
    ExperimentBuilder, IgnoreFn, PublisherFn, CANDIDATE_BEHAVIOR, CONTROL_BEHAVIOR,
};
pub use observation::Observation;
pub use result::ExperimentResult;

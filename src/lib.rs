//! # Scientist: Safe Refactoring of Critical Code Paths
//!
//! Run a new ("candidate") implementation alongside the existing ("control")
//! one, compare their outcomes, and report divergences without ever changing
//! what the caller sees. The control's value and error are always what the
//! caller gets back.
//!
//! ## Design Principles
//!
//! - **Fault barrier**: a panicking behavior becomes an error on its
//!   observation; the trial always completes
//! - **Errors as data**: broken comparators, ignore rules, pre-trial hooks and
//!   publishers are recorded on the result, never propagated
//! - **Fail toward surfacing**: a failing comparator counts as a mismatch; a
//!   failing ignore rule never suppresses one
//!
//! ## Example Usage
//!
//! ```rust
//! use scientist::experiment::Experiment;
//!
//! let experiment = Experiment::builder("sum-rewrite")
//!     .control(|| Ok((1..=10).sum::<u32>()))
//!     .candidate(|| Ok(10 * 11 / 2))
//!     .publish(|result| {
//!         if result.has_mismatches() {
//!             eprintln!("{:?}", result.summary());
//!         }
//!         Ok(())
//!     })
//!     .build();
//!
//! let result = experiment.run("control");
//! let value = match result.control_error() {
//!     Some(err) => return Err(err.to_string().into()),
//!     None => result.control_value().copied(),
//! };
//! assert_eq!(value, Some(55));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod experiment;
pub mod observer;
pub mod report;
pub mod runner;

use serde::{Deserialize, Serialize};

pub use error::{Error, Operation, Result, ResultError};
pub use experiment::{Experiment, ExperimentBuilder, ExperimentResult, Observation};

/// How the behaviors of a trial are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Control, then each candidate in registration order, on the calling thread
    #[default]
    Sequential,
    /// Control and candidates in parallel on the rayon pool, joined before comparison
    #[cfg(feature = "rayon")]
    Concurrent,
}

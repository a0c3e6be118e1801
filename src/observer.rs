//! Observer - runs one behavior behind a fault barrier
//!
//! Candidate code is unproven. A panic inside it must never reach the caller
//! of the control path, so every invocation goes through [`fault_barrier`],
//! which turns an unwinding panic into an ordinary [`Error`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::Utc;

use crate::error::{Error, Result};
use crate::experiment::{Experiment, Observation};

/// Observe the behavior registered as `name` on `experiment`.
///
/// A missing behavior yields an observation carrying
/// [`Error::BehaviorNotFound`]; its runtime is the lookup cost.
#[must_use]
pub fn observe<T>(experiment: &Experiment<T>, name: &str) -> Observation<T> {
    let started_at = Utc::now();
    let start = Instant::now();

    let outcome = match experiment.behavior(name) {
        Some(behavior) => fault_barrier(|| behavior()),
        None => Err(Error::BehaviorNotFound {
            behavior: name.to_string(),
            experiment: experiment.name().to_string(),
        }),
    };
    let runtime = start.elapsed();

    tracing::debug!(
        experiment = experiment.name(),
        behavior = name,
        elapsed = ?runtime,
        ok = outcome.is_ok(),
        "behavior observed"
    );

    Observation::new(
        experiment.clone(),
        name.to_string(),
        started_at,
        runtime,
        outcome,
    )
}

/// Run `f`, converting a panic into [`Error`].
///
/// An `Err` returned by `f` becomes [`Error::Behavior`].
///
/// Catching a panic does not silence it: the process panic hook still runs
/// first, so the default hook prints every candidate panic to stderr (with a
/// backtrace when `RUST_BACKTRACE` is set). Hosts that run experiments in
/// production should install their own hook with [`std::panic::set_hook`].
///
/// ```
/// use scientist::observer::fault_barrier;
///
/// std::panic::set_hook(Box::new(|info| {
///     tracing::warn!(panic = %info, "candidate panicked");
/// }));
///
/// let err = fault_barrier::<()>(|| panic!("quiet failure")).unwrap_err();
/// assert_eq!(err.to_string(), "quiet failure");
///
/// drop(std::panic::take_hook());
/// ```
///
/// # Errors
///
/// Returns the error produced by `f`, or the converted panic payload.
pub fn fault_barrier<R>(f: impl FnOnce() -> anyhow::Result<R>) -> Result<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(outcome) => outcome.map_err(Error::Behavior),
        Err(payload) => {
            let error = panic_to_error(payload);
            tracing::warn!(error = %error, "panic caught by fault barrier");
            Err(error)
        }
    }
}

/// Convert a panic payload into an [`Error`].
///
/// Text payloads become [`Error::Panicked`]; error payloads are used as-is.
#[must_use]
pub fn panic_to_error(payload: Box<dyn Any + Send>) -> Error {
    let payload = match payload.downcast::<&'static str>() {
        Ok(text) => return Error::Panicked((*text).to_string()),
        Err(other) => other,
    };
    let payload = match payload.downcast::<String>() {
        Ok(text) => return Error::Panicked(*text),
        Err(other) => other,
    };
    let payload = match payload.downcast::<Error>() {
        Ok(error) => return *error,
        Err(other) => other,
    };
    let payload = match payload.downcast::<anyhow::Error>() {
        Ok(error) => return Error::Behavior(*error),
        Err(other) => other,
    };
    match payload.downcast::<Box<dyn std::error::Error + Send + Sync>>() {
        Ok(error) => Error::Behavior(anyhow::anyhow!(*error)),
        Err(other) => Error::Panicked(describe_payload(&*other)),
    }
}

/// Format primitive payloads such as `panic_any(42)`; other types are opaque.
fn describe_payload(payload: &(dyn Any + Send)) -> String {
    macro_rules! display_as {
        ($($ty:ty),* $(,)?) => {
            $(
                if let Some(value) = payload.downcast_ref::<$ty>() {
                    return format!("panic payload: {value}");
                }
            )*
        };
    }

    display_as!(
        bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    );
    "unknown panic payload".to_string()
}

//! Experiment definition - behaviors plus the hooks that drive a trial

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::ExperimentResult;
use crate::error::ResultError;
use crate::ExecutionMode;

/// Conventional name for the trusted behavior.
pub const CONTROL_BEHAVIOR: &str = "control";

/// Conventional name for a single candidate behavior.
pub const CANDIDATE_BEHAVIOR: &str = "candidate";

/// A zero-argument computation under test.
pub type BehaviorFn<T> = Box<dyn Fn() -> anyhow::Result<T> + Send + Sync>;

/// Decides whether a candidate value matches the control value.
pub type ComparatorFn<T> =
    Box<dyn Fn(Option<&T>, Option<&T>) -> anyhow::Result<bool> + Send + Sync>;

/// Decides whether a known mismatch should be ignored.
pub type IgnoreFn<T> = Box<dyn Fn(Option<&T>, Option<&T>) -> anyhow::Result<bool> + Send + Sync>;

/// Normalizes a value for display.
pub type CleanerFn<T> = Box<dyn Fn(Option<&T>) -> anyhow::Result<serde_json::Value> + Send + Sync>;

/// Runs once before every trial.
pub type BeforeRunFn = Box<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Receives every finished trial.
pub type PublisherFn<T> = Box<dyn Fn(&ExperimentResult<T>) -> anyhow::Result<()> + Send + Sync>;

/// Receives the orchestration errors of a trial, when there are any.
pub type ErrorReporterFn = Box<dyn Fn(&[ResultError]) + Send + Sync>;

struct Inner<T> {
    name: String,
    behaviors: Vec<(String, BehaviorFn<T>)>,
    comparator: ComparatorFn<T>,
    ignores: Vec<IgnoreFn<T>>,
    cleaner: Option<CleanerFn<T>>,
    before_run: Option<BeforeRunFn>,
    publisher: Option<PublisherFn<T>>,
    error_reporter: ErrorReporterFn,
    mode: ExecutionMode,
}

/// A named set of behaviors and the strategies used to compare them.
///
/// Cloning is cheap: clones share the same definition. Every
/// [`Observation`](super::Observation) keeps a clone so consumers can reach
/// the experiment (and its cleaner) from a result.
pub struct Experiment<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Experiment<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Experiment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Experiment")
            .field("name", &self.inner.name)
            .field("behaviors", &self.behavior_names().collect::<Vec<_>>())
            .field("ignores", &self.inner.ignores.len())
            .field("mode", &self.inner.mode)
            .finish_non_exhaustive()
    }
}

impl<T> Experiment<T>
where
    T: PartialEq + Serialize + Send + 'static,
{
    /// Create a builder with equality comparison and a serde_json cleaner.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ExperimentBuilder<T> {
        ExperimentBuilder::new(name, |control: Option<&T>, candidate: Option<&T>| {
            Ok(control == candidate)
        })
        .clean(|value: Option<&T>| Ok(serde_json::to_value(value)?))
    }
}

impl<T: Send + 'static> Experiment<T> {
    /// Create a builder for value types without `PartialEq`.
    ///
    /// No cleaner is installed; configure one with
    /// [`ExperimentBuilder::clean`] if observations need to be displayed.
    #[must_use]
    pub fn builder_with_comparator<F>(
        name: impl Into<String>,
        comparator: F,
    ) -> ExperimentBuilder<T>
    where
        F: Fn(Option<&T>, Option<&T>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        ExperimentBuilder::new(name, comparator)
    }
}

impl<T> Experiment<T> {
    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Get the behavior names in registration order.
    pub fn behavior_names(&self) -> impl Iterator<Item = &str> {
        self.inner.behaviors.iter().map(|(name, _)| name.as_str())
    }

    /// Get the execution mode.
    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        self.inner.mode
    }

    /// Get the number of registered ignore rules.
    #[must_use]
    pub fn ignore_count(&self) -> usize {
        self.inner.ignores.len()
    }

    pub(crate) fn behavior(&self, name: &str) -> Option<&BehaviorFn<T>> {
        self.inner
            .behaviors
            .iter()
            .find(|(registered, _)| registered == name)
            .map(|(_, behavior)| behavior)
    }

    pub(crate) fn comparator(&self) -> &ComparatorFn<T> {
        &self.inner.comparator
    }

    pub(crate) fn ignores(&self) -> &[IgnoreFn<T>] {
        &self.inner.ignores
    }

    pub(crate) fn cleaner(&self) -> Option<&CleanerFn<T>> {
        self.inner.cleaner.as_ref()
    }

    pub(crate) fn before_run_hook(&self) -> Option<&BeforeRunFn> {
        self.inner.before_run.as_ref()
    }

    pub(crate) fn publisher(&self) -> Option<&PublisherFn<T>> {
        self.inner.publisher.as_ref()
    }

    pub(crate) fn error_reporter(&self) -> &ErrorReporterFn {
        &self.inner.error_reporter
    }
}

impl<T: Send + 'static> Experiment<T> {
    /// Run one trial with `control` as the authoritative behavior.
    ///
    /// Never fails: hook failures are collected on the returned result.
    pub fn run(&self, control: &str) -> ExperimentResult<T> {
        crate::runner::run(self, control)
    }
}

/// Builder for `Experiment`.
pub struct ExperimentBuilder<T> {
    name: String,
    behaviors: Vec<(String, BehaviorFn<T>)>,
    comparator: ComparatorFn<T>,
    ignores: Vec<IgnoreFn<T>>,
    cleaner: Option<CleanerFn<T>>,
    before_run: Option<BeforeRunFn>,
    publisher: Option<PublisherFn<T>>,
    error_reporter: ErrorReporterFn,
    mode: ExecutionMode,
}

impl<T> fmt::Debug for ExperimentBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentBuilder")
            .field("name", &self.name)
            .field("behaviors", &self.behaviors.len())
            .field("ignores", &self.ignores.len())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> ExperimentBuilder<T> {
    fn new<F>(name: impl Into<String>, comparator: F) -> Self
    where
        F: Fn(Option<&T>, Option<&T>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            behaviors: Vec::new(),
            comparator: Box::new(comparator),
            ignores: Vec::new(),
            cleaner: None,
            before_run: None,
            publisher: None,
            error_reporter: Box::new(report_with_tracing),
            mode: ExecutionMode::default(),
        }
    }

    /// Register a behavior under `name`.
    ///
    /// Registering an existing name replaces that behavior in place, keeping
    /// its position in the run order.
    ///
    /// The experiment owns its behaviors, so they must be `'static` and cannot
    /// borrow from the caller's stack. Move owned inputs into the closure, or
    /// share them through an `Arc`, and build the experiment where the inputs
    /// are known.
    #[must_use]
    pub fn behavior<F>(mut self, name: impl Into<String>, behavior: F) -> Self
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let name = name.into();
        let behavior: BehaviorFn<T> = Box::new(behavior);
        match self.behaviors.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = behavior,
            None => self.behaviors.push((name, behavior)),
        }
        self
    }

    /// Register the behavior named [`CONTROL_BEHAVIOR`].
    #[must_use]
    pub fn control<F>(self, behavior: F) -> Self
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.behavior(CONTROL_BEHAVIOR, behavior)
    }

    /// Register the behavior named [`CANDIDATE_BEHAVIOR`].
    #[must_use]
    pub fn candidate<F>(self, behavior: F) -> Self
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.behavior(CANDIDATE_BEHAVIOR, behavior)
    }

    /// Replace the comparator.
    #[must_use]
    pub fn compare<F>(mut self, comparator: F) -> Self
    where
        F: Fn(Option<&T>, Option<&T>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.comparator = Box::new(comparator);
        self
    }

    /// Append an ignore rule. Rules run in registration order.
    #[must_use]
    pub fn ignore<F>(mut self, rule: F) -> Self
    where
        F: Fn(Option<&T>, Option<&T>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.ignores.push(Box::new(rule));
        self
    }

    /// Set the cleaner used by [`Observation::cleaned_value`](super::Observation::cleaned_value).
    #[must_use]
    pub fn clean<F>(mut self, cleaner: F) -> Self
    where
        F: Fn(Option<&T>) -> anyhow::Result<serde_json::Value> + Send + Sync + 'static,
    {
        self.cleaner = Some(Box::new(cleaner));
        self
    }

    /// Set the hook run before each trial.
    #[must_use]
    pub fn before_run<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.before_run = Some(Box::new(hook));
        self
    }

    /// Set the publisher. The default discards results.
    #[must_use]
    pub fn publish<F>(mut self, publisher: F) -> Self
    where
        F: Fn(&ExperimentResult<T>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.publisher = Some(Box::new(publisher));
        self
    }

    /// Set the error reporter. The default logs each error at `warn`.
    #[must_use]
    pub fn report_errors<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&[ResultError]) + Send + Sync + 'static,
    {
        self.error_reporter = Box::new(reporter);
        self
    }

    /// Set the execution mode.
    #[must_use]
    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the `Experiment`.
    #[must_use]
    pub fn build(self) -> Experiment<T> {
        Experiment {
            inner: Arc::new(Inner {
                name: self.name,
                behaviors: self.behaviors,
                comparator: self.comparator,
                ignores: self.ignores,
                cleaner: self.cleaner,
                before_run: self.before_run,
                publisher: self.publisher,
                error_reporter: self.error_reporter,
                mode: self.mode,
            }),
        }
    }
}

fn report_with_tracing(errors: &[ResultError]) {
    for error in errors {
        tracing::warn!(
            operation = %error.operation(),
            experiment = error.experiment(),
            error = %error.inner(),
            "experiment hook failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_registration_order() {
        let experiment = Experiment::builder("order")
            .behavior("b", || Ok(2))
            .behavior("a", || Ok(1))
            .behavior("c", || Ok(3))
            .build();

        let names: Vec<_> = experiment.behavior_names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_reregistering_replaces_in_place() {
        let experiment = Experiment::builder("replace")
            .control(|| Ok(1))
            .candidate(|| Ok(2))
            .control(|| Ok(10))
            .build();

        let names: Vec<_> = experiment.behavior_names().collect();
        assert_eq!(names, vec![CONTROL_BEHAVIOR, CANDIDATE_BEHAVIOR]);

        let control = experiment.behavior(CONTROL_BEHAVIOR).unwrap();
        assert_eq!(control().unwrap(), 10);
    }

    #[test]
    fn test_default_comparator_is_equality() {
        let experiment = Experiment::<i32>::builder("eq").build();
        let compare = experiment.comparator();

        assert!(compare(Some(&1), Some(&1)).unwrap());
        assert!(!compare(Some(&1), Some(&2)).unwrap());
        assert!(!compare(Some(&1), None).unwrap());
        assert!(compare(None, None).unwrap());
    }

    #[test]
    fn test_default_cleaner_serializes() {
        let experiment = Experiment::<Vec<u8>>::builder("clean").build();
        let cleaner = experiment.cleaner().expect("default cleaner");

        assert_eq!(cleaner(Some(&vec![1, 2])).unwrap(), serde_json::json!([1, 2]));
        assert_eq!(cleaner(None).unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn test_custom_comparator_has_no_cleaner() {
        struct Opaque(u32);

        let experiment = Experiment::builder_with_comparator("opaque", |a: Option<&Opaque>, b| {
            Ok(a.map(|o| o.0) == b.map(|o| o.0))
        })
        .build();

        assert!(experiment.cleaner().is_none());
        assert!((experiment.comparator())(Some(&Opaque(3)), Some(&Opaque(3))).unwrap());
    }

    #[test]
    fn test_ignore_rules_are_appended() {
        let experiment = Experiment::builder("ignores")
            .control(|| Ok(1))
            .ignore(|_, _| Ok(false))
            .ignore(|_, _| Ok(true))
            .build();

        assert_eq!(experiment.ignore_count(), 2);
        assert_eq!(experiment.ignores().len(), 2);
    }

    #[test]
    fn test_non_sync_values_are_supported() {
        use std::cell::Cell;

        let experiment = Experiment::builder("cell")
            .control(|| Ok(Cell::new(3)))
            .candidate(|| Ok(Cell::new(4)))
            .build();

        let result = experiment.run(CONTROL_BEHAVIOR);

        assert_eq!(result.control_value().map(Cell::get), Some(3));
        assert_eq!(result.mismatched().len(), 1);
    }

    #[test]
    fn test_clones_share_definition() {
        let experiment = Experiment::builder("shared").control(|| Ok(1u8)).build();
        let clone = experiment.clone();

        assert!(Arc::ptr_eq(&experiment.inner, &clone.inner));
        assert_eq!(clone.name(), "shared");
    }
}

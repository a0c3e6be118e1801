//! Tests for error types

use scientist::{Error, Operation, ResultError};

#[test]
fn test_behavior_not_found_error() {
    let error = Error::BehaviorNotFound {
        behavior: "candidate".to_string(),
        experiment: "widget".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Behavior \"candidate\" not found"));
    assert!(error_str.contains("experiment \"widget\""));
}

#[test]
fn test_panicked_error_keeps_text() {
    let error = Error::Panicked("attempt to divide by zero".to_string());
    assert_eq!(format!("{error}"), "attempt to divide by zero");
}

#[test]
fn test_cleaner_missing_error() {
    let error = Error::CleanerMissing("opaque".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("No cleaner configured"));
    assert!(error_str.contains("opaque"));
}

#[test]
fn test_behavior_error_is_transparent() {
    let error: Error = anyhow::anyhow!("upstream timeout").into();
    assert_eq!(format!("{error}"), "upstream timeout");
}

#[test]
fn test_result_error_display() {
    let error = ResultError::new(Operation::Compare, "widget", anyhow::anyhow!("bad shape"));
    let error_str = format!("{error}");
    assert_eq!(error_str, "compare failed for experiment \"widget\"");
}

#[test]
fn test_result_error_chain_prints_source_once() {
    let error = ResultError::new(Operation::Publish, "widget", anyhow::anyhow!("sink down"));
    let chain = format!("{:#}", anyhow::Error::from(error));
    assert_eq!(chain, "publish failed for experiment \"widget\": sink down");
}

#[test]
fn test_result_error_accessors() {
    let error = ResultError::new(Operation::Ignore, "widget", anyhow::anyhow!("rule"));
    assert_eq!(error.operation(), Operation::Ignore);
    assert_eq!(error.experiment(), "widget");
    assert_eq!(error.inner().to_string(), "rule");
}

#[test]
fn test_result_error_from_std_error() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error = ResultError::new(Operation::Publish, "widget", io_error);
    assert!(error.inner().downcast_ref::<std::io::Error>().is_some());
}

#[test]
fn test_error_debug() {
    let error = Error::Panicked("x".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("Panicked"));
}

#[test]
fn test_result_type_alias() {
    #[allow(clippy::unnecessary_wraps)]
    fn returns_result() -> scientist::Result<i32> {
        Ok(42)
    }

    let result = returns_result();
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), 42);
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> scientist::Result<i32> {
        Err(Error::Panicked("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}

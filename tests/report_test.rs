//! Result summary tests

use scientist::experiment::Experiment;
use scientist::report::{ResultErrorSummary, ResultSummary};
use scientist::Operation;

#[test]
fn test_summary_captures_trial() {
    let experiment = Experiment::builder("report")
        .control(|| Ok(1))
        .behavior("same", || Ok(1))
        .behavior("ignored", || Ok(2))
        .behavior("broken", || Err::<i32, _>(anyhow::anyhow!("candidate failed")))
        .ignore(|_, candidate| Ok(candidate == Some(&2)))
        .build();

    let summary = experiment.run("control").summary();

    assert_eq!(summary.experiment, "report");
    assert_eq!(summary.control.value, Some(serde_json::json!(1)));
    assert_eq!(summary.candidates.len(), 3);
    assert_eq!(summary.ignored, vec!["ignored".to_string()]);
    assert_eq!(summary.mismatched, vec!["broken".to_string()]);

    let broken = &summary.candidates[2];
    assert_eq!(broken.name, "broken");
    assert!(broken.value.is_none());
    assert_eq!(broken.error.as_deref(), Some("candidate failed"));
    assert!(!summary.is_clean());
}

#[test]
fn test_summary_errors() {
    let experiment = Experiment::builder("report-errors")
        .control(|| Ok(1))
        .publish(|_| Err(anyhow::anyhow!("sink offline")))
        .report_errors(|_| {})
        .build();

    let summary = experiment.run("control").summary();

    assert_eq!(
        summary.errors,
        vec![ResultErrorSummary {
            operation: Operation::Publish,
            experiment: "report-errors".to_string(),
            message: "sink offline".to_string(),
        }]
    );
    assert!(!summary.is_clean());
}

#[test]
fn test_summary_serialization() {
    let experiment = Experiment::builder("serde")
        .control(|| Ok("a".to_string()))
        .candidate(|| Ok("b".to_string()))
        .build();

    let summary = experiment.run("control").summary();

    let json = serde_json::to_string(&summary).expect("serialization failed");
    let deserialized: ResultSummary = serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(summary, deserialized);
    assert!(json.contains("\"mismatched\":[\"candidate\"]"));
}

#[test]
fn test_summary_inside_publisher() {
    let experiment = Experiment::builder("publish-summary")
        .control(|| Ok(1))
        .candidate(|| Ok(2))
        .publish(|result| {
            let json = serde_json::to_value(result.summary())?;
            anyhow::ensure!(json["mismatched"][0] == "candidate", "unexpected summary");
            Ok(())
        })
        .build();

    let result = experiment.run("control");

    assert!(result.errors().is_empty());
}

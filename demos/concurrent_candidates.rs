//! Concurrent Candidates Example
//!
//! Three candidate implementations of the same aggregation run in parallel
//! with the control. One of them panics on empty input; the fault barrier
//! turns that into an error on its observation and the trial carries on.
//!
//! Run with: RUST_LOG=scientist=debug cargo run --example concurrent_candidates

use scientist::experiment::{Experiment, CONTROL_BEHAVIOR};
use scientist::ExecutionMode;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Scientist: Concurrent Candidates ===\n");

    for input in [vec![3_u64, 5, 7, 9], Vec::new()] {
        let (a, b, c, d) = (input.clone(), input.clone(), input.clone(), input.clone());

        let experiment = Experiment::builder("mean")
            .mode(ExecutionMode::Concurrent)
            .control(move || Ok(a.iter().sum::<u64>().checked_div(a.len() as u64)))
            .behavior("fold", move || {
                let (sum, n) = b.iter().fold((0_u64, 0_u64), |(s, n), x| (s + x, n + 1));
                Ok(if n == 0 { None } else { Some(sum / n) })
            })
            .behavior("unchecked", move || Ok(Some(c.iter().sum::<u64>() / c.len() as u64)))
            .behavior("rounded", move || {
                let (sum, n) = (d.iter().sum::<u64>(), d.len() as u64);
                Ok((n > 0).then(|| (sum + n / 2) / n))
            })
            .ignore(|control, candidate| {
                // Rounding differences of one are expected from "rounded".
                Ok(matches!(
                    (control, candidate),
                    (Some(Some(a)), Some(Some(b))) if a.abs_diff(*b) == 1
                ))
            })
            .build();

        let result = experiment.run(CONTROL_BEHAVIOR);

        println!("input {input:?}: control = {:?}", result.control_value());
        for candidate in result.candidates() {
            let status = if result.mismatched().iter().any(|o| o.name() == candidate.name()) {
                "MISMATCH"
            } else if result.ignored().iter().any(|o| o.name() == candidate.name()) {
                "ignored"
            } else {
                "ok"
            };
            match candidate.outcome() {
                Ok(value) => println!(
                    "   {:<10} {:>8}  {:?}  ({:?})",
                    candidate.name(),
                    status,
                    value,
                    candidate.runtime()
                ),
                Err(err) => println!("   {:<10} {:>8}  error: {err}", candidate.name(), status),
            }
        }
        println!();
    }
}

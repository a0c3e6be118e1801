//! Basic Experiment Example
//!
//! Refactors a permission check: the legacy implementation stays in charge,
//! a rewritten one runs alongside it, and every divergence is published as a
//! JSON summary.
//!
//! Run with: RUST_LOG=debug cargo run --example basic_experiment

use std::collections::HashSet;
use std::sync::Arc;

use scientist::experiment::{Experiment, CONTROL_BEHAVIOR};
use tracing_subscriber::EnvFilter;

/// Legacy implementation: linear scan over a role list
fn legacy_can_edit(user: &str, roles: &[(&str, &str)]) -> bool {
    roles
        .iter()
        .any(|(name, role)| *name == user && (*role == "admin" || *role == "editor"))
}

/// Rewrite: set lookup, but forgets that "owner" implies edit rights too
fn rewritten_can_edit(user: &str, roles: &[(&str, &str)]) -> bool {
    let editors: HashSet<&str> = roles
        .iter()
        .filter(|(_, role)| matches!(*role, "admin" | "editor" | "owner"))
        .map(|(name, _)| *name)
        .collect();
    editors.contains(user)
}

fn can_edit(user: &str) -> anyhow::Result<bool> {
    const ROLES: &[(&str, &str)] = &[
        ("alice", "admin"),
        ("bob", "viewer"),
        ("carol", "owner"),
        ("dave", "editor"),
    ];

    // Behaviors outlive this call, so they share an owned copy of the input.
    let user: Arc<str> = Arc::from(user);
    let (legacy_user, rewritten_user) = (Arc::clone(&user), Arc::clone(&user));

    let experiment = Experiment::builder("can-edit")
        .control(move || Ok(legacy_can_edit(&legacy_user, ROLES)))
        .candidate(move || Ok(rewritten_can_edit(&rewritten_user, ROLES)))
        .publish(move |result| {
            if result.has_mismatches() {
                let summary = result.summary();
                println!("   mismatch for {user}: {}", serde_json::to_string(&summary)?);
            }
            Ok(())
        })
        .build();

    let result = experiment.run(CONTROL_BEHAVIOR);

    // Preserve the original call-site semantics.
    match result.control_error() {
        Some(err) => Err(anyhow::anyhow!("{err}")),
        None => Ok(result.control_value().copied().unwrap_or(false)),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Scientist: Permission Check Refactor ===\n");

    for user in ["alice", "bob", "carol", "dave", "erin"] {
        let allowed = can_edit(user)?;
        println!("{user:>6}: can edit = {allowed}");
    }

    Ok(())
}

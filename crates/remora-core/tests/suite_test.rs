//! Integration tests for the suite orchestrator: per-kind harness flow,
//! fault isolation across kinds, and session persistence.

use std::sync::Arc;

use remora_core::driver::Driver;
use remora_core::hook::HookKind;
use remora_core::scenario::scenario_for;
use remora_core::store::ArtifactStore;
use remora_core::suite::{self, ComparisonOutcome, ModeReport};

use remora_test_utils::StubAgent;

fn driver_with(agent: StubAgent, store: ArtifactStore, working_dir: &std::path::Path) -> Driver {
    Driver::new(
        Arc::new(agent),
        store,
        working_dir,
        "haiku",
        "remora log-event",
    )
}

#[tokio::test]
async fn pre_tool_use_scenario_reaches_compared_with_matching_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path().join("logs"));
    let agent = StubAgent::firing_once(store.clone(), HookKind::PreToolUse);
    let driver = driver_with(agent, store, tmp.path());

    let report = suite::run_kind(&driver, &scenario_for(HookKind::PreToolUse)).await;

    assert!(report.passed());
    assert!(matches!(report.programmatic, ModeReport::Passed { .. }));
    assert!(matches!(report.declarative, ModeReport::Passed { .. }));

    let ComparisonOutcome::Compared(comparison) = &report.comparison else {
        panic!("expected a comparison, got {:?}", report.comparison);
    };
    assert!(comparison.is_clean());
    for field in ["tool_name", "tool_use_id"] {
        let entry = comparison.fields.iter().find(|f| f.field == field).unwrap();
        assert!(entry.matched, "expected {field} to match");
    }
}

#[tokio::test]
async fn best_effort_kind_reports_skips_and_no_comparison() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path().join("logs"));
    let agent = StubAgent::silent(store.clone());
    let driver = driver_with(agent, store, tmp.path());

    let report = suite::run_kind(&driver, &scenario_for(HookKind::Notification)).await;

    assert!(report.passed());
    assert_eq!(report.programmatic, ModeReport::Skipped);
    assert_eq!(report.declarative, ModeReport::Skipped);
    assert!(matches!(report.comparison, ComparisonOutcome::Skipped { .. }));
}

#[tokio::test]
async fn required_kind_failure_is_contained_in_its_report() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path().join("logs"));
    let agent = StubAgent::silent(store.clone());
    let driver = driver_with(agent, store, tmp.path());

    let report = suite::run_kind(&driver, &scenario_for(HookKind::PreToolUse)).await;

    assert!(!report.passed());
    let ModeReport::Failed { error } = &report.programmatic else {
        panic!("expected a programmatic failure");
    };
    assert!(error.contains("did not fire"));
    // The declarative run was still attempted and failed independently.
    assert!(report.declarative.is_failed());
    assert!(matches!(report.comparison, ComparisonOutcome::Skipped { .. }));
}

#[tokio::test]
async fn suite_isolates_failures_across_kinds() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path().join("logs"));
    // The stub only ever fires PreToolUse, so UserPromptSubmit (required)
    // fails while Notification (best-effort) skips and PreToolUse passes.
    let agent = StubAgent::firing_once(store.clone(), HookKind::PreToolUse);
    let driver = driver_with(agent, store, tmp.path());

    let kinds = [
        HookKind::PreToolUse,
        HookKind::UserPromptSubmit,
        HookKind::Notification,
    ];
    let report = suite::run_suite(&driver, &kinds, None).await;

    assert_eq!(report.entries.len(), 3);
    assert!(!report.all_passed());
    assert_eq!(report.failed_kinds(), vec![HookKind::UserPromptSubmit]);

    let pre_tool_use = &report.entries[0];
    assert!(pre_tool_use.passed());
    assert!(matches!(
        pre_tool_use.comparison,
        ComparisonOutcome::Compared(_)
    ));
}

#[tokio::test]
async fn suite_persists_the_observed_session_id() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path().join("logs"));
    let agent = StubAgent::firing_once(store.clone(), HookKind::PreToolUse);
    let driver = driver_with(agent, store, tmp.path());

    let session_file = tmp.path().join(".remora-session");
    let report = suite::run_suite(&driver, &[HookKind::PreToolUse], Some(&session_file)).await;

    assert_eq!(report.session.session_id(), Some("sess-stub-1"));
    assert_eq!(
        std::fs::read_to_string(&session_file).unwrap().trim(),
        "sess-stub-1"
    );
}

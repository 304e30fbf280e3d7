//! The harness orchestrator: sequences driver, validation, comparison,
//! and reporting for one hook kind, and runs the full suite across kinds
//! with per-kind fault isolation.

mod state;

pub use state::HarnessState;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::compare::{self, ComparisonReport};
use crate::driver::{Driver, DriverError, ModeOutcome, ModeRun};
use crate::hook::HookKind;
use crate::scenario::{Scenario, scenario_for};
use crate::session::SessionContext;

/// The outcome of one mode within one kind's harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeReport {
    /// The hook fired, the artifact validated, and its path is recorded.
    Passed { path: PathBuf },
    /// The hook did not fire and the kind is best-effort.
    Skipped,
    /// The run failed; the cause is rendered for the report.
    Failed { error: String },
}

impl ModeReport {
    pub fn is_failed(&self) -> bool {
        matches!(self, ModeReport::Failed { .. })
    }

    fn artifact_path(&self) -> Option<&Path> {
        match self {
            ModeReport::Passed { path } => Some(path),
            _ => None,
        }
    }
}

/// Whether the two modes' artifacts were compared, and why not if not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonOutcome {
    Compared(ComparisonReport),
    /// Not an error: one or both modes produced no artifact.
    Skipped { reason: String },
}

/// The full report for one hook kind. Terminal state is always
/// [`HarnessState::Reported`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindReport {
    pub kind: HookKind,
    pub programmatic: ModeReport,
    pub declarative: ModeReport,
    pub comparison: ComparisonOutcome,
}

impl KindReport {
    /// A kind passes when neither mode failed. Best-effort skips count as
    /// passing; a comparison mismatch is reported but does not fail the
    /// kind (the two code paths may legitimately observe e.g. different
    /// tool-use ids).
    pub fn passed(&self) -> bool {
        !self.programmatic.is_failed() && !self.declarative.is_failed()
    }
}

/// The aggregated report for a full-suite run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    pub entries: Vec<KindReport>,
    /// The session context after folding in every observed session id.
    pub session: SessionContext,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.entries.iter().all(|e| e.passed())
    }

    pub fn failed_kinds(&self) -> Vec<HookKind> {
        self.entries
            .iter()
            .filter(|e| !e.passed())
            .map(|e| e.kind)
            .collect()
    }
}

fn mode_report(result: &Result<ModeRun, DriverError>) -> ModeReport {
    match result {
        Ok(run) => match &run.outcome {
            ModeOutcome::Captured { path, .. } => ModeReport::Passed { path: path.clone() },
            ModeOutcome::DidNotFire => ModeReport::Skipped,
        },
        Err(e) => ModeReport::Failed {
            error: format!("{e}"),
        },
    }
}

/// Run the full harness for one hook kind.
///
/// Both modes are always attempted -- a programmatic failure never
/// suppresses the declarative run -- and no error escapes: every failure
/// is folded into the returned report.
pub async fn run_kind(driver: &Driver, scenario: &Scenario) -> KindReport {
    let mut session = SessionContext::default();
    run_kind_with_session(driver, scenario, &mut session).await
}

async fn run_kind_with_session(
    driver: &Driver,
    scenario: &Scenario,
    session: &mut SessionContext,
) -> KindReport {
    let kind = scenario.kind;
    let mut state = HarnessState::Pending;

    state.advance(HarnessState::ProgrammaticRunning);
    let prog_result = driver.run_programmatic(scenario).await;
    match &prog_result {
        Ok(run) => *session = session.with_session_id(run.session_id.clone()),
        Err(e) => warn!(kind = %kind, error = %e, "programmatic run failed"),
    }

    state.advance(HarnessState::DeclarativeRunning);
    let decl_result = driver.run_declarative(scenario).await;
    match &decl_result {
        Ok(run) => *session = session.with_session_id(run.session_id.clone()),
        Err(e) => warn!(kind = %kind, error = %e, "declarative run failed"),
    }

    let programmatic = mode_report(&prog_result);
    let declarative = mode_report(&decl_result);

    // Comparison only happens when both modes produced an artifact;
    // anything else is a documented skip, not an error.
    let comparison = match (programmatic.artifact_path(), declarative.artifact_path()) {
        (Some(path_a), Some(path_b)) => {
            state.advance(HarnessState::Compared);
            match compare::compare(driver.store(), path_a, path_b) {
                Ok(report) => ComparisonOutcome::Compared(report),
                Err(e) => ComparisonOutcome::Skipped {
                    reason: format!("comparison failed: {e}"),
                },
            }
        }
        _ => ComparisonOutcome::Skipped {
            reason: "one or both modes produced no artifact".to_string(),
        },
    };

    state.advance(HarnessState::Reported);

    KindReport {
        kind,
        programmatic,
        declarative,
        comparison,
    }
}

/// Run the harness for every kind in `kinds`, sequentially.
///
/// A failure in one kind never aborts the others. The session context is
/// loaded from `session_file` up front, updated with the newest observed
/// session id, and saved back at the end.
pub async fn run_suite(
    driver: &Driver,
    kinds: &[HookKind],
    session_file: Option<&Path>,
) -> SuiteReport {
    let mut session = match session_file {
        Some(path) => SessionContext::load(path),
        None => SessionContext::default(),
    };

    let mut entries = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let scenario = scenario_for(kind);
        info!(kind = %kind, "running hook harness");
        entries.push(run_kind_with_session(driver, &scenario, &mut session).await);
    }

    if let Some(path) = session_file {
        if let Err(e) = session.save(path) {
            warn!(error = %e, "failed to persist session context");
        }
    }

    SuiteReport { entries, session }
}

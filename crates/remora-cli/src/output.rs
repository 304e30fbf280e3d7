//! Terminal rendering for harness reports.

use remora_core::compare::{ComparisonReport, render_value};
use remora_core::hook::ValidationReport;
use remora_core::suite::{ComparisonOutcome, KindReport, ModeReport, SuiteReport};

const RULE_WIDTH: usize = 60;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn thin_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

pub fn print_header(kind: &str, description: &str) {
    println!("{}", rule());
    println!("Testing {kind} Hook");
    println!("{}", rule());
    println!("\nDescription: {description}\n");
}

/// Per-field validation lines, the way a run prints them after capture.
pub fn print_validation(report: &ValidationReport, type_name: &str) {
    println!("\n  Type Validation ({type_name}):");
    for field in &report.fields {
        let icon = if field.valid { "✓" } else { "✗" };
        let suffix = if field.optional { " (optional)" } else { "" };
        println!(
            "    {icon} {}: {} = {}{suffix}",
            field.field, field.expected, field.actual
        );
    }
}

/// Side-by-side comparison of the two modes' artifacts.
pub fn print_comparison(report: &ComparisonReport) {
    println!("\n{}", rule());
    println!("Comparison Results");
    println!("{}", rule());

    for field in &report.fields {
        if field.matched {
            println!(
                "  {}: {}",
                field.field,
                render_value(field.programmatic.as_ref())
            );
        } else {
            println!("  {}: DIFFERS", field.field);
            println!(
                "    programmatic: {}",
                render_value(field.programmatic.as_ref())
            );
            println!(
                "    declarative:  {}",
                render_value(field.declarative.as_ref())
            );
        }
    }

    println!("\n{}", thin_rule());
    println!(
        "Summary: {} matching, {} different",
        report.match_count(),
        report.mismatch_count()
    );
    println!("{}\n", thin_rule());
}

fn mode_line(report: &ModeReport) -> String {
    match report {
        ModeReport::Passed { .. } => "PASSED".to_string(),
        ModeReport::Skipped => "SKIPPED (hook did not fire; expected for this kind)".to_string(),
        ModeReport::Failed { .. } => "FAILED".to_string(),
    }
}

/// Print one kind's full report: mode outcomes, comparison, errors.
pub fn print_kind_report(report: &KindReport) {
    match &report.comparison {
        ComparisonOutcome::Compared(comparison) => print_comparison(comparison),
        ComparisonOutcome::Skipped { reason } => {
            println!("\n  Comparison skipped: {reason}");
        }
    }

    println!("{}", rule());
    println!("Summary:");
    println!("  Programmatic: {}", mode_line(&report.programmatic));
    println!("  Declarative:  {}", mode_line(&report.declarative));

    if let ModeReport::Failed { error } = &report.programmatic {
        println!("\nProgrammatic error: {error}");
    }
    if let ModeReport::Failed { error } = &report.declarative {
        println!("\nDeclarative error: {error}");
    }
}

/// Print the aggregated suite table.
pub fn print_suite_report(report: &SuiteReport) {
    println!("\n{}", rule());
    println!("Suite Summary");
    println!("{}", rule());

    for entry in &report.entries {
        let status = if entry.passed() { "PASS" } else { "FAIL" };
        println!(
            "  {status}  {:<18} programmatic: {:<8} declarative: {}",
            entry.kind.as_str(),
            short_mode(&entry.programmatic),
            short_mode(&entry.declarative),
        );
    }

    if let Some(session_id) = report.session.session_id() {
        println!("\nSession: {session_id}");
    }

    let failed = report.failed_kinds();
    if failed.is_empty() {
        println!("\nAll hook kinds passed.");
    } else {
        let names: Vec<&str> = failed.iter().map(|k| k.as_str()).collect();
        println!("\nFailed kinds: {}", names.join(", "));
    }
}

fn short_mode(report: &ModeReport) -> &'static str {
    match report {
        ModeReport::Passed { .. } => "passed",
        ModeReport::Skipped => "skipped",
        ModeReport::Failed { .. } => "failed",
    }
}

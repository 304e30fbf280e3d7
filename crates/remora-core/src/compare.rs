//! Field-by-field equivalence comparison between a programmatic and a
//! declarative artifact for the same hook kind.

use std::path::Path;

use serde_json::Value;

use crate::store::{ArtifactStore, StoreError};

/// The fields compared between the two modes, in report order.
///
/// This is the union of comparable fields across all hook kinds, not just
/// the current kind's -- fields absent from both artifacts are skipped at
/// comparison time. `capture_mode` and `logged_at` are deliberately not
/// listed: they differ between runs by construction.
pub const COMPARED_FIELDS: [&str; 21] = [
    "session_id",
    "transcript_path",
    "cwd",
    "permission_mode",
    "hook_event_name",
    "tool_name",
    "tool_input",
    "tool_response",
    "tool_use_id",
    "prompt",
    "source",
    "message",
    "title",
    "notification_type",
    "agent_id",
    "agent_type",
    "agent_transcript_path",
    "stop_hook_active",
    "trigger",
    "custom_instructions",
    "reason",
];

/// One compared field: the value under each mode and whether they agree.
///
/// `None` means the field was absent on that side; a field present on
/// exactly one side is a mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldComparison {
    pub field: &'static str,
    pub programmatic: Option<Value>,
    pub declarative: Option<Value>,
    pub matched: bool,
}

/// The ordered comparison result for one artifact pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonReport {
    pub fields: Vec<FieldComparison>,
}

impl ComparisonReport {
    pub fn match_count(&self) -> usize {
        self.fields.iter().filter(|f| f.matched).count()
    }

    pub fn mismatch_count(&self) -> usize {
        self.fields.iter().filter(|f| !f.matched).count()
    }

    /// True when every compared field agreed.
    pub fn is_clean(&self) -> bool {
        self.mismatch_count() == 0
    }

    pub fn mismatched_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| !f.matched)
            .map(|f| f.field)
            .collect()
    }
}

/// Compare the programmatic artifact at `path_a` against the declarative
/// artifact at `path_b`.
///
/// Equality is structural over the parsed JSON values: key-order
/// insensitive for objects, order sensitive for arrays, exact for
/// numbers. Fields absent on both sides are skipped entirely.
pub fn compare(
    store: &ArtifactStore,
    path_a: &Path,
    path_b: &Path,
) -> Result<ComparisonReport, StoreError> {
    let programmatic = store.read(path_a)?;
    let declarative = store.read(path_b)?;
    Ok(compare_payloads(&programmatic, &declarative))
}

/// Compare two already-loaded artifact payloads.
pub fn compare_payloads(programmatic: &Value, declarative: &Value) -> ComparisonReport {
    let fields = COMPARED_FIELDS
        .iter()
        .filter_map(|&field| {
            let prog = programmatic.get(field).cloned();
            let decl = declarative.get(field).cloned();
            if prog.is_none() && decl.is_none() {
                return None;
            }
            let matched = prog == decl;
            Some(FieldComparison {
                field,
                programmatic: prog,
                declarative: decl,
                matched,
            })
        })
        .collect();

    ComparisonReport { fields }
}

/// Render a compared value for display, truncating long content.
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None => "(absent)".to_string(),
        Some(Value::Null) => "(null)".to_string(),
        Some(Value::String(s)) => {
            if s.chars().count() > 50 {
                let prefix: String = s.chars().take(47).collect();
                format!("\"{prefix}...\"")
            } else {
                format!("\"{s}\"")
            }
        }
        Some(other) => {
            let rendered = other.to_string();
            if rendered.chars().count() > 50 {
                let prefix: String = rendered.chars().take(47).collect();
                format!("{prefix}...")
            } else {
                rendered
            }
        }
    }
}

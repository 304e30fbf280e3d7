//! Schema validation of captured hook artifacts.

use serde_json::Value;

use super::schema::spec_for;
use super::HookKind;

/// The outcome of checking one field against its specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOutcome {
    pub field: &'static str,
    /// Expected-shape text, e.g. `'manual' | 'auto'`.
    pub expected: String,
    /// The actual value, rendered for display.
    pub actual: String,
    pub valid: bool,
    pub optional: bool,
}

/// The full validation result for one artifact: per-field outcomes in
/// spec order, plus the overall verdict (AND over non-optional fields).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub fields: Vec<FieldOutcome>,
}

impl ValidationReport {
    /// Names of non-optional fields that failed their check.
    pub fn failed_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| !f.optional && !f.valid)
            .map(|f| f.field)
            .collect()
    }
}

/// Validate `payload` against the field specification for `kind`.
///
/// Missing fields are checked with an explicit absent sentinel rather than
/// erroring; extra fields not named by the spec are ignored.
pub fn validate(kind: HookKind, payload: &Value) -> ValidationReport {
    let fields: Vec<FieldOutcome> = spec_for(kind)
        .iter()
        .map(|spec| {
            let value = payload.get(spec.name);
            FieldOutcome {
                field: spec.name,
                expected: spec.shape.expected(),
                actual: render_value(value),
                valid: spec.check(value),
                optional: spec.optional,
            }
        })
        .collect();

    let valid = fields.iter().filter(|f| !f.optional).all(|f| f.valid);
    ValidationReport { valid, fields }
}

/// Render a field value for display, truncating long strings.
fn render_value(value: Option<&Value>) -> String {
    match value {
        None => "absent".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => format!("\"{}\"", truncate(s, 30)),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => "[object]".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let prefix: String = s.chars().take(max).collect();
        format!("{prefix}...")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pre_tool_use_payload() -> Value {
        json!({
            "session_id": "sess-1",
            "transcript_path": "/tmp/transcript.jsonl",
            "cwd": "/work",
            "permission_mode": "default",
            "hook_event_name": "PreToolUse",
            "tool_name": "Read",
            "tool_input": {"file_path": "Hooks.md"},
            "tool_use_id": "toolu_01",
        })
    }

    #[test]
    fn valid_payload_passes() {
        let report = validate(HookKind::PreToolUse, &pre_tool_use_payload());
        assert!(report.valid, "failed fields: {:?}", report.failed_fields());
        assert!(report.fields.iter().all(|f| f.valid));
    }

    #[test]
    fn removing_any_required_field_flips_the_verdict() {
        let payload = pre_tool_use_payload();
        for spec in spec_for(HookKind::PreToolUse) {
            if spec.optional {
                continue;
            }
            let mut stripped = payload.clone();
            stripped.as_object_mut().unwrap().remove(spec.name);
            let report = validate(HookKind::PreToolUse, &stripped);
            assert!(!report.valid, "expected invalid after removing {}", spec.name);
            assert_eq!(report.failed_fields(), vec![spec.name]);
        }
    }

    #[test]
    fn removing_an_optional_field_does_not() {
        let mut payload = pre_tool_use_payload();
        payload.as_object_mut().unwrap().remove("permission_mode");
        let report = validate(HookKind::PreToolUse, &payload);
        assert!(report.valid);
        let outcome = report
            .fields
            .iter()
            .find(|f| f.field == "permission_mode")
            .unwrap();
        // Absent is fine for an optional field, and rendered as such.
        assert!(outcome.valid);
        assert_eq!(outcome.actual, "absent");
    }

    #[test]
    fn optional_but_present_field_is_still_checked() {
        let mut payload = pre_tool_use_payload();
        payload["permission_mode"] = json!(42);
        let report = validate(HookKind::PreToolUse, &payload);
        // Wrong-typed optional field is reported invalid but does not flip
        // the overall verdict.
        assert!(report.valid);
        let outcome = report
            .fields
            .iter()
            .find(|f| f.field == "permission_mode")
            .unwrap();
        assert!(!outcome.valid);
    }

    #[test]
    fn wrong_discriminant_fails() {
        let mut payload = pre_tool_use_payload();
        payload["hook_event_name"] = json!("PostToolUse");
        let report = validate(HookKind::PreToolUse, &payload);
        assert!(!report.valid);
        assert_eq!(report.failed_fields(), vec!["hook_event_name"]);
    }

    #[test]
    fn unknown_extra_fields_are_ignored() {
        let mut payload = pre_tool_use_payload();
        payload["totally_new_field"] = json!({"agent": "defined"});
        let report = validate(HookKind::PreToolUse, &payload);
        assert!(report.valid);
        assert!(report.fields.iter().all(|f| f.field != "totally_new_field"));
    }

    #[test]
    fn pre_compact_accepts_null_custom_instructions() {
        let payload = json!({
            "session_id": "sess-1",
            "transcript_path": "/tmp/t.jsonl",
            "cwd": "/work",
            "hook_event_name": "PreCompact",
            "trigger": "auto",
            "custom_instructions": null,
        });
        let report = validate(HookKind::PreCompact, &payload);
        assert!(report.valid, "failed fields: {:?}", report.failed_fields());
    }

    #[test]
    fn long_strings_are_truncated_in_rendering() {
        let long = "x".repeat(64);
        let rendered = render_value(Some(&json!(long)));
        assert!(rendered.len() < 40);
        assert!(rendered.ends_with("...\""));
    }

    #[test]
    fn outcomes_preserve_spec_order() {
        let report = validate(HookKind::SubagentStop, &json!({}));
        let names: Vec<&str> = report.fields.iter().map(|f| f.field).collect();
        let expected: Vec<&str> = spec_for(HookKind::SubagentStop)
            .iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, expected);
    }
}

//! Per-kind field specifications for hook artifacts.
//!
//! Every artifact carries a common base set of fields (session identity and
//! environment) followed by the `hook_event_name` discriminant and the
//! kind-specific extension set. [`spec_for`] returns the union in a fixed
//! order; unknown extra fields in a payload are ignored, never flagged.

use serde_json::Value;

use super::HookKind;

/// The expected shape of one artifact field.
///
/// `Any` exists for payload-shaped fields whose structure is agent-defined
/// and not worth constraining (tool inputs and responses).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// Any JSON string.
    Str,
    /// A JSON boolean.
    Bool,
    /// Any value at all, as long as the field is present.
    Any,
    /// A string drawn from a fixed set of allowed values.
    OneOf(&'static [&'static str]),
    /// Exactly this string.
    Literal(&'static str),
    /// A string or an explicit JSON null.
    StrOrNull,
}

impl FieldShape {
    /// Whether `value` satisfies this shape. `None` is the explicit
    /// "absent" sentinel for a missing field.
    pub fn accepts(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (_, None) => false,
            (FieldShape::Str, Some(v)) => v.is_string(),
            (FieldShape::Bool, Some(v)) => v.is_boolean(),
            (FieldShape::Any, Some(_)) => true,
            (FieldShape::OneOf(allowed), Some(v)) => {
                v.as_str().is_some_and(|s| allowed.contains(&s))
            }
            (FieldShape::Literal(expected), Some(v)) => v.as_str() == Some(*expected),
            (FieldShape::StrOrNull, Some(v)) => v.is_string() || v.is_null(),
        }
    }

    /// Human-readable expected-shape text for validation reports.
    pub fn expected(&self) -> String {
        match self {
            FieldShape::Str => "string".to_string(),
            FieldShape::Bool => "boolean".to_string(),
            FieldShape::Any => "unknown".to_string(),
            FieldShape::OneOf(allowed) => allowed
                .iter()
                .map(|v| format!("'{v}'"))
                .collect::<Vec<_>>()
                .join(" | "),
            FieldShape::Literal(expected) => format!("'{expected}'"),
            FieldShape::StrOrNull => "string | null".to_string(),
        }
    }
}

/// Specification for one field of a hook artifact.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub shape: FieldShape,
    /// Optional fields may be absent; when present they are still
    /// shape-checked and reported, but excluded from the overall verdict.
    pub optional: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, shape: FieldShape) -> Self {
        Self {
            name,
            shape,
            optional: false,
        }
    }

    const fn opt(name: &'static str, shape: FieldShape) -> Self {
        Self {
            name,
            shape,
            optional: true,
        }
    }

    /// Whether `value` passes this spec. Absent is acceptable only for
    /// optional fields.
    pub fn check(&self, value: Option<&Value>) -> bool {
        match value {
            None => self.optional,
            Some(_) => self.shape.accepts(value),
        }
    }
}

/// Fields present on every hook artifact, regardless of kind.
const BASE_FIELDS: [FieldSpec; 4] = [
    FieldSpec::required("session_id", FieldShape::Str),
    FieldSpec::required("transcript_path", FieldShape::Str),
    FieldSpec::required("cwd", FieldShape::Str),
    FieldSpec::opt("permission_mode", FieldShape::Str),
];

/// The full, ordered field specification for one hook kind: base fields,
/// then the `hook_event_name` discriminant, then kind-specific fields.
pub fn spec_for(kind: HookKind) -> Vec<FieldSpec> {
    let mut specs: Vec<FieldSpec> = BASE_FIELDS.to_vec();
    specs.push(FieldSpec::required(
        "hook_event_name",
        FieldShape::Literal(kind.as_str()),
    ));

    match kind {
        HookKind::SessionStart => {
            specs.push(FieldSpec::required(
                "source",
                FieldShape::OneOf(&["startup", "resume", "clear", "compact"]),
            ));
        }
        HookKind::SessionEnd => {
            specs.push(FieldSpec::required("reason", FieldShape::Str));
        }
        HookKind::PreToolUse => {
            specs.push(FieldSpec::required("tool_name", FieldShape::Str));
            specs.push(FieldSpec::required("tool_input", FieldShape::Any));
            specs.push(FieldSpec::required("tool_use_id", FieldShape::Str));
        }
        HookKind::PostToolUse => {
            specs.push(FieldSpec::required("tool_name", FieldShape::Str));
            specs.push(FieldSpec::required("tool_input", FieldShape::Any));
            specs.push(FieldSpec::required("tool_response", FieldShape::Any));
            specs.push(FieldSpec::required("tool_use_id", FieldShape::Str));
        }
        HookKind::PermissionRequest => {
            specs.push(FieldSpec::required("tool_name", FieldShape::Str));
            specs.push(FieldSpec::required("tool_input", FieldShape::Any));
            specs.push(FieldSpec::opt("permission_suggestions", FieldShape::Any));
        }
        HookKind::Notification => {
            specs.push(FieldSpec::required("message", FieldShape::Str));
            specs.push(FieldSpec::opt("title", FieldShape::Str));
            specs.push(FieldSpec::required("notification_type", FieldShape::Str));
        }
        HookKind::UserPromptSubmit => {
            specs.push(FieldSpec::required("prompt", FieldShape::Str));
        }
        HookKind::Stop => {
            specs.push(FieldSpec::required("stop_hook_active", FieldShape::Bool));
        }
        HookKind::SubagentStart => {
            specs.push(FieldSpec::required("agent_id", FieldShape::Str));
            specs.push(FieldSpec::required("agent_type", FieldShape::Str));
        }
        HookKind::SubagentStop => {
            specs.push(FieldSpec::required("stop_hook_active", FieldShape::Bool));
            specs.push(FieldSpec::required("agent_id", FieldShape::Str));
            specs.push(FieldSpec::required("agent_transcript_path", FieldShape::Str));
        }
        HookKind::PreCompact => {
            specs.push(FieldSpec::required(
                "trigger",
                FieldShape::OneOf(&["manual", "auto"]),
            ));
            specs.push(FieldSpec::required("custom_instructions", FieldShape::StrOrNull));
        }
    }

    specs
}

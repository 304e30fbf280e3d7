//! Typed hook artifact records.
//!
//! [`HookEvent`] is the kind-tagged record form of an artifact payload:
//! the `hook_event_name` discriminant selects the variant and each
//! variant carries its kind-specific fields, with optionality explicit in
//! the types. Decoding happens once, at the read boundary, right after
//! the schema check; downstream code pattern-matches instead of digging
//! through raw JSON. Agent-defined payload bodies (tool inputs and
//! responses) stay as [`Value`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::HookKind;

/// Fields present on every hook artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseFields {
    pub session_id: String,
    pub transcript_path: String,
    pub cwd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_mode: Option<String>,
}

/// One captured hook firing, in typed form.
///
/// Unknown extra fields (including the store's `capture_mode` and
/// `logged_at` bookkeeping) are ignored when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hook_event_name")]
pub enum HookEvent {
    SessionStart {
        #[serde(flatten)]
        base: BaseFields,
        source: String,
    },
    SessionEnd {
        #[serde(flatten)]
        base: BaseFields,
        reason: String,
    },
    PreToolUse {
        #[serde(flatten)]
        base: BaseFields,
        tool_name: String,
        tool_input: Value,
        tool_use_id: String,
    },
    PostToolUse {
        #[serde(flatten)]
        base: BaseFields,
        tool_name: String,
        tool_input: Value,
        tool_response: Value,
        tool_use_id: String,
    },
    PermissionRequest {
        #[serde(flatten)]
        base: BaseFields,
        tool_name: String,
        tool_input: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        permission_suggestions: Option<Value>,
    },
    Notification {
        #[serde(flatten)]
        base: BaseFields,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        notification_type: String,
    },
    UserPromptSubmit {
        #[serde(flatten)]
        base: BaseFields,
        prompt: String,
    },
    Stop {
        #[serde(flatten)]
        base: BaseFields,
        stop_hook_active: bool,
    },
    SubagentStart {
        #[serde(flatten)]
        base: BaseFields,
        agent_id: String,
        agent_type: String,
    },
    SubagentStop {
        #[serde(flatten)]
        base: BaseFields,
        stop_hook_active: bool,
        agent_id: String,
        agent_transcript_path: String,
    },
    PreCompact {
        #[serde(flatten)]
        base: BaseFields,
        trigger: String,
        /// `null` in the payload decodes to `None`.
        custom_instructions: Option<String>,
    },
}

impl HookEvent {
    /// Decode a raw artifact payload into its typed form.
    pub fn from_value(payload: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(payload.clone())
    }

    /// The event kind this record is tagged with.
    pub fn kind(&self) -> HookKind {
        match self {
            HookEvent::SessionStart { .. } => HookKind::SessionStart,
            HookEvent::SessionEnd { .. } => HookKind::SessionEnd,
            HookEvent::PreToolUse { .. } => HookKind::PreToolUse,
            HookEvent::PostToolUse { .. } => HookKind::PostToolUse,
            HookEvent::PermissionRequest { .. } => HookKind::PermissionRequest,
            HookEvent::Notification { .. } => HookKind::Notification,
            HookEvent::UserPromptSubmit { .. } => HookKind::UserPromptSubmit,
            HookEvent::Stop { .. } => HookKind::Stop,
            HookEvent::SubagentStart { .. } => HookKind::SubagentStart,
            HookEvent::SubagentStop { .. } => HookKind::SubagentStop,
            HookEvent::PreCompact { .. } => HookKind::PreCompact,
        }
    }

    /// The common fields shared by every variant.
    pub fn base(&self) -> &BaseFields {
        match self {
            HookEvent::SessionStart { base, .. }
            | HookEvent::SessionEnd { base, .. }
            | HookEvent::PreToolUse { base, .. }
            | HookEvent::PostToolUse { base, .. }
            | HookEvent::PermissionRequest { base, .. }
            | HookEvent::Notification { base, .. }
            | HookEvent::UserPromptSubmit { base, .. }
            | HookEvent::Stop { base, .. }
            | HookEvent::SubagentStart { base, .. }
            | HookEvent::SubagentStop { base, .. }
            | HookEvent::PreCompact { base, .. } => base,
        }
    }

    /// The tool this firing concerns, for the kinds that carry one.
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            HookEvent::PreToolUse { tool_name, .. }
            | HookEvent::PostToolUse { tool_name, .. }
            | HookEvent::PermissionRequest { tool_name, .. } => Some(tool_name),
            _ => None,
        }
    }

    /// One-line description of the firing for log and report output.
    pub fn summary(&self) -> String {
        match self {
            HookEvent::SessionStart { source, .. } => format!("session started ({source})"),
            HookEvent::SessionEnd { reason, .. } => format!("session ended ({reason})"),
            HookEvent::PreToolUse { tool_name, .. } => format!("before {tool_name} tool use"),
            HookEvent::PostToolUse { tool_name, .. } => format!("after {tool_name} tool use"),
            HookEvent::PermissionRequest { tool_name, .. } => {
                format!("permission requested for {tool_name}")
            }
            HookEvent::Notification { message, .. } => format!("notification: {message}"),
            HookEvent::UserPromptSubmit { .. } => "user prompt submitted".to_string(),
            HookEvent::Stop { .. } => "agent stopped".to_string(),
            HookEvent::SubagentStart { agent_type, .. } => {
                format!("subagent started ({agent_type})")
            }
            HookEvent::SubagentStop { agent_id, .. } => format!("subagent {agent_id} stopped"),
            HookEvent::PreCompact { trigger, .. } => format!("compaction pending ({trigger})"),
        }
    }
}

//! The closed set of hook event kinds, plus capture-mode and firing-policy
//! tags used throughout the harness.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A lifecycle moment in the external agent's execution that can be
/// observed or intercepted.
///
/// The set is fixed: these are the 11 hook events the agent contract
/// defines. Wire names (as they appear in `hook_event_name` fields and in
/// artifact filenames) are the PascalCase strings from [`HookKind::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookKind {
    SessionStart,
    SessionEnd,
    PreToolUse,
    PostToolUse,
    PermissionRequest,
    Notification,
    UserPromptSubmit,
    Stop,
    SubagentStart,
    SubagentStop,
    PreCompact,
}

/// Whether a hook kind must fire under its scenario, or is allowed to stay
/// silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringPolicy {
    /// The scenario deterministically triggers this hook; a run with no
    /// artifact is a failure.
    Required,
    /// The hook cannot be triggered reliably in a short scripted run
    /// (needs an interrupt, a long context, or an SDK-side notification);
    /// a run with no artifact is an informational skip.
    BestEffort,
}

impl HookKind {
    /// All kinds, in the order the suite runs them.
    pub const ALL: [HookKind; 11] = [
        HookKind::SessionStart,
        HookKind::SessionEnd,
        HookKind::UserPromptSubmit,
        HookKind::PreToolUse,
        HookKind::PostToolUse,
        HookKind::PermissionRequest,
        HookKind::SubagentStart,
        HookKind::SubagentStop,
        HookKind::Notification,
        HookKind::Stop,
        HookKind::PreCompact,
    ];

    /// The wire name, as it appears in `hook_event_name` and filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::SessionStart => "SessionStart",
            HookKind::SessionEnd => "SessionEnd",
            HookKind::PreToolUse => "PreToolUse",
            HookKind::PostToolUse => "PostToolUse",
            HookKind::PermissionRequest => "PermissionRequest",
            HookKind::Notification => "Notification",
            HookKind::UserPromptSubmit => "UserPromptSubmit",
            HookKind::Stop => "Stop",
            HookKind::SubagentStart => "SubagentStart",
            HookKind::SubagentStop => "SubagentStop",
            HookKind::PreCompact => "PreCompact",
        }
    }

    /// Firing policy under this kind's standard scenario.
    ///
    /// Stop needs a manual interrupt, PreCompact a near-full context, and
    /// Notification an SDK-side notification; none of those can be staged
    /// in a short scripted run.
    pub fn firing_policy(&self) -> FiringPolicy {
        match self {
            HookKind::Notification | HookKind::Stop | HookKind::PreCompact => {
                FiringPolicy::BestEffort
            }
            _ => FiringPolicy::Required,
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown hook kind: {s}"))
    }
}

/// How a hook artifact was captured: via an in-process callback registered
/// for one invocation, or via the declarative settings file the agent
/// reads itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Programmatic,
    Declarative,
}

impl CaptureMode {
    /// The tag embedded in artifact filenames and payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Programmatic => "programmatic",
            CaptureMode::Declarative => "declarative",
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "programmatic" => Ok(CaptureMode::Programmatic),
            "declarative" => Ok(CaptureMode::Declarative),
            other => Err(format!("unknown capture mode: {other}")),
        }
    }
}

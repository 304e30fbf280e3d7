//! Shared types for the agent adapter layer.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::hook::HookKind;

/// A typed message from the agent's output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentMessage {
    /// Assistant text content.
    Assistant { text: String },
    /// Session metadata emitted at startup.
    SessionInfo { session_id: String },
    /// The final result of the run.
    Result { text: String, is_error: bool },
    /// An error reported by the agent.
    Error { message: String },
    /// The stream is exhausted; always the last message.
    Completed,
}

/// Where the agent loads its declarative settings from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    /// `.claude/settings.json` under the working directory.
    Project,
}

impl SettingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingSource::Project => "project",
        }
    }
}

/// An in-process callback invoked by the adapter each time the subscribed
/// hook kind fires during one invocation.
pub type HookCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// A per-invocation hook registration: one kind, one callback.
#[derive(Clone)]
pub struct HookSubscription {
    pub kind: HookKind,
    pub callback: HookCallback,
}

impl std::fmt::Debug for HookSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookSubscription")
            .field("kind", &self.kind)
            .finish()
    }
}

/// One agent invocation: the prompt plus every option the harness controls.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub prompt: String,
    pub working_dir: PathBuf,
    pub model: String,
    pub max_turns: u32,
    /// Tool allow-list for the run.
    pub allowed_tools: Vec<String>,
    /// Declarative configuration sources the agent should load. Empty in
    /// programmatic mode so the run is isolated from any settings file.
    pub setting_sources: Vec<SettingSource>,
    /// Hook callbacks registered for this invocation only.
    pub hooks: Vec<HookSubscription>,
}

impl QueryRequest {
    pub fn new(prompt: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompt: prompt.into(),
            working_dir: working_dir.into(),
            model: "haiku".to_string(),
            max_turns: 3,
            allowed_tools: Vec::new(),
            setting_sources: Vec::new(),
            hooks: Vec::new(),
        }
    }
}

/// Handle to a spawned agent run, used to obtain its message stream.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    /// Adapter-scoped identifier (the OS pid for subprocess adapters).
    pub id: u64,
    pub agent_name: String,
}

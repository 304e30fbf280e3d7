//! Shared test utilities for remora integration tests.
//!
//! Provides [`StubAgent`], a scriptable in-process [`Agent`] implementation,
//! and canned valid hook payloads per kind. The stub honors the same
//! observable contract as a real adapter: registered callbacks fire while
//! the message stream is drained, and declarative runs (any run whose
//! request lists a setting source) write their own artifacts into the
//! store, so driver and suite tests exercise both capture paths without a
//! subprocess.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use serde_json::{Value, json};

use remora_core::agent::{Agent, AgentHandle, AgentMessage, QueryRequest};
use remora_core::hook::{CaptureMode, HookKind};
use remora_core::store::ArtifactStore;

/// A canned, schema-valid payload for one firing of `kind`.
pub fn sample_payload(kind: HookKind) -> Value {
    let mut payload = json!({
        "session_id": "sess-stub-1",
        "transcript_path": "/tmp/stub-transcript.jsonl",
        "cwd": "/work",
        "permission_mode": "default",
        "hook_event_name": kind.as_str(),
    });
    let extra = match kind {
        HookKind::SessionStart => json!({"source": "startup"}),
        HookKind::SessionEnd => json!({"reason": "exit"}),
        HookKind::PreToolUse => json!({
            "tool_name": "Read",
            "tool_input": {"file_path": "Hooks.md"},
            "tool_use_id": "toolu_stub_01",
        }),
        HookKind::PostToolUse => json!({
            "tool_name": "Read",
            "tool_input": {"file_path": "Hooks.md"},
            "tool_response": {"content": "# Hooks"},
            "tool_use_id": "toolu_stub_01",
        }),
        HookKind::PermissionRequest => json!({
            "tool_name": "Bash",
            "tool_input": {"command": "ls -la"},
        }),
        HookKind::Notification => json!({
            "message": "Agent needs attention",
            "notification_type": "info",
        }),
        HookKind::UserPromptSubmit => json!({"prompt": "What is the capital of France?"}),
        HookKind::Stop => json!({"stop_hook_active": false}),
        HookKind::SubagentStart => json!({
            "agent_id": "agent-stub-1",
            "agent_type": "general-purpose",
        }),
        HookKind::SubagentStop => json!({
            "stop_hook_active": false,
            "agent_id": "agent-stub-1",
            "agent_transcript_path": "/tmp/stub-subagent.jsonl",
        }),
        HookKind::PreCompact => json!({
            "trigger": "auto",
            "custom_instructions": null,
        }),
    };
    for (key, value) in extra.as_object().cloned().into_iter().flatten() {
        payload[key.as_str()] = value;
    }
    payload
}

/// How the stub behaves for one spawned run.
#[derive(Clone, Default)]
pub struct StubBehavior {
    /// Hook firings delivered to matching programmatic subscriptions, in
    /// order, while the stream drains.
    pub fires: Vec<(HookKind, Value)>,
    /// Artifacts the "agent" writes itself when the request lists a
    /// setting source (declarative mode).
    pub declarative_writes: Vec<(HookKind, Value)>,
    /// Session id announced at the start of the stream.
    pub session_id: Option<String>,
    /// Whether the final result message reports an error.
    pub result_is_error: bool,
}

struct StubRun {
    request: QueryRequest,
    behavior: StubBehavior,
}

/// A scriptable agent double.
///
/// The same behavior is replayed for every spawn; the requests seen are
/// recorded for assertions.
pub struct StubAgent {
    store: ArtifactStore,
    behavior: StubBehavior,
    next_id: AtomicU64,
    runs: Mutex<Vec<Arc<StubRun>>>,
}

impl StubAgent {
    pub fn new(store: ArtifactStore, behavior: StubBehavior) -> Self {
        Self {
            store,
            behavior,
            next_id: AtomicU64::new(1),
            runs: Mutex::new(Vec::new()),
        }
    }

    /// A stub that fires `kind` once with a valid payload in programmatic
    /// mode and writes the matching artifact itself in declarative mode.
    pub fn firing_once(store: ArtifactStore, kind: HookKind) -> Self {
        let payload = sample_payload(kind);
        Self::new(
            store,
            StubBehavior {
                fires: vec![(kind, payload.clone())],
                declarative_writes: vec![(kind, payload)],
                session_id: Some("sess-stub-1".to_string()),
                ..StubBehavior::default()
            },
        )
    }

    /// A stub whose hook never fires in either mode.
    pub fn silent(store: ArtifactStore) -> Self {
        Self::new(
            store,
            StubBehavior {
                session_id: Some("sess-stub-1".to_string()),
                ..StubBehavior::default()
            },
        )
    }

    /// The requests this stub has been spawned with so far.
    pub fn seen_requests(&self) -> Vec<QueryRequest> {
        self.runs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|run| run.request.clone())
            .collect()
    }
}

#[async_trait]
impl Agent for StubAgent {
    fn name(&self) -> &str {
        "stub"
    }

    async fn spawn(&self, request: QueryRequest) -> Result<AgentHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let run = Arc::new(StubRun {
            request,
            behavior: self.behavior.clone(),
        });
        self.runs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(run);
        Ok(AgentHandle {
            id,
            agent_name: self.name().to_string(),
        })
    }

    fn messages(&self, handle: &AgentHandle) -> Pin<Box<dyn Stream<Item = AgentMessage> + Send>> {
        let index = usize::try_from(handle.id).unwrap_or(1) - 1;
        let run = self
            .runs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(index)
            .cloned();
        let store = self.store.clone();

        Box::pin(futures::stream::iter(replay(run, store)))
    }
}

/// The hook kinds named in the project settings file, if any.
fn configured_hooks(working_dir: &std::path::Path) -> Vec<String> {
    let path = working_dir.join(".claude").join("settings.json");
    let Ok(contents) = std::fs::read_to_string(&path) else {
        return Vec::new();
    };
    let Ok(settings) = serde_json::from_str::<Value>(&contents) else {
        return Vec::new();
    };
    settings
        .get("hooks")
        .and_then(|h| h.as_object())
        .map(|hooks| hooks.keys().cloned().collect())
        .unwrap_or_default()
}

/// Replay one run synchronously: dispatch firings, write declarative
/// artifacts, and collect the message sequence.
fn replay(run: Option<Arc<StubRun>>, store: ArtifactStore) -> Vec<AgentMessage> {
    let Some(run) = run else {
        return vec![
            AgentMessage::Error {
                message: "unknown stub run".to_string(),
            },
            AgentMessage::Completed,
        ];
    };

    let mut messages = Vec::new();

    if let Some(session_id) = &run.behavior.session_id {
        messages.push(AgentMessage::SessionInfo {
            session_id: session_id.clone(),
        });
    }

    // Programmatic path: deliver firings to matching subscriptions.
    for (kind, payload) in &run.behavior.fires {
        for sub in &run.request.hooks {
            if sub.kind == *kind {
                (sub.callback)(payload);
            }
        }
    }

    // Declarative path: when the agent was told to load settings, it
    // reads the project settings file like the real agent would and only
    // writes artifacts for the hook kinds configured there.
    if !run.request.setting_sources.is_empty() {
        let configured = configured_hooks(&run.request.working_dir);
        for (kind, payload) in &run.behavior.declarative_writes {
            if !configured.contains(&kind.as_str().to_string()) {
                continue;
            }
            // A write failure in the stub is a test-environment problem;
            // surface it through the stream like a real agent error.
            if let Err(e) = store.write(*kind, CaptureMode::Declarative, payload) {
                messages.push(AgentMessage::Error {
                    message: format!("stub declarative write failed: {e}"),
                });
            }
        }
    }

    messages.push(AgentMessage::Assistant {
        text: "Stub run complete.".to_string(),
    });
    messages.push(AgentMessage::Result {
        text: "Done.".to_string(),
        is_error: run.behavior.result_is_error,
    });
    messages.push(AgentMessage::Completed);
    messages
}

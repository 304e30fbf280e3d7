//! Claude Code agent adapter.
//!
//! Spawns `claude -p --output-format stream-json` as a subprocess and
//! parses its JSONL output into [`AgentMessage`] values. Hook firings
//! arrive on the same stream as `{"type":"hook_event","payload":{...}}`
//! lines (enabled per-run with `--hook-events`) and are routed to the
//! callbacks registered in the [`QueryRequest`] instead of being yielded
//! as messages.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::trait_def::Agent;
use super::types::{AgentHandle, AgentMessage, HookSubscription, QueryRequest};

/// Internal state kept per spawned process.
struct ProcessState {
    /// The child process handle, reaped when its stream is drained.
    child: Child,
    /// Stdout reader; `Option` so it can be `.take()`-ed once for streaming.
    stdout: Option<ChildStdout>,
    /// Hook callbacks registered for this run.
    hooks: Vec<HookSubscription>,
}

/// Adapter for the Claude Code CLI.
#[derive(Clone)]
pub struct ClaudeCodeAdapter {
    /// Path to the `claude` binary. Defaults to `"claude"` (found via `$PATH`).
    binary_path: String,
    /// Per-process bookkeeping, keyed by OS pid.
    processes: Arc<Mutex<HashMap<u64, ProcessState>>>,
}

impl std::fmt::Debug for ClaudeCodeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeCodeAdapter")
            .field("binary_path", &self.binary_path)
            .finish()
    }
}

impl ClaudeCodeAdapter {
    /// Create a new adapter that will look for `claude` on `$PATH`.
    pub fn new() -> Self {
        Self::with_binary("claude")
    }

    /// Create a new adapter with a custom binary path.
    ///
    /// Useful for testing or when `claude` is installed in a non-standard
    /// location.
    pub fn with_binary(path: impl Into<String>) -> Self {
        Self {
            binary_path: path.into(),
            processes: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for ClaudeCodeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// JSONL parsing
// ---------------------------------------------------------------------------

/// One parsed item from a stream-json line: either messages for the caller
/// or a hook firing for the registered callbacks.
#[derive(Debug, PartialEq, Eq)]
enum StreamItem {
    Message(AgentMessage),
    HookEvent { payload: Value },
}

/// Parse a single JSONL line from Claude Code's stream-json output.
///
/// Returns `Err` if the line is not valid JSON; callers treat that as a
/// warning and continue reading.
fn parse_stream_json_line(line: &str) -> Result<Vec<StreamItem>> {
    let v: Value = serde_json::from_str(line).context("malformed JSON in stream output")?;

    let mut items = Vec::new();
    let event_type = v.get("type").and_then(|t| t.as_str()).unwrap_or("");

    match event_type {
        // assistant -- a message with content blocks
        "assistant" => {
            if let Some(content) = v
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_array())
            {
                for block in content {
                    if block.get("type").and_then(|t| t.as_str()) == Some("text") {
                        if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                            items.push(StreamItem::Message(AgentMessage::Assistant {
                                text: text.to_string(),
                            }));
                        }
                    }
                }
            }
        }

        // system -- session metadata; only the init subtype carries the id
        "system" => {
            if v.get("subtype").and_then(|s| s.as_str()) == Some("init") {
                if let Some(session_id) = v.get("session_id").and_then(|s| s.as_str()) {
                    items.push(StreamItem::Message(AgentMessage::SessionInfo {
                        session_id: session_id.to_string(),
                    }));
                }
            }
        }

        // hook_event -- a hook firing to route to registered callbacks
        "hook_event" => {
            if let Some(payload) = v.get("payload") {
                items.push(StreamItem::HookEvent {
                    payload: payload.clone(),
                });
            } else {
                warn!("hook_event line without payload");
            }
        }

        // result -- the final result of the run
        "result" => {
            let text = v
                .get("result")
                .and_then(|r| r.as_str())
                .unwrap_or("")
                .to_string();
            let is_error = v.get("is_error").and_then(|e| e.as_bool()).unwrap_or(false);
            items.push(StreamItem::Message(AgentMessage::Result { text, is_error }));
        }

        // error -- an error from the agent
        "error" => {
            let message = v
                .get("error")
                .and_then(|e| e.get("message").and_then(|m| m.as_str()))
                .or_else(|| v.get("message").and_then(|m| m.as_str()))
                .unwrap_or("unknown error")
                .to_string();
            items.push(StreamItem::Message(AgentMessage::Error { message }));
        }

        other => {
            debug!(event_type = other, "ignoring unrecognised stream-json event type");
        }
    }

    Ok(items)
}

/// Route a hook payload to every subscription matching its
/// `hook_event_name` discriminant.
fn dispatch_hook_event(hooks: &[HookSubscription], payload: &Value) {
    let Some(name) = payload.get("hook_event_name").and_then(|n| n.as_str()) else {
        warn!("hook_event payload without hook_event_name");
        return;
    };

    let mut matched = false;
    for sub in hooks {
        if sub.kind.as_str() == name {
            (sub.callback)(payload);
            matched = true;
        }
    }
    if !matched {
        debug!(hook = name, "no subscription for hook event");
    }
}

// ---------------------------------------------------------------------------
// Agent trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl Agent for ClaudeCodeAdapter {
    fn name(&self) -> &str {
        "claude-code"
    }

    async fn spawn(&self, request: QueryRequest) -> Result<AgentHandle> {
        let mut cmd = Command::new(&self.binary_path);

        cmd.arg("-p")
            .arg(&request.prompt)
            .arg("--output-format")
            .arg("stream-json")
            .arg("--verbose")
            .arg("--model")
            .arg(&request.model)
            .arg("--max-turns")
            .arg(request.max_turns.to_string());

        if !request.allowed_tools.is_empty() {
            cmd.arg("--allowedTools").arg(request.allowed_tools.join(","));
        }

        if !request.setting_sources.is_empty() {
            let sources: Vec<&str> = request.setting_sources.iter().map(|s| s.as_str()).collect();
            cmd.arg("--setting-sources").arg(sources.join(","));
        }

        // Ask the CLI to mirror hook firings onto stdout for the kinds we
        // subscribed to; the callbacks are invoked from the stream loop.
        if !request.hooks.is_empty() {
            let kinds: Vec<&str> = request.hooks.iter().map(|h| h.kind.as_str()).collect();
            cmd.arg("--hook-events").arg(kinds.join(","));
        }

        cmd.current_dir(&request.working_dir);
        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::null());

        let mut child = cmd.spawn().with_context(|| {
            format!(
                "failed to spawn agent binary at '{}' -- is it installed and on PATH?",
                self.binary_path
            )
        })?;

        let pid = u64::from(child.id().context("child process has no pid")?);
        let stdout = child.stdout.take();

        {
            let mut processes = self.processes.lock().await;
            processes.insert(
                pid,
                ProcessState {
                    child,
                    stdout,
                    hooks: request.hooks,
                },
            );
        }

        Ok(AgentHandle {
            id: pid,
            agent_name: self.name().to_string(),
        })
    }

    fn messages(&self, handle: &AgentHandle) -> Pin<Box<dyn Stream<Item = AgentMessage> + Send>> {
        let pid = handle.id;
        let processes = Arc::clone(&self.processes);

        let stream = async_stream::stream! {
            // Take stdout (once) and a copy of the hook subscriptions.
            let (stdout, hooks) = {
                let mut procs = processes.lock().await;
                match procs.get_mut(&pid) {
                    Some(state) => (state.stdout.take(), state.hooks.clone()),
                    None => (None, Vec::new()),
                }
            };

            let Some(stdout) = stdout else {
                warn!(pid, "no stdout available -- stream already consumed or process missing");
                yield AgentMessage::Error {
                    message: "stdout not available (already consumed or process not found)".to_string(),
                };
                yield AgentMessage::Completed;
                return;
            };

            let reader = BufReader::new(stdout);
            let mut lines = reader.lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match parse_stream_json_line(trimmed) {
                            Ok(items) => {
                                for item in items {
                                    match item {
                                        StreamItem::Message(message) => yield message,
                                        StreamItem::HookEvent { payload } => {
                                            dispatch_hook_event(&hooks, &payload);
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                warn!(line = trimmed, error = %e, "skipping malformed JSONL line");
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "error reading agent stdout");
                        yield AgentMessage::Error {
                            message: format!("stdout read error: {e}"),
                        };
                        break;
                    }
                }
            }

            // Reap the child so a drained run leaves no zombie behind.
            let state = {
                let mut procs = processes.lock().await;
                procs.remove(&pid)
            };
            if let Some(mut state) = state {
                if let Err(e) = state.child.wait().await {
                    warn!(pid, error = %e, "failed to reap agent process");
                }
            }

            yield AgentMessage::Completed;
        };

        Box::pin(stream)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::HookKind;
    use futures::StreamExt;
    use serde_json::json;
    use std::path::Path;
    use std::sync::Mutex as StdMutex;

    /// Write an executable shell script that emits the given lines.
    fn fake_agent_script(dir: &Path, body: &str) -> String {
        let path = dir.join("fake_claude.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        path.to_str().unwrap().to_string()
    }

    // -- JSONL parsing tests -----------------------------------------------

    #[test]
    fn parse_assistant_text() {
        let line = r#"{"type":"assistant","message":{"content":[{"type":"text","text":"Hello!"}]}}"#;
        let items = parse_stream_json_line(line).unwrap();
        assert_eq!(
            items,
            vec![StreamItem::Message(AgentMessage::Assistant {
                text: "Hello!".to_string()
            })]
        );
    }

    #[test]
    fn parse_system_init_yields_session_info() {
        let line = r#"{"type":"system","subtype":"init","session_id":"sess-42"}"#;
        let items = parse_stream_json_line(line).unwrap();
        assert_eq!(
            items,
            vec![StreamItem::Message(AgentMessage::SessionInfo {
                session_id: "sess-42".to_string()
            })]
        );
    }

    #[test]
    fn parse_system_non_init_is_ignored() {
        let line = r#"{"type":"system","subtype":"warmup"}"#;
        assert!(parse_stream_json_line(line).unwrap().is_empty());
    }

    #[test]
    fn parse_result_with_error_flag() {
        let line = r#"{"type":"result","result":"Done.","is_error":true}"#;
        let items = parse_stream_json_line(line).unwrap();
        assert_eq!(
            items,
            vec![StreamItem::Message(AgentMessage::Result {
                text: "Done.".to_string(),
                is_error: true
            })]
        );
    }

    #[test]
    fn parse_hook_event_line() {
        let line = r#"{"type":"hook_event","payload":{"hook_event_name":"PreToolUse","tool_name":"Read"}}"#;
        let items = parse_stream_json_line(line).unwrap();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], StreamItem::HookEvent { .. }));
    }

    #[test]
    fn parse_error_nested_and_flat() {
        let nested = r#"{"type":"error","error":{"message":"rate limit exceeded"}}"#;
        let flat = r#"{"type":"error","message":"something broke"}"#;
        assert_eq!(
            parse_stream_json_line(nested).unwrap(),
            vec![StreamItem::Message(AgentMessage::Error {
                message: "rate limit exceeded".to_string()
            })]
        );
        assert_eq!(
            parse_stream_json_line(flat).unwrap(),
            vec![StreamItem::Message(AgentMessage::Error {
                message: "something broke".to_string()
            })]
        );
    }

    #[test]
    fn parse_malformed_json_returns_error() {
        assert!(parse_stream_json_line("this is not json").is_err());
    }

    #[test]
    fn dispatch_routes_by_discriminant() {
        let seen: Arc<StdMutex<Vec<String>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hooks = vec![HookSubscription {
            kind: HookKind::PreToolUse,
            callback: Arc::new(move |payload| {
                sink.lock()
                    .unwrap()
                    .push(payload["tool_name"].as_str().unwrap().to_string());
            }),
        }];

        dispatch_hook_event(
            &hooks,
            &json!({"hook_event_name": "PreToolUse", "tool_name": "Read"}),
        );
        // Mismatched kind is ignored.
        dispatch_hook_event(
            &hooks,
            &json!({"hook_event_name": "PostToolUse", "tool_name": "Grep"}),
        );

        assert_eq!(*seen.lock().unwrap(), vec!["Read".to_string()]);
    }

    // -- Subprocess integration tests --------------------------------------

    #[tokio::test]
    async fn spawn_and_stream_a_full_run() {
        let tmp = tempfile::tempdir().unwrap();
        let script = fake_agent_script(
            tmp.path(),
            r#"echo '{"type":"system","subtype":"init","session_id":"sess-1"}'
echo '{"type":"assistant","message":{"content":[{"type":"text","text":"Reading the file."}]}}'
echo '{"type":"result","result":"Done.","is_error":false}'
"#,
        );

        let adapter = ClaudeCodeAdapter::with_binary(&script);
        let handle = adapter
            .spawn(QueryRequest::new("Read Hooks.md", tmp.path()))
            .await
            .unwrap();
        assert!(handle.id > 0);
        assert_eq!(handle.agent_name, "claude-code");

        let messages: Vec<AgentMessage> = adapter.messages(&handle).collect().await;
        assert_eq!(
            messages,
            vec![
                AgentMessage::SessionInfo {
                    session_id: "sess-1".to_string()
                },
                AgentMessage::Assistant {
                    text: "Reading the file.".to_string()
                },
                AgentMessage::Result {
                    text: "Done.".to_string(),
                    is_error: false
                },
                AgentMessage::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn hook_event_lines_invoke_callbacks_not_messages() {
        let tmp = tempfile::tempdir().unwrap();
        let script = fake_agent_script(
            tmp.path(),
            r#"echo '{"type":"hook_event","payload":{"hook_event_name":"PreToolUse","tool_name":"Read","tool_use_id":"t1"}}'
echo '{"type":"result","result":"ok","is_error":false}'
"#,
        );

        let captured: Arc<StdMutex<Option<Value>>> = Arc::new(StdMutex::new(None));
        let sink = Arc::clone(&captured);

        let mut request = QueryRequest::new("Read Hooks.md", tmp.path());
        request.hooks.push(HookSubscription {
            kind: HookKind::PreToolUse,
            callback: Arc::new(move |payload| {
                *sink.lock().unwrap() = Some(payload.clone());
            }),
        });

        let adapter = ClaudeCodeAdapter::with_binary(&script);
        let handle = adapter.spawn(request).await.unwrap();
        let messages: Vec<AgentMessage> = adapter.messages(&handle).collect().await;

        // The hook firing is observable via the callback only.
        assert!(messages.iter().all(|m| !matches!(m, AgentMessage::Error { .. })));
        let payload = captured.lock().unwrap().clone().unwrap();
        assert_eq!(payload["tool_name"], json!("Read"));
        assert_eq!(payload["tool_use_id"], json!("t1"));
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let script = fake_agent_script(
            tmp.path(),
            r#"echo 'this is not json'
echo ''
echo '{"type":"assistant","message":{"content":[{"type":"text","text":"valid line"}]}}'
"#,
        );

        let adapter = ClaudeCodeAdapter::with_binary(&script);
        let handle = adapter
            .spawn(QueryRequest::new("hi", tmp.path()))
            .await
            .unwrap();
        let messages: Vec<AgentMessage> = adapter.messages(&handle).collect().await;

        assert!(messages.iter().any(
            |m| matches!(m, AgentMessage::Assistant { text } if text == "valid line")
        ));
        assert_eq!(messages.last().unwrap(), &AgentMessage::Completed);
    }

    #[tokio::test]
    async fn spawn_binary_not_found_returns_error() {
        let adapter = ClaudeCodeAdapter::with_binary("/nonexistent/path/to/claude");
        let result = adapter.spawn(QueryRequest::new("hi", "/tmp")).await;
        assert!(result.is_err());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("failed to spawn agent binary"));
    }

    #[tokio::test]
    async fn messages_called_twice_yields_error_then_completed() {
        let tmp = tempfile::tempdir().unwrap();
        let script = fake_agent_script(
            tmp.path(),
            "echo '{\"type\":\"result\",\"result\":\"ok\",\"is_error\":false}'\n",
        );

        let adapter = ClaudeCodeAdapter::with_binary(&script);
        let handle = adapter
            .spawn(QueryRequest::new("hi", tmp.path()))
            .await
            .unwrap();

        let first: Vec<AgentMessage> = adapter.messages(&handle).collect().await;
        assert!(first.iter().any(|m| matches!(m, AgentMessage::Completed)));

        let second: Vec<AgentMessage> = adapter.messages(&handle).collect().await;
        assert!(second.iter().any(|m| matches!(m, AgentMessage::Error { .. })));
        assert_eq!(second.last().unwrap(), &AgentMessage::Completed);
    }

    #[tokio::test]
    async fn process_exit_without_output_still_completes() {
        let tmp = tempfile::tempdir().unwrap();
        let script = fake_agent_script(tmp.path(), "exit 1\n");

        let adapter = ClaudeCodeAdapter::with_binary(&script);
        let handle = adapter
            .spawn(QueryRequest::new("hi", tmp.path()))
            .await
            .unwrap();
        let messages: Vec<AgentMessage> = adapter.messages(&handle).collect().await;
        assert_eq!(messages.last().unwrap(), &AgentMessage::Completed);
    }

    #[test]
    fn adapter_default_binary_path() {
        assert_eq!(ClaudeCodeAdapter::new().binary_path, "claude");
        assert_eq!(
            ClaudeCodeAdapter::with_binary("/usr/local/bin/claude").binary_path,
            "/usr/local/bin/claude"
        );
    }
}

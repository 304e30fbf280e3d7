//! The dual-mode driver: one scenario, two capture mechanisms.
//!
//! Programmatic mode registers an invocation-scoped callback with the
//! agent and captures the firing in-process; declarative mode installs a
//! settings file the agent reads itself and discovers the firing by
//! diffing the artifact store around the run. Both modes drain the
//! agent's stream to completion, classify non-firing by the kind's
//! [`FiringPolicy`], and validate the captured artifact against the
//! schema registry before reporting success.
//!
//! The two modes for a given kind run strictly sequentially: declarative
//! mode owns the single settings-file slot and diffs store snapshots, so
//! overlap would corrupt both.

pub mod settings;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::agent::{Agent, AgentMessage, HookSubscription, QueryRequest, SettingSource};
use crate::hook::{self, CaptureMode, FiringPolicy, HookEvent, HookKind, ValidationReport};
use crate::scenario::Scenario;
use crate::store::{ArtifactStore, StoreError};

/// Errors from one mode's run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A required hook kind produced no artifact within the turn budget.
    #[error("{kind} hook did not fire in {mode} mode")]
    HookNotFired { kind: HookKind, mode: CaptureMode },

    /// The captured artifact failed its schema check.
    #[error("{kind} artifact failed schema validation in {mode} mode")]
    Validation {
        kind: HookKind,
        mode: CaptureMode,
        report: ValidationReport,
    },

    /// Artifact store access failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The agent invocation itself failed (spawn error, settings install).
    #[error("agent invocation failed in {mode} mode: {message}")]
    Agent { mode: CaptureMode, message: String },
}

/// What one mode produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeOutcome {
    /// The hook fired; the artifact is on disk, passed validation, and
    /// decoded into its typed record.
    Captured {
        path: PathBuf,
        validation: ValidationReport,
        event: HookEvent,
    },
    /// The hook did not fire and its kind is best-effort, so this run is
    /// an informational skip rather than a failure.
    DidNotFire,
}

/// The result of one mode's run, with the session id observed from the
/// agent's stream riding along for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeRun {
    pub outcome: ModeOutcome,
    pub session_id: Option<String>,
}

/// Driver configuration shared by both modes.
#[derive(Clone)]
pub struct Driver {
    agent: Arc<dyn Agent>,
    store: ArtifactStore,
    /// Directory the agent reads its declarative settings from.
    claude_dir: PathBuf,
    /// Working directory for agent runs.
    working_dir: PathBuf,
    model: String,
    /// The command the declarative settings point the agent at.
    hook_command: String,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("agent", &self.agent.name())
            .field("store", &self.store)
            .field("claude_dir", &self.claude_dir)
            .field("working_dir", &self.working_dir)
            .field("model", &self.model)
            .finish()
    }
}

impl Driver {
    pub fn new(
        agent: Arc<dyn Agent>,
        store: ArtifactStore,
        working_dir: impl Into<PathBuf>,
        model: impl Into<String>,
        hook_command: impl Into<String>,
    ) -> Self {
        let working_dir = working_dir.into();
        Self {
            agent,
            store,
            claude_dir: working_dir.join(".claude"),
            working_dir,
            model: model.into(),
            hook_command: hook_command.into(),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    fn request_for(&self, scenario: &Scenario) -> QueryRequest {
        QueryRequest {
            prompt: scenario.prompt.to_string(),
            working_dir: self.working_dir.clone(),
            model: self.model.clone(),
            max_turns: scenario.max_turns,
            allowed_tools: scenario
                .allowed_tools
                .iter()
                .map(|t| t.to_string())
                .collect(),
            setting_sources: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Drain the agent's message stream to completion, collecting the
    /// session id and noting result errors.
    async fn drain(&self, request: QueryRequest, mode: CaptureMode) -> Result<Option<String>, DriverError> {
        let handle = self
            .agent
            .spawn(request)
            .await
            .map_err(|e| DriverError::Agent {
                mode,
                message: format!("{e:#}"),
            })?;

        let mut session_id = None;
        let mut stream = self.agent.messages(&handle);
        while let Some(message) = stream.next().await {
            match message {
                AgentMessage::SessionInfo { session_id: id } => session_id = Some(id),
                AgentMessage::Result { is_error, .. } => {
                    if is_error {
                        warn!(mode = %mode, "agent run finished with errors");
                    } else {
                        debug!(mode = %mode, "agent run completed");
                    }
                }
                AgentMessage::Error { message } => {
                    warn!(mode = %mode, error = %message, "agent reported an error");
                }
                AgentMessage::Assistant { .. } | AgentMessage::Completed => {}
            }
        }

        Ok(session_id)
    }

    /// Classify a captured artifact path (or its absence) into an outcome.
    fn resolve_capture(
        &self,
        kind: HookKind,
        mode: CaptureMode,
        path: Option<PathBuf>,
    ) -> Result<ModeOutcome, DriverError> {
        let Some(path) = path else {
            return match kind.firing_policy() {
                FiringPolicy::BestEffort => {
                    info!(kind = %kind, mode = %mode, "hook did not fire (expected for this kind)");
                    Ok(ModeOutcome::DidNotFire)
                }
                FiringPolicy::Required => Err(DriverError::HookNotFired { kind, mode }),
            };
        };

        let payload = self.store.read(&path)?;
        let validation = hook::validate(kind, &payload);
        if !validation.valid {
            return Err(DriverError::Validation {
                kind,
                mode,
                report: validation,
            });
        }

        // The schema check passed, so the typed decode is expected to
        // succeed; a failure here means the artifact content does not
        // parse into the record model and surfaces as a parse error.
        let event = HookEvent::from_value(&payload).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;

        Ok(ModeOutcome::Captured {
            path,
            validation,
            event,
        })
    }

    /// Run the scenario with an invocation-scoped callback registered for
    /// its hook kind.
    ///
    /// If the agent fires the hook more than once, the last firing wins:
    /// every firing writes an artifact and the recorded path is
    /// overwritten each time.
    pub async fn run_programmatic(&self, scenario: &Scenario) -> Result<ModeRun, DriverError> {
        let kind = scenario.kind;
        let mode = CaptureMode::Programmatic;
        self.store.ensure_dir()?;

        let captured: Arc<Mutex<Option<Result<PathBuf, StoreError>>>> =
            Arc::new(Mutex::new(None));
        let slot = Arc::clone(&captured);
        let store = self.store.clone();

        let mut request = self.request_for(scenario);
        request.hooks.push(HookSubscription {
            kind,
            callback: Arc::new(move |payload| {
                let result = store.write(kind, CaptureMode::Programmatic, payload);
                *slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(result);
            }),
        });

        let session_id = self.drain(request, mode).await?;

        let capture = captured.lock().unwrap_or_else(|e| e.into_inner()).take();
        let path = match capture {
            Some(Ok(path)) => Some(path),
            Some(Err(e)) => return Err(DriverError::Store(e)),
            None => None,
        };

        let outcome = self.resolve_capture(kind, mode, path)?;
        Ok(ModeRun {
            outcome,
            session_id,
        })
    }

    /// Run the scenario with the declarative settings file installed and
    /// no in-process callback: the agent writes its own artifact, and the
    /// driver discovers it by diffing the store around the run.
    pub async fn run_declarative(&self, scenario: &Scenario) -> Result<ModeRun, DriverError> {
        let kind = scenario.kind;
        let mode = CaptureMode::Declarative;
        self.store.ensure_dir()?;

        let before = self.store.snapshot()?;

        // The guard removes the settings file on every exit path out of
        // this scope, including error returns and cancellation.
        let guard = settings::install(&self.claude_dir, kind, &self.hook_command).map_err(|e| {
            DriverError::Agent {
                mode,
                message: format!("{e:#}"),
            }
        })?;

        let mut request = self.request_for(scenario);
        request.setting_sources.push(SettingSource::Project);

        let session_id = self.drain(request, mode).await?;
        drop(guard);

        let after = self.store.snapshot()?;
        let new_files = ArtifactStore::diff(&before, &after, mode);
        if new_files.len() > 1 {
            debug!(kind = %kind, count = new_files.len(), "multiple new declarative artifacts; taking the first");
        }
        let path = new_files.first().map(|name| self.store.path_of(name));

        let outcome = self.resolve_capture(kind, mode, path)?;
        Ok(ModeRun {
            outcome,
            session_id,
        })
    }
}

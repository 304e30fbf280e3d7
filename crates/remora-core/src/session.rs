//! Session context: the most recent agent session id, persisted explicitly.
//!
//! The context is a plain value threaded through calls; loading and saving
//! are explicit operations the orchestrator invokes, never a side effect
//! of construction.

use std::path::Path;

use anyhow::{Context, Result};

/// The session identity observed from the agent, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    session_id: Option<String>,
}

impl SessionContext {
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// A copy of this context with a newer session id folded in. `None`
    /// leaves the existing id untouched.
    pub fn with_session_id(&self, id: Option<String>) -> Self {
        match id {
            Some(id) => Self { session_id: Some(id) },
            None => self.clone(),
        }
    }

    /// Load a context from `path`. A missing or unreadable file loads as
    /// the empty context; this is a fresh-start, not an error.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    Self::default()
                } else {
                    Self {
                        session_id: Some(trimmed.to_string()),
                    }
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Persist the context to `path`. An empty context removes the file.
    pub fn save(&self, path: &Path) -> Result<()> {
        match &self.session_id {
            Some(id) => std::fs::write(path, id)
                .with_context(|| format!("failed to write session file {}", path.display())),
            None => {
                if path.exists() {
                    std::fs::remove_file(path).with_context(|| {
                        format!("failed to remove session file {}", path.display())
                    })?;
                }
                Ok(())
            }
        }
    }
}

//! Configuration file management for remora.
//!
//! Provides a TOML-based config file at `~/.config/remora/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub paths: PathsSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AgentSection {
    /// Path to the agent binary.
    pub binary: Option<String>,
    /// Model identifier passed to the agent.
    pub model: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PathsSection {
    /// Directory hook artifacts are written to.
    pub logs_dir: Option<PathBuf>,
    /// Working directory for agent runs.
    pub project_dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the remora config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/remora` or `~/.config/remora`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("remora");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("remora")
}

/// Return the path to the remora config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. A missing file resolves to defaults.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ConfigFile::default()),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read config file at {}", path.display()));
        }
    };
    toml::from_str(&contents).context("failed to parse config file")
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoraConfig {
    pub agent_binary: String,
    pub model: String,
    pub project_dir: PathBuf,
    pub logs_dir: PathBuf,
}

/// CLI-level overrides, highest priority in the chain.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub agent_binary: Option<String>,
    pub model: Option<String>,
    pub project_dir: Option<PathBuf>,
    pub logs_dir: Option<PathBuf>,
}

impl RemoraConfig {
    /// Resolve configuration using the chain:
    /// CLI flag > `REMORA_*` env var > config file > default.
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let file = load_config()?;
        Ok(Self::resolve_with(overrides, &file, |key| {
            std::env::var(key).ok()
        }))
    }

    /// Resolution with an explicit env lookup (testable without process
    /// env vars).
    pub fn resolve_with(
        overrides: &Overrides,
        file: &ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let project_dir = overrides
            .project_dir
            .clone()
            .or_else(|| env("REMORA_PROJECT_DIR").map(PathBuf::from))
            .or_else(|| file.paths.project_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let logs_dir = overrides
            .logs_dir
            .clone()
            .or_else(|| env("REMORA_LOGS_DIR").map(PathBuf::from))
            .or_else(|| file.paths.logs_dir.clone())
            .unwrap_or_else(|| project_dir.join("logs"));

        let agent_binary = overrides
            .agent_binary
            .clone()
            .or_else(|| env("REMORA_AGENT_BINARY"))
            .or_else(|| file.agent.binary.clone())
            .unwrap_or_else(|| "claude".to_string());

        let model = overrides
            .model
            .clone()
            .or_else(|| env("REMORA_MODEL"))
            .or_else(|| file.agent.model.clone())
            .unwrap_or_else(|| "haiku".to_string());

        Self {
            agent_binary,
            model,
            project_dir,
            logs_dir,
        }
    }

    /// Path of the session context file under the project directory.
    pub fn session_file(&self) -> PathBuf {
        self.project_dir.join(".remora-session")
    }
}

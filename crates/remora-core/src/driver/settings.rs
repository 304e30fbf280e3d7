//! Declarative settings materialization and scoped cleanup.
//!
//! The settings file is a single mutable slot the agent reads at
//! invocation time. [`SettingsGuard`] removes it on drop, so every exit
//! path -- success, error, panic, or a cancelled future -- leaves the slot
//! empty for the next run. Removal is best-effort: a file that is already
//! gone is not an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tracing::warn;

use crate::hook::HookKind;

/// RAII guard over the installed settings file.
#[derive(Debug)]
pub struct SettingsGuard {
    path: PathBuf,
}

impl SettingsGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SettingsGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove settings file");
            }
        }
    }
}

/// Render the declarative hook configuration for one kind.
///
/// The hook command is the harness's own `log-event` shim: the agent pipes
/// the hook payload into it on stdin and the shim writes the artifact.
pub fn render_settings(kind: HookKind, hook_command: &str) -> Value {
    json!({
        "hooks": {
            kind.as_str(): [
                {
                    "hooks": [
                        {
                            "type": "command",
                            "command": hook_command,
                        }
                    ]
                }
            ]
        }
    })
}

/// Write the settings file for `kind` into `claude_dir`, returning a guard
/// that removes it again on drop.
pub fn install(claude_dir: &Path, kind: HookKind, hook_command: &str) -> Result<SettingsGuard> {
    std::fs::create_dir_all(claude_dir)
        .with_context(|| format!("failed to create settings directory {}", claude_dir.display()))?;

    let path = claude_dir.join("settings.json");
    let settings = render_settings(kind, hook_command);
    let contents = serde_json::to_string_pretty(&settings).context("failed to render settings")?;
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write settings file {}", path.display()))?;

    Ok(SettingsGuard { path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_writes_the_hook_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let claude_dir = tmp.path().join(".claude");

        let guard = install(&claude_dir, HookKind::PreToolUse, "remora log-event").unwrap();
        let contents = std::fs::read_to_string(guard.path()).unwrap();
        let settings: Value = serde_json::from_str(&contents).unwrap();

        let command = &settings["hooks"]["PreToolUse"][0]["hooks"][0]["command"];
        assert_eq!(command, &json!("remora log-event"));
    }

    #[test]
    fn guard_removes_the_file_on_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let claude_dir = tmp.path().join(".claude");

        let path = {
            let guard = install(&claude_dir, HookKind::Stop, "cmd").unwrap();
            guard.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn guard_drop_tolerates_an_already_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let claude_dir = tmp.path().join(".claude");

        let guard = install(&claude_dir, HookKind::Stop, "cmd").unwrap();
        std::fs::remove_file(guard.path()).unwrap();
        drop(guard); // must not panic
    }

    #[test]
    fn guard_cleans_up_across_a_panic() {
        let tmp = tempfile::tempdir().unwrap();
        let claude_dir = tmp.path().join(".claude");
        let path = claude_dir.join("settings.json");

        let claude_dir_clone = claude_dir.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = install(&claude_dir_clone, HookKind::Stop, "cmd").unwrap();
            panic!("simulated failure mid-run");
        });

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn install_overwrites_a_stale_settings_file() {
        let tmp = tempfile::tempdir().unwrap();
        let claude_dir = tmp.path().join(".claude");
        std::fs::create_dir_all(&claude_dir).unwrap();
        std::fs::write(claude_dir.join("settings.json"), "{\"stale\": true}").unwrap();

        let guard = install(&claude_dir, HookKind::PreCompact, "cmd").unwrap();
        let contents = std::fs::read_to_string(guard.path()).unwrap();
        assert!(contents.contains("PreCompact"));
        assert!(!contents.contains("stale"));
    }
}

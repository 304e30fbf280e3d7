//! Append-only artifact store: one JSON file per hook firing.
//!
//! Filenames follow `{kind}_{mode}_{timestamp}.json` with a second-resolution
//! UTC timestamp (colons replaced by dashes), so lexical order is
//! chronological order. The store never updates a file in place; a repeated
//! firing of the same kind and mode within one second lands on the same
//! name and the newer payload wins.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use crate::hook::{CaptureMode, HookKind};

/// Errors from artifact-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store directory or an artifact file could not be accessed.
    #[error("artifact store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested artifact does not exist.
    #[error("artifact not found: {path}")]
    NotFound { path: PathBuf },

    /// An artifact file exists but does not contain valid JSON.
    #[error("malformed artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A directory of captured hook artifacts.
///
/// The store owns no in-memory state; every operation reads or writes the
/// directory directly, so two snapshots taken around an agent run observe
/// exactly the files that run produced.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the store directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// Sorted filenames of all artifacts currently in the store.
    ///
    /// A missing store directory reads as empty; any other I/O failure
    /// surfaces as [`StoreError::Io`].
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".json") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// The current set of artifact filenames, for before/after diffing
    /// around an agent run.
    pub fn snapshot(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.list()?.into_iter().collect())
    }

    /// Filenames present in `after` but not `before`, restricted to
    /// artifacts tagged with `mode`, in lexical (hence chronological)
    /// order.
    pub fn diff(
        before: &BTreeSet<String>,
        after: &BTreeSet<String>,
        mode: CaptureMode,
    ) -> Vec<String> {
        let tag = format!("_{}_", mode.as_str());
        after
            .difference(before)
            .filter(|name| name.contains(&tag))
            .cloned()
            .collect()
    }

    /// Persist one hook firing. The payload is augmented with the capture
    /// mode and a `logged_at` timestamp before writing.
    pub fn write(
        &self,
        kind: HookKind,
        mode: CaptureMode,
        payload: &Value,
    ) -> Result<PathBuf, StoreError> {
        self.ensure_dir()?;

        let now = Utc::now();
        let mut record = payload.clone();
        if let Some(map) = record.as_object_mut() {
            map.insert("capture_mode".to_string(), Value::String(mode.as_str().to_string()));
            map.insert("logged_at".to_string(), Value::String(now.to_rfc3339()));
        }

        // ISO-8601, colons replaced and sub-seconds truncated, so the name
        // is filesystem-safe and lexically sortable.
        let timestamp = now.format("%Y-%m-%dT%H-%M-%S");
        let filename = format!("{}_{}_{}.json", kind.as_str(), mode.as_str(), timestamp);
        let path = self.dir.join(filename);

        let contents = serde_json::to_string_pretty(&record).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, contents).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }

    /// Read an artifact back as a JSON value.
    pub fn read(&self, path: &Path) -> Result<Value, StoreError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Absolute path of an artifact by filename.
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Delete every artifact file in the store. Returns the number removed.
    pub fn clean(&self) -> Result<usize, StoreError> {
        let names = self.list()?;
        let mut removed = 0;
        for name in names {
            let path = self.dir.join(&name);
            std::fs::remove_file(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            removed += 1;
        }
        Ok(removed)
    }
}

//! Diagnostic snapshots
//!
//! The diagnostic set is serialized as an ordered list of
//! `[resource, [diagnostic, ...]]` pairs, leaving out resources without
//! problems. Two snapshots are equal iff their JSON text is byte-equal.

use async_trait::async_trait;
use ipm_core::{
    resolve_workspace_root, timestamp, ArtifactKind, LoggingDir, Reporter, WorkspaceFolders,
    DEFAULT_LOGGING_DIR,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use watcher::Emitter;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to serialize diagnostics: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse diagnostics: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

/// Zero-based line/character position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagnosticCode {
    Number(i64),
    Text(String),
}

/// One problem reported for a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<DiagnosticCode>,
}

/// `(resource URI, problems)`, serialized as a two-element array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDiagnostics(pub String, pub Vec<Diagnostic>);

impl ResourceDiagnostics {
    pub fn resource(&self) -> &str {
        &self.0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.1
    }
}

/// Diagnostic set restricted to resources with at least one problem
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticsSnapshot(Vec<ResourceDiagnostics>);

impl DiagnosticsSnapshot {
    /// Keep only resources with problems, preserving order
    pub fn capture(entries: impl IntoIterator<Item = ResourceDiagnostics>) -> Self {
        Self(
            entries
                .into_iter()
                .filter(|entry| !entry.1.is_empty())
                .collect(),
        )
    }

    /// Parse a full diagnostic set (empty resources allowed) and capture it
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let entries: Vec<ResourceDiagnostics> =
            serde_json::from_str(text).map_err(SnapshotError::Parse)?;
        Ok(Self::capture(entries))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Serialize)
    }

    pub fn resources(&self) -> &[ResourceDiagnostics] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of problems across resources
    pub fn problem_count(&self) -> usize {
        self.0.iter().map(|entry| entry.1.len()).sum()
    }
}

/// Drops a serialized snapshot equal to the immediately preceding one
#[derive(Debug, Default)]
pub struct SnapshotDeduplicator {
    last: Option<String>,
}

impl SnapshotDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(json)` if it differs from the last admitted value
    pub fn admit(&mut self, json: String) -> Option<String> {
        if self.last.as_deref() == Some(json.as_str()) {
            return None;
        }
        self.last = Some(json.clone());
        Some(json)
    }
}

/// In-memory diagnostic set, queryable on demand
///
/// Stands in for the host diagnostics API: every mutation notifies
/// `changes()` listeners.
pub struct DiagnosticsStore {
    entries: Mutex<Vec<ResourceDiagnostics>>,
    changes: Emitter<()>,
}

impl Default for DiagnosticsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticsStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            changes: Emitter::new(),
        }
    }

    /// Change notifications
    pub fn changes(&self) -> Emitter<()> {
        self.changes.clone()
    }

    /// Replace the problems of one resource, keeping its position
    pub fn set(&self, resource: &str, diagnostics: Vec<Diagnostic>) {
        {
            let mut entries = self.entries.lock();
            match entries.iter_mut().find(|entry| entry.0 == resource) {
                Some(entry) => entry.1 = diagnostics,
                None => entries.push(ResourceDiagnostics(resource.to_string(), diagnostics)),
            }
        }
        self.changes.emit(());
    }

    /// Replace the whole set
    pub fn replace(&self, entries: Vec<ResourceDiagnostics>) {
        *self.entries.lock() = entries;
        self.changes.emit(());
    }

    /// Current full set, including resources without problems
    pub fn current(&self) -> Vec<ResourceDiagnostics> {
        self.entries.lock().clone()
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot::capture(self.current())
    }
}

/// Writes serialized snapshots under the logging directory
pub struct Snapshotter {
    folders: Arc<dyn WorkspaceFolders>,
    reporter: Arc<dyn Reporter>,
    logging_dir: String,
}

impl Snapshotter {
    pub fn new(folders: Arc<dyn WorkspaceFolders>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            folders,
            reporter,
            logging_dir: DEFAULT_LOGGING_DIR.to_string(),
        }
    }

    pub fn with_logging_dir(mut self, name: impl Into<String>) -> Self {
        self.logging_dir = name.into();
        self
    }

    /// Write one snapshot; returns the artifact path on success
    ///
    /// Failures are reported, never returned.
    pub async fn write_once(&self, json: &str) -> Option<PathBuf> {
        let root = resolve_workspace_root(&self.folders.folders(), self.reporter.as_ref())?;

        match self.try_write(&root, json).await {
            Ok(path) => {
                tracing::debug!("Wrote diagnostics snapshot {}", path.display());
                Some(path)
            }
            Err(e) => {
                self.reporter.error(&format!("Failed to save diagnostics: {}", e));
                None
            }
        }
    }

    async fn try_write(&self, root: &Path, json: &str) -> Result<PathBuf, SnapshotError> {
        let stamp = timestamp::now_stamp();
        let logging_dir = LoggingDir::new(root, &self.logging_dir);
        logging_dir
            .ensure()
            .await
            .map_err(|source| SnapshotError::Write {
                path: logging_dir.path().to_path_buf(),
                source,
            })?;

        let path = logging_dir.artifact_path(ArtifactKind::Diagnostics, &stamp);
        let write_err = |source| SnapshotError::Write {
            path: path.clone(),
            source,
        };

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(write_err)?;
        file.write_all(json.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        Ok(path)
    }
}

#[async_trait]
impl watcher::Action<String> for Snapshotter {
    async fn run(&self, json: String) -> anyhow::Result<()> {
        self.write_once(&json).await;
        Ok(())
    }
}

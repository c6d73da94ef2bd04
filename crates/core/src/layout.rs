//! Artifact layout under the logging directory
//!
//! ```text
//! <workspace root>/
//!   _ipmanten/
//!     backup-20240103-143000.tar
//!     diagnostics-20240103-143005.json
//!     diagnostics-20240103-143005-1.json
//!     watch.lock
//! ```
//!
//! Artifacts are append-only: a name that is already taken gets a `-N`
//! suffix rather than being overwritten.

use std::io;
use std::path::{Path, PathBuf};

/// Directory name created under the workspace root
pub const DEFAULT_LOGGING_DIR: &str = "_ipmanten";

/// Kind of artifact written under the logging directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Tar archive of the workspace sources
    Backup,
    /// JSON dump of the diagnostic set
    Diagnostics,
}

impl ArtifactKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::Backup => "backup",
            ArtifactKind::Diagnostics => "diagnostics",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Backup => "tar",
            ArtifactKind::Diagnostics => "json",
        }
    }
}

/// The logging directory of one workspace root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingDir {
    path: PathBuf,
}

impl LoggingDir {
    pub fn new(root: &Path, name: &str) -> Self {
        Self {
            path: root.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory (and parents) if absent
    ///
    /// Idempotent, so both pipelines may call it concurrently.
    pub async fn ensure(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.path).await
    }

    /// First free artifact path for the given stamp
    pub fn artifact_path(&self, kind: ArtifactKind, stamp: &str) -> PathBuf {
        let base = format!("{}-{}", kind.prefix(), stamp);
        let first = self.path.join(format!("{}.{}", base, kind.extension()));
        if !first.exists() {
            return first;
        }

        (1u32..)
            .map(|n| self.path.join(format!("{}-{}.{}", base, n, kind.extension())))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }
}

//! Source archiving
//!
//! On each run every `*.java` file under the workspace root is bundled into a
//! new tar archive under the logging directory. The tar program is an opaque
//! collaborator behind `ArchiveTool`; it receives structured arguments and the
//! file list on stdin, never a shell string.

use async_trait::async_trait;
use ipm_core::{
    resolve_workspace_root, timestamp, ArtifactKind, LoggingDir, Reporter, WorkspaceFolders,
    DEFAULT_LOGGING_DIR,
};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to create {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to communicate with `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("`{program}` did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// External archiving tool
#[async_trait]
pub trait ArchiveTool: Send + Sync {
    /// Bundle `files` (relative to `source_dir`) into a new archive at `output`
    async fn archive(
        &self,
        source_dir: &Path,
        files: &[PathBuf],
        output: &Path,
    ) -> Result<(), ArchiveError>;
}

/// `tar` subprocess fed a NUL-separated file list on stdin
#[derive(Debug, Clone)]
pub struct TarTool {
    program: String,
    timeout: Option<Duration>,
}

impl Default for TarTool {
    fn default() -> Self {
        Self::new("tar")
    }
}

impl TarTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: Some(Duration::from_secs(120)),
        }
    }

    /// `None` waits for tar indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ArchiveTool for TarTool {
    async fn archive(
        &self,
        source_dir: &Path,
        files: &[PathBuf],
        output: &Path,
    ) -> Result<(), ArchiveError> {
        let mut child = Command::new(&self.program)
            .arg("-cf")
            .arg(output)
            .arg("--null")
            .arg("--files-from")
            .arg("-")
            .current_dir(source_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ArchiveError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut list = Vec::new();
        for file in files {
            list.extend_from_slice(file.as_os_str().as_encoded_bytes());
            list.push(0);
        }

        // Write the list while stderr drains
        let writer = child.stdin.take().map(|mut stdin| {
            tokio::spawn(async move {
                stdin.write_all(&list).await?;
                stdin.shutdown().await
            })
        });

        let waiting = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, waiting).await.map_err(|_| {
                ArchiveError::Timeout {
                    program: self.program.clone(),
                    timeout: limit,
                }
            })?,
            None => waiting.await,
        }
        .map_err(|source| ArchiveError::Io {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ArchiveError::Exit {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if let Some(writer) = writer {
            writer.await?.map_err(|source| ArchiveError::Io {
                program: self.program.clone(),
                source,
            })?;
        }

        Ok(())
    }
}

/// Every file under `root` with the given extension, relative to `root`
///
/// Skips `excluded` (the logging directory). Unreadable entries are logged
/// and skipped, like `find` does.
pub fn collect_sources(root: &Path, extension: &str, excluded: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != excluded)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if entry.path().extension().is_some_and(|ext| ext == extension) {
            if let Ok(rel_path) = entry.path().strip_prefix(root) {
                files.push(rel_path.to_path_buf());
            }
        }
    }

    files
}

/// Archives workspace sources on demand
pub struct Archiver {
    folders: Arc<dyn WorkspaceFolders>,
    tool: Arc<dyn ArchiveTool>,
    reporter: Arc<dyn Reporter>,
    logging_dir: String,
    extension: String,
}

impl Archiver {
    pub fn new(
        folders: Arc<dyn WorkspaceFolders>,
        tool: Arc<dyn ArchiveTool>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            folders,
            tool,
            reporter,
            logging_dir: DEFAULT_LOGGING_DIR.to_string(),
            extension: "java".to_string(),
        }
    }

    pub fn with_logging_dir(mut self, name: impl Into<String>) -> Self {
        self.logging_dir = name.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Archive once; returns the artifact path on success
    ///
    /// Failures are reported, never returned.
    pub async fn archive_once(&self) -> Option<PathBuf> {
        let root = resolve_workspace_root(&self.folders.folders(), self.reporter.as_ref())?;

        match self.try_archive(&root).await {
            Ok((output, count)) => {
                self.reporter.info(&format!(
                    "Backed up {} file(s) to {}",
                    count,
                    output.display()
                ));
                Some(output)
            }
            Err(e) => {
                self.reporter.error(&format!("Failed to back up {}: {}", root.display(), e));
                None
            }
        }
    }

    async fn try_archive(&self, root: &Path) -> Result<(PathBuf, usize), ArchiveError> {
        let stamp = timestamp::now_stamp();
        let logging_dir = LoggingDir::new(root, &self.logging_dir);
        logging_dir
            .ensure()
            .await
            .map_err(|source| ArchiveError::Prepare {
                path: logging_dir.path().to_path_buf(),
                source,
            })?;

        let files = {
            let root = root.to_path_buf();
            let extension = self.extension.clone();
            let excluded = logging_dir.path().to_path_buf();
            tokio::task::spawn_blocking(move || collect_sources(&root, &extension, &excluded))
                .await?
        };

        let output = logging_dir.artifact_path(ArtifactKind::Backup, &stamp);
        self.tool.archive(root, &files, &output).await?;
        Ok((output, files.len()))
    }
}

#[async_trait]
impl watcher::Action<()> for Archiver {
    async fn run(&self, _payload: ()) -> anyhow::Result<()> {
        self.archive_once().await;
        Ok(())
    }
}

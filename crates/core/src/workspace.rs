//! Workspace root resolution
//!
//! The host hands out zero or more workspace folders as URIs. Every triggered
//! action resolves the root again, since the folder set can change between
//! events.

use crate::report::Reporter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors building a workspace folder from user input
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to resolve workspace path {path}: {source}")]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("workspace path is not absolute: {0}")]
    NotAbsolute(PathBuf),
}

/// One folder open in the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFolder {
    pub uri: Url,
}

impl WorkspaceFolder {
    pub fn new(uri: Url) -> Self {
        Self { uri }
    }

    /// Folder for a local directory
    pub fn from_path(path: &Path) -> Result<Self, WorkspaceError> {
        let absolute = std::path::absolute(path).map_err(|source| WorkspaceError::Path {
            path: path.to_path_buf(),
            source,
        })?;

        Url::from_directory_path(&absolute)
            .map(Self::new)
            .map_err(|_| WorkspaceError::NotAbsolute(absolute))
    }

    /// Parse a CLI argument: a URI with a real scheme, or a path
    ///
    /// Single-letter schemes are Windows drive letters, not URIs.
    pub fn parse(input: &str) -> Result<Self, WorkspaceError> {
        if let Ok(uri) = Url::parse(input) {
            if uri.scheme().len() > 1 {
                return Ok(Self::new(uri));
            }
        }
        Self::from_path(Path::new(input))
    }
}

/// Host collaborator listing the currently open workspace folders
pub trait WorkspaceFolders: Send + Sync {
    fn folders(&self) -> Vec<WorkspaceFolder>;
}

impl WorkspaceFolders for Vec<WorkspaceFolder> {
    fn folders(&self) -> Vec<WorkspaceFolder> {
        self.clone()
    }
}

/// Resolve the local root directory actions should write under
///
/// - no folders: `None`, silently
/// - several folders: warn, use the first
/// - non-`file` scheme: warn, `None`
pub fn resolve_workspace_root(
    folders: &[WorkspaceFolder],
    reporter: &dyn Reporter,
) -> Option<PathBuf> {
    let first = folders.first()?;

    if folders.len() > 1 {
        reporter.warn(&format!(
            "{} workspace folders are open; using only {}",
            folders.len(),
            first.uri
        ));
    }

    if first.uri.scheme() != "file" {
        reporter.warn(&format!(
            "ignoring workspace with unsupported scheme '{}': {}",
            first.uri.scheme(),
            first.uri
        ));
        return None;
    }

    match first.uri.to_file_path() {
        Ok(path) => Some(path),
        Err(()) => {
            reporter.warn(&format!("workspace URI has no local path: {}", first.uri));
            None
        }
    }
}

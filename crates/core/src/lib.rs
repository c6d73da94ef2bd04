//! Shared building blocks for ipmanten
//!
//! This crate provides:
//! - Workspace root resolution from host folder URIs
//! - Artifact layout under the logging directory (`_ipmanten/`)
//! - Second-resolution artifact timestamps
//! - Configuration loading and validation
//! - The injected reporting sink used by every pipeline component

pub mod config;
pub mod layout;
pub mod report;
pub mod timestamp;
pub mod workspace;

// Re-exports
pub use config::{Config, ConfigError};
pub use layout::{ArtifactKind, LoggingDir, DEFAULT_LOGGING_DIR};
pub use report::{RecordingReporter, ReportLevel, Reporter, TracingReporter};
pub use workspace::{resolve_workspace_root, WorkspaceError, WorkspaceFolder, WorkspaceFolders};

//! Workspace artifact journal
//!
//! This crate provides:
//! - Source archiving into `_ipmanten/backup-<stamp>.tar`
//! - Diagnostic snapshots into `_ipmanten/diagnostics-<stamp>.json`
//! - The save→archive and diagnostics→snapshot pipelines

pub mod archive;
pub mod diagnostics;
pub mod pipeline;

// Re-exports
pub use archive::{collect_sources, ArchiveError, ArchiveTool, Archiver, TarTool};
pub use diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticsSnapshot, DiagnosticsStore, Position, Range,
    ResourceDiagnostics, Severity, SnapshotDeduplicator, SnapshotError, Snapshotter,
};
pub use pipeline::{wire_diagnostics_pipeline, wire_save_pipeline};

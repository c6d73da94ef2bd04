//! Watch a workspace until Ctrl-C
//!
//! Saves of source files feed the archive runner; diagnostics read from
//! stdin feed the snapshot runner.

use crate::locks::WatchLock;
use crate::util;
use anyhow::{Context, Result};
use ipm_core::{resolve_workspace_root, LoggingDir, Reporter, TracingReporter, WorkspaceFolders};
use journal::{
    wire_diagnostics_pipeline, wire_save_pipeline, Diagnostic, DiagnosticsStore,
    ResourceDiagnostics,
};
use owo_colors::OwoColorize;
use serde::Deserialize;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use watcher::{DebouncedRunner, EventStream, SaveWatcher};

/// One line of the stdin diagnostics feed
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedMessage {
    /// `{"uri": "...", "diagnostics": [...]}`: problems of one resource
    Publish {
        uri: String,
        diagnostics: Vec<Diagnostic>,
    },
    /// `[["uri", [...]], ...]`: the whole set
    Full(Vec<ResourceDiagnostics>),
}

pub async fn run(config_path: Option<&Path>, workspaces: &[String], diagnostics_stdin: bool) -> Result<()> {
    let folders = util::workspace_folders(workspaces)?;
    let config = util::load_config(config_path, &folders)?;
    let reporter: Arc<dyn Reporter> = Arc::new(TracingReporter::new("watch"));

    let root = resolve_workspace_root(&folders, reporter.as_ref())
        .context("No local workspace folder to watch")?;
    let logging_dir = LoggingDir::new(&root, &config.workspace.logging_dir);
    let _lock = WatchLock::acquire(logging_dir.path())?;

    let folders: Arc<dyn WorkspaceFolders> = Arc::new(folders);
    let archive_runner = DebouncedRunner::spawn(
        "archive",
        util::archiver(&config, Arc::clone(&folders), Arc::new(TracingReporter::new("archive"))),
        config.archive.cooldown(),
        Arc::clone(&reporter),
    );
    let snapshot_runner = DebouncedRunner::spawn(
        "snapshot",
        util::snapshotter(&config, Arc::clone(&folders), Arc::new(TracingReporter::new("snapshot"))),
        config.diagnostics.cooldown(),
        Arc::clone(&reporter),
    );

    // Save → archive
    let mut save_watcher =
        SaveWatcher::new(&root, &config.workspace.source_extension, logging_dir.path());
    let mut saves = EventStream::new(save_watcher.events());
    wire_save_pipeline(&mut saves, &archive_runner)?;
    save_watcher.start().context("Failed to start file watcher")?;

    // Diagnostics → snapshot
    let store = Arc::new(DiagnosticsStore::new());
    let mut changes = EventStream::new(store.changes());
    wire_diagnostics_pipeline(&mut changes, Arc::clone(&store), &snapshot_runner, Arc::clone(&reporter))?;
    if diagnostics_stdin {
        spawn_feed(Arc::clone(&store))?;
    }

    println!(
        "{} {} {}",
        "Watching".green().bold(),
        root.display(),
        "(Ctrl-C to stop)".dimmed()
    );
    println!("  {}: {}", "Artifacts".dimmed(), logging_dir.path().display());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Stopping");
    save_watcher.stop();
    saves.unsubscribe();
    changes.unsubscribe();
    archive_runner.shutdown().await;
    snapshot_runner.shutdown().await;

    println!("{}", "Stopped".yellow());
    Ok(())
}

/// Apply NDJSON diagnostics from stdin on a detached OS thread
///
/// Blocking stdin reads cannot be cancelled; keep them off the runtime.
fn spawn_feed(store: Arc<DiagnosticsStore>) -> Result<()> {
    std::thread::Builder::new()
        .name("diagnostics-feed".into())
        .spawn(move || feed_diagnostics(std::io::stdin().lock(), &store))
        .context("Failed to start diagnostics feed")?;
    Ok(())
}

fn feed_diagnostics(input: impl BufRead, store: &DiagnosticsStore) {
    for line in input.lines() {
        match line {
            Ok(line) => {
                if let Err(e) = apply_feed_line(store, &line) {
                    tracing::warn!("Ignoring diagnostics line: {:#}", e);
                }
            }
            Err(e) => {
                tracing::warn!("Diagnostics feed failed: {}", e);
                return;
            }
        }
    }
    tracing::debug!("Diagnostics feed closed");
}

fn apply_feed_line(store: &DiagnosticsStore, line: &str) -> Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    let message: FeedMessage = serde_json::from_str(line).context("Malformed diagnostics JSON")?;
    match message {
        FeedMessage::Publish { uri, diagnostics } => store.set(&uri, diagnostics),
        FeedMessage::Full(entries) => store.replace(entries),
    }
    Ok(())
}

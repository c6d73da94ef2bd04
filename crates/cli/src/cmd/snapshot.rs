//! One-off diagnostics snapshot from a JSON file

use crate::util;
use anyhow::{Context, Result};
use ipm_core::{TracingReporter, WorkspaceFolders};
use journal::DiagnosticsSnapshot;
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;

pub async fn run(config_path: Option<&Path>, file: &Path, workspaces: &[String]) -> Result<()> {
    let folders = util::workspace_folders(workspaces)?;
    let config = util::load_config(config_path, &folders)?;

    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let snapshot = DiagnosticsSnapshot::from_json(&text)
        .with_context(|| format!("Invalid diagnostics in {}", file.display()))?;
    let json = snapshot.to_json()?;

    let folders: Arc<dyn WorkspaceFolders> = Arc::new(folders);
    let snapshotter =
        util::snapshotter(&config, folders, Arc::new(TracingReporter::new("snapshot")));

    match snapshotter.write_once(&json).await {
        Some(path) => {
            println!(
                "{} {} {}",
                "Saved".green(),
                path.display(),
                format!(
                    "({} problem(s) in {} file(s))",
                    snapshot.problem_count(),
                    snapshot.resources().len()
                )
                .dimmed()
            );
            Ok(())
        }
        None => anyhow::bail!("Snapshot was not written (see log for details)"),
    }
}

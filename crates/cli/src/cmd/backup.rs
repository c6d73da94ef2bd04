//! One-off source backup

use crate::util;
use anyhow::Result;
use ipm_core::{TracingReporter, WorkspaceFolders};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;

pub async fn run(config_path: Option<&Path>, workspaces: &[String]) -> Result<()> {
    let folders = util::workspace_folders(workspaces)?;
    let config = util::load_config(config_path, &folders)?;
    let folders: Arc<dyn WorkspaceFolders> = Arc::new(folders);

    let archiver = util::archiver(&config, folders, Arc::new(TracingReporter::new("archive")));

    match archiver.archive_once().await {
        Some(path) => {
            println!("{} {}", "Backed up to".green(), path.display());
            Ok(())
        }
        None => anyhow::bail!("Backup was not created (see log for details)"),
    }
}

//! Render a score sheet as a standalone HTML page

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    file: &Path,
    output: Option<&Path>,
    icon_args: &[String],
    title: &str,
) -> Result<()> {
    let folders = util::workspace_folders(&[])?;
    let config = util::load_config(config_path, &folders)?;
    let icons = util::grade_icons(&config, icon_args)?;

    let csv_text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let table = assist::render_table(&csv_text, &icons)
        .with_context(|| format!("Failed to render {}", file.display()))?;
    let page = assist::render_page(title, &table);

    match output {
        Some(path) => {
            tokio::fs::write(path, page)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "Wrote".green(), path.display());
        }
        None => print!("{}", page),
    }

    Ok(())
}

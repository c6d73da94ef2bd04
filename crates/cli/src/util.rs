//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use assist::{GradeIcons, HintRule, HintTable};
use ipm_core::{config, Config, Reporter, WorkspaceFolder, WorkspaceFolders};
use journal::{Archiver, Snapshotter, TarTool};
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the tracing subscriber
///
/// With `log_dir`, logs are also appended to a daily rolling file; the
/// returned guard must live until exit.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let stderr = fmt::layer().with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "ipm.log"));

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()
                .context("Failed to initialize logging")?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .try_init()
                .context("Failed to initialize logging")?;
            Ok(None)
        }
    }
}

/// Workspace folders from `--workspace` values, or the current directory
pub fn workspace_folders(args: &[String]) -> Result<Vec<WorkspaceFolder>> {
    if args.is_empty() {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        return Ok(vec![WorkspaceFolder::from_path(&cwd)?]);
    }

    args.iter()
        .map(|arg| {
            WorkspaceFolder::parse(arg).with_context(|| format!("Invalid workspace: {}", arg))
        })
        .collect()
}

/// Effective configuration, considering the first folder's `.ipmanten.toml`
pub fn load_config(explicit: Option<&Path>, folders: &[WorkspaceFolder]) -> Result<Config> {
    let root = folders.first().and_then(|folder| folder.uri.to_file_path().ok());
    config::load(explicit, root.as_deref()).context("Failed to load configuration")
}

pub fn archiver(
    config: &Config,
    folders: Arc<dyn WorkspaceFolders>,
    reporter: Arc<dyn Reporter>,
) -> Archiver {
    let tool = TarTool::new(config.archive.tar_program.clone()).with_timeout(config.archive.timeout());

    Archiver::new(folders, Arc::new(tool), reporter)
        .with_logging_dir(config.workspace.logging_dir.clone())
        .with_extension(config.workspace.source_extension.clone())
}

pub fn snapshotter(
    config: &Config,
    folders: Arc<dyn WorkspaceFolders>,
    reporter: Arc<dyn Reporter>,
) -> Snapshotter {
    Snapshotter::new(folders, reporter).with_logging_dir(config.workspace.logging_dir.clone())
}

pub fn hint_table(config: &Config) -> HintTable {
    HintTable::with_rules(
        config
            .hints
            .rules
            .iter()
            .map(|rule| HintRule::new(rule.match_text.clone(), rule.message.clone())),
    )
}

/// Configured icons overlaid with `CODE=LOCATION` arguments
pub fn grade_icons(config: &Config, overrides: &[String]) -> Result<GradeIcons> {
    let mut icons: GradeIcons = config
        .scores
        .icons
        .iter()
        .filter_map(|(code, location)| single_char(code).map(|c| (c, location.clone())))
        .collect();

    for arg in overrides {
        let (code, location) = parse_icon_arg(arg)?;
        icons.insert(code, location);
    }

    Ok(icons)
}

fn parse_icon_arg(arg: &str) -> Result<(char, String)> {
    let (code, location) = arg
        .split_once('=')
        .with_context(|| format!("Invalid icon '{}': expected CODE=LOCATION", arg))?;
    let code = single_char(code.trim())
        .with_context(|| format!("Invalid icon '{}': grade code must be one character", arg))?;
    Ok((code, location.trim().to_string()))
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

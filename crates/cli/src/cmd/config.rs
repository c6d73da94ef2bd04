//! Configuration management command
//!
//! Provides CLI interface to view configuration.

use crate::util;
use anyhow::{Context, Result};
use ipm_core::config;
use owo_colors::OwoColorize;

/// Show the effective configuration
pub async fn run_list(config_path: Option<&std::path::Path>, workspaces: &[String]) -> Result<()> {
    let folders = util::workspace_folders(workspaces)?;
    let config = util::load_config(config_path, &folders)?;

    println!("{}", "Effective Configuration".bold());
    if let Some(path) = config::config_file_path() {
        println!("{}: {}\n", "User file".dimmed(), path.display().dimmed());
    }

    println!("{}", "[workspace]".yellow());
    println!("  {} = {}", "logging_dir".cyan(), config.workspace.logging_dir);
    println!("  {} = {}", "source_extension".cyan(), config.workspace.source_extension);

    println!("\n{}", "[archive]".yellow());
    println!(
        "  {} = {} {}",
        "cooldown_ms".cyan(),
        config.archive.cooldown_ms,
        format!("({:.1}s)", config.archive.cooldown_ms as f64 / 1000.0).dimmed()
    );
    println!("  {} = {}", "tar_program".cyan(), config.archive.tar_program);
    println!(
        "  {} = {} {}",
        "timeout_secs".cyan(),
        config.archive.timeout_secs,
        if config.archive.timeout_secs == 0 {
            "(no timeout)".dimmed().to_string()
        } else {
            format!("({}s)", config.archive.timeout_secs).dimmed().to_string()
        }
    );

    println!("\n{}", "[diagnostics]".yellow());
    println!(
        "  {} = {} {}",
        "cooldown_ms".cyan(),
        config.diagnostics.cooldown_ms,
        format!("({:.1}s)", config.diagnostics.cooldown_ms as f64 / 1000.0).dimmed()
    );

    println!("\n{}", "[hints]".yellow());
    if config.hints.rules.is_empty() {
        println!("  {}", "(built-in rules only)".dimmed());
    }
    for rule in &config.hints.rules {
        println!("  {} => {}", rule.match_text.cyan(), rule.message);
    }

    println!("\n{}", "[scores.icons]".yellow());
    if config.scores.icons.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (code, location) in &config.scores.icons {
        println!("  {} = {}", code.cyan(), location);
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  cooldown_ms: 100-600,000");
    println!("  timeout_secs: 0-3600 (0 = no timeout)");

    Ok(())
}

/// Print the user config file path
pub async fn run_path(create: bool) -> Result<()> {
    let path = if create {
        config::init_if_missing().context("Failed to create config file")?
    } else {
        config::config_file_path().context("Could not determine config file path")?
    };

    println!("{}", path.display());
    Ok(())
}

/// Print an annotated example configuration
pub async fn run_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

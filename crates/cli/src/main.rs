//! ipmanten CLI - ipm command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod locks;
mod util;

/// ipmanten - Java classroom companion: save backups, diagnostics history, exception hints
#[derive(Parser)]
#[command(name = "ipm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this configuration file instead of the usual lookup
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up sources on save and record diagnostics until Ctrl-C
    Watch {
        /// Workspace folder (URI or path); repeatable, defaults to the current directory
        #[arg(short, long = "workspace", value_name = "URI_OR_PATH")]
        workspaces: Vec<String>,

        /// Read published diagnostics as NDJSON from stdin
        #[arg(long)]
        diagnostics_stdin: bool,

        /// Also write logs to daily files in this directory
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },
    /// Archive the workspace sources once
    Backup {
        /// Workspace folder (URI or path); repeatable, defaults to the current directory
        #[arg(short, long = "workspace", value_name = "URI_OR_PATH")]
        workspaces: Vec<String>,
    },
    /// Record one diagnostics snapshot from a JSON file
    Snapshot {
        /// Diagnostics file: [["file:///…", [diagnostic, …]], …]
        file: PathBuf,

        /// Workspace folder (URI or path); repeatable, defaults to the current directory
        #[arg(short, long = "workspace", value_name = "URI_OR_PATH")]
        workspaces: Vec<String>,
    },
    /// Annotate program output on stdin with exception hints
    Hints,
    /// Render a score sheet CSV as an HTML page
    Scores {
        /// Score sheet
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Grade icon as CODE=LOCATION; repeatable, overrides the config
        #[arg(long = "icon", value_name = "CODE=LOCATION")]
        icons: Vec<String>,

        /// Page title
        #[arg(long, default_value = "Scores")]
        title: String,
    },
    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    List {
        /// Workspace whose .ipmanten.toml should be considered
        #[arg(short, long = "workspace", value_name = "URI_OR_PATH")]
        workspaces: Vec<String>,
    },
    /// Print the user config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Print an annotated example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = match &cli.command {
        Commands::Watch { log_dir, .. } => log_dir.as_deref(),
        _ => None,
    };
    // Keeps the non-blocking file writer flushing until exit
    let _log_guard = util::init_logging(cli.verbose, log_dir)?;

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Watch { workspaces, diagnostics_stdin, .. } => {
            cmd::watch::run(config, &workspaces, diagnostics_stdin).await
        }
        Commands::Backup { workspaces } => cmd::backup::run(config, &workspaces).await,
        Commands::Snapshot { file, workspaces } => {
            cmd::snapshot::run(config, &file, &workspaces).await
        }
        Commands::Hints => cmd::hints::run(config).await,
        Commands::Scores { file, output, icons, title } => {
            cmd::scores::run(config, &file, output.as_deref(), &icons, &title).await
        }
        Commands::Config(command) => match command {
            ConfigCommands::List { workspaces } => cmd::config::run_list(config, &workspaces).await,
            ConfigCommands::Path { create } => cmd::config::run_path(create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}

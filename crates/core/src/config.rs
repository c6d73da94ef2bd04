//! Configuration file handling
//!
//! Lookup order: explicit `--config` path, `<workspace>/.ipmanten.toml`,
//! `<config dir>/ipmanten/config.toml`, built-in defaults.

use crate::layout::DEFAULT_LOGGING_DIR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Per-workspace config file name
pub const WORKSPACE_CONFIG_FILE: &str = ".ipmanten.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("could not determine the user config directory")]
    NoConfigDir,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub archive: ArchiveConfig,
    pub diagnostics: DiagnosticsConfig,
    pub hints: HintsConfig,
    pub scores: ScoresConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory (under the workspace root) receiving every artifact
    pub logging_dir: String,
    /// Extension of the source files that are archived and watched
    pub source_extension: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            logging_dir: DEFAULT_LOGGING_DIR.to_string(),
            source_extension: "java".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub cooldown_ms: u64,
    pub tar_program: String,
    /// 0 disables the timeout
    pub timeout_secs: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 1_000,
            tar_program: "tar".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ArchiveConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub cooldown_ms: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { cooldown_ms: 5_000 }
    }
}

impl DiagnosticsConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HintsConfig {
    /// Extra rules appended after the built-in exception table
    pub rules: Vec<HintRuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintRuleConfig {
    pub match_text: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoresConfig {
    /// Grade code -> medal image location
    pub icons: BTreeMap<String, String>,
}

const COOLDOWN_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=600_000;
const TIMEOUT_MAX_SECS: u64 = 3_600;

impl Config {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dir = &self.workspace.logging_dir;
        if dir.is_empty() || dir.contains('/') || dir.contains('\\') || dir == "." || dir == ".." {
            return Err(ConfigError::Invalid(format!(
                "workspace.logging_dir must be a plain directory name, got '{}'",
                dir
            )));
        }

        if self.workspace.source_extension.is_empty()
            || self.workspace.source_extension.starts_with('.')
        {
            return Err(ConfigError::Invalid(
                "workspace.source_extension must be non-empty and without a leading dot".into(),
            ));
        }

        for (key, value) in [
            ("archive.cooldown_ms", self.archive.cooldown_ms),
            ("diagnostics.cooldown_ms", self.diagnostics.cooldown_ms),
        ] {
            if !COOLDOWN_RANGE_MS.contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within {}-{}, got {}",
                    key,
                    COOLDOWN_RANGE_MS.start(),
                    COOLDOWN_RANGE_MS.end(),
                    value
                )));
            }
        }

        if self.archive.timeout_secs > TIMEOUT_MAX_SECS {
            return Err(ConfigError::Invalid(format!(
                "archive.timeout_secs must be within 0-{}, got {}",
                TIMEOUT_MAX_SECS, self.archive.timeout_secs
            )));
        }

        if self.archive.tar_program.trim().is_empty() {
            return Err(ConfigError::Invalid("archive.tar_program must not be empty".into()));
        }

        if let Some(rule) = self.hints.rules.iter().find(|r| r.match_text.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "hint rule with message '{}' has an empty match_text",
                rule.message
            )));
        }

        if let Some(code) = self.scores.icons.keys().find(|k| k.chars().count() != 1) {
            return Err(ConfigError::Invalid(format!(
                "grade codes must be a single character, got '{}'",
                code
            )));
        }

        Ok(())
    }
}

/// Path of the user-level config file
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ipmanten").join("config.toml"))
}

/// Load the effective configuration
pub fn load(explicit: Option<&Path>, workspace_root: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_from(path);
    }

    let candidates = workspace_root
        .map(|root| root.join(WORKSPACE_CONFIG_FILE))
        .into_iter()
        .chain(config_file_path());

    for candidate in candidates {
        if candidate.is_file() {
            tracing::debug!("Loading configuration from {}", candidate.display());
            return load_from(&candidate);
        }
    }

    Ok(Config::default())
}

/// Load and validate a specific file
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    config.validate()?;
    Ok(config)
}

/// Write a configuration file, creating parent directories
pub fn save(config: &Config, path: &Path) -> Result<(), ConfigError> {
    config.validate()?;
    let text = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Create the user-level config file with defaults if it does not exist
pub fn init_if_missing() -> Result<PathBuf, ConfigError> {
    let path = config_file_path().ok_or(ConfigError::NoConfigDir)?;
    if !path.exists() {
        save(&Config::default(), &path)?;
    }
    Ok(path)
}

/// Annotated example configuration
pub fn example_config() -> &'static str {
    r#"# ipmanten configuration

[workspace]
# Directory under the workspace root that receives backups and diagnostics
logging_dir = "_ipmanten"
# Source files archived on save
source_extension = "java"

[archive]
# Quiet period after each backup (milliseconds)
cooldown_ms = 1000
tar_program = "tar"
# Kill tar after this many seconds (0 = wait forever)
timeout_secs = 120

[diagnostics]
# Quiet period after each diagnostics snapshot (milliseconds)
cooldown_ms = 5000

# Extra terminal hints, checked after the built-in exception table
[[hints.rules]]
match_text = "java.util.InputMismatchException"
message = "入力された値の型が想定と異なるようです。"

[scores.icons]
G = "medals/gold.png"
S = "medals/silver.png"
B = "medals/bronze.png"
"#
}

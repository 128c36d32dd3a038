//! Application path configuration.
//!
//! Resolves where the schedule document, logs and backups live.
//! Priority: CLI `--config-dir` → `CIRCADIA_CONFIG_DIR` env var → the current
//! directory if it already holds circadia files → platform directories from
//! `dirs-next`.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Configuration for overriding default application paths.
#[derive(Debug, Clone)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV).
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Create from CLI arguments and environment variables.
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir =
            cli_dir.or_else(|| std::env::var("CIRCADIA_CONFIG_DIR").ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Path to a configuration file (the schedule document by default).
///
/// Platform paths when nothing overrides:
/// - Linux: `~/.config/circadia/{name}`
/// - macOS: `~/Library/Application Support/circadia/{name}`
/// - Windows: `%APPDATA%\circadia\{name}`
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_config_dir(config).join(name)
}

/// Path to a data file (logs, schedule backups).
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    get_data_dir(config).join(name)
}

/// Ensure configuration and data directories exist.
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = get_config_dir(config);
    let data_dir = get_data_dir(config);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!("failed to create config directory {}", config_dir.display())
        })?;
    }

    if data_dir != config_dir && !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
    }

    Ok(())
}

/// Check if any circadia files exist in the given directory.
fn has_local_files(dir: &PathBuf) -> bool {
    let files = ["schedule.json", "circadia.log"];
    files.iter().any(|f| dir.join(f).exists())
}

fn get_config_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Ok(current_dir) = std::env::current_dir() {
        if has_local_files(&current_dir) {
            return current_dir;
        }
    }

    if let Some(dir) = dirs_next::config_dir() {
        return dir.join("circadia");
    }

    PathBuf::from(".")
}

fn get_data_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Ok(current_dir) = std::env::current_dir() {
        if has_local_files(&current_dir) {
            return current_dir;
        }
    }

    if let Some(dir) = dirs_next::data_dir() {
        return dir.join("circadia");
    }

    PathBuf::from(".")
}

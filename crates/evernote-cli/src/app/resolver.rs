//! Config path resolution.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, read_config, EvernoteConfig};
use crate::constants::ENV_CONFIG;
use crate::errors::CliError;

/// Resolve the config file path: `EVERNOTE_CONFIG`, then `--config`, then the XDG default.
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(ENV_CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    if let Some(path) = &cli.config {
        return Ok(path.clone());
    }
    default_config_path()
}

/// Load the config at `path`, failing with a not-found error when it is absent.
pub fn load_config(path: &Path) -> anyhow::Result<EvernoteConfig> {
    if !path.exists() {
        return Err(CliError::not_found(
            missing_config_message(path),
            "Hint: Run `evernote-cli init` to set up your consumer key and authorize.",
        )
        .into());
    }
    read_config(path)
}

/// Error message when the config file is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!("No config found at {}", config_path.display())
}

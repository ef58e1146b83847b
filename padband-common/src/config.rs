//! Configuration loading and root folder resolution
//!
//! The root folder holds the SQLite database and any locally cached state.
//! Resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Optional on-disk configuration (config.toml in the platform config dir)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder for database and local state
    pub root_folder: Option<PathBuf>,
    /// Base URL of the remote sound asset store
    pub sound_store_url: Option<String>,
}

/// Resolve the root folder for database and local state
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config) = load_config_file() {
        if let Some(root_folder) = config.root_folder {
            return root_folder;
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Resolve the remote sound store base URL (env var, then config file)
///
/// Missing configuration is not fatal; the caller decides whether to run
/// without a remote store.
pub fn resolve_sound_store_url(cli_arg: Option<&str>, env_var_name: &str) -> Option<String> {
    if let Some(url) = cli_arg {
        return Some(url.to_string());
    }
    if let Ok(url) = std::env::var(env_var_name) {
        return Some(url);
    }
    load_config_file().ok().and_then(|c| c.sound_store_url)
}

/// Load config.toml from the platform config directory
pub fn load_config_file() -> Result<TomlConfig> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid config.toml: {}", e)))
}

/// Default configuration file path for the platform
fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("padband").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/padband/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("padband"))
        .unwrap_or_else(|| PathBuf::from("./padband_data"))
}

/// Ensure the root folder exists, creating it if necessary
pub fn ensure_root_folder(root: &PathBuf) -> Result<()> {
    std::fs::create_dir_all(root)?;
    Ok(())
}

/// Database path within the root folder
pub fn database_path(root: &PathBuf) -> PathBuf {
    root.join("padband.db")
}

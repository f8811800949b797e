//! Default file locations

use std::path::{Path, PathBuf};

const APP_NAME: &str = "focusguard";
const CONFIG_FILE: &str = "config.toml";
const STORE_FILE: &str = "blocklist.toml";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Per-user configuration file
pub fn default_config_path() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Per-user blocklist file
pub fn default_store_path() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().join(STORE_FILE))
        .unwrap_or_else(|| PathBuf::from(STORE_FILE))
}

/// Blocklist path: CLI override, then configuration, then the default
pub fn store_path(cli: Option<&Path>, configured: Option<&Path>) -> PathBuf {
    cli.or(configured)
        .map(Path::to_path_buf)
        .unwrap_or_else(default_store_path)
}

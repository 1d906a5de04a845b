//! Application configuration.
//!
//! Values come from built-in defaults, then `config.toml` in the user config
//! directory, then `PLANNING_POKER_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::identity::IdentityStore;

/// Directory name under the platform config directory.
pub const CONFIG_DIR: &str = "planning-poker";
/// Configuration file name.
pub const CONFIG_FILE: &str = "config.toml";
/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "PLANNING_POKER";
/// Inactivity window after which a room is wiped on the next join.
pub const DEFAULT_ROOM_TTL_HOURS: u64 = 24;

const DEFAULT_CONFIG: &str = r#"# Planning poker configuration.

# Firebase Realtime Database URL, e.g. https://<project>-default-rtdb.<region>.firebasedatabase.app
# Leave empty to run against an in-process store (single machine only).
database_url = ""

# Optional database secret or ID token appended as `?auth=`.
# auth_token = ""

# Hours of inactivity after which a room is treated as new.
room_ttl_hours = 24

# Where the client identifier and last name are kept.
# identity_path = "/path/to/identity.json"
"#;

/// Runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Realtime database URL; empty selects the in-process store.
    #[serde(default)]
    pub database_url: String,
    /// Optional auth token for the realtime database.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Room inactivity window in hours.
    #[serde(default = "default_room_ttl_hours")]
    pub room_ttl_hours: u64,
    /// Override for the identity file location.
    #[serde(default)]
    pub identity_path: Option<PathBuf>,
}

fn default_room_ttl_hours() -> u64 {
    DEFAULT_ROOM_TTL_HOURS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            auth_token: None,
            room_ttl_hours: DEFAULT_ROOM_TTL_HOURS,
            identity_path: None,
        }
    }
}

impl AppConfig {
    /// Load from the default config file and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from `path` (optional) and environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Whether a hosted realtime database is configured.
    pub fn uses_remote_store(&self) -> bool {
        !self.database_url.trim().is_empty()
    }

    /// Room inactivity window.
    pub fn room_ttl(&self) -> Duration {
        Duration::from_secs(self.room_ttl_hours.saturating_mul(60 * 60))
    }

    /// Identity file location.
    pub fn identity_path(&self) -> PathBuf {
        self.identity_path
            .clone()
            .unwrap_or_else(IdentityStore::default_path)
    }
}

/// Platform config directory for this application.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
}

/// Default config file path.
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    info!(path = %path.display(), "wrote default config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_parses_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        write_default_config(&path)?;

        let config = AppConfig::load_from(&path)?;
        assert!(!config.uses_remote_store());
        assert_eq!(config.room_ttl(), Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.auth_token, None);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "database_url = \"https://poker.example.app\"\nroom_ttl_hours = 2\n",
        )?;

        let config = AppConfig::load_from(&path)?;
        assert!(config.uses_remote_store());
        assert_eq!(config.room_ttl_hours, 2);
        Ok(())
    }

    #[test]
    fn missing_file_is_not_an_error() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.room_ttl_hours, DEFAULT_ROOM_TTL_HOURS);
        Ok(())
    }

    #[test]
    fn existing_file_is_left_alone() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "room_ttl_hours = 5\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "room_ttl_hours = 5\n");
        Ok(())
    }
}

//! Configuration loading and management.
//!
//! Loads configuration from `./opendoorz.toml` (or `$ODZ_CONFIG_PATH`).
//! Environment variables override file values; file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration loaded from TOML.
///
/// Path: `./opendoorz.toml` or `$ODZ_CONFIG_PATH`.
/// Env vars override file values; file values override defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpendoorzConfig {
    /// Filesystem paths for persistent state (`[paths]`).
    pub paths: PathsConfig,
    /// Public site settings used in composed messages (`[site]`).
    pub site: SiteConfig,
    /// Rotator backend selection (`[rotator]`).
    pub rotator: RotatorConfig,
}

/// Filesystem paths for persistent state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// SQLite database holding listings and admin numbers.
    pub database: String,
    /// Directory for rotated JSON log files.
    pub logs_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            database: "opendoorz.db".to_string(),
            logs_dir: "logs".to_string(),
        }
    }
}

/// Public site settings embedded in composed inquiry messages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL of the public site (property detail links).
    pub base_url: String,
    /// Base URL of the WhatsApp send endpoint.
    pub wa_send_base: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://opendoorz.id".to_string(),
            wa_send_base: "https://api.whatsapp.com/send".to_string(),
        }
    }
}

/// Which backend holds the rotation cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotatorBackend {
    /// Human-inspectable counter file (single process).
    File,
    /// Row in the main SQLite database (shared across processes).
    Database,
}

/// Rotator backend selection and state location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RotatorConfig {
    /// Backend holding the cursor.
    pub backend: RotatorBackend,
    /// Counter file path, used when `backend = "file"`.
    pub state_file: String,
}

impl Default for RotatorConfig {
    fn default() -> Self {
        Self {
            backend: RotatorBackend::File,
            state_file: "storage/admin_index.txt".to_string(),
        }
    }
}

impl OpendoorzConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$ODZ_CONFIG_PATH` or `./opendoorz.toml`.
    /// If the file does not exist, returns defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from TOML file only, no env overrides.
    fn load_from_file() -> Result<Self> {
        let path = Self::config_path_with(|key| std::env::var(key).ok());
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                let config: OpendoorzConfig =
                    toml::from_str(&contents).context("failed to parse config TOML")?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found, using defaults");
                Ok(OpendoorzConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read config file: {e}")),
        }
    }

    /// Resolve config path using a custom env resolver (for testing).
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(p) = env("ODZ_CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("opendoorz.toml")
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability (avoids mutating the
    /// process environment in tests).
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("ODZ_DATABASE") {
            self.paths.database = v;
        }
        if let Some(v) = env("ODZ_LOGS_DIR") {
            self.paths.logs_dir = v;
        }
        if let Some(v) = env("ODZ_SITE_BASE_URL") {
            self.site.base_url = v;
        }
        if let Some(v) = env("ODZ_WA_SEND_BASE") {
            self.site.wa_send_base = v;
        }
        if let Some(v) = env("ODZ_ROTATOR_STATE_FILE") {
            self.rotator.state_file = v;
        }
        if let Some(v) = env("ODZ_ROTATOR_BACKEND") {
            match v.as_str() {
                "file" => self.rotator.backend = RotatorBackend::File,
                "database" => self.rotator.backend = RotatorBackend::Database,
                _ => tracing::warn!(
                    var = "ODZ_ROTATOR_BACKEND",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }
}

//! Configuration management for SkillGraph.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `skillgraph.toml` file
//! 3. User config `~/.config/skillgraph/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vault location and layout.
    pub vault: VaultConfig,

    /// REST server configuration.
    pub server: ServerConfig,

    /// Connection suggestion thresholds.
    pub suggest: SuggestConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./skillgraph.toml` (project local)
    /// 2. `~/.config/skillgraph/config.toml` (user config)
    /// 3. Falls back to defaults
    ///
    /// Environment overrides are applied on top of whichever source wins.
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("skillgraph.toml").exists() {
            return Self::from_file("skillgraph.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("skillgraph").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply overrides from the process environment.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// `SKILLGRAPH_*` names win over the short legacy names (`VAULT_PATH`, `PORT`).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(*k));

        // Vault overrides
        if let Some(path) = first(&["SKILLGRAPH_VAULT_PATH", "VAULT_PATH"]) {
            self.vault.root = PathBuf::from(path);
        }
        if let Some(dir) = lookup("SKILLGRAPH_ARCHIVE_DIR") {
            self.vault.archive_dir = dir;
        }

        // Server overrides
        if let Some(addr) = lookup("SKILLGRAPH_BIND") {
            self.server.bind = addr;
        }
        if let Some(port) = first(&["SKILLGRAPH_PORT", "PORT"]) {
            if let Ok(n) = port.parse() {
                self.server.port = n;
            }
        }
        if let Some(key) = lookup("SG_API_KEY") {
            self.server.api_key = Some(key);
        }

        // Suggestion overrides
        if let Some(score) = lookup("SKILLGRAPH_SUGGEST_MIN_SCORE") {
            if let Ok(n) = score.parse() {
                self.suggest.min_score = n;
            }
        }
    }

    /// Reject settings the rest of the system cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vault.archive_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("vault.archive_dir is empty".into()));
        }
        if self.vault.extension.trim().is_empty() {
            return Err(ConfigError::Invalid("vault.extension is empty".into()));
        }
        if self.suggest.limit == 0 {
            return Err(ConfigError::Invalid("suggest.limit must be at least 1".into()));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Vault location and layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Root directory of the vault.
    pub root: PathBuf,

    /// Archive subdirectory, relative to the root.
    pub archive_dir: String,

    /// Record file extension (without leading dot).
    pub extension: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_VAULT_PATH),
            archive_dir: DEFAULT_ARCHIVE_DIR.to_string(),
            extension: RECORD_EXTENSION.to_string(),
        }
    }
}

impl VaultConfig {
    /// A config rooted at `root` with default layout.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

/// REST server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind: String,

    /// Port to listen on.
    pub port: u16,

    /// Bearer key required by write endpoints (can also be set via `SG_API_KEY`).
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            api_key: None, // Load from env
        }
    }
}

impl ServerConfig {
    /// Get the API key, falling back to the development key.
    pub fn api_key_or_default(&self) -> String {
        self.api_key
            .clone()
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string())
    }

    /// Whether the server would accept the well-known development key.
    pub fn uses_default_key(&self) -> bool {
        self.api_key_or_default() == DEFAULT_API_KEY
    }
}

/// Connection suggestion thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Suggestions must score strictly above this.
    pub min_score: u32,

    /// Maximum number of suggestions.
    pub limit: usize,

    /// Cap on the content-overlap contribution.
    pub content_overlap_cap: u32,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_SUGGEST_MIN_SCORE,
            limit: DEFAULT_SUGGEST_LIMIT,
            content_overlap_cap: DEFAULT_CONTENT_OVERLAP_CAP,
        }
    }
}

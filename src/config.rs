//! Service configuration file support
//!
//! Settings come from `orgrel.yml` (or `orgrel.yaml`) in the working
//! directory, or from an explicit `--config` path. String values may
//! reference environment variables with `${VAR}`.

use anyhow::{Context, Result};
use orgrel_core::ImportOptions;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static ENV_VAR_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern")
});

pub const CONFIG_FILE_NAMES: [&str; 2] = ["orgrel.yml", "orgrel.yaml"];

/// Top-level configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgrelConfig {
    /// Database connection URL (PostgreSQL or SQLite)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Org-chart import behaviour
    #[serde(default)]
    pub import: ImportOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to bind the API server
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Allow cross-origin requests from localhost
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_database_url() -> String {
    "sqlite://./orgrel.db?mode=rwc".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_enable_cors() -> bool {
    true
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            enable_cors: default_enable_cors(),
        }
    }
}

impl Default for OrgrelConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            server: ServerSettings::default(),
            import: ImportOptions::default(),
        }
    }
}

impl OrgrelConfig {
    /// Load from an explicit path, or from the first config file found in
    /// the working directory, or fall back to defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let current_dir = std::env::current_dir()?;
        match Self::discover_in(&current_dir)? {
            Some((path, config)) => {
                debug!("Loaded config from {:?}", path);
                Ok(config)
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Look for a config file in one directory
    pub fn discover_in(dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok(Some((path, config)));
            }
        }

        Ok(None)
    }

    /// Load config from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&content)
    }

    /// Parse config from YAML string
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: OrgrelConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML config")?;

        config.database_url = expand_env_vars(&config.database_url);
        config.server.bind_addr = expand_env_vars(&config.server.bind_addr);

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("database_url must not be empty");
        }
        self.bind_addr()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind_addr))
    }
}

/// Expand environment variables in a string
///
/// Supports `${VAR}` syntax. If the variable is not set, returns empty string.
pub fn expand_env_vars(input: &str) -> String {
    let mut result = input.to_string();

    for cap in ENV_VAR_PATTERN.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = std::env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}

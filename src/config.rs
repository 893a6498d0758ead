//! Named targets loaded from `config.toml`
//!
//! ```toml
//! default_target = "local"
//!
//! [targets.local]
//! url = "http://localhost:9990"
//! user = "admin"
//!
//! [targets.dev-file]
//! file = "~/servers/dev/standalone/configuration/standalone.xml"
//! ```

use crate::paths;
use anyhow::{Context, Result};
use model::ManagementVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the password of a server target
pub const ENV_PASSWORD: &str = "WILDCFG_PASSWORD";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Errors
// ============================================================================

/// Problems with the target configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("target '{0}' must set exactly one of 'url' or 'file'")]
    AmbiguousTarget(String),

    #[error("default_target '{0}' is not a configured target")]
    UnknownDefault(String),

    #[error("no target named '{0}' (see `wildcfg targets`)")]
    UnknownTarget(String),

    #[error("no target given: pass --target, --url or --file, or set default_target")]
    NoTarget,

    #[error("target '{name}' has an invalid version: {source}")]
    InvalidVersion {
        name: String,
        #[source]
        source: model::Error,
    },
}

// ============================================================================
// Config Schema
// ============================================================================

/// The wildcfg configuration file
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Target used when no target flag is given
    #[serde(default)]
    pub default_target: Option<String>,

    /// Named targets
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// A running server or a configuration file
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    /// Server base URL, e.g. `http://localhost:9990`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Path to a configuration file such as `standalone.xml`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Management user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Management password; `WILDCFG_PASSWORD` wins when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Model version of a file target, when its namespace is not enough
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Config {
    /// Load `config.toml`; a missing file is an empty config
    pub fn load() -> Result<Self> {
        let config_path = paths::config_file()?;
        if !config_path.exists() {
            log::debug!("No config at {}", config_path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Could not read config file: {}", config_path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))?;
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid TOML format")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, target) in &self.targets {
            target.validate(name)?;
        }
        if let Some(default) = &self.default_target
            && !self.targets.contains_key(default)
        {
            return Err(ConfigError::UnknownDefault(default.clone()));
        }
        Ok(())
    }

    /// Find a target by name
    pub fn find_target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.get(name)
    }
}

impl TargetConfig {
    /// A server target
    pub fn server(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// A file target
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            file: Some(path.into()),
            ..Self::default()
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.url.is_some() == self.file.is_some() {
            return Err(ConfigError::AmbiguousTarget(name.to_string()));
        }
        self.parsed_version(name)?;
        Ok(())
    }

    fn parsed_version(&self, name: &str) -> Result<Option<ManagementVersion>, ConfigError> {
        self.version
            .as_deref()
            .map(str::parse::<ManagementVersion>)
            .transpose()
            .map_err(|source| ConfigError::InvalidVersion {
                name: name.to_string(),
                source,
            })
    }

    /// Resolve to a concrete endpoint, applying the password override
    pub fn resolve(&self, name: &str) -> Result<Endpoint, ConfigError> {
        self.validate(name)?;
        let version = self.parsed_version(name)?;
        match (&self.url, &self.file) {
            (Some(url), None) => Ok(Endpoint::Server(ServerEndpoint {
                name: name.to_string(),
                url: url.clone(),
                user: self.user.clone(),
                password: std::env::var(ENV_PASSWORD)
                    .ok()
                    .or_else(|| self.password.clone()),
                timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            })),
            (None, Some(file)) => Ok(Endpoint::File(FileEndpoint {
                name: name.to_string(),
                path: paths::expand(file),
                version,
            })),
            _ => Err(ConfigError::AmbiguousTarget(name.to_string())),
        }
    }

    /// `url` or `file`, for listings
    pub fn location(&self) -> &str {
        self.url.as_deref().or(self.file.as_deref()).unwrap_or("")
    }
}

// ============================================================================
// Resolved Targets
// ============================================================================

/// Where commands are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Server(ServerEndpoint),
    File(FileEndpoint),
}

impl Endpoint {
    /// Target name, or the flag it came from
    pub fn name(&self) -> &str {
        match self {
            Self::Server(server) => &server.name,
            Self::File(file) => &file.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub name: String,
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEndpoint {
    pub name: String,
    pub path: PathBuf,
    pub version: Option<ManagementVersion>,
}

/// Pick the endpoint from flags first, then the named or default target
pub fn select_endpoint(
    config: &Config,
    target: Option<&str>,
    url: Option<&str>,
    file: Option<&str>,
    user: Option<&str>,
) -> Result<Endpoint, ConfigError> {
    let adhoc = match (url, file) {
        (Some(url), _) => Some(("--url", TargetConfig::server(url))),
        (None, Some(file)) => Some(("--file", TargetConfig::file(file))),
        (None, None) => None,
    };
    if let Some((name, mut target)) = adhoc {
        target.user = user.map(str::to_string);
        return target.resolve(name);
    }

    let name = target
        .or(config.default_target.as_deref())
        .ok_or(ConfigError::NoTarget)?;
    let mut target = config
        .find_target(name)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownTarget(name.to_string()))?;
    if let Some(user) = user {
        target.user = Some(user.to_string());
    }
    target.resolve(name)
}

// ============================================================================
// Tests
// ============================================================================

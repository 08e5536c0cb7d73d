//! Server configuration from environment, an optional TOML file and the CLI.
//!
//! Precedence, highest first: command-line overrides, environment variables,
//! the config file. Required values missing from all three abort startup.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use recipe_index::{UpstashConfig, DEFAULT_NAMESPACE};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_API_KEY: &str = "MCP_API_KEY";
pub const ENV_UPSTASH_URL: &str = "UPSTASH_VECTOR_URL";
pub const ENV_UPSTASH_TOKEN: &str = "UPSTASH_VECTOR_TOKEN";
pub const ENV_PORT: &str = "SERVER_PORT";
pub const ENV_HOST: &str = "SERVER_HOST";
pub const ENV_NAMESPACE: &str = "RECIPE_NAMESPACE";

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid port '{0}'")]
    InvalidPort(String),

    #[error("invalid host address '{0}'")]
    InvalidHost(String),
}

/// On-disk layout of the optional config file.
///
/// ```toml
/// [server]
/// host = "127.0.0.1"
/// port = 8080
/// api_key = "..."
///
/// [upstash]
/// url = "https://example-vector.upstash.io"
/// token = "..."
/// namespace = "recipes-namespace"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub upstash: UpstashSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpstashSection {
    pub url: Option<String>,
    pub token: Option<String>,
    pub namespace: Option<String>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub api_key: String,
    pub upstash_url: String,
    pub upstash_token: String,
    pub namespace: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn upstash(&self) -> UpstashConfig {
        UpstashConfig::new(&self.upstash_url, &self.upstash_token)
    }
}

// Secrets stay out of logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &"<redacted>")
            .field("upstash_url", &self.upstash_url)
            .field("upstash_token", &"<redacted>")
            .field("namespace", &self.namespace)
            .finish()
    }
}

/// Load configuration from the process environment and an optional file.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<ServerConfig, ConfigError> {
    let file = match path {
        Some(path) => read_file(path)?,
        None => ConfigFile::default(),
    };
    from_sources(file, overrides, |key| std::env::var(key).ok())
}

pub fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!("Loaded config file {}", path.display());
    Ok(toml::from_str(&text)?)
}

/// Resolve configuration from explicit sources. Blank variables count as unset.
pub fn from_sources(
    file: ConfigFile,
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ServerConfig, ConfigError> {
    let var = |key: &str| env(key).filter(|value| !value.trim().is_empty());
    let required = |key: &'static str, fallback: Option<String>| {
        var(key).or(fallback).ok_or(ConfigError::Missing(key))
    };

    let api_key = required(ENV_API_KEY, file.server.api_key)?;
    let upstash_url = required(ENV_UPSTASH_URL, file.upstash.url)?;
    let upstash_token = required(ENV_UPSTASH_TOKEN, file.upstash.token)?;

    let port = match (overrides.port, var(ENV_PORT)) {
        (Some(port), _) => port,
        (None, Some(raw)) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort(raw))?,
        (None, None) => file.server.port.ok_or(ConfigError::Missing(ENV_PORT))?,
    };

    let host = match overrides
        .host
        .clone()
        .or_else(|| var(ENV_HOST))
        .or(file.server.host)
    {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidHost(raw))?,
        None => DEFAULT_HOST,
    };

    let namespace = var(ENV_NAMESPACE)
        .or(file.upstash.namespace)
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    Ok(ServerConfig {
        host,
        port,
        api_key,
        upstash_url,
        upstash_token,
        namespace,
    })
}

//! Configuration loading and resolution.
//!
//! # Responsibilities
//! - Read the optional TOML config file (`BOOKINGD_CONFIG` or `bookingd.toml`)
//! - Apply environment variable overrides
//! - Enforce required keys: listen port and store connection string
//!
//! # Design Decisions
//! - Raw (all-optional) types deserialize; resolution into `ServerConfig`
//!   is a pure function so the required-key rules are unit-testable
//! - An explicitly named config file that cannot be read is an error; the
//!   default file is simply skipped when absent

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::schema::{
    LimitsConfig, ListenerConfig, ReadinessConfig, ServerConfig, StoreConfig, TimeoutConfig,
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

const DEFAULT_CONFIG_FILE: &str = "bookingd.toml";

/// Error type for configuration loading. All variants are fatal: the
/// process must not reach the listening state with a broken config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    MissingKey(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid listen port {0:?}")]
    InvalidPort(String),

    #[error("invalid store url {url}: {reason}")]
    InvalidStoreUrl { url: String, reason: String },

    #[error("invalid boolean for {key}: {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}

/// Raw file representation. Every field is optional; required-key checks
/// happen during resolution, after environment overrides are applied.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    listener: RawListener,
    store: RawStore,
    timeouts: RawTimeouts,
    limits: RawLimits,
    readiness: RawReadiness,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawListener {
    host: Option<String>,
    port: Option<u16>,
    max_connections: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStore {
    url: Option<String>,
    connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTimeouts {
    request_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLimits {
    max_body_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawReadiness {
    require_store_ready: Option<bool>,
}

/// Environment overrides, captured once so resolution stays pure.
#[derive(Debug, Default)]
struct EnvOverrides {
    host: Option<String>,
    port: Option<String>,
    store_url: Option<String>,
    require_store_ready: Option<String>,
}

impl EnvOverrides {
    fn capture() -> Self {
        Self {
            host: env::var("BOOKINGD_HOST").ok(),
            port: env::var("BOOKINGD_PORT").ok(),
            store_url: env::var("BOOKINGD_STORE_URL").ok(),
            require_store_ready: env::var("BOOKINGD_REQUIRE_STORE_READY").ok(),
        }
    }
}

/// Load and resolve the server configuration.
pub fn load() -> Result<ServerConfig, ConfigError> {
    let raw = match env::var("BOOKINGD_CONFIG") {
        Ok(path) => read_file(Path::new(&path))?,
        Err(_) => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                read_file(default)?
            } else {
                RawConfig::default()
            }
        }
    };

    resolve(raw, EnvOverrides::capture())
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

fn resolve(raw: RawConfig, env: EnvOverrides) -> Result<ServerConfig, ConfigError> {
    let port = match env.port {
        Some(value) => value
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(value))?,
        None => raw
            .listener
            .port
            .ok_or(ConfigError::MissingKey("listener.port (BOOKINGD_PORT)"))?,
    };

    let url_str = env
        .store_url
        .or(raw.store.url)
        .ok_or(ConfigError::MissingKey("store.url (BOOKINGD_STORE_URL)"))?;
    let url = parse_store_url(&url_str)?;

    let require_store_ready = match env.require_store_ready {
        Some(value) => value
            .parse::<bool>()
            .map_err(|_| ConfigError::InvalidFlag {
                key: "BOOKINGD_REQUIRE_STORE_READY",
                value,
            })?,
        None => raw.readiness.require_store_ready.unwrap_or(false),
    };

    Ok(ServerConfig {
        listener: ListenerConfig {
            host: env
                .host
                .or(raw.listener.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            max_connections: raw
                .listener
                .max_connections
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        },
        store: StoreConfig {
            url,
            connect_timeout_secs: raw
                .store
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        },
        timeouts: TimeoutConfig {
            request_secs: raw
                .timeouts
                .request_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        },
        limits: LimitsConfig {
            max_body_bytes: raw.limits.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES),
        },
        readiness: ReadinessConfig { require_store_ready },
    })
}

fn parse_store_url(url_str: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidStoreUrl {
        url: url_str.to_string(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidStoreUrl {
            url: url_str.to_string(),
            reason: "missing host".to_string(),
        });
    }
    if url.port().is_none() {
        return Err(ConfigError::InvalidStoreUrl {
            url: url_str.to_string(),
            reason: "missing explicit port".to_string(),
        });
    }
    Ok(url)
}

//! Configuration schema definitions.
//!
//! These are the resolved types the rest of the server consumes. Raw
//! deserialization (where every field is optional) lives in the loader;
//! by the time a `ServerConfig` exists, every required key is present.

use url::Url;

pub(crate) const DEFAULT_HOST: &str = "0.0.0.0";
pub(crate) const DEFAULT_MAX_CONNECTIONS: usize = 10_000;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Root configuration for the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listener configuration (bind host, port, connection limit).
    pub listener: ListenerConfig,

    /// Data store connection settings.
    pub store: StoreConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Readiness gating behavior.
    pub readiness: ReadinessConfig,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Host to bind (default "0.0.0.0").
    pub host: String,

    /// Port to bind. Required; no default.
    pub port: u16,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

/// Data store connection settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Connection string, e.g. "tcp://127.0.0.1:4010". Required; no default.
    /// Any scheme is accepted but the URL must carry an explicit host and
    /// port — the transport is plain TCP.
    pub url: Url,

    /// Timeout for the single connect attempt, in seconds.
    pub connect_timeout_secs: u64,
}

/// Timeout configuration.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Bounds resource retention from abandoned clients.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Readiness gating behavior.
///
/// By default the listener starts accepting before the store connect is
/// confirmed and requests in that window are dispatched normally. Setting
/// `require_store_ready` connects the store before the listener binds.
#[derive(Debug, Clone, Default)]
pub struct ReadinessConfig {
    pub require_store_ready: bool,
}

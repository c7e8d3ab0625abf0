//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file (optional) + environment overrides
//!     → loader.rs (read, parse, merge)
//!     → required keys checked (listen port, store url)
//!     → ServerConfig (resolved, immutable)
//!     → shared by value into the bootstrap
//! ```
//!
//! # Design Decisions
//! - Config is fully resolved before the listener binds; a missing required
//!   key is a fatal `ConfigError`, never a runtime error
//! - Two keys are required with no default: the listen port and the data
//!   store connection string
//! - Everything else carries a default so a minimal config works

pub mod loader;
pub mod schema;

pub use loader::{load, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, ReadinessConfig, ServerConfig, StoreConfig, TimeoutConfig,
};

//! Example handler groups.
//!
//! These are the pluggable collaborators the core dispatches to. Each
//! function returns a self-contained [`crate::routing::Router`] for the
//! bootstrap to mount under a prefix.

pub mod auth;
pub mod health;

pub use auth::auth_routes;
pub use health::health_routes;

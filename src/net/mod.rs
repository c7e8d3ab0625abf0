//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, semaphore-bounded)
//!     → permit rides inside the connection IO type
//!     → Hand off to the HTTP layer via axum::serve
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - A connection's permit is released only when the connection closes,
//!   so backpressure survives handler panics

pub mod listener;

pub use listener::{BoundedListener, ListenerError};

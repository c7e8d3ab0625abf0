//! Server bootstrap subsystem.
//!
//! # Data Flow
//! ```text
//! ServerConfig + composed Router + StoreManager
//!     → bootstrap.rs (bind listener, spawn serve, connect store)
//!     → phase channel: Configuring → Listening → Ready
//!     → app.rs bridges axum requests into the dispatcher
//!     → shutdown.rs coordinates ShuttingDown → Stopped
//! ```
//!
//! # Design Decisions
//! - The dispatcher is an explicit value passed in; no process-global
//!   routing state, so multiple servers can coexist in one process
//! - Default sequencing is relaxed: the listener accepts before the store
//!   confirms; `require_store_ready` flips to strict gating
//! - The bootstrap returns typed errors; only `main` exits the process

pub(crate) mod app;
pub mod bootstrap;
pub mod request_id;
pub mod shutdown;

pub use bootstrap::{Phase, Server, ServerHandle, StartError};
pub use request_id::{RequestIdLayer, X_REQUEST_ID};
pub use shutdown::Shutdown;

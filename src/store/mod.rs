//! Data store connection subsystem.
//!
//! # Data Flow
//! ```text
//! Bootstrap
//!     → manager.rs connect() — single attempt, no retry
//!     → Connected: state published, `Connected` event broadcast
//!     → monitor task watches the transport
//!     → EOF / error: state → Disconnected, `Disconnected` event
//!
//! Connection states:
//!     Disconnected → Connecting → Connected → Disconnected (on loss)
//! ```
//!
//! # Design Decisions
//! - Exactly one connection per process; the manager owns it, handlers
//!   only ever see a shared read-only handle
//! - First-attempt failure is returned as a typed error; the decision to
//!   terminate the process belongs to the caller, not the manager
//! - Loss after startup is observability only: logged and broadcast,
//!   never auto-recovered

pub mod manager;

pub use manager::{ConnectError, StoreEvent, StoreHandle, StoreManager, StoreState};

//! bookingd — a minimal booking API server.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                    BOOKINGD                      │
//!                    │                                                  │
//!   Client Request   │  ┌─────────┐    ┌─────────┐    ┌─────────────┐   │
//!   ─────────────────┼─▶│   net   │───▶│ server  │───▶│   routing   │   │
//!                    │  │listener │    │  (app)  │    │ dispatcher  │   │
//!                    │  └─────────┘    └─────────┘    └──────┬──────┘   │
//!                    │                                       │          │
//!   Client Response  │                                       ▼          │
//!   ◀────────────────┼───────────────────────────────┌─────────────┐    │
//!                    │                               │   handler   │    │
//!                    │                               │   groups    │    │
//!                    │                               └─────────────┘    │
//!                    │                                                  │
//!                    │  ┌────────────────────────────────────────────┐  │
//!                    │  │            Cross-Cutting Concerns          │  │
//!                    │  │  ┌────────┐ ┌────────────┐ ┌────────────┐  │  │
//!                    │  │  │ config │ │   store    │ │ bootstrap  │  │  │
//!                    │  │  │        │ │ lifecycle  │ │  phases    │  │  │
//!                    │  │  └────────┘ └────────────┘ └────────────┘  │  │
//!                    │  └────────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────────┘
//! ```
//!
//! The server accepts HTTP connections, routes them to handler groups
//! mounted at path prefixes, and supervises a single long-lived connection
//! to the backing data store. Store availability gates readiness; the
//! process fails fast when it cannot be established at startup.

// Core subsystems
pub mod config;
pub mod net;
pub mod routing;
pub mod server;
pub mod store;

// Example handler groups (external collaborators of the core)
pub mod routes;

pub use config::ServerConfig;
pub use routing::Router;
pub use server::{Phase, Server, ServerHandle, Shutdown};
pub use store::{StoreEvent, StoreHandle, StoreManager, StoreState};

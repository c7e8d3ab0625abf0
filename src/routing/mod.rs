//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, path)
//!     → router.rs (longest-prefix mount lookup, recursive)
//!     → exact method+subpath match inside the handler group
//!     → Return: resolved handler, NotFound, or MethodNotAllowed
//!
//! Route composition (at bootstrap):
//!     Handler groups are routers; mounting one under a prefix makes
//!     every inner route reachable as prefix + innerPath.
//!     The composed router freezes into an Arc before serving starts.
//! ```
//!
//! # Design Decisions
//! - Structurally immutable post-bootstrap; no locks on the dispatch path
//! - Longest-prefix-wins, path-segment aligned ("/auth" matches
//!   "/auth/login", never "/authenticate")
//! - No regex in the hot path; deterministic and side-effect free
//! - Duplicate mounts are a programming error surfaced at bootstrap,
//!   never a silent overwrite

pub mod handler;
pub mod router;

pub use handler::{Handler, HandlerError, Request, ResponseError, ResponseWriter};
pub use router::{DispatchError, MountError, Resolved, Router};

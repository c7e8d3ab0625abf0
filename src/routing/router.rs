//! Route table and dispatch.
//!
//! # Responsibilities
//! - Register exact routes and mounted sub-routers
//! - Reject duplicate mounts and malformed prefixes at bootstrap
//! - Resolve (method, path) to a handler, 404, or 405
//!
//! # Design Decisions
//! - An exact (method, path) match at the current level wins over
//!   descending into a mount, so a root mount cannot shadow siblings
//! - Once the longest matching mount is chosen its result is final;
//!   no backtracking to shorter prefixes
//! - O(routes + mounts) scan per level; route counts are small and the
//!   table is immutable, so no index structure is warranted

use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::routing::handler::Handler;

/// Error raised while composing the route table. All variants are
/// programming errors that must abort startup.
#[derive(Debug, Error)]
pub enum MountError {
    #[error("prefix {0:?} is already mounted")]
    Duplicate(String),

    #[error("route {method} {path:?} is already registered")]
    DuplicateRoute { method: Method, path: String },

    #[error("mount prefix {0:?} must begin with '/' and carry no trailing '/'")]
    InvalidPrefix(String),

    #[error("route path {0:?} must begin with '/'")]
    InvalidPath(String),
}

/// Per-request dispatch outcome when no handler runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// No mounted prefix or route contains the path (HTTP 404).
    #[error("no route matched")]
    NotFound,

    /// The path matched a registered route but the method did not (HTTP 405).
    #[error("method not allowed")]
    MethodNotAllowed,
}

struct Route {
    method: Method,
    path: String,
    handler: Arc<dyn Handler>,
}

struct Mount {
    prefix: String,
    inner: Router,
}

/// A composable route table. Handler groups are routers themselves:
/// mounting one under a prefix makes every inner route reachable as
/// `prefix + innerPath`.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    mounts: Vec<Mount>,
}

/// A successful dispatch: the handler to run plus the full registered
/// pattern it was reached through (for logging).
pub struct Resolved {
    handler: Arc<dyn Handler>,
    pattern: String,
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl Resolved {
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn behind(mut self, prefix: &str) -> Self {
        if prefix != "/" {
            self.pattern = format!("{}{}", prefix, self.pattern);
        }
        self
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an exact (method, path) pair.
    pub fn route(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Result<(), MountError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(MountError::InvalidPath(path));
        }
        if self
            .routes
            .iter()
            .any(|r| r.method == method && r.path == path)
        {
            return Err(MountError::DuplicateRoute { method, path });
        }
        self.routes.push(Route {
            method,
            path,
            handler,
        });
        Ok(())
    }

    /// Mount a handler group under a path prefix. `/` is the root mount
    /// and the only prefix allowed to end in `/`: a trailing slash on any
    /// other prefix could never sit on a segment boundary.
    pub fn mount(&mut self, prefix: impl Into<String>, inner: Router) -> Result<(), MountError> {
        let prefix = prefix.into();
        if !prefix.starts_with('/') || (prefix != "/" && prefix.ends_with('/')) {
            return Err(MountError::InvalidPrefix(prefix));
        }
        if self.mounts.iter().any(|m| m.prefix == prefix) {
            return Err(MountError::Duplicate(prefix));
        }
        self.mounts.push(Mount { prefix, inner });
        Ok(())
    }

    /// Resolve a (method, path) pair to a handler.
    ///
    /// The most specific (longest, path-segment-aligned) mounted prefix
    /// containing the path wins; dispatch recurses into it with the
    /// remaining subpath. A bare mount path resolves to the group root `/`.
    pub fn dispatch(&self, method: &Method, path: &str) -> Result<Resolved, DispatchError> {
        let path = if path.is_empty() { "/" } else { path };

        if self.routes.iter().any(|r| r.path == path) {
            return match self
                .routes
                .iter()
                .find(|r| r.path == path && r.method == *method)
            {
                Some(route) => Ok(Resolved {
                    handler: route.handler.clone(),
                    pattern: route.path.clone(),
                }),
                None => Err(DispatchError::MethodNotAllowed),
            };
        }

        let best = self
            .mounts
            .iter()
            .filter(|m| is_segment_prefix(&m.prefix, path))
            .max_by_key(|m| m.prefix.len());

        match best {
            Some(mount) => mount
                .inner
                .dispatch(method, remainder(&mount.prefix, path))
                .map(|resolved| resolved.behind(&mount.prefix)),
            None => Err(DispatchError::NotFound),
        }
    }
}

/// True when `prefix` covers `path` on a segment boundary: "/auth" covers
/// "/auth" and "/auth/login" but not "/authenticate".
fn is_segment_prefix(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn remainder<'a>(prefix: &str, path: &'a str) -> &'a str {
    if prefix == "/" {
        return path;
    }
    let rest = &path[prefix.len()..];
    if rest.is_empty() {
        "/"
    } else {
        rest
    }
}

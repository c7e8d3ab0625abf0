//! Axum application: middleware stack and the dispatch bridge.
//!
//! # Responsibilities
//! - Build the axum router (catch-all into the dispatcher)
//! - Wire middleware: tracing, request timeout, request ID
//! - Map dispatch outcomes to HTTP statuses (404, 405, 500)
//!
//! # Design Decisions
//! - Per-request errors are confined to that request's response; nothing
//!   here can take the server down

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::TimeoutConfig;
use crate::routing::{DispatchError, Request, ResponseWriter, Router as RouteTable};
use crate::server::request_id::{RequestIdLayer, X_REQUEST_ID};

/// State injected into the dispatch bridge.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) routes: Arc<RouteTable>,
    pub(crate) max_body_bytes: usize,
}

/// Build the axum router with all middleware layers.
pub(crate) fn build_app(state: AppState, timeouts: &TimeoutConfig) -> axum::Router {
    axum::Router::new()
        .route("/", any(dispatch_request))
        .route("/{*path}", any(dispatch_request))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs)))
        .layer(RequestIdLayer)
        .layer(TraceLayer::new_for_http())
}

/// Catch-all handler: resolve the route, run the handler, convert the
/// written response.
async fn dispatch_request(
    State(state): State<AppState>,
    request: axum::extract::Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    let resolved = match state.routes.dispatch(&method, &path) {
        Ok(resolved) => resolved,
        Err(DispatchError::NotFound) => {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "no route matched");
            return (StatusCode::NOT_FOUND, "no route matched").into_response();
        }
        Err(DispatchError::MethodNotAllowed) => {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "method not allowed");
            return (StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        route = %resolved.pattern(),
        "dispatching request"
    );

    let request = Request::new(method, path, parts.headers, body);
    let mut writer = ResponseWriter::new();
    match resolved.handler().handle(&request, &mut writer).await {
        Ok(()) => {
            if !writer.is_closed() {
                tracing::warn!(
                    request_id = %request_id,
                    route = %resolved.pattern(),
                    "handler returned without closing the response"
                );
            }
            writer.into_response()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                route = %resolved.pattern(),
                error = %e,
                "handler failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}

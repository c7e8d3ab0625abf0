//! Health handler group.
//!
//! External observer of the store lifecycle: reports readiness from the
//! manager's published state. Serving at all implies the listener is up,
//! so readiness reduces to "store connected".

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};

use crate::routing::{Handler, HandlerError, MountError, Request, ResponseWriter, Router};
use crate::store::{StoreManager, StoreState};

struct Health {
    manager: Arc<StoreManager>,
}

#[async_trait]
impl Handler for Health {
    async fn handle(
        &self,
        _request: &Request,
        response: &mut ResponseWriter,
    ) -> Result<(), HandlerError> {
        let state = self.manager.state();
        let ready = state == StoreState::Connected;

        let body = serde_json::json!({
            "status": if ready { "ok" } else { "degraded" },
            "ready": ready,
            "store": state.as_str(),
        });

        response.set_status(if ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        })?;
        response.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))?;
        response.write(body.to_string())?;
        response.close()?;
        Ok(())
    }
}

/// Build the health handler group over the given store manager.
pub fn health_routes(manager: Arc<StoreManager>) -> Result<Router, MountError> {
    let mut router = Router::new();
    router.route(Method::GET, "/", Arc::new(Health { manager }))?;
    Ok(router)
}

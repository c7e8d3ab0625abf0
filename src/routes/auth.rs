//! Authentication handler group.
//!
//! Placeholder endpoint: real authentication is outside the core. Mounted
//! at `/auth`, the inner `/` answers `GET /auth/`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};

use crate::routing::{Handler, HandlerError, MountError, Request, ResponseWriter, Router};

struct Greeting;

#[async_trait]
impl Handler for Greeting {
    async fn handle(
        &self,
        _request: &Request,
        response: &mut ResponseWriter,
    ) -> Result<(), HandlerError> {
        response.header(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )?;
        response.write("Hello, this is auth endpoint")?;
        response.close()?;
        Ok(())
    }
}

/// Build the auth handler group.
pub fn auth_routes() -> Result<Router, MountError> {
    let mut router = Router::new();
    router.route(Method::GET, "/", Arc::new(Greeting))?;
    Ok(router)
}

//! Request ID middleware.
//!
//! Stamps `x-request-id` (UUID v4) on every request that does not already
//! carry one, as early in the stack as possible so dispatch logging can
//! correlate.

use std::task::{Context, Poll};

use axum::http::{HeaderName, HeaderValue, Request};
use tower::{Layer, Service};

pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Clone, Debug)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(X_REQUEST_ID) {
            let id = uuid::Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                request
                    .headers_mut()
                    .insert(HeaderName::from_static(X_REQUEST_ID), value);
            }
        }
        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::ServiceExt;

    #[tokio::test]
    async fn stamps_missing_request_id() {
        let svc = RequestIdLayer.layer(tower::service_fn(|req: Request<()>| async move {
            Ok::<_, Infallible>(req.headers().get(X_REQUEST_ID).cloned())
        }));

        let seen = svc
            .oneshot(Request::builder().body(()).unwrap())
            .await
            .unwrap();
        assert!(seen.is_some());
    }

    #[tokio::test]
    async fn preserves_existing_request_id() {
        let svc = RequestIdLayer.layer(tower::service_fn(|req: Request<()>| async move {
            Ok::<_, Infallible>(req.headers().get(X_REQUEST_ID).cloned())
        }));

        let seen = svc
            .oneshot(
                Request::builder()
                    .header(X_REQUEST_ID, "abc-123")
                    .body(())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(seen.unwrap(), "abc-123");
    }
}

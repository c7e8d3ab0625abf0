//! Handler contract: request view, response writer, handler trait.
//!
//! # Responsibilities
//! - Present the request as an immutable view (method, path, headers, body)
//! - Enforce write-once response semantics: append, then close exactly once
//! - Define the async seam route handlers plug into
//!
//! # Design Decisions
//! - Writes after close fail with an error, never silently dropped
//! - Handlers never see the response transport; they fill a buffer the
//!   server converts once the handler returns

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::Response;
use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Immutable view of an incoming request.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    pub fn new(method: Method, path: String, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            path,
            headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Convenience accessor for a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Error raised when a handler violates write-once response semantics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("response already closed")]
    Closed,
}

/// Opaque handler failure, mapped to a 500 confined to the request.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ResponseError> for HandlerError {
    fn from(err: ResponseError) -> Self {
        Self::new(err.to_string())
    }
}

/// Write-once response channel handed to handlers.
///
/// Appends accumulate until `close`; every mutator fails with
/// [`ResponseError::Closed`] afterwards, including a second `close`.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    closed: bool,
}

impl ResponseWriter {
    pub(crate) fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<(), ResponseError> {
        if self.closed {
            Err(ResponseError::Closed)
        } else {
            Ok(())
        }
    }

    pub fn set_status(&mut self, status: StatusCode) -> Result<(), ResponseError> {
        self.ensure_open()?;
        self.status = status;
        Ok(())
    }

    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> Result<(), ResponseError> {
        self.ensure_open()?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Append a chunk to the response body.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) -> Result<(), ResponseError> {
        self.ensure_open()?;
        self.body.extend_from_slice(chunk.as_ref());
        Ok(())
    }

    /// Close the response. Must be called exactly once.
    pub fn close(&mut self) -> Result<(), ResponseError> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// The contract route handlers satisfy.
///
/// A handler receives the request and a response writer; it must close the
/// writer exactly once and must not hold it open indefinitely (the server's
/// request timeout bounds the overall exchange).
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        request: &Request,
        response: &mut ResponseWriter,
    ) -> Result<(), HandlerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;

    #[test]
    fn write_after_close_fails() {
        let mut writer = ResponseWriter::new();
        writer.write(b"partial").unwrap();
        writer.close().unwrap();

        assert_eq!(writer.write(b"more"), Err(ResponseError::Closed));
        assert_eq!(writer.set_status(StatusCode::ACCEPTED), Err(ResponseError::Closed));
        assert_eq!(
            writer.header(CONTENT_TYPE, HeaderValue::from_static("text/plain")),
            Err(ResponseError::Closed)
        );
    }

    #[test]
    fn double_close_fails() {
        let mut writer = ResponseWriter::new();
        writer.close().unwrap();
        assert_eq!(writer.close(), Err(ResponseError::Closed));
    }

    #[tokio::test]
    async fn into_response_preserves_status_headers_body() {
        let mut writer = ResponseWriter::new();
        writer.set_status(StatusCode::CREATED).unwrap();
        writer
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .unwrap();
        writer.write("hello ").unwrap();
        writer.write("world").unwrap();
        writer.close().unwrap();

        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"hello world");
    }
}

//! Response capability.
//!
//! # Responsibilities
//! - Accept status, headers and body bytes from content writers
//! - Buffer them for conversion into an axum response
//!
//! # Design Decisions
//! - Writers see only the `ResponseSink` trait
//! - A status never set by any writer is sent as 200

use std::io::Write;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Write access to an outgoing response.
pub trait ResponseSink {
    fn set_status(&mut self, status: StatusCode);

    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Sink for body bytes.
    fn output(&mut self) -> &mut dyn Write;
}

/// In-memory response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// The status set by a writer, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl ResponseSink for BufferedResponse {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn output(&mut self) -> &mut dyn Write {
        &mut self.body
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

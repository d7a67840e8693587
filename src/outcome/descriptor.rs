//! Handler outcomes and writer-ready response descriptors.

use std::fmt;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::outcome::failure::Failure;

/// Redirect target plus the parameters carried along with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub target: String,
    pub params: Vec<(String, String)>,
}

impl RedirectTarget {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }
}

/// Normalized result of a handler or of the whole pipeline.
#[derive(Debug)]
pub enum Outcome {
    /// A page to render.
    Rendered(String),
    /// Server-side forward to a page path.
    Forward(String),
    Redirect(RedirectTarget),
    Json(Value),
    /// Status-only REST result.
    RestStatus(StatusCode),
    /// A raw value whose meaning depends on the rule's mode.
    Value(Value),
    /// Nothing produced.
    Empty,
    Failed(Failure),
}

impl Outcome {
    /// Serialize `value` into a JSON outcome.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, Failure> {
        serde_json::to_value(value)
            .map(Outcome::Json)
            .map_err(|e| Failure::new("serialization", "failed to encode JSON payload").with_source(e))
    }

    pub fn redirect(target: impl Into<String>) -> Self {
        Outcome::Redirect(RedirectTarget::new(target))
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Outcome::Value(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }
}

/// The four writer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Page,
    Redirect,
    Json,
    RestOnly,
}

impl DescriptorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorKind::Page => "page",
            DescriptorKind::Redirect => "redirect",
            DescriptorKind::Json => "json",
            DescriptorKind::RestOnly => "rest",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a resolved descriptor; its variant fixes the descriptor kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Page { path: String },
    Redirect(RedirectTarget),
    Json(Value),
    RestOnly,
}

/// Fully resolved, writer-ready response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    pub payload: Payload,
    pub status: StatusCode,
}

impl ResponseDescriptor {
    pub fn page(path: impl Into<String>) -> Self {
        Self::with_status(Payload::Page { path: path.into() }, StatusCode::OK)
    }

    pub fn redirect(target: RedirectTarget) -> Self {
        Self::with_status(Payload::Redirect(target), StatusCode::OK)
    }

    pub fn json(value: Value) -> Self {
        Self::with_status(Payload::Json(value), StatusCode::OK)
    }

    pub fn rest(status: StatusCode) -> Self {
        Self::with_status(Payload::RestOnly, status)
    }

    pub fn with_status(payload: Payload, status: StatusCode) -> Self {
        Self { payload, status }
    }

    /// Status the client receives. Redirects always go out as `302 Found`.
    pub fn response_status(&self) -> StatusCode {
        match self.payload {
            Payload::Redirect(_) => StatusCode::FOUND,
            _ => self.status,
        }
    }

    pub fn kind(&self) -> DescriptorKind {
        match self.payload {
            Payload::Page { .. } => DescriptorKind::Page,
            Payload::Redirect(_) => DescriptorKind::Redirect,
            Payload::Json(_) => DescriptorKind::Json,
            Payload::RestOnly => DescriptorKind::RestOnly,
        }
    }
}

//! Error taxonomy for the dispatch core.
//!
//! # Design Decisions
//! - Build-time problems are `ConfigurationError`; they fail table construction and never
//!   reach a request.
//! - Per-request problems are `DispatchError`; an unmapped handler failure is carried
//!   unchanged inside `DispatchError::Unhandled` so its kind and cause chain survive.

use axum::http::StatusCode;
use thiserror::Error;

use crate::outcome::failure::{Failure, FailureKind};
use crate::template::TemplateError;

/// Fatal, build-time configuration problems.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A path pattern could not be compiled.
    #[error("malformed pattern {pattern:?}: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// A handler declaration with an empty name.
    #[error("rule {pattern:?} declares a handler with an empty name")]
    EmptyHandlerName { pattern: String },

    /// A required handler did not resolve at build time.
    #[error("rule {pattern:?} requires handler {handler} which cannot be resolved")]
    MissingHandler { pattern: String, handler: String },

    /// The same method and pattern registered twice.
    #[error("duplicate rule for {method} {pattern:?}")]
    DuplicateRule { method: String, pattern: String },

    /// Two outcome modes declared on one rule.
    #[error("rule {pattern:?} declares both {first} and {second} outcomes")]
    ConflictingOutcome {
        pattern: String,
        first: &'static str,
        second: &'static str,
    },

    /// A failure mapping references a kind missing from the failure hierarchy.
    #[error("unknown failure kind {0}")]
    UnknownFailureKind(FailureKind),

    /// The failure hierarchy loops back on itself.
    #[error("failure hierarchy contains a cycle through {0}")]
    HierarchyCycle(FailureKind),

    /// A status code outside 100..=999.
    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    /// An HTTP method token that could not be parsed.
    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),
}

/// Errors raised by a content writer.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("response I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header value for {name}: {value:?}")]
    InvalidHeader { name: &'static str, value: String },

    /// The writer was handed a descriptor of another kind.
    #[error("{writer} writer cannot write a {kind} descriptor")]
    KindMismatch {
        writer: &'static str,
        kind: &'static str,
    },
}

/// Per-request dispatch errors that surface to the container boundary.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No rule matched; a catch-all rule was not registered.
    #[error("no rule matches {method} {path}")]
    UnmatchedRoute { method: String, path: String },

    /// A required handler could not be resolved for this request.
    #[error("handler {handler} is not available")]
    HandlerUnavailable { handler: String },

    /// The pipeline produced nothing and the rule declares no default outcome.
    #[error("rule {pattern:?} produced no outcome")]
    NoOutcome { pattern: String },

    /// A handler failure that no rule-local or global mapping covers.
    #[error("unhandled failure: {0}")]
    Unhandled(#[source] Failure),

    #[error(transparent)]
    Writer(#[from] WriterError),
}

impl DispatchError {
    /// The unmapped handler failure, if this error carries one.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            DispatchError::Unhandled(failure) => Some(failure),
            _ => None,
        }
    }

    /// Status the HTTP boundary answers with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::UnmatchedRoute { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

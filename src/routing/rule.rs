//! The immutable routing rule.

use std::fmt;
use std::sync::Arc;

use axum::http::{Method, StatusCode};

use crate::handler::declaration::HandlerDeclaration;
use crate::handler::interceptor::Interceptor;
use crate::outcome::failure::FailureTable;
use crate::routing::pattern::{PathPattern, PathVars};

/// How a raw handler value is interpreted for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMode {
    Page,
    Redirect,
    Json,
    Rest,
}

/// The rule's default outcome, used when the pipeline yields nothing usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeSpec {
    /// Nothing declared; the handlers must produce the outcome.
    None,
    Forward { path: String, status: StatusCode },
    Redirect(String),
    Json,
    Rest,
}

impl OutcomeSpec {
    pub fn mode(&self) -> RuleMode {
        match self {
            OutcomeSpec::None | OutcomeSpec::Forward { .. } => RuleMode::Page,
            OutcomeSpec::Redirect(_) => RuleMode::Redirect,
            OutcomeSpec::Json => RuleMode::Json,
            OutcomeSpec::Rest => RuleMode::Rest,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutcomeSpec::None => "none",
            OutcomeSpec::Forward { .. } => "forward",
            OutcomeSpec::Redirect(_) => "redirect",
            OutcomeSpec::Json => "json",
            OutcomeSpec::Rest => "rest",
        }
    }
}

/// A handler declared on a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRef {
    pub declaration: HandlerDeclaration,
    /// Absent optional handlers are skipped instead of failing the request.
    pub optional: bool,
}

/// A method + pattern bound to a handler pipeline and its outcome mapping.
pub struct Rule {
    pub(crate) method: Option<Method>,
    pub(crate) pattern: PathPattern,
    pub(crate) handlers: Vec<HandlerRef>,
    pub(crate) default_outcome: OutcomeSpec,
    pub(crate) failure_forwards: FailureTable,
    pub(crate) interceptors: Vec<Arc<dyn Interceptor>>,
    pub(crate) order: usize,
}

impl Rule {
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handlers(&self) -> &[HandlerRef] {
        &self.handlers
    }

    pub fn default_outcome(&self) -> &OutcomeSpec {
        &self.default_outcome
    }

    pub fn mode(&self) -> RuleMode {
        self.default_outcome.mode()
    }

    pub fn failure_forwards(&self) -> &FailureTable {
        &self.failure_forwards
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    /// Position of the rule in declaration order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Match method and path; a rule without a method accepts any.
    pub fn matches(&self, method: &Method, path: &str) -> Option<PathVars> {
        if self.method.as_ref().is_some_and(|m| m != method) {
            return None;
        }
        self.pattern.matches(path)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("handlers", &self.handlers)
            .field("default_outcome", &self.default_outcome)
            .field("failure_forwards", &self.failure_forwards)
            .field("interceptors", &self.interceptors.len())
            .field("order", &self.order)
            .finish()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{} {}", method, self.pattern),
            None => write!(f, "* {}", self.pattern),
        }
    }
}

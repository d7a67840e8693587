//! Outcome → response descriptor resolution.
//!
//! # Responsibilities
//! - Map explicit descriptor outcomes straight to their descriptor kind
//! - Interpret raw values through the rule's static mode
//! - Map failures through the rule-local table, then the global table
//!
//! # Design Decisions
//! - An unmapped failure is returned unchanged; no default error page is invented
//! - Precedence between the two tables is configurable (see [`FailurePrecedence`])

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DispatchError;
use crate::observability::metrics;
use crate::outcome::descriptor::{Outcome, Payload, RedirectTarget, ResponseDescriptor};
use crate::outcome::failure::{Failure, FailureForward, FailureHierarchy, FailureTable};
use crate::routing::rule::{OutcomeSpec, Rule, RuleMode};

/// Which table wins when both the rule and the global table map a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePrecedence {
    /// Closest registered ancestor wins; the rule-local table wins ties.
    #[default]
    MostSpecific,
    /// Any rule-local mapping wins over every global one.
    RuleFirst,
}

/// Resolves outcomes for one rule table snapshot.
#[derive(Debug, Clone, Default)]
pub struct OutcomeResolver {
    hierarchy: FailureHierarchy,
    global: FailureTable,
    precedence: FailurePrecedence,
}

impl OutcomeResolver {
    pub fn new(hierarchy: FailureHierarchy, global: FailureTable, precedence: FailurePrecedence) -> Self {
        Self {
            hierarchy,
            global,
            precedence,
        }
    }

    pub fn hierarchy(&self) -> &FailureHierarchy {
        &self.hierarchy
    }

    pub fn global_failures(&self) -> &FailureTable {
        &self.global
    }

    pub fn precedence(&self) -> FailurePrecedence {
        self.precedence
    }

    pub fn resolve(&self, outcome: Outcome, rule: &Rule) -> Result<ResponseDescriptor, DispatchError> {
        match outcome {
            Outcome::Rendered(path) | Outcome::Forward(path) => Ok(ResponseDescriptor::page(path)),
            Outcome::Redirect(target) => Ok(ResponseDescriptor::redirect(target)),
            Outcome::Json(value) => Ok(ResponseDescriptor::json(value)),
            Outcome::RestStatus(status) => Ok(ResponseDescriptor::rest(status)),
            Outcome::Value(value) => self.resolve_value(value, rule),
            Outcome::Empty => self.resolve_default(rule),
            Outcome::Failed(failure) => self.resolve_failure(failure, rule),
        }
    }

    fn resolve_value(&self, value: Value, rule: &Rule) -> Result<ResponseDescriptor, DispatchError> {
        let descriptor = match (rule.mode(), value) {
            (RuleMode::Json, value) => Some(ResponseDescriptor::json(value)),
            (RuleMode::Page, Value::String(path)) => Some(ResponseDescriptor::page(path)),
            (RuleMode::Redirect, Value::String(target)) => Some(ResponseDescriptor::redirect(RedirectTarget::new(target))),
            (RuleMode::Rest, Value::Number(code)) => code
                .as_u64()
                .and_then(|code| u16::try_from(code).ok())
                .and_then(|code| StatusCode::from_u16(code).ok())
                .map(ResponseDescriptor::rest),
            _ => None,
        };

        match descriptor {
            Some(descriptor) => Ok(descriptor),
            None => {
                tracing::warn!(
                    rule = %rule,
                    mode = ?rule.mode(),
                    "Handler value does not fit the rule mode, using the rule default"
                );
                self.resolve_default(rule)
            }
        }
    }

    fn resolve_default(&self, rule: &Rule) -> Result<ResponseDescriptor, DispatchError> {
        match rule.default_outcome() {
            OutcomeSpec::Forward { path, status } => Ok(ResponseDescriptor::with_status(
                Payload::Page { path: path.clone() },
                *status,
            )),
            OutcomeSpec::Redirect(target) => Ok(ResponseDescriptor::redirect(RedirectTarget::new(target.clone()))),
            OutcomeSpec::Json => Ok(ResponseDescriptor::json(Value::Null)),
            OutcomeSpec::Rest => Ok(ResponseDescriptor::rest(StatusCode::OK)),
            OutcomeSpec::None => Err(DispatchError::NoOutcome {
                pattern: rule.pattern().to_string(),
            }),
        }
    }

    fn resolve_failure(&self, failure: Failure, rule: &Rule) -> Result<ResponseDescriptor, DispatchError> {
        match self.find_forward(&failure, rule) {
            Some(forward) => {
                tracing::info!(
                    rule = %rule,
                    failure = %failure,
                    page = %forward.path,
                    status = forward.status.as_u16(),
                    "Failure mapped to page"
                );
                metrics::record_failure(failure.kind().as_str(), true);
                Ok(ResponseDescriptor::with_status(
                    Payload::Page {
                        path: forward.path.clone(),
                    },
                    forward.status,
                ))
            }
            None => {
                tracing::warn!(rule = %rule, failure = %failure, "Failure has no mapping");
                metrics::record_failure(failure.kind().as_str(), false);
                Err(DispatchError::Unhandled(failure))
            }
        }
    }

    /// The forward registered for the failure's closest ancestor.
    pub fn find_forward<'a>(&'a self, failure: &Failure, rule: &'a Rule) -> Option<&'a FailureForward> {
        let kind = failure.kind();
        let local = rule.failure_forwards().lookup(kind, &self.hierarchy);
        let global = self.global.lookup(kind, &self.hierarchy);

        let hit = match self.precedence {
            FailurePrecedence::RuleFirst => local.or(global),
            FailurePrecedence::MostSpecific => match (local, global) {
                (Some(local), Some(global)) if global.0 < local.0 => Some(global),
                (local, global) => local.or(global),
            },
        };
        hit.map(|(_, forward)| forward)
    }
}

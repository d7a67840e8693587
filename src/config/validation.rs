//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (forwards and parents name declared failure kinds)
//! - Validate value ranges (timeouts > 0, statuses valid, addresses parse)
//! - Detect rules declaring more than one default outcome
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::{Method, StatusCode};
use thiserror::Error;

use crate::config::schema::{AppConfig, FailureForwardConfig};
use crate::outcome::failure::FailureKind;
use crate::routing::pattern::PathPattern;

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("context path '{0}' must start with '/' and not end with '/'")]
    InvalidContextPath(String),

    #[error("template root must not be empty")]
    EmptyTemplateRoot,

    #[error("failure kind '{0}' declared twice")]
    DuplicateFailureKind(FailureKind),

    #[error("failure kind '{0}' is not declared")]
    UnknownFailureKind(FailureKind),

    #[error("rule {index}: pattern '{pattern}' is invalid: {reason}")]
    InvalidPattern { index: usize, pattern: String, reason: String },

    #[error("rule {index}: invalid method '{method}'")]
    InvalidMethod { index: usize, method: String },

    #[error("rule {index}: conflicting default outcomes {fields:?}")]
    ConflictingOutcome { index: usize, fields: Vec<&'static str> },

    #[error("rule {index}: 'status' requires 'forward'")]
    StatusWithoutForward { index: usize },

    #[error("rule {index}: handler name must not be empty")]
    EmptyHandlerName { index: usize },

    #[error("invalid status code {0}")]
    InvalidStatus(u16),
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.server.bind_address.clone()));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    let context = &config.server.context_path;
    if !context.is_empty() && (!context.starts_with('/') || context.ends_with('/')) {
        errors.push(ValidationError::InvalidContextPath(context.clone()));
    }
    if config.templates.root.trim().is_empty() {
        errors.push(ValidationError::EmptyTemplateRoot);
    }
    if config.observability.metrics_enabled && config.observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(config.observability.metrics_address.clone()));
    }

    // Failure kinds only need declaring once any are declared.
    let mut declared = HashSet::new();
    for failure in &config.failures {
        if !declared.insert(&failure.kind) {
            errors.push(ValidationError::DuplicateFailureKind(failure.kind.clone()));
        }
    }
    for parent in config.failures.iter().filter_map(|f| f.parent.as_ref()) {
        if !declared.contains(parent) {
            errors.push(ValidationError::UnknownFailureKind(parent.clone()));
        }
    }
    let check_forward = |forward: &FailureForwardConfig, errors: &mut Vec<ValidationError>| {
        if !declared.is_empty() && !declared.contains(&forward.failure) {
            errors.push(ValidationError::UnknownFailureKind(forward.failure.clone()));
        }
        if StatusCode::from_u16(forward.status).is_err() {
            errors.push(ValidationError::InvalidStatus(forward.status));
        }
    };

    for forward in &config.global_forwards {
        check_forward(forward, &mut errors);
    }

    for (index, rule) in config.rules.iter().enumerate() {
        if let Err(e) = PathPattern::parse(&rule.pattern) {
            errors.push(ValidationError::InvalidPattern {
                index,
                pattern: rule.pattern.clone(),
                reason: e.to_string(),
            });
        }
        if let Some(method) = &rule.method {
            if Method::from_bytes(method.to_ascii_uppercase().as_bytes()).is_err() {
                errors.push(ValidationError::InvalidMethod {
                    index,
                    method: method.clone(),
                });
            }
        }

        let fields = rule.outcome_fields();
        if fields.len() > 1 {
            errors.push(ValidationError::ConflictingOutcome { index, fields });
        }
        match (rule.status, &rule.forward) {
            (Some(_), None) => errors.push(ValidationError::StatusWithoutForward { index }),
            (Some(status), Some(_)) if StatusCode::from_u16(status).is_err() => {
                errors.push(ValidationError::InvalidStatus(status))
            }
            _ => {}
        }

        let mut names = rule.handlers.iter().chain(&rule.optional_handlers).chain(&rule.json);
        if names.any(|name| name.trim().is_empty()) {
            errors.push(ValidationError::EmptyHandlerName { index });
        }

        for forward in &rule.failure_forwards {
            check_forward(forward, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

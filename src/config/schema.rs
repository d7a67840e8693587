//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dispatcher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::outcome::failure::FailureKind;
use crate::outcome::resolver::FailurePrecedence;

/// Root configuration for the page dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Page template location.
    pub templates: TemplateConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Dispatch behaviour knobs.
    pub dispatch: DispatchConfig,

    /// Failure kinds known to the application, with their parents.
    pub failures: Vec<FailureConfig>,

    /// Failure forwards consulted after the rule-local ones.
    pub global_forwards: Vec<FailureForwardConfig>,

    /// Dispatch rules in declaration order.
    pub rules: Vec<RuleConfig>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Prefix stripped from request paths before matching (e.g., "/app").
    pub context_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            context_path: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory page paths are resolved against.
    pub root: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            root: "templates".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// How rule-local and global failure forwards are weighed.
    pub failure_precedence: FailurePrecedence,
}

/// One failure kind and its optional parent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FailureConfig {
    pub kind: FailureKind,

    #[serde(default)]
    pub parent: Option<FailureKind>,
}

/// Failure kind → page forward.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FailureForwardConfig {
    pub failure: FailureKind,

    pub path: String,

    #[serde(default = "default_failure_status")]
    pub status: u16,
}

fn default_failure_status() -> u16 {
    500
}

/// A dispatch rule. At most one of `forward`, `redirect`, `json` and `rest` may be set.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RuleConfig {
    /// Path pattern (e.g., "/users/{id}", "/**/*").
    pub pattern: String,

    /// HTTP method; any method when absent.
    pub method: Option<String>,

    /// Handler names invoked in order.
    pub handlers: Vec<String>,

    /// Handler names skipped when they cannot be resolved.
    pub optional_handlers: Vec<String>,

    /// Default page forward.
    pub forward: Option<String>,

    /// Status of the default page forward.
    pub status: Option<u16>,

    /// Default redirect target.
    pub redirect: Option<String>,

    /// Handler whose result is written as JSON.
    pub json: Option<String>,

    /// Status-only REST rule.
    pub rest: bool,

    pub failure_forwards: Vec<FailureForwardConfig>,
}

impl RuleConfig {
    /// Names of the outcome fields that are set.
    pub fn outcome_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.forward.is_some() {
            fields.push("forward");
        }
        if self.redirect.is_some() {
            fields.push("redirect");
        }
        if self.json.is_some() {
            fields.push("json");
        }
        if self.rest {
            fields.push("rest");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.dispatch.failure_precedence, FailurePrecedence::MostSpecific);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_rules_and_failures_deserialize() {
        let config: AppConfig = toml::from_str(
            r#"
            [dispatch]
            failure_precedence = "rule-first"

            [[failures]]
            kind = "error"

            [[failures]]
            kind = "null-pointer"
            parent = "error"

            [[global_forwards]]
            failure = "error"
            path = "/error.html"

            [[rules]]
            pattern = "/index"
            forward = "/index.html"

            [[rules.failure_forwards]]
            failure = "null-pointer"
            path = "/npe.html"
            status = 501

            [[rules]]
            pattern = "/restapi"
            method = "DELETE"
            handlers = ["rest-handler"]
            rest = true
            "#,
        )
        .unwrap();

        assert_eq!(config.dispatch.failure_precedence, FailurePrecedence::RuleFirst);
        assert_eq!(config.failures[1].parent, Some(FailureKind::from("error")));
        assert_eq!(config.global_forwards[0].status, 500);
        assert_eq!(config.rules[0].failure_forwards[0].status, 501);
        assert_eq!(config.rules[1].outcome_fields(), vec!["rest"]);
        assert_eq!(config.rules[1].method.as_deref(), Some("DELETE"));
    }
}

//! Rule table construction.
//!
//! # Responsibilities
//! - Accept fluent rule declarations in declaration order
//! - Accept global failure forwards independent of any rule
//! - Validate everything and freeze it into an immutable [`RuleTable`]
//!
//! # Design Decisions
//! - `build` borrows the builder, so building twice yields equal tables
//! - Declaration mistakes are collected while chaining and reported by `build`
//! - Rules are sorted by specificity; declaration order breaks ties

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use axum::http::{Method, StatusCode};

use crate::config::schema::AppConfig;
use crate::error::ConfigurationError;
use crate::handler::declaration::HandlerDeclaration;
use crate::handler::interceptor::Interceptor;
use crate::handler::resolver::HandlerResolver;
use crate::outcome::failure::{FailureForward, FailureHierarchy, FailureKind, FailureTable};
use crate::outcome::resolver::{FailurePrecedence, OutcomeResolver};
use crate::routing::matcher::{match_rule, RouteMatch};
use crate::routing::pattern::{PathPattern, Specificity};
use crate::routing::rule::{HandlerRef, OutcomeSpec, Rule};

/// A rule under construction, returned by [`RuleTableBuilder::add`].
pub struct RuleDeclaration {
    method: Option<Method>,
    pattern: String,
    handlers: Vec<HandlerRef>,
    outcome: OutcomeSpec,
    outcome_status: u16,
    conflict: Option<(&'static str, &'static str)>,
    failure_forwards: Vec<(FailureKind, String, u16)>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl RuleDeclaration {
    fn new(method: Option<Method>, pattern: &str) -> Self {
        Self {
            method,
            pattern: pattern.to_string(),
            handlers: Vec::new(),
            outcome: OutcomeSpec::None,
            outcome_status: 200,
            conflict: None,
            failure_forwards: Vec::new(),
            interceptors: Vec::new(),
        }
    }

    /// Forward to `path` when the handlers produce nothing.
    pub fn forward(&mut self, path: impl Into<String>) -> &mut Self {
        self.forward_with_status(path, 200)
    }

    /// Forward to `path` with `status` when the handlers produce nothing.
    pub fn forward_with_status(&mut self, path: impl Into<String>, status: u16) -> &mut Self {
        self.outcome_status = status;
        self.set_outcome(OutcomeSpec::Forward {
            path: path.into(),
            status: StatusCode::OK,
        })
    }

    /// Forward to `path` with `status` when a failure of `kind` (or a descendant) escapes.
    pub fn forward_on(&mut self, kind: impl Into<FailureKind>, path: impl Into<String>, status: u16) -> &mut Self {
        self.failure_forwards.push((kind.into(), path.into(), status));
        self
    }

    pub fn redirect(&mut self, target: impl Into<String>) -> &mut Self {
        self.set_outcome(OutcomeSpec::Redirect(target.into()))
    }

    /// Serve the value of `handler` as JSON.
    pub fn json(&mut self, handler: HandlerDeclaration) -> &mut Self {
        self.handler(handler);
        self.set_outcome(OutcomeSpec::Json)
    }

    /// Status-only REST responses.
    pub fn rest(&mut self) -> &mut Self {
        self.set_outcome(OutcomeSpec::Rest)
    }

    pub fn handler(&mut self, declaration: HandlerDeclaration) -> &mut Self {
        self.handlers.push(HandlerRef {
            declaration,
            optional: false,
        });
        self
    }

    /// A handler that is skipped when it cannot be resolved.
    pub fn optional_handler(&mut self, declaration: HandlerDeclaration) -> &mut Self {
        self.handlers.push(HandlerRef {
            declaration,
            optional: true,
        });
        self
    }

    pub fn interceptor(&mut self, interceptor: Arc<dyn Interceptor>) -> &mut Self {
        self.interceptors.push(interceptor);
        self
    }

    fn set_outcome(&mut self, outcome: OutcomeSpec) -> &mut Self {
        let current = self.outcome.name();
        if current != "none" && current != outcome.name() && self.conflict.is_none() {
            self.conflict = Some((current, outcome.name()));
        }
        self.outcome = outcome;
        self
    }
}

/// Collects declarations and builds [`RuleTable`]s.
#[derive(Default)]
pub struct RuleTableBuilder {
    declarations: Vec<RuleDeclaration>,
    global_forwards: Vec<(FailureKind, String, u16)>,
    hierarchy: FailureHierarchy,
    precedence: FailurePrecedence,
    default_interceptors: Vec<Arc<dyn Interceptor>>,
    verifier: Option<Arc<dyn HandlerResolver>>,
}

impl RuleTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a configuration file into declarations. Handlers are declared by name.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigurationError> {
        let mut builder = Self::new();

        let mut hierarchy = FailureHierarchy::new();
        for failure in &config.failures {
            hierarchy.declare(failure.kind.clone(), failure.parent.clone());
        }
        builder.with_hierarchy(hierarchy);
        builder.failure_precedence(config.dispatch.failure_precedence);

        for forward in &config.global_forwards {
            builder.add_global_forward(forward.failure.clone(), forward.path.clone(), forward.status);
        }

        for rule in &config.rules {
            let declaration = match &rule.method {
                Some(method) => {
                    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                        .map_err(|_| ConfigurationError::InvalidMethod(method.clone()))?;
                    builder.add_with_method(method, &rule.pattern)
                }
                None => builder.add(&rule.pattern),
            };

            for name in &rule.handlers {
                declaration.handler(HandlerDeclaration::named(name.clone()));
            }
            for name in &rule.optional_handlers {
                declaration.optional_handler(HandlerDeclaration::named(name.clone()));
            }
            if let Some(path) = &rule.forward {
                declaration.forward_with_status(path.clone(), rule.status.unwrap_or(200));
            }
            if let Some(target) = &rule.redirect {
                declaration.redirect(target.clone());
            }
            if let Some(name) = &rule.json {
                declaration.json(HandlerDeclaration::named(name.clone()));
            }
            if rule.rest {
                declaration.rest();
            }
            for forward in &rule.failure_forwards {
                declaration.forward_on(forward.failure.clone(), forward.path.clone(), forward.status);
            }
        }

        Ok(builder)
    }

    pub fn with_hierarchy(&mut self, hierarchy: FailureHierarchy) -> &mut Self {
        self.hierarchy = hierarchy;
        self
    }

    pub fn failure_precedence(&mut self, precedence: FailurePrecedence) -> &mut Self {
        self.precedence = precedence;
        self
    }

    /// Check at build time that every required handler resolves through `resolver`.
    pub fn verify_with(&mut self, resolver: Arc<dyn HandlerResolver>) -> &mut Self {
        self.verifier = Some(resolver);
        self
    }

    /// Interceptor applied to every rule, ahead of rule-local ones.
    pub fn add_default_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) -> &mut Self {
        self.default_interceptors.push(interceptor);
        self
    }

    /// Declare a rule matching any method.
    pub fn add(&mut self, pattern: &str) -> &mut RuleDeclaration {
        self.push(RuleDeclaration::new(None, pattern))
    }

    /// Declare a rule restricted to `method`.
    pub fn add_with_method(&mut self, method: Method, pattern: &str) -> &mut RuleDeclaration {
        self.push(RuleDeclaration::new(Some(method), pattern))
    }

    /// Map a failure kind to a page for every rule.
    pub fn add_global_forward(&mut self, kind: impl Into<FailureKind>, path: impl Into<String>, status: u16) -> &mut Self {
        self.global_forwards.push((kind.into(), path.into(), status));
        self
    }

    fn push(&mut self, declaration: RuleDeclaration) -> &mut RuleDeclaration {
        self.declarations.push(declaration);
        let last = self.declarations.len() - 1;
        &mut self.declarations[last]
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn build(&self) -> Result<RuleTable, ConfigurationError> {
        self.hierarchy.validate()?;

        let global: FailureTable = self
            .global_forwards
            .iter()
            .map(|entry| self.failure_forward(entry))
            .collect::<Result<_, _>>()?;

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(self.declarations.len());

        for (order, declaration) in self.declarations.iter().enumerate() {
            let pattern = PathPattern::parse(&declaration.pattern)?;

            let method_label = declaration.method.as_ref().map_or("*", Method::as_str).to_string();
            // Compared on compiled segments so `/x` and `/x/` collide.
            if !seen.insert((method_label.clone(), pattern.segments().to_vec())) {
                return Err(ConfigurationError::DuplicateRule {
                    method: method_label,
                    pattern: declaration.pattern.clone(),
                });
            }

            if let Some((first, second)) = declaration.conflict {
                return Err(ConfigurationError::ConflictingOutcome {
                    pattern: declaration.pattern.clone(),
                    first,
                    second,
                });
            }

            for handler in &declaration.handlers {
                if handler.declaration.is_blank() {
                    return Err(ConfigurationError::EmptyHandlerName {
                        pattern: declaration.pattern.clone(),
                    });
                }
                if let Some(verifier) = &self.verifier {
                    if !handler.optional && verifier.resolve(&handler.declaration).is_none() {
                        return Err(ConfigurationError::MissingHandler {
                            pattern: declaration.pattern.clone(),
                            handler: handler.declaration.to_string(),
                        });
                    }
                }
            }

            let default_outcome = match &declaration.outcome {
                OutcomeSpec::Forward { path, .. } => OutcomeSpec::Forward {
                    path: path.clone(),
                    status: parse_status(declaration.outcome_status)?,
                },
                other => other.clone(),
            };

            let failure_forwards: FailureTable = declaration
                .failure_forwards
                .iter()
                .map(|entry| self.failure_forward(entry))
                .collect::<Result<_, _>>()?;

            let interceptors = self
                .default_interceptors
                .iter()
                .chain(&declaration.interceptors)
                .cloned()
                .collect();

            rules.push(Rule {
                method: declaration.method.clone(),
                pattern,
                handlers: declaration.handlers.clone(),
                default_outcome,
                failure_forwards,
                interceptors,
                order,
            });
        }

        rules.sort_by_key(|rule| Specificity::of(&rule.pattern, rule.order));

        tracing::debug!(rules = rules.len(), global_forwards = global.entries().len(), "Rule table built");

        Ok(RuleTable {
            rules: rules.into_iter().map(Arc::new).collect(),
            outcomes: OutcomeResolver::new(self.hierarchy.clone(), global, self.precedence),
            version: 0,
        })
    }

    fn failure_forward(&self, (kind, path, status): &(FailureKind, String, u16)) -> Result<FailureForward, ConfigurationError> {
        // With an empty hierarchy, kinds are matched exactly and need no declaration.
        if !self.hierarchy.is_empty() && !self.hierarchy.contains(kind) {
            return Err(ConfigurationError::UnknownFailureKind(kind.clone()));
        }
        Ok(FailureForward {
            kind: kind.clone(),
            path: path.clone(),
            status: parse_status(*status)?,
        })
    }
}

fn parse_status(status: u16) -> Result<StatusCode, ConfigurationError> {
    StatusCode::from_u16(status).map_err(|_| ConfigurationError::InvalidStatus(status))
}

impl fmt::Debug for RuleTableBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTableBuilder")
            .field("declarations", &self.declarations.len())
            .field("global_forwards", &self.global_forwards)
            .field("precedence", &self.precedence)
            .finish_non_exhaustive()
    }
}

/// Immutable, specificity-sorted rules plus the global failure mapping.
#[derive(Debug)]
pub struct RuleTable {
    rules: Vec<Arc<Rule>>,
    outcomes: OutcomeResolver,
    version: u64,
}

impl RuleTable {
    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    pub fn outcomes(&self) -> &OutcomeResolver {
        &self.outcomes
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        match_rule(method, path, &self.rules)
    }
}

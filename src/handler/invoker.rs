//! Handler pipeline execution.
//!
//! # Responsibilities
//! - Resolve each declared handler of a rule, in order
//! - Wrap every handler call with the rule's interceptors
//! - Fold return values and failures into one [`Outcome`]
//!
//! # Design Decisions
//! - One [`ResultHolder`] per request, passed by unique reference
//! - A handler that raises ends the pipeline after its step's `post_handle` hooks, even
//!   when one of them cancels the failure
//! - A rule without handlers still runs its interceptors once around an empty step

use std::sync::Arc;

use crate::error::DispatchError;
use crate::handler::interceptor::{FailureHandler, Interceptor, ResultHolder};
use crate::handler::resolver::HandlerResolver;
use crate::handler::{Handler, HandlerContext};
use crate::http::request::RequestContext;
use crate::outcome::descriptor::Outcome;
use crate::routing::pattern::PathVars;
use crate::routing::rule::Rule;

/// Runs a rule's handler pipeline.
pub struct HandlerInvoker<'a> {
    resolver: &'a dyn HandlerResolver,
}

impl<'a> HandlerInvoker<'a> {
    pub fn new(resolver: &'a dyn HandlerResolver) -> Self {
        Self { resolver }
    }

    pub fn invoke(
        &self,
        rule: &Rule,
        request: &dyn RequestContext,
        path_vars: &PathVars,
    ) -> Result<Outcome, DispatchError> {
        let ctx = HandlerContext::new(request, path_vars, rule);
        let mut holder = ResultHolder::new();

        if rule.handlers().is_empty() {
            run_step(rule, &mut holder, None, &ctx);
            return Ok(holder.into_outcome());
        }

        for handler_ref in rule.handlers() {
            if holder.should_stop() {
                break;
            }

            let handler = match self.resolver.resolve(&handler_ref.declaration) {
                Some(handler) => handler,
                None if handler_ref.optional => {
                    tracing::debug!(
                        pattern = %rule.pattern(),
                        handler = %handler_ref.declaration,
                        "Optional handler not available, skipping"
                    );
                    continue;
                }
                None => {
                    return Err(DispatchError::HandlerUnavailable {
                        handler: handler_ref.declaration.to_string(),
                    })
                }
            };

            if run_step(rule, &mut holder, Some(&handler), &ctx) {
                break;
            }
        }

        Ok(holder.into_outcome())
    }
}

/// Run one handler between the rule's interceptors. Returns whether the step raised a failure.
fn run_step(
    rule: &Rule,
    holder: &mut ResultHolder,
    handler: Option<&Arc<dyn Handler>>,
    ctx: &HandlerContext<'_>,
) -> bool {
    let interceptors: &[Arc<dyn Interceptor>] = rule.interceptors();

    let mut entered = 0;
    for interceptor in interceptors {
        interceptor.pre_handle(rule, holder);
        entered += 1;
        if holder.should_stop() {
            break;
        }
    }

    if !holder.should_stop() {
        if let Some(handler) = handler {
            match handler.handle(ctx) {
                Ok(outcome) => holder.set_value(outcome),
                Err(failure) => {
                    tracing::debug!(pattern = %rule.pattern(), failure = %failure, "Handler raised a failure");
                    holder.set_failure(failure);
                }
            }
        }
    }

    let raised = holder.failure().is_some();
    let mut failures = FailureHandler::new(holder.take_failure());
    for interceptor in interceptors[..entered].iter().rev() {
        interceptor.post_handle(rule, holder, &mut failures);
    }
    if let Some(failure) = failures.into_failure() {
        holder.set_failure(failure);
    }
    raised
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::declaration::HandlerDeclaration;
    use crate::handler::registry::HandlerMap;
    use crate::handler::resolver::RegistryResolver;
    use crate::http::request::DispatchRequest;
    use crate::outcome::failure::Failure;
    use crate::routing::table::RuleTableBuilder;
    use axum::http::Method;
    use std::sync::Mutex;

    struct Returns(&'static str);

    impl Handler for Returns {
        fn handle(&self, _ctx: &HandlerContext<'_>) -> Result<Outcome, Failure> {
            Ok(Outcome::Forward(self.0.to_string()))
        }
    }

    struct Throws;

    impl Handler for Throws {
        fn handle(&self, _ctx: &HandlerContext<'_>) -> Result<Outcome, Failure> {
            Err(Failure::new("runtime", "thrown"))
        }
    }

    #[derive(Default)]
    struct Journal(Mutex<Vec<String>>);

    impl Journal {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Recording {
        name: &'static str,
        journal: Arc<Journal>,
        halt_with: Option<&'static str>,
        cancel: bool,
    }

    impl Recording {
        fn new(name: &'static str, journal: &Arc<Journal>) -> Self {
            Self {
                name,
                journal: journal.clone(),
                halt_with: None,
                cancel: false,
            }
        }
    }

    impl Interceptor for Recording {
        fn pre_handle(&self, _rule: &Rule, holder: &mut ResultHolder) {
            self.journal.push(format!("pre:{}", self.name));
            if let Some(target) = self.halt_with {
                holder.halt(Outcome::redirect(target));
            }
        }

        fn post_handle(&self, _rule: &Rule, _holder: &mut ResultHolder, failures: &mut FailureHandler) {
            self.journal.push(format!("post:{}:{}", self.name, failures.is_pending()));
            if self.cancel {
                failures.cancel();
            }
        }
    }

    fn registry() -> HandlerMap {
        let map = HandlerMap::new();
        map.register_named("first", Returns("/first"));
        map.register_named("second", Returns("/second"));
        map.register_named("throws", Throws);
        map
    }

    fn invoke(builder: &RuleTableBuilder, path: &str) -> Result<Outcome, DispatchError> {
        let table = builder.build().unwrap();
        let request = DispatchRequest::new(Method::GET, path);
        let matched = table.find(request.method(), request.path()).unwrap();
        let resolver = RegistryResolver::new(Arc::new(registry()));
        HandlerInvoker::new(&resolver).invoke(&matched.rule, &request, &matched.path_vars)
    }

    #[test]
    fn test_last_value_wins() {
        let mut builder = RuleTableBuilder::new();
        builder
            .add("/x")
            .handler(HandlerDeclaration::named("first"))
            .handler(HandlerDeclaration::named("second"));
        let outcome = invoke(&builder, "/x").unwrap();
        assert!(matches!(outcome, Outcome::Forward(p) if p == "/second"));
    }

    #[test]
    fn test_failure_skips_remaining_handlers_but_runs_post_hooks() {
        let journal = Arc::new(Journal::default());
        let mut builder = RuleTableBuilder::new();
        builder
            .add("/x")
            .interceptor(Arc::new(Recording::new("a", &journal)))
            .interceptor(Arc::new(Recording::new("b", &journal)))
            .handler(HandlerDeclaration::named("throws"))
            .handler(HandlerDeclaration::named("second"));

        let outcome = invoke(&builder, "/x").unwrap();
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(journal.entries(), vec!["pre:a", "pre:b", "post:b:true", "post:a:true"]);
    }

    #[test]
    fn test_cancelled_failure_keeps_earlier_value_and_stops() {
        let journal = Arc::new(Journal::default());
        let mut cancel = Recording::new("c", &journal);
        cancel.cancel = true;
        let mut builder = RuleTableBuilder::new();
        builder
            .add("/x")
            .interceptor(Arc::new(cancel))
            .handler(HandlerDeclaration::named("first"))
            .handler(HandlerDeclaration::named("throws"))
            .handler(HandlerDeclaration::named("second"));

        let outcome = invoke(&builder, "/x").unwrap();
        assert!(matches!(outcome, Outcome::Forward(p) if p == "/first"));
        assert_eq!(journal.entries(), vec!["pre:c", "post:c:false", "pre:c", "post:c:true"]);
    }

    #[test]
    fn test_pre_handle_halt_skips_handler() {
        let journal = Arc::new(Journal::default());
        let mut halting = Recording::new("h", &journal);
        halting.halt_with = Some("/login");
        let mut builder = RuleTableBuilder::new();
        builder
            .add("/x")
            .interceptor(Arc::new(halting))
            .interceptor(Arc::new(Recording::new("never", &journal)))
            .handler(HandlerDeclaration::named("throws"));

        let outcome = invoke(&builder, "/x").unwrap();
        assert!(matches!(outcome, Outcome::Redirect(t) if t.target == "/login"));
        assert_eq!(journal.entries(), vec!["pre:h", "post:h:false"]);
    }

    #[test]
    fn test_optional_handler_absent_is_skipped() {
        let mut builder = RuleTableBuilder::new();
        builder
            .add("/x")
            .optional_handler(HandlerDeclaration::named("missing"))
            .handler(HandlerDeclaration::named("first"));
        let outcome = invoke(&builder, "/x").unwrap();
        assert!(matches!(outcome, Outcome::Forward(p) if p == "/first"));
    }

    #[test]
    fn test_required_handler_absent_is_an_error() {
        let mut builder = RuleTableBuilder::new();
        builder.add("/x").handler(HandlerDeclaration::named("missing"));
        let err = invoke(&builder, "/x").unwrap_err();
        assert!(matches!(err, DispatchError::HandlerUnavailable { .. }));
    }

    #[test]
    fn test_interceptors_run_without_handlers() {
        let journal = Arc::new(Journal::default());
        let mut builder = RuleTableBuilder::new();
        builder
            .add("/x")
            .redirect("/elsewhere")
            .interceptor(Arc::new(Recording::new("only", &journal)));
        let outcome = invoke(&builder, "/x").unwrap();
        assert!(outcome.is_empty());
        assert_eq!(journal.entries(), vec!["pre:only", "post:only:false"]);
    }
}

//! Handler subsystem.
//!
//! # Data Flow
//! ```text
//! Matched Rule
//!     → declaration.rs (ByType / ByName handler declarations)
//!     → resolver.rs (registry lookup or direct construction)
//!     → invoker.rs (run handlers wrapped by interceptors)
//!     → Return: one Outcome (value, descriptor, or failure)
//! ```
//!
//! # Design Decisions
//! - Handlers are resolved per request; caching is a resolver policy
//! - Handlers are synchronous and run on the calling thread
//! - Shared handlers synchronize their own state

pub mod declaration;
pub mod interceptor;
pub mod invoker;
pub mod registry;
pub mod resolver;

use crate::http::request::RequestContext;
use crate::outcome::descriptor::Outcome;
use crate::outcome::failure::Failure;
use crate::routing::pattern::PathVars;
use crate::routing::rule::Rule;

pub use declaration::{HandlerDeclaration, HandlerType};
pub use interceptor::{FailureHandler, Interceptor, ResultHolder};
pub use invoker::HandlerInvoker;
pub use registry::{HandlerMap, HandlerRegistry};
pub use resolver::{FactoryResolver, HandlerResolver, RegistryResolver, ResolverChain};

/// What a handler sees of the request it serves.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    request: &'a dyn RequestContext,
    path_vars: &'a PathVars,
    rule: &'a Rule,
}

impl<'a> HandlerContext<'a> {
    pub fn new(request: &'a dyn RequestContext, path_vars: &'a PathVars, rule: &'a Rule) -> Self {
        Self {
            request,
            path_vars,
            rule,
        }
    }

    pub fn request(&self) -> &'a dyn RequestContext {
        self.request
    }

    /// Value captured by a `{name}` pattern segment.
    pub fn path_var(&self, name: &str) -> Option<&'a str> {
        self.path_vars.get(name)
    }

    /// Query parameter of the request.
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.request.param(name)
    }

    pub fn rule(&self) -> &'a Rule {
        self.rule
    }
}

/// A request handler.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &HandlerContext<'_>) -> Result<Outcome, Failure>;
}

impl<F> Handler for F
where
    F: Fn(&HandlerContext<'_>) -> Result<Outcome, Failure> + Send + Sync,
{
    fn handle(&self, ctx: &HandlerContext<'_>) -> Result<Outcome, Failure> {
        self(ctx)
    }
}

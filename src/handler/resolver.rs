//! Turning handler declarations into invokable instances.
//!
//! # Responsibilities
//! - Look up declared handlers in a managed registry
//! - Instantiate handlers directly from registered constructors
//! - Try several resolvers in order
//!
//! # Design Decisions
//! - Resolution has no side effects beyond the lookup or constructor call
//! - `None` means "absent"; malformed declarations are rejected at build time

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::handler::declaration::HandlerDeclaration;
use crate::handler::registry::HandlerRegistry;
use crate::handler::Handler;

/// Resolves a declaration to a handler instance.
pub trait HandlerResolver: Send + Sync {
    fn resolve(&self, declaration: &HandlerDeclaration) -> Option<Arc<dyn Handler>>;
}

/// Resolver backed by a [`HandlerRegistry`].
#[derive(Clone)]
pub struct RegistryResolver {
    registry: Arc<dyn HandlerRegistry>,
}

impl RegistryResolver {
    pub fn new(registry: Arc<dyn HandlerRegistry>) -> Self {
        Self { registry }
    }
}

impl HandlerResolver for RegistryResolver {
    fn resolve(&self, declaration: &HandlerDeclaration) -> Option<Arc<dyn Handler>> {
        match declaration {
            HandlerDeclaration::ByType(ty) => self.registry.lookup_by_type(ty),
            HandlerDeclaration::ByName(name) => self.registry.lookup_by_name(name),
        }
    }
}

impl fmt::Debug for RegistryResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryResolver").finish_non_exhaustive()
    }
}

type Constructor = Box<dyn Fn() -> Arc<dyn Handler> + Send + Sync>;

/// Resolver that builds a fresh handler for every resolution.
#[derive(Default)]
pub struct FactoryResolver {
    by_type: HashMap<TypeId, Constructor>,
    by_name: HashMap<String, Constructor>,
}

impl FactoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct `H` with `Default` whenever its type is declared.
    pub fn with_type<H: Handler + Default + 'static>(mut self) -> Self {
        self.by_type
            .insert(TypeId::of::<H>(), Box::new(|| Arc::new(H::default()) as Arc<dyn Handler>));
        self
    }

    /// Construct a handler with `constructor` whenever `name` is declared.
    pub fn with_named<F, H>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: Handler + 'static,
    {
        self.by_name
            .insert(name.into(), Box::new(move || Arc::new(constructor()) as Arc<dyn Handler>));
        self
    }
}

impl HandlerResolver for FactoryResolver {
    fn resolve(&self, declaration: &HandlerDeclaration) -> Option<Arc<dyn Handler>> {
        let constructor = match declaration {
            HandlerDeclaration::ByType(ty) => self.by_type.get(&ty.id()),
            HandlerDeclaration::ByName(name) => self.by_name.get(name),
        }?;
        Some(constructor())
    }
}

impl fmt::Debug for FactoryResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryResolver")
            .field("types", &self.by_type.len())
            .field("names", &self.by_name.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Tries each resolver in order; the first hit wins.
#[derive(Clone, Default)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn HandlerResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, resolver: impl HandlerResolver + 'static) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    pub fn push(&mut self, resolver: Arc<dyn HandlerResolver>) {
        self.resolvers.push(resolver);
    }
}

impl HandlerResolver for ResolverChain {
    fn resolve(&self, declaration: &HandlerDeclaration) -> Option<Arc<dyn Handler>> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.resolve(declaration))
    }
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

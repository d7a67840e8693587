//! Handler registry capability and a concurrent in-process implementation.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::handler::declaration::HandlerType;
use crate::handler::Handler;

/// Live handler instances looked up by type or by name.
pub trait HandlerRegistry: Send + Sync {
    fn lookup_by_type(&self, ty: &HandlerType) -> Option<Arc<dyn Handler>>;

    fn lookup_by_name(&self, name: &str) -> Option<Arc<dyn Handler>>;
}

/// Registry of shared singleton handlers.
///
/// Cloning shares the underlying maps, so handlers registered after the dispatcher
/// is built are visible to it.
#[derive(Clone, Default)]
pub struct HandlerMap {
    by_type: Arc<DashMap<TypeId, Arc<dyn Handler>>>,
    by_name: Arc<DashMap<String, Arc<dyn Handler>>>,
}

impl HandlerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under its own type.
    pub fn register<H: Handler + 'static>(&self, handler: H) -> Arc<dyn Handler> {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        self.by_type.insert(TypeId::of::<H>(), handler.clone());
        handler
    }

    /// Register `handler` under a symbolic name.
    pub fn register_named<H: Handler + 'static>(&self, name: impl Into<String>, handler: H) -> Arc<dyn Handler> {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        self.by_name.insert(name.into(), handler.clone());
        handler
    }

    /// Register one instance under both its type and `name`.
    pub fn register_as<H: Handler + 'static>(&self, name: impl Into<String>, handler: H) -> Arc<dyn Handler> {
        let handler = self.register(handler);
        self.by_name.insert(name.into(), handler.clone());
        handler
    }

    pub fn remove_named(&self, name: &str) -> bool {
        self.by_name.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_type.len() + self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty() && self.by_name.is_empty()
    }
}

impl HandlerRegistry for HandlerMap {
    fn lookup_by_type(&self, ty: &HandlerType) -> Option<Arc<dyn Handler>> {
        self.by_type.get(&ty.id()).map(|entry| entry.value().clone())
    }

    fn lookup_by_name(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.by_name.get(name).map(|entry| entry.value().clone())
    }
}

impl fmt::Debug for HandlerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.by_name.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        f.debug_struct("HandlerMap")
            .field("types", &self.by_type.len())
            .field("names", &names)
            .finish()
    }
}

//! Handler declarations as written in rule configuration.

use std::any::{type_name, TypeId};
use std::fmt;

/// Type identity of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerType {
    id: TypeId,
    name: &'static str,
}

impl HandlerType {
    pub fn of<H: 'static>() -> Self {
        Self {
            id: TypeId::of::<H>(),
            name: type_name::<H>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A handler named either by its type or by a symbolic name.
///
/// Declarations are resolved at dispatch time through a
/// [`HandlerResolver`](crate::handler::resolver::HandlerResolver); rules never hold
/// handler instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandlerDeclaration {
    ByType(HandlerType),
    ByName(String),
}

impl HandlerDeclaration {
    pub fn of<H: 'static>() -> Self {
        HandlerDeclaration::ByType(HandlerType::of::<H>())
    }

    pub fn named(name: impl Into<String>) -> Self {
        HandlerDeclaration::ByName(name.into())
    }

    /// A by-name declaration with nothing in it.
    pub fn is_blank(&self) -> bool {
        matches!(self, HandlerDeclaration::ByName(name) if name.trim().is_empty())
    }
}

impl fmt::Display for HandlerDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerDeclaration::ByType(ty) => write!(f, "type {}", ty.name()),
            HandlerDeclaration::ByName(name) => write!(f, "name {name:?}"),
        }
    }
}

//! Failure values, the failure type registry and failure → page tables.
//!
//! # Responsibilities
//! - Identify failures by an application-declared kind instead of a language type
//! - Walk a kind's ancestry from most-derived to least-derived
//! - Look up the closest registered ancestor in an ordered forward table
//!
//! # Design Decisions
//! - The hierarchy is closed: kinds and their parents are declared up front
//! - Single inheritance; an undeclared kind has no ancestors but itself
//! - Table lookup prefers the smallest ancestry distance, then registration order

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Identifier of a failure type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureKind(String);

impl FailureKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FailureKind {
    fn from(kind: &str) -> Self {
        Self(kind.to_string())
    }
}

impl From<String> for FailureKind {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A failure raised by handler code.
///
/// The optional source keeps the underlying cause chain intact when the failure
/// propagates out of the dispatcher unmapped.
#[derive(Debug)]
pub struct Failure {
    kind: FailureKind,
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Failure {
    pub fn new(kind: impl Into<FailureKind>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> &FailureKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

/// Closed registry of failure kinds and their parents.
#[derive(Debug, Clone, Default)]
pub struct FailureHierarchy {
    parents: HashMap<FailureKind, Option<FailureKind>>,
}

impl FailureHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `kind` with an optional parent, builder style.
    pub fn with(mut self, kind: impl Into<FailureKind>, parent: Option<&str>) -> Self {
        self.declare(kind, parent.map(FailureKind::from));
        self
    }

    /// Declare `kind` with an optional parent. Re-declaring a kind replaces its parent.
    pub fn declare(&mut self, kind: impl Into<FailureKind>, parent: Option<FailureKind>) {
        self.parents.insert(kind.into(), parent);
    }

    pub fn contains(&self, kind: &FailureKind) -> bool {
        self.parents.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check that every parent is declared and that no chain loops.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (kind, parent) in &self.parents {
            if let Some(parent) = parent {
                if !self.contains(parent) {
                    return Err(ConfigurationError::UnknownFailureKind(parent.clone()));
                }
            }
            // A chain longer than the registry must revisit a kind.
            if self.ancestry_unbounded(kind).nth(self.parents.len()).is_some() {
                return Err(ConfigurationError::HierarchyCycle(kind.clone()));
            }
        }
        Ok(())
    }

    /// Kinds from `kind` itself up to its root.
    pub fn ancestry<'a>(&'a self, kind: &'a FailureKind) -> impl Iterator<Item = &'a FailureKind> + 'a {
        self.ancestry_unbounded(kind).take(self.parents.len() + 1)
    }

    fn ancestry_unbounded<'a>(&'a self, kind: &'a FailureKind) -> impl Iterator<Item = &'a FailureKind> + 'a {
        std::iter::successors(Some(kind), move |current| {
            self.parents.get(*current).and_then(|parent| parent.as_ref())
        })
    }

    /// Number of parent hops from `kind` up to `ancestor`; zero when they are equal.
    pub fn distance(&self, ancestor: &FailureKind, kind: &FailureKind) -> Option<usize> {
        self.ancestry(kind).position(|candidate| candidate == ancestor)
    }

    pub fn is_ancestor_of(&self, ancestor: &FailureKind, kind: &FailureKind) -> bool {
        self.distance(ancestor, kind).is_some()
    }
}

/// A failure kind mapped to a forward page and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureForward {
    pub kind: FailureKind,
    pub path: String,
    pub status: StatusCode,
}

/// Ordered failure → (page, status) table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureTable {
    entries: Vec<FailureForward>,
}

impl FailureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, forward: FailureForward) {
        self.entries.push(forward);
    }

    pub fn entries(&self) -> &[FailureForward] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Closest registered ancestor of `kind`, with its ancestry distance.
    pub fn lookup(&self, kind: &FailureKind, hierarchy: &FailureHierarchy) -> Option<(usize, &FailureForward)> {
        self.entries
            .iter()
            .filter_map(|entry| hierarchy.distance(&entry.kind, kind).map(|d| (d, entry)))
            // min_by_key keeps the first of equal keys, which is registration order
            .min_by_key(|(distance, _)| *distance)
    }
}

impl FromIterator<FailureForward> for FailureTable {
    fn from_iter<I: IntoIterator<Item = FailureForward>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

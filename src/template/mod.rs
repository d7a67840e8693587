//! Template rendering capability.
//!
//! The page writer only needs "render path → byte stream"; template syntax and
//! fragment substitution live behind this trait.

pub mod file;

use std::collections::HashMap;
use std::io::{Cursor, Read};

use thiserror::Error;

pub use file::FileTemplateResolver;

/// Errors raised while producing a page.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The path has no backing resource.
    #[error("template resource not found: {0}")]
    ResourceNotFound(String),

    #[error("failed to read template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Renders the page at a path into a byte stream.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, path: &str) -> Result<Box<dyn Read + Send>, TemplateError>;
}

/// Pages held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplates {
    pages: HashMap<String, Vec<u8>>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.pages.insert(path.into(), content.into());
    }
}

impl TemplateRenderer for MemoryTemplates {
    fn render(&self, path: &str) -> Result<Box<dyn Read + Send>, TemplateError> {
        self.pages
            .get(path)
            .map(|content| Box::new(Cursor::new(content.clone())) as Box<dyn Read + Send>)
            .ok_or_else(|| TemplateError::ResourceNotFound(path.to_string()))
    }
}

//! Content writers.
//!
//! # Data Flow
//! ```text
//! ResponseDescriptor
//!     → WriterSet::select(kind)
//!         - page.rs (render template, stream bytes)
//!         - redirect.rs (302 + Location, no body)
//!         - json.rs (serialize payload)
//!         - rest.rs (status only)
//!     → ResponseSink
//! ```
//!
//! # Design Decisions
//! - Selection is a pure function of the descriptor kind
//! - Each writer reads only its own payload variant

pub mod json;
pub mod page;
pub mod redirect;
pub mod rest;

use std::fmt;
use std::sync::Arc;

use crate::error::WriterError;
use crate::http::response::ResponseSink;
use crate::outcome::descriptor::{DescriptorKind, ResponseDescriptor};
use crate::template::TemplateRenderer;

pub use json::JsonWriter;
pub use page::PageWriter;
pub use redirect::RedirectWriter;
pub use rest::RestWriter;

/// Serializes one descriptor kind to the response.
pub trait ContentWriter: Send + Sync {
    fn write(&self, descriptor: &ResponseDescriptor, response: &mut dyn ResponseSink) -> Result<(), WriterError>;
}

/// One writer per descriptor kind.
#[derive(Clone)]
pub struct WriterSet {
    page: Arc<dyn ContentWriter>,
    redirect: Arc<dyn ContentWriter>,
    json: Arc<dyn ContentWriter>,
    rest: Arc<dyn ContentWriter>,
}

impl WriterSet {
    /// The standard writers, rendering pages through `renderer`.
    pub fn new(renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self {
            page: Arc::new(PageWriter::new(renderer)),
            redirect: Arc::new(RedirectWriter),
            json: Arc::new(JsonWriter),
            rest: Arc::new(RestWriter),
        }
    }

    /// Replace the writer used for `kind`.
    pub fn with_writer(mut self, kind: DescriptorKind, writer: Arc<dyn ContentWriter>) -> Self {
        match kind {
            DescriptorKind::Page => self.page = writer,
            DescriptorKind::Redirect => self.redirect = writer,
            DescriptorKind::Json => self.json = writer,
            DescriptorKind::RestOnly => self.rest = writer,
        }
        self
    }

    pub fn select(&self, kind: DescriptorKind) -> &dyn ContentWriter {
        match kind {
            DescriptorKind::Page => self.page.as_ref(),
            DescriptorKind::Redirect => self.redirect.as_ref(),
            DescriptorKind::Json => self.json.as_ref(),
            DescriptorKind::RestOnly => self.rest.as_ref(),
        }
    }

    pub fn write(&self, descriptor: &ResponseDescriptor, response: &mut dyn ResponseSink) -> Result<(), WriterError> {
        self.select(descriptor.kind()).write(descriptor, response)
    }
}

impl fmt::Debug for WriterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSet").finish_non_exhaustive()
    }
}

fn mismatch(writer: &'static str, descriptor: &ResponseDescriptor) -> WriterError {
    WriterError::KindMismatch {
        writer,
        kind: descriptor.kind().as_str(),
    }
}

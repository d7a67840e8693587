//! Page-forward writer.

use std::io;
use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;

use crate::error::WriterError;
use crate::http::response::ResponseSink;
use crate::outcome::descriptor::{Payload, ResponseDescriptor};
use crate::template::TemplateRenderer;
use crate::writer::{mismatch, ContentWriter};

/// Renders the page and streams it after setting status and content type.
pub struct PageWriter {
    renderer: Arc<dyn TemplateRenderer>,
}

impl PageWriter {
    pub fn new(renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self { renderer }
    }
}

impl ContentWriter for PageWriter {
    fn write(&self, descriptor: &ResponseDescriptor, response: &mut dyn ResponseSink) -> Result<(), WriterError> {
        let Payload::Page { path } = &descriptor.payload else {
            return Err(mismatch("page", descriptor));
        };

        // Render before touching the response so a missing page leaves it untouched.
        let mut page = self.renderer.render(path)?;

        response.set_status(descriptor.status);
        response.set_header(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        let written = io::copy(&mut page, response.output())?;

        tracing::debug!(path = %path, bytes = written, status = descriptor.status.as_u16(), "Page written");
        Ok(())
    }
}

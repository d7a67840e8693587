//! Redirect writer.

use axum::http::header::LOCATION;
use axum::http::HeaderValue;

use crate::error::WriterError;
use crate::http::response::ResponseSink;
use crate::outcome::descriptor::{Payload, RedirectTarget, ResponseDescriptor};
use crate::writer::{mismatch, ContentWriter};

/// Answers `302 Found` with a `Location` header and no body.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectWriter;

/// `Location` value: the target with its params appended as a query string.
pub fn location(target: &RedirectTarget) -> String {
    if target.params.is_empty() {
        return target.target.clone();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(target.params.iter())
        .finish();
    let separator = if target.target.contains('?') { '&' } else { '?' };
    format!("{}{}{}", target.target, separator, query)
}

impl ContentWriter for RedirectWriter {
    fn write(&self, descriptor: &ResponseDescriptor, response: &mut dyn ResponseSink) -> Result<(), WriterError> {
        let Payload::Redirect(target) = &descriptor.payload else {
            return Err(mismatch("redirect", descriptor));
        };

        let location = location(target);
        let value = HeaderValue::from_str(&location).map_err(|_| WriterError::InvalidHeader {
            name: "location",
            value: location.clone(),
        })?;

        response.set_status(descriptor.response_status());
        response.set_header(LOCATION, value);

        tracing::debug!(location = %location, "Redirect written");
        Ok(())
    }
}

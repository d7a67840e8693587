//! Status-only REST writer.

use crate::error::WriterError;
use crate::http::response::ResponseSink;
use crate::outcome::descriptor::{Payload, ResponseDescriptor};
use crate::writer::{mismatch, ContentWriter};

/// Sets the status and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestWriter;

impl ContentWriter for RestWriter {
    fn write(&self, descriptor: &ResponseDescriptor, response: &mut dyn ResponseSink) -> Result<(), WriterError> {
        if descriptor.payload != Payload::RestOnly {
            return Err(mismatch("rest", descriptor));
        }
        response.set_status(descriptor.status);
        Ok(())
    }
}

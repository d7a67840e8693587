//! JSON writer.

use std::io::Write;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;

use crate::error::WriterError;
use crate::http::response::ResponseSink;
use crate::outcome::descriptor::{Payload, ResponseDescriptor};
use crate::writer::{mismatch, ContentWriter};

/// Serializes the payload as `application/json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWriter;

impl ContentWriter for JsonWriter {
    fn write(&self, descriptor: &ResponseDescriptor, response: &mut dyn ResponseSink) -> Result<(), WriterError> {
        let Payload::Json(value) = &descriptor.payload else {
            return Err(mismatch("json", descriptor));
        };

        let body = serde_json::to_vec(value)?;
        response.set_status(descriptor.status);
        response.set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response.output().write_all(&body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::BufferedResponse;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[test]
    fn test_json_body_round_trips() {
        let mut response = BufferedResponse::new();
        JsonWriter
            .write(&ResponseDescriptor::json(json!({"value": 123})), &mut response)
            .unwrap();
        assert_eq!(response.status(), Some(StatusCode::OK));
        assert_eq!(response.header("content-type"), Some("application/json"));
        let decoded: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(decoded, json!({"value": 123}));
    }
}

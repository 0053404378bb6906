//! Wire error payload and the codec that parses it from a response body.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CodecError;

/// The generic decoded shape of an error response.
pub trait ErrorPayload: Send + Sync + 'static {
    /// Code the registry is looked up by.
    fn error_code(&self) -> Option<&str>;

    /// Server-supplied message injected into the rebuilt error.
    fn message(&self) -> Option<&str>;
}

/// The default wire payload: `{"errorCode": "...", "message": "...", ...}`.
///
/// Any additional fields are kept in `extra_fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCodeAndMessage {
    pub error_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl ErrorCodeAndMessage {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: Some(message.into()),
            extra_fields: Map::new(),
        }
    }
}

impl ErrorPayload for ErrorCodeAndMessage {
    fn error_code(&self) -> Option<&str> {
        Some(&self.error_code)
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Parses a buffered response body into a payload of type `P`.
pub trait PayloadDecoder<P>: Send + Sync {
    fn decode(&self, body: &[u8]) -> Result<P, CodecError>;
}

/// JSON payload decoder backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayloadDecoder;

impl<P: DeserializeOwned> PayloadDecoder<P> for JsonPayloadDecoder {
    fn decode(&self, body: &[u8]) -> Result<P, CodecError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(CodecError::EmptyBody);
        }
        Ok(serde_json::from_slice(body)?)
    }
}

//! The `ErrorDecoder` trait and the generic fallback decoder.

use thiserror::Error;

use crate::error::BoxError;
use crate::response::Response;

/// Turns a failed response into an error value.
///
/// Implementations must be `Send + Sync` so a decoder can be shared by
/// concurrent calls. `decode` never fails: whatever happens, some error
/// value is produced.
pub trait ErrorDecoder: Send + Sync {
    /// `method_key` identifies the contract method that failed.
    fn decode(&self, method_key: &str, response: Response) -> BoxError;
}

impl<F> ErrorDecoder for F
where
    F: Fn(&str, Response) -> BoxError + Send + Sync,
{
    fn decode(&self, method_key: &str, response: Response) -> BoxError {
        self(method_key, response)
    }
}

/// The generic error produced for responses no registered error matches.
#[derive(Debug, Clone, Error)]
#[error("status {status} {reason} reading {method_key}")]
pub struct HttpStatusError {
    pub method_key: String,
    pub status: u16,
    pub reason: String,
    /// Buffered body text, if the body was buffered.
    pub body: Option<String>,
}

impl HttpStatusError {
    /// `true` for 5xx statuses.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Default fallback: wraps status, reason and body into [`HttpStatusError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorDecoder;

impl ErrorDecoder for DefaultErrorDecoder {
    fn decode(&self, method_key: &str, mut response: Response) -> BoxError {
        if let Err(e) = response.buffer_body() {
            tracing::debug!(error = %e, method_key, "failed to read error body");
        }
        Box::new(HttpStatusError {
            method_key: method_key.to_string(),
            status: response.status,
            reason: response.reason.clone(),
            body: response.body_text(),
        })
    }
}

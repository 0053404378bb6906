//! Error types raised by the registry builder, construction strategies and
//! payload codecs.

use thiserror::Error;

/// A boxed, thread-safe error value. Every decode call yields one of these.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal configuration problems detected while building a registry.
///
/// Any of these aborts decoder construction: the contract can never be
/// honored correctly, so it is rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Duplicate error code '{code}' for errors '{second}' and '{first}'")]
    DuplicateErrorCode {
        code: String,
        /// The type already registered under `code`.
        first: String,
        /// The type that tried to claim `code`.
        second: String,
    },

    #[error(
        "The error '{error_type}' needs to declare an error code to be rebuilt. \
         If it's a base error, declare it abstract."
    )]
    MissingErrorCode { error_type: String },
}

/// Failure to produce an error value from a bound construction strategy.
#[derive(Debug, Error)]
pub enum InstantiationError {
    /// The strategy supplied arguments the constructor did not expect.
    #[error("constructor of '{error_type}' expected {expected}, got {got}")]
    ArgumentMismatch {
        error_type: String,
        expected: String,
        got: String,
    },

    /// The constructor itself failed.
    #[error("constructor of '{error_type}' failed: {source}")]
    Factory {
        error_type: String,
        #[source]
        source: BoxError,
    },
}

/// Errors that can occur while parsing a wire error body.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("response body is empty")]
    EmptyBody,

    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

//! rpcerrors-core — foundation types and traits for the RpcErrors library.
//!
//! This crate defines:
//! - [`ServiceError`] — the base contract every reconstructible error implements
//! - [`ErrorType`] — the handle describing an error type and its constructors
//! - [`ApiContract`] — the client methods and the errors they declare
//! - [`ErrorPayload`] / [`PayloadDecoder`] — the wire error shape and its codec
//! - [`ErrorDecoder`] — the decoder trait, with [`DefaultErrorDecoder`] as fallback
//! - [`HierarchyResolver`] — the pluggable abstract-type expansion

pub mod constructor;
pub mod contract;
pub mod decoder;
pub mod error;
pub mod hierarchy;
pub mod payload;
pub mod response;
pub mod types;

pub use constructor::{Argument, Constructor, ParamType};
pub use contract::{ApiContract, HttpVerb, MethodSignature, Rule};
pub use decoder::{DefaultErrorDecoder, ErrorDecoder, HttpStatusError};
pub use error::{BoxError, CodecError, ConfigurationError, InstantiationError};
pub use hierarchy::{EmptyHierarchyResolver, HierarchyResolver, StaticHierarchyResolver};
pub use payload::{ErrorCodeAndMessage, ErrorPayload, JsonPayloadDecoder, PayloadDecoder};
pub use response::{Body, Response};
pub use types::{BodyDecoder, ErrorDetails, ErrorType, IntoBoxError, MessageSetter, ServiceError};

//! rpcerrors-decoder — rebuilds typed service errors from failed responses.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rpcerrors_core::{ApiContract, ErrorType, MethodSignature, Response, Rule};
//! use rpcerrors_decoder::ServiceErrorDecoder;
//!
//! # fn contract_errors() -> (ErrorType, ErrorType) { unimplemented!() }
//! let (base, not_found) = contract_errors();
//! let contract = ApiContract::new("UserApi").method(
//!     MethodSignature::new("getUser")
//!         .rule(Rule::request_line("GET /users/{id}"))
//!         .throws(not_found),
//! );
//!
//! let decoder = ServiceErrorDecoder::new(&contract, &base).unwrap();
//! let response = Response::new(404)
//!     .with_body(r#"{"errorCode":"USER_NOT_FOUND","message":"no user 42"}"#);
//! let err = decoder.decode("UserApi#getUser", response);
//! println!("{err}");
//! ```

pub mod cache;
pub mod decoder;
pub mod registry;
pub mod selector;

#[cfg(test)]
mod testing;

pub use cache::{CachedHierarchyResolver, SubtypeCache};
pub use decoder::{DecoderBuilder, DecoderOptions, MessageOverride, ServiceErrorDecoder};
pub use registry::{
    ErrorDescriptor, Origin, Registry, RegistryBuilder, UncheckedErrors, UncheckedErrorsHook,
};
pub use selector::{select_strategy, ConstructionStrategy, PlaceholderCause, SyntheticArgument};

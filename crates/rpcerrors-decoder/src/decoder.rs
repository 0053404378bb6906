//! The decode engine: rebuilds typed service errors from failed responses.
//!
//! A [`ServiceErrorDecoder`] is built once per API contract. Building scans
//! the contract into a [`Registry`]; decoding parses the response body into
//! an error payload, looks its code up, and produces a fresh instance of the
//! registered type carrying the server's message. Anything that cannot be
//! rebuilt goes to the fallback decoder.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use rpcerrors_core::{
    ApiContract, BoxError, ConfigurationError, DefaultErrorDecoder, EmptyHierarchyResolver,
    ErrorCodeAndMessage, ErrorDecoder, ErrorPayload, ErrorType, HierarchyResolver,
    JsonPayloadDecoder, PayloadDecoder, Response, ServiceError,
};

use crate::registry::{ErrorDescriptor, Registry, RegistryBuilder, UncheckedErrorsHook};

// ─── Options ──────────────────────────────────────────────────────────────────

/// Whether the raw message slot may be written when a type has no
/// [`MessageSetter`](rpcerrors_core::MessageSetter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOverride {
    #[default]
    Allowed,
    Forbidden,
}

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderOptions {
    /// Type-path prefix limiting hierarchy expansion. Empty is unrestricted.
    pub scope: String,
    /// Deserialize the whole body onto types that support it.
    pub multi_field: bool,
    /// Whether the raw message slot may be overwritten.
    pub message_override: MessageOverride,
    /// Whether `Rule::Mapping` marks a method as participating.
    pub mapping_rules: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            scope: String::new(),
            multi_field: false,
            message_override: MessageOverride::Allowed,
            mapping_rules: true,
        }
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────

/// Rebuilds the errors declared by one API contract.
///
/// Read-only after construction; safe to share across threads.
pub struct ServiceErrorDecoder<P = ErrorCodeAndMessage> {
    contract: String,
    registry: Registry,
    payload_decoder: Box<dyn PayloadDecoder<P>>,
    fallback: Box<dyn ErrorDecoder>,
    options: DecoderOptions,
}

impl ServiceErrorDecoder<ErrorCodeAndMessage> {
    /// Start building a decoder for `contract`, keeping only declared errors
    /// that derive from `base`.
    pub fn builder<'a>(contract: &'a ApiContract, base: &'a ErrorType) -> DecoderBuilder<'a> {
        DecoderBuilder {
            contract,
            base,
            options: DecoderOptions::default(),
            resolver: Box::new(EmptyHierarchyResolver),
            payload_decoder: Box::new(JsonPayloadDecoder),
            fallback: Box::new(DefaultErrorDecoder),
            hook: None,
        }
    }

    /// A decoder with default settings.
    pub fn new(contract: &ApiContract, base: &ErrorType) -> Result<Self, ConfigurationError> {
        Self::builder(contract, base).build()
    }
}

impl<P: ErrorPayload> ServiceErrorDecoder<P> {
    /// Registered codes, for diagnostics.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Name of the contract this decoder was built for.
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Rebuild the error carried by `response`, or delegate to the fallback.
    ///
    /// The fallback always receives a response whose body has been buffered,
    /// so it can read the body again.
    pub fn decode(&self, method_key: &str, mut response: Response) -> BoxError {
        if response.body.is_none() {
            return self.fallback.decode(method_key, response);
        }

        if let Err(e) = response.buffer_body() {
            tracing::debug!(error = %e, method_key, "failed to buffer error body");
            return self.fallback.decode(method_key, response);
        }

        let rebuilt = response
            .body_bytes()
            .and_then(|body| self.rebuild(method_key, body));

        match rebuilt {
            Some(error) => error.into_box_error(),
            None => self.fallback.decode(method_key, response),
        }
    }

    fn rebuild(&self, method_key: &str, body: &[u8]) -> Option<Box<dyn ServiceError>> {
        let payload = match self.payload_decoder.decode(body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, method_key, "body is not an error payload");
                return None;
            }
        };

        let Some(code) = payload.error_code() else {
            tracing::debug!(method_key, "error payload carries no code");
            return None;
        };

        let Some((descriptor, origin)) = self.registry.lookup(code) else {
            tracing::debug!(
                code,
                method_key,
                contract = %self.contract,
                "no registered error for code"
            );
            return None;
        };
        tracing::trace!(
            code,
            ?origin,
            error_type = %descriptor.error_type(),
            "matched error code"
        );

        if self.options.multi_field {
            if let Some(error) = self.decode_whole_body(descriptor, body) {
                return Some(error);
            }
        }

        let mut error = match descriptor.instantiate() {
            Ok(error) => error,
            Err(e) => {
                tracing::error!(
                    code,
                    error_type = %descriptor.error_type(),
                    error = %e,
                    "failed to instantiate error"
                );
                return None;
            }
        };

        if let Some(message) = payload.message() {
            self.inject_message(error.as_mut(), message);
        }
        Some(error)
    }

    fn decode_whole_body(
        &self,
        descriptor: &ErrorDescriptor,
        body: &[u8],
    ) -> Option<Box<dyn ServiceError>> {
        let decode_body = descriptor.error_type().body_decoder()?;
        match decode_body(body) {
            Ok(error) => Some(error),
            Err(e) => {
                tracing::debug!(
                    error_type = %descriptor.error_type(),
                    error = %e,
                    "multi-field decode failed, using default instance"
                );
                None
            }
        }
    }

    fn inject_message(&self, error: &mut dyn ServiceError, message: &str) {
        if let Some(setter) = error.as_message_setter() {
            setter.set_error_message(message.to_string());
            return;
        }
        if self.options.message_override == MessageOverride::Allowed {
            *error.details_mut().message_slot() = Some(message.to_string());
        }
    }
}

impl<P: ErrorPayload> ErrorDecoder for ServiceErrorDecoder<P> {
    fn decode(&self, method_key: &str, response: Response) -> BoxError {
        ServiceErrorDecoder::decode(self, method_key, response)
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────

/// Configures and builds a [`ServiceErrorDecoder`].
pub struct DecoderBuilder<'a, P = ErrorCodeAndMessage> {
    contract: &'a ApiContract,
    base: &'a ErrorType,
    options: DecoderOptions,
    resolver: Box<dyn HierarchyResolver>,
    payload_decoder: Box<dyn PayloadDecoder<P>>,
    fallback: Box<dyn ErrorDecoder>,
    hook: Option<Box<dyn UncheckedErrorsHook + 'a>>,
}

impl<'a, P: ErrorPayload> DecoderBuilder<'a, P> {
    /// Replace all options at once.
    pub fn options(mut self, options: DecoderOptions) -> Self {
        self.options = options;
        self
    }

    /// Type-path prefix limiting hierarchy expansion.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.options.scope = scope.into();
        self
    }

    pub fn multi_field(mut self, enabled: bool) -> Self {
        self.options.multi_field = enabled;
        self
    }

    pub fn message_override(mut self, message_override: MessageOverride) -> Self {
        self.options.message_override = message_override;
        self
    }

    /// Resolver used to expand abstract declared errors.
    pub fn hierarchy_resolver(mut self, resolver: impl HierarchyResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Decoder for responses no registered error matches.
    pub fn fallback(mut self, fallback: impl ErrorDecoder + 'static) -> Self {
        self.fallback = Box::new(fallback);
        self
    }

    /// Hook registering errors that the contract does not declare.
    pub fn unchecked_errors(mut self, hook: impl UncheckedErrorsHook + 'a) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Replace the payload codec, switching the payload type.
    pub fn payload_decoder<Q: ErrorPayload>(
        self,
        decoder: impl PayloadDecoder<Q> + 'static,
    ) -> DecoderBuilder<'a, Q> {
        DecoderBuilder {
            contract: self.contract,
            base: self.base,
            options: self.options,
            resolver: self.resolver,
            payload_decoder: Box::new(decoder),
            fallback: self.fallback,
            hook: self.hook,
        }
    }

    /// Parse bodies as JSON into `Q`.
    pub fn payload<Q: ErrorPayload + DeserializeOwned>(self) -> DecoderBuilder<'a, Q> {
        self.payload_decoder(JsonPayloadDecoder)
    }

    /// Scan the contract and build the decoder.
    pub fn build(self) -> Result<ServiceErrorDecoder<P>, ConfigurationError> {
        let registry =
            RegistryBuilder::new(self.contract, self.base, self.resolver.as_ref(), &self.options)
                .build(self.hook.as_deref())?;

        Ok(ServiceErrorDecoder {
            contract: self.contract.name().to_string(),
            registry,
            payload_decoder: self.payload_decoder,
            fallback: self.fallback,
            options: self.options,
        })
    }
}

//! Core types: the service error contract, its message slot, and the type
//! handles the registry is built from.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::constructor::Constructor;
use crate::error::BoxError;

// ─── Message slot ─────────────────────────────────────────────────────────────

/// Code, message and cause carried by every service error.
///
/// Error types embed one of these and expose it through
/// [`ServiceError::details`]. The decode engine writes the server-supplied
/// message into it when the type has no [`MessageSetter`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    #[serde(default)]
    error_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip)]
    cause: Option<BoxError>,
}

impl ErrorDetails {
    /// Details for `code` with no message and no cause.
    pub fn new(error_code: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: None,
            cause: None,
        }
    }

    /// Set the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the underlying cause.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// The wire error code.
    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    /// Current message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Underlying cause, if any.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Direct access to the message storage.
    pub fn message_slot(&mut self) -> &mut Option<String> {
        &mut self.message
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{message}"),
            None => write!(f, "{}", self.error_code),
        }
    }
}

// ─── Service error contract ───────────────────────────────────────────────────

/// Converts a boxed error into a [`BoxError`]. Blanket-implemented for every
/// sized error type, so implementors never write it by hand.
pub trait IntoBoxError {
    fn into_box_error(self: Box<Self>) -> BoxError;
}

impl<T: std::error::Error + Send + Sync + 'static> IntoBoxError for T {
    fn into_box_error(self: Box<Self>) -> BoxError {
        self
    }
}

/// Explicit "set message" capability. Preferred over the raw message slot
/// when a type implements it.
pub trait MessageSetter {
    fn set_error_message(&mut self, message: String);
}

/// The base error contract every reconstructible error implements.
pub trait ServiceError: std::error::Error + IntoBoxError + Send + Sync + 'static {
    fn details(&self) -> &ErrorDetails;

    fn details_mut(&mut self) -> &mut ErrorDetails;

    /// Returns `Some` when the type implements [`MessageSetter`].
    fn as_message_setter(&mut self) -> Option<&mut dyn MessageSetter> {
        None
    }

    /// The wire code this error is matched under. Empty means undeclared.
    fn error_code(&self) -> &str {
        self.details().error_code()
    }

    fn message(&self) -> Option<&str> {
        self.details().message()
    }
}

// ─── Type handles ─────────────────────────────────────────────────────────────

/// Deserializes a full response body onto a concrete error type.
pub type BodyDecoder = fn(&[u8]) -> Result<Box<dyn ServiceError>, serde_json::Error>;

fn decode_body<E>(body: &[u8]) -> Result<Box<dyn ServiceError>, serde_json::Error>
where
    E: ServiceError + DeserializeOwned,
{
    let value: E = serde_json::from_slice(body)?;
    Ok(Box::new(value))
}

enum TypeKind {
    /// Declared on a contract but unrelated to any service error hierarchy.
    Opaque,
    Abstract,
    Concrete {
        constructors: Vec<Constructor>,
        designated: Option<Constructor>,
        body_decoder: Option<BodyDecoder>,
    },
}

struct TypeInfo {
    path: Cow<'static, str>,
    /// Nearest ancestor first.
    ancestors: Vec<Cow<'static, str>>,
    kind: TypeKind,
}

/// An opaque handle identifying an error type: its path, its position in
/// the error hierarchy, and (for concrete types) how to build it.
///
/// Handles compare equal by path.
#[derive(Clone)]
pub struct ErrorType {
    inner: Arc<TypeInfo>,
}

impl ErrorType {
    /// Start describing a concrete error type `E`. The path is
    /// `std::any::type_name::<E>()`.
    pub fn concrete<E: ServiceError>() -> ConcreteTypeBuilder<E> {
        ConcreteTypeBuilder {
            path: Cow::Borrowed(std::any::type_name::<E>()),
            ancestors: Vec::new(),
            constructors: Vec::new(),
            designated: None,
            body_decoder: None,
            _marker: PhantomData,
        }
    }

    /// Start describing an abstract error type (a node of the hierarchy with
    /// no values of its own), e.g. `"search_api::errors::QueryError"`.
    pub fn abstract_type(path: &'static str) -> AbstractTypeBuilder {
        AbstractTypeBuilder {
            path: Cow::Borrowed(path),
            ancestors: Vec::new(),
        }
    }

    /// A declared error type that is not part of any service error hierarchy.
    pub fn opaque(path: &'static str) -> Self {
        Self::from_info(TypeInfo {
            path: Cow::Borrowed(path),
            ancestors: Vec::new(),
            kind: TypeKind::Opaque,
        })
    }

    fn from_info(info: TypeInfo) -> Self {
        Self {
            inner: Arc::new(info),
        }
    }

    /// Fully-qualified path, e.g. `"search_api::errors::ValidationError"`.
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.path().rsplit("::").next().unwrap_or(self.path())
    }

    /// `true` for hierarchy nodes with no values of their own.
    pub fn is_abstract(&self) -> bool {
        matches!(self.inner.kind, TypeKind::Abstract)
    }

    /// `true` for types that can be instantiated.
    pub fn is_concrete(&self) -> bool {
        matches!(self.inner.kind, TypeKind::Concrete { .. })
    }

    /// `true` if `self` is `other` or derives from it.
    pub fn is_subtype_of(&self, other: &ErrorType) -> bool {
        self == other || self.inner.ancestors.iter().any(|a| a == other.path())
    }

    /// `true` if the path lies within `scope` (a `::`-separated prefix).
    /// An empty scope contains every type.
    pub fn in_scope(&self, scope: &str) -> bool {
        if scope.is_empty() {
            return true;
        }
        match self.path().strip_prefix(scope) {
            Some(rest) => rest.is_empty() || rest.starts_with("::"),
            None => false,
        }
    }

    /// Candidate constructors in declaration order. Empty for non-concrete types.
    pub fn constructors(&self) -> &[Constructor] {
        match &self.inner.kind {
            TypeKind::Concrete { constructors, .. } => constructors,
            _ => &[],
        }
    }

    /// The single constructor the type designates for reconstruction, if any.
    pub fn designated_constructor(&self) -> Option<&Constructor> {
        match &self.inner.kind {
            TypeKind::Concrete { designated, .. } => designated.as_ref(),
            _ => None,
        }
    }

    /// Full-body decoder used in multi-field mode.
    pub fn body_decoder(&self) -> Option<BodyDecoder> {
        match &self.inner.kind {
            TypeKind::Concrete { body_decoder, .. } => *body_decoder,
            _ => None,
        }
    }
}

impl PartialEq for ErrorType {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for ErrorType {}

impl std::hash::Hash for ErrorType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.path().hash(state);
    }
}

impl fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.inner.kind {
            TypeKind::Opaque => "opaque",
            TypeKind::Abstract => "abstract",
            TypeKind::Concrete { .. } => "concrete",
        };
        f.debug_struct("ErrorType")
            .field("path", &self.path())
            .field("kind", &kind)
            .finish()
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

fn lineage(parent: &ErrorType) -> Vec<Cow<'static, str>> {
    let mut ancestors = Vec::with_capacity(parent.inner.ancestors.len() + 1);
    ancestors.push(parent.inner.path.clone());
    ancestors.extend(parent.inner.ancestors.iter().cloned());
    ancestors
}

/// Builder for abstract hierarchy nodes.
pub struct AbstractTypeBuilder {
    path: Cow<'static, str>,
    ancestors: Vec<Cow<'static, str>>,
}

impl AbstractTypeBuilder {
    /// Place this node under `parent`.
    pub fn extends(mut self, parent: &ErrorType) -> Self {
        self.ancestors = lineage(parent);
        self
    }

    /// Finish the handle.
    pub fn build(self) -> ErrorType {
        ErrorType::from_info(TypeInfo {
            path: self.path,
            ancestors: self.ancestors,
            kind: TypeKind::Abstract,
        })
    }
}

/// Builder for concrete error types.
pub struct ConcreteTypeBuilder<E> {
    path: Cow<'static, str>,
    ancestors: Vec<Cow<'static, str>>,
    constructors: Vec<Constructor>,
    designated: Option<Constructor>,
    body_decoder: Option<BodyDecoder>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: ServiceError> ConcreteTypeBuilder<E> {
    /// Place this type under `parent`.
    pub fn extends(mut self, parent: &ErrorType) -> Self {
        self.ancestors = lineage(parent);
        self
    }

    /// Declare a public constructor. Declaration order is significant: it
    /// breaks ties during constructor selection.
    ///
    /// A constructor building a type other than `E` is ignored.
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        if self.builds_self(&constructor) {
            self.constructors.push(constructor);
        }
        self
    }

    /// Designate the constructor used for reconstruction, bypassing
    /// selection among the declared ones. Ignored if it builds a type other
    /// than `E`.
    pub fn designated(mut self, constructor: Constructor) -> Self {
        if self.builds_self(&constructor) {
            self.designated = Some(constructor);
        }
        self
    }

    fn builds_self(&self, constructor: &Constructor) -> bool {
        let matches = constructor.produces() == std::any::type_name::<E>();
        if !matches {
            tracing::warn!(
                error_type = %self.path,
                produces = constructor.produces(),
                "constructor builds a different error type, it will be ignored"
            );
        }
        matches
    }

    /// Allow multi-field mode to deserialize the whole body onto `E`.
    pub fn deserializable(mut self) -> Self
    where
        E: DeserializeOwned,
    {
        self.body_decoder = Some(decode_body::<E>);
        self
    }

    /// Finish the handle.
    pub fn build(self) -> ErrorType {
        ErrorType::from_info(TypeInfo {
            path: self.path,
            ancestors: self.ancestors,
            kind: TypeKind::Concrete {
                constructors: self.constructors,
                designated: self.designated,
                body_decoder: self.body_decoder,
            },
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

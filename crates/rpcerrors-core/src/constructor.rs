//! Declared constructors of concrete error types.
//!
//! Each constructor advertises the parameter shapes it needs. The engine
//! decides, per type, which constructor it can fill with synthetic
//! arguments and binds that one as the type's construction strategy.

use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, InstantiationError};
use crate::types::ServiceError;

/// The type of one constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// A message string.
    Message,
    /// Any error value used as the cause.
    Cause,
    /// A cause accepted as a generic `anyhow::Error`.
    GenericCause,
    /// Anything else. The engine never synthesizes these.
    Other(&'static str),
}

impl ParamType {
    /// `true` for parameters carrying a cause.
    pub fn is_cause(&self) -> bool {
        matches!(self, Self::Cause | Self::GenericCause)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message => write!(f, "message"),
            Self::Cause => write!(f, "cause"),
            Self::GenericCause => write!(f, "generic cause"),
            Self::Other(ty) => write!(f, "{ty}"),
        }
    }
}

/// A concrete argument passed to a constructor.
#[derive(Debug)]
pub enum Argument {
    Message(String),
    Cause(BoxError),
    GenericCause(anyhow::Error),
}

impl Argument {
    fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Cause(_) => "cause",
            Self::GenericCause(_) => "generic cause",
        }
    }

    fn into_message(self, error_type: &str) -> Result<String, InstantiationError> {
        match self {
            Self::Message(m) => Ok(m),
            other => Err(mismatch(error_type, "message", other.kind())),
        }
    }

    fn into_cause(self, error_type: &str) -> Result<BoxError, InstantiationError> {
        match self {
            Self::Cause(c) => Ok(c),
            Self::GenericCause(c) => Ok(c.into()),
            other => Err(mismatch(error_type, "cause", other.kind())),
        }
    }

    fn into_generic_cause(self, error_type: &str) -> Result<anyhow::Error, InstantiationError> {
        match self {
            Self::GenericCause(c) => Ok(c),
            other => Err(mismatch(error_type, "generic cause", other.kind())),
        }
    }
}

fn mismatch(error_type: &str, expected: &str, got: &str) -> InstantiationError {
    InstantiationError::ArgumentMismatch {
        error_type: error_type.to_string(),
        expected: expected.to_string(),
        got: got.to_string(),
    }
}

fn take<const N: usize>(
    error_type: &str,
    args: Vec<Argument>,
) -> Result<[Argument; N], InstantiationError> {
    args.try_into().map_err(|args: Vec<Argument>| {
        mismatch(
            error_type,
            &format!("{N} argument(s)"),
            &format!("{} argument(s)", args.len()),
        )
    })
}

type Build =
    dyn Fn(Vec<Argument>) -> Result<Box<dyn ServiceError>, InstantiationError> + Send + Sync;

/// One public constructor of a concrete error type.
#[derive(Clone)]
pub struct Constructor {
    params: Vec<ParamType>,
    /// `type_name` of the error the constructor builds.
    produces: &'static str,
    build: Arc<Build>,
}

impl Constructor {
    fn typed<E, F>(params: Vec<ParamType>, f: F) -> Self
    where
        E: ServiceError,
        F: Fn(&'static str, Vec<Argument>) -> Result<E, InstantiationError> + Send + Sync + 'static,
    {
        let error_type = std::any::type_name::<E>();
        Self {
            params,
            produces: error_type,
            build: Arc::new(move |args| {
                f(error_type, args).map(|e| Box::new(e) as Box<dyn ServiceError>)
            }),
        }
    }

    /// `E()`.
    pub fn empty<E, F>(f: F) -> Self
    where
        E: ServiceError,
        F: Fn() -> E + Send + Sync + 'static,
    {
        Self::typed(vec![], move |ty, args| {
            let [] = take::<0>(ty, args)?;
            Ok(f())
        })
    }

    /// `E(message)`.
    pub fn message<E, F>(f: F) -> Self
    where
        E: ServiceError,
        F: Fn(String) -> E + Send + Sync + 'static,
    {
        Self::typed(vec![ParamType::Message], move |ty, args| {
            let [m] = take::<1>(ty, args)?;
            Ok(f(m.into_message(ty)?))
        })
    }

    /// `E(message, message)`.
    pub fn two_messages<E, F>(f: F) -> Self
    where
        E: ServiceError,
        F: Fn(String, String) -> E + Send + Sync + 'static,
    {
        Self::typed(vec![ParamType::Message, ParamType::Message], move |ty, args| {
            let [a, b] = take::<2>(ty, args)?;
            Ok(f(a.into_message(ty)?, b.into_message(ty)?))
        })
    }

    /// `E(message, cause)`.
    pub fn message_and_cause<E, F>(f: F) -> Self
    where
        E: ServiceError,
        F: Fn(String, BoxError) -> E + Send + Sync + 'static,
    {
        Self::typed(vec![ParamType::Message, ParamType::Cause], move |ty, args| {
            let [m, c] = take::<2>(ty, args)?;
            Ok(f(m.into_message(ty)?, c.into_cause(ty)?))
        })
    }

    /// `E(cause)`.
    pub fn cause<E, F>(f: F) -> Self
    where
        E: ServiceError,
        F: Fn(BoxError) -> E + Send + Sync + 'static,
    {
        Self::typed(vec![ParamType::Cause], move |ty, args| {
            let [c] = take::<1>(ty, args)?;
            Ok(f(c.into_cause(ty)?))
        })
    }

    /// `E(anyhow::Error)`.
    pub fn generic_cause<E, F>(f: F) -> Self
    where
        E: ServiceError,
        F: Fn(anyhow::Error) -> E + Send + Sync + 'static,
    {
        Self::typed(vec![ParamType::GenericCause], move |ty, args| {
            let [c] = take::<1>(ty, args)?;
            Ok(f(c.into_generic_cause(ty)?))
        })
    }

    /// A constructor with an arbitrary parameter list and a fallible body.
    /// Use this to describe shapes outside the fixed catalogue, such as
    /// parameters of [`ParamType::Other`].
    pub fn with_params<E, F>(params: &[ParamType], f: F) -> Self
    where
        E: ServiceError,
        F: Fn(Vec<Argument>) -> Result<E, BoxError> + Send + Sync + 'static,
    {
        Self::typed(params.to_vec(), move |ty, args| {
            f(args).map_err(|source| InstantiationError::Factory {
                error_type: ty.to_string(),
                source,
            })
        })
    }

    /// Parameter shapes, in call order.
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Path of the error type this constructor builds.
    pub fn produces(&self) -> &'static str {
        self.produces
    }

    /// `true` if any parameter carries a cause.
    pub fn accepts_cause(&self) -> bool {
        self.params.iter().any(ParamType::is_cause)
    }

    /// Call the constructor with `args`, one per parameter.
    pub fn invoke(&self, args: Vec<Argument>) -> Result<Box<dyn ServiceError>, InstantiationError> {
        (self.build)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &self.params)
            .field("produces", &self.produces)
            .finish_non_exhaustive()
    }
}

//! Constructor selection.
//!
//! For a concrete error type, find a declared constructor whose every
//! parameter can be filled from a fixed catalogue of synthetic arguments,
//! and bind it as the type's construction strategy.
//!
//! Selection order:
//! 1. A designated constructor, if the type declares one.
//! 2. The first fillable constructor taking no cause argument.
//! 3. The first fillable constructor, in declaration order.

use rpcerrors_core::{Argument, Constructor, ErrorType, InstantiationError, ParamType, ServiceError};
use thiserror::Error;

/// The cause handed to constructors that require one during reconstruction.
#[derive(Debug, Clone, Copy, Default, Error)]
#[error("Not the real cause, this error was only used for instantiation by the rpcerrors decoder")]
pub struct PlaceholderCause;

/// A synthetic argument the engine is willing to supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticArgument {
    EmptyMessage,
    PlaceholderCause,
}

impl SyntheticArgument {
    /// Catalogue, in matching order.
    pub const CATALOGUE: [SyntheticArgument; 2] = [Self::EmptyMessage, Self::PlaceholderCause];

    /// `true` if this argument is compatible with `param`.
    pub fn fills(self, param: ParamType) -> bool {
        match (self, param) {
            (Self::EmptyMessage, ParamType::Message) => true,
            (Self::PlaceholderCause, ParamType::Cause | ParamType::GenericCause) => true,
            _ => false,
        }
    }

    /// A fresh argument value for `param`.
    fn materialize(self, param: ParamType) -> Argument {
        match (self, param) {
            (Self::PlaceholderCause, ParamType::GenericCause) => {
                Argument::GenericCause(anyhow::Error::new(PlaceholderCause))
            }
            (Self::PlaceholderCause, _) => Argument::Cause(Box::new(PlaceholderCause)),
            (Self::EmptyMessage, _) => Argument::Message(String::new()),
        }
    }

    /// `true` for the placeholder cause.
    pub fn is_cause(self) -> bool {
        matches!(self, Self::PlaceholderCause)
    }
}

/// A constructor bound to the synthetic arguments that fill it.
#[derive(Debug, Clone)]
pub struct ConstructionStrategy {
    constructor: Constructor,
    arguments: Vec<(ParamType, SyntheticArgument)>,
}

impl ConstructionStrategy {
    /// Bind `constructor` if every parameter can be filled.
    pub fn bind(constructor: &Constructor) -> Option<Self> {
        let arguments = constructor
            .params()
            .iter()
            .map(|&param| {
                SyntheticArgument::CATALOGUE
                    .into_iter()
                    .find(|arg| arg.fills(param))
                    .map(|arg| (param, arg))
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            constructor: constructor.clone(),
            arguments,
        })
    }

    /// Produce a default instance of the bound type.
    pub fn instantiate(&self) -> Result<Box<dyn ServiceError>, InstantiationError> {
        let args = self
            .arguments
            .iter()
            .map(|&(param, arg)| arg.materialize(param))
            .collect();
        self.constructor.invoke(args)
    }

    /// `true` if a placeholder cause is passed.
    pub fn passes_cause(&self) -> bool {
        self.arguments.iter().any(|(_, arg)| arg.is_cause())
    }

    /// Parameters of the bound constructor.
    pub fn params(&self) -> &[ParamType] {
        self.constructor.params()
    }
}

/// Choose the construction strategy for `error_type`.
///
/// Returns `None` when no declared constructor can be filled; the type then
/// cannot be registered.
pub fn select_strategy(error_type: &ErrorType) -> Option<ConstructionStrategy> {
    if let Some(designated) = error_type.designated_constructor() {
        return ConstructionStrategy::bind(designated);
    }

    let candidates: Vec<ConstructionStrategy> = error_type
        .constructors()
        .iter()
        .filter_map(ConstructionStrategy::bind)
        .collect();

    // Prefer a constructor that will not carry a fake cause.
    let preferred = candidates.iter().position(|c| !c.passes_cause()).unwrap_or(0);
    candidates.into_iter().nth(preferred)
}

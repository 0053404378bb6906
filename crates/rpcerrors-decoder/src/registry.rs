//! Error registry — maps wire error codes to the types that rebuild them.
//!
//! A [`Registry`] is built once per decoder by [`RegistryBuilder`], which
//! walks the contract's declared error types, expands abstract ones through
//! a [`HierarchyResolver`], and picks a construction strategy per type.
//! It is read-only afterwards.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use rpcerrors_core::{
    ApiContract, ConfigurationError, ErrorType, HierarchyResolver, InstantiationError, ServiceError,
};

use crate::decoder::{DecoderOptions, MessageOverride};
use crate::selector::{select_strategy, ConstructionStrategy};

static MESSAGE_INJECTION_WARNED: AtomicBool = AtomicBool::new(false);

/// One registered error code.
#[derive(Debug, Clone)]
pub struct ErrorDescriptor {
    code: String,
    error_type: ErrorType,
    strategy: ConstructionStrategy,
}

impl ErrorDescriptor {
    /// Wire code the entry is registered under.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Registered type.
    pub fn error_type(&self) -> &ErrorType {
        &self.error_type
    }

    /// Bound constructor used to rebuild the type.
    pub fn strategy(&self) -> &ConstructionStrategy {
        &self.strategy
    }

    /// Build a default instance of the registered type.
    pub fn instantiate(&self) -> Result<Box<dyn ServiceError>, InstantiationError> {
        self.strategy.instantiate()
    }
}

/// Which mapping a lookup matched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Declared on the contract.
    Checked,
    /// Registered through the unchecked-errors hook.
    Unchecked,
}

/// Code → descriptor mappings for one decoder.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    checked: HashMap<String, ErrorDescriptor>,
    unchecked: HashMap<String, ErrorDescriptor>,
}

impl Registry {
    /// Look `code` up in the checked mapping, then in the unchecked one.
    pub fn lookup(&self, code: &str) -> Option<(&ErrorDescriptor, Origin)> {
        self.checked
            .get(code)
            .map(|d| (d, Origin::Checked))
            .or_else(|| self.unchecked.get(code).map(|d| (d, Origin::Unchecked)))
    }

    /// Entries from the contract's declared errors.
    pub fn checked(&self) -> &HashMap<String, ErrorDescriptor> {
        &self.checked
    }

    /// Entries from the unchecked-errors hook.
    pub fn unchecked(&self) -> &HashMap<String, ErrorDescriptor> {
        &self.unchecked
    }

    /// All registered codes, sorted.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .checked
            .keys()
            .chain(self.unchecked.keys())
            .map(String::as_str)
            .collect();
        codes.sort_unstable();
        codes
    }

    /// Total number of registered codes.
    pub fn len(&self) -> usize {
        self.checked.len() + self.unchecked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── Registration ─────────────────────────────────────────────────────────────

struct Registrar<'a> {
    contract: &'a str,
    message_override: MessageOverride,
}

impl Registrar<'_> {
    /// Register a concrete type. `code` overrides the code read from a
    /// default instance.
    fn register(
        &self,
        entries: &mut HashMap<String, ErrorDescriptor>,
        error_type: &ErrorType,
        code: Option<String>,
    ) -> Result<(), ConfigurationError> {
        let Some(strategy) = select_strategy(error_type) else {
            tracing::warn!(
                error_type = %error_type,
                contract = self.contract,
                "couldn't instantiate the error; it needs an empty constructor or one taking \
                 only message and cause arguments"
            );
            return Ok(());
        };

        let mut instance = match strategy.instantiate() {
            Ok(instance) => instance,
            Err(e) => {
                tracing::warn!(
                    error_type = %error_type,
                    contract = self.contract,
                    error = %e,
                    "default instance failed to build, error skipped"
                );
                return Ok(());
            }
        };

        let code = code.unwrap_or_else(|| instance.error_code().to_string());
        if code.is_empty() {
            return Err(ConfigurationError::MissingErrorCode {
                error_type: error_type.path().to_string(),
            });
        }

        match entries.entry(code) {
            Entry::Occupied(existing) => {
                if existing.get().error_type != *error_type {
                    return Err(ConfigurationError::DuplicateErrorCode {
                        code: existing.key().clone(),
                        first: existing.get().error_type.path().to_string(),
                        second: error_type.path().to_string(),
                    });
                }
            }
            Entry::Vacant(slot) => {
                let code = slot.key().clone();
                slot.insert(ErrorDescriptor {
                    code,
                    error_type: error_type.clone(),
                    strategy,
                });
            }
        }

        if self.message_override == MessageOverride::Forbidden
            && instance.as_message_setter().is_none()
            && !MESSAGE_INJECTION_WARNED.swap(true, Ordering::Relaxed)
        {
            tracing::warn!(
                error_type = %error_type,
                "error does not implement MessageSetter and message override is forbidden; \
                 server messages will not be injected. This will be only logged once."
            );
        }

        Ok(())
    }
}

/// Registration handle passed to the unchecked-errors hook.
///
/// Errors registered here are not declared on the contract; they are
/// matched only after the checked mapping misses.
pub struct UncheckedErrors<'a> {
    entries: &'a mut HashMap<String, ErrorDescriptor>,
    registrar: &'a Registrar<'a>,
}

impl UncheckedErrors<'_> {
    /// Register `error_type` under the code of its default instance.
    pub fn register(&mut self, error_type: ErrorType) -> Result<(), ConfigurationError> {
        self.registrar.register(self.entries, &error_type, None)
    }

    /// Register `error_type` under an explicit `code`.
    pub fn insert(
        &mut self,
        code: impl Into<String>,
        error_type: ErrorType,
    ) -> Result<(), ConfigurationError> {
        self.registrar
            .register(self.entries, &error_type, Some(code.into()))
    }

    /// Number of unchecked errors registered so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extension point invoked once after contract scanning.
pub trait UncheckedErrorsHook {
    fn register_additional_unchecked_errors(
        &self,
        errors: &mut UncheckedErrors<'_>,
    ) -> Result<(), ConfigurationError>;
}

impl<F> UncheckedErrorsHook for F
where
    F: Fn(&mut UncheckedErrors<'_>) -> Result<(), ConfigurationError>,
{
    fn register_additional_unchecked_errors(
        &self,
        errors: &mut UncheckedErrors<'_>,
    ) -> Result<(), ConfigurationError> {
        self(errors)
    }
}

/// Builds a [`Registry`] from a contract.
pub struct RegistryBuilder<'a> {
    contract: &'a ApiContract,
    base: &'a ErrorType,
    resolver: &'a dyn HierarchyResolver,
    options: &'a DecoderOptions,
}

impl<'a> RegistryBuilder<'a> {
    /// Builder over `contract`, keeping declared errors derived from `base`.
    pub fn new(
        contract: &'a ApiContract,
        base: &'a ErrorType,
        resolver: &'a dyn HierarchyResolver,
        options: &'a DecoderOptions,
    ) -> Self {
        Self {
            contract,
            base,
            resolver,
            options,
        }
    }

    /// Scan the contract and run `hook`, failing on the first
    /// configuration error.
    pub fn build(
        self,
        hook: Option<&dyn UncheckedErrorsHook>,
    ) -> Result<Registry, ConfigurationError> {
        let registrar = Registrar {
            contract: self.contract.name(),
            message_override: self.options.message_override,
        };
        let mut registry = Registry::default();

        let methods = self
            .contract
            .methods()
            .iter()
            .filter(|m| m.participates(self.options.mapping_rules));

        for method in methods {
            for declared in method.declared_errors() {
                if !declared.is_subtype_of(self.base) {
                    tracing::info!(
                        error_type = %declared,
                        contract = self.contract.name(),
                        base = %self.base,
                        "declared error doesn't derive from the base error type, it will be skipped"
                    );
                    continue;
                }

                if declared.is_abstract() {
                    let subtypes = self.resolver.concrete_subtypes(declared, &self.options.scope);
                    for subtype in subtypes.iter().filter(|t| t.is_concrete()) {
                        registrar.register(&mut registry.checked, subtype, None)?;
                    }
                } else {
                    registrar.register(&mut registry.checked, declared, None)?;
                }
            }
        }

        if let Some(hook) = hook {
            let mut unchecked = UncheckedErrors {
                entries: &mut registry.unchecked,
                registrar: &registrar,
            };
            hook.register_additional_unchecked_errors(&mut unchecked)?;
        }

        tracing::debug!(
            contract = self.contract.name(),
            checked = registry.checked.len(),
            unchecked = registry.unchecked.len(),
            "error registry built"
        );
        Ok(registry)
    }
}

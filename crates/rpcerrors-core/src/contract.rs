//! Description of a client API contract: its methods, the rules that mark
//! them as remote calls, and the error types each one declares.

use serde::{Deserialize, Serialize};

use crate::types::ErrorType;

/// HTTP verb of a mapping rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

/// An annotation attached to a contract method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// A raw request line such as `"GET /search?q={q}"`.
    RequestLine(String),
    /// A verb + path mapping. `verb` is `None` for a catch-all mapping.
    Mapping { verb: Option<HttpVerb>, path: String },
    /// Any other annotation. Never marks a method as a remote call.
    Custom(String),
}

impl Rule {
    /// A request-line rule.
    pub fn request_line(line: impl Into<String>) -> Self {
        Self::RequestLine(line.into())
    }

    /// A verb + path mapping rule.
    pub fn mapping(verb: Option<HttpVerb>, path: impl Into<String>) -> Self {
        Self::Mapping {
            verb,
            path: path.into(),
        }
    }

    /// `true` if this rule marks its method as participating in error
    /// decoding. Mapping rules count only when `mapping_rules` is enabled.
    pub fn participates(&self, mapping_rules: bool) -> bool {
        match self {
            Self::RequestLine(_) => true,
            Self::Mapping { .. } => mapping_rules,
            Self::Custom(_) => false,
        }
    }
}

/// One method of the contract.
#[derive(Debug, Clone)]
pub struct MethodSignature {
    name: String,
    rules: Vec<Rule>,
    throws: Vec<ErrorType>,
}

impl MethodSignature {
    /// A method with no rules and no declared errors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            throws: Vec::new(),
        }
    }

    /// Attach a rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Declare an error type this method may raise.
    pub fn throws(mut self, error_type: ErrorType) -> Self {
        self.throws.push(error_type);
        self
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attached rules, in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Declared error types, in declaration order.
    pub fn declared_errors(&self) -> &[ErrorType] {
        &self.throws
    }

    /// `true` if any rule marks this method as a remote call.
    pub fn participates(&self, mapping_rules: bool) -> bool {
        self.rules.iter().any(|r| r.participates(mapping_rules))
    }
}

/// A client interface: a named set of method signatures.
#[derive(Debug, Clone)]
pub struct ApiContract {
    name: String,
    methods: Vec<MethodSignature>,
}

impl ApiContract {
    /// An empty contract.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Add a method.
    pub fn method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    /// Contract name, used in log messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All methods, participating or not.
    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }
}

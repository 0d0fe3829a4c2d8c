//! Error types for meta-core

use std::path::PathBuf;

use crate::constraint::{ConstraintKind, ConstraintViolation};
use crate::type_id::TypeId;

/// Result type for meta-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while registering, resolving or enforcing metadata types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `(type, subType)` pair was registered twice under strict duplicate detection.
    #[error("type already registered: {type_id} (existing binding: {existing}, new binding: {new})")]
    DuplicateType {
        type_id: TypeId,
        existing: String,
        new: String,
    },

    /// A constraint id was registered twice under strict duplicate detection.
    #[error("constraint already registered: {id}")]
    DuplicateConstraint { id: String },

    /// A required lookup named a type that is not registered.
    #[error("no type registered for {type_id}; available: {available}")]
    UnknownType { type_id: TypeId, available: String },

    /// A type declares a parent that never got registered.
    #[error("type {type_id} inherits from {parent}, which is not registered")]
    UnresolvedParent { type_id: TypeId, parent: TypeId },

    /// No registered type is backed by the named binding.
    #[error("no type registered with binding '{binding}'")]
    UnknownBinding { binding: String },

    /// A parent chain loops back on itself.
    #[error("circular inheritance detected: {chain}")]
    InheritanceCycle { chain: String },

    /// The type definition builder was finished without a type or subtype.
    #[error("incomplete type definition for binding '{binding}': {reason}")]
    IncompleteDefinition { binding: String, reason: String },

    /// A constraint was built with invalid parameters.
    #[error("invalid constraint '{id}': {reason}")]
    InvalidConstraint { id: String, reason: String },

    /// A validation rule was built with bounds or values it cannot check against.
    #[error("invalid {kind} rule: {reason}")]
    InvalidRule { kind: ConstraintKind, reason: String },

    /// A regex pattern did not compile.
    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A textual value could not be coerced into the requested kind.
    #[error("cannot convert '{input}' to {kind}")]
    InvalidValue { kind: String, input: String },

    /// A provider depends on another provider that was never discovered.
    #[error("provider '{provider}' depends on unknown provider '{dependency}'")]
    MissingProviderDependency { provider: String, dependency: String },

    /// A provider depends on another provider that configuration disabled.
    #[error("provider '{provider}' depends on provider '{dependency}', which is disabled by configuration")]
    DisabledProviderDependency { provider: String, dependency: String },

    /// Provider dependencies form a cycle.
    #[error("circular provider dependency among: {}", participants.join(", "))]
    ProviderCycle { participants: Vec<String> },

    /// A services manifest named a provider the catalog cannot build.
    #[error("unknown provider '{id}' in services manifest")]
    UnknownProvider { id: String },

    /// A bootstrap was started while another was running on the same
    /// registry and thread.
    #[error("a provider bootstrap is already running on this registry")]
    NestedBootstrap,

    /// A provider failed while registering its types.
    #[error("failed to load provider '{provider}': {source}")]
    ProviderFailed {
        provider: String,
        #[source]
        source: Box<Error>,
    },

    /// A placement or validation constraint rejected an operation.
    #[error(transparent)]
    Violation(Box<ConstraintViolation>),

    /// Failed to parse a configuration or manifest file.
    #[error("failed to parse {format} at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Configuration file extension is not supported.
    #[error("unsupported configuration format: '{extension}'")]
    UnsupportedFormat { extension: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the constraint violation carried by this error, if any.
    pub fn as_violation(&self) -> Option<&ConstraintViolation> {
        match self {
            Error::Violation(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this error is a constraint violation rather than a registry failure.
    pub fn is_violation(&self) -> bool {
        matches!(self, Error::Violation(_))
    }
}

impl From<ConstraintViolation> for Error {
    fn from(violation: ConstraintViolation) -> Self {
        Error::Violation(Box::new(violation))
    }
}

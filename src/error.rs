//! Shared error types for argument coercion.

use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Errors raised while building a wrapping layer (decoration time).
#[derive(Debug, Error)]
pub enum Error {
    /// A signature parameter has no matching docstring entry
    #[error("could not find docstring entry for {0}")]
    MissingDocEntry(String),

    /// A documented parameter carries no declared type
    #[error("could not find type in docstring entry for {0}")]
    MissingDocType(String),

    /// A declared type resolved, but nothing knows how to convert to it
    #[error("no known converter for {0}")]
    NoConverter(String),

    /// A dotted name resolved to something other than a type
    #[error("{0} does not name a type")]
    NotAType(String),

    /// A signature descriptor failed validation
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Name resolution failures
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors raised while resolving a dotted name against a scope.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("name {0:?} not found in scope or builtins")]
    NameNotFound(String),

    #[error("{owner} has no attribute {attribute:?}")]
    AttributeNotFound { owner: String, attribute: String },
}

/// Errors raised when a wrapped callable is invoked.
#[derive(Debug, Error)]
pub enum CallError {
    /// A converter rejected its input; propagated unchanged
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// A keyword-only parameter with a conversion mapping was not supplied
    #[error("missing keyword argument {0}")]
    MissingKeyword(String),

    /// A positional-only parameter with a conversion mapping was not supplied
    #[error("missing positional argument {0}")]
    MissingPositional(String),

    #[error("variable length keyword arguments not supported")]
    VarKeywordUnsupported,

    /// Failure from the target callable's own body
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised by individual converters.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid truth value {0:?}")]
    InvalidBool(String),

    #[error(transparent)]
    InvalidInt(#[from] ParseIntError),

    #[error(transparent)]
    InvalidFloat(#[from] ParseFloatError),

    #[error("invalid {kind} value {value:?}; valid choices are: {choices}")]
    InvalidChoice {
        kind: String,
        value: String,
        choices: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Message(String),
}

/// Result type alias for decoration-time operations.
pub type Result<T> = std::result::Result<T, Error>;

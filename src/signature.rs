//! Explicit call-signature descriptors.
//!
//! There is no runtime reflection to lean on, so the wrapping layer works
//! from a descriptor the caller builds: an ordered list of parameters,
//! each tagged with its calling-convention kind and an optional default
//! value.

use crate::error::{Error, Result};
use crate::value::Value;
use std::collections::HashSet;

/// Calling-convention category of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

impl ParamKind {
    /// Declaration-order rank; a valid signature lists kinds in
    /// non-decreasing rank.
    fn rank(self) -> u8 {
        match self {
            ParamKind::PositionalOnly => 0,
            ParamKind::PositionalOrKeyword => 1,
            ParamKind::VarPositional => 2,
            ParamKind::KeywordOnly => 3,
            ParamKind::VarKeyword => 4,
        }
    }
}

/// One parameter of a signature.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    default: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, kind: ParamKind, default: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            default: Some(default),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// The stored default object, if the parameter has one. Clones of the
    /// returned value are identical to it under [`Value::ptr_eq`].
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Ordered, validated parameter list for a callable.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: Vec<Parameter>,
}

impl Signature {
    pub fn builder() -> SignatureBuilder {
        SignatureBuilder {
            params: Vec::new(),
            misuse: None,
        }
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name() == name)
    }
}

/// Builds a [`Signature`], validating name uniqueness and kind ordering.
pub struct SignatureBuilder {
    params: Vec<Parameter>,
    misuse: Option<String>,
}

impl SignatureBuilder {
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn positional_only(self, name: &str) -> Self {
        self.param(Parameter::new(name, ParamKind::PositionalOnly))
    }

    pub fn positional(self, name: &str) -> Self {
        self.param(Parameter::new(name, ParamKind::PositionalOrKeyword))
    }

    pub fn keyword_only(self, name: &str) -> Self {
        self.param(Parameter::new(name, ParamKind::KeywordOnly))
    }

    pub fn var_positional(self, name: &str) -> Self {
        self.param(Parameter::new(name, ParamKind::VarPositional))
    }

    pub fn var_keyword(self, name: &str) -> Self {
        self.param(Parameter::new(name, ParamKind::VarKeyword))
    }

    /// Attach a default value to the most recently added parameter.
    pub fn default(mut self, value: Value) -> Self {
        match self.params.last_mut() {
            Some(param) => param.default = Some(value),
            None => self.misuse = Some("default() called before any parameter".to_string()),
        }
        self
    }

    pub fn build(self) -> Result<Signature> {
        if let Some(misuse) = self.misuse {
            return Err(Error::InvalidSignature(misuse));
        }
        let mut seen = HashSet::new();
        let mut last_rank = 0u8;
        for param in &self.params {
            if !seen.insert(param.name().to_string()) {
                return Err(Error::InvalidSignature(format!(
                    "duplicate parameter {}",
                    param.name()
                )));
            }
            let rank = param.kind().rank();
            if rank < last_rank {
                return Err(Error::InvalidSignature(format!(
                    "parameter {} appears after a later-binding kind",
                    param.name()
                )));
            }
            last_rank = rank;
        }
        for kind in [ParamKind::VarPositional, ParamKind::VarKeyword] {
            if self.params.iter().filter(|p| p.kind() == kind).count() > 1 {
                return Err(Error::InvalidSignature(format!(
                    "more than one {:?} parameter",
                    kind
                )));
            }
        }
        Ok(Signature {
            params: self.params,
        })
    }
}

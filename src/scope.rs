//! Dotted-name resolution against an explicit scope.
//!
//! The original shape of this feature walked call-stack frames to find the
//! names visible where the decorator was applied. There is no portable
//! equivalent of that, and no good reason to want one: instead the caller
//! hands over a [`Scope`], an explicit registry of the names a doc-declared
//! type string may mention. Resolution consults the scope first and a
//! built-in table (`str`, `int`, `float`, `bool`, `list`) second; later
//! segments of a dotted path are attribute lookups on namespaces.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::ResolveError;
use crate::registry::Converter;
use crate::value::{FromArgStr, TypeRef, Value};

/// A type bound into a scope, optionally carrying its
/// convertible-from-string hook.
#[derive(Clone)]
pub struct TypeBinding {
    type_ref: TypeRef,
    from_str: Option<Converter>,
}

impl std::fmt::Debug for TypeBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeBinding")
            .field("type_ref", &self.type_ref)
            .field("from_str", &self.from_str.as_ref().map(|_| ".."))
            .finish()
    }
}

impl TypeBinding {
    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    /// The conversion hook attached at binding time, if the type has one.
    pub fn from_str(&self) -> Option<&Converter> {
        self.from_str.as_ref()
    }
}

/// A named group of attribute bindings, standing in for a module or a
/// holder of class-level attributes.
#[derive(Clone, Default, Debug)]
pub struct Namespace {
    attrs: HashMap<String, Binding>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, binding: Binding) {
        self.attrs.insert(name.into(), binding);
    }

    pub fn with(mut self, name: impl Into<String>, binding: Binding) -> Self {
        self.set(name, binding);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.attrs.get(name)
    }
}

/// What a name resolves to.
#[derive(Clone, Debug)]
pub enum Binding {
    /// A plain value, e.g. a constant the caller exposed by name.
    Value(Value),
    /// A type, usable as a converter-registry key.
    Type(TypeBinding),
    /// A namespace whose attributes are further bindings.
    Namespace(Namespace),
}

impl Binding {
    pub fn value(v: Value) -> Self {
        Binding::Value(v)
    }

    /// Bind a type with no from-string capability.
    pub fn of_type<T: 'static>() -> Self {
        Binding::Type(TypeBinding {
            type_ref: TypeRef::of::<T>(),
            from_str: None,
        })
    }

    /// Bind a type whose [`FromArgStr`] impl serves as the fallback
    /// converter when the registry has no entry for it.
    pub fn parsable<T: FromArgStr>() -> Self {
        Binding::Type(TypeBinding {
            type_ref: TypeRef::of::<T>(),
            from_str: Some(Arc::new(|s| T::from_arg_str(s).map(Value::custom))),
        })
    }

    pub fn namespace(ns: Namespace) -> Self {
        Binding::Namespace(ns)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Binding::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeBinding> {
        match self {
            Binding::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Binding::Namespace(ns) => Some(ns),
            _ => None,
        }
    }
}

/// Named bindings visible to the resolver, consulted before the built-ins.
#[derive(Clone, Default)]
pub struct Scope {
    names: HashMap<String, Binding>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) {
        self.names.insert(name.into(), binding);
    }

    pub fn bind_value(&mut self, name: impl Into<String>, value: Value) {
        self.bind(name, Binding::value(value));
    }

    pub fn bind_type<T: 'static>(&mut self, name: impl Into<String>) {
        self.bind(name, Binding::of_type::<T>());
    }

    pub fn bind_parsable<T: FromArgStr>(&mut self, name: impl Into<String>) {
        self.bind(name, Binding::parsable::<T>());
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.names.get(name)
    }
}

static BUILTINS: Lazy<Scope> = Lazy::new(|| {
    let mut scope = Scope::new();
    scope.bind_type::<String>("str");
    scope.bind_type::<i64>("int");
    scope.bind_type::<f64>("float");
    scope.bind_type::<bool>("bool");
    scope.bind_type::<Vec<Value>>("list");
    scope
});

/// Find a binding by dotted name.
///
/// With no scope, the first segment is looked up among the built-in names
/// only. With a scope, its entries take priority over the built-ins.
/// Subsequent segments are attribute lookups on the previously resolved
/// binding.
pub fn resolve(name: &str, scope: Option<&Scope>) -> Result<Binding, ResolveError> {
    log::debug!("resolving {:?}", name);
    let mut segments = name.split('.');
    let first = segments.next().unwrap_or("");
    let mut current = scope
        .and_then(|s| s.get(first))
        .or_else(|| BUILTINS.get(first))
        .cloned()
        .ok_or_else(|| ResolveError::NameNotFound(first.to_string()))?;
    let mut path = first.to_string();
    for segment in segments {
        let next = match &current {
            Binding::Namespace(ns) => ns.get(segment).cloned(),
            _ => None,
        };
        current = next.ok_or_else(|| ResolveError::AttributeNotFound {
            owner: path.clone(),
            attribute: segment.to_string(),
        })?;
        path.push('.');
        path.push_str(segment);
    }
    Ok(current)
}

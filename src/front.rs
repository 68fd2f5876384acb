//! Entry points that build wrapping layers.
//!
//! [`Convert`] takes explicit per-parameter converters and can infer the
//! rest from default values. [`Doctyped`] derives everything from the
//! `:param:`/`:type:` fields of the target's doc text, resolving declared
//! type names against a caller-supplied [`Scope`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::docparse::parse_doc;
use crate::error::{Error, Result};
use crate::registry::{Converter, Registry};
use crate::scope::{resolve, Scope};
use crate::wrapper::{build_wrapper, unwrap_target, Callable};

/// Explicit-mapping entry point.
///
/// Parameters named in the mapping are converted with the supplied
/// converter. With `automatic` set, every remaining parameter that has a
/// default value whose type the registry knows gets a converter inferred
/// from that default.
pub struct Convert {
    mappings: HashMap<String, Converter>,
    automatic: bool,
    registry: Registry,
}

impl Convert {
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
            automatic: false,
            registry: Registry::default(),
        }
    }

    /// Map a parameter name to a converter.
    pub fn with(mut self, name: impl Into<String>, converter: Converter) -> Self {
        self.mappings.insert(name.into(), converter);
        self
    }

    /// Infer converters for unmapped parameters from their defaults.
    pub fn automatic(mut self, automatic: bool) -> Self {
        self.automatic = automatic;
        self
    }

    /// Replace the registry used for automatic inference.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Build the wrapping layer around `func`.
    pub fn apply(&self, func: Arc<dyn Callable>) -> Result<Arc<dyn Callable>> {
        let signature = unwrap_target(&func).signature().clone();
        let mut mappings = self.mappings.clone();
        if self.automatic {
            for param in signature.params() {
                if mappings.contains_key(param.name()) {
                    continue;
                }
                let Some(default) = param.default() else {
                    continue;
                };
                if let Some(converter) = self
                    .registry
                    .converter_for(&default.type_ref(), Some(default))
                {
                    mappings.insert(param.name().to_string(), converter);
                }
            }
        }
        Ok(build_wrapper(func, signature, mappings))
    }
}

impl Default for Convert {
    fn default() -> Self {
        Self::new()
    }
}

/// Docstring-driven entry point.
///
/// Every signature parameter must have a documented entry with a declared
/// type. Declared type names (and override names given to [`parser`])
/// resolve through the configured [`Scope`]; converters come from the
/// registry, or from the resolved type's from-string capability, in that
/// order.
///
/// [`parser`]: Doctyped::parser
pub struct Doctyped {
    overrides: Vec<(String, Converter)>,
    scope: Option<Scope>,
    registry: Registry,
}

impl Doctyped {
    pub fn new() -> Self {
        Self {
            overrides: Vec::new(),
            scope: None,
            registry: Registry::default(),
        }
    }

    /// Names declared in doc text resolve against this scope (before the
    /// built-ins). Without one, only built-in type names resolve.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Supply a converter for a type the registry cannot handle, keyed by
    /// the (possibly dotted) name under which doc text declares it.
    pub fn parser(mut self, type_name: impl Into<String>, converter: Converter) -> Self {
        self.overrides.push((type_name.into(), converter));
        self
    }

    /// Replace the base registry the overrides are merged into.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Build the wrapping layer around `func`.
    pub fn apply(&self, func: Arc<dyn Callable>) -> Result<Arc<dyn Callable>> {
        let scope = self.scope.as_ref();

        // Overrides land in a local copy; the base registry stays as-is.
        let mut registry = self.registry.clone();
        for (name, converter) in &self.overrides {
            let binding = resolve(name, scope)?;
            let ty = binding
                .as_type()
                .ok_or_else(|| Error::NotAType(name.clone()))?;
            registry.insert_converter(ty.type_ref(), converter.clone());
        }

        let signature = unwrap_target(&func).signature().clone();
        let doc = parse_doc(func.as_ref());
        for param in signature.params() {
            if !doc.params.contains_key(param.name()) {
                return Err(Error::MissingDocEntry(param.name().to_string()));
            }
        }

        let mut mappings = HashMap::new();
        for (name, entry) in &doc.params {
            let type_name = entry
                .ty
                .as_deref()
                .ok_or_else(|| Error::MissingDocType(name.clone()))?;
            let binding = resolve(type_name, scope)?;
            let ty = binding
                .as_type()
                .ok_or_else(|| Error::NotAType(type_name.to_string()))?;
            let note = format!("{} [{}]", entry.text.as_deref().unwrap_or(""), type_name);
            func.annotate(name, &note);
            let converter = registry
                .converter_for(&ty.type_ref(), None)
                .or_else(|| ty.from_str().cloned())
                .ok_or_else(|| Error::NoConverter(type_name.to_string()))?;
            mappings.insert(name.clone(), converter);
        }
        Ok(build_wrapper(func, signature, mappings))
    }
}

impl Default for Doctyped {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Signature;
    use crate::value::Value;
    use crate::wrapper::{Args, FnTarget};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn echo(signature: Signature) -> Arc<dyn Callable> {
        Arc::new(FnTarget::new(signature, |args| {
            Ok(Value::list(args.positional))
        }))
    }

    #[test]
    fn automatic_inference_uses_default_types() {
        let sig = Signature::builder()
            .positional("count")
            .default(Value::int(1))
            .positional("ratio")
            .default(Value::float(0.5))
            .build()
            .unwrap();

        let wrapped = Convert::new().automatic(true).apply(echo(sig)).unwrap();
        let result = wrapped
            .call(
                Args::new()
                    .positional(Value::str("3"))
                    .positional(Value::str("2.5")),
            )
            .unwrap();
        assert_eq!(result, Value::list(vec![Value::int(3), Value::float(2.5)]));
    }

    #[test]
    fn automatic_inference_skips_unknown_default_types() {
        struct Opaque;
        let sig = Signature::builder()
            .positional("thing")
            .default(Value::custom(Opaque))
            .build()
            .unwrap();

        let wrapped = Convert::new().automatic(true).apply(echo(sig)).unwrap();
        // No converter inferred: the string passes through untouched.
        let result = wrapped
            .call(Args::new().positional(Value::str("raw")))
            .unwrap();
        assert_eq!(result, Value::list(vec![Value::str("raw")]));
    }

    #[test]
    fn explicit_mappings_win_over_inference() {
        let sig = Signature::builder()
            .positional("count")
            .default(Value::int(1))
            .build()
            .unwrap();

        let wrapped = Convert::new()
            .automatic(true)
            .with(
                "count",
                crate::registry::converter(|s| Ok(Value::str(s.to_uppercase()))),
            )
            .apply(echo(sig))
            .unwrap();
        let result = wrapped
            .call(Args::new().positional(Value::str("three")))
            .unwrap();
        assert_eq!(result, Value::list(vec![Value::str("THREE")]));
    }

    #[test]
    fn doctyped_requires_an_entry_for_every_parameter() {
        let sig = Signature::builder().positional("x").build().unwrap();
        let target = Arc::new(FnTarget::new(sig, |args| Ok(Value::list(args.positional))).doc(
            indoc! {"
                Does something.

                :param y: documented under the wrong name
                :type y: int
            "},
        ));

        let err = Doctyped::new().apply(target).unwrap_err();
        assert!(matches!(err, Error::MissingDocEntry(name) if name == "x"));
    }

    #[test]
    fn doctyped_requires_a_declared_type() {
        let sig = Signature::builder().positional("x").build().unwrap();
        let target = Arc::new(
            FnTarget::new(sig, |args| Ok(Value::list(args.positional)))
                .doc(":param x: documented but untyped\n"),
        );

        let err = Doctyped::new().apply(target).unwrap_err();
        assert!(matches!(err, Error::MissingDocType(name) if name == "x"));
    }

    #[test]
    fn doctyped_fails_without_a_known_converter() {
        struct Bare;

        let mut scope = Scope::new();
        scope.bind_type::<Bare>("Bare");

        let sig = Signature::builder().positional("x").build().unwrap();
        let target = Arc::new(
            FnTarget::new(sig, |args| Ok(Value::list(args.positional)))
                .doc(":param x: something\n:type x: Bare\n"),
        );

        let err = Doctyped::new().scope(scope).apply(target).unwrap_err();
        assert!(matches!(err, Error::NoConverter(name) if name == "Bare"));
    }

    #[test]
    fn doctyped_converts_builtin_declared_types() {
        let sig = Signature::builder()
            .positional("count")
            .positional("ratio")
            .build()
            .unwrap();
        let target = echo_with_doc(
            sig,
            indoc! {"
                :param count: how many
                :type count: int
                :param ratio: how much
                :type ratio: float
            "},
        );

        let wrapped = Doctyped::new().apply(target).unwrap();
        let result = wrapped
            .call(
                Args::new()
                    .positional(Value::str("4"))
                    .positional(Value::str("0.25")),
            )
            .unwrap();
        assert_eq!(result, Value::list(vec![Value::int(4), Value::float(0.25)]));
    }

    fn echo_with_doc(signature: Signature, doc: &str) -> Arc<dyn Callable> {
        Arc::new(
            FnTarget::new(signature, |args| Ok(Value::list(args.positional))).doc(doc),
        )
    }
}

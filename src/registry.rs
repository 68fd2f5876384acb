//! Registry mapping runtime types to converter factories.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConvertError;
use crate::utils;
use crate::value::{FileHandle, OpenMode, TypeRef, Value};

/// A unary conversion function: command-line token in, typed value out.
pub type Converter = Arc<dyn Fn(&str) -> std::result::Result<Value, ConvertError> + Send + Sync>;

/// Produces a [`Converter`], optionally tuned by a sample value (typically
/// the parameter's default, so e.g. the file converter can mirror the
/// sample handle's open mode).
pub type Factory = Arc<dyn Fn(Option<&Value>) -> Converter + Send + Sync>;

/// Wrap a plain conversion closure as a shareable [`Converter`].
pub fn converter(
    f: impl Fn(&str) -> std::result::Result<Value, ConvertError> + Send + Sync + 'static,
) -> Converter {
    Arc::new(f)
}

/// Maps a [`TypeRef`] to the factory that builds converters for it.
///
/// `Registry::default()` yields the process-wide table. It is never
/// mutated in place after that: per-decoration overrides go into a local
/// clone.
#[derive(Clone)]
pub struct Registry {
    entries: HashMap<TypeRef, Factory>,
}

impl Registry {
    /// An empty registry with no known types.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, ty: TypeRef, factory: Factory) {
        self.entries.insert(ty, factory);
    }

    /// Register a fixed converter for a type, ignoring any sample value.
    pub fn insert_converter(&mut self, ty: TypeRef, converter: Converter) {
        self.insert(ty, Arc::new(move |_| converter.clone()));
    }

    pub fn get(&self, ty: &TypeRef) -> Option<&Factory> {
        self.entries.get(ty)
    }

    /// Build a converter for `ty`, handing the factory an optional sample.
    pub fn converter_for(&self, ty: &TypeRef, sample: Option<&Value>) -> Option<Converter> {
        self.entries.get(ty).map(|factory| factory(sample))
    }
}

impl Default for Registry {
    /// The built-in table: text, integer, float, boolean, delimited list,
    /// and file handles opened with the sample's mode.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.insert(
            TypeRef::of::<String>(),
            Arc::new(|_| converter(|s| Ok(Value::str(s)))),
        );
        registry.insert(
            TypeRef::of::<i64>(),
            Arc::new(|_| converter(|s| utils::toint(s).map(Value::int))),
        );
        registry.insert(
            TypeRef::of::<f64>(),
            Arc::new(|_| converter(|s| utils::tofloat(s).map(Value::float))),
        );
        registry.insert(
            TypeRef::of::<bool>(),
            Arc::new(|_| converter(|s| utils::tobool(s).map(Value::bool))),
        );
        registry.insert(TypeRef::of::<Vec<Value>>(), Arc::new(|_| utils::tolist()));
        registry.insert(
            TypeRef::of::<FileHandle>(),
            Arc::new(|sample: Option<&Value>| {
                let mode = sample
                    .and_then(Value::as_file)
                    .map(FileHandle::mode)
                    .unwrap_or(OpenMode::Read);
                utils::tofile(mode)
            }),
        );
        registry
    }
}

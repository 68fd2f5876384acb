//! The wrapping layer: callables, targets, and call-time coercion.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::CallError;
use crate::registry::Converter;
use crate::signature::{ParamKind, Signature};
use crate::value::Value;

/// Arguments for one invocation, already split into positional and keyword
/// form by the dispatch layer.
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub positional: Vec<Value>,
    pub keyword: HashMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(mut self, value: Value) -> Self {
        self.positional.push(value);
        self
    }

    pub fn keyword(mut self, name: impl Into<String>, value: Value) -> Self {
        self.keyword.insert(name.into(), value);
        self
    }
}

/// Anything the wrapping layer can decorate and invoke.
pub trait Callable: Send + Sync {
    /// The explicit signature descriptor for this callable.
    fn signature(&self) -> &Signature;

    fn call(&self, args: Args) -> Result<Value, CallError>;

    /// Doc text attached to the callable, if any.
    fn doc(&self) -> Option<&str> {
        None
    }

    /// The callable this one wraps, when this is a wrapping layer.
    fn inner(&self) -> Option<&Arc<dyn Callable>> {
        None
    }

    /// Record a human-readable note for a parameter. Returns `false` when
    /// the callable does not support annotations; callers treat this as
    /// best-effort.
    fn annotate(&self, _name: &str, _note: &str) -> bool {
        false
    }
}

impl std::fmt::Debug for dyn Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callable")
            .field("signature", self.signature())
            .finish_non_exhaustive()
    }
}

/// Follow `inner()` references down to the undecorated callable.
pub fn unwrap_target(func: &Arc<dyn Callable>) -> &Arc<dyn Callable> {
    let mut target = func;
    while let Some(inner) = target.inner() {
        target = inner;
    }
    target
}

type Body = Box<dyn Fn(Args) -> Result<Value, CallError> + Send + Sync>;

/// A closure-backed target callable with a signature, optional doc text,
/// and an annotation map.
pub struct FnTarget {
    signature: Signature,
    doc: Option<String>,
    annotations: Mutex<HashMap<String, String>>,
    body: Body,
}

impl FnTarget {
    pub fn new(
        signature: Signature,
        body: impl Fn(Args) -> Result<Value, CallError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature,
            doc: None,
            annotations: Mutex::new(HashMap::new()),
            body: Box::new(body),
        }
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    /// Snapshot of the recorded parameter annotations.
    pub fn annotations(&self) -> HashMap<String, String> {
        self.annotations.lock().clone()
    }
}

impl Callable for FnTarget {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, args: Args) -> Result<Value, CallError> {
        (self.body)(args)
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn annotate(&self, name: &str, note: &str) -> bool {
        self.annotations
            .lock()
            .insert(name.to_string(), note.to_string());
        true
    }
}

/// One decoration layer: converts string arguments per its mapping, then
/// delegates to the callable it wraps.
pub struct Wrapped {
    inner: Arc<dyn Callable>,
    signature: Signature,
    mappings: HashMap<String, Converter>,
}

/// Wrap `func` so that calls are coerced through `mappings` according to
/// `signature` before `func` runs.
///
/// `signature` is the *true* signature (the innermost callable's), even
/// when `func` is itself a wrapping layer.
pub fn build_wrapper(
    func: Arc<dyn Callable>,
    signature: Signature,
    mappings: HashMap<String, Converter>,
) -> Arc<dyn Callable> {
    Arc::new(Wrapped {
        inner: func,
        signature,
        mappings,
    })
}

/// Apply a converter when the value is a string; anything already typed
/// (including a retained default object) passes through unchanged.
fn convert(converter: &Converter, value: &Value) -> Result<Value, CallError> {
    match value.as_str() {
        Some(s) => Ok(converter(s)?),
        None => Ok(value.clone()),
    }
}

impl Wrapped {
    fn coerce(&self, args: Args) -> Result<Args, CallError> {
        let Args {
            mut positional,
            mut keyword,
        } = args;
        for (pos, param) in self.signature.params().iter().enumerate() {
            if param.kind() == ParamKind::VarKeyword {
                return Err(CallError::VarKeywordUnsupported);
            }
            let Some(converter) = self.mappings.get(param.name()) else {
                continue;
            };
            // A value identical to the stored default means the default is
            // in use; conversion only applies to values actually different
            // from the default object.
            let differs = |value: &Value| param.default().is_none_or(|d| !d.ptr_eq(value));
            match param.kind() {
                ParamKind::PositionalOnly => {
                    let value = positional
                        .get(pos)
                        .cloned()
                        .ok_or_else(|| CallError::MissingPositional(param.name().to_string()))?;
                    positional[pos] = convert(converter, &value)?;
                }
                ParamKind::PositionalOrKeyword => {
                    if let Some(value) = keyword.get(param.name()) {
                        if differs(value) {
                            let converted = convert(converter, value)?;
                            keyword.insert(param.name().to_string(), converted);
                        }
                    } else if pos < positional.len() {
                        let value = positional[pos].clone();
                        if differs(&value) {
                            positional[pos] = convert(converter, &value)?;
                        }
                    }
                }
                ParamKind::KeywordOnly => {
                    let value = keyword
                        .get(param.name())
                        .ok_or_else(|| CallError::MissingKeyword(param.name().to_string()))?;
                    if differs(value) {
                        let converted = convert(converter, value)?;
                        keyword.insert(param.name().to_string(), converted);
                    }
                }
                ParamKind::VarPositional => {
                    for slot in positional.iter_mut().skip(pos) {
                        let value = slot.clone();
                        *slot = convert(converter, &value)?;
                    }
                }
                ParamKind::VarKeyword => unreachable!("rejected above"),
            }
        }
        Ok(Args {
            positional,
            keyword,
        })
    }
}

impl Callable for Wrapped {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, args: Args) -> Result<Value, CallError> {
        let coerced = self.coerce(args)?;
        self.inner.call(coerced)
    }

    fn doc(&self) -> Option<&str> {
        self.inner.doc()
    }

    fn inner(&self) -> Option<&Arc<dyn Callable>> {
        Some(&self.inner)
    }

    fn annotate(&self, name: &str, note: &str) -> bool {
        self.inner.annotate(name, note)
    }
}

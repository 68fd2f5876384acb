//! Dynamic argument values.
//!
//! Arguments cross the wrapping layer as [`Value`]s: strings straight from
//! the command line, typed results of a conversion, or default objects
//! retained from the signature. A `Value` is a shared allocation, so the
//! "was the stored default passed back to us?" test the coercion rules
//! depend on is a genuine identity check ([`Value::ptr_eq`]), not a
//! structural comparison.

use std::any::{Any, TypeId};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::ConvertError;

/// Identifies a runtime type: the registry key and the name used in
/// diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
}

impl TypeRef {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_name(std::any::type_name::<T>()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.name)
    }
}

/// Strip the module path from a `type_name` rendering, keeping any
/// generic arguments intact.
fn short_name(full: &'static str) -> &'static str {
    let head_end = full.find('<').unwrap_or(full.len());
    match full[..head_end].rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

/// Types that can reconstruct themselves from a command-line token.
///
/// This is the explicit rendition of "the type has a conversion-from-string
/// method": binding a type into a [`Scope`](crate::scope::Scope) with
/// [`bind_parsable`](crate::scope::Scope::bind_parsable) attaches this
/// implementation as the fallback converter when the registry has no entry
/// for the type.
pub trait FromArgStr: Sized + Send + Sync + 'static {
    fn from_arg_str(s: &str) -> std::result::Result<Self, ConvertError>;
}

/// How a [`FileHandle`] was (and will be) opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    Append,
}

/// An open file carried as an argument value.
///
/// Remembers its open mode so a converter can mirror the mode of a default
/// handle when opening the path actually supplied on the command line.
#[derive(Clone)]
pub struct FileHandle {
    path: PathBuf,
    mode: OpenMode,
    file: Arc<Mutex<File>>,
}

impl FileHandle {
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match mode {
            OpenMode::Read => File::open(&path)?,
            OpenMode::Write => File::create(&path)?,
            OpenMode::Append => OpenOptions::new().append(true).create(true).open(&path)?,
        };
        Ok(Self {
            path,
            mode,
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn file(&self) -> &Arc<Mutex<File>> {
        &self.file
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .finish()
    }
}

struct CustomValue {
    type_ref: TypeRef,
    data: Box<dyn Any + Send + Sync>,
}

enum ValueKind {
    None,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    File(FileHandle),
    Custom(CustomValue),
}

/// A dynamically typed argument value with identity semantics.
///
/// Cloning a `Value` clones the handle, not the contents: a clone of a
/// stored default is *identical* to it under [`Value::ptr_eq`], which is
/// what lets the wrapper tell "the default is in use" apart from "the
/// caller passed a fresh value".
#[derive(Clone)]
pub struct Value(Arc<ValueKind>);

impl Value {
    pub fn none() -> Self {
        Value(Arc::new(ValueKind::None))
    }

    pub fn str(s: impl Into<String>) -> Self {
        Value(Arc::new(ValueKind::Str(s.into())))
    }

    pub fn int(i: i64) -> Self {
        Value(Arc::new(ValueKind::Int(i)))
    }

    pub fn float(f: f64) -> Self {
        Value(Arc::new(ValueKind::Float(f)))
    }

    pub fn bool(b: bool) -> Self {
        Value(Arc::new(ValueKind::Bool(b)))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value(Arc::new(ValueKind::List(items)))
    }

    pub fn file(handle: FileHandle) -> Self {
        Value(Arc::new(ValueKind::File(handle)))
    }

    /// Wrap an arbitrary caller-defined object.
    pub fn custom<T: Any + Send + Sync>(v: T) -> Self {
        Value(Arc::new(ValueKind::Custom(CustomValue {
            type_ref: TypeRef::of::<T>(),
            data: Box::new(v),
        })))
    }

    /// Identity comparison: do both handles share one allocation?
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The [`TypeRef`] under which this value's type is registered.
    pub fn type_ref(&self) -> TypeRef {
        match &*self.0 {
            ValueKind::None => TypeRef::of::<()>(),
            ValueKind::Str(_) => TypeRef::of::<String>(),
            ValueKind::Int(_) => TypeRef::of::<i64>(),
            ValueKind::Float(_) => TypeRef::of::<f64>(),
            ValueKind::Bool(_) => TypeRef::of::<bool>(),
            ValueKind::List(_) => TypeRef::of::<Vec<Value>>(),
            ValueKind::File(_) => TypeRef::of::<FileHandle>(),
            ValueKind::Custom(c) => c.type_ref,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(&*self.0, ValueKind::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match &*self.0 {
            ValueKind::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match &*self.0 {
            ValueKind::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match &*self.0 {
            ValueKind::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &*self.0 {
            ValueKind::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match &*self.0 {
            ValueKind::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileHandle> {
        match &*self.0 {
            ValueKind::File(handle) => Some(handle),
            _ => None,
        }
    }

    /// Borrow a wrapped custom object, if this value holds a `T`.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        match &*self.0 {
            ValueKind::Custom(c) => c.data.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&*self.0, &*other.0) {
            (ValueKind::None, ValueKind::None) => true,
            (ValueKind::Str(a), ValueKind::Str(b)) => a == b,
            (ValueKind::Int(a), ValueKind::Int(b)) => a == b,
            (ValueKind::Float(a), ValueKind::Float(b)) => a == b,
            (ValueKind::Bool(a), ValueKind::Bool(b)) => a == b,
            (ValueKind::List(a), ValueKind::List(b)) => a == b,
            (ValueKind::File(a), ValueKind::File(b)) => {
                a.path() == b.path() && a.mode() == b.mode()
            }
            // Custom values have no structural equality; fall back to identity.
            (ValueKind::Custom(a), ValueKind::Custom(b)) => std::ptr::addr_eq(
                &*a.data as *const (dyn Any + Send + Sync),
                &*b.data as *const (dyn Any + Send + Sync),
            ),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::None => write!(f, "None"),
            ValueKind::Str(s) => write!(f, "Str({:?})", s),
            ValueKind::Int(i) => write!(f, "Int({})", i),
            ValueKind::Float(v) => write!(f, "Float({})", v),
            ValueKind::Bool(b) => write!(f, "Bool({})", b),
            ValueKind::List(items) => f.debug_tuple("List").field(items).finish(),
            ValueKind::File(handle) => handle.fmt(f),
            ValueKind::Custom(c) => write!(f, "Custom({})", c.type_ref.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clone_preserves_identity() {
        let default = Value::str("8080");
        let same = default.clone();
        let fresh = Value::str("8080");

        assert!(default.ptr_eq(&same));
        assert!(!default.ptr_eq(&fresh));
        // Structural equality still holds for the fresh copy.
        assert_eq!(default, fresh);
    }

    #[test]
    fn custom_values_downcast() {
        struct Marker(u32);

        let value = Value::custom(Marker(7));
        assert_eq!(value.downcast_ref::<Marker>().map(|m| m.0), Some(7));
        assert!(value.downcast_ref::<String>().is_none());
        assert_eq!(value.type_ref(), TypeRef::of::<Marker>());
    }

    #[test]
    fn type_refs_distinguish_types() {
        assert_eq!(Value::str("a").type_ref(), TypeRef::of::<String>());
        assert_ne!(TypeRef::of::<i64>(), TypeRef::of::<f64>());
        assert_eq!(TypeRef::of::<String>().name(), "String");
    }
}

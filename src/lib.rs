// Export modules for library usage
pub mod docparse;
pub mod doctree;
pub mod error;
pub mod front;
pub mod registry;
pub mod scope;
pub mod signature;
pub mod utils;
pub mod value;
pub mod wrapper;

// Re-export commonly used types
pub use crate::docparse::{parse_doc, parse_text, DocRecord, ParamEntry};
pub use crate::error::{CallError, ConvertError, Error, ResolveError, Result};
pub use crate::front::{Convert, Doctyped};
pub use crate::registry::{converter, Converter, Factory, Registry};
pub use crate::scope::{resolve, Binding, Namespace, Scope, TypeBinding};
pub use crate::signature::{ParamKind, Parameter, Signature, SignatureBuilder};
pub use crate::value::{FileHandle, FromArgStr, OpenMode, TypeRef, Value};
pub use crate::wrapper::{build_wrapper, unwrap_target, Args, Callable, FnTarget, Wrapped};

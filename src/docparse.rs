//! Extracts structured parameter metadata from doc text.

use std::collections::HashMap;

use crate::doctree::{self, Node};
use crate::wrapper::Callable;

/// Metadata recorded for one documented parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamEntry {
    /// Body of the `:param name:` field, if present.
    pub text: Option<String>,
    /// Body of the `:type name:` field, if present.
    pub ty: Option<String>,
}

/// Everything extracted from a callable's doc text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocRecord {
    /// All top-level paragraphs, joined by a blank line.
    pub text: Option<String>,
    pub params: HashMap<String, ParamEntry>,
}

/// Parse the doc text attached to a callable. A callable without doc text
/// yields an empty record.
pub fn parse_doc(func: &dyn Callable) -> DocRecord {
    match func.doc() {
        Some(doc) => parse_text(doc),
        None => DocRecord::default(),
    }
}

/// Parse doc text directly.
///
/// Field labels must split on whitespace into exactly two tokens, a
/// doc-kind (`param`, `type`, ...) and a parameter name; anything else is
/// skipped with a debug log. Entries for one name are merged across
/// doc-kinds: `text` from `param`, `ty` from `type`.
pub fn parse_text(doc: &str) -> DocRecord {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut by_name: HashMap<String, HashMap<String, String>> = HashMap::new();

    for node in doctree::parse(doc) {
        match node {
            Node::Paragraph(text) => paragraphs.push(text),
            Node::FieldList(fields) => {
                for field in fields {
                    let tokens: Vec<&str> = field.label.split_whitespace().collect();
                    let [doc_kind, name] = tokens.as_slice() else {
                        log::debug!("ignoring field {:?}", field.label);
                        continue;
                    };
                    log::debug!("{} {}: {}", doc_kind, name, field.body);
                    by_name
                        .entry(name.to_string())
                        .or_default()
                        .insert(doc_kind.to_string(), field.body);
                }
            }
        }
    }

    let text = if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n\n"))
    };
    let params = by_name
        .into_iter()
        .map(|(name, kinds)| {
            let entry = ParamEntry {
                text: kinds.get("param").cloned(),
                ty: kinds.get("type").cloned(),
            };
            (name, entry)
        })
        .collect();
    DocRecord { text, params }
}

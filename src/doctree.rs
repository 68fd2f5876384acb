//! Minimal paragraph/field-list tree for doc text.
//!
//! The extractor in [`crate::docparse`] consumes only these node shapes;
//! everything else a richer markup dialect might produce is out of scope.
//! Field bodies are flattened on construction: inline backtick markup is
//! stripped and continuation lines are dedented and joined with single
//! spaces.

use once_cell::sync::Lazy;
use regex::Regex;

/// A top-level block of doc text.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Free prose; soft-wrapped lines are preserved with newlines.
    Paragraph(String),
    /// A run of consecutive `:label: body` entries.
    FieldList(Vec<Field>),
}

/// One `:label: body` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: String,
    pub body: String,
}

static FIELD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:([^:]+):\s*(.*)$").expect("field-line pattern is valid")
});

static INLINE_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new("`+").expect("inline-markup pattern is valid"));

fn flatten(lines: &[String]) -> String {
    let joined = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    INLINE_MARKUP.replace_all(&joined, "").into_owned()
}

struct FieldDraft {
    label: String,
    lines: Vec<String>,
}

impl FieldDraft {
    fn finish(self) -> Field {
        Field {
            body: flatten(&self.lines),
            label: self.label,
        }
    }
}

/// Parse dedented doc text into paragraph and field-list nodes.
pub fn parse(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut fields: Vec<Field> = Vec::new();
    let mut draft: Option<FieldDraft> = None;

    fn flush_paragraph(nodes: &mut Vec<Node>, paragraph: &mut Vec<String>) {
        if !paragraph.is_empty() {
            nodes.push(Node::Paragraph(paragraph.join("\n")));
            paragraph.clear();
        }
    }

    fn flush_draft(fields: &mut Vec<Field>, draft: &mut Option<FieldDraft>) {
        if let Some(d) = draft.take() {
            fields.push(d.finish());
        }
    }

    fn flush_fields(nodes: &mut Vec<Node>, fields: &mut Vec<Field>) {
        if !fields.is_empty() {
            nodes.push(Node::FieldList(std::mem::take(fields)));
        }
    }

    for raw in text.lines() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            // A blank line ends the current paragraph or field body but
            // does not close an open field list.
            flush_paragraph(&mut nodes, &mut paragraph);
            flush_draft(&mut fields, &mut draft);
            continue;
        }
        let indented = line.starts_with(' ') || line.starts_with('\t');
        if !indented {
            if let Some(caps) = FIELD_LINE.captures(line) {
                flush_paragraph(&mut nodes, &mut paragraph);
                flush_draft(&mut fields, &mut draft);
                let mut lines = Vec::new();
                let rest = caps[2].trim();
                if !rest.is_empty() {
                    lines.push(rest.to_string());
                }
                draft = Some(FieldDraft {
                    label: caps[1].trim().to_string(),
                    lines,
                });
                continue;
            }
            // Unindented prose closes an open field list.
            flush_draft(&mut fields, &mut draft);
            flush_fields(&mut nodes, &mut fields);
            paragraph.push(line.to_string());
        } else if let Some(d) = draft.as_mut() {
            d.lines.push(line.to_string());
        } else {
            paragraph.push(line.trim().to_string());
        }
    }
    flush_draft(&mut fields, &mut draft);
    flush_fields(&mut nodes, &mut fields);
    flush_paragraph(&mut nodes, &mut paragraph);
    nodes
}

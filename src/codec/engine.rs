//! Format-independent merge and serialize walks.
//!
//! The engine turns descriptor tables into documents and back. Writes wrap
//! every exposed field as `{value, comment?}`, recursing through nested
//! sections; merges strip those wrappers at any depth and decode field by
//! field, so a single bad field never aborts the pass.

use crate::document::{node_kind, Document, Node};
use crate::error::DecodeError;
use crate::fields::Exposed;
use serde_json::Map;
use tracing::warn;

const VALUE_KEY: &str = "value";
const COMMENT_KEY: &str = "comment";

/// Build the annotated document for an instance's exposed fields, in
/// declaration order.
pub fn build_document<T: Exposed>(instance: &T) -> Document {
    let mut doc = Document::new();
    for field in T::fields() {
        doc.insert(field.name, annotate((field.encode)(instance), field.comment));
    }
    doc
}

/// Merge a parsed document into `target`, field by field.
///
/// Returns true when at least one exposed field was absent or failed to
/// decode; callers fold that into their merge outcome. Extra document keys
/// with no matching descriptor are ignored.
pub fn merge_document<T: Exposed>(doc: &Document, target: &mut T) -> bool {
    let mut degraded = false;
    for field in T::fields() {
        match doc.get(field.name) {
            None => degraded = true,
            Some(entry) => {
                let plain = strip_annotations(entry);
                if let Err(error) = (field.merge)(target, &plain) {
                    warn!(field = field.name, %error, "field failed to decode, keeping default");
                    degraded = true;
                }
            }
        }
    }
    degraded
}

/// Remove `{value, comment?}` wrappers at every depth.
///
/// An object counts as a wrapper iff it has a `"value"` key and at most one
/// other key, which must be `"comment"`. Everything else passes through
/// structurally unchanged, which is what lets flat legacy documents and
/// wrapped documents decode through the same path.
pub fn strip_annotations(node: &Node) -> Node {
    match node {
        Node::Object(entries) => {
            if let Some(inner) = unwrap_annotation(entries) {
                return strip_annotations(inner);
            }
            let mut plain = Map::new();
            for (key, value) in entries {
                plain.insert(key.clone(), strip_annotations(value));
            }
            Node::Object(plain)
        }
        Node::Array(items) => Node::Array(items.iter().map(strip_annotations).collect()),
        other => other.clone(),
    }
}

fn unwrap_annotation(entries: &Map<String, Node>) -> Option<&Node> {
    let value = entries.get(VALUE_KEY)?;
    match entries.len() {
        1 => Some(value),
        2 if entries.contains_key(COMMENT_KEY) => Some(value),
        _ => None,
    }
}

/// Wrap a plain node as `{value, comment?}`. Blank comments are omitted.
fn annotate(node: Node, comment: Option<&'static str>) -> Node {
    let mut wrapper = Map::new();
    wrapper.insert(VALUE_KEY.to_string(), node);
    if let Some(text) = comment {
        if !text.trim().is_empty() {
            wrapper.insert(COMMENT_KEY.to_string(), Node::String(text.to_string()));
        }
    }
    Node::Object(wrapper)
}

/// Encode a section's exposed fields as an object of wrapped entries.
///
/// Backs the generated `ConfigValue` impl for section types, so sections
/// nested inside sequences and maps carry their annotations too.
pub fn encode_section<T: Exposed>(section: &T) -> Node {
    let mut entries = Map::new();
    for field in T::fields() {
        entries.insert(
            field.name.to_string(),
            annotate((field.encode)(section), field.comment),
        );
    }
    Node::Object(entries)
}

/// Decode a section from an annotation-free object node.
///
/// Absent keys keep their sub-field defaults. A decode failure anywhere
/// inside fails the whole section, so the enclosing field keeps its
/// previous value; the error chain names the nested field.
pub fn decode_section<T: Exposed + Default>(node: &Node) -> Result<T, DecodeError> {
    let entries = match node {
        Node::Object(entries) => entries,
        other => {
            return Err(DecodeError::Shape {
                expected: "object",
                found: node_kind(other),
            })
        }
    };
    let mut section = T::default();
    for field in T::fields() {
        if let Some(value) = entries.get(field.name) {
            (field.merge)(&mut section, value).map_err(|error| DecodeError::Field {
                name: field.name,
                source: Box::new(error),
            })?;
        }
    }
    Ok(section)
}

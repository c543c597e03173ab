//! Structured document model shared by every codec.
//!
//! A document is a JSON-like tree whose root is always an object. Object
//! keys preserve insertion order (serde_json's `preserve_order` feature),
//! so rendering the same tree twice yields identical bytes and files stay
//! diff-friendly under edits.

use crate::error::ParseError;
use serde_json::Map;

/// A single node in a document tree: null, boolean, number, string, array,
/// or object.
pub type Node = serde_json::Value;

/// A parsed document: the ordered fields of the root object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Map<String, Node>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self { root: Map::new() }
    }

    /// Wrap an existing root object.
    pub fn from_root(root: Map<String, Node>) -> Self {
        Self { root }
    }

    /// Parse text into a document.
    ///
    /// Fails if the text is malformed or its root is not an object.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let node: Node = serde_json::from_str(text)?;
        match node {
            Node::Object(root) => Ok(Self { root }),
            other => Err(ParseError::RootNotObject {
                found: node_kind(&other),
            }),
        }
    }

    /// Render the document as pretty-printed text with a trailing newline.
    ///
    /// Rendering cannot fail: object keys are strings and every node
    /// serializes infallibly.
    pub fn render(&self) -> String {
        let mut text = serde_json::to_string_pretty(&self.root)
            .expect("object trees always serialize");
        text.push('\n');
        text
    }

    /// Look up a root field by name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.root.get(name)
    }

    /// Insert or replace a root field. New fields append in insertion order.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) {
        self.root.insert(name.into(), node);
    }

    /// Number of root fields.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Whether the document has no root fields.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Iterate root fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.root.iter()
    }
}

/// Human-readable name of a node's tag, for error messages and logs.
pub fn node_kind(node: &Node) -> &'static str {
    match node {
        Node::Null => "null",
        Node::Bool(_) => "boolean",
        Node::Number(_) => "number",
        Node::String(_) => "string",
        Node::Array(_) => "array",
        Node::Object(_) => "object",
    }
}

//! The shipped JSON codec.

use crate::codec::Codec;
use crate::document::Document;
use crate::error::ParseError;

/// Stores documents as pretty-printed JSON with insertion-ordered keys
/// under a `.json` extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonCodec {
    fn extension(&self) -> &'static str {
        ".json"
    }

    fn parse(&self, text: &str) -> Result<Document, ParseError> {
        Document::parse(text)
    }

    fn render(&self, doc: &Document) -> String {
        doc.render()
    }
}

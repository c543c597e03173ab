//! Codec seam between typed configs and files on disk.
//!
//! A codec owns the textual format: its extension, parsing, and rendering.
//! The provided `merge_into` and `write` methods are format-independent:
//! they drive the descriptor-table engine and the atomic persist path, so
//! every codec gets the tolerant merge semantics for free.

pub mod engine;
mod json;

pub use json::JsonCodec;

use crate::document::Document;
use crate::error::{ParseError, PersistError};
use crate::fields::Exposed;
use crate::persist;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Flags reported by one merge pass, consumed immediately by the caller to
/// decide whether the file needs a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The file was present on disk.
    pub file_existed: bool,
    /// At least one exposed field was absent or failed to decode.
    pub missing_keys: bool,
    /// The file could not be read or parsed at all.
    pub parse_error: bool,
}

impl MergeOutcome {
    /// True when the file should be regenerated from the merged instance:
    /// it was absent, incomplete, or unreadable.
    pub fn needs_rewrite(&self) -> bool {
        !self.file_existed || self.missing_keys || self.parse_error
    }
}

/// A document format.
pub trait Codec: Send + Sync {
    /// Dotted file extension for this format, e.g. `".json"`.
    fn extension(&self) -> &'static str;

    /// Parse text into a document.
    fn parse(&self, text: &str) -> Result<Document, ParseError>;

    /// Render a document as text. Must be deterministic for equal documents.
    fn render(&self, doc: &Document) -> String;

    /// Merge the document at `path` into `target`, field by field.
    ///
    /// Never returns an error: degradation is reported through the outcome
    /// flags, and `target` keeps its current values for whatever could not
    /// be merged. An absent file leaves the target untouched entirely.
    fn merge_into<T: Exposed>(&self, path: &Path, target: &mut T) -> MergeOutcome
    where
        Self: Sized,
    {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file absent, keeping defaults");
                return MergeOutcome {
                    file_existed: false,
                    missing_keys: true,
                    parse_error: false,
                };
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "config file unreadable");
                return MergeOutcome {
                    file_existed: true,
                    missing_keys: true,
                    parse_error: true,
                };
            }
        };

        let doc = match self.parse(&text) {
            Ok(doc) => doc,
            Err(error) => {
                warn!(path = %path.display(), %error, "config file failed to parse");
                return MergeOutcome {
                    file_existed: true,
                    missing_keys: true,
                    parse_error: true,
                };
            }
        };

        let missing = engine::merge_document(&doc, target);
        MergeOutcome {
            file_existed: true,
            missing_keys: missing,
            parse_error: false,
        }
    }

    /// Serialize `instance`'s exposed fields and persist them atomically at
    /// `path`, creating parent directories as needed.
    fn write<T: Exposed>(&self, path: &Path, instance: &T) -> Result<(), PersistError>
    where
        Self: Sized,
    {
        let doc = engine::build_document(instance);
        let text = self.render(&doc);
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        persist::persist(dir, path, &text)
    }
}

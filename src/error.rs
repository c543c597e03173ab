//! Error types for the configuration persistence layer.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing text into a document tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed document: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("document root must be an object, found {found}")]
    RootNotObject { found: &'static str },
}

/// Errors raised while decoding a single document node into a field value.
///
/// These never escape a merge: the engine records the failure in the merge
/// outcome, keeps the field's previous value, and moves on.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("expected {expected}, found {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{name}': {source}")]
    Field {
        name: &'static str,
        source: Box<DecodeError>,
    },

    #[error(transparent)]
    Leaf(#[from] serde_json::Error),
}

/// Errors raised while replacing a config file on disk.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create config directory {}: {source}", .dir.display())]
    CreateDir { dir: PathBuf, source: io::Error },

    #[error("failed to stage temp file in {}: {source}", .dir.display())]
    Stage { dir: PathBuf, source: io::Error },

    #[error("failed to replace {}: {source}", .path.display())]
    Replace { path: PathBuf, source: io::Error },
}

/// Errors raised by the config registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("config '{0}' is already registered")]
    Duplicate(String),

    #[error("config '{0}' is not registered")]
    Unknown(String),

    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),
}

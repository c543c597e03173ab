//! Vellum: Commented, Self-Healing Configuration Files
//!
//! A configuration persistence layer that keeps typed in-memory configs
//! synchronized with human-editable files on disk. Stored values merge back
//! field by field, tolerating missing keys, bad values, and legacy flat
//! encodings; files are rewritten atomically with every field annotated as
//! `{"value": ..., "comment": ...}`, and stale or damaged files regenerate
//! themselves from defaults on load.
//!
//! ```
//! use vellum::registry::{Config, ConfigRegistry};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct ServerConfig {
//!     port: u16,
//!     host: String,
//! }
//!
//! vellum::expose_fields! {
//!     ServerConfig {
//!         port: "TCP port the server listens on",
//!         host: "Interface to bind",
//!     }
//! }
//!
//! impl Config for ServerConfig {}
//!
//! # fn main() -> Result<(), vellum::error::RegistryError> {
//! let dir = tempfile::tempdir().expect("temp dir");
//! let registry = ConfigRegistry::builder("demo")
//!     .root_dir(dir.path())
//!     .build();
//!
//! // First registration writes the file, defaults and comments included.
//! let server = registry.register("server", ServerConfig::default())?;
//!
//! server.edit(|config| config.port = 9090);
//! registry.save_dirty()?;
//!
//! let text = std::fs::read_to_string(registry.config_path("server")).expect("read config");
//! assert!(text.contains("TCP port the server listens on"));
//! assert!(text.contains("9090"));
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod document;
pub mod error;
pub mod fields;
pub mod persist;
pub mod registry;

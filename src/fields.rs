//! Field descriptor tables and the value-shape system.
//!
//! Each config type carries a static table of [`FieldSpec`] entries
//! describing how to encode and merge every exposed field; the table is the
//! single source of truth for what gets persisted. [`ConfigValue`] defines
//! the closed set of shapes a field may take: leaves, optionals, sequences,
//! string-keyed maps, and nested sections. The [`expose_fields!`] macro
//! generates both pieces for a struct.

use crate::document::{node_kind, Node};
use crate::error::DecodeError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Map;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Descriptor for one exposed field of a config type.
///
/// `merge` is all-or-nothing: the node decodes to a temporary first, so on
/// failure the field's previous value stays in place.
pub struct FieldSpec<T> {
    /// Document key the field is stored under.
    pub name: &'static str,
    /// Comment emitted next to the value, if any.
    pub comment: Option<&'static str>,
    /// Encode the current field value as an annotation-free node.
    pub encode: fn(&T) -> Node,
    /// Decode an annotation-free node and assign it to the field.
    pub merge: fn(&mut T, &Node) -> Result<(), DecodeError>,
}

/// A config type with a static table of exposed fields.
///
/// A field is written and merged iff it appears in the table; everything
/// else on the struct is invisible to persistence. The `'static`
/// supertrait keeps the table's `&'static` return type well-formed in
/// generic callers. Generated by [`expose_fields!`].
pub trait Exposed: Sized + 'static {
    /// The exposed-field table, in declaration order.
    fn fields() -> &'static [FieldSpec<Self>];
}

/// A value shape the engine knows how to encode and decode.
///
/// `from_node` always receives annotation-free input: the merge engine
/// strips `{value, comment}` wrappers before decoding.
pub trait ConfigValue: Sized {
    /// Encode as a plain node. Never fails for a live value.
    fn to_node(&self) -> Node;
    /// Decode from a plain node.
    fn from_node(node: &Node) -> Result<Self, DecodeError>;
}

/// Encode any serde-serializable leaf. Support fn for [`serde_leaf!`].
#[doc(hidden)]
pub fn leaf_to_node<T: Serialize>(value: &T) -> Node {
    serde_json::to_value(value).unwrap_or(Node::Null)
}

/// Decode any serde-deserializable leaf. Support fn for [`serde_leaf!`].
#[doc(hidden)]
pub fn leaf_from_node<T: DeserializeOwned>(node: &Node) -> Result<T, DecodeError> {
    serde_json::from_value(node.clone()).map_err(DecodeError::from)
}

/// Implement [`ConfigValue`] for types that already round-trip through
/// serde, typically `#[derive(Serialize, Deserialize)]` enums:
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// enum LogFormat {
///     Plain,
///     Json,
/// }
///
/// vellum::serde_leaf!(LogFormat);
/// ```
#[macro_export]
macro_rules! serde_leaf {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::fields::ConfigValue for $ty {
                fn to_node(&self) -> $crate::document::Node {
                    $crate::fields::leaf_to_node(self)
                }

                fn from_node(
                    node: &$crate::document::Node,
                ) -> ::core::result::Result<Self, $crate::error::DecodeError> {
                    $crate::fields::leaf_from_node(node)
                }
            }
        )+
    };
}

serde_leaf!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, PathBuf);

impl<V: ConfigValue> ConfigValue for Option<V> {
    fn to_node(&self) -> Node {
        match self {
            Some(value) => value.to_node(),
            None => Node::Null,
        }
    }

    fn from_node(node: &Node) -> Result<Self, DecodeError> {
        match node {
            Node::Null => Ok(None),
            other => V::from_node(other).map(Some),
        }
    }
}

impl<V: ConfigValue> ConfigValue for Vec<V> {
    fn to_node(&self) -> Node {
        Node::Array(self.iter().map(ConfigValue::to_node).collect())
    }

    fn from_node(node: &Node) -> Result<Self, DecodeError> {
        match node {
            Node::Array(items) => items.iter().map(V::from_node).collect(),
            other => Err(DecodeError::Shape {
                expected: "array",
                found: node_kind(other),
            }),
        }
    }
}

impl<V: ConfigValue> ConfigValue for HashMap<String, V> {
    /// Keys encode sorted so rendering stays deterministic.
    fn to_node(&self) -> Node {
        let mut keys: Vec<&String> = self.keys().collect();
        keys.sort();
        let mut entries = Map::new();
        for key in keys {
            entries.insert(key.clone(), self[key].to_node());
        }
        Node::Object(entries)
    }

    fn from_node(node: &Node) -> Result<Self, DecodeError> {
        match node {
            Node::Object(entries) => entries
                .iter()
                .map(|(key, value)| Ok((key.clone(), V::from_node(value)?)))
                .collect(),
            other => Err(DecodeError::Shape {
                expected: "object",
                found: node_kind(other),
            }),
        }
    }
}

impl<V: ConfigValue> ConfigValue for BTreeMap<String, V> {
    fn to_node(&self) -> Node {
        let mut entries = Map::new();
        for (key, value) in self {
            entries.insert(key.clone(), value.to_node());
        }
        Node::Object(entries)
    }

    fn from_node(node: &Node) -> Result<Self, DecodeError> {
        match node {
            Node::Object(entries) => entries
                .iter()
                .map(|(key, value)| Ok((key.clone(), V::from_node(value)?)))
                .collect(),
            other => Err(DecodeError::Shape {
                expected: "object",
                found: node_kind(other),
            }),
        }
    }
}

/// Generate the [`Exposed`] field table and the section [`ConfigValue`]
/// impl for a config struct.
///
/// Each entry is a field name with an optional comment string; entries are
/// persisted in declaration order. The struct must implement `Default`
/// (defaults are what merge falls back to) and every listed field's type
/// must implement [`ConfigValue`].
///
/// ```
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct ServerConfig {
///     port: u16,
///     host: String,
///     verbose: bool,
/// }
///
/// vellum::expose_fields! {
///     ServerConfig {
///         port: "TCP port the server listens on",
///         host: "Interface to bind",
///         verbose,
///     }
/// }
/// ```
#[macro_export]
macro_rules! expose_fields {
    ($ty:ident { $($field:ident $(: $comment:literal)?),+ $(,)? }) => {
        impl $crate::fields::Exposed for $ty {
            fn fields() -> &'static [$crate::fields::FieldSpec<Self>] {
                const FIELDS: &[$crate::fields::FieldSpec<$ty>] = &[
                    $(
                        $crate::fields::FieldSpec {
                            name: stringify!($field),
                            comment: $crate::expose_fields!(@comment $($comment)?),
                            encode: |config| {
                                $crate::fields::ConfigValue::to_node(&config.$field)
                            },
                            merge: |config, node| {
                                config.$field = $crate::fields::ConfigValue::from_node(node)?;
                                ::core::result::Result::Ok(())
                            },
                        },
                    )+
                ];
                FIELDS
            }
        }

        impl $crate::fields::ConfigValue for $ty {
            fn to_node(&self) -> $crate::document::Node {
                $crate::codec::engine::encode_section(self)
            }

            fn from_node(
                node: &$crate::document::Node,
            ) -> ::core::result::Result<Self, $crate::error::DecodeError> {
                $crate::codec::engine::decode_section(node)
            }
        }
    };
    (@comment $comment:literal) => {
        ::core::option::Option::Some($comment)
    };
    (@comment) => {
        ::core::option::Option::None
    };
}

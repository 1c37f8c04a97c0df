//! Schema and document pointers
//!
//! A pointer field in the configuration can be a path or URL, a glob, a list
//! of pointers, or a single-key mapping from a path/glob to loader options:
//!
//! ```yaml
//! schema: schema.graphql
//! documents:
//!   - src/**/*.graphql
//!   - "queries/*.gql": { noRequire: true }
//! ```
//!
//! The raw shape is classified once, at ingestion, into [`Pointer`].

use std::fmt;

use thiserror::Error;

use crate::value::{Mapping, Value};

/// Deepest nesting of pointer lists accepted from configuration
pub const MAX_POINTER_DEPTH: usize = 16;

/// Errors raised while classifying a raw pointer value
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// The value is neither a string, a list nor a mapping.
    #[error("expected a string, a list or a single-key mapping, found {found}")]
    InvalidType { found: &'static str },

    /// A mapping that is not `{ "<path or glob>": { ...options } }`.
    #[error("a pointer mapping must have exactly one key whose value is a mapping of loader options")]
    InvalidMapping,

    /// Lists nested past [`MAX_POINTER_DEPTH`].
    #[error("pointer nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

/// A classified reference to one or more schema/document sources
#[derive(Debug, Clone, PartialEq)]
pub enum Pointer {
    /// A path, URL or inline source
    Literal(String),
    /// A string containing a wildcard
    Glob(String),
    /// An ordered list of pointers
    Sequence(Vec<Pointer>),
    /// A path or glob with loader-specific options.
    ///
    /// `target` is always a `Literal` or a `Glob`.
    Configured {
        target: Box<Pointer>,
        options: Mapping,
    },
}

/// True iff `pointer` is a string containing a wildcard marker
pub fn is_glob(pointer: &str) -> bool {
    pointer.contains('*')
}

/// True iff `value` is a mapping with exactly one key whose value is itself a mapping
pub fn is_pointer_with_configuration(value: &Value) -> bool {
    match value.as_mapping() {
        Some(map) => map.len() == 1 && map.values().all(Value::is_mapping),
        None => false,
    }
}

impl Pointer {
    /// Classify a single pointer string
    pub fn from_string(pointer: impl Into<String>) -> Self {
        let pointer = pointer.into();
        if is_glob(&pointer) {
            Pointer::Glob(pointer)
        } else {
            Pointer::Literal(pointer)
        }
    }

    /// Wrap a path or glob with loader options
    pub fn configured(pointer: impl Into<String>, options: Mapping) -> Self {
        Pointer::Configured {
            target: Box::new(Self::from_string(pointer)),
            options,
        }
    }

    /// Classify a raw configuration value
    pub fn from_value(value: &Value) -> Result<Self, PointerError> {
        Self::from_value_at_depth(value, 0)
    }

    fn from_value_at_depth(value: &Value, depth: usize) -> Result<Self, PointerError> {
        if depth > MAX_POINTER_DEPTH {
            return Err(PointerError::TooDeep {
                limit: MAX_POINTER_DEPTH,
            });
        }

        match value {
            Value::String(s) => Ok(Self::from_string(s.as_str())),
            Value::Sequence(items) => items
                .iter()
                .map(|item| Self::from_value_at_depth(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Pointer::Sequence),
            Value::Mapping(map) if is_pointer_with_configuration(value) => {
                // is_pointer_with_configuration guarantees exactly one mapping entry
                match map.iter().next() {
                    Some((key, Value::Mapping(options))) => {
                        Ok(Self::configured(key.as_str(), options.clone()))
                    }
                    _ => Err(PointerError::InvalidMapping),
                }
            }
            Value::Mapping(_) => Err(PointerError::InvalidMapping),
            other => Err(PointerError::InvalidType {
                found: other.type_name(),
            }),
        }
    }

    /// The pointer text for `Literal` and `Glob`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Pointer::Literal(s) | Pointer::Glob(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this is a glob
    pub fn is_glob(&self) -> bool {
        matches!(self, Pointer::Glob(_))
    }

    /// Render back into the raw configuration shape
    pub fn to_value(&self) -> Value {
        match self {
            Pointer::Literal(s) | Pointer::Glob(s) => Value::String(s.clone()),
            Pointer::Sequence(items) => Value::Sequence(items.iter().map(Pointer::to_value).collect()),
            Pointer::Configured { target, options } => {
                let mut map = Mapping::new();
                map.insert(target.to_string(), Value::Mapping(options.clone()));
                Value::Mapping(map)
            }
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pointer::Literal(s) | Pointer::Glob(s) => write!(f, "{}", s),
            Pointer::Sequence(items) => {
                write!(f, "[")?;
                for (i, p) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, "]")
            }
            Pointer::Configured { target, .. } => write!(f, "{}", target),
        }
    }
}

impl From<&str> for Pointer {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for Pointer {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl TryFrom<&Value> for Pointer {
    type Error = PointerError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

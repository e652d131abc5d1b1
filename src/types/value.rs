//! Structural value model
//!
//! The analyzer describes documents, pages and objects as JSON text. This
//! module holds the decoded form of that description: a tagged value whose
//! object keys keep the order the analyzer emitted them in.

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Number, Value};

use crate::error::StructureError;

/// Ordered key/value mapping used by [`StructuralValue::Object`]
pub type StructuralMap = IndexMap<String, StructuralValue>;

/// Parsed structural description returned by the analyzer
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<StructuralValue>),
    Object(StructuralMap),
}

impl StructuralValue {
    /// Decodes an analyzer buffer as UTF-8 JSON.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StructureError> {
        let text =
            std::str::from_utf8(bytes).map_err(|e| StructureError::InvalidUtf8(e.to_string()))?;
        let value: Value =
            serde_json::from_str(text).map_err(|e| StructureError::InvalidJson(e.to_string()))?;
        Ok(value.into())
    }

    /// Decodes a buffer, falling back to a string holding the lossy text.
    ///
    /// Used wherever a malformed description must still render as something.
    pub fn from_slice_lossy(bytes: &[u8]) -> Self {
        match Self::from_slice(bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Falling back to raw text for malformed description: {}", e);
                StructuralValue::String(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, StructuralValue::Array(_) | StructuralValue::Object(_))
    }

    pub fn as_object(&self) -> Option<&StructuralMap> {
        match self {
            StructuralValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a key when this value is an object.
    pub fn get(&self, key: &str) -> Option<&StructuralValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Interprets the value as a PDF object number.
    ///
    /// Accepts non-negative integers and decimal strings; anything else is `None`.
    pub fn as_object_number(&self) -> Option<u32> {
        match self {
            StructuralValue::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            StructuralValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text shown for a value in a leaf label.
    pub fn display_text(&self) -> String {
        match self {
            StructuralValue::Null => "null".to_string(),
            StructuralValue::Bool(b) => b.to_string(),
            StructuralValue::Number(n) => n.to_string(),
            StructuralValue::String(s) => s.clone(),
            composite => composite.compact_text(),
        }
    }

    /// Compact JSON text of the value.
    ///
    /// Walks an explicit stack so arbitrarily deep values render without
    /// growing the call stack.
    pub fn compact_text(&self) -> String {
        let mut out = String::new();
        let mut pending = vec![Piece::Value(self)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Punct(p) => out.push_str(p),
                Piece::Key(key) => {
                    push_quoted(&mut out, key);
                    out.push(':');
                }
                Piece::Value(StructuralValue::Array(items)) => {
                    out.push('[');
                    pending.push(Piece::Punct("]"));
                    for (i, item) in items.iter().enumerate().rev() {
                        pending.push(Piece::Value(item));
                        if i > 0 {
                            pending.push(Piece::Punct(","));
                        }
                    }
                }
                Piece::Value(StructuralValue::Object(map)) => {
                    out.push('{');
                    pending.push(Piece::Punct("}"));
                    for (i, (key, item)) in map.iter().enumerate().rev() {
                        pending.push(Piece::Value(item));
                        pending.push(Piece::Key(key));
                        if i > 0 {
                            pending.push(Piece::Punct(","));
                        }
                    }
                }
                Piece::Value(StructuralValue::String(s)) => push_quoted(&mut out, s),
                Piece::Value(scalar) => out.push_str(&scalar.display_text()),
            }
        }
        out
    }

    /// Number of non-composite values reachable from this value.
    pub fn scalar_count(&self) -> usize {
        match self {
            StructuralValue::Array(items) => items.iter().map(Self::scalar_count).sum(),
            StructuralValue::Object(map) => map.values().map(Self::scalar_count).sum(),
            _ => 1,
        }
    }
}

enum Piece<'a> {
    Value(&'a StructuralValue),
    Key(&'a str),
    Punct(&'static str),
}

fn push_quoted(out: &mut String, text: &str) {
    out.push_str(&Value::String(text.to_owned()).to_string());
}

impl fmt::Display for StructuralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<Value> for StructuralValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => StructuralValue::Null,
            Value::Bool(b) => StructuralValue::Bool(b),
            Value::Number(n) => StructuralValue::Number(n),
            Value::String(s) => StructuralValue::String(s),
            Value::Array(items) => {
                StructuralValue::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(map) => StructuralValue::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

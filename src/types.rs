//! Common types used throughout nodeforge
//!
//! Shared type aliases and the closed value-kind classification that drives
//! all inference branching.

use crate::dates;
use serde_json::Value;

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// The closed set of value kinds inference can detect.
///
/// Computed once per example value; every branch in the builders matches on
/// this enum rather than re-inspecting the raw JSON, so the compiler checks
/// exhaustiveness for us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    /// A string that did not match any supported calendar format
    String,
    /// A string matching one of the supported ISO 8601 calendar formats
    Date,
    Int,
    Float,
    List,
    Object,
}

impl ValueKind {
    /// Classify a JSON value.
    ///
    /// Numbers with no fractional part classify as [`ValueKind::Int`], all
    /// others as [`ValueKind::Float`]. The decision is made per value, so a
    /// field can classify differently depending on which record supplied the
    /// representative example.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(n) => {
                if is_integral(n) {
                    ValueKind::Int
                } else {
                    ValueKind::Float
                }
            }
            Value::String(s) => {
                if dates::is_iso8601(s) {
                    ValueKind::Date
                } else {
                    ValueKind::String
                }
            }
            Value::Array(_) => ValueKind::List,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

fn is_integral(n: &serde_json::Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

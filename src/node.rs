//! Content node model
//!
//! A node is one item of loosely-typed content. Reserved fields (`type`,
//! `id`, `parent`, `children`) are carried as typed struct fields; everything
//! else lives in the free-form field bag that inference walks.

use crate::error::Result;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Top-level keys supplied by the node machinery itself, never inferred at
/// the root of a record.
pub const RESERVED_KEYS: [&str; 4] = ["type", "id", "parent", "children"];

/// Marker separating a field name from its node-link suffix, e.g.
/// `author___NODE` or `author___NODE___email`.
pub const NODE_MARKER: &str = "___NODE";

/// One content record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier
    pub id: String,
    /// Record-type tag, e.g. `MarkdownRemark` or `File`
    #[serde(rename = "type")]
    pub node_type: String,
    /// Identifier of the parent node, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Identifiers of child nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    /// The loosely-typed content fields
    #[serde(flatten)]
    pub fields: JsonObject,
}

impl Node {
    /// Create a node with the given id and type and an empty field bag
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            parent: None,
            children: Vec::new(),
            fields: JsonObject::new(),
        }
    }

    /// Set the parent identifier
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set a content field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Deserialize a node from a raw JSON value.
    ///
    /// Reserved keys land in the typed struct fields; everything else goes
    /// into the field bag.
    pub fn from_value(value: JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Look up a field by name, reserved keys included.
    ///
    /// Node-link resolution scans arbitrary field names (`linkedNode.email`
    /// as easily as `linkedNode.id`), so reserved keys answer here too.
    pub fn get(&self, key: &str) -> Option<JsonValue> {
        match key {
            "id" => Some(JsonValue::String(self.id.clone())),
            "type" => Some(JsonValue::String(self.node_type.clone())),
            "parent" => self.parent.clone().map(JsonValue::String),
            "children" => Some(JsonValue::Array(
                self.children
                    .iter()
                    .map(|c| JsonValue::String(c.clone()))
                    .collect(),
            )),
            _ => self.fields.get(key).cloned(),
        }
    }

    /// The node's flattened JSON form, reserved keys and field bag in one
    /// object. This is the shape field resolvers receive as their record.
    pub fn to_record(&self) -> JsonObject {
        match serde_json::to_value(self) {
            Ok(JsonValue::Object(map)) => map,
            _ => JsonObject::new(),
        }
    }

    /// The field name minus a trailing node-link suffix, e.g.
    /// `author___NODE___email` becomes `author`.
    pub fn clean_field_key(key: &str) -> &str {
        key.split(NODE_MARKER).next().unwrap_or(key)
    }
}

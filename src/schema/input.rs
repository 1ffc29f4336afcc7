//! Input/filter-schema inference
//!
//! Mirrors the output builder but produces the query side: per-field
//! comparison-operator groups, nested input objects, and (at the root only)
//! a generated sort enum over every leaf field path.

use super::typename::{camel_case, create_type_name, upper_first};
use super::types::{EnumType, InputField, InputObjectType, InputTypeRef, ScalarKind};
use crate::error::{Error, Result};
use crate::example::{build_field_enum_values, extract_record_examples};
use crate::node::Node;
use crate::types::{JsonObject, JsonValue, ValueKind};
use serde_json::json;
use std::collections::BTreeMap;

/// Root keys that describe node traversal, not filterable content
const EXCLUDE_INPUT_KEYS: [&str; 2] = ["parent", "children"];

/// The inferred input structure of one record type
#[derive(Debug, Clone, PartialEq)]
pub struct InferredInputObject {
    /// The record-type name
    pub name: String,
    /// Field name to input field; includes the synthesized `sortBy`
    pub fields: BTreeMap<String, InputField>,
}

/// Builds the filter/sort input schema for one record type
pub struct InputBuilder<'a> {
    nodes: &'a [Node],
    type_name: String,
}

impl<'a> InputBuilder<'a> {
    /// Create a builder over a non-empty set of same-type records
    pub fn new(nodes: &'a [Node]) -> Result<Self> {
        let first = nodes.first().ok_or(Error::EmptyNodeSet)?;
        Ok(Self {
            nodes,
            type_name: first.node_type.clone(),
        })
    }

    /// Infer the full input-field mapping, sort input included.
    ///
    /// The root example is the full record shape, so `id` and `type` stay
    /// filterable and sortable; only the traversal keys are dropped.
    pub fn build(self) -> InferredInputObject {
        let mut example = extract_record_examples(self.nodes);
        for key in EXCLUDE_INPUT_KEYS {
            example.remove(key);
        }
        let mut fields = self.input_object_structure(&example, &self.type_name);
        fields.insert("sortBy".to_string(), self.sort_by_field(&example));
        InferredInputObject {
            name: self.type_name,
            fields,
        }
    }

    fn input_object_structure(
        &self,
        example: &JsonObject,
        prefix: &str,
    ) -> BTreeMap<String, InputField> {
        let mut fields = BTreeMap::new();
        for (key, value) in example {
            let clean_key = Node::clean_field_key(key);
            let field_prefix = format!("{prefix}{}", upper_first(clean_key));
            if let Some(field) = self.infer_input_field(value, &field_prefix) {
                fields.insert(key.clone(), field);
            }
        }
        fields
    }

    fn infer_input_field(&self, value: &JsonValue, prefix: &str) -> Option<InputField> {
        match ValueKind::of(value) {
            ValueKind::Null => None,
            ValueKind::Boolean => Some(operator_object(prefix, "QueryBoolean", ValueKind::Boolean)),
            // Dates filter as plain strings.
            ValueKind::String | ValueKind::Date => {
                Some(operator_object(prefix, "QueryString", ValueKind::String))
            }
            ValueKind::Int => Some(operator_object(prefix, "QueryNumber", ValueKind::Int)),
            ValueKind::Float => Some(operator_object(prefix, "QueryFloat", ValueKind::Float)),
            ValueKind::List => {
                let head = value.as_array()?.first()?;
                let head_kind = ValueKind::of(head);
                let element = match head_kind {
                    ValueKind::Null => return None,
                    ValueKind::Boolean => InputTypeRef::Scalar(ScalarKind::Boolean),
                    ValueKind::String | ValueKind::Date => InputTypeRef::Scalar(ScalarKind::String),
                    ValueKind::Int => InputTypeRef::Scalar(ScalarKind::Int),
                    ValueKind::Float => InputTypeRef::Scalar(ScalarKind::Float),
                    // Nested containers filter through their own input type.
                    ValueKind::List | ValueKind::Object => {
                        self.infer_input_field(head, prefix)?.type_ref
                    }
                };
                let mut fields = operator_fields(head_kind);
                fields.insert("in".to_string(), InputField::new(element.list()));
                Some(InputField::new(InputTypeRef::Object(Box::new(
                    InputObjectType {
                        name: create_type_name(&format!("{prefix}QueryList")),
                        fields,
                    },
                ))))
            }
            ValueKind::Object => {
                let fields = self.input_object_structure(value.as_object()?, prefix);
                Some(InputField::new(InputTypeRef::Object(Box::new(
                    InputObjectType {
                        name: create_type_name(&format!("{prefix}InputObject")),
                        fields,
                    },
                ))))
            }
        }
    }

    /// The root-only `sortBy` input: an enum of every sortable leaf path
    /// plus an order field defaulting to ascending.
    fn sort_by_field(&self, example: &JsonObject) -> InputField {
        let sort_enum = EnumType {
            name: format!("{}SortByFieldsEnum", self.type_name),
            values: build_field_enum_values(example),
        };
        let order_enum = EnumType {
            name: camel_case(&format!("{} sortOrderValues", self.type_name)),
            values: vec!["asc".to_string(), "desc".to_string()],
        };

        let mut fields = BTreeMap::new();
        fields.insert(
            "fields".to_string(),
            InputField::new(InputTypeRef::Enum(sort_enum).list().non_null()),
        );
        fields.insert(
            "order".to_string(),
            InputField::new(InputTypeRef::Enum(order_enum)).with_default(json!("asc")),
        );

        InputField::new(InputTypeRef::Object(Box::new(InputObjectType {
            name: camel_case(&format!("{} sortBy", self.type_name)),
            fields,
        })))
    }
}

/// The comparison operators appropriate to a scalar kind. Containers get no
/// operators of their own, only the `in` membership test added by the
/// caller.
fn operator_fields(kind: ValueKind) -> BTreeMap<String, InputField> {
    let mut fields = BTreeMap::new();
    let scalar = match kind {
        ValueKind::Boolean => Some(ScalarKind::Boolean),
        ValueKind::String | ValueKind::Date => Some(ScalarKind::String),
        ValueKind::Int => Some(ScalarKind::Int),
        ValueKind::Float => Some(ScalarKind::Float),
        _ => None,
    };
    if let Some(scalar) = scalar {
        fields.insert(
            "eq".to_string(),
            InputField::new(InputTypeRef::Scalar(scalar)),
        );
        fields.insert(
            "ne".to_string(),
            InputField::new(InputTypeRef::Scalar(scalar)),
        );
    }
    if matches!(kind, ValueKind::String | ValueKind::Date) {
        fields.insert(
            "regex".to_string(),
            InputField::new(InputTypeRef::Scalar(ScalarKind::String)),
        );
        fields.insert(
            "glob".to_string(),
            InputField::new(InputTypeRef::Scalar(ScalarKind::String)),
        );
    }
    fields
}

fn operator_object(prefix: &str, suffix: &str, kind: ValueKind) -> InputField {
    InputField::new(InputTypeRef::Object(Box::new(InputObjectType {
        name: create_type_name(&format!("{prefix}{suffix}")),
        fields: operator_fields(kind),
    })))
}

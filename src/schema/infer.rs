//! Output-schema inference
//!
//! [`SchemaBuilder`] is the per-record-type entry point: it merges the
//! type's records into one example value, then infers a field descriptor
//! per field, trying the relationship strategies before generic shape
//! inference. Nested objects recurse back into the builder with a longer
//! selector path.

use super::relations::should_infer_file;
use super::typename::create_type_name;
use super::types::{
    FieldArgument, FieldDescriptor, FieldResolver, InferenceWarning, ObjectType, ScalarKind,
    TypeRef,
};
use crate::error::{Error, Result};
use crate::example::extract_field_examples;
use crate::node::{Node, NODE_MARKER, RESERVED_KEYS};
use crate::store::{NodeStore, SiteConfig, TypeRegistry};
use crate::types::{JsonObject, JsonValue, ValueKind};
use std::collections::BTreeMap;

/// The inferred output structure of one record type
#[derive(Debug, Clone, PartialEq)]
pub struct InferredObject {
    /// The record-type name
    pub name: String,
    /// Field name to descriptor
    pub fields: BTreeMap<String, FieldDescriptor>,
    /// Non-fatal problems encountered during the build
    pub warnings: Vec<InferenceWarning>,
}

impl InferredObject {
    /// Convert into a plain object type, dropping the warnings
    pub fn into_object_type(self) -> ObjectType {
        ObjectType {
            name: self.name,
            fields: self.fields,
        }
    }
}

/// Builds the output schema for one record type
pub struct SchemaBuilder<'a> {
    pub(super) nodes: &'a [Node],
    pub(super) type_name: String,
    pub(super) store: &'a dyn NodeStore,
    pub(super) registry: &'a TypeRegistry,
    pub(super) config: &'a SiteConfig,
    pub(super) warnings: Vec<InferenceWarning>,
}

impl<'a> SchemaBuilder<'a> {
    /// Create a builder over a non-empty set of same-type records
    pub fn new(
        nodes: &'a [Node],
        store: &'a dyn NodeStore,
        registry: &'a TypeRegistry,
        config: &'a SiteConfig,
    ) -> Result<Self> {
        let first = nodes.first().ok_or(Error::EmptyNodeSet)?;
        Ok(Self {
            nodes,
            type_name: first.node_type.clone(),
            store,
            registry,
            config,
            warnings: Vec::new(),
        })
    }

    /// Infer the full field mapping for the record type.
    ///
    /// Never fails: untypeable fields are omitted and reference problems
    /// surface as warnings on the result.
    pub fn build(mut self) -> InferredObject {
        let example = extract_field_examples(self.nodes);
        let fields = self.object_structure(&example, None);
        InferredObject {
            name: self.type_name,
            fields,
            warnings: self.warnings,
        }
    }

    /// Infer descriptors for every field of an example object. `selector`
    /// is `None` only for the root call, where reserved keys are skipped.
    pub(super) fn object_structure(
        &mut self,
        example: &JsonObject,
        selector: Option<&str>,
    ) -> BTreeMap<String, FieldDescriptor> {
        let is_root = selector.is_none();
        let mut fields = BTreeMap::new();

        for (key, value) in example {
            // Reserved top-level fields are supplied by the node machinery.
            if is_root && RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }

            let field_name = Node::clean_field_key(key);
            let next_selector = match selector {
                Some(sel) => format!("{sel}.{key}"),
                None => format!("{}.{key}", self.type_name),
            };

            // Relationship strategies run before shape inference; the first
            // strategy whose precondition holds owns the field.
            let inferred = if self.config.mapping.contains_key(&next_selector) {
                self.infer_from_mapping(value, key, &next_selector)
            } else if key.contains(NODE_MARKER) {
                self.infer_from_field_name(value, key)
            } else if self.type_name != "File" && should_infer_file(value) {
                self.infer_from_path(key)
            } else {
                self.infer_field(value, &next_selector)
            };

            if let Some(field) = inferred {
                fields.insert(field_name.to_string(), field);
            }
        }

        fields
    }

    /// Map one example value to a field descriptor, or `None` when the
    /// value cannot be typed.
    pub(super) fn infer_field(
        &mut self,
        value: &JsonValue,
        selector: &str,
    ) -> Option<FieldDescriptor> {
        match ValueKind::of(value) {
            ValueKind::Null => None,
            ValueKind::List => {
                let head = value.as_array()?.first()?;
                let element = match head {
                    JsonValue::Object(obj) => {
                        let fields = self.object_structure(obj, Some(selector));
                        TypeRef::Object(ObjectType {
                            name: create_type_name(selector),
                            fields,
                        })
                    }
                    _ => self.infer_field(head, selector)?.type_ref,
                };
                Some(FieldDescriptor::new(element.list()))
            }
            ValueKind::Date => Some(date_field(selector)),
            ValueKind::Boolean => Some(FieldDescriptor::new(TypeRef::Boolean)),
            ValueKind::String => Some(FieldDescriptor::new(TypeRef::String)),
            ValueKind::Int => Some(FieldDescriptor::new(TypeRef::Int)),
            ValueKind::Float => Some(FieldDescriptor::new(TypeRef::Float)),
            ValueKind::Object => {
                let fields = self.object_structure(value.as_object()?, Some(selector));
                Some(FieldDescriptor::new(TypeRef::Object(ObjectType {
                    name: create_type_name(selector),
                    fields,
                })))
            }
        }
    }
}

/// A date field: string-shaped, with read-time formatting arguments
fn date_field(selector: &str) -> FieldDescriptor {
    let field_name = selector.rsplit('.').next().unwrap_or(selector).to_string();
    FieldDescriptor::new(TypeRef::Date)
        .with_args(vec![
            FieldArgument::new("formatString", ScalarKind::String),
            FieldArgument::new("fromNow", ScalarKind::Boolean).with_description(
                "Returns a humanized relative time, e.g. \"3 days ago\"",
            ),
            FieldArgument::new("difference", ScalarKind::String).with_description(
                "Returns the elapsed time between this date and now. Defaults to \
                 milliseconds; also accepts years, months, weeks, days, hours, \
                 minutes and seconds.",
            ),
        ])
        .with_resolver(FieldResolver::Date { field_name })
}

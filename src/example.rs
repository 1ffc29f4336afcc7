//! Example extraction
//!
//! Inference never looks at single records: it works over one representative
//! "example value" per field, merged across every record of a type. The
//! first non-null value observed for a key wins; container fields keep
//! deep-merging so later records can fill in keys the representative lacked.

use crate::node::Node;
use crate::types::{JsonObject, JsonValue};

/// Merge the field bags of all nodes into one example object.
///
/// Fields that are null or an empty array in every record end up either
/// absent or with that empty shape, and yield no schema field downstream.
pub fn extract_field_examples(nodes: &[Node]) -> JsonObject {
    let mut example = JsonObject::new();
    for node in nodes {
        merge_example(&mut example, &node.fields);
    }
    example
}

fn merge_example(into: &mut JsonObject, from: &JsonObject) {
    for (key, value) in from {
        if value.is_null() {
            continue;
        }
        match into.get_mut(key) {
            None => {
                into.insert(key.clone(), value.clone());
            }
            Some(slot) if slot.is_null() => {
                *slot = value.clone();
            }
            Some(JsonValue::Object(existing)) => {
                if let JsonValue::Object(obj) = value {
                    merge_example(existing, obj);
                }
            }
            Some(JsonValue::Array(existing)) => {
                if let JsonValue::Array(arr) = value {
                    merge_array_example(existing, arr);
                }
            }
            // A non-null scalar is already the representative.
            Some(_) => {}
        }
    }
}

fn merge_array_example(existing: &mut Vec<JsonValue>, incoming: &[JsonValue]) {
    if existing.is_empty() {
        *existing = incoming.to_vec();
        return;
    }
    // Arrays are represented by their first element's shape; merge object
    // heads so the representative carries the union of nested keys.
    if let (Some(JsonValue::Object(head)), Some(JsonValue::Object(other))) =
        (existing.first_mut(), incoming.first())
    {
        merge_example(head, other);
    }
}

/// Merge the flattened records (reserved keys included) into one example
/// object.
///
/// The input side filters and sorts on `id` and `type` alongside the content
/// fields, so its example is built from the full record shape rather than
/// the field bag alone.
pub fn extract_record_examples(nodes: &[Node]) -> JsonObject {
    let mut example = JsonObject::new();
    for node in nodes {
        merge_example(&mut example, &node.to_record());
    }
    example
}

/// Enumerate every leaf field path across an example value.
///
/// Paths are dotted, node-link markers are stripped, and the result is
/// sorted so generated sort enums are deterministic.
pub fn build_field_enum_values(example: &JsonObject) -> Vec<String> {
    let mut values = Vec::new();
    collect_leaf_paths(example, None, &mut values);
    values.sort();
    values.dedup();
    values
}

fn collect_leaf_paths(example: &JsonObject, prefix: Option<&str>, out: &mut Vec<String>) {
    for (key, value) in example {
        let clean_key = Node::clean_field_key(key);
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{clean_key}"),
            None => clean_key.to_string(),
        };
        match value {
            JsonValue::Null => {}
            JsonValue::Object(obj) => collect_leaf_paths(obj, Some(&path), out),
            JsonValue::Array(items) => match items.first() {
                Some(JsonValue::Object(obj)) => collect_leaf_paths(obj, Some(&path), out),
                Some(_) => out.push(path),
                None => {}
            },
            _ => out.push(path),
        }
    }
}

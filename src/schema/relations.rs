//! Relationship resolution
//!
//! Decides whether a field is a reference to another record rather than
//! plain data, via three strategies tried in priority order: explicit
//! config mapping, `___NODE` naming convention, and the relative-file-path
//! heuristic. Build-time inference lives on [`SchemaBuilder`]; the
//! read-time lookups live on [`FieldResolver::resolve`].

use super::infer::SchemaBuilder;
use super::types::{FieldDescriptor, FieldResolver, InferenceWarning, Resolved, TypeRef};
use crate::dates;
use crate::node::Node;
use crate::store::ResolveContext;
use crate::types::{JsonObject, JsonValue};
use chrono::Utc;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::warn;

impl<'a> SchemaBuilder<'a> {
    /// Strategy 1: the site config maps this field's selector to a record
    /// type explicitly.
    pub(super) fn infer_from_mapping(
        &mut self,
        value: &JsonValue,
        key: &str,
        field_selector: &str,
    ) -> Option<FieldDescriptor> {
        let target = self.config.mapping.get(field_selector)?.clone();
        let Some(processed) = self.registry.get(&target) else {
            warn!(selector = field_selector, target = %target, "no matching node type for mapping");
            self.warnings.push(InferenceWarning::UnknownMappingType {
                selector: field_selector.to_string(),
                target,
            });
            return None;
        };
        let list = value.is_array();
        Some(
            FieldDescriptor::new(TypeRef::Node(processed.name.clone()).list_if(list))
                .with_resolver(FieldResolver::Mapping {
                    field_name: key.to_string(),
                    target_type: processed.name.clone(),
                    list,
                }),
        )
    }

    /// Strategy 2: the field key carries a `___NODE` suffix, so its value
    /// identifies another record. The example value is resolved now to
    /// learn the linked record's type.
    pub(super) fn infer_from_field_name(
        &mut self,
        value: &JsonValue,
        key: &str,
    ) -> Option<FieldDescriptor> {
        let (example, list) = match value {
            JsonValue::Array(items) => (items.first()?, true),
            other => (other, false),
        };

        // `author___NODE` links by id; `author___NODE___email` links by the
        // named sub-field instead.
        let linked_field = key.split("___").nth(2).map(ToString::to_string);

        let linked_node = match &linked_field {
            Some(sub_field) => self
                .store
                .get_nodes()
                .into_iter()
                .find(|n| n.get(sub_field).as_ref() == Some(example)),
            None => example.as_str().and_then(|id| self.store.get_node(id)),
        };
        let Some(linked_node) = linked_node else {
            warn!(key, "node-link field does not resolve to any node");
            self.warnings.push(InferenceWarning::UnresolvedNodeLink {
                key: key.to_string(),
            });
            return None;
        };

        let Some(processed) = self.registry.get(&linked_node.node_type) else {
            warn!(key, node_type = %linked_node.node_type, "linked node type is not registered");
            self.warnings.push(InferenceWarning::UnknownLinkedType {
                key: key.to_string(),
                node_type: linked_node.node_type,
            });
            return None;
        };

        Some(
            FieldDescriptor::new(TypeRef::Node(processed.name.clone()).list_if(list))
                .with_resolver(FieldResolver::NodeLink {
                    field_key: key.to_string(),
                    linked_field,
                    list,
                }),
        )
    }

    /// Strategy 3: the field looks like a relative path to a known file
    /// kind, so link it to the `File` node it points at.
    pub(super) fn infer_from_path(&mut self, key: &str) -> Option<FieldDescriptor> {
        let Some(file_type) = self.registry.get("File") else {
            warn!(key, "field looks like a file path but no File type is registered");
            self.warnings.push(InferenceWarning::MissingFileType {
                key: key.to_string(),
            });
            return None;
        };
        Some(
            FieldDescriptor::new(TypeRef::Node(file_type.name.clone())).with_resolver(
                FieldResolver::FileLink {
                    field_name: key.to_string(),
                },
            ),
        )
    }
}

impl FieldResolver {
    /// Produce the field's value for one record.
    ///
    /// `record` is the enclosing object the field lives on (the node's
    /// flattened form at the root, a nested object below). Pure read over
    /// the context apart from idempotent dependency recording; dangling
    /// references resolve to null rather than failing.
    pub fn resolve(
        &self,
        record: &JsonObject,
        args: &JsonObject,
        ctx: &ResolveContext<'_>,
    ) -> Resolved {
        match self {
            FieldResolver::Date { field_name } => resolve_date(record, field_name, args),
            FieldResolver::Mapping {
                field_name,
                target_type,
                list,
            } => resolve_linked(record, field_name, *list, ctx, |value| {
                find_mapped_node(value, target_type, ctx)
            }),
            FieldResolver::NodeLink {
                field_key,
                linked_field,
                list,
            } => resolve_linked(record, field_key, *list, ctx, |value| {
                find_linked_node(value, linked_field.as_deref(), ctx)
            }),
            FieldResolver::FileLink { field_name } => resolve_file_link(record, field_name, ctx),
        }
    }
}

fn resolve_date(record: &JsonObject, field_name: &str, args: &JsonObject) -> Resolved {
    let Some(raw) = record.get(field_name).and_then(JsonValue::as_str) else {
        return Resolved::Null;
    };
    if let Some(format_string) = args.get("formatString").and_then(JsonValue::as_str) {
        return dates::format(raw, format_string)
            .map_or(Resolved::Null, |s| Resolved::Value(JsonValue::String(s)));
    }
    if args.get("fromNow").and_then(JsonValue::as_bool) == Some(true) {
        return dates::from_now(raw, Utc::now())
            .map_or(Resolved::Null, |s| Resolved::Value(JsonValue::String(s)));
    }
    if let Some(unit) = args.get("difference").and_then(JsonValue::as_str) {
        return dates::difference(raw, unit, Utc::now())
            .map_or(Resolved::Null, |n| Resolved::Value(JsonValue::from(n)));
    }
    Resolved::Value(JsonValue::String(raw.to_string()))
}

/// Shared shell for the id-based link resolvers: fetch the stored value,
/// fan out over lists, record dependencies for every hit.
fn resolve_linked<F>(
    record: &JsonObject,
    field_key: &str,
    list: bool,
    ctx: &ResolveContext<'_>,
    find: F,
) -> Resolved
where
    F: Fn(&JsonValue) -> Option<Node>,
{
    let Some(field_value) = record.get(field_key) else {
        return Resolved::Null;
    };
    if list {
        let Some(items) = field_value.as_array() else {
            return Resolved::Null;
        };
        let nodes = items
            .iter()
            .map(|item| {
                let node = find(item);
                if let Some(node) = &node {
                    ctx.record_dependency(&node.id);
                }
                node
            })
            .collect();
        Resolved::Nodes(nodes)
    } else {
        match find(field_value) {
            Some(node) => {
                ctx.record_dependency(&node.id);
                Resolved::Node(node)
            }
            None => Resolved::Null,
        }
    }
}

fn find_mapped_node(value: &JsonValue, target_type: &str, ctx: &ResolveContext<'_>) -> Option<Node> {
    let id = value.as_str()?;
    ctx.store
        .get_nodes()
        .into_iter()
        .find(|n| n.node_type == target_type && n.id == id)
}

fn find_linked_node(
    value: &JsonValue,
    linked_field: Option<&str>,
    ctx: &ResolveContext<'_>,
) -> Option<Node> {
    match linked_field {
        Some(sub_field) => ctx
            .store
            .get_nodes()
            .into_iter()
            .find(|n| n.get(sub_field).as_ref() == Some(value)),
        None => value.as_str().and_then(|id| ctx.store.get_node(id)),
    }
}

fn resolve_file_link(record: &JsonObject, field_name: &str, ctx: &ResolveContext<'_>) -> Resolved {
    let Some(field_value) = record.get(field_name).and_then(JsonValue::as_str) else {
        return Resolved::Null;
    };
    let Some(parent_id) = record.get("parent").and_then(JsonValue::as_str) else {
        return Resolved::Null;
    };

    // The owning node is assumed to be the child of a File node (markdown
    // parsed out of a file, say); its directory anchors the relative path.
    let parent_file = ctx
        .store
        .get_nodes()
        .into_iter()
        .find(|n| n.node_type == "File" && n.id == parent_id);
    let Some(dir) = parent_file
        .as_ref()
        .and_then(|f| f.fields.get("dir"))
        .and_then(JsonValue::as_str)
    else {
        return Resolved::Null;
    };

    let link_path = normalize_join(dir, field_value);
    let linked = ctx.store.get_nodes().into_iter().find(|n| {
        n.node_type == "File"
            && n.fields.get("absolutePath").and_then(JsonValue::as_str) == Some(link_path.as_str())
    });
    match linked {
        Some(node) => {
            ctx.record_dependency(&node.id);
            Resolved::Node(node)
        }
        None => Resolved::Null,
    }
}

/// Extensions the file-link heuristic is willing to follow. Anything else
/// (including bare domains like `example.com`) is treated as opaque text.
static KNOWN_EXTENSIONS: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    [
        "md", "markdown", "mdx", "txt", "rst", "json", "yaml", "yml", "toml", "csv", "tsv",
        "xml", "html", "htm", "css", "js", "ts", "png", "jpg", "jpeg", "gif", "svg", "webp",
        "ico", "bmp", "pdf", "mp3", "mp4", "wav", "ogg", "webm", "woff", "woff2", "ttf",
    ]
    .into_iter()
    .collect()
});

/// Whether a value plausibly points at a file in the corpus: a relative,
/// non-URL string with a known extension.
pub(super) fn should_infer_file(value: &JsonValue) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    !s.is_empty() && has_known_extension(s) && is_relative_path(s) && !is_url(s)
}

fn has_known_extension(s: &str) -> bool {
    let name = s.rsplit(['/', '\\']).next().unwrap_or(s);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            KNOWN_EXTENSIONS.contains(ext.to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}

fn is_relative_path(s: &str) -> bool {
    if s.starts_with('/') || s.starts_with('\\') {
        return false;
    }
    // Windows drive prefix, e.g. C:\ or C:/
    let bytes = s.as_bytes();
    !(bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\'))
}

fn is_url(s: &str) -> bool {
    s.starts_with("//")
        || Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:")
            .map(|re| re.is_match(s))
            .unwrap_or(false)
}

/// Lexically join a directory and a relative path, normalizing `.`/`..`
/// components and backslashes.
fn normalize_join(dir: &str, rel: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in dir.split(['/', '\\']).chain(rel.split(['/', '\\'])) {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    let prefix = if dir.starts_with('/') { "/" } else { "" };
    format!("{prefix}{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!("images/photo.png"), true; "relative image")]
    #[test_case(json!("./notes.md"), true; "dot relative markdown")]
    #[test_case(json!("../assets/logo.svg"), true; "parent relative")]
    #[test_case(json!("/etc/config.yaml"), false; "absolute path")]
    #[test_case(json!("C:\\files\\doc.pdf"), false; "windows absolute")]
    #[test_case(json!("https://example.com/a.png"), false; "url")]
    #[test_case(json!("//cdn.example.com/a.png"), false; "protocol relative url")]
    #[test_case(json!("example.com"), false; "bare domain")]
    #[test_case(json!("program.xyzzy"), false; "unknown extension")]
    #[test_case(json!("noextension"), false; "no extension")]
    #[test_case(json!(42), false; "not a string")]
    fn test_should_infer_file(value: serde_json::Value, expected: bool) {
        assert_eq!(should_infer_file(&value), expected);
    }

    #[test]
    fn test_normalize_join() {
        assert_eq!(
            normalize_join("/content/posts", "images/pic.png"),
            "/content/posts/images/pic.png"
        );
        assert_eq!(
            normalize_join("/content/posts", "../images/pic.png"),
            "/content/images/pic.png"
        );
        assert_eq!(
            normalize_join("/content", "./pic.png"),
            "/content/pic.png"
        );
        assert_eq!(
            normalize_join("C:\\content", "pic.png"),
            "C:/content/pic.png"
        );
    }
}

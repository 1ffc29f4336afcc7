//! Schema inference tests

use super::*;
use crate::node::Node;
use crate::store::{
    InMemoryNodeStore, PageDependencies, ProcessedType, ResolveContext, SiteConfig, TypeRegistry,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn thing(id: &str, fields: serde_json::Value) -> Node {
    let mut node = Node::new(id, "Thing");
    if let serde_json::Value::Object(map) = fields {
        node.fields = map;
    }
    node
}

fn build(nodes: &[Node]) -> InferredObject {
    let store = InMemoryNodeStore::new(nodes.to_vec());
    build_with(nodes, &store, &TypeRegistry::new(), &SiteConfig::new())
}

fn build_with(
    nodes: &[Node],
    store: &InMemoryNodeStore,
    registry: &TypeRegistry,
    config: &SiteConfig,
) -> InferredObject {
    SchemaBuilder::new(nodes, store, registry, config)
        .unwrap()
        .build()
}

fn registry_with(names: &[&str]) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    for name in names {
        registry.declare(*name);
    }
    registry
}

// ============================================================================
// Output structure
// ============================================================================

#[test]
fn test_flat_records_infer_scalar_kinds() {
    let nodes = vec![
        thing("1", json!({"a": 1, "b": "x", "c": true, "d": 1.5})),
        thing("2", json!({"a": 2, "b": "y", "c": false, "d": 2.5})),
    ];

    let inferred = build(&nodes);

    assert_eq!(inferred.name, "Thing");
    assert_eq!(inferred.fields.len(), 4);
    assert_eq!(inferred.fields["a"].type_ref, TypeRef::Int);
    assert_eq!(inferred.fields["b"].type_ref, TypeRef::String);
    assert_eq!(inferred.fields["c"].type_ref, TypeRef::Boolean);
    assert_eq!(inferred.fields["d"].type_ref, TypeRef::Float);
    assert!(inferred.warnings.is_empty());
}

#[test]
fn test_reserved_root_keys_are_skipped() {
    // A field bag can carry reserved keys when nodes are built by hand;
    // they still never reach the root schema.
    let nodes = vec![thing("1", json!({"id": "x", "type": "y", "title": "t"}))];

    let inferred = build(&nodes);

    assert_eq!(inferred.fields.keys().collect::<Vec<_>>(), vec!["title"]);
}

#[test]
fn test_null_and_empty_fields_are_omitted() {
    let nodes = vec![
        thing("1", json!({"ghost": null, "empty": [], "real": 1})),
        thing("2", json!({"ghost": null})),
    ];

    let inferred = build(&nodes);

    assert!(!inferred.fields.contains_key("ghost"));
    assert!(!inferred.fields.contains_key("empty"));
    assert!(inferred.fields.contains_key("real"));
}

#[test]
fn test_list_fields_wrap_head_element_type() {
    let nodes = vec![thing("1", json!({"tags": ["a", "b"], "scores": [1, 2]}))];

    let inferred = build(&nodes);

    assert_eq!(
        inferred.fields["tags"].type_ref,
        TypeRef::List(Box::new(TypeRef::String))
    );
    assert_eq!(
        inferred.fields["scores"].type_ref,
        TypeRef::List(Box::new(TypeRef::Int))
    );
}

#[test]
fn test_nested_object_named_from_selector_path() {
    let nodes = vec![thing(
        "1",
        json!({"frontmatter": {"title": "x", "meta": {"draft": true}}}),
    )];

    let inferred = build(&nodes);

    let TypeRef::Object(frontmatter) = &inferred.fields["frontmatter"].type_ref else {
        panic!("expected object type");
    };
    assert_eq!(frontmatter.name, "ThingFrontmatter");
    assert_eq!(frontmatter.fields["title"].type_ref, TypeRef::String);

    let TypeRef::Object(meta) = &frontmatter.fields["meta"].type_ref else {
        panic!("expected nested object type");
    };
    assert_eq!(meta.name, "ThingFrontmatterMeta");
    assert_eq!(meta.fields["draft"].type_ref, TypeRef::Boolean);
}

#[test]
fn test_list_of_objects_builds_named_element_type() {
    let nodes = vec![thing("1", json!({"links": [{"url": "a", "weight": 1}]}))];

    let inferred = build(&nodes);

    let TypeRef::List(element) = &inferred.fields["links"].type_ref else {
        panic!("expected list type");
    };
    let TypeRef::Object(links) = element.as_ref() else {
        panic!("expected object element type");
    };
    assert_eq!(links.name, "ThingLinks");
    assert_eq!(links.fields["url"].type_ref, TypeRef::String);
    assert_eq!(links.fields["weight"].type_ref, TypeRef::Int);
}

#[test]
fn test_date_field_carries_formatting_args() {
    let nodes = vec![thing("1", json!({"date": "2019-01-01"}))];

    let inferred = build(&nodes);

    let field = &inferred.fields["date"];
    assert_eq!(field.type_ref, TypeRef::Date);
    let arg_names: Vec<_> = field.args.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(arg_names, vec!["formatString", "fromNow", "difference"]);
    assert!(matches!(
        field.resolver,
        Some(FieldResolver::Date { ref field_name }) if field_name == "date"
    ));
}

#[test]
fn test_numeric_kind_follows_representative_example() {
    // The first record's value decides int-vs-float; later records never
    // promote the kind.
    let nodes = vec![
        thing("1", json!({"score": 1})),
        thing("2", json!({"score": 1.5})),
    ];
    assert_eq!(build(&nodes).fields["score"].type_ref, TypeRef::Int);

    let nodes = vec![
        thing("1", json!({"score": 1.5})),
        thing("2", json!({"score": 1})),
    ];
    assert_eq!(build(&nodes).fields["score"].type_ref, TypeRef::Float);
}

#[test]
fn test_build_is_idempotent() {
    let nodes = vec![thing(
        "1",
        json!({"a": 1, "nested": {"b": "x"}, "tags": ["y"]}),
    )];

    let first = build(&nodes);
    let second = build(&nodes);

    assert_eq!(first.fields, second.fields);
    assert_eq!(first.name, second.name);
}

// ============================================================================
// Relationship strategies
// ============================================================================

#[test]
fn test_mapping_links_field_to_target_type() {
    let nodes = vec![thing("1", json!({"author": "auth1"}))];
    let mut store = InMemoryNodeStore::new(nodes.clone());
    store.push(Node::new("auth1", "Author").with_field("name", json!("Ada")));
    let registry = registry_with(&["Author"]);
    let config = SiteConfig::new().with_mapping("Thing.author", "Author");

    let inferred = build_with(&nodes, &store, &registry, &config);

    let field = &inferred.fields["author"];
    assert_eq!(field.type_ref, TypeRef::Node("Author".to_string()));
    assert!(matches!(
        field.resolver,
        Some(FieldResolver::Mapping { ref target_type, list: false, .. }) if target_type == "Author"
    ));
    assert!(inferred.warnings.is_empty());
}

#[test]
fn test_mapping_list_value_wraps_in_list() {
    let nodes = vec![thing("1", json!({"authors": ["auth1", "auth2"]}))];
    let store = InMemoryNodeStore::new(nodes.clone());
    let registry = registry_with(&["Author"]);
    let config = SiteConfig::new().with_mapping("Thing.authors", "Author");

    let inferred = build_with(&nodes, &store, &registry, &config);

    assert_eq!(
        inferred.fields["authors"].type_ref,
        TypeRef::List(Box::new(TypeRef::Node("Author".to_string())))
    );
}

#[test]
fn test_mapping_to_unknown_type_warns_and_omits() {
    let nodes = vec![thing("1", json!({"author": "auth1"}))];
    let store = InMemoryNodeStore::new(nodes.clone());
    let config = SiteConfig::new().with_mapping("Thing.author", "Author");

    let inferred = build_with(&nodes, &store, &TypeRegistry::new(), &config);

    assert!(!inferred.fields.contains_key("author"));
    assert_eq!(
        inferred.warnings,
        vec![InferenceWarning::UnknownMappingType {
            selector: "Thing.author".to_string(),
            target: "Author".to_string(),
        }]
    );
}

#[test]
fn test_node_link_by_id_uses_linked_node_type() {
    let nodes = vec![thing("1", json!({"photo___NODE": "file123"}))];
    let mut store = InMemoryNodeStore::new(nodes.clone());
    store.push(Node::new("file123", "File"));
    let registry = registry_with(&["File"]);

    let inferred = build_with(&nodes, &store, &registry, &SiteConfig::new());

    // Stored under the cleaned key.
    assert!(!inferred.fields.contains_key("photo___NODE"));
    let field = &inferred.fields["photo"];
    assert_eq!(field.type_ref, TypeRef::Node("File".to_string()));
    assert!(matches!(
        field.resolver,
        Some(FieldResolver::NodeLink { ref field_key, linked_field: None, list: false })
            if field_key == "photo___NODE"
    ));
}

#[test]
fn test_node_link_by_sub_field() {
    let nodes = vec![thing("1", json!({"author___NODE___email": "ada@example.com"}))];
    let mut store = InMemoryNodeStore::new(nodes.clone());
    store.push(Node::new("auth1", "Author").with_field("email", json!("ada@example.com")));
    let registry = registry_with(&["Author"]);

    let inferred = build_with(&nodes, &store, &registry, &SiteConfig::new());

    let field = &inferred.fields["author"];
    assert_eq!(field.type_ref, TypeRef::Node("Author".to_string()));
    assert!(matches!(
        field.resolver,
        Some(FieldResolver::NodeLink { linked_field: Some(ref sub), .. }) if sub == "email"
    ));
}

#[test]
fn test_node_link_list_wraps_in_list() {
    let nodes = vec![thing("1", json!({"photos___NODE": ["f1", "f2"]}))];
    let mut store = InMemoryNodeStore::new(nodes.clone());
    store.push(Node::new("f1", "File"));
    store.push(Node::new("f2", "File"));
    let registry = registry_with(&["File"]);

    let inferred = build_with(&nodes, &store, &registry, &SiteConfig::new());

    assert_eq!(
        inferred.fields["photos"].type_ref,
        TypeRef::List(Box::new(TypeRef::Node("File".to_string())))
    );
}

#[test]
fn test_node_link_to_missing_node_warns_and_omits() {
    let nodes = vec![thing("1", json!({"photo___NODE": "nope"}))];
    let store = InMemoryNodeStore::new(nodes.clone());

    let inferred = build_with(&nodes, &store, &TypeRegistry::new(), &SiteConfig::new());

    assert!(inferred.fields.is_empty());
    assert_eq!(
        inferred.warnings,
        vec![InferenceWarning::UnresolvedNodeLink {
            key: "photo___NODE".to_string(),
        }]
    );
}

#[test]
fn test_node_link_to_unregistered_type_warns_and_omits() {
    let nodes = vec![thing("1", json!({"photo___NODE": "file123"}))];
    let mut store = InMemoryNodeStore::new(nodes.clone());
    store.push(Node::new("file123", "File"));

    let inferred = build_with(&nodes, &store, &TypeRegistry::new(), &SiteConfig::new());

    assert!(inferred.fields.is_empty());
    assert_eq!(
        inferred.warnings,
        vec![InferenceWarning::UnknownLinkedType {
            key: "photo___NODE".to_string(),
            node_type: "File".to_string(),
        }]
    );
}

#[test]
fn test_file_path_field_links_to_file_type() {
    let nodes = vec![thing("1", json!({"cover": "images/cover.png"}))];
    let store = InMemoryNodeStore::new(nodes.clone());
    let registry = registry_with(&["File"]);

    let inferred = build_with(&nodes, &store, &registry, &SiteConfig::new());

    let field = &inferred.fields["cover"];
    assert_eq!(field.type_ref, TypeRef::Node("File".to_string()));
    assert!(matches!(
        field.resolver,
        Some(FieldResolver::FileLink { ref field_name }) if field_name == "cover"
    ));
}

#[test]
fn test_file_path_without_file_type_warns_and_omits() {
    let nodes = vec![thing("1", json!({"cover": "images/cover.png"}))];
    let store = InMemoryNodeStore::new(nodes.clone());

    let inferred = build_with(&nodes, &store, &TypeRegistry::new(), &SiteConfig::new());

    assert!(!inferred.fields.contains_key("cover"));
    assert_eq!(
        inferred.warnings,
        vec![InferenceWarning::MissingFileType {
            key: "cover".to_string(),
        }]
    );
}

#[test]
fn test_file_nodes_never_file_link_their_own_fields() {
    let nodes = vec![Node::new("f1", "File").with_field("relativePath", json!("a/b.md"))];
    let store = InMemoryNodeStore::new(nodes.clone());
    let registry = registry_with(&["File"]);

    let inferred = build_with(&nodes, &store, &registry, &SiteConfig::new());

    // Falls through to plain string inference.
    assert_eq!(inferred.fields["relativePath"].type_ref, TypeRef::String);
}

#[test]
fn test_mapping_takes_priority_over_node_link() {
    let nodes = vec![thing("1", json!({"author___NODE": "auth1"}))];
    let mut store = InMemoryNodeStore::new(nodes.clone());
    store.push(Node::new("auth1", "Contributor"));
    let registry = registry_with(&["Author", "Contributor"]);
    let config = SiteConfig::new().with_mapping("Thing.author___NODE", "Author");

    let inferred = build_with(&nodes, &store, &registry, &config);

    assert_eq!(
        inferred.fields["author"].type_ref,
        TypeRef::Node("Author".to_string())
    );
}

// ============================================================================
// Input structure
// ============================================================================

fn build_input(nodes: &[Node]) -> InferredInputObject {
    InputBuilder::new(nodes).unwrap().build()
}

fn operator_names(field: &InputField) -> Vec<String> {
    match &field.type_ref {
        InputTypeRef::Object(obj) => obj.fields.keys().cloned().collect(),
        other => panic!("expected operator object, got {other:?}"),
    }
}

#[test]
fn test_string_field_operators() {
    let input = build_input(&[thing("1", json!({"name": "x"}))]);

    assert_eq!(
        operator_names(&input.fields["name"]),
        vec!["eq", "glob", "ne", "regex"]
    );
    let InputTypeRef::Object(obj) = &input.fields["name"].type_ref else {
        panic!("expected object");
    };
    assert_eq!(obj.name, "ThingNameQueryString");
}

#[test]
fn test_numeric_and_boolean_field_operators() {
    let input = build_input(&[thing("1", json!({"age": 30, "ratio": 0.5, "on": true}))]);

    assert_eq!(operator_names(&input.fields["age"]), vec!["eq", "ne"]);
    assert_eq!(operator_names(&input.fields["ratio"]), vec!["eq", "ne"]);
    assert_eq!(operator_names(&input.fields["on"]), vec!["eq", "ne"]);

    let InputTypeRef::Object(obj) = &input.fields["age"].type_ref else {
        panic!("expected object");
    };
    assert_eq!(obj.name, "ThingAgeQueryNumber");
    let InputTypeRef::Object(obj) = &input.fields["ratio"].type_ref else {
        panic!("expected object");
    };
    assert_eq!(obj.name, "ThingRatioQueryFloat");
}

#[test]
fn test_list_field_adds_in_operator() {
    let input = build_input(&[thing("1", json!({"tags": ["a"], "scores": [1, 2]}))]);

    let tag_ops = operator_names(&input.fields["tags"]);
    assert_eq!(tag_ops, vec!["eq", "glob", "in", "ne", "regex"]);

    let InputTypeRef::Object(scores) = &input.fields["scores"].type_ref else {
        panic!("expected object");
    };
    assert_eq!(scores.name, "ThingScoresQueryList");
    assert_eq!(
        scores.fields["in"].type_ref,
        InputTypeRef::List(Box::new(InputTypeRef::Scalar(ScalarKind::Int)))
    );
}

#[test]
fn test_date_field_filters_as_string() {
    let input = build_input(&[thing("1", json!({"date": "2019-01-01"}))]);

    assert_eq!(
        operator_names(&input.fields["date"]),
        vec!["eq", "glob", "ne", "regex"]
    );
}

#[test]
fn test_nested_object_recurses_into_input_object() {
    let input = build_input(&[thing("1", json!({"meta": {"title": "x"}}))]);

    let InputTypeRef::Object(meta) = &input.fields["meta"].type_ref else {
        panic!("expected object");
    };
    assert_eq!(meta.name, "ThingMetaInputObject");
    assert_eq!(
        operator_names(&meta.fields["title"]),
        vec!["eq", "glob", "ne", "regex"]
    );
    // sortBy only appears at the root.
    assert!(!meta.fields.contains_key("sortBy"));
}

#[test]
fn test_node_link_key_kept_raw_with_clean_prefix() {
    let input = build_input(&[thing("1", json!({"author___NODE": "auth1"}))]);

    let InputTypeRef::Object(obj) = &input.fields["author___NODE"].type_ref else {
        panic!("expected object");
    };
    assert_eq!(obj.name, "ThingAuthorQueryString");
}

#[test]
fn test_root_sort_by_enumerates_leaf_paths() {
    let input = build_input(&[
        thing("1", json!({"a": 1, "nested": {"x": "s"}})),
        thing("2", json!({"b": true})),
    ]);

    let InputTypeRef::Object(sort_by) = &input.fields["sortBy"].type_ref else {
        panic!("expected object");
    };
    assert_eq!(sort_by.name, "thingSortBy");

    let InputTypeRef::NonNull(fields_list) = &sort_by.fields["fields"].type_ref else {
        panic!("expected non-null");
    };
    let InputTypeRef::List(element) = fields_list.as_ref() else {
        panic!("expected list");
    };
    let InputTypeRef::Enum(sort_enum) = element.as_ref() else {
        panic!("expected enum");
    };
    assert_eq!(sort_enum.name, "ThingSortByFieldsEnum");
    assert_eq!(sort_enum.values, vec!["a", "b", "id", "nested.x", "type"]);

    let order = &sort_by.fields["order"];
    assert_eq!(order.default_value, Some(json!("asc")));
    let InputTypeRef::Enum(order_enum) = &order.type_ref else {
        panic!("expected enum");
    };
    assert_eq!(order_enum.values, vec!["asc", "desc"]);
}

#[test]
fn test_root_input_keeps_id_and_type_filterable() {
    let input = build_input(&[thing("1", json!({"title": "x"})).with_parent("p1")]);

    // Identity keys filter like any string field; traversal keys do not.
    assert_eq!(
        operator_names(&input.fields["id"]),
        vec!["eq", "glob", "ne", "regex"]
    );
    assert_eq!(
        operator_names(&input.fields["type"]),
        vec!["eq", "glob", "ne", "regex"]
    );
    assert!(!input.fields.contains_key("parent"));
    assert!(!input.fields.contains_key("children"));
}

#[test]
fn test_input_build_is_idempotent() {
    let nodes = vec![thing("1", json!({"a": 1, "nested": {"b": "x"}}))];
    assert_eq!(build_input(&nodes).fields, build_input(&nodes).fields);
}

// ============================================================================
// Resolvers
// ============================================================================

#[test]
fn test_date_resolver_formats_and_passes_through() {
    let node = thing("1", json!({"date": "2019-01-01"}));
    let store = InMemoryNodeStore::new(vec![node.clone()]);
    let tracker = PageDependencies::new();
    let ctx = ResolveContext::new(&store, &tracker, None);
    let resolver = FieldResolver::Date {
        field_name: "date".to_string(),
    };
    let record = node.to_record();

    let formatted = resolver.resolve(&record, json!({"formatString": "YYYY"}).as_object().unwrap(), &ctx);
    assert_eq!(formatted, Resolved::Value(json!("2019")));

    // The stored value is returned unmodified without arguments.
    let raw = resolver.resolve(&record, &crate::types::JsonObject::new(), &ctx);
    assert_eq!(raw, Resolved::Value(json!("2019-01-01")));
    assert_eq!(record["date"], json!("2019-01-01"));
}

#[test]
fn test_mapping_resolver_scans_type_and_id() {
    let node = thing("1", json!({"author": "auth1"}));
    let author = Node::new("auth1", "Author").with_field("name", json!("Ada"));
    // A same-id node of another type must not shadow the target.
    let decoy = Node::new("auth1", "Decoy");
    let store = InMemoryNodeStore::new(vec![node.clone(), decoy, author.clone()]);
    let tracker = PageDependencies::new();
    let ctx = ResolveContext::new(&store, &tracker, Some("/things/1/"));
    let resolver = FieldResolver::Mapping {
        field_name: "author".to_string(),
        target_type: "Author".to_string(),
        list: false,
    };

    let resolved = resolver.resolve(&node.to_record(), &crate::types::JsonObject::new(), &ctx);

    assert_eq!(resolved, Resolved::Node(author));
    assert_eq!(
        tracker.dependencies(),
        vec![("/things/1/".to_string(), "auth1".to_string())]
    );
}

#[test]
fn test_node_link_resolver_list_keeps_holes_for_dangling_ids() {
    let node = thing("1", json!({"photos___NODE": ["f1", "missing"]}));
    let file = Node::new("f1", "File");
    let store = InMemoryNodeStore::new(vec![node.clone(), file.clone()]);
    let tracker = PageDependencies::new();
    let ctx = ResolveContext::new(&store, &tracker, Some("/p/"));
    let resolver = FieldResolver::NodeLink {
        field_key: "photos___NODE".to_string(),
        linked_field: None,
        list: true,
    };

    let resolved = resolver.resolve(&node.to_record(), &crate::types::JsonObject::new(), &ctx);

    assert_eq!(resolved, Resolved::Nodes(vec![Some(file), None]));
    assert_eq!(tracker.dependencies().len(), 1);
}

#[test]
fn test_file_link_resolver_joins_parent_dir() {
    let node = thing("1", json!({"cover": "../images/cover.png"})).with_parent("f-src");
    let source_file = Node::new("f-src", "File")
        .with_field("dir", json!("/site/content/posts"))
        .with_field("absolutePath", json!("/site/content/posts/hello.md"));
    let image_file = Node::new("f-img", "File")
        .with_field("absolutePath", json!("/site/content/images/cover.png"));
    let store = InMemoryNodeStore::new(vec![node.clone(), source_file, image_file.clone()]);
    let tracker = PageDependencies::new();
    let ctx = ResolveContext::new(&store, &tracker, Some("/p/"));
    let resolver = FieldResolver::FileLink {
        field_name: "cover".to_string(),
    };

    let resolved = resolver.resolve(&node.to_record(), &crate::types::JsonObject::new(), &ctx);

    assert_eq!(resolved, Resolved::Node(image_file));
    assert_eq!(
        tracker.dependencies(),
        vec![("/p/".to_string(), "f-img".to_string())]
    );
}

#[test]
fn test_dangling_references_resolve_to_null() {
    let node = thing("1", json!({"author": "nope", "cover": "x.png"}));
    let store = InMemoryNodeStore::new(vec![node.clone()]);
    let tracker = PageDependencies::new();
    let ctx = ResolveContext::new(&store, &tracker, Some("/p/"));
    let record = node.to_record();
    let empty = crate::types::JsonObject::new();

    let mapping = FieldResolver::Mapping {
        field_name: "author".to_string(),
        target_type: "Author".to_string(),
        list: false,
    };
    assert_eq!(mapping.resolve(&record, &empty, &ctx), Resolved::Null);

    let file_link = FieldResolver::FileLink {
        field_name: "cover".to_string(),
    };
    assert_eq!(file_link.resolve(&record, &empty, &ctx), Resolved::Null);

    assert!(tracker.dependencies().is_empty());
}

#[test]
fn test_registry_declared_self_reference_resolves() {
    // A type whose records link to other records of the same type can be
    // built after a forward declaration.
    let nodes = vec![
        thing("1", json!({"related___NODE": "2"})),
        thing("2", json!({"related___NODE": "1"})),
    ];
    let store = InMemoryNodeStore::new(nodes.clone());
    let mut registry = TypeRegistry::new();
    registry.declare("Thing");

    let inferred = build_with(&nodes, &store, &registry, &SiteConfig::new());

    assert_eq!(
        inferred.fields["related"].type_ref,
        TypeRef::Node("Thing".to_string())
    );
    assert!(inferred.warnings.is_empty());

    registry.define(ProcessedType {
        name: "Thing".to_string(),
        object_type: inferred.into_object_type(),
    });
    assert!(!registry.get("Thing").unwrap().object_type.fields.is_empty());
}

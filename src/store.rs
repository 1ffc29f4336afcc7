//! External collaborators the inference core reads from
//!
//! The node store, dependency tracker, site configuration and type registry
//! are passed into the builders as explicit context objects. The in-memory
//! implementations here back the tests and small embeddings; real hosts
//! implement the traits over their own storage.

use crate::node::Node;
use crate::schema::ObjectType;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// Read-only access to the full node corpus
pub trait NodeStore {
    /// Look up a node by identifier
    fn get_node(&self, id: &str) -> Option<Node>;

    /// All nodes in the corpus, every type included
    fn get_nodes(&self) -> Vec<Node>;
}

/// Simple vector-backed node store
#[derive(Debug, Clone, Default)]
pub struct InMemoryNodeStore {
    nodes: Vec<Node>,
}

impl InMemoryNodeStore {
    /// Create a store over the given nodes
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Add a node to the store
    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// All nodes of one record type
    pub fn nodes_of_type(&self, node_type: &str) -> Vec<Node> {
        self.nodes
            .iter()
            .filter(|n| n.node_type == node_type)
            .cloned()
            .collect()
    }
}

impl NodeStore for InMemoryNodeStore {
    fn get_node(&self, id: &str) -> Option<Node> {
        self.nodes.iter().find(|n| n.id == id).cloned()
    }

    fn get_nodes(&self) -> Vec<Node> {
        self.nodes.clone()
    }
}

/// Records that a query executed at `path` depends on a node, for cache
/// invalidation. Fire-and-forget; duplicate calls must be tolerated.
pub trait DependencyTracker {
    /// Record one (path, node) dependency
    fn add_page_dependency(&self, path: &str, node_id: &str);
}

/// In-memory dependency tracker, append-only and idempotent per
/// (path, node) pair
#[derive(Debug, Default)]
pub struct PageDependencies {
    deps: Mutex<BTreeSet<(String, String)>>,
}

impl PageDependencies {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded (path, node) pairs
    pub fn dependencies(&self) -> Vec<(String, String)> {
        match self.deps.lock() {
            Ok(set) => set.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl DependencyTracker for PageDependencies {
    fn add_page_dependency(&self, path: &str, node_id: &str) {
        if let Ok(mut set) = self.deps.lock() {
            set.insert((path.to_string(), node_id.to_string()));
        }
    }
}

/// Site configuration consumed by inference
///
/// `mapping` declares manual field-to-type links keyed by fully-qualified
/// selector, e.g. `"MarkdownRemark.frontmatter.author" -> "AuthorYaml"`.
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    /// Manual selector-to-type mapping
    pub mapping: BTreeMap<String, String>,
}

impl SiteConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping rule
    #[must_use]
    pub fn with_mapping(mut self, selector: impl Into<String>, target: impl Into<String>) -> Self {
        self.mapping.insert(selector.into(), target.into());
        self
    }
}

/// A record type whose output object type has been built
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedType {
    /// The record-type name, e.g. `File`
    pub name: String,
    /// The inferred output object type
    pub object_type: ObjectType,
}

/// Registry of processed record types
///
/// Populated once per record type per build pass and treated as read-only
/// by inference. A type can be declared before its build completes so that
/// links back to the type under construction still resolve.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, ProcessedType>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward-declare a record type with an empty object type
    pub fn declare(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.types.entry(name.clone()).or_insert(ProcessedType {
            object_type: ObjectType::empty(&name),
            name,
        });
    }

    /// Register (or replace) a fully-built record type
    pub fn define(&mut self, processed: ProcessedType) {
        self.types.insert(processed.name.clone(), processed);
    }

    /// Look up a processed type by record-type name
    pub fn get(&self, name: &str) -> Option<&ProcessedType> {
        self.types.get(name)
    }

    /// Whether a record type is known
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }
}

/// Everything a field resolver needs at query time
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    /// The full node corpus
    pub store: &'a dyn NodeStore,
    /// Dependency sink for cache invalidation
    pub tracker: &'a dyn DependencyTracker,
    /// The query path dependencies are recorded against, when known
    pub path: Option<&'a str>,
}

impl<'a> ResolveContext<'a> {
    /// Create a context for a query executing at `path`
    pub fn new(
        store: &'a dyn NodeStore,
        tracker: &'a dyn DependencyTracker,
        path: Option<&'a str>,
    ) -> Self {
        Self {
            store,
            tracker,
            path,
        }
    }

    /// Record a dependency on `node_id` when a query path is known
    pub fn record_dependency(&self, node_id: &str) {
        if let Some(path) = self.path {
            self.tracker.add_page_dependency(path, node_id);
        }
    }
}

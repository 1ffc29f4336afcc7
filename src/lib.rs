//! # nodeforge
//!
//! Query-schema inference for loosely-typed content-node graphs.
//!
//! Given a heterogeneous collection of content records ("nodes"), nodeforge
//! infers the types a query layer needs without an authored schema: output
//! object types, filter/sort input types, and the relationships between
//! record types implied by naming conventions, explicit mappings, or file
//! paths.
//!
//! ## Quick Start
//!
//! ```rust
//! use nodeforge::{
//!     InMemoryNodeStore, InputBuilder, Node, SchemaBuilder, SiteConfig, TypeRegistry,
//! };
//! use serde_json::json;
//!
//! let nodes = vec![
//!     Node::new("1", "Article")
//!         .with_field("title", json!("Hello"))
//!         .with_field("date", json!("2019-01-01")),
//!     Node::new("2", "Article").with_field("title", json!("World")),
//! ];
//! let store = InMemoryNodeStore::new(nodes.clone());
//! let registry = TypeRegistry::new();
//! let config = SiteConfig::new();
//!
//! let output = SchemaBuilder::new(&nodes, &store, &registry, &config)
//!     .expect("non-empty node set")
//!     .build();
//! assert!(output.fields.contains_key("title"));
//! assert!(output.fields.contains_key("date"));
//!
//! let input = InputBuilder::new(&nodes).expect("non-empty node set").build();
//! assert!(input.fields.contains_key("sortBy"));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │              SchemaBuilder / InputBuilder                  │
//! │   one call per record type → field name to descriptor      │
//! └────────────────────────────────────────────────────────────┘
//!                              │
//! ┌───────────┬───────────────┴──────────┬────────────────────┐
//! │ Example   │ Relationship strategies  │ Shape inference    │
//! ├───────────┼──────────────────────────┼────────────────────┤
//! │ merge     │ config mapping           │ scalars            │
//! │ records   │ ___NODE convention       │ ISO 8601 dates     │
//! │ per field │ file-path heuristic      │ lists, objects     │
//! └───────────┴──────────────────────────┴────────────────────┘
//! ```
//!
//! Schema building is pure, synchronous, in-memory computation. Resolvers
//! attached to fields run later, at query time, against explicit context
//! objects ([`ResolveContext`]).

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

/// Error types
pub mod error;

/// Common types and the value-kind classification
pub mod types;

/// Content node model
pub mod node;

/// External collaborators: node store, dependency tracker, config, registry
pub mod store;

/// Example-value extraction across records
pub mod example;

/// Calendar-format detection and date formatting
pub mod dates;

/// Schema inference (output and input builders)
pub mod schema;

pub use error::{Error, Result};
pub use node::Node;
pub use schema::{
    FieldDescriptor, FieldResolver, InferenceWarning, InferredInputObject, InferredObject,
    InputBuilder, ObjectType, Resolved, SchemaBuilder, TypeRef,
};
pub use store::{
    DependencyTracker, InMemoryNodeStore, NodeStore, PageDependencies, ProcessedType,
    ResolveContext, SiteConfig, TypeRegistry,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Schema inference
//!
//! Turns a record type's nodes into an output object type (what queries
//! read) and an input object type (how queries filter and sort), detecting
//! implicit relationships between records along the way.
//!
//! # Features
//!
//! - **Shape Inference**: scalars, dates, lists and nested objects from
//!   example values
//! - **Relationship Detection**: explicit config mappings, `___NODE`
//!   naming convention, relative-file-path heuristic
//! - **Filter Schemas**: per-kind comparison operators plus a generated
//!   sort enum
//! - **Structured Diagnostics**: non-fatal inference warnings returned
//!   alongside the schema

mod infer;
mod input;
mod relations;
mod typename;
mod types;

pub use infer::{InferredObject, SchemaBuilder};
pub use input::{InferredInputObject, InputBuilder};
pub use typename::create_type_name;
pub use types::{
    EnumType, FieldArgument, FieldDescriptor, FieldResolver, InferenceWarning, InputField,
    InputObjectType, InputTypeRef, ObjectType, Resolved, ScalarKind, SortOrder, TypeRef,
};

#[cfg(test)]
mod tests;

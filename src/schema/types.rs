//! Inferred schema types
//!
//! Output types describe the shape queries read; input types describe the
//! filter/sort arguments queries accept. Both are plain data so a schema
//! build is comparable and serializable; resolution logic lives on
//! [`FieldResolver`] value objects instead of captured closures.

use crate::types::JsonValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Scalar kinds usable as argument and operator types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Boolean,
    String,
    Int,
    Float,
}

/// An output type reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeRef {
    Boolean,
    String,
    Int,
    Float,
    /// A string field carrying date formatting arguments
    Date,
    /// A homogeneous list of the inner type
    List(Box<TypeRef>),
    /// A nested object type, named from its selector path
    Object(ObjectType),
    /// A reference to a processed record type, by name
    Node(String),
}

impl TypeRef {
    /// Wrap in a list type
    pub fn list(self) -> Self {
        TypeRef::List(Box::new(self))
    }

    /// Wrap in a list when `list` is true
    pub fn list_if(self, list: bool) -> Self {
        if list {
            self.list()
        } else {
            self
        }
    }
}

/// A named output object type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectType {
    /// Unique type name within the schema
    pub name: String,
    /// Field name to descriptor
    pub fields: BTreeMap<String, FieldDescriptor>,
}

impl ObjectType {
    /// An object type with no fields (used for forward declarations)
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }
}

/// One argument accepted by a field at query time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldArgument {
    /// Argument name, e.g. `formatString`
    pub name: String,
    /// Argument scalar kind
    pub kind: ScalarKind,
    /// Optional help text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldArgument {
    /// Create an argument with no description
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
        }
    }

    /// Attach help text
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Inference output for one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// The field's output type
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Arguments the field accepts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<FieldArgument>,
    /// How the field's value is produced at read time, when it is not a
    /// plain stored value
    #[serde(skip)]
    pub resolver: Option<FieldResolver>,
}

impl FieldDescriptor {
    /// A plain stored-value field of the given type
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            args: Vec::new(),
            resolver: None,
        }
    }

    /// Attach a resolver
    #[must_use]
    pub fn with_resolver(mut self, resolver: FieldResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Attach arguments
    #[must_use]
    pub fn with_args(mut self, args: Vec<FieldArgument>) -> Self {
        self.args = args;
        self
    }
}

/// Read-time resolution strategy for a field.
///
/// Each variant holds exactly the parameters its strategy captured during
/// inference; the record and collaborator context arrive explicitly at
/// resolve time.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldResolver {
    /// Reformat a stored calendar string on demand
    Date {
        /// Field holding the raw stored value
        field_name: String,
    },
    /// Follow an explicit selector-to-type mapping from the site config
    Mapping {
        /// Field holding the referenced identifier(s)
        field_name: String,
        /// The mapped record type
        target_type: String,
        /// Whether the field holds a list of identifiers
        list: bool,
    },
    /// Follow a `___NODE` naming-convention link
    NodeLink {
        /// The raw field key, marker included
        field_key: String,
        /// Sub-field to match instead of the node identifier, when the key
        /// carried one (`author___NODE___email`)
        linked_field: Option<String>,
        /// Whether the field holds a list of identifiers
        list: bool,
    },
    /// Follow a relative file path to the `File` node it points at
    FileLink {
        /// Field holding the relative path
        field_name: String,
    },
}

/// A value produced by a field resolver
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Nothing found; queries see null
    Null,
    /// A plain value (dates, raw passthrough)
    Value(JsonValue),
    /// A single linked node
    Node(crate::node::Node),
    /// A list of linked nodes; unresolved entries stay as holes
    Nodes(Vec<Option<crate::node::Node>>),
}

/// A generated enumeration (sort fields, sort order)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumType {
    /// Unique type name within the schema
    pub name: String,
    /// Enum values in deterministic order
    pub values: Vec<String>,
}

/// Sort direction, ascending by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// An input (filter/sort) type reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InputTypeRef {
    Scalar(ScalarKind),
    List(Box<InputTypeRef>),
    NonNull(Box<InputTypeRef>),
    Enum(EnumType),
    Object(Box<InputObjectType>),
}

impl InputTypeRef {
    /// Wrap in a list type
    pub fn list(self) -> Self {
        InputTypeRef::List(Box::new(self))
    }

    /// Wrap in a non-null type
    pub fn non_null(self) -> Self {
        InputTypeRef::NonNull(Box::new(self))
    }
}

/// A named input object type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputObjectType {
    /// Unique type name within the schema
    pub name: String,
    /// Field name to input field
    pub fields: BTreeMap<String, InputField>,
}

/// One field of an input object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputField {
    /// The field's input type
    #[serde(rename = "type")]
    pub type_ref: InputTypeRef,
    /// Default applied when the query omits the field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
}

impl InputField {
    /// An input field with no default
    pub fn new(type_ref: InputTypeRef) -> Self {
        Self {
            type_ref,
            default_value: None,
        }
    }

    /// Attach a default value
    #[must_use]
    pub fn with_default(mut self, default_value: JsonValue) -> Self {
        self.default_value = Some(default_value);
        self
    }
}

/// Non-fatal problems observed while inferring a type.
///
/// Inference never aborts a build over a single field; it records one of
/// these, emits a `tracing` diagnostic and omits the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceWarning {
    /// A configured mapping points at a record type the registry does not
    /// know
    UnknownMappingType {
        /// The fully-qualified field selector
        selector: String,
        /// The missing target type
        target: String,
    },
    /// A `___NODE` field's example value did not resolve to any node
    UnresolvedNodeLink {
        /// The raw field key
        key: String,
    },
    /// A `___NODE` field resolved to a node whose type the registry does
    /// not know
    UnknownLinkedType {
        /// The raw field key
        key: String,
        /// The linked node's record type
        node_type: String,
    },
    /// A field looks like a file path but no `File` type is registered
    MissingFileType {
        /// The field key
        key: String,
    },
}

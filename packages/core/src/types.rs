//! Shape data types.
//!
//! A [`Shape`] is an immutable node of the model graph: an id, a kind, a
//! map of applied traits, and the source location it was defined at. The
//! kind is a closed sum type ([`ShapeKind`]); every dispatch over it is an
//! exhaustive `match`, so adding a kind is a compile error everywhere a kind
//! matters.
//!
//! Shapes reference each other only by [`ShapeId`]. Member shapes are stored
//! as shapes of their own in the [`ShapeIndex`](crate::ShapeIndex); a
//! container only records the ordered names of its members.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::prelude;
use crate::shape_id::ShapeId;

/// The value document attached to a shape for a trait.
pub type TraitValue = serde_json::Value;

/// Where a shape or event was defined. Used for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(filename: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            filename: filename.into(),
            line,
            column,
        }
    }

    /// The location used when a shape was not read from a file.
    pub fn none() -> Self {
        Self::new("N/A", 0, 0)
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// An operation: optional input and output structures plus the errors it
/// may return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<ShapeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<ShapeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ShapeId>,
}

/// A resource: lifecycle operation bindings plus the operations and
/// sub-resources bound to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<ShapeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<ShapeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<ShapeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<ShapeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ShapeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<ShapeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<ShapeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ShapeId>,
}

impl ResourceShape {
    /// Lifecycle bindings that are set, as `(lifecycle name, operation id)`
    /// pairs in create/read/update/delete/list/put order.
    pub fn lifecycle_bindings(&self) -> Vec<(&'static str, &ShapeId)> {
        [
            ("create", &self.create),
            ("read", &self.read),
            ("update", &self.update),
            ("delete", &self.delete),
            ("list", &self.list),
            ("put", &self.put),
        ]
        .into_iter()
        .filter_map(|(name, id)| id.as_ref().map(|id| (name, id)))
        .collect()
    }
}

/// A service: the root of an API, binding operations and resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceShape {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<ShapeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ShapeId>,
}

/// The kind of a shape and the kind-specific data it carries.
///
/// Serialized with the kind name in a `type` field next to the kind's own
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShapeKind {
    Blob,
    Boolean,
    String,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Timestamp,
    Document,
    /// Ordered member names; each member is a shape `Name$member`.
    Structure {
        #[serde(default)]
        members: Vec<String>,
    },
    Union {
        #[serde(default)]
        members: Vec<String>,
    },
    /// Always has exactly one member named `member`.
    List,
    /// Always has exactly one member named `member`.
    Set,
    /// Always has exactly two members, `key` and `value`.
    Map,
    Member {
        target: ShapeId,
    },
    Operation(OperationShape),
    Resource(ResourceShape),
    Service(ServiceShape),
}

impl ShapeKind {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeKind::Blob => ShapeType::Blob,
            ShapeKind::Boolean => ShapeType::Boolean,
            ShapeKind::String => ShapeType::String,
            ShapeKind::Byte => ShapeType::Byte,
            ShapeKind::Short => ShapeType::Short,
            ShapeKind::Integer => ShapeType::Integer,
            ShapeKind::Long => ShapeType::Long,
            ShapeKind::Float => ShapeType::Float,
            ShapeKind::Double => ShapeType::Double,
            ShapeKind::BigInteger => ShapeType::BigInteger,
            ShapeKind::BigDecimal => ShapeType::BigDecimal,
            ShapeKind::Timestamp => ShapeType::Timestamp,
            ShapeKind::Document => ShapeType::Document,
            ShapeKind::Structure { .. } => ShapeType::Structure,
            ShapeKind::Union { .. } => ShapeType::Union,
            ShapeKind::List => ShapeType::List,
            ShapeKind::Set => ShapeType::Set,
            ShapeKind::Map => ShapeType::Map,
            ShapeKind::Member { .. } => ShapeType::Member,
            ShapeKind::Operation(_) => ShapeType::Operation,
            ShapeKind::Resource(_) => ShapeType::Resource,
            ShapeKind::Service(_) => ShapeType::Service,
        }
    }
}

/// Broad grouping of shape types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeCategory {
    /// No children.
    Simple,
    /// Structure or union: any number of individually removable members.
    Container,
    /// List, set, or map: structurally required members.
    Collection,
    Member,
    /// Operation, resource, or service.
    Service,
}

/// Fieldless discriminant of [`ShapeKind`], used to query shapes by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeType {
    Blob,
    Boolean,
    String,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Timestamp,
    Document,
    Structure,
    Union,
    List,
    Set,
    Map,
    Member,
    Operation,
    Resource,
    Service,
}

impl ShapeType {
    pub const ALL: [ShapeType; 22] = [
        ShapeType::Blob,
        ShapeType::Boolean,
        ShapeType::String,
        ShapeType::Byte,
        ShapeType::Short,
        ShapeType::Integer,
        ShapeType::Long,
        ShapeType::Float,
        ShapeType::Double,
        ShapeType::BigInteger,
        ShapeType::BigDecimal,
        ShapeType::Timestamp,
        ShapeType::Document,
        ShapeType::Structure,
        ShapeType::Union,
        ShapeType::List,
        ShapeType::Set,
        ShapeType::Map,
        ShapeType::Member,
        ShapeType::Operation,
        ShapeType::Resource,
        ShapeType::Service,
    ];

    pub fn category(self) -> ShapeCategory {
        match self {
            ShapeType::Structure | ShapeType::Union => ShapeCategory::Container,
            ShapeType::List | ShapeType::Set | ShapeType::Map => ShapeCategory::Collection,
            ShapeType::Member => ShapeCategory::Member,
            ShapeType::Operation | ShapeType::Resource | ShapeType::Service => {
                ShapeCategory::Service
            }
            ShapeType::Blob
            | ShapeType::Boolean
            | ShapeType::String
            | ShapeType::Byte
            | ShapeType::Short
            | ShapeType::Integer
            | ShapeType::Long
            | ShapeType::Float
            | ShapeType::Double
            | ShapeType::BigInteger
            | ShapeType::BigDecimal
            | ShapeType::Timestamp
            | ShapeType::Document => ShapeCategory::Simple,
        }
    }

    /// The name used in model files, e.g. `"bigInteger"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeType::Blob => "blob",
            ShapeType::Boolean => "boolean",
            ShapeType::String => "string",
            ShapeType::Byte => "byte",
            ShapeType::Short => "short",
            ShapeType::Integer => "integer",
            ShapeType::Long => "long",
            ShapeType::Float => "float",
            ShapeType::Double => "double",
            ShapeType::BigInteger => "bigInteger",
            ShapeType::BigDecimal => "bigDecimal",
            ShapeType::Timestamp => "timestamp",
            ShapeType::Document => "document",
            ShapeType::Structure => "structure",
            ShapeType::Union => "union",
            ShapeType::List => "list",
            ShapeType::Set => "set",
            ShapeType::Map => "map",
            ShapeType::Member => "member",
            ShapeType::Operation => "operation",
            ShapeType::Resource => "resource",
            ShapeType::Service => "service",
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a [`ShapeType`] from its model-file name.
impl FromStr for ShapeType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown shape type {s:?}"))
    }
}

/// A node of the model graph.
///
/// Shapes are values: the `with_*`/`without_*` methods return modified
/// copies and never touch a shape that is already part of an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    id: ShapeId,
    #[serde(flatten)]
    kind: ShapeKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    traits: BTreeMap<ShapeId, TraitValue>,
    #[serde(default)]
    source_location: SourceLocation,
}

impl Shape {
    pub fn new(id: ShapeId, kind: ShapeKind) -> Self {
        Self {
            id,
            kind,
            traits: BTreeMap::new(),
            source_location: SourceLocation::none(),
        }
    }

    /// A member shape `container$name` targeting `target`.
    pub fn member(container: &ShapeId, name: &str, target: ShapeId) -> Result<Self, crate::ShapeIdError> {
        Ok(Self::new(container.with_member(name)?, ShapeKind::Member { target }))
    }

    /// Apply (or replace) a trait.
    pub fn with_trait(mut self, trait_id: ShapeId, value: TraitValue) -> Self {
        self.traits.insert(trait_id, value);
        self
    }

    pub fn with_source_location(mut self, location: SourceLocation) -> Self {
        self.source_location = location;
        self
    }

    /// A copy of this shape without the given trait applications.
    pub fn without_traits<'a>(&self, trait_ids: impl IntoIterator<Item = &'a ShapeId>) -> Self {
        let mut shape = self.clone();
        for id in trait_ids {
            shape.traits.remove(id);
        }
        shape
    }

    /// A copy of this container without the named members, remaining members
    /// keeping their relative order. Non-container shapes are returned as is.
    pub fn without_members(&self, names: &[&str]) -> Self {
        let mut shape = self.clone();
        if let ShapeKind::Structure { members } | ShapeKind::Union { members } = &mut shape.kind {
            members.retain(|m| !names.contains(&m.as_str()));
        }
        shape
    }

    pub fn id(&self) -> &ShapeId {
        &self.id
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn shape_type(&self) -> ShapeType {
        self.kind.shape_type()
    }

    pub fn category(&self) -> ShapeCategory {
        self.shape_type().category()
    }

    pub fn traits(&self) -> &BTreeMap<ShapeId, TraitValue> {
        &self.traits
    }

    pub fn source_location(&self) -> &SourceLocation {
        &self.source_location
    }

    pub fn has_trait(&self, trait_id: &ShapeId) -> bool {
        self.traits.contains_key(trait_id)
    }

    pub fn find_trait(&self, trait_id: &ShapeId) -> Option<&TraitValue> {
        self.traits.get(trait_id)
    }

    /// True when the shape may be applied as a trait.
    pub fn is_trait_definition(&self) -> bool {
        self.has_trait(&prelude::TRAIT)
    }

    pub fn is_member(&self) -> bool {
        matches!(self.kind, ShapeKind::Member { .. })
    }

    /// The target of a member shape.
    pub fn target(&self) -> Option<&ShapeId> {
        match &self.kind {
            ShapeKind::Member { target } => Some(target),
            _ => None,
        }
    }

    /// Names of the members this shape declares, in declaration order.
    ///
    /// Lists and sets always declare `member`, maps `key` and `value`.
    pub fn member_names(&self) -> Vec<&str> {
        match &self.kind {
            ShapeKind::Structure { members } | ShapeKind::Union { members } => {
                members.iter().map(String::as_str).collect()
            }
            ShapeKind::List | ShapeKind::Set => vec!["member"],
            ShapeKind::Map => vec!["key", "value"],
            _ => Vec::new(),
        }
    }

    /// Ids of the members this shape declares, in declaration order.
    pub fn member_ids(&self) -> Vec<ShapeId> {
        self.member_names()
            .into_iter()
            .filter_map(|name| self.id.with_member(name).ok())
            .collect()
    }

    pub fn as_operation(&self) -> Option<&OperationShape> {
        match &self.kind {
            ShapeKind::Operation(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&ResourceShape> {
        match &self.kind {
            ShapeKind::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceShape> {
        match &self.kind {
            ShapeKind::Service(s) => Some(s),
            _ => None,
        }
    }
}

// --- tests -------------------------------------------------------------------

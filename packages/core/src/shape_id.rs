//! Structured shape identity: `namespace#Name[$member]`.
//!
//! Shapes never point at each other directly. Every edge in the graph is a
//! [`ShapeId`] that is resolved through the owning [`ShapeIndex`](crate::ShapeIndex).

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string is not a valid absolute shape id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeIdError {
    #[error("shape id must be of the form namespace#Name[$member], got: {0:?}")]
    Malformed(String),

    #[error("invalid member name {member:?} for shape {shape}")]
    InvalidMember { shape: String, member: String },
}

/// Identity of a shape. When `member` is present the id names a member of
/// the shape `namespace#name`.
///
/// Ordering is lexicographic over `(namespace, name, member)`, with the
/// container sorting before its members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShapeId {
    namespace: String,
    name: String,
    member: Option<String>,
}

impl ShapeId {
    /// Build an id from already-separated parts, validating each of them.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        member: Option<&str>,
    ) -> Result<Self, ShapeIdError> {
        let namespace = namespace.into();
        let name = name.into();
        let rendered = match member {
            Some(m) => format!("{namespace}#{name}${m}"),
            None => format!("{namespace}#{name}"),
        };
        rendered.parse()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    pub fn has_member(&self) -> bool {
        self.member.is_some()
    }

    /// The id of the member `member` of this shape.
    ///
    /// Any existing member part is replaced.
    pub fn with_member(&self, member: &str) -> Result<ShapeId, ShapeIdError> {
        if !IDENTIFIER_RE.is_match(member) {
            return Err(ShapeIdError::InvalidMember {
                shape: self.container_id().to_string(),
                member: member.to_string(),
            });
        }
        Ok(ShapeId {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: Some(member.to_string()),
        })
    }

    /// This id with the member part removed; for a member id, the id of the
    /// shape that contains it.
    pub fn container_id(&self) -> ShapeId {
        ShapeId {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: None,
        }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(m) => write!(f, "{}#{}${}", self.namespace, self.name, m),
            None => write!(f, "{}#{}", self.namespace, self.name),
        }
    }
}

impl FromStr for ShapeId {
    type Err = ShapeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = SHAPE_ID_RE
            .captures(s)
            .ok_or_else(|| ShapeIdError::Malformed(s.to_string()))?;
        Ok(ShapeId {
            namespace: caps["namespace"].to_string(),
            name: caps["name"].to_string(),
            member: caps.name("member").map(|m| m.as_str().to_string()),
        })
    }
}

impl TryFrom<String> for ShapeId {
    type Error = ShapeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&str> for ShapeId {
    type Error = ShapeIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShapeId> for String {
    fn from(id: ShapeId) -> Self {
        id.to_string()
    }
}

// --- grammar -----------------------------------------------------------------

static SHAPE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<namespace>[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)#(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?:\$(?P<member>[A-Za-z_][A-Za-z0-9_]*))?$",
    )
    .expect("invalid shape id regex")
});

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier regex"));

// --- tests -------------------------------------------------------------------

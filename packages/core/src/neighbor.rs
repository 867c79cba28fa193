//! Outward relationships between shapes.
//!
//! [`NeighborProvider`] answers "what does this shape point at?" for a single
//! shape. [`NeighborIndex`] precomputes the answer for a whole model in both
//! directions and is cached on the model as knowledge.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::model::{KnowledgeIndex, Model};
use crate::shape_id::ShapeId;
use crate::types::{Shape, ShapeKind};

/// The kind of edge between two shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationshipType {
    /// A member named `.0` targeting the neighbor.
    Member(String),
    /// The shape has the neighbor applied as a trait.
    Trait,
    Input,
    Output,
    Error,
    Create,
    Read,
    Update,
    Delete,
    List,
    Put,
    /// A resource bound to a service or resource.
    Resource,
    /// An operation bound to a service or resource.
    Operation,
}

impl RelationshipType {
    pub fn label(&self) -> &str {
        match self {
            RelationshipType::Member(name) => name,
            RelationshipType::Trait => "trait",
            RelationshipType::Input => "input",
            RelationshipType::Output => "output",
            RelationshipType::Error => "error",
            RelationshipType::Create => "create",
            RelationshipType::Read => "read",
            RelationshipType::Update => "update",
            RelationshipType::Delete => "delete",
            RelationshipType::List => "list",
            RelationshipType::Put => "put",
            RelationshipType::Resource => "resource",
            RelationshipType::Operation => "operation",
        }
    }

    /// True for the service/resource hierarchy edges: lifecycle bindings and
    /// bound operations or resources.
    pub fn is_containment(&self) -> bool {
        match self {
            RelationshipType::Create
            | RelationshipType::Read
            | RelationshipType::Update
            | RelationshipType::Delete
            | RelationshipType::List
            | RelationshipType::Put
            | RelationshipType::Resource
            | RelationshipType::Operation => true,
            RelationshipType::Member(_)
            | RelationshipType::Trait
            | RelationshipType::Input
            | RelationshipType::Output
            | RelationshipType::Error => false,
        }
    }

    fn lifecycle(name: &str) -> Option<RelationshipType> {
        match name {
            "create" => Some(RelationshipType::Create),
            "read" => Some(RelationshipType::Read),
            "update" => Some(RelationshipType::Update),
            "delete" => Some(RelationshipType::Delete),
            "list" => Some(RelationshipType::List),
            "put" => Some(RelationshipType::Put),
            _ => None,
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A directed edge `shape --rel--> neighbor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relationship {
    pub shape: ShapeId,
    pub rel: RelationshipType,
    pub neighbor: ShapeId,
}

impl Relationship {
    pub fn label(&self) -> &str {
        self.rel.label()
    }
}

/// Computes the outward relationships of shapes within one model.
///
/// Only edges whose neighbor exists in the model are produced, so every
/// [`Relationship::neighbor`] resolves.
#[derive(Debug, Clone, Copy)]
pub struct NeighborProvider<'m> {
    model: &'m Model,
}

impl<'m> NeighborProvider<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Relationships of `shape`, in a stable order: member (or kind-specific)
    /// edges first, then one edge per applied trait.
    pub fn neighbors(&self, shape: &Shape) -> Vec<Relationship> {
        let mut out = Vec::new();
        let mut push = |rel: RelationshipType, neighbor: &ShapeId| {
            if self.model.get_shape(neighbor).is_some() {
                out.push(Relationship {
                    shape: shape.id().clone(),
                    rel,
                    neighbor: neighbor.clone(),
                });
            }
        };

        match shape.kind() {
            ShapeKind::Structure { .. } | ShapeKind::Union { .. } | ShapeKind::List | ShapeKind::Set | ShapeKind::Map => {
                for member in self.model.shape_index().members_of(shape) {
                    if let (Some(name), Some(target)) = (member.id().member(), member.target()) {
                        push(RelationshipType::Member(name.to_string()), target);
                    }
                }
            }
            ShapeKind::Member { target } => {
                if let Some(name) = shape.id().member() {
                    push(RelationshipType::Member(name.to_string()), target);
                }
            }
            ShapeKind::Operation(op) => {
                if let Some(input) = &op.input {
                    push(RelationshipType::Input, input);
                }
                if let Some(output) = &op.output {
                    push(RelationshipType::Output, output);
                }
                for error in &op.errors {
                    push(RelationshipType::Error, error);
                }
            }
            ShapeKind::Resource(resource) => {
                for (name, operation) in resource.lifecycle_bindings() {
                    if let Some(rel) = RelationshipType::lifecycle(name) {
                        push(rel, operation);
                    }
                }
                for operation in &resource.operations {
                    push(RelationshipType::Operation, operation);
                }
                for child in &resource.resources {
                    push(RelationshipType::Resource, child);
                }
            }
            ShapeKind::Service(service) => {
                for operation in &service.operations {
                    push(RelationshipType::Operation, operation);
                }
                for resource in &service.resources {
                    push(RelationshipType::Resource, resource);
                }
            }
            ShapeKind::Blob
            | ShapeKind::Boolean
            | ShapeKind::String
            | ShapeKind::Byte
            | ShapeKind::Short
            | ShapeKind::Integer
            | ShapeKind::Long
            | ShapeKind::Float
            | ShapeKind::Double
            | ShapeKind::BigInteger
            | ShapeKind::BigDecimal
            | ShapeKind::Timestamp
            | ShapeKind::Document => {}
        }

        for trait_id in shape.traits().keys() {
            push(RelationshipType::Trait, trait_id);
        }

        out
    }
}

/// Every relationship of a model, indexed by source and by neighbor.
#[derive(Debug, Default)]
pub struct NeighborIndex {
    outgoing: BTreeMap<ShapeId, Vec<Relationship>>,
    incoming: HashMap<ShapeId, Vec<Relationship>>,
}

impl NeighborIndex {
    /// Relationships leaving `id`.
    pub fn neighbors(&self, id: &ShapeId) -> &[Relationship] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Relationships arriving at `id`.
    pub fn referrers(&self, id: &ShapeId) -> &[Relationship] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl KnowledgeIndex for NeighborIndex {
    fn build(model: &Model) -> Self {
        let provider = NeighborProvider::new(model);
        let mut index = NeighborIndex::default();
        for shape in model.shape_index().shapes() {
            let rels = provider.neighbors(shape);
            for rel in &rels {
                index
                    .incoming
                    .entry(rel.neighbor.clone())
                    .or_default()
                    .push(rel.clone());
            }
            index.outgoing.insert(shape.id().clone(), rels);
        }
        index
    }
}

// --- tests -------------------------------------------------------------------

//! Reachability-based removal sets.
//!
//! A marker seeds shapes to remove. The sweep then repeatedly adds every
//! shape whose referrers are all marked, until nothing changes. A keep
//! predicate protects shapes from ever being part of the result.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::model::Model;
use crate::neighbor::{NeighborIndex, Relationship, RelationshipType};
use crate::shape_id::ShapeId;
use crate::types::{Shape, ShapeCategory};

/// Handed to the marker to seed the removal set.
pub struct MarkerContext<'m> {
    model: &'m Model,
    marked: BTreeSet<ShapeId>,
}

impl<'m> MarkerContext<'m> {
    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Mark a shape for removal. Ids not in the model are ignored.
    pub fn mark_shape(&mut self, id: &ShapeId) {
        if self.model.get_shape(id).is_some() {
            self.marked.insert(id.clone());
        }
    }

    pub fn is_marked(&self, id: &ShapeId) -> bool {
        self.marked.contains(id)
    }

    pub fn marked(&self) -> &BTreeSet<ShapeId> {
        &self.marked
    }
}

/// Computes removal sets for one marker and keep predicate.
pub struct MarkAndSweep<M, K> {
    marker: M,
    keep: K,
}

impl<M, K> MarkAndSweep<M, K>
where
    M: FnMut(&mut MarkerContext<'_>),
    K: Fn(&Shape) -> bool,
{
    /// `keep(shape) == true` means the shape must never be removed, even if
    /// the marker marked it.
    pub fn new(marker: M, keep: K) -> Self {
        Self { marker, keep }
    }

    /// The ids of every shape to remove from `model`.
    ///
    /// Member shapes are never swept on their own: they go with their
    /// container, and their relationships count as the container's.
    pub fn mark_and_sweep(&mut self, model: &Model) -> BTreeSet<ShapeId> {
        let mut context = MarkerContext {
            model,
            marked: BTreeSet::new(),
        };
        (self.marker)(&mut context);
        let seeded = context.marked.len();

        // Protected shapes leave the set up front so nothing they reference is
        // swept on their behalf.
        let keep = &self.keep;
        let mut marked: BTreeSet<ShapeId> = context
            .marked
            .into_iter()
            .filter(|id| model.get_shape(id).map_or(false, |shape| !keep(shape)))
            .collect();

        let neighbors = model.knowledge::<NeighborIndex>();
        let mut rounds = 0;
        loop {
            rounds += 1;
            let mut swept = Vec::new();
            for shape in model.shape_index().shapes() {
                let id = shape.id();
                if shape.is_member() || marked.contains(id) || keep(shape) {
                    continue;
                }
                let referrers = neighbors.referrers(id);
                let orphaned = !referrers.is_empty() && referrers.iter().all(|rel| from_marked(model, &marked, rel));
                if orphaned {
                    trace!(shape = %id, "only referenced by marked shapes");
                    swept.push(id.clone());
                }
            }
            if swept.is_empty() {
                break;
            }
            marked.extend(swept);
        }

        debug!(seeded, removed = marked.len(), rounds, "mark and sweep finished");
        marked
    }
}

/// Whether `rel` originates in the marked set. A structure or union's edge to
/// a member target belongs to that member, so marking the member alone is
/// enough.
fn from_marked(model: &Model, marked: &BTreeSet<ShapeId>, rel: &Relationship) -> bool {
    if marked.contains(&rel.shape) || marked.contains(&rel.shape.container_id()) {
        return true;
    }
    let RelationshipType::Member(name) = &rel.rel else {
        return false;
    };
    let removable_member = model
        .get_shape(&rel.shape)
        .is_some_and(|shape| shape.category() == ShapeCategory::Container);
    removable_member
        && rel
            .shape
            .with_member(name)
            .is_ok_and(|member| marked.contains(&member))
}

// --- tests -------------------------------------------------------------------

use std::collections::BTreeSet;

use crate::neighbor::{NeighborProvider, Relationship};
use crate::shape_id::ShapeId;
use crate::types::Shape;

/// Reachability over a model's relationships.
///
/// Traversal is iterative with an explicit visited set, so cyclic graphs
/// terminate and every shape is expanded once. Reaching a container also
/// reaches its member shapes.
pub struct Walker<'m> {
    provider: NeighborProvider<'m>,
    follow: Box<dyn Fn(&Relationship) -> bool + 'm>,
}

impl<'m> Walker<'m> {
    /// A walker following every relationship.
    pub fn new(provider: NeighborProvider<'m>) -> Self {
        Self::with_filter(provider, |_| true)
    }

    /// A walker following only relationships accepted by `follow`.
    pub fn with_filter(provider: NeighborProvider<'m>, follow: impl Fn(&Relationship) -> bool + 'm) -> Self {
        Self {
            provider,
            follow: Box::new(follow),
        }
    }

    /// Ids of every shape reachable from `start`, `start` included.
    pub fn walk(&self, start: &Shape) -> BTreeSet<ShapeId> {
        let model = self.provider.model();
        let mut visited: BTreeSet<ShapeId> = BTreeSet::new();
        let mut stack: Vec<ShapeId> = Vec::new();

        visited.insert(start.id().clone());
        self.expand(start, &visited, &mut stack);

        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Some(shape) = model.get_shape(&id) {
                self.expand(shape, &visited, &mut stack);
            }
        }

        visited
    }

    /// Every shape reachable from `start`, in id order.
    ///
    /// `start` is included when it belongs to the walked model.
    pub fn walk_shapes(&self, start: &Shape) -> Vec<&'m Shape> {
        let model = self.provider.model();
        self.walk(start)
            .iter()
            .filter_map(|id| model.get_shape(id))
            .collect()
    }

    fn expand(&self, shape: &Shape, visited: &BTreeSet<ShapeId>, stack: &mut Vec<ShapeId>) {
        for rel in self.provider.neighbors(shape) {
            if (self.follow)(&rel) && !visited.contains(&rel.neighbor) {
                stack.push(rel.neighbor);
            }
        }
        for member in shape.member_ids() {
            if !visited.contains(&member) {
                stack.push(member);
            }
        }
    }
}

// --- tests -------------------------------------------------------------------

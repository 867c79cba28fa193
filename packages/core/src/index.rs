use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::error::InvariantViolation;
use crate::shape_id::ShapeId;
use crate::types::{Shape, ShapeType};

/// The authoritative `ShapeId -> Shape` mapping of a model.
///
/// An index is immutable and always consistent: every member shape belongs
/// to a container that declares it, and every member a container declares
/// is present. Consistency is checked once, at construction. Shapes are
/// held behind [`Arc`] so indexes derived from this one share every shape
/// they do not change.
///
/// Iteration is in id order.
#[derive(Debug, Clone, Default)]
pub struct ShapeIndex {
    shapes: BTreeMap<ShapeId, Arc<Shape>>,
}

impl ShapeIndex {
    /// Build an index from a complete shape set.
    pub fn new(shapes: impl IntoIterator<Item = Shape>) -> Result<Self, InvariantViolation> {
        let mut map = BTreeMap::new();
        for shape in shapes {
            let id = shape.id().clone();
            if map.insert(id.clone(), Arc::new(shape)).is_some() {
                return Err(InvariantViolation::DuplicateShape(id));
            }
        }
        check_members(&map)?;
        Ok(Self { shapes: map })
    }

    /// Wrap shapes derived from a consistent index by a transform that
    /// preserves consistency. Checked in debug builds only.
    pub(crate) fn assume_consistent(shapes: BTreeMap<ShapeId, Arc<Shape>>) -> Self {
        debug_assert_eq!(check_members(&shapes), Ok(()));
        Self { shapes }
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id).map(Arc::as_ref)
    }

    pub(crate) fn get_shared(&self, id: &ShapeId) -> Option<&Arc<Shape>> {
        self.shapes.get(id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    /// Total number of shapes, members included.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Every shape in the index.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.shapes.values().map(Arc::as_ref)
    }

    pub(crate) fn shared_shapes(&self) -> impl Iterator<Item = (&ShapeId, &Arc<Shape>)> + '_ {
        self.shapes.iter()
    }

    /// Every shape of the given type.
    pub fn shapes_of_kind(&self, shape_type: ShapeType) -> impl Iterator<Item = &Shape> + '_ {
        self.shapes().filter(move |s| s.shape_type() == shape_type)
    }

    /// The member shapes of `shape`, in declaration order.
    pub fn members_of(&self, shape: &Shape) -> Vec<&Shape> {
        shape
            .member_ids()
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }
}

// Each member points at a container declaring it; each container's declared
// members all exist.
fn check_members(shapes: &BTreeMap<ShapeId, Arc<Shape>>) -> Result<(), InvariantViolation> {
    for (id, shape) in shapes {
        match (shape.is_member(), id.member()) {
            (true, None) => return Err(InvariantViolation::MemberWithoutMemberName(id.clone())),
            (false, Some(_)) => return Err(InvariantViolation::UnexpectedMemberName(id.clone())),
            (true, Some(name)) => {
                let container_id = id.container_id();
                let container = shapes
                    .get(&container_id)
                    .ok_or_else(|| InvariantViolation::OrphanedMember(id.clone()))?;
                if !container.member_names().contains(&name) {
                    return Err(InvariantViolation::UndeclaredMember {
                        container: container_id,
                        member: id.clone(),
                    });
                }
            }
            (false, None) => {
                let mut seen = HashSet::new();
                for name in shape.member_names() {
                    if !seen.insert(name) {
                        return Err(InvariantViolation::DuplicateMember {
                            container: id.clone(),
                            member: name.to_string(),
                        });
                    }
                    let member_id = id.with_member(name).map_err(|_| {
                        InvariantViolation::InvalidMemberName {
                            container: id.clone(),
                            member: name.to_string(),
                        }
                    })?;
                    if !shapes.contains_key(&member_id) {
                        return Err(InvariantViolation::MissingMember {
                            container: id.clone(),
                            member: name.to_string(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

// --- tests -------------------------------------------------------------------

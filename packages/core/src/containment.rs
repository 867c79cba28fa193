//! Top-down view of the service/resource hierarchy.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::model::{KnowledgeIndex, Model};
use crate::neighbor::NeighborProvider;
use crate::shape_id::ShapeId;
use crate::types::ShapeType;
use crate::walker::Walker;

static EMPTY: BTreeSet<ShapeId> = BTreeSet::new();

/// For every service and resource, the resources and operations it contains
/// transitively through bindings (lifecycle operations, bound operations,
/// bound resources).
///
/// Obtain it through [`Model::containment_index`], which builds it once per
/// model.
#[derive(Debug, Default)]
pub struct ContainmentIndex {
    resources: BTreeMap<ShapeId, BTreeSet<ShapeId>>,
    operations: BTreeMap<ShapeId, BTreeSet<ShapeId>>,
}

impl ContainmentIndex {
    /// Every resource contained by `id`; empty when `id` is unknown or
    /// contains nothing.
    pub fn contained_resources(&self, id: &ShapeId) -> &BTreeSet<ShapeId> {
        self.resources.get(id).unwrap_or(&EMPTY)
    }

    /// Every operation contained by `id`; empty when `id` is unknown or
    /// contains nothing.
    pub fn contained_operations(&self, id: &ShapeId) -> &BTreeSet<ShapeId> {
        self.operations.get(id).unwrap_or(&EMPTY)
    }
}

impl KnowledgeIndex for ContainmentIndex {
    fn build(model: &Model) -> Self {
        let walker = Walker::with_filter(NeighborProvider::new(model), |rel| rel.rel.is_containment());
        let index = model.shape_index();
        let mut out = ContainmentIndex::default();

        let containers = index
            .shapes_of_kind(ShapeType::Service)
            .chain(index.shapes_of_kind(ShapeType::Resource));
        for container in containers {
            let mut resources = BTreeSet::new();
            let mut operations = BTreeSet::new();
            for shape in walker.walk_shapes(container) {
                if shape.id() == container.id() {
                    continue;
                }
                match shape.shape_type() {
                    ShapeType::Resource => {
                        resources.insert(shape.id().clone());
                    }
                    ShapeType::Operation => {
                        operations.insert(shape.id().clone());
                    }
                    _ => {}
                }
            }
            out.resources.insert(container.id().clone(), resources);
            out.operations.insert(container.id().clone(), operations);
        }

        debug!(containers = out.resources.len(), "built containment index");
        out
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OperationShape, ResourceShape, ServiceShape, Shape, ShapeKind};

    fn id(s: &str) -> ShapeId {
        s.parse().unwrap()
    }

    fn ids(list: &[&str]) -> BTreeSet<ShapeId> {
        list.iter().map(|s| id(s)).collect()
    }

    fn service(name: &str, resources: &[&str]) -> Shape {
        Shape::new(
            id(name),
            ShapeKind::Service(ServiceShape {
                version: "1".into(),
                operations: vec![],
                resources: resources.iter().map(|s| id(s)).collect(),
            }),
        )
    }

    fn operation(name: &str) -> Shape {
        Shape::new(id(name), ShapeKind::Operation(OperationShape::default()))
    }

    #[test]
    fn finds_direct_children() {
        let m = Model::from_shapes(vec![
            service("ns.foo#Service", &["ns.foo#Resource"]),
            Shape::new(id("ns.foo#Resource"), ShapeKind::Resource(ResourceShape::default())),
        ])
        .unwrap();
        let index = m.containment_index();
        assert!(index.contained_operations(&id("ns.foo#Service")).is_empty());
        assert_eq!(index.contained_resources(&id("ns.foo#Service")), &ids(&["ns.foo#Resource"]));
        assert!(index.contained_operations(&id("ns.foo#Resource")).is_empty());
        assert!(index.contained_resources(&id("ns.foo#Resource")).is_empty());
    }

    #[test]
    fn finds_all_children() {
        let m = Model::from_shapes(vec![
            service("ns.foo#Service", &["ns.foo#A"]),
            Shape::new(
                id("ns.foo#A"),
                ShapeKind::Resource(ResourceShape {
                    list: Some(id("ns.foo#List")),
                    resources: vec![id("ns.foo#B")],
                    ..Default::default()
                }),
            ),
            Shape::new(
                id("ns.foo#B"),
                ShapeKind::Resource(ResourceShape {
                    operations: vec![id("ns.foo#Operation")],
                    ..Default::default()
                }),
            ),
            operation("ns.foo#Operation"),
            operation("ns.foo#List"),
        ])
        .unwrap();
        let index = m.containment_index();

        assert_eq!(index.contained_resources(&id("ns.foo#Service")), &ids(&["ns.foo#A", "ns.foo#B"]));
        assert_eq!(
            index.contained_operations(&id("ns.foo#Service")),
            &ids(&["ns.foo#Operation", "ns.foo#List"])
        );
        assert_eq!(index.contained_resources(&id("ns.foo#A")), &ids(&["ns.foo#B"]));
        assert_eq!(
            index.contained_operations(&id("ns.foo#A")),
            &ids(&["ns.foo#Operation", "ns.foo#List"])
        );
        assert!(index.contained_resources(&id("ns.foo#B")).is_empty());
        assert_eq!(index.contained_operations(&id("ns.foo#B")), &ids(&["ns.foo#Operation"]));
        assert!(index.contained_operations(&id("ns.foo#Operation")).is_empty());
        assert!(index.contained_resources(&id("ns.foo#Operation")).is_empty());
        assert!(index.contained_resources(&id("ns.foo#NotThere")).is_empty());
        assert!(index.contained_operations(&id("ns.foo#NotThere")).is_empty());
    }

    #[test]
    fn operation_inputs_are_not_contained() {
        let m = Model::from_shapes(vec![
            Shape::new(
                id("ns.foo#Service"),
                ShapeKind::Service(ServiceShape {
                    version: "1".into(),
                    operations: vec![id("ns.foo#Op")],
                    resources: vec![],
                }),
            ),
            Shape::new(
                id("ns.foo#Op"),
                ShapeKind::Operation(OperationShape {
                    input: Some(id("ns.foo#Nested")),
                    ..Default::default()
                }),
            ),
            // reachable only through an input edge
            Shape::new(
                id("ns.foo#Nested"),
                ShapeKind::Resource(ResourceShape::default()),
            ),
        ])
        .unwrap();
        let index = m.containment_index();
        assert_eq!(index.contained_operations(&id("ns.foo#Service")), &ids(&["ns.foo#Op"]));
        assert!(index.contained_resources(&id("ns.foo#Service")).is_empty());
    }

    #[test]
    fn cyclic_resources_do_not_contain_themselves() {
        let m = Model::from_shapes(vec![
            Shape::new(
                id("ns.foo#A"),
                ShapeKind::Resource(ResourceShape {
                    resources: vec![id("ns.foo#B")],
                    ..Default::default()
                }),
            ),
            Shape::new(
                id("ns.foo#B"),
                ShapeKind::Resource(ResourceShape {
                    resources: vec![id("ns.foo#A")],
                    ..Default::default()
                }),
            ),
        ])
        .unwrap();
        let index = m.containment_index();
        assert_eq!(index.contained_resources(&id("ns.foo#A")), &ids(&["ns.foo#B"]));
        assert_eq!(index.contained_resources(&id("ns.foo#B")), &ids(&["ns.foo#A"]));
    }

    #[test]
    fn index_is_cached_on_the_model() {
        let m = Model::from_shapes(vec![operation("ns.foo#Op")]).unwrap();
        assert!(std::sync::Arc::ptr_eq(&m.containment_index(), &m.containment_index()));
    }
}

use std::collections::BTreeSet;

use tracing::debug;

use crate::model::Model;
use crate::neighbor::NeighborProvider;
use crate::prelude;
use crate::shape_id::ShapeId;
use crate::types::{Shape, ShapeType};
use crate::walker::Walker;

/// Finds trait definitions that no service uses.
///
/// A trait definition is used when it is applied to any shape reachable from
/// any service. Prelude trait definitions are never reported.
pub struct UnreferencedTraitDefinitions {
    keep: Box<dyn Fn(&Shape) -> bool>,
}

impl Default for UnreferencedTraitDefinitions {
    fn default() -> Self {
        Self::new()
    }
}

impl UnreferencedTraitDefinitions {
    pub fn new() -> Self {
        Self::with_keep_filter(|_| true)
    }

    /// Only used definitions accepted by `keep` are treated as referenced.
    pub fn with_keep_filter(keep: impl Fn(&Shape) -> bool + 'static) -> Self {
        Self { keep: Box::new(keep) }
    }

    /// Ids of the unreferenced trait definitions of `model`.
    pub fn compute(&self, model: &Model) -> BTreeSet<ShapeId> {
        let mut unused: BTreeSet<ShapeId> = model
            .trait_definitions()
            .map(Shape::id)
            .filter(|id| !prelude::is_prelude_shape(id))
            .cloned()
            .collect();

        let walker = Walker::new(NeighborProvider::new(model));
        let mut reached: BTreeSet<ShapeId> = BTreeSet::new();
        for service in model.shape_index().shapes_of_kind(ShapeType::Service) {
            reached.extend(walker.walk(service));
        }

        let applied: BTreeSet<&ShapeId> = reached
            .iter()
            .filter_map(|id| model.get_shape(id))
            .flat_map(|shape| shape.traits().keys())
            .collect();

        for trait_id in applied {
            if let Some(definition) = model.get_shape(trait_id) {
                if (self.keep)(definition) {
                    unused.remove(trait_id);
                }
            }
        }

        debug!(unreferenced = unused.len(), "computed unreferenced trait definitions");
        unused
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OperationShape, ResourceShape, ServiceShape, ShapeKind};
    use serde_json::json;

    fn id(s: &str) -> ShapeId {
        s.parse().unwrap()
    }

    fn trait_def(name: &str) -> Shape {
        Shape::new(id(name), ShapeKind::Structure { members: vec![] })
            .with_trait(prelude::TRAIT.clone(), json!({}))
    }

    fn service(resources: &[&str], operations: &[&str]) -> Shape {
        Shape::new(
            id("ns.foo#Svc"),
            ShapeKind::Service(ServiceShape {
                version: "1".into(),
                operations: operations.iter().map(|s| id(s)).collect(),
                resources: resources.iter().map(|s| id(s)).collect(),
            }),
        )
    }

    #[test]
    fn finds_definitions_not_applied_by_any_service() {
        let m = Model::with_prelude(vec![
            trait_def("ns.foo#bar"),
            trait_def("ns.foo#baz"),
            service(&[], &[]).with_trait(id("ns.foo#bar"), json!({})),
        ])
        .unwrap();
        let unused = UnreferencedTraitDefinitions::new().compute(&m);
        assert_eq!(unused, BTreeSet::from([id("ns.foo#baz")]));
    }

    #[test]
    fn traits_applied_through_containment_and_members_count() {
        let m = Model::with_prelude(vec![
            trait_def("ns.foo#onOp"),
            trait_def("ns.foo#onMember"),
            trait_def("ns.foo#unused"),
            service(&["ns.foo#R"], &[]),
            Shape::new(
                id("ns.foo#R"),
                ShapeKind::Resource(ResourceShape {
                    read: Some(id("ns.foo#Get")),
                    ..Default::default()
                }),
            ),
            Shape::new(
                id("ns.foo#Get"),
                ShapeKind::Operation(OperationShape {
                    input: Some(id("ns.foo#GetInput")),
                    ..Default::default()
                }),
            )
            .with_trait(id("ns.foo#onOp"), json!({})),
            Shape::new(id("ns.foo#GetInput"), ShapeKind::Structure { members: vec!["name".into()] }),
            Shape::member(&id("ns.foo#GetInput"), "name", id("smithy.api#String"))
                .unwrap()
                .with_trait(id("ns.foo#onMember"), json!({})),
        ])
        .unwrap();
        let unused = UnreferencedTraitDefinitions::new().compute(&m);
        assert_eq!(unused, BTreeSet::from([id("ns.foo#unused")]));
    }

    #[test]
    fn traits_used_outside_services_are_unreferenced() {
        let m = Model::with_prelude(vec![
            trait_def("ns.foo#bar"),
            Shape::new(id("ns.foo#Loose"), ShapeKind::String).with_trait(id("ns.foo#bar"), json!({})),
        ])
        .unwrap();
        let unused = UnreferencedTraitDefinitions::new().compute(&m);
        assert_eq!(unused, BTreeSet::from([id("ns.foo#bar")]));
    }

    #[test]
    fn keep_filter_limits_which_uses_count() {
        let m = Model::with_prelude(vec![
            trait_def("ns.foo#bar"),
            trait_def("ns.foo#baz"),
            service(&[], &[])
                .with_trait(id("ns.foo#bar"), json!({}))
                .with_trait(id("ns.foo#baz"), json!({})),
        ])
        .unwrap();
        let finder = UnreferencedTraitDefinitions::with_keep_filter(|shape| shape.id().name() != "baz");
        assert_eq!(finder.compute(&m), BTreeSet::from([id("ns.foo#baz")]));
    }

    #[test]
    fn prelude_definitions_are_never_reported() {
        let m = Model::with_prelude(vec![]).unwrap();
        assert!(UnreferencedTraitDefinitions::new().compute(&m).is_empty());
    }
}

//! Model-to-model transforms.
//!
//! Every transform returns a new [`Model`]; the input is left untouched.
//! Unchanged shapes are shared between the input and output indexes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::index::ShapeIndex;
use crate::mark_and_sweep::{MarkAndSweep, MarkerContext};
use crate::model::Model;
use crate::prelude;
use crate::shape_id::ShapeId;
use crate::types::{Shape, ShapeCategory};

/// Remove the given shapes, keeping the model consistent:
///
/// - removing a structure or union member updates the container's member
///   list, other members keeping their order;
/// - list, set, and map members cannot be removed on their own and are
///   skipped (they go only with their container);
/// - removing a container removes its members;
/// - removing a trait definition removes every application of that trait.
///
/// Ids not present in the model are ignored.
pub fn remove_shapes<'a>(model: &Model, ids: impl IntoIterator<Item = &'a ShapeId>) -> Model {
    let index = model.shape_index();
    let requested: BTreeSet<&ShapeId> = ids.into_iter().filter(|id| index.contains(id)).collect();

    let mut removed: BTreeSet<ShapeId> = BTreeSet::new();
    // container id -> names of members removed from it
    let mut shrunk: BTreeMap<ShapeId, Vec<String>> = BTreeMap::new();

    for id in &requested {
        match id.member() {
            None => {
                removed.insert((*id).clone());
                if let Some(shape) = index.get(id) {
                    removed.extend(shape.member_ids());
                }
            }
            Some(name) => {
                let container_id = id.container_id();
                if requested.contains(&container_id) {
                    continue;
                }
                let Some(container) = index.get(&container_id) else {
                    continue;
                };
                if container.category() == ShapeCategory::Container {
                    removed.insert((*id).clone());
                    shrunk.entry(container_id).or_default().push(name.to_string());
                }
            }
        }
    }

    let removed_traits: BTreeSet<&ShapeId> = removed
        .iter()
        .filter(|id| model.is_trait_definition(id))
        .collect();

    let mut shapes: BTreeMap<ShapeId, Arc<Shape>> = BTreeMap::new();
    for (id, shared) in index.shared_shapes() {
        if removed.contains(id) {
            continue;
        }
        let strip_traits = shared.traits().keys().any(|t| removed_traits.contains(t));
        let drop_members = shrunk.get(id);
        let shape = if strip_traits || drop_members.is_some() {
            let mut shape = shared.without_traits(removed_traits.iter().copied());
            if let Some(names) = drop_members {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                shape = shape.without_members(&names);
            }
            Arc::new(shape)
        } else {
            Arc::clone(shared)
        };
        shapes.insert(id.clone(), shape);
    }

    debug!(
        removed = removed.len(),
        trait_definitions = removed_traits.len(),
        remaining = shapes.len(),
        "removed shapes"
    );
    Model::new(ShapeIndex::assume_consistent(shapes))
}

/// Keep only the shapes `predicate` accepts.
///
/// Collection members are kept whatever the predicate says. Nothing is
/// removed beyond the rejected shapes, their members, and applications of
/// rejected trait definitions; use [`MarkAndSweep`] to also drop shapes left
/// unreferenced.
pub fn filter_shapes(model: &Model, predicate: impl Fn(&Shape) -> bool) -> Model {
    let rejected: Vec<&ShapeId> = model
        .shape_index()
        .shapes()
        .filter(|shape| !predicate(shape))
        .map(Shape::id)
        .collect();
    remove_shapes(model, rejected)
}

/// Remove every trait definition and every private prelude shape, along with
/// the shapes that existed only to support them. Public prelude shapes that
/// are not trait definitions always survive.
pub fn scrub_trait_definitions(model: &Model) -> Model {
    let mut sweep = MarkAndSweep::new(
        |ctx: &mut MarkerContext<'_>| {
            let seeds: Vec<ShapeId> = ctx
                .model()
                .shape_index()
                .shapes()
                .filter(|shape| shape.is_trait_definition() || is_private_prelude_shape(shape))
                .map(|shape| shape.id().clone())
                .collect();
            for id in &seeds {
                ctx.mark_shape(id);
            }
        },
        |shape: &Shape| prelude::is_public_prelude_shape(shape) && !shape.is_trait_definition(),
    );
    let removed = sweep.mark_and_sweep(model);
    remove_shapes(model, &removed)
}

fn is_private_prelude_shape(shape: &Shape) -> bool {
    prelude::is_prelude_shape(shape.id()) && !prelude::is_public_prelude_shape(shape)
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ShapeKind, ShapeType};
    use serde_json::json;

    fn id(s: &str) -> ShapeId {
        s.parse().unwrap()
    }

    fn string(name: &str) -> Shape {
        Shape::new(id(name), ShapeKind::String)
    }

    fn trait_def(name: &str) -> Shape {
        string(name).with_trait(prelude::TRAIT.clone(), json!({}))
    }

    fn structure(name: &str, members: &[&str], target: &str) -> Vec<Shape> {
        let mut shapes = vec![Shape::new(
            id(name),
            ShapeKind::Structure {
                members: members.iter().map(|m| m.to_string()).collect(),
            },
        )];
        for m in members {
            shapes.push(Shape::member(&id(name), m, id(target)).unwrap());
        }
        shapes
    }

    #[test]
    fn removes_shapes_that_match_predicate() {
        let sensitive = prelude::SENSITIVE.clone();
        let m = Model::from_shapes(vec![
            string("ns.foo#A").with_trait(sensitive.clone(), json!({})),
            string("ns.foo#B"),
        ])
        .unwrap();
        let result = filter_shapes(&m, |shape| !shape.has_trait(&sensitive));
        assert_eq!(result.shape_index().len(), 1);
        assert!(result.get_shape(&id("ns.foo#B")).is_some());
        // input untouched
        assert_eq!(m.shape_index().len(), 2);
    }

    #[test]
    fn does_not_filter_list_or_map_members() {
        let m = Model::from_shapes(vec![
            string("ns.foo#StringShape"),
            Shape::new(id("ns.foo#List"), ShapeKind::List),
            Shape::member(&id("ns.foo#List"), "member", id("ns.foo#StringShape")).unwrap(),
            Shape::new(id("ns.foo#Set"), ShapeKind::Set),
            Shape::member(&id("ns.foo#Set"), "member", id("ns.foo#StringShape")).unwrap(),
            Shape::new(id("ns.foo#Map"), ShapeKind::Map),
            Shape::member(&id("ns.foo#Map"), "key", id("ns.foo#StringShape")).unwrap(),
            Shape::member(&id("ns.foo#Map"), "value", id("ns.foo#StringShape")).unwrap(),
        ])
        .unwrap();
        let result = filter_shapes(&m, |shape| !shape.is_member());
        assert_eq!(result.shape_index().len(), 8);
    }

    #[test]
    fn removing_a_collection_removes_its_members() {
        let m = Model::from_shapes(vec![
            string("ns.foo#StringShape"),
            Shape::new(id("ns.foo#List"), ShapeKind::List),
            Shape::member(&id("ns.foo#List"), "member", id("ns.foo#StringShape")).unwrap(),
        ])
        .unwrap();
        let result = filter_shapes(&m, |shape| shape.shape_type() != ShapeType::List);
        assert_eq!(result.shape_index().len(), 1);
        assert!(result.get_shape(&id("ns.foo#List$member")).is_none());
    }

    #[test]
    fn updates_structure_when_any_member_is_removed() {
        let members = ["member1", "member2", "member3", "member4"];
        let m = Model::from_shapes({
            let mut shapes = vec![string("ns.foo#String")];
            shapes.extend(structure("ns.foo#Structure", &members, "ns.foo#String"));
            shapes
        })
        .unwrap();

        for removed in members {
            let removed_id = id(&format!("ns.foo#Structure${removed}"));
            let result = filter_shapes(&m, |shape| shape.id() != &removed_id);
            let structure = result.get_shape(&id("ns.foo#Structure")).unwrap();
            let expected: Vec<&str> = members.iter().copied().filter(|m| *m != removed).collect();
            assert_eq!(structure.member_names(), expected);
            assert!(result.get_shape(&removed_id).is_none());
            for kept in &expected {
                let kept_id = id(&format!("ns.foo#Structure${kept}"));
                assert_eq!(result.get_shape(&kept_id), m.get_shape(&kept_id));
            }
        }
    }

    #[test]
    fn removes_trait_applications_when_definition_is_removed() {
        let sensitive = prelude::SENSITIVE.clone();
        let m = Model::from_shapes(vec![
            trait_def("ns.foo#baz"),
            trait_def("ns.foo#bar"),
            string("ns.foo#id1")
                .with_trait(id("foo.baz#foo"), json!(true))
                .with_trait(sensitive.clone(), json!({})),
            string("ns.foo#id2")
                .with_trait(id("ns.foo#baz"), json!(true))
                .with_trait(id("ns.foo#bar"), json!(true))
                .with_trait(sensitive.clone(), json!({})),
        ])
        .unwrap();

        let result = filter_shapes(&m, |shape| shape.id() != &id("ns.foo#baz"));
        let definitions: Vec<String> = result.trait_definitions().map(|s| s.id().to_string()).collect();
        assert_eq!(definitions, vec!["ns.foo#bar"]);

        let id1 = result.get_shape(&id("ns.foo#id1")).unwrap();
        assert!(id1.has_trait(&sensitive));
        assert!(id1.has_trait(&id("foo.baz#foo")));
        let id2 = result.get_shape(&id("ns.foo#id2")).unwrap();
        assert!(id2.has_trait(&sensitive));
        assert!(!id2.has_trait(&id("ns.foo#baz")));
        assert!(id2.has_trait(&id("ns.foo#bar")));
    }

    #[test]
    fn unchanged_shapes_are_shared() {
        let m = Model::from_shapes(vec![string("ns.foo#A"), string("ns.foo#B")]).unwrap();
        let result = filter_shapes(&m, |shape| shape.id().name() == "A");
        let before = m.shape_index().get_shared(&id("ns.foo#A")).unwrap();
        let after = result.shape_index().get_shared(&id("ns.foo#A")).unwrap();
        assert!(Arc::ptr_eq(before, after));
    }

    #[test]
    fn scrub_removes_definitions_and_private_prelude_shapes() {
        let m = Model::with_prelude({
            let mut shapes = vec![
                trait_def("ns.foo#custom"),
                string("ns.foo#Name")
                    .with_trait(id("ns.foo#custom"), json!("x"))
                    .with_trait(prelude::DOCUMENTATION.clone(), json!("docs")),
                string("ns.foo#OnlyForTrait"),
            ];
            // a structured trait whose member target exists only for it
            let mut config = structure("ns.foo#config", &["value"], "ns.foo#OnlyForTrait");
            config[0] = config[0].clone().with_trait(prelude::TRAIT.clone(), json!({}));
            shapes.extend(config);
            shapes
        })
        .unwrap();

        let result = scrub_trait_definitions(&m);
        let index = result.shape_index();

        assert_eq!(result.trait_definitions().count(), 0);
        assert!(index.shapes().all(|s| !s.is_trait_definition()));
        assert!(index
            .shapes()
            .all(|s| !prelude::is_prelude_shape(s.id()) || prelude::is_public_prelude_shape(s)));

        assert!(index.get(&id("ns.foo#config")).is_none());
        assert!(index.get(&id("ns.foo#config$value")).is_none());
        assert!(index.get(&id("ns.foo#OnlyForTrait")).is_none());
        assert!(index.get(&id("smithy.api#NonEmptyString")).is_none());

        let name = index.get(&id("ns.foo#Name")).unwrap();
        assert!(name.traits().is_empty());
        assert!(index.get(&id("smithy.api#String")).is_some());
        assert!(index.get(&id("smithy.api#Timestamp")).is_some());
    }

    #[test]
    fn scrub_keeps_shapes_still_referenced_elsewhere() {
        let m = Model::with_prelude({
            let mut shapes = vec![string("ns.foo#Shared")];
            let mut config = structure("ns.foo#config", &["value"], "ns.foo#Shared");
            config[0] = config[0].clone().with_trait(prelude::TRAIT.clone(), json!({}));
            shapes.extend(config);
            shapes.extend(structure("ns.foo#User", &["value"], "ns.foo#Shared"));
            shapes
        })
        .unwrap();
        let result = scrub_trait_definitions(&m);
        assert!(result.get_shape(&id("ns.foo#Shared")).is_some());
        assert!(result.get_shape(&id("ns.foo#User$value")).is_some());
        assert!(result.get_shape(&id("ns.foo#config")).is_none());
    }
}

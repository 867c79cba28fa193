//! The built-in `smithy.api` namespace.
//!
//! Prelude shapes are implicitly available to every model. Shapes marked
//! with the `private` trait are internal support shapes and may be removed
//! by transforms; every other prelude shape is public and must survive.

use std::sync::LazyLock;

use serde_json::json;

use crate::shape_id::ShapeId;
use crate::types::{Shape, ShapeKind};

pub const NAMESPACE: &str = "smithy.api";

fn prelude_id(name: &str) -> ShapeId {
    ShapeId::new(NAMESPACE, name, None).expect("invalid prelude shape id")
}

/// Marks a shape as a trait definition.
pub static TRAIT: LazyLock<ShapeId> = LazyLock::new(|| prelude_id("trait"));
/// Marks a prelude shape as internal.
pub static PRIVATE: LazyLock<ShapeId> = LazyLock::new(|| prelude_id("private"));
pub static READONLY: LazyLock<ShapeId> = LazyLock::new(|| prelude_id("readonly"));
pub static IDEMPOTENT: LazyLock<ShapeId> = LazyLock::new(|| prelude_id("idempotent"));
pub static SENSITIVE: LazyLock<ShapeId> = LazyLock::new(|| prelude_id("sensitive"));
pub static DOCUMENTATION: LazyLock<ShapeId> = LazyLock::new(|| prelude_id("documentation"));
pub static REQUIRED: LazyLock<ShapeId> = LazyLock::new(|| prelude_id("required"));
pub static ERROR: LazyLock<ShapeId> = LazyLock::new(|| prelude_id("error"));
pub static TAGS: LazyLock<ShapeId> = LazyLock::new(|| prelude_id("tags"));

fn simple_types() -> [(&'static str, ShapeKind); 13] {
    [
        ("Blob", ShapeKind::Blob),
        ("Boolean", ShapeKind::Boolean),
        ("String", ShapeKind::String),
        ("Byte", ShapeKind::Byte),
        ("Short", ShapeKind::Short),
        ("Integer", ShapeKind::Integer),
        ("Long", ShapeKind::Long),
        ("Float", ShapeKind::Float),
        ("Double", ShapeKind::Double),
        ("BigInteger", ShapeKind::BigInteger),
        ("BigDecimal", ShapeKind::BigDecimal),
        ("Timestamp", ShapeKind::Timestamp),
        ("Document", ShapeKind::Document),
    ]
}

/// True for any id in the prelude namespace.
pub fn is_prelude_shape(id: &ShapeId) -> bool {
    id.namespace() == NAMESPACE
}

/// True for prelude shapes that are not marked `private`.
pub fn is_public_prelude_shape(shape: &Shape) -> bool {
    is_prelude_shape(shape.id()) && !shape.has_trait(&PRIVATE)
}

/// Every prelude shape, members included.
pub fn shapes() -> Vec<Shape> {
    let mut shapes: Vec<Shape> = simple_types()
        .into_iter()
        .map(|(name, kind)| Shape::new(prelude_id(name), kind))
        .collect();

    let annotation = |id: &ShapeId| trait_definition(id.clone(), ShapeKind::Structure { members: vec![] });
    shapes.push(annotation(&TRAIT));
    shapes.push(annotation(&PRIVATE));
    shapes.push(annotation(&READONLY));
    shapes.push(annotation(&IDEMPOTENT));
    shapes.push(annotation(&SENSITIVE));
    shapes.push(annotation(&REQUIRED));
    shapes.push(trait_definition(DOCUMENTATION.clone(), ShapeKind::String));
    shapes.push(trait_definition(ERROR.clone(), ShapeKind::String));

    // tags: a list of non-empty strings. The element shape is private.
    let non_empty = prelude_id("NonEmptyString");
    shapes.push(Shape::new(non_empty.clone(), ShapeKind::String).with_trait(PRIVATE.clone(), json!({})));
    shapes.push(trait_definition(TAGS.clone(), ShapeKind::List));
    shapes.push(member_of(&TAGS, "member", non_empty));

    shapes
}

fn trait_definition(id: ShapeId, kind: ShapeKind) -> Shape {
    Shape::new(id, kind).with_trait(TRAIT.clone(), json!({}))
}

fn member_of(container: &ShapeId, name: &str, target: ShapeId) -> Shape {
    Shape::member(container, name, target).expect("invalid prelude member name")
}

// --- tests -------------------------------------------------------------------

//! Semantic core of an API-model toolchain.
//!
//! A model is an immutable graph of shapes (types, members, operations,
//! resources, services) addressed by [`ShapeId`]. This crate builds and
//! checks that graph, derives knowledge from it, transforms it into new
//! models, and runs fixture-driven validator tests against it. Loading is
//! plain JSON; parsing the IDL, code generation, and the command-line front
//! end live elsewhere.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`shape_id`] | [`ShapeId`]: `namespace#Name[$member]` |
//! | [`types`] | [`Shape`], [`ShapeKind`], [`ShapeType`], [`SourceLocation`] |
//! | [`prelude`] | Built-in `smithy.api` shapes and trait ids |
//! | [`index`] | [`ShapeIndex`], the consistency-checked id-to-shape map |
//! | [`model`] | [`Model`] snapshots and their memoized [`KnowledgeIndex`] cache |
//! | [`neighbor`] | Outgoing relationships of a shape, and the reverse index |
//! | [`walker`] | Cycle-safe reachability |
//! | [`containment`] | Resources and operations contained by services and resources |
//! | [`unreferenced`] | Trait definitions no service uses |
//! | [`mark_and_sweep`] | Removal sets that follow unreachability |
//! | [`transform`] | [`remove_shapes`], [`filter_shapes`], [`scrub_trait_definitions`] |
//! | [`validation`] | [`ValidationEvent`], [`Severity`], the [`Validator`] trait |
//! | [`validators`] | Built-in validators |
//! | [`testrunner`] | `.errors` fixtures and event matching |
//! | [`loader`] | JSON model documents |
//! | [`render`] | Human-readable event and test result reports |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use shapegraph::{filter_shapes, ModelLoader, UnreferencedTraitDefinitions};
//!
//! let model = ModelLoader::new().load_file("model.json")?;
//!
//! // Drop trait definitions that no service applies.
//! let unused = UnreferencedTraitDefinitions::new().compute(&model);
//! let trimmed = filter_shapes(&model, |shape| !unused.contains(shape.id()));
//! ```

pub mod containment;
pub mod error;
pub mod index;
pub mod loader;
pub mod mark_and_sweep;
pub mod model;
pub mod neighbor;
pub mod prelude;
pub mod render;
pub mod shape_id;
pub mod testrunner;
pub mod transform;
pub mod types;
pub mod unreferenced;
pub mod validation;
pub mod validators;
pub mod walker;

pub use containment::ContainmentIndex;
pub use error::InvariantViolation;
pub use index::ShapeIndex;
pub use loader::{LoadError, ModelDocument, ModelLoader};
pub use mark_and_sweep::{MarkAndSweep, MarkerContext};
pub use model::{KnowledgeIndex, Model};
pub use neighbor::{NeighborIndex, NeighborProvider, Relationship, RelationshipType};
pub use render::{render_events, render_result};
pub use shape_id::{ShapeId, ShapeIdError};
pub use testrunner::{FixtureError, TestCase, TestCaseResult};
pub use transform::{filter_shapes, remove_shapes, scrub_trait_definitions};
pub use types::{Shape, ShapeCategory, ShapeKind, ShapeType, SourceLocation, TraitValue};
pub use unreferenced::UnreferencedTraitDefinitions;
pub use validation::{validate_model, Severity, ValidationEvent, ValidationEventBuilder, Validator};
pub use validators::ResourceLifecycleValidator;
pub use walker::Walker;

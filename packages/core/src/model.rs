//! Immutable model snapshots and their derived-knowledge cache.

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::containment::ContainmentIndex;
use crate::error::InvariantViolation;
use crate::index::ShapeIndex;
use crate::prelude;
use crate::shape_id::ShapeId;
use crate::types::Shape;

/// Knowledge derived from a [`Model`] and memoized on it.
///
/// Implementations must be pure functions of the model: building twice
/// yields equal results.
pub trait KnowledgeIndex: Any + Send + Sync {
    fn build(model: &Model) -> Self
    where
        Self: Sized;
}

/// An immutable snapshot of a shape graph.
///
/// A model is never edited. Transforms build a new model, which starts with
/// an empty knowledge cache of its own. The cache is keyed by model instance
/// rather than content: two equal models built separately compute their
/// knowledge separately.
pub struct Model {
    index: ShapeIndex,
    trait_definitions: BTreeSet<ShapeId>,
    knowledge: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Model {
    pub fn new(index: ShapeIndex) -> Self {
        let trait_definitions = index
            .shapes()
            .filter(|s| s.is_trait_definition())
            .map(|s| s.id().clone())
            .collect();
        Self {
            index,
            trait_definitions,
            knowledge: RwLock::new(HashMap::new()),
        }
    }

    /// Build a model from a complete shape set.
    pub fn from_shapes(shapes: impl IntoIterator<Item = Shape>) -> Result<Self, InvariantViolation> {
        Ok(Self::new(ShapeIndex::new(shapes)?))
    }

    /// Build a model from a shape set plus every prelude shape.
    pub fn with_prelude(shapes: impl IntoIterator<Item = Shape>) -> Result<Self, InvariantViolation> {
        Self::from_shapes(prelude::shapes().into_iter().chain(shapes))
    }

    pub fn shape_index(&self) -> &ShapeIndex {
        &self.index
    }

    pub fn get_shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.index.get(id)
    }

    /// Every shape that is a trait definition, in id order.
    pub fn trait_definitions(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.trait_definitions.iter().filter_map(|id| self.index.get(id))
    }

    pub fn is_trait_definition(&self, id: &ShapeId) -> bool {
        self.trait_definitions.contains(id)
    }

    /// The `T` knowledge index for this model, built on first request.
    ///
    /// Safe to call from many threads. The index is built outside the lock,
    /// so racing first callers may each build it; the first one stored wins
    /// and every caller gets that instance.
    pub fn knowledge<T: KnowledgeIndex>(&self) -> Arc<T> {
        let key = TypeId::of::<T>();
        let cached = self
            .knowledge
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        let entry = match cached {
            Some(entry) => entry,
            None => {
                let built: Arc<dyn Any + Send + Sync> = Arc::new(T::build(self));
                self.knowledge
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(key)
                    .or_insert(built)
                    .clone()
            }
        };

        entry
            .downcast::<T>()
            .unwrap_or_else(|_| unreachable!("knowledge cache entries are keyed by their own type"))
    }

    /// Shorthand for `knowledge::<ContainmentIndex>()`.
    pub fn containment_index(&self) -> Arc<ContainmentIndex> {
        self.knowledge::<ContainmentIndex>()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("shapes", &self.index.len())
            .field("trait_definitions", &self.trait_definitions)
            .finish_non_exhaustive()
    }
}

// --- tests -------------------------------------------------------------------

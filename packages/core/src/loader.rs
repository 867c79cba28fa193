//! Reading models from JSON documents.
//!
//! ```json
//! { "shapes": [
//!     { "id": "ns.foo#S", "type": "structure", "members": ["a"] },
//!     { "id": "ns.foo#S$a", "type": "member", "target": "smithy.api#String",
//!       "traits": { "smithy.api#required": {} } }
//! ] }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::InvariantViolation;
use crate::model::Model;
use crate::prelude;
use crate::types::{Shape, SourceLocation};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// The on-disk form of a model.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModelDocument {
    pub shapes: Vec<Shape>,
}

/// Builds [`Model`]s from JSON documents.
#[derive(Debug, Clone)]
pub struct ModelLoader {
    include_prelude: bool,
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self {
            include_prelude: true,
        }
    }
}

impl ModelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether prelude shapes are merged into every loaded model. On by
    /// default.
    pub fn include_prelude(mut self, include: bool) -> Self {
        self.include_prelude = include;
        self
    }

    pub fn load_str(&self, json: &str) -> Result<Model, LoadError> {
        let document: ModelDocument = serde_json::from_str(json)?;
        self.build(document.shapes)
    }

    /// Load a model file. Shapes without a source location are located at
    /// the file.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Model, LoadError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: ModelDocument = serde_json::from_str(&json)?;
        let filename = path.display().to_string();
        let shapes = document.shapes.into_iter().map(|shape| {
            if shape.source_location() == &SourceLocation::none() {
                shape.with_source_location(SourceLocation::new(filename.clone(), 0, 0))
            } else {
                shape
            }
        });
        let model = self.build(shapes)?;
        debug!(path = %path.display(), shapes = model.shape_index().len(), "loaded model");
        Ok(model)
    }

    fn build(&self, shapes: impl IntoIterator<Item = Shape>) -> Result<Model, LoadError> {
        let model = if self.include_prelude {
            Model::with_prelude(shapes)?
        } else {
            Model::from_shapes(shapes)?
        };
        Ok(model)
    }
}

// Prelude shapes are never written back out.
impl From<&Model> for ModelDocument {
    fn from(model: &Model) -> Self {
        Self {
            shapes: model
                .shape_index()
                .shapes()
                .filter(|s| !prelude::is_prelude_shape(s.id()))
                .cloned()
                .collect(),
        }
    }
}

// --- tests -------------------------------------------------------------------

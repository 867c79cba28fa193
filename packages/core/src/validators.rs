//! Built-in validators.

use crate::model::Model;
use crate::prelude;
use crate::types::{ResourceShape, Shape, ShapeType};
use crate::validation::{Severity, ValidationEvent, Validator};

/// Checks that the operations bound to resource lifecycles carry the right
/// behavior traits: `read` and `list` must be `readonly`, every other
/// lifecycle must not be, and `put` and `delete` must be `idempotent`.
///
/// Bindings that do not resolve to an operation are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResourceLifecycleValidator;

impl ResourceLifecycleValidator {
    pub const EVENT_ID: &'static str = "ResourceLifecycle";
}

impl Validator for ResourceLifecycleValidator {
    fn validate(&self, model: &Model) -> Vec<ValidationEvent> {
        model
            .shape_index()
            .shapes_of_kind(ShapeType::Resource)
            .flat_map(|shape| validate_resource(model, shape))
            .collect()
    }
}

fn validate_resource(model: &Model, resource: &Shape) -> Vec<ValidationEvent> {
    let Some(bindings) = resource.as_resource() else {
        return Vec::new();
    };
    let mut events = Vec::new();
    // put first, then the remaining lifecycles in declaration order
    for (lifecycle, operation_shape) in lifecycle_operations(model, bindings) {
        let requires_readonly = matches!(lifecycle, "read" | "list");
        if requires_readonly != operation_shape.has_trait(&prelude::READONLY) {
            events.push(error(
                resource,
                format!(
                    "The `{lifecycle}` lifecycle operation of this resource targets an invalid operation, `{}`. \
                     The targeted operation {} be marked with the readonly trait.",
                    operation_shape.id(),
                    if requires_readonly { "must" } else { "must not" }
                ),
            ));
        }
        if matches!(lifecycle, "put" | "delete") && !operation_shape.has_trait(&prelude::IDEMPOTENT) {
            events.push(error(
                resource,
                format!(
                    "The `{lifecycle}` lifecycle operation of this resource targets an invalid operation, `{}`. \
                     The targeted operation must be marked as idempotent.",
                    operation_shape.id()
                ),
            ));
        }
    }
    events
}

fn lifecycle_operations<'m>(model: &'m Model, bindings: &ResourceShape) -> Vec<(&'static str, &'m Shape)> {
    let mut bound: Vec<(&'static str, &'m Shape)> = bindings
        .lifecycle_bindings()
        .into_iter()
        .filter_map(|(lifecycle, id)| model.get_shape(id).map(|shape| (lifecycle, shape)))
        .filter(|(_, shape)| shape.as_operation().is_some())
        .collect();
    bound.sort_by_key(|(lifecycle, _)| *lifecycle != "put");
    bound
}

fn error(resource: &Shape, message: String) -> ValidationEvent {
    ValidationEvent::from_shape(resource, ResourceLifecycleValidator::EVENT_ID, Severity::Error, message)
}

// --- tests -------------------------------------------------------------------

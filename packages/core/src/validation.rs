use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InvariantViolation;
use crate::model::Model;
use crate::shape_id::ShapeId;
use crate::types::{Shape, SourceLocation};

/// How serious a [`ValidationEvent`] is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Suppressed,
    Note,
    Warning,
    Danger,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Suppressed,
        Severity::Note,
        Severity::Warning,
        Severity::Danger,
        Severity::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Suppressed => "SUPPRESSED",
            Severity::Note => "NOTE",
            Severity::Warning => "WARNING",
            Severity::Danger => "DANGER",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the upper-case severity name.
impl FromStr for Severity {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|sev| sev.as_str() == s)
            .ok_or_else(|| format!("unknown severity {s:?}"))
    }
}

/// A single finding about a model.
///
/// Events are immutable and compare equal only when every field matches.
/// `Display` yields the canonical one-line form used by conformance
/// fixtures:
///
/// ```text
/// [ERROR] ns.foo#Bar: message | EventId filename:line:column
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "EventRecord", into = "EventRecord")]
pub struct ValidationEvent {
    event_id: String,
    severity: Severity,
    shape_id: Option<ShapeId>,
    message: String,
    suppression_reason: Option<String>,
    source_location: SourceLocation,
}

impl ValidationEvent {
    pub fn builder() -> ValidationEventBuilder {
        ValidationEventBuilder::default()
    }

    /// An event about `shape`, located where the shape is defined.
    pub fn from_shape(
        shape: &Shape,
        event_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            severity,
            shape_id: Some(shape.id().clone()),
            message: message.into(),
            suppression_reason: None,
            source_location: shape.source_location().clone(),
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn shape_id(&self) -> Option<&ShapeId> {
        self.shape_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suppression_reason(&self) -> Option<&str> {
        self.suppression_reason.as_deref()
    }

    pub fn source_location(&self) -> &SourceLocation {
        &self.source_location
    }
}

impl fmt::Display for ValidationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.severity)?;
        match &self.shape_id {
            Some(id) => write!(f, "{id}")?,
            None => f.write_str("-")?,
        }
        write!(
            f,
            ": {} | {} {}",
            self.message, self.event_id, self.source_location
        )
    }
}

/// Builds a [`ValidationEvent`]. Event id, severity, and message are
/// required; the source location defaults to [`SourceLocation::none`].
#[derive(Debug, Default, Clone)]
pub struct ValidationEventBuilder {
    event_id: Option<String>,
    severity: Option<Severity>,
    shape_id: Option<ShapeId>,
    message: Option<String>,
    suppression_reason: Option<String>,
    source_location: Option<SourceLocation>,
}

impl ValidationEventBuilder {
    pub fn event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn shape_id(mut self, shape_id: ShapeId) -> Self {
        self.shape_id = Some(shape_id);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn suppression_reason(mut self, reason: impl Into<String>) -> Self {
        self.suppression_reason = Some(reason.into());
        self
    }

    pub fn source_location(mut self, location: SourceLocation) -> Self {
        self.source_location = Some(location);
        self
    }

    /// Sets both the shape id and the source location from `shape`.
    pub fn shape(self, shape: &Shape) -> Self {
        self.shape_id(shape.id().clone())
            .source_location(shape.source_location().clone())
    }

    pub fn build(self) -> Result<ValidationEvent, InvariantViolation> {
        let severity = self
            .severity
            .ok_or(InvariantViolation::MissingEventField("severity"))?;
        if self.suppression_reason.is_some() && severity != Severity::Suppressed {
            return Err(InvariantViolation::SuppressionReasonOnUnsuppressed);
        }
        Ok(ValidationEvent {
            event_id: self
                .event_id
                .ok_or(InvariantViolation::MissingEventField("eventId"))?,
            severity,
            shape_id: self.shape_id,
            message: self
                .message
                .ok_or(InvariantViolation::MissingEventField("message"))?,
            suppression_reason: self.suppression_reason,
            source_location: self.source_location.unwrap_or_default(),
        })
    }
}

// Flat JSON shape of an event.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRecord {
    id: String,
    severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shape_id: Option<ShapeId>,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suppression_reason: Option<String>,
    filename: String,
    line: u32,
    column: u32,
}

impl From<ValidationEvent> for EventRecord {
    fn from(event: ValidationEvent) -> Self {
        EventRecord {
            id: event.event_id,
            severity: event.severity,
            shape_id: event.shape_id,
            message: event.message,
            suppression_reason: event.suppression_reason,
            filename: event.source_location.filename,
            line: event.source_location.line,
            column: event.source_location.column,
        }
    }
}

impl TryFrom<EventRecord> for ValidationEvent {
    type Error = InvariantViolation;
    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let mut builder = ValidationEvent::builder()
            .event_id(record.id)
            .severity(record.severity)
            .message(record.message)
            .source_location(SourceLocation::new(record.filename, record.line, record.column));
        if let Some(id) = record.shape_id {
            builder = builder.shape_id(id);
        }
        if let Some(reason) = record.suppression_reason {
            builder = builder.suppression_reason(reason);
        }
        builder.build()
    }
}

// --- validators --------------------------------------------------------------

/// Checks a model and reports what it finds. Validators never fail: every
/// problem is an event.
pub trait Validator {
    fn validate(&self, model: &Model) -> Vec<ValidationEvent>;
}

impl<F> Validator for F
where
    F: Fn(&Model) -> Vec<ValidationEvent>,
{
    fn validate(&self, model: &Model) -> Vec<ValidationEvent> {
        self(model)
    }
}

/// Run every validator over `model`, concatenating their events in
/// validator order.
pub fn validate_model(model: &Model, validators: &[&dyn Validator]) -> Vec<ValidationEvent> {
    let events: Vec<ValidationEvent> = validators
        .iter()
        .flat_map(|validator| validator.validate(model))
        .collect();
    debug!(validators = validators.len(), events = events.len(), "validated model");
    events
}

// --- tests -------------------------------------------------------------------

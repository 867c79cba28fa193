//! Fixture-driven validator tests.
//!
//! A test case pairs a model file with a `.errors` file listing the events
//! validation is expected to produce, one per line:
//!
//! ```text
//! [ERROR] ns.foo#Bar: message prefix | EventId filename:line:column
//! [WARNING] -: message about no shape in particular | OtherId
//! ```
//!
//! The trailing location is accepted but never compared. An expected event
//! matches an actual event when severity, event id, and shape id agree and
//! the actual message starts with the expected one.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::shape_id::ShapeId;
use crate::types::SourceLocation;
use crate::validation::{Severity, ValidationEvent};

/// Why a test case could not be loaded.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("line {line}: invalid validation event: {text:?}")]
    InvalidLine { line: usize, text: String },

    #[error("line {line}: unknown severity {severity:?}")]
    UnknownSeverity { line: usize, severity: String },

    #[error("line {line}: invalid shape id {shape:?}")]
    InvalidShapeId { line: usize, shape: String },

    #[error("model file {0} has no extension")]
    MissingExtension(PathBuf),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `[SEVERITY] shape: message | EventId [anything]`
///
/// Text after the event id (normally `filename:line:column`) is ignored.
static EVENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(?P<severity>[A-Za-z]+)\] (?P<shape>[^ :]+):? ?(?P<message>.*) \| (?P<id>[^\s]+)(?:\s.*)?$",
    )
    .expect("invalid fixture event regex")
});

/// Parse one fixture line into the event it expects.
///
/// The event gets a placeholder source location. `line` is the 1-based line
/// number used in errors.
pub fn parse_validation_event(text: &str, line: usize) -> Result<ValidationEvent, FixtureError> {
    let invalid = || FixtureError::InvalidLine {
        line,
        text: text.to_string(),
    };
    let caps = EVENT_RE.captures(text).ok_or_else(invalid)?;

    let severity: Severity = caps["severity"]
        .parse()
        .map_err(|_| FixtureError::UnknownSeverity {
            line,
            severity: caps["severity"].to_string(),
        })?;

    let mut builder = ValidationEvent::builder()
        .severity(severity)
        .event_id(&caps["id"])
        .message(&caps["message"])
        .source_location(SourceLocation::new("/", 0, 0));

    let shape = &caps["shape"];
    if shape != "-" {
        let id: ShapeId = shape.parse().map_err(|_| FixtureError::InvalidShapeId {
            line,
            shape: shape.to_string(),
        })?;
        builder = builder.shape_id(id);
    }

    // Severity and event id are set; a fixture can never trip a builder
    // invariant, but report it as an unusable line rather than panic.
    builder.build().map_err(|_| invalid())
}

/// Parse a whole fixture document. Blank lines are skipped.
pub fn parse_fixture(contents: &str) -> Result<Vec<ValidationEvent>, FixtureError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_validation_event(line, i + 1))
        .collect()
}

/// A model file plus the events validating it should produce.
#[derive(Debug, Clone)]
pub struct TestCase {
    model_location: PathBuf,
    expected_events: Vec<ValidationEvent>,
}

impl TestCase {
    pub fn new(model_location: impl Into<PathBuf>, expected_events: Vec<ValidationEvent>) -> Self {
        Self {
            model_location: model_location.into(),
            expected_events,
        }
    }

    /// A test case whose expected events are given as fixture text.
    pub fn from_fixture_str(model_location: impl Into<PathBuf>, fixture: &str) -> Result<Self, FixtureError> {
        Ok(Self::new(model_location, parse_fixture(fixture)?))
    }

    /// Load the test case for a model file. The fixture lives next to the
    /// model, named like it with the extension replaced by `.errors`.
    pub fn from_model_file(model_location: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let model_location = model_location.as_ref();
        let errors_location = errors_file_location(model_location)?;
        let contents = fs::read_to_string(&errors_location).map_err(|source| FixtureError::Io {
            path: errors_location.clone(),
            source,
        })?;
        let case = Self::from_fixture_str(model_location, &contents)?;
        debug!(
            model = %model_location.display(),
            expected = case.expected_events.len(),
            "loaded test case"
        );
        Ok(case)
    }

    pub fn model_location(&self) -> &Path {
        &self.model_location
    }

    pub fn expected_events(&self) -> &[ValidationEvent] {
        &self.expected_events
    }

    /// Compare the events validation actually produced against the expected
    /// ones.
    pub fn create_result(&self, actual_events: &[ValidationEvent]) -> TestCaseResult {
        let unmatched = self
            .expected_events
            .iter()
            .filter(|expected| !actual_events.iter().any(|actual| events_match(expected, actual)))
            .cloned()
            .collect();
        let extra = actual_events
            .iter()
            .filter(|actual| !self.expected_events.iter().any(|expected| events_match(expected, actual)))
            .cloned()
            .collect();
        TestCaseResult {
            model_location: self.model_location.clone(),
            unmatched,
            extra,
        }
    }
}

/// The `.errors` file that goes with `model_location`.
pub fn errors_file_location(model_location: &Path) -> Result<PathBuf, FixtureError> {
    if model_location.extension().is_none() {
        return Err(FixtureError::MissingExtension(model_location.to_path_buf()));
    }
    Ok(model_location.with_extension("errors"))
}

/// The outcome of comparing one test case against actual events.
#[derive(Debug, Clone)]
pub struct TestCaseResult {
    model_location: PathBuf,
    unmatched: Vec<ValidationEvent>,
    extra: Vec<ValidationEvent>,
}

impl TestCaseResult {
    pub fn model_location(&self) -> &Path {
        &self.model_location
    }

    /// Expected events that validation did not produce.
    pub fn unmatched(&self) -> &[ValidationEvent] {
        &self.unmatched
    }

    /// Produced events that were not expected.
    pub fn extra(&self) -> &[ValidationEvent] {
        &self.extra
    }

    pub fn is_invalid(&self) -> bool {
        !self.unmatched.is_empty() || !self.extra.is_empty()
    }
}

/// Whether `actual` satisfies `expected`. Line breaks in either message are
/// compared in their escaped `\n` form.
pub fn events_match(expected: &ValidationEvent, actual: &ValidationEvent) -> bool {
    expected.severity() == actual.severity()
        && expected.event_id() == actual.event_id()
        && expected.shape_id() == actual.shape_id()
        && escape_newlines(actual.message()).starts_with(escape_newlines(expected.message()).as_str())
}

fn escape_newlines(message: &str) -> String {
    message.replace('\n', "\\n")
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ShapeId {
        s.parse().unwrap()
    }

    fn actual(severity: Severity, event_id: &str, shape: Option<&str>, message: &str) -> ValidationEvent {
        let mut builder = ValidationEvent::builder()
            .severity(severity)
            .event_id(event_id)
            .message(message)
            .source_location(SourceLocation::new("model.json", 3, 4));
        if let Some(shape) = shape {
            builder = builder.shape_id(id(shape));
        }
        builder.build().unwrap()
    }

    #[test]
    fn parses_event_with_shape_and_location() {
        let e = parse_validation_event("[ERROR] ns.foo#Bar: The message | Foo model.json:1:2", 1).unwrap();
        assert_eq!(e.severity(), Severity::Error);
        assert_eq!(e.shape_id(), Some(&id("ns.foo#Bar")));
        assert_eq!(e.message(), "The message");
        assert_eq!(e.event_id(), "Foo");
        assert_eq!(e.source_location(), &SourceLocation::new("/", 0, 0));
    }

    #[test]
    fn location_with_spaces_is_ignored() {
        let e = parse_validation_event("[ERROR] ns.foo#Bar: The message | Foo my models/a b.json:3:4", 1).unwrap();
        assert_eq!(e.message(), "The message");
        assert_eq!(e.event_id(), "Foo");

        let shown = ValidationEvent::builder()
            .severity(Severity::Error)
            .event_id("Foo")
            .shape_id(id("ns.foo#Bar"))
            .message("The message")
            .source_location(SourceLocation::new("my models/a b.json", 3, 4))
            .build()
            .unwrap()
            .to_string();
        let parsed = parse_validation_event(&shown, 1).unwrap();
        assert!(events_match(&parsed, &e));
    }

    #[test]
    fn dash_means_no_shape() {
        let e = parse_validation_event("[NOTE] -: Nothing in particular | Bar", 1).unwrap();
        assert_eq!(e.shape_id(), None);
        assert_eq!(e.message(), "Nothing in particular");
        assert_eq!(e.event_id(), "Bar");
    }

    #[test]
    fn member_ids_and_colon_free_form() {
        let e = parse_validation_event("[DANGER] ns.foo#Bar$baz msg | Id", 1).unwrap();
        assert_eq!(e.shape_id(), Some(&id("ns.foo#Bar$baz")));
        assert_eq!(e.message(), "msg");
    }

    #[test]
    fn messages_may_contain_pipes_and_colons() {
        let e = parse_validation_event("[WARNING] ns.foo#A: a | b: c | Id", 1).unwrap();
        assert_eq!(e.message(), "a | b: c");
        assert_eq!(e.event_id(), "Id");
    }

    #[test]
    fn rejects_unknown_severity() {
        let err = parse_validation_event("[FATAL] ns.foo#A: msg | Id", 7).unwrap_err();
        assert!(matches!(err, FixtureError::UnknownSeverity { line: 7, .. }));
        let err = parse_validation_event("[error] ns.foo#A: msg | Id", 1).unwrap_err();
        assert!(matches!(err, FixtureError::UnknownSeverity { .. }));
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["ERROR ns.foo#A: msg | Id", "[ERROR] ns.foo#A: msg", "[ERROR]"] {
            let err = parse_validation_event(line, 2).unwrap_err();
            assert!(matches!(err, FixtureError::InvalidLine { line: 2, .. }), "{line}");
        }
        let err = parse_validation_event("[ERROR] not-an-id: msg | Id", 3).unwrap_err();
        assert!(matches!(err, FixtureError::InvalidShapeId { line: 3, .. }));
    }

    #[test]
    fn fixture_skips_blank_lines_and_numbers_errors() {
        let events = parse_fixture("\n[ERROR] ns.foo#A: a | X\n\n   \n[NOTE] -: b | Y\n\n").unwrap();
        assert_eq!(events.len(), 2);

        let err = parse_fixture("[ERROR] ns.foo#A: a | X\n\nbogus\n").unwrap_err();
        assert!(matches!(err, FixtureError::InvalidLine { line: 3, .. }));
    }

    #[test]
    fn message_prefix_rule() {
        let expected = parse_validation_event("[ERROR] ns.foo#A: msg | V1", 1).unwrap();
        assert!(events_match(&expected, &actual(Severity::Error, "V1", Some("ns.foo#A"), "msg plus details")));
        assert!(events_match(&expected, &actual(Severity::Error, "V1", Some("ns.foo#A"), "msg")));
        assert!(!events_match(&expected, &actual(Severity::Error, "V1", Some("ns.foo#A"), "ms")));
        assert!(!events_match(&expected, &actual(Severity::Error, "V1", Some("ns.foo#A"), "mag plus")));
        assert!(!events_match(&expected, &actual(Severity::Error, "V1", Some("ns.foo#A"), "MSG")));
    }

    #[test]
    fn other_fields_must_agree() {
        let expected = parse_validation_event("[ERROR] ns.foo#A: msg | V1", 1).unwrap();
        assert!(!events_match(&expected, &actual(Severity::Danger, "V1", Some("ns.foo#A"), "msg")));
        assert!(!events_match(&expected, &actual(Severity::Error, "V2", Some("ns.foo#A"), "msg")));
        assert!(!events_match(&expected, &actual(Severity::Error, "V1", Some("ns.foo#B"), "msg")));
        assert!(!events_match(&expected, &actual(Severity::Error, "V1", None, "msg")));

        let no_shape = parse_validation_event("[ERROR] -: msg | V1", 1).unwrap();
        assert!(events_match(&no_shape, &actual(Severity::Error, "V1", None, "msg")));
        assert!(!events_match(&no_shape, &actual(Severity::Error, "V1", Some("ns.foo#A"), "msg")));
    }

    #[test]
    fn line_breaks_compare_escaped() {
        let expected = parse_validation_event(r"[ERROR] ns.foo#A: first\nsecond | V1", 1).unwrap();
        assert!(events_match(&expected, &actual(Severity::Error, "V1", Some("ns.foo#A"), "first\nsecond line")));
    }

    #[test]
    fn result_reports_unmatched_and_extra() {
        let case = TestCase::from_fixture_str(
            "a.json",
            "[ERROR] ns.foo#A: expected | V1\n[WARNING] ns.foo#B: also expected | V2\n",
        )
        .unwrap();
        let found = actual(Severity::Warning, "V2", Some("ns.foo#B"), "also expected, and more");
        let surprise = actual(Severity::Error, "V3", Some("ns.foo#C"), "surprise");

        let result = case.create_result(&[found, surprise.clone()]);
        assert!(result.is_invalid());
        assert_eq!(result.unmatched(), &case.expected_events()[..1]);
        assert_eq!(result.extra(), &[surprise]);
        assert_eq!(result.model_location(), Path::new("a.json"));
    }

    #[test]
    fn exact_expectations_are_valid() {
        let case = TestCase::from_fixture_str("a.json", "[ERROR] ns.foo#A: expected | V1").unwrap();
        let result = case.create_result(&[actual(Severity::Error, "V1", Some("ns.foo#A"), "expected!")]);
        assert!(!result.is_invalid());

        let empty = TestCase::new("b.json", vec![]);
        assert!(!empty.create_result(&[]).is_invalid());
    }

    #[test]
    fn loads_fixture_next_to_model() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("thing.json");
        fs::write(&model, "{}").unwrap();
        fs::write(dir.path().join("thing.errors"), "[NOTE] -: hi | Hello\n").unwrap();

        let case = TestCase::from_model_file(&model).unwrap();
        assert_eq!(case.model_location(), model.as_path());
        assert_eq!(case.expected_events().len(), 1);
    }

    #[test]
    fn model_without_extension_is_rejected() {
        let err = TestCase::from_model_file("models/thing").unwrap_err();
        assert!(matches!(err, FixtureError::MissingExtension(_)));
    }

    #[test]
    fn missing_fixture_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TestCase::from_model_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FixtureError::Io { .. }));
    }
}

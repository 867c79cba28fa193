//! Human-readable text rendering of validation events and test case results.
//!
//! The output is stable plain text suitable for terminals and logs. It is
//! not a canonical format; only the one-line event form produced by
//! `ValidationEvent`'s `Display` is relied on by fixtures.

use crate::testrunner::TestCaseResult;
use crate::validation::{Severity, ValidationEvent};

/// Render a list of events grouped by severity, most severe first.
///
/// ```text
/// Validation  3 events
/// ────────────────────
///
/// ERROR (2)
///   [ERROR] ns.foo#A: ... | ResourceLifecycle a.json:3:5
///   [ERROR] ns.foo#B: ... | ResourceLifecycle a.json:9:5
///
/// NOTE (1)
///   [NOTE] -: ... | Other N/A:0:0
/// ```
pub fn render_events(events: &[ValidationEvent]) -> String {
    let total = events.len();
    let header = format!("Validation  {} event{}", total, plural(total));
    let rule = "─".repeat(header.chars().count());

    let mut out = format!("{}\n{}\n", header, rule);

    for severity in Severity::ALL.into_iter().rev() {
        let group: Vec<&ValidationEvent> = events.iter().filter(|e| e.severity() == severity).collect();
        if group.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(&format!("{} ({})\n", severity, group.len()));
        for event in group {
            out.push_str(&format!("  {}\n", escape_newlines(&event.to_string())));
        }
    }

    out
}

/// Render a failed test case: which expected events never showed up and
/// which produced events were not expected. A passing result renders as a
/// single line.
///
/// ```text
/// FAIL models/lifecycle.json
///
/// Did not match the following events (1):
///   [ERROR] ns.foo#R: The `read` lifecycle ... | ResourceLifecycle /:0:0
///
/// Encountered unexpected events (1):
///   [WARNING] ns.foo#R: ... | Other models/lifecycle.json:4:3
/// ```
pub fn render_result(result: &TestCaseResult) -> String {
    let location = result.model_location().display();
    if !result.is_invalid() {
        return format!("ok   {}\n", location);
    }

    let mut out = format!("FAIL {}\n", location);
    section(&mut out, "Did not match the following events", result.unmatched());
    section(&mut out, "Encountered unexpected events", result.extra());
    out
}

// --- helpers -----------------------------------------------------------------

fn section(out: &mut String, title: &str, events: &[ValidationEvent]) {
    if events.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(&format!("{} ({}):\n", title, events.len()));
    for event in events {
        out.push_str(&format!("  {}\n", escape_newlines(&event.to_string())));
    }
}

// one event per line
fn escape_newlines(s: &str) -> String {
    s.replace('\n', "\\n")
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// --- tests -------------------------------------------------------------------

//! Fixture-driven conformance suite for `shapegraph` validators.
//!
//! Every `*.json` model under the fixture directory is loaded (with the
//! prelude), validated, and compared against the `*.errors` file next to it.
//! See [`shapegraph::testrunner`] for the fixture format and the matching
//! rules.
//!
//! ```rust,ignore
//! use shapegraph_conformance::{init_logging, SuiteConfig, TestSuite};
//!
//! init_logging();
//! let summary = TestSuite::from_config(&SuiteConfig::from_env())?.run()?;
//! ```
//!
//! # Environment variables
//!
//! See [`SuiteConfig::from_env`] for the full list. Log output follows
//! `RUST_LOG`.

pub mod config;
pub mod suite;

pub use config::SuiteConfig;
pub use suite::{CaseError, CaseFailure, SuiteError, SuiteSummary, TestSuite};

const DEFAULT_LOG_FILTER: &str = "shapegraph=info,shapegraph_conformance=info";

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .try_init();
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging();
        init_logging();
        tracing::info!("logging installed");
    }
}

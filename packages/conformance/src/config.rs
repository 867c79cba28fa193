//! Suite configuration, populated from environment variables.

use std::path::PathBuf;

/// Runtime configuration for a conformance run.
///
/// All fields are populated from environment variables with sensible
/// defaults, so the suite runs with zero configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `SHAPEGRAPH_FIXTURES` | `<this crate>/models` | Directory scanned for model files |
/// | `SHAPEGRAPH_FAIL_FAST` | `false` | Stop at the first failing case |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Directory holding `*.json` models and their `*.errors` fixtures.
    /// Scanned recursively.
    pub fixtures_dir: PathBuf,

    /// Stop at the first failing case instead of collecting every failure.
    pub fail_fast: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            fixtures_dir: default_fixtures_dir(),
            fail_fast: false,
        }
    }
}

impl SuiteConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Populate config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fixtures_dir = lookup("SHAPEGRAPH_FIXTURES")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_fixtures_dir);

        let fail_fast = lookup("SHAPEGRAPH_FAIL_FAST")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            fixtures_dir,
            fail_fast,
        }
    }
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models")
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// --- tests -------------------------------------------------------------------

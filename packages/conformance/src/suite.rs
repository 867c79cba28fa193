//! Discovering and running fixture test cases.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use shapegraph::testrunner::errors_file_location;
use shapegraph::{
    render_result, validate_model, FixtureError, LoadError, ModelLoader, ResourceLifecycleValidator, TestCase,
    TestCaseResult, Validator,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::SuiteConfig;

/// Why a single case failed.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("{}", render_result(.0).trim_end())]
    Mismatch(TestCaseResult),
}

/// A failing case and its model file.
#[derive(Debug)]
pub struct CaseFailure {
    pub model: PathBuf,
    pub error: CaseError,
}

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("failed to scan fixture directory {path}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", describe_failures(.run, .failures))]
    Failed { run: usize, failures: Vec<CaseFailure> },
}

/// Counts from a run in which every case passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteSummary {
    pub passed: usize,
    pub skipped: usize,
}

/// Runs validators over every model in a fixture directory and compares the
/// events against each model's `.errors` fixture.
///
/// A suite runs [`ResourceLifecycleValidator`] unless validators are given
/// explicitly with [`TestSuite::with_validator`].
pub struct TestSuite {
    cases: Vec<PathBuf>,
    skipped: usize,
    validators: Vec<Box<dyn Validator>>,
    loader: ModelLoader,
    fail_fast: bool,
}

impl Default for TestSuite {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSuite {
    pub fn new() -> Self {
        Self {
            cases: Vec::new(),
            skipped: 0,
            validators: Vec::new(),
            loader: ModelLoader::new(),
            fail_fast: false,
        }
    }

    /// A suite over the configured fixture directory.
    pub fn from_config(config: &SuiteConfig) -> Result<Self, SuiteError> {
        Self::new()
            .fail_fast(config.fail_fast)
            .add_model_dir(&config.fixtures_dir)
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Add one model file. Its fixture is read when the suite runs.
    pub fn add_case(mut self, model: impl Into<PathBuf>) -> Self {
        self.cases.push(model.into());
        self
    }

    /// Add every `*.json` model under `dir` that has a `.errors` fixture next
    /// to it. Models without a fixture are skipped with a warning.
    pub fn add_model_dir(mut self, dir: impl AsRef<Path>) -> Result<Self, SuiteError> {
        let mut found = Vec::new();
        collect_models(dir.as_ref(), &mut found)?;
        found.sort();
        for model in found {
            let has_fixture = errors_file_location(&model)
                .map(|errors| errors.is_file())
                .unwrap_or(false);
            if has_fixture {
                self.cases.push(model);
            } else {
                warn!(model = %model.display(), "no .errors fixture next to model, skipping");
                self.skipped += 1;
            }
        }
        Ok(self)
    }

    pub fn cases(&self) -> &[PathBuf] {
        &self.cases
    }

    /// Run every case. Fails with every failing case unless `fail_fast` is
    /// set, in which case only the first failure is reported.
    pub fn run(&self) -> Result<SuiteSummary, SuiteError> {
        let default_validator = ResourceLifecycleValidator;
        let validators: Vec<&dyn Validator> = if self.validators.is_empty() {
            vec![&default_validator as &dyn Validator]
        } else {
            self.validators.iter().map(Box::as_ref).collect()
        };

        let mut failures = Vec::new();
        let mut run = 0;
        for model in &self.cases {
            run += 1;
            match self.run_case(model, &validators) {
                Ok(()) => debug!(model = %model.display(), "case passed"),
                Err(error) => {
                    warn!(model = %model.display(), %error, "case failed");
                    failures.push(CaseFailure {
                        model: model.clone(),
                        error,
                    });
                    if self.fail_fast {
                        break;
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(SuiteError::Failed { run, failures });
        }
        info!(passed = run, skipped = self.skipped, "conformance suite passed");
        Ok(SuiteSummary {
            passed: run,
            skipped: self.skipped,
        })
    }

    fn run_case(&self, model_path: &Path, validators: &[&dyn Validator]) -> Result<(), CaseError> {
        let case = TestCase::from_model_file(model_path)?;
        let model = self.loader.load_file(model_path)?;
        let events = validate_model(&model, validators);
        let result = case.create_result(&events);
        if result.is_invalid() {
            return Err(CaseError::Mismatch(result));
        }
        Ok(())
    }
}

fn collect_models(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SuiteError> {
    let scan_error = |source| SuiteError::Scan {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(scan_error)? {
        let path = entry.map_err(scan_error)?.path();
        if path.is_dir() {
            collect_models(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

fn describe_failures(run: &usize, failures: &[CaseFailure]) -> String {
    let mut out = format!("{} of {} conformance cases failed", failures.len(), run);
    for failure in failures {
        let _ = write!(out, "\n\n{}: {}", failure.model.display(), failure.error);
    }
    out
}

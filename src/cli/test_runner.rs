//! Test runner implementation
//!
//! ## RunReporter Trait
//!
//! The runner uses a `RunReporter` trait to separate reporting from execution. The console reporter prints
//! the single summary line; other reporters can observe individual units without touching the engine.
//!
//! ## Counters
//!
//! A run's counters live in a `RunContext` owned by one `run_directory` call and are folded into a
//! `Summary` at the end. Nothing is shared between runs.

use std::fmt;
use std::path::Path;

use caserun_core::{CaseIdentity, StageFailure};

use super::test_interfaces::{Candidate, DirectoryDiscovery, RunError, TestDiscovery};
use crate::registry::{CaseRegistry, CaseSetup};

// ============================================================================
// Run Reporter Trait
// ============================================================================

/// Trait for reporting run progress and results.
pub trait RunReporter {
    /// Called before the directory is scanned
    fn on_discovery_start(&mut self, _dir: &Path) {}

    /// Called after a registered unit has been instantiated, before `execute()`
    fn on_case_start(&mut self, _candidate: &Candidate, _identity: &CaseIdentity) {}

    /// Called once the unit's verdict has been recorded
    fn on_case_complete(&mut self, _candidate: &Candidate, _identity: &CaseIdentity, _passed: bool) {}

    /// Called when every candidate has been processed
    fn on_run_complete(&mut self, summary: &Summary);
}

/// Aggregate result of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub discovered: usize,
    pub succeeded: usize,
}

impl Summary {
    /// Units that did not pass. Zero for a hand-built summary with more successes than units.
    pub fn failed(&self) -> usize {
        self.discovered.saturating_sub(self.succeeded)
    }

    /// The console summary line, naming the log file.
    pub fn line(&self, log_file: &str) -> String {
        format!(
            "Ran {} tests. Successful: {}, failed: {}. The log file is {}.",
            self.discovered,
            self.succeeded,
            self.failed(),
            log_file
        )
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} discovered, {} succeeded, {} failed",
            self.discovered,
            self.succeeded,
            self.failed()
        )
    }
}

/// Default console reporter: one summary line on stdout, nothing per unit.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    log_file: String,
}

impl ConsoleReporter {
    pub fn new(log_file: impl Into<String>) -> Self {
        Self {
            log_file: log_file.into(),
        }
    }
}

impl RunReporter for ConsoleReporter {
    fn on_run_complete(&mut self, summary: &Summary) {
        println!("{}", summary.line(&self.log_file));
    }
}

// ============================================================================
// Orchestration
// ============================================================================

/// What the runner does when a stage failure escapes a unit's `execute()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscalationPolicy {
    /// Log the failure and count the unit as failed; the run continues.
    #[default]
    RecordAsFailed,
    /// Stop the run with [`RunError::Escaped`]; no summary is reported.
    Abort,
}

/// Counters owned by a single run. `succeeded <= discovered` at all times.
#[derive(Debug, Default)]
struct RunContext {
    discovered: usize,
    succeeded: usize,
}

impl RunContext {
    /// Count a newly validated unit and return its 1-based discovery number.
    fn record_discovered(&mut self) -> usize {
        self.discovered += 1;
        self.discovered
    }

    fn record_success(&mut self) {
        debug_assert!(self.succeeded < self.discovered);
        self.succeeded += 1;
    }

    fn into_summary(self) -> Summary {
        Summary {
            discovered: self.discovered,
            succeeded: self.succeeded,
        }
    }
}

/// Discovery and orchestration engine.
pub struct Runner<'r, D = DirectoryDiscovery> {
    registry: &'r CaseRegistry,
    discovery: D,
    policy: EscalationPolicy,
}

impl<'r> Runner<'r> {
    pub fn new(registry: &'r CaseRegistry) -> Self {
        Self {
            registry,
            discovery: DirectoryDiscovery::default(),
            policy: EscalationPolicy::default(),
        }
    }
}

impl<'r, D: TestDiscovery> Runner<'r, D> {
    pub fn with_discovery<E: TestDiscovery>(self, discovery: E) -> Runner<'r, E> {
        Runner {
            registry: self.registry,
            discovery,
            policy: self.policy,
        }
    }

    pub fn with_policy(mut self, policy: EscalationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> EscalationPolicy {
        self.policy
    }

    /// Run every registered unit found in `dir`.
    ///
    /// ## Parameters
    /// - `dir`: directory to scan (non-recursive); also handed to each unit as its working directory.
    /// - `reporter`: receives progress hooks and the final summary.
    ///
    /// ## Returns
    /// - (`Summary`): discovered and succeeded counts.
    ///
    /// ## Errors
    /// - `RunError::ReadDir` if `dir` cannot be listed.
    /// - `RunError::Escaped` if a unit lets a stage failure escape and the policy is `Abort`.
    ///
    /// ## Notes
    /// - A matching file with no registry entry is skipped: not counted, not instantiated.
    /// - Units run strictly one at a time in discovery order; the n-th counted unit is named `Test<n>`.
    pub fn run_directory(&self, dir: &Path, reporter: &mut dyn RunReporter) -> Result<Summary, RunError> {
        reporter.on_discovery_start(dir);
        let candidates = self.discovery.discover(dir)?;
        tracing::info!(dir = %dir.display(), candidates = candidates.len(), "scanned test directory");

        let mut context = RunContext::default();
        for candidate in &candidates {
            let Some(registered) = self.registry.lookup(&candidate.unit) else {
                tracing::debug!(unit = %candidate.unit, "no registered test unit, skipping");
                continue;
            };

            let number = context.record_discovered();
            let identity = CaseIdentity::new(format!("Test{}", number));
            let mut case = registered.instantiate(CaseSetup::new(identity, dir));
            reporter.on_case_start(candidate, case.identity());

            let passed = match case.execute() {
                Ok(passed) => passed,
                Err(failure) => self.escalate(candidate, case.identity(), failure)?,
            };

            if passed {
                context.record_success();
            }
            tracing::info!(unit = %candidate.unit, name = case.name(), passed, "test unit finished");
            reporter.on_case_complete(candidate, case.identity(), passed);
        }

        let summary = context.into_summary();
        tracing::info!(%summary, "run complete");
        reporter.on_run_complete(&summary);
        Ok(summary)
    }

    fn escalate(&self, candidate: &Candidate, identity: &CaseIdentity, failure: StageFailure) -> Result<bool, RunError> {
        match self.policy {
            EscalationPolicy::RecordAsFailed => {
                tracing::error!(
                    unit = %candidate.unit,
                    name = identity.name(),
                    "unhandled stage failure, counting as failed: {}",
                    failure
                );
                Ok(false)
            }
            EscalationPolicy::Abort => {
                tracing::error!(
                    unit = %candidate.unit,
                    name = identity.name(),
                    "unhandled stage failure, aborting run: {}",
                    failure
                );
                Err(RunError::Escaped {
                    unit: candidate.unit.clone(),
                    name: identity.name().to_string(),
                    failure,
                })
            }
        }
    }
}

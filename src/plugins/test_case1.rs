//! Even-second directory listing.
//!
//! Prepares only when the current UNIX time in whole seconds is even, then lists the regular files of the
//! scanned directory. Clean-up has nothing to release. Only preparation failures are handled by this unit;
//! a running failure escapes `execute()`.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use caserun_core::{CASE_LOG_TARGET, CaseIdentity, FailureKind, HandledFailures, StageFailure, StageResult, TestCase};

use crate::registry::{CaseRegistry, CaseSetup};

pub const UNIT: &str = "test_case1";

pub fn register(registry: &mut CaseRegistry) {
    registry.register(UNIT, EvenSecondListing::new);
}

pub struct EvenSecondListing {
    identity: CaseIdentity,
    directory: PathBuf,
    clock: fn() -> SystemTime,
    files: Vec<String>,
}

impl EvenSecondListing {
    pub fn new(setup: CaseSetup) -> Self {
        Self {
            identity: setup.identity,
            directory: setup.directory,
            clock: SystemTime::now,
            files: Vec::new(),
        }
    }

    /// Replace the wall clock used by `prepare`.
    pub fn with_clock(mut self, clock: fn() -> SystemTime) -> Self {
        self.clock = clock;
        self
    }

    /// Files found by the last successful `run`, sorted.
    pub fn files(&self) -> &[String] {
        &self.files
    }
}

impl TestCase for EvenSecondListing {
    fn identity(&self) -> &CaseIdentity {
        &self.identity
    }

    fn prepare(&mut self) -> StageResult {
        tracing::info!(target: CASE_LOG_TARGET, "Check if current time value (in s) is even");
        let seconds = (self.clock)()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StageFailure::preparation(format!("system clock is before the UNIX epoch: {}", e)))?
            .as_secs();
        if seconds % 2 != 0 {
            return Err(StageFailure::preparation(
                "the test case should be launched at an even system time (in s)",
            ));
        }
        Ok(())
    }

    fn run(&mut self) -> StageResult {
        tracing::info!(target: CASE_LOG_TARGET, dir = %self.directory.display(), "Get files from the directory");
        let entries = fs::read_dir(&self.directory)
            .map_err(|e| StageFailure::running(format!("cannot list '{}': {}", self.directory.display(), e)))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StageFailure::running(e.to_string()))?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();

        tracing::info!(target: CASE_LOG_TARGET, "Files from the directory: {:?}", files);
        self.files = files;
        Ok(())
    }

    fn clean_up(&mut self) -> StageResult {
        Ok(())
    }

    fn handled_failures(&self) -> HandledFailures {
        HandledFailures::NONE.with(FailureKind::Preparation)
    }
}

//! Scratch file creation and removal.
//!
//! Prepares only on machines with at least 1 GiB of physical memory, writes `tmp/test` (1024 random bytes)
//! under the scanned directory and removes it again during clean-up.
//!
//! This unit handles running and clean-up failures but not preparation failures, so a machine below the
//! memory threshold makes the failure escape `execute()`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use caserun_core::{CASE_LOG_TARGET, CaseIdentity, FailureKind, HandledFailures, StageFailure, StageResult, TestCase};
use rand::RngCore;

use crate::registry::{CaseRegistry, CaseSetup};

pub const UNIT: &str = "test_case2";

/// Scratch file, relative to the scanned directory
pub const ARTIFACT: &str = "tmp/test";

const ARTIFACT_SIZE: usize = 1024;
const MIN_MEMORY_BYTES: u64 = 1024 * 1024 * 1024;

/// Reports total physical memory in bytes.
pub type MemoryProbe = fn() -> Result<u64, String>;

pub fn register(registry: &mut CaseRegistry) {
    registry.register(UNIT, ScratchFileCase::new);
}

pub struct ScratchFileCase {
    identity: CaseIdentity,
    directory: PathBuf,
    probe: MemoryProbe,
}

impl ScratchFileCase {
    pub fn new(setup: CaseSetup) -> Self {
        Self {
            identity: setup.identity,
            directory: setup.directory,
            probe: physical_memory,
        }
    }

    pub fn with_memory_probe(mut self, probe: MemoryProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.directory.join(ARTIFACT)
    }
}

impl TestCase for ScratchFileCase {
    fn identity(&self) -> &CaseIdentity {
        &self.identity
    }

    fn prepare(&mut self) -> StageResult {
        tracing::info!(target: CASE_LOG_TARGET, "Check if RAM volume is at least 1 GB");
        let bytes = (self.probe)().map_err(StageFailure::preparation)?;
        let gib = bytes as f64 / MIN_MEMORY_BYTES as f64;
        if bytes < MIN_MEMORY_BYTES {
            return Err(StageFailure::preparation(format!(
                "computer's RAM should be at least 1 GB, found {:.2} GB",
                gib
            )));
        }
        tracing::info!(target: CASE_LOG_TARGET, "RAM volume is at least 1 GB ({:.2} GB)", gib);
        Ok(())
    }

    fn run(&mut self) -> StageResult {
        let path = self.artifact_path();
        tracing::info!(
            target: CASE_LOG_TARGET,
            "Start creating {} of {} bytes with random content",
            ARTIFACT,
            ARTIFACT_SIZE
        );
        write_random_file(&path, ARTIFACT_SIZE)
            .map_err(|e| StageFailure::running(format!("error creating {}: {}", ARTIFACT, e)))?;
        tracing::info!(target: CASE_LOG_TARGET, "Successfully created {}", ARTIFACT);
        Ok(())
    }

    fn clean_up(&mut self) -> StageResult {
        tracing::info!(target: CASE_LOG_TARGET, "Start removing {}", ARTIFACT);
        fs::remove_file(self.artifact_path())
            .map_err(|e| StageFailure::clean_up(format!("error removing {}: {}", ARTIFACT, e)))?;
        tracing::info!(target: CASE_LOG_TARGET, "Successfully removed {}", ARTIFACT);
        Ok(())
    }

    fn handled_failures(&self) -> HandledFailures {
        HandledFailures::NONE
            .with(FailureKind::Running)
            .with(FailureKind::CleanUp)
    }
}

fn write_random_file(path: &Path, size: usize) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut content = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut content);
    fs::write(path, content)
}

#[cfg_attr(not(unix), allow(dead_code))]
fn total_memory(page_size: u64, pages: u64) -> Result<u64, String> {
    page_size
        .checked_mul(pages)
        .ok_or_else(|| format!("physical memory overflows: {} pages of {} bytes", pages, page_size))
}

/// Total physical memory: page size times the number of physical pages.
#[cfg(unix)]
pub fn physical_memory() -> Result<u64, String> {
    use nix::unistd::{SysconfVar, sysconf};

    let query = |var: SysconfVar| -> Result<u64, String> {
        let value = sysconf(var)
            .map_err(|e| format!("sysconf({:?}) failed: {}", var, e))?
            .ok_or_else(|| format!("sysconf({:?}) is not available", var))?;
        u64::try_from(value).map_err(|_| format!("sysconf({:?}) returned {}", var, value))
    };

    total_memory(query(SysconfVar::PAGE_SIZE)?, query(SysconfVar::_PHYS_PAGES)?)
}

#[cfg(not(unix))]
pub fn physical_memory() -> Result<u64, String> {
    Err("physical memory probe is only available on unix".to_string())
}

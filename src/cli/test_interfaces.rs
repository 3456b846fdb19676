//! Test runner I/O boundary interfaces
//!
//! This module defines the filesystem side of a run:
//! - the naming convention that marks a file as a candidate test unit
//! - test discovery (non-recursive directory scan)
//! - the error type shared by discovery and orchestration
//!
//! Discovery is a trait so the engine can be driven from something other than a real directory listing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use caserun_core::StageFailure;
use thiserror::Error;

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot read test directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{unit} ({name}) aborted the run: {failure}")]
    Escaped {
        unit: String,
        name: String,
        #[source]
        failure: StageFailure,
    },
}

// ============================================================================
// Naming Convention
// ============================================================================

/// File naming convention for test units: `<prefix><digits>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConvention {
    prefix: String,
    extension: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::new("test_case", "rs")
    }
}

impl NamingConvention {
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    /// Unit name for a matching file name (`test_case12.rs` -> `test_case12`), `None` otherwise.
    ///
    /// ## Notes
    /// - At least one ASCII digit is required; leading zeros are allowed.
    /// - Matching is exact and case-sensitive.
    pub fn unit_name<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let stem = file_name
            .strip_suffix(self.extension.as_str())
            .and_then(|rest| rest.strip_suffix('.'))?;
        let digits = stem.strip_prefix(self.prefix.as_str())?;
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(stem)
        } else {
            None
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.unit_name(file_name).is_some()
    }
}

// ============================================================================
// Test Discovery Interface
// ============================================================================

/// A file that matched the naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Unit name looked up in the registry.
    pub unit: String,
    pub path: PathBuf,
}

/// Find candidate test units in a directory.
pub trait TestDiscovery {
    /// Candidates in `dir`, in the order they should run.
    fn discover(&self, dir: &Path) -> Result<Vec<Candidate>, RunError>;
}

/// Filesystem-based discovery.
///
/// Scans immediate children only and keeps the directory listing's native order. Subdirectories, names
/// that are not valid UTF-8 and names that do not match the convention are skipped without error.
#[derive(Debug, Clone, Default)]
pub struct DirectoryDiscovery {
    convention: NamingConvention,
}

impl DirectoryDiscovery {
    pub fn new(convention: NamingConvention) -> Self {
        Self { convention }
    }
}

impl TestDiscovery for DirectoryDiscovery {
    fn discover(&self, dir: &Path) -> Result<Vec<Candidate>, RunError> {
        let read_err = |source| RunError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut candidates = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };

            match self.convention.unit_name(name) {
                Some(unit) => {
                    tracing::debug!(file = name, unit, "candidate test unit");
                    candidates.push(Candidate {
                        unit: unit.to_string(),
                        path: entry.path(),
                    });
                }
                None => tracing::trace!(file = name, "ignored, does not match naming convention"),
            }
        }

        Ok(candidates)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_convention_matches_digits_only() {
        let convention = NamingConvention::default();
        assert_eq!(convention.unit_name("test_case1.rs"), Some("test_case1"));
        assert_eq!(convention.unit_name("test_case007.rs"), Some("test_case007"));
        assert_eq!(convention.unit_name("test_case.rs"), None);
        assert_eq!(convention.unit_name("test_case1a.rs"), None);
        assert_eq!(convention.unit_name("test_case1.rs.bak"), None);
        assert_eq!(convention.unit_name("test_case1rs"), None);
        assert_eq!(convention.unit_name("my_test_case1.rs"), None);
        assert_eq!(convention.unit_name("Test_case1.rs"), None);
        assert_eq!(convention.unit_name("helper.rs"), None);
    }

    #[test]
    fn test_convention_with_other_extension() {
        let convention = NamingConvention::new("test_case", "py");
        assert!(convention.matches("test_case2.py"));
        assert!(!convention.matches("test_case2.rs"));
        assert!(!convention.matches("test_case٣.py"));
    }

    #[test]
    fn test_discover_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test_case1.rs"), "").unwrap();
        fs::create_dir(dir.path().join("test_case2.rs")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("test_case3.rs"), "").unwrap();

        let found = DirectoryDiscovery::default().discover(dir.path()).unwrap();
        let units: Vec<&str> = found.iter().map(|c| c.unit.as_str()).collect();
        assert_eq!(units, vec!["test_case1"]);
        assert_eq!(found[0].path, dir.path().join("test_case1.rs"));
    }

    #[test]
    fn test_discover_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let err = DirectoryDiscovery::default().discover(&missing).unwrap_err();
        assert!(matches!(err, RunError::ReadDir { ref path, .. } if *path == missing));
        assert!(err.to_string().starts_with("cannot read test directory"));
    }
}

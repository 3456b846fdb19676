//! CLI module for caserun
//!
//! ```text
//! caserun [DIR] [--log-config FILE] [--fail-fast]
//! ```
//!
//! Scans `DIR` (default: current directory) for test units, runs each one and prints a single summary line.
//!
//! ## Modules
//!
//! - `test_interfaces` - Naming convention, discovery and run errors
//! - `test_runner` - Orchestration engine and reporting
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod test_interfaces;
pub mod test_runner;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::logging::{self, DEFAULT_CONFIG_FILE, LoggingConfig, LoggingError};
use crate::plugins;
use crate::version::CASERUN_VERSION;
use test_runner::{ConsoleReporter, EscalationPolicy, Runner};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Logging could not be configured; nothing was discovered.
    pub const CONFIG: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl From<LoggingError> for CliError {
    fn from(err: LoggingError) -> Self {
        CliError::new(format!("Error: {}", err), ExitCode::CONFIG)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Discover and run test-case units in a directory
#[derive(Parser, Debug)]
#[command(name = "caserun")]
#[command(version = CASERUN_VERSION)]
#[command(about = "Discover and run test-case units in a directory", long_about = None)]
pub struct Cli {
    /// Directory to scan for test_case<N>.rs units (not recursive)
    #[arg(value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Logging configuration file
    #[arg(long = "log-config", value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub log_config: PathBuf,

    /// Abort the whole run when a stage failure escapes a test unit
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,
}

impl Cli {
    pub fn escalation_policy(&self) -> EscalationPolicy {
        if self.fail_fast {
            EscalationPolicy::Abort
        } else {
            EscalationPolicy::RecordAsFailed
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    // Logging must be in place before anything is discovered
    let config = LoggingConfig::load(&cli.log_config)?;
    logging::init(&config)?;
    tracing::info!(version = CASERUN_VERSION, dir = %cli.directory.display(), "starting run");

    let registry = plugins::builtin_registry();
    let runner = Runner::new(&registry).with_policy(cli.escalation_policy());
    let mut reporter = ConsoleReporter::new(config.log_file_name());

    runner
        .run_directory(&cli.directory, &mut reporter)
        .map_err(|e| CliError::failure(format!("Error: {}", e)))?;

    // Failed units are reported through the summary line only
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["caserun"]).unwrap();
        assert_eq!(cli.directory, PathBuf::from("."));
        assert_eq!(cli.log_config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert!(!cli.fail_fast);
        assert_eq!(cli.escalation_policy(), EscalationPolicy::RecordAsFailed);
    }

    #[test]
    fn test_cli_parse_directory_and_flags() {
        let cli = Cli::try_parse_from(["caserun", "cases", "--log-config", "conf/log.toml", "--fail-fast"]).unwrap();
        assert_eq!(cli.directory, PathBuf::from("cases"));
        assert_eq!(cli.log_config, PathBuf::from("conf/log.toml"));
        assert_eq!(cli.escalation_policy(), EscalationPolicy::Abort);
    }

    #[test]
    fn test_cli_rejects_second_directory() {
        assert!(Cli::try_parse_from(["caserun", "a", "b"]).is_err());
    }

    #[test]
    fn test_missing_logging_config_stops_before_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            directory: dir.path().join("does-not-exist"),
            log_config: dir.path().join(DEFAULT_CONFIG_FILE),
            fail_fast: false,
        };
        let err = execute(cli).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::CONFIG);
        assert!(err.message.starts_with("Error: No logging configuration file"));
    }
}

//! Logging configuration.
//!
//! The configuration resource is a TOML file (default `logging.toml` in the working directory). A run
//! refuses to start without it. Events go to a plain-text log file through a `tracing-subscriber` fmt
//! subscriber; test units log through the [`caserun_core::CASE_LOG_TARGET`] target.
//!
//! ```toml
//! file = "log.txt"
//! level = "info"
//! append = true
//! with_target = true
//! ```

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Default location of the logging configuration resource
pub const DEFAULT_CONFIG_FILE: &str = "logging.toml";

/// Default log file
pub const DEFAULT_LOG_FILE: &str = "log.txt";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("No logging configuration file ({}).", .0.display())]
    Missing(PathBuf),

    #[error("cannot read logging configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid logging configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid log level '{level}': {message}")]
    Level { level: String, message: String },

    #[error("cannot open log file '{}': {source}", path.display())]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot install log subscriber: {0}")]
    Install(String),
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log file, relative to the working directory
    pub file: PathBuf,
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    pub level: String,
    /// Append to an existing log file instead of truncating it
    pub append: bool,
    /// Include the event target in each record
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
            level: "info".to_string(),
            append: true,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Load the configuration resource.
    ///
    /// ## Errors
    /// - `LoggingError::Missing` if `path` does not exist.
    /// - `LoggingError::Read` / `LoggingError::Parse` if it cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, LoggingError> {
        if !path.is_file() {
            return Err(LoggingError::Missing(path.to_path_buf()));
        }
        let source = fs::read_to_string(path).map_err(|source| LoggingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&source).map_err(|source| LoggingError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Name of the log file as shown in the summary line.
    pub fn log_file_name(&self) -> String {
        self.file.display().to_string()
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level).map_err(|e| LoggingError::Level {
            level: self.level.clone(),
            message: e.to_string(),
        })
    }
}

/// Install the global log subscriber described by `config`.
///
/// ## Errors
/// - `LoggingError::Level` for an unparsable level directive.
/// - `LoggingError::OpenLogFile` if the log file cannot be opened.
/// - `LoggingError::Install` if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.filter()?;
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(config.append)
        .truncate(!config.append)
        .open(&config.file)
        .map_err(|source| LoggingError::OpenLogFile {
            path: config.file.clone(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(config.with_target)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        let err = LoggingConfig::load(&path).unwrap_err();
        assert!(matches!(err, LoggingError::Missing(ref p) if *p == path));
        assert!(err.to_string().starts_with("No logging configuration file"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "").unwrap();
        assert_eq!(LoggingConfig::load(&path).unwrap(), LoggingConfig::default());
        assert_eq!(LoggingConfig::default().log_file_name(), "log.txt");
    }

    #[test]
    fn test_config_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "file = \"runs.log\"\nlevel = \"debug\"\nappend = false\n").unwrap();

        let config = LoggingConfig::load(&path).unwrap();
        assert_eq!(config.file, PathBuf::from("runs.log"));
        assert_eq!(config.level, "debug");
        assert!(!config.append);
        assert!(config.with_target);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "format = \"json\"\n").unwrap();
        assert!(matches!(LoggingConfig::load(&path), Err(LoggingError::Parse { .. })));
    }

    #[test]
    fn test_bundled_config_parses() {
        let config: LoggingConfig = toml::from_str(include_str!("../logging.toml")).unwrap();
        assert_eq!(config.log_file_name(), DEFAULT_LOG_FILE);
    }
}

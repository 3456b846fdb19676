#![forbid(unsafe_code)]
//! caserun: a minimal test-harness engine
//!
//! caserun scans a directory for files named `test_case<N>.rs`, instantiates the test unit registered under
//! each matching name, drives its prepare/run/clean-up lifecycle through `execute()` and reports how many
//! units passed.
//!
//! The lifecycle contract, failure taxonomy and stage instrumentation live in `caserun_core`; this crate
//! provides the registry, discovery, the orchestration engine, logging setup, the CLI and the bundled
//! example units.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod logging;
pub mod plugins;
pub mod registry;
pub mod version;

pub use caserun_core::{
    CaseId, CaseIdentity, FailureKind, HandledFailures, Instrumented, LifecycleState, Origin, Stage, StageFailure,
    StageResult, TestCase,
};

pub use cli::test_interfaces::{Candidate, DirectoryDiscovery, NamingConvention, RunError, TestDiscovery};
pub use cli::test_runner::{ConsoleReporter, EscalationPolicy, RunReporter, Runner, Summary};
pub use registry::{CaseRegistry, CaseSetup};

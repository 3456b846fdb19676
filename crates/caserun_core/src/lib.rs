//! Provide the lifecycle contract shared by the caserun engine and every test unit it drives.
//!
//! This crate is intentionally small and dependency-light. It contains:
//! - the stage failure taxonomy ([`StageFailure`]) used instead of exceptions for control flow,
//! - the lifecycle contract ([`TestCase`]) with its single shared `execute()` orchestration,
//! - the stage instrumentation wrapper ([`instrument`], [`Instrumented`]).
//!
//! ## Notes
//!
//! - No filesystem IO lives here; discovery, registry and reporting belong to the `caserun` crate.
//! - The only global state is the process-wide [`CaseId`] counter.

pub mod failure;
pub mod identity;
pub mod instrument;
pub mod lifecycle;
pub mod stage;

pub use failure::{FailureKind, StageFailure, StageResult};
pub use identity::{CaseId, CaseIdentity};
pub use instrument::{CASE_LOG_TARGET, Instrumented, Origin, instrument};
pub use lifecycle::{HandledFailures, LifecycleState, TestCase, orchestrate};
pub use stage::Stage;

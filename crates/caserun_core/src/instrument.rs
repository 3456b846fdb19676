//! Stage-boundary instrumentation.
//!
//! [`instrument`] wraps any stage function so that it emits a start event before and a finish event after a
//! successful return, tagged with the [`Origin`] of the code that performed the wrap. Failures pass through
//! untouched and suppress the finish event. [`Instrumented`] applies the wrapper to all four lifecycle
//! operations of a [`TestCase`]; the registry applies it when a unit is registered.

use std::fmt;
use std::panic::Location;

use crate::failure::StageResult;
use crate::identity::CaseIdentity;
use crate::lifecycle::{HandledFailures, LifecycleState, TestCase, orchestrate};
use crate::stage::Stage;

/// Tracing target of every test unit log event.
pub const CASE_LOG_TARGET: &str = "caserun::cases";

/// File name of the source that defined an instrumented stage, e.g. `test_case1.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Origin(&'static str);

impl Origin {
    /// Resolve the origin from the calling location.
    ///
    /// ## Notes
    /// - `#[track_caller]` propagates through other `#[track_caller]` functions, so this resolves to the
    ///   first caller up the chain that is not itself tracked.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_path(Location::caller().file())
    }

    /// Build an origin from a source path, keeping only its final component.
    pub fn from_path(path: &'static str) -> Self {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        Origin(file_name)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Wrap a stage function with start/finish log events.
///
/// ## Parameters
/// - `origin`: resolved by the caller at wrap time.
/// - `stage`: selects the start/finish labels.
/// - `stage_fn`: the stage body; its argument is passed through unchanged.
///
/// ## Returns
/// - A function with the same signature as `stage_fn`. Its result, including a failure or the boolean
///   verdict of `execute`, is returned unchanged.
pub fn instrument<A, T, F>(origin: Origin, stage: Stage, mut stage_fn: F) -> impl FnMut(A) -> StageResult<T>
where
    F: FnMut(A) -> StageResult<T>,
{
    move |arg| {
        tracing::info!(target: CASE_LOG_TARGET, stage = stage.name(), "{}: {}", origin, stage.start_label());
        let value = stage_fn(arg)?;
        tracing::info!(target: CASE_LOG_TARGET, stage = stage.name(), "{}: {}", origin, stage.finish_label());
        Ok(value)
    }
}

/// A [`TestCase`] whose four lifecycle operations are instrumented.
pub struct Instrumented<C> {
    inner: C,
    origin: Origin,
    state: LifecycleState,
}

impl<C: TestCase> Instrumented<C> {
    /// Wrap `inner`, taking the origin from the calling location.
    #[track_caller]
    pub fn new(inner: C) -> Self {
        Self::with_origin(inner, Origin::caller())
    }

    pub fn with_origin(inner: C, origin: Origin) -> Self {
        Self {
            inner,
            origin,
            state: LifecycleState::Created,
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    fn stage(&mut self, stage: Stage, body: fn(&mut C) -> StageResult) -> StageResult {
        self.state = self.state.entering(stage);
        let result = instrument(self.origin, stage, body)(&mut self.inner);
        self.state = self.state.settled(stage, result.is_ok());
        result
    }
}

impl<C: TestCase> TestCase for Instrumented<C> {
    fn identity(&self) -> &CaseIdentity {
        self.inner.identity()
    }

    fn prepare(&mut self) -> StageResult {
        self.stage(Stage::Prepare, C::prepare)
    }

    fn run(&mut self) -> StageResult {
        self.stage(Stage::Run, C::run)
    }

    fn clean_up(&mut self) -> StageResult {
        self.stage(Stage::CleanUp, C::clean_up)
    }

    fn handled_failures(&self) -> HandledFailures {
        self.inner.handled_failures()
    }

    fn execute(&mut self) -> StageResult<bool> {
        let handled = self.inner.handled_failures();
        let result =
            instrument(self.origin, Stage::Execute, |case: &mut Self| orchestrate(case, handled))(&mut *self);
        if let Ok(passed) = result {
            self.state = LifecycleState::Done { passed };
        }
        result
    }
}

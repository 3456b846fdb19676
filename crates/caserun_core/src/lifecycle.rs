//! Lifecycle contract for test units.
//!
//! ## States
//!
//! ```text
//! Created -> Preparing -> Prepared | PreparationFailed
//!         -> Running   -> Ran      | RunningFailed
//!         -> CleaningUp -> CleanedUp | CleanUpFailed
//!         -> Done { passed }
//! ```
//!
//! `execute()` is the only entry point that drives this machine. Its orchestration is written once in
//! [`orchestrate`]; implementers supply the stage bodies and, optionally, narrow the set of failure kinds
//! `execute()` converts into a failed verdict ([`TestCase::handled_failures`]). A failure outside that set
//! escapes `execute()` as `Err`, and the engine decides what that means for the run.

use crate::failure::{FailureKind, StageFailure, StageResult};
use crate::identity::{CaseId, CaseIdentity};
use crate::instrument::CASE_LOG_TARGET;
use crate::stage::Stage;

/// A discoverable test unit.
pub trait TestCase {
    fn identity(&self) -> &CaseIdentity;

    /// Check environmental preconditions. Signals [`StageFailure::Preparation`] when unmet.
    fn prepare(&mut self) -> StageResult;

    /// Perform the test body. Signals [`StageFailure::Running`] when it cannot produce its effect.
    fn run(&mut self) -> StageResult;

    /// Release whatever `run` produced. Signals [`StageFailure::CleanUp`] on failure.
    fn clean_up(&mut self) -> StageResult;

    /// Failure kinds that `execute()` turns into `Ok(false)` instead of letting them escape.
    fn handled_failures(&self) -> HandledFailures {
        HandledFailures::ALL
    }

    /// Drive prepare, run and clean-up in order and report whether the unit passed.
    fn execute(&mut self) -> StageResult<bool> {
        let handled = self.handled_failures();
        orchestrate(self, handled)
    }

    fn name(&self) -> &str {
        self.identity().name()
    }

    fn id(&self) -> CaseId {
        self.identity().id()
    }
}

impl<C: TestCase + ?Sized> TestCase for Box<C> {
    fn identity(&self) -> &CaseIdentity {
        (**self).identity()
    }

    fn prepare(&mut self) -> StageResult {
        (**self).prepare()
    }

    fn run(&mut self) -> StageResult {
        (**self).run()
    }

    fn clean_up(&mut self) -> StageResult {
        (**self).clean_up()
    }

    fn handled_failures(&self) -> HandledFailures {
        (**self).handled_failures()
    }

    fn execute(&mut self) -> StageResult<bool> {
        (**self).execute()
    }
}

/// The set of [`FailureKind`]s an `execute()` implementation handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandledFailures {
    preparation: bool,
    running: bool,
    clean_up: bool,
}

impl HandledFailures {
    pub const ALL: HandledFailures = HandledFailures {
        preparation: true,
        running: true,
        clean_up: true,
    };

    pub const NONE: HandledFailures = HandledFailures {
        preparation: false,
        running: false,
        clean_up: false,
    };

    /// Add `kind` to the set.
    pub const fn with(mut self, kind: FailureKind) -> Self {
        match kind {
            FailureKind::Preparation => self.preparation = true,
            FailureKind::Running => self.running = true,
            FailureKind::CleanUp => self.clean_up = true,
        }
        self
    }

    pub const fn contains(self, kind: FailureKind) -> bool {
        match kind {
            FailureKind::Preparation => self.preparation,
            FailureKind::Running => self.running,
            FailureKind::CleanUp => self.clean_up,
        }
    }

    pub fn covers(self, failure: &StageFailure) -> bool {
        self.contains(failure.kind())
    }
}

impl Default for HandledFailures {
    fn default() -> Self {
        Self::ALL
    }
}

/// Where a test unit is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Preparing,
    Prepared,
    PreparationFailed,
    Running,
    Ran,
    RunningFailed,
    CleaningUp,
    CleanedUp,
    CleanUpFailed,
    Done { passed: bool },
}

impl LifecycleState {
    /// State while `stage` is in progress. `Execute` has no in-progress state of its own.
    pub fn entering(self, stage: Stage) -> Self {
        match stage {
            Stage::Prepare => LifecycleState::Preparing,
            Stage::Run => LifecycleState::Running,
            Stage::CleanUp => LifecycleState::CleaningUp,
            Stage::Execute => self,
        }
    }

    /// State after `stage` returned.
    pub fn settled(self, stage: Stage, succeeded: bool) -> Self {
        match (stage, succeeded) {
            (Stage::Prepare, true) => LifecycleState::Prepared,
            (Stage::Prepare, false) => LifecycleState::PreparationFailed,
            (Stage::Run, true) => LifecycleState::Ran,
            (Stage::Run, false) => LifecycleState::RunningFailed,
            (Stage::CleanUp, true) => LifecycleState::CleanedUp,
            (Stage::CleanUp, false) => LifecycleState::CleanUpFailed,
            (Stage::Execute, _) => self,
        }
    }

    pub fn is_done(self) -> bool {
        matches!(self, LifecycleState::Done { .. })
    }
}

/// Shared `execute()` orchestration.
///
/// ## Parameters
/// - `case`: the unit to drive; its stages are called through `case`, so a decorator passing itself here
///   gets its own (wrapped) stages invoked.
/// - `handled`: failure kinds converted into `Ok(false)`.
///
/// ## Returns
/// - `Ok(true)` when every stage completed.
/// - `Ok(false)` when a stage failed with a handled kind; the failure is logged at error level.
/// - `Err(failure)` when a stage failed with an unhandled kind.
///
/// ## Notes
/// - The first failing stage short-circuits: a failed prepare never reaches run or clean-up, and a failed
///   run never reaches clean-up.
pub fn orchestrate<C: TestCase + ?Sized>(case: &mut C, handled: HandledFailures) -> StageResult<bool> {
    tracing::info!(target: CASE_LOG_TARGET, "Test: name: {}, tc_id: {}", case.name(), case.id());

    for stage in Stage::ORDERED {
        let result = match stage {
            Stage::Prepare => case.prepare(),
            Stage::Run => case.run(),
            _ => case.clean_up(),
        };

        if let Err(failure) = result {
            if handled.covers(&failure) {
                tracing::error!(target: CASE_LOG_TARGET, name = case.name(), "{}", failure);
                return Ok(false);
            }
            tracing::warn!(
                target: CASE_LOG_TARGET,
                name = case.name(),
                "{} is not handled by this test case and escapes execute()",
                failure
            );
            return Err(failure);
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stage script: each stage either succeeds or fails with its own kind.
    struct Scripted {
        identity: CaseIdentity,
        fail_at: Option<Stage>,
        handled: HandledFailures,
        calls: Vec<Stage>,
    }

    impl Scripted {
        fn new(fail_at: Option<Stage>) -> Self {
            Self {
                identity: CaseIdentity::new("Scripted"),
                fail_at,
                handled: HandledFailures::ALL,
                calls: Vec::new(),
            }
        }

        fn step(&mut self, stage: Stage, failure: fn(&'static str) -> StageFailure) -> StageResult {
            self.calls.push(stage);
            if self.fail_at == Some(stage) { Err(failure("scripted")) } else { Ok(()) }
        }
    }

    impl TestCase for Scripted {
        fn identity(&self) -> &CaseIdentity {
            &self.identity
        }

        fn prepare(&mut self) -> StageResult {
            self.step(Stage::Prepare, StageFailure::preparation)
        }

        fn run(&mut self) -> StageResult {
            self.step(Stage::Run, StageFailure::running)
        }

        fn clean_up(&mut self) -> StageResult {
            self.step(Stage::CleanUp, StageFailure::clean_up)
        }

        fn handled_failures(&self) -> HandledFailures {
            self.handled
        }
    }

    #[test]
    fn test_all_stages_pass() {
        let mut case = Scripted::new(None);
        assert_eq!(case.execute(), Ok(true));
        assert_eq!(case.calls, vec![Stage::Prepare, Stage::Run, Stage::CleanUp]);
    }

    #[test]
    fn test_preparation_failure_skips_run_and_clean_up() {
        let mut case = Scripted::new(Some(Stage::Prepare));
        assert_eq!(case.execute(), Ok(false));
        assert_eq!(case.calls, vec![Stage::Prepare]);
    }

    #[test]
    fn test_running_failure_skips_clean_up() {
        let mut case = Scripted::new(Some(Stage::Run));
        assert_eq!(case.execute(), Ok(false));
        assert_eq!(case.calls, vec![Stage::Prepare, Stage::Run]);
    }

    #[test]
    fn test_clean_up_failure_fails_the_case() {
        let mut case = Scripted::new(Some(Stage::CleanUp));
        assert_eq!(case.execute(), Ok(false));
        assert_eq!(case.calls.len(), 3);
    }

    #[test]
    fn test_unhandled_failure_escapes() {
        let mut case = Scripted::new(Some(Stage::Prepare));
        case.handled = HandledFailures::NONE.with(FailureKind::Running);
        assert_eq!(case.execute(), Err(StageFailure::preparation("scripted")));
    }

    #[test]
    fn test_handled_failures_builder() {
        let set = HandledFailures::NONE
            .with(FailureKind::Running)
            .with(FailureKind::CleanUp);
        assert!(!set.contains(FailureKind::Preparation));
        assert!(set.contains(FailureKind::Running));
        assert!(set.covers(&StageFailure::clean_up("x")));
        assert_eq!(HandledFailures::default(), HandledFailures::ALL);
    }

    #[test]
    fn test_boxed_case_uses_inner_policy() {
        let mut inner = Scripted::new(Some(Stage::Run));
        inner.handled = HandledFailures::NONE;
        let mut boxed: Box<dyn TestCase> = Box::new(inner);
        assert_eq!(boxed.execute(), Err(StageFailure::running("scripted")));
    }

    #[test]
    fn test_state_transitions() {
        let state = LifecycleState::Created.entering(Stage::Prepare);
        assert_eq!(state, LifecycleState::Preparing);
        assert_eq!(state.settled(Stage::Prepare, false), LifecycleState::PreparationFailed);
        assert_eq!(
            LifecycleState::Running.settled(Stage::Run, true),
            LifecycleState::Ran
        );
        assert_eq!(
            LifecycleState::CleanedUp.entering(Stage::Execute),
            LifecycleState::CleanedUp
        );
        assert!(LifecycleState::Done { passed: false }.is_done());
    }
}

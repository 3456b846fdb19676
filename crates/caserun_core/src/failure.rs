//! Stage failure taxonomy.
//!
//! Three disjoint, terminal failure kinds, one per lifecycle stage. A failure always names the stage that
//! produced it; there is no catch-all variant and plugins cannot extend the set.

use thiserror::Error;

use crate::stage::Stage;

/// A failure signalled by one lifecycle stage, carrying a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageFailure {
    #[error("preparation failed: {0}")]
    Preparation(String),

    #[error("running failed: {0}")]
    Running(String),

    #[error("clean-up failed: {0}")]
    CleanUp(String),
}

/// Fieldless tag of a [`StageFailure`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Preparation,
    Running,
    CleanUp,
}

/// Result of a single lifecycle stage.
pub type StageResult<T = ()> = Result<T, StageFailure>;

impl StageFailure {
    pub fn preparation(message: impl Into<String>) -> Self {
        Self::Preparation(message.into())
    }

    pub fn running(message: impl Into<String>) -> Self {
        Self::Running(message.into())
    }

    pub fn clean_up(message: impl Into<String>) -> Self {
        Self::CleanUp(message.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Preparation(_) => FailureKind::Preparation,
            Self::Running(_) => FailureKind::Running,
            Self::CleanUp(_) => FailureKind::CleanUp,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Preparation(message) | Self::Running(message) | Self::CleanUp(message) => message,
        }
    }

    /// The lifecycle stage that produced this failure.
    pub fn stage(&self) -> Stage {
        self.kind().stage()
    }
}

impl FailureKind {
    pub fn stage(self) -> Stage {
        match self {
            FailureKind::Preparation => Stage::Prepare,
            FailureKind::Running => Stage::Run,
            FailureKind::CleanUp => Stage::CleanUp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_stage() {
        let failure = StageFailure::preparation("not enough memory");
        assert_eq!(failure.to_string(), "preparation failed: not enough memory");

        let failure = StageFailure::clean_up("tmp/test is gone");
        assert_eq!(failure.to_string(), "clean-up failed: tmp/test is gone");
    }

    #[test]
    fn test_kind_and_stage_agree() {
        let cases = [
            (StageFailure::preparation("a"), FailureKind::Preparation, Stage::Prepare),
            (StageFailure::running("b"), FailureKind::Running, Stage::Run),
            (StageFailure::clean_up("c"), FailureKind::CleanUp, Stage::CleanUp),
        ];
        for (failure, kind, stage) in cases {
            assert_eq!(failure.kind(), kind);
            assert_eq!(failure.stage(), stage);
        }
    }

    #[test]
    fn test_message_is_unchanged() {
        assert_eq!(StageFailure::running("disk full").message(), "disk full");
    }
}

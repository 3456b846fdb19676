//! Lifecycle stage vocabulary.

use std::fmt;

/// One instrumented boundary of a test unit's lifecycle.
///
/// `Prepare`, `Run` and `CleanUp` are the ordered stages; `Execute` is the orchestration step that
/// sequences them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Prepare,
    Run,
    CleanUp,
    Execute,
}

impl Stage {
    /// Ordered stages driven by `execute()`.
    pub const ORDERED: [Stage; 3] = [Stage::Prepare, Stage::Run, Stage::CleanUp];

    pub const fn name(self) -> &'static str {
        match self {
            Stage::Prepare => "prepare",
            Stage::Run => "run",
            Stage::CleanUp => "clean_up",
            Stage::Execute => "execute",
        }
    }

    /// Message logged right before the stage body runs.
    pub const fn start_label(self) -> &'static str {
        match self {
            Stage::Prepare => "Start preparation",
            Stage::Run => "Start running",
            Stage::CleanUp => "Start cleaning up",
            Stage::Execute => "*** START EXECUTING ***",
        }
    }

    /// Message logged after the stage body returned without a failure.
    pub const fn finish_label(self) -> &'static str {
        match self {
            Stage::Prepare => "Finished preparation",
            Stage::Run => "Finished running",
            Stage::CleanUp => "Finished cleaning up",
            Stage::Execute => "Finished executing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_distinct_per_stage() {
        let all = [Stage::Prepare, Stage::Run, Stage::CleanUp, Stage::Execute];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.start_label(), b.start_label());
                assert_ne!(a.finish_label(), b.finish_label());
            }
        }
    }

    #[test]
    fn test_ordered_excludes_execute() {
        assert!(!Stage::ORDERED.contains(&Stage::Execute));
        assert_eq!(Stage::ORDERED[0], Stage::Prepare);
    }
}

//! Test unit identity.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CASE_ID: AtomicU64 = AtomicU64::new(0);

/// Sequential id of a test unit instance.
///
/// Allocated from a process-wide counter starting at 0; ids are strictly increasing in allocation
/// order and never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseId(u64);

impl CaseId {
    /// Allocate the next id from the process-wide counter.
    pub fn next() -> Self {
        CaseId(NEXT_CASE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name plus sequential id of one test unit instance. Immutable once constructed.
///
/// Not `Clone`: each identity is owned by exactly one instance, so no two instances share an id.
#[derive(Debug, PartialEq, Eq)]
pub struct CaseIdentity {
    name: String,
    id: CaseId,
}

impl CaseIdentity {
    /// Create an identity, allocating a fresh [`CaseId`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: CaseId::next(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> CaseId {
        self.id
    }
}

impl fmt::Display for CaseIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (tc_id {})", self.name, self.id)
    }
}

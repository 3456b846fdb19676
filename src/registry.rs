//! Plugin registry for test units.
//!
//! Test units are compiled in. Each one registers a named factory; discovery selects units by looking up
//! the name derived from a matching file (`test_case1.rs` -> `test_case1`). Every instance a factory
//! produces is wrapped in [`Instrumented`] with the origin of the registering source file.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use caserun_core::{CaseIdentity, Instrumented, Origin, TestCase};

/// Everything a factory needs to build one test unit instance.
#[derive(Debug)]
pub struct CaseSetup {
    /// Engine-synthesized identity (`Test<n>` plus a fresh id).
    pub identity: CaseIdentity,
    /// The scanned directory; example units treat it as their working directory.
    pub directory: PathBuf,
}

impl CaseSetup {
    pub fn new(identity: CaseIdentity, directory: impl Into<PathBuf>) -> Self {
        Self {
            identity,
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

type Factory = Box<dyn Fn(CaseSetup) -> Box<dyn TestCase>>;

struct Entry {
    origin: Origin,
    factory: Factory,
}

/// Named test unit factories.
#[derive(Default)]
pub struct CaseRegistry {
    entries: HashMap<String, Entry>,
}

impl CaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `unit`, replacing any previous entry with the same name.
    ///
    /// ## Notes
    /// - The origin used for log events is the source file that calls `register`.
    #[track_caller]
    pub fn register<C, F>(&mut self, unit: impl Into<String>, factory: F) -> &mut Self
    where
        C: TestCase + 'static,
        F: Fn(CaseSetup) -> C + 'static,
    {
        let origin = Origin::caller();
        let unit = unit.into();
        tracing::debug!(unit = %unit, origin = %origin, "registered test unit");
        self.entries.insert(
            unit,
            Entry {
                origin,
                factory: Box::new(move |setup: CaseSetup| -> Box<dyn TestCase> {
                    Box::new(Instrumented::with_origin(factory(setup), origin))
                }),
            },
        );
        self
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.entries.contains_key(unit)
    }

    /// The factory registered under `unit`, if any.
    pub fn lookup(&self, unit: &str) -> Option<RegisteredCase<'_>> {
        self.entries.get(unit).map(|entry| RegisteredCase { entry })
    }

    /// Build an instrumented instance of `unit`, or `None` when nothing is registered under that name.
    pub fn instantiate(&self, unit: &str, setup: CaseSetup) -> Option<Box<dyn TestCase>> {
        self.lookup(unit).map(|registered| registered.instantiate(setup))
    }

    pub fn origin(&self, unit: &str) -> Option<Origin> {
        self.entries.get(unit).map(|entry| entry.origin)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered unit names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// A registry entry found by [`CaseRegistry::lookup`]. Instantiating it cannot fail.
pub struct RegisteredCase<'r> {
    entry: &'r Entry,
}

impl RegisteredCase<'_> {
    pub fn origin(&self) -> Origin {
        self.entry.origin
    }

    pub fn instantiate(&self, setup: CaseSetup) -> Box<dyn TestCase> {
        (self.entry.factory)(setup)
    }
}

impl fmt::Debug for CaseRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseRegistry").field("units", &self.names()).finish()
    }
}

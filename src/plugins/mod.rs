//! Bundled example test units.
//!
//! Each unit lives in a file named after the discovery convention, so scanning this directory with the
//! default convention finds exactly the units registered here.
//!
//! - `test_case1` - lists the scanned directory when started on an even second
//! - `test_case2` - writes and removes a scratch file when the machine has at least 1 GiB of RAM

pub mod test_case1;
pub mod test_case2;

pub use test_case1::EvenSecondListing;
pub use test_case2::ScratchFileCase;

use crate::registry::CaseRegistry;

/// Registry holding every bundled unit.
pub fn builtin_registry() -> CaseRegistry {
    let mut registry = CaseRegistry::new();
    test_case1::register(&mut registry);
    test_case2::register(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_units_are_registered_from_their_files() {
        let registry = builtin_registry();
        assert_eq!(registry.names(), vec!["test_case1", "test_case2"]);
        assert_eq!(registry.origin("test_case1").map(|o| o.as_str()), Some("test_case1.rs"));
        assert_eq!(registry.origin("test_case2").map(|o| o.as_str()), Some("test_case2.rs"));
    }
}

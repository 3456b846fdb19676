//! Layering guardrails to keep the lifecycle core crate dependency-light.
//!
//! `caserun_core` may only depend on `thiserror` and `tracing`. Discovery, configuration and CLI crates
//! belong to the root package. This test scans the core `Cargo.toml` and fails on anything else in
//! `[dependencies]`.

const ALLOWED: &[&str] = &["thiserror", "tracing"];

#[test]
fn core_crate_only_depends_on_error_and_logging_crates() {
    let manifest = include_str!("../crates/caserun_core/Cargo.toml");
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        let name = line_no_comment.split(['=', '.']).next().unwrap_or("").trim();
        assert!(
            ALLOWED.contains(&name),
            "`{name}` must not appear in caserun_core [dependencies]; move the concern to the root crate"
        );
    }
}

#[test]
fn root_crate_depends_on_core_by_path() {
    let manifest = include_str!("../Cargo.toml");
    assert!(
        manifest.contains("caserun_core = { path = \"crates/caserun_core\" }"),
        "root package must depend on caserun_core by path"
    );
}

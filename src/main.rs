//! caserun CLI entry point

fn main() {
    // Logging is configured from the logging resource inside the CLI, before discovery starts
    caserun::cli::run();
}

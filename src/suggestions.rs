//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Following CLI recommendations,
//! errors should tell users what went wrong AND how to fix it.

use std::path::Path;

use crate::builder::BuilderKind;

/// Generate an error for when the requirements manifest is not found.
pub fn manifest_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Requirements manifest not found: {path}\n\n\
         hint: Use --manifest to specify the manifest path\n\
         hint: Set the REQUIREMENTS_FILE environment variable",
        path = path.display()
    )
}

/// Generate an error for when an explicitly requested override file is
/// missing.
pub fn override_file_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Override file not found: {path}\n\n\
         hint: The default override file name is optional, but an explicitly\n\
         hint: requested one must exist\n\
         hint: Use --override-file or PKG_OVERRIDE_FILE to point elsewhere",
        path = path.display()
    )
}

/// Generate an error for an invalid regex pattern.
///
/// Includes hints about common regex mistakes.
pub fn invalid_regex(pattern: &str, error: &regex::Error) -> anyhow::Error {
    let hint = match error {
        regex::Error::Syntax(msg) if msg.contains("unclosed") => {
            "hint: Check for unclosed brackets, parentheses, or braces"
        }
        regex::Error::Syntax(msg) if msg.contains("repetition") => {
            "hint: Repetition operators (+, *, ?) must follow a pattern"
        }
        _ => "hint: Test patterns at https://regex101.com (select Rust flavor)",
    };

    anyhow::anyhow!(
        "Invalid regex pattern: {pattern}\n\
         error: {error}\n\n\
         {hint}"
    )
}

/// Format the list of builder kinds with built-in defaults, for warnings
/// about unrecognized kinds.
pub fn known_builders() -> String {
    BuilderKind::KNOWN.join(", ")
}

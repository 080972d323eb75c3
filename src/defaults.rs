//! Default values for pkgforge configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Default regex applied to the package version to compute the repotag.
///
/// Together with [`DEFAULT_REPOTAG_REPLACEMENT`] this maps version `1.2.3`
/// to tag `v1.2.3`, the most common upstream tag convention. Both halves can
/// be overridden (`PKG_TO_REPOTAG_REGEX` / `PKG_TO_REPOTAG_REPLACEMENT`) to
/// accommodate repositories with inconsistent tag naming.
pub const DEFAULT_REPOTAG_REGEX: &str = "^(.*)$";

/// Default replacement pattern for the repotag regex.
pub const DEFAULT_REPOTAG_REPLACEMENT: &str = "v$1";

/// Default file name of the project phase-override file.
///
/// Can be overridden by the `--override-file` CLI flag or the
/// `PKG_OVERRIDE_FILE` environment variable.
pub const DEFAULT_OVERRIDE_FILE: &str = ".pkgforge.yaml";

/// Default namespace prefix for variables exported per requirement entry.
pub const DEFAULT_VARNAME_PREFIX: &str = "PKGFORGE_";

/// Default selection path into a JSON requirements manifest.
pub const DEFAULT_SELECT_PATH: &str = "build_deps";

/// Default field list extracted per requirement entry.
pub const DEFAULT_FIELDS: &[&str] = &["package", "version", "builder", "repo", "repotag_type"];

/// Default rewrite rule for the flat line manifest dialect: `name==version`
/// becomes `name version`.
pub const DEFAULT_LINE_REGEX: &str = "==";

/// Replacement string paired with [`DEFAULT_LINE_REGEX`].
pub const DEFAULT_LINE_REPLACEMENT: &str = " ";

/// Default token delimiter for the flat line manifest dialect.
pub const DEFAULT_DELIMITER: char = ' ';

/// Returns the default package output directory.
///
/// Built artifacts (wheels, jars, install trees) land here unless
/// `PKG_OUT_DIR` or `--out-dir` says otherwise. Deliberately a temp path:
/// the output directory is a staging area, not a durable artifact store.
pub fn default_out_dir() -> PathBuf {
    std::env::temp_dir().join("pkgforge")
}

/// Returns the default worker count handed to external build tools.
///
/// Detected CPU count minus one, floored at 1. The core itself is
/// single-threaded; this value is a pass-through for tools that take a
/// parallelism flag (`mvn -T`, `bazel --jobs`, `cmake --parallel`).
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

//! Integration tests for the requirements iterator.
//!
//! These exercise the real child-process path (`sh -c`) against manifests
//! on disk, checking invocation counts, per-entry variable scoping, and
//! the two failure modes.

use std::fs;
use std::path::Path;

use pkgforge::requirements::{for_each, FailureMode, ForeachConfig, ManifestDialect};

fn write_manifest(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn json_entries_invoke_command_with_scoped_variables() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        temp.path(),
        "deps.json",
        r#"{
            "build_deps": [
                {"package": "alpha", "version": "1.0", "builder": "pip"},
                {"package": "beta", "version": "2.0"}
            ]
        }"#,
    );
    let out = temp.path().join("out.txt");

    let cfg = ForeachConfig::new(
        manifest,
        format!(
            "echo \"$PKGFORGE_PACKAGE:$PKGFORGE_VERSION:${{PKGFORGE_BUILDER:-unset}}\" >> {}",
            out.display()
        ),
    );
    let summary = for_each(&cfg).unwrap();

    assert_eq!(summary.invoked, 2);
    assert_eq!(summary.failed, 0);
    // The second entry has no builder field; a leak from the first entry
    // would show "pip" here instead of "unset".
    assert_eq!(read_lines(&out), vec!["alpha:1.0:pip", "beta:2.0:unset"]);
}

#[test]
fn json_null_versions_are_not_selected() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        temp.path(),
        "deps.json",
        r#"{
            "build_deps": [
                {"package": "alpha", "version": "1.0"},
                {"package": "unreleased", "version": null}
            ]
        }"#,
    );
    let out = temp.path().join("out.txt");

    let cfg = ForeachConfig::new(
        manifest,
        format!("echo \"$PKGFORGE_PACKAGE\" >> {}", out.display()),
    );
    let summary = for_each(&cfg).unwrap();

    assert_eq!(summary.invoked, 1);
    assert_eq!(read_lines(&out), vec!["alpha"]);
}

#[test]
fn json_null_fields_are_skipped_not_exported() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        temp.path(),
        "deps.json",
        r#"{"build_deps": [{"package": "alpha", "version": "1.0", "repo": null}]}"#,
    );
    let out = temp.path().join("out.txt");

    let cfg = ForeachConfig::new(
        manifest,
        format!("echo \"${{PKGFORGE_REPO-absent}}\" >> {}", out.display()),
    );
    for_each(&cfg).unwrap();

    // "null" here would mean the null marker leaked through as a string.
    assert_eq!(read_lines(&out), vec!["absent"]);
}

#[test]
fn json_include_project_runs_once_more_with_root_fields() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        temp.path(),
        "deps.json",
        r#"{
            "package": "umbrella",
            "version": "3.0",
            "build_deps": [
                {"package": "alpha", "version": "1.0"}
            ]
        }"#,
    );
    let out = temp.path().join("out.txt");

    let mut cfg = ForeachConfig::new(
        manifest,
        format!(
            "echo \"$PKGFORGE_PACKAGE:$PKGFORGE_VERSION\" >> {}",
            out.display()
        ),
    );
    cfg.include_project = true;
    let summary = for_each(&cfg).unwrap();

    assert_eq!(summary.invoked, 2);
    assert_eq!(read_lines(&out), vec!["alpha:1.0", "umbrella:3.0"]);
}

#[test]
fn json_custom_prefix_and_fields() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        temp.path(),
        "deps.json",
        r#"{"build_deps": [{"package": "alpha", "version": "1.0", "repo": "https://example.com/a.git"}]}"#,
    );
    let out = temp.path().join("out.txt");

    let mut cfg = ForeachConfig::new(
        manifest,
        format!("echo \"$DEP_REPO\" >> {}", out.display()),
    );
    cfg.prefix = "DEP_".to_string();
    cfg.fields = vec!["repo".to_string()];
    for_each(&cfg).unwrap();

    assert_eq!(read_lines(&out), vec!["https://example.com/a.git"]);
}

#[test]
fn abort_mode_stops_at_first_failure() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        temp.path(),
        "deps.json",
        r#"{
            "build_deps": [
                {"package": "boom", "version": "1.0"},
                {"package": "beta", "version": "2.0"}
            ]
        }"#,
    );
    let out = temp.path().join("out.txt");

    let cfg = ForeachConfig::new(
        manifest,
        format!(
            "echo \"$PKGFORGE_PACKAGE\" >> {} && [ \"$PKGFORGE_PACKAGE\" != boom ]",
            out.display()
        ),
    );
    let err = for_each(&cfg).unwrap_err();
    assert!(err.to_string().contains("boom"));
    // The second entry never ran.
    assert_eq!(read_lines(&out), vec!["boom"]);
}

#[test]
fn continue_mode_finishes_the_loop_and_counts_failures() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        temp.path(),
        "deps.json",
        r#"{
            "build_deps": [
                {"package": "boom", "version": "1.0"},
                {"package": "beta", "version": "2.0"}
            ]
        }"#,
    );
    let out = temp.path().join("out.txt");

    let mut cfg = ForeachConfig::new(
        manifest,
        format!(
            "echo \"$PKGFORGE_PACKAGE\" >> {} && [ \"$PKGFORGE_PACKAGE\" != boom ]",
            out.display()
        ),
    );
    cfg.on_failure = FailureMode::Continue;
    let summary = for_each(&cfg).unwrap();

    assert_eq!(summary.invoked, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(read_lines(&out), vec!["boom", "beta"]);
}

#[test]
fn text_dialect_rewrites_and_tokenizes_lines() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        temp.path(),
        "deps.txt",
        "alpha==1.0\n# a comment\n\nbeta==2.0\n",
    );
    let out = temp.path().join("out.txt");

    let mut cfg = ForeachConfig::new(
        manifest,
        format!("echo \"$1-$2\" >> {}", out.display()),
    );
    cfg.dialect = ManifestDialect::Text;
    let summary = for_each(&cfg).unwrap();

    assert_eq!(summary.invoked, 2);
    assert_eq!(read_lines(&out), vec!["alpha-1.0", "beta-2.0"]);
}

#[test]
fn text_dialect_custom_rule_and_delimiter() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(temp.path(), "deps.txt", "alpha@1.0\n");
    let out = temp.path().join("out.txt");

    let mut cfg = ForeachConfig::new(
        manifest,
        format!("echo \"$2:$1\" >> {}", out.display()),
    );
    cfg.dialect = ManifestDialect::Text;
    cfg.line_pattern = "@".to_string();
    cfg.line_replacement = ";".to_string();
    cfg.delimiter = ';';
    for_each(&cfg).unwrap();

    assert_eq!(read_lines(&out), vec!["1.0:alpha"]);
}

#[test]
fn missing_manifest_file_is_an_error() {
    let cfg = ForeachConfig::new("/nonexistent/deps.json", "true");
    assert!(for_each(&cfg).is_err());
}

#[test]
fn malformed_json_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = write_manifest(temp.path(), "deps.json", "{not json");
    let cfg = ForeachConfig::new(manifest, "true");
    assert!(for_each(&cfg).is_err());
}

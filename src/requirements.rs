//! # Requirements Iteration
//!
//! Iterates a declarative requirements manifest and invokes a
//! caller-supplied command once per dependency entry, then optionally once
//! more for the top-level project itself. This is how higher-level
//! orchestration fans a build out over a dependency list without
//! hand-written loops.
//!
//! Two manifest dialects are supported:
//!
//! - **JSON**: the manifest is parsed into a document, a dotted selection
//!   path picks the dependency collection (default `build_deps`), and each
//!   entry's configured fields are exported into the child environment of
//!   one command invocation. Records are consumed as typed values directly
//!   from the parsed document, so scoping is structural: one entry's
//!   exports can never leak into the next invocation.
//! - **Text**: one dependency per line. Each line is rewritten by a
//!   configurable regex substitution (default `==` to a space), tokenized
//!   on a configurable delimiter, and the tokens are passed to the command
//!   as positional arguments.
//!
//! An empty command template makes the whole iteration an immediate no-op
//! success, so the iterator can be wired unconditionally into larger
//! pipelines.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use log::{debug, error, info, warn};
use regex::Regex;
use serde_json::Value;

use crate::defaults;
use crate::error::{Error, Result};

/// Which manifest dialect to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestDialect {
    #[default]
    Json,
    Text,
}

impl ManifestDialect {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(Error::Config {
                message: format!("unknown manifest type '{}' (expected json or text)", other),
            }),
        }
    }
}

/// What to do when a per-entry command fails.
///
/// The original behavior was inconsistent between dialects; here it is an
/// explicit choice. `Abort` (the default) stops at the first failure;
/// `Continue` finishes the loop and reports the failure count in the
/// summary. Either way a failure makes the overall run unsuccessful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    #[default]
    Abort,
    Continue,
}

impl FailureMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => Err(Error::Config {
                message: format!(
                    "unknown failure mode '{}' (expected abort or continue)",
                    other
                ),
            }),
        }
    }
}

/// Configuration for one `for_each` run.
#[derive(Debug, Clone)]
pub struct ForeachConfig {
    pub manifest: PathBuf,
    pub dialect: ManifestDialect,
    /// Command template invoked once per entry. Empty means do nothing.
    pub command: String,
    /// Namespace prefix for exported per-entry variables.
    pub prefix: String,
    /// Dotted path selecting the dependency collection (JSON dialect).
    pub select_path: String,
    /// Field list extracted per entry (JSON dialect).
    pub fields: Vec<String>,
    /// Invoke the command once more for the top-level object itself.
    pub include_project: bool,
    pub on_failure: FailureMode,
    /// Per-line rewrite rule (text dialect).
    pub line_pattern: String,
    pub line_replacement: String,
    /// Token delimiter applied after the rewrite (text dialect).
    pub delimiter: char,
}

impl ForeachConfig {
    pub fn new(manifest: impl Into<PathBuf>, command: impl Into<String>) -> Self {
        Self {
            manifest: manifest.into(),
            dialect: ManifestDialect::default(),
            command: command.into(),
            prefix: defaults::DEFAULT_VARNAME_PREFIX.to_string(),
            select_path: defaults::DEFAULT_SELECT_PATH.to_string(),
            fields: defaults::DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            include_project: false,
            on_failure: FailureMode::default(),
            line_pattern: defaults::DEFAULT_LINE_REGEX.to_string(),
            line_replacement: defaults::DEFAULT_LINE_REPLACEMENT.to_string(),
            delimiter: defaults::DEFAULT_DELIMITER,
        }
    }
}

/// Outcome of a `for_each` run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ForeachSummary {
    /// Command invocations performed (entries plus the optional project
    /// invocation).
    pub invoked: usize,
    /// Invocations that exited non-zero (only ever >1 in `Continue` mode).
    pub failed: usize,
}

/// Iterate the manifest, invoking the configured command per entry.
pub fn for_each(cfg: &ForeachConfig) -> Result<ForeachSummary> {
    if cfg.command.trim().is_empty() {
        debug!("empty foreach command - nothing to do");
        return Ok(ForeachSummary::default());
    }
    match cfg.dialect {
        ManifestDialect::Json => for_each_json(cfg),
        ManifestDialect::Text => for_each_text(cfg),
    }
}

/// Navigate a dotted path into a JSON document and return the selected
/// dependency entries: members of the array at that path that carry a
/// non-null `version` field. A missing path selects nothing; a present
/// non-array value is a manifest error.
pub fn select_entries<'a>(doc: &'a Value, path: &str) -> Result<Vec<&'a Value>> {
    let mut node = doc;
    for segment in path.split('.') {
        match node.get(segment) {
            Some(next) => node = next,
            None => {
                warn!("selection path '{}' not present in manifest", path);
                return Ok(Vec::new());
            }
        }
    }
    let items = node.as_array().ok_or_else(|| Error::Manifest {
        message: format!("selection path '{}' is not an array", path),
    })?;
    Ok(items
        .iter()
        .filter(|entry| entry.get("version").is_some_and(|v| !v.is_null()))
        .collect())
}

/// Extract the configured fields from one entry as exported variable
/// assignments: names uppercased, non-alphanumerics folded to `_`, and the
/// namespace prefix applied. Null or absent fields are skipped, not
/// exported as the string "null".
pub fn entry_env(entry: &Value, fields: &[String], prefix: &str) -> Vec<(String, String)> {
    let mut env = Vec::new();
    for field in fields {
        let value = match entry.get(field) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        env.push((format!("{}{}", prefix, var_name(field)), value));
    }
    env
}

fn var_name(field: &str) -> String {
    field
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn for_each_json(cfg: &ForeachConfig) -> Result<ForeachSummary> {
    let text = fs::read_to_string(&cfg.manifest)?;
    let doc: Value = serde_json::from_str(&text)?;
    let entries = select_entries(&doc, &cfg.select_path)?;
    info!(
        "{} requirement entries selected from {}",
        entries.len(),
        cfg.manifest.display()
    );

    let mut summary = ForeachSummary::default();
    for (index, entry) in entries.iter().enumerate() {
        let label = entry
            .get("package")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("entry {}", index + 1));
        let env = entry_env(entry, &cfg.fields, &cfg.prefix);
        run_entry(cfg, &label, &env, &mut summary)?;
    }

    if cfg.include_project {
        // Same extraction, applied to the top-level object itself.
        let env = entry_env(&doc, &cfg.fields, &cfg.prefix);
        run_entry(cfg, "project", &env, &mut summary)?;
    }
    Ok(summary)
}

fn for_each_text(cfg: &ForeachConfig) -> Result<ForeachSummary> {
    let re = Regex::new(&cfg.line_pattern)?;
    let text = fs::read_to_string(&cfg.manifest)?;

    let mut summary = ForeachSummary::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let rewritten = re.replace_all(line, cfg.line_replacement.as_str());
        let tokens: Vec<&str> = rewritten
            .split(cfg.delimiter)
            .filter(|t| !t.is_empty())
            .collect();
        run_line(cfg, line, &tokens, &mut summary)?;
    }
    Ok(summary)
}

/// Invoke the command template with entry fields exported as environment
/// variables. Each entry gets a fresh child process, so no assignment
/// survives into the next invocation.
fn run_entry(
    cfg: &ForeachConfig,
    label: &str,
    env: &[(String, String)],
    summary: &mut ForeachSummary,
) -> Result<()> {
    info!("requirement {}: running foreach command", label);
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&cfg.command);
    for (key, value) in env {
        cmd.env(key, value);
    }
    finish_invocation(cfg, label, cmd, summary)
}

/// Invoke the command template with line tokens appended as positional
/// arguments.
fn run_line(
    cfg: &ForeachConfig,
    label: &str,
    tokens: &[&str],
    summary: &mut ForeachSummary,
) -> Result<()> {
    info!("requirement {}: running foreach command", label);
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(format!("{} \"$@\"", cfg.command))
        .arg("sh")
        .args(tokens);
    finish_invocation(cfg, label, cmd, summary)
}

fn finish_invocation(
    cfg: &ForeachConfig,
    label: &str,
    mut cmd: Command,
    summary: &mut ForeachSummary,
) -> Result<()> {
    let status = cmd.status().map_err(|e| Error::Foreach {
        entry: label.to_string(),
        message: e.to_string(),
    })?;
    summary.invoked += 1;
    if status.success() {
        return Ok(());
    }
    error!("requirement {}: command exited with {}", label, status);
    summary.failed += 1;
    match cfg.on_failure {
        FailureMode::Abort => Err(Error::Foreach {
            entry: label.to_string(),
            message: format!("exited with {}", status),
        }),
        FailureMode::Continue => Ok(()),
    }
}

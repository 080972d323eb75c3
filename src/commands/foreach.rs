//! Foreach command implementation
//!
//! Iterates a requirements manifest and invokes the configured command once
//! per dependency entry (plus optionally once for the top-level project).
//! An empty command template makes the whole run a no-op success, so the
//! command can be wired unconditionally into larger pipelines.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use pkgforge::defaults;
use pkgforge::output::{emoji, OutputConfig};
use pkgforge::requirements::{self, FailureMode, ForeachConfig, ManifestDialect};
use pkgforge::suggestions;

/// Arguments for the foreach command
#[derive(Args, Debug)]
pub struct ForeachArgs {
    /// Requirements manifest path
    #[arg(long, value_name = "PATH", env = "REQUIREMENTS_FILE")]
    pub manifest: Option<PathBuf>,

    /// Manifest dialect: json or text
    #[arg(
        long = "manifest-type",
        value_name = "TYPE",
        env = "REQUIREMENTS_TYPE",
        default_value = "json"
    )]
    pub manifest_type: String,

    /// Command template invoked once per entry
    #[arg(long, value_name = "CMD", env = "REQUIREMENTS_FOREACH")]
    pub command: Option<String>,

    /// Namespace prefix for exported per-entry variables
    #[arg(long, value_name = "PREFIX", env = "VARNAME_PREFIX")]
    pub prefix: Option<String>,

    /// Dotted path selecting the dependency collection (json dialect)
    #[arg(long, value_name = "PATH")]
    pub select: Option<String>,

    /// Comma-separated field list extracted per entry (json dialect)
    #[arg(long, value_name = "FIELDS", value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Also invoke the command once for the top-level project itself
    #[arg(long = "include-project", env = "REQUIREMENTS_INCLUDE_PROJECT")]
    pub include_project: bool,

    /// What to do when a per-entry command fails: abort or continue
    #[arg(
        long = "on-failure",
        value_name = "MODE",
        env = "REQUIREMENTS_ON_FAILURE",
        default_value = "abort"
    )]
    pub on_failure: String,

    /// Per-line rewrite pattern (text dialect)
    #[arg(long = "line-regex", value_name = "PATTERN")]
    pub line_regex: Option<String>,

    /// Replacement paired with the line rewrite pattern
    #[arg(long = "line-replacement", value_name = "REPL")]
    pub line_replacement: Option<String>,

    /// Token delimiter applied after the rewrite (text dialect)
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the foreach command
pub fn execute(args: ForeachArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();

    // An empty command template means there is nothing to drive.
    let command = args.command.unwrap_or_default();
    if command.trim().is_empty() {
        log::debug!("no foreach command configured - nothing to do");
        return Ok(());
    }

    let dialect = ManifestDialect::parse(&args.manifest_type)?;
    let on_failure = FailureMode::parse(&args.on_failure)?;

    let manifest = args.manifest.unwrap_or_else(|| {
        PathBuf::from(match dialect {
            ManifestDialect::Json => "requirements.json",
            ManifestDialect::Text => "requirements.txt",
        })
    });
    if !manifest.exists() {
        return Err(suggestions::manifest_not_found(&manifest));
    }

    let line_pattern = args
        .line_regex
        .unwrap_or_else(|| defaults::DEFAULT_LINE_REGEX.to_string());
    if let Err(e) = regex::Regex::new(&line_pattern) {
        return Err(suggestions::invalid_regex(&line_pattern, &e));
    }

    let mut cfg = ForeachConfig::new(manifest.clone(), command);
    cfg.dialect = dialect;
    cfg.on_failure = on_failure;
    cfg.include_project = args.include_project;
    cfg.line_pattern = line_pattern;
    if let Some(prefix) = args.prefix {
        cfg.prefix = prefix;
    }
    if let Some(select) = args.select {
        cfg.select_path = select;
    }
    if !args.fields.is_empty() {
        cfg.fields = args.fields;
    }
    if let Some(replacement) = args.line_replacement {
        cfg.line_replacement = replacement;
    }
    if let Some(delimiter) = args.delimiter {
        cfg.delimiter = delimiter;
    }

    if !args.quiet {
        println!(
            "{} pkgforge foreach: {}",
            emoji(output, "🔁", "[FOREACH]"),
            manifest.display()
        );
    }

    let summary = requirements::for_each(&cfg)?;
    if summary.failed > 0 {
        if !args.quiet {
            println!(
                "{} {} of {} requirement commands failed",
                emoji(output, "❌", "[FAIL]"),
                summary.failed,
                summary.invoked
            );
        }
        anyhow::bail!("{} requirement command(s) failed", summary.failed);
    }

    if !args.quiet {
        println!(
            "{} {} entries processed in {:.2}s",
            emoji(output, "✅", "[OK]"),
            summary.invoked,
            start_time.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> ForeachArgs {
        ForeachArgs {
            manifest: None,
            manifest_type: "json".to_string(),
            command: None,
            prefix: None,
            select: None,
            fields: Vec::new(),
            include_project: false,
            on_failure: "abort".to_string(),
            line_regex: None,
            line_replacement: None,
            delimiter: None,
            quiet: true,
        }
    }

    #[test]
    fn test_empty_command_is_silent_success() {
        let output = OutputConfig::without_color();
        assert!(execute(empty_args(), &output).is_ok());
    }

    #[test]
    fn test_missing_manifest_is_error() {
        let mut args = empty_args();
        args.command = Some("true".to_string());
        args.manifest = Some(PathBuf::from("/nonexistent/deps.json"));
        let output = OutputConfig::without_color();
        let err = execute(args, &output).unwrap_err();
        assert!(err.to_string().contains("Requirements manifest not found"));
    }

    #[test]
    fn test_invalid_manifest_type_is_error() {
        let mut args = empty_args();
        args.command = Some("true".to_string());
        args.manifest_type = "toml".to_string();
        let output = OutputConfig::without_color();
        assert!(execute(args, &output).is_err());
    }

    #[test]
    fn test_invalid_failure_mode_is_error() {
        let mut args = empty_args();
        args.command = Some("true".to_string());
        args.on_failure = "retry".to_string();
        let output = OutputConfig::without_color();
        assert!(execute(args, &output).is_err());
    }
}

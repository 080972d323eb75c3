//! Build command implementation
//!
//! The build command executes the full phase pipeline for one declared
//! package: builder-setup, get-source, patch, configure, compile,
//! package-filename, package, install. Every argument has an environment
//! fallback so the command can be driven entirely from a prepared
//! environment, which is how batch orchestration invokes it.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use pkgforge::builder::BuilderKind;
use pkgforge::config::{BuildConfig, PackageId, RepoTagType, TagRule};
use pkgforge::defaults;
use pkgforge::exec::split_opts;
use pkgforge::output::{emoji, OutputConfig};
use pkgforge::phases::{Driver, Overrides};
use pkgforge::suggestions;

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Package name
    #[arg(long, value_name = "NAME", env = "PACKAGE")]
    pub package: Option<String>,

    /// Package version
    #[arg(long = "pkg-version", value_name = "VERSION", env = "PACKAGE_VERSION")]
    pub pkg_version: Option<String>,

    /// Builder kind (pip, maven, bazel, cmake, or a custom name)
    #[arg(long, value_name = "KIND", env = "PACKAGE_BUILDER")]
    pub builder: Option<String>,

    /// Enclosing project for qualified sub-builds
    #[arg(long, value_name = "NAME", env = "PACKAGE_PARENT")]
    pub parent: Option<String>,

    /// Alias overriding the package name for artifact naming
    #[arg(long = "alias-name", value_name = "NAME", env = "PACKAGE_NAME_ALIAS")]
    pub alias_name: Option<String>,

    /// Alias overriding the package version for artifact naming
    #[arg(
        long = "alias-version",
        value_name = "VERSION",
        env = "PACKAGE_VERSION_ALIAS"
    )]
    pub alias_version: Option<String>,

    /// Source repository URL
    #[arg(long, value_name = "URL", env = "PROJECT_REPO")]
    pub repo: Option<String>,

    /// Explicit repotag, bypassing the version-to-tag rule
    #[arg(long, value_name = "REF", env = "PROJECT_REPOTAG")]
    pub repotag: Option<String>,

    /// Repotag kind: tag, branch, or commit
    #[arg(
        long = "repotag-type",
        value_name = "TYPE",
        env = "PROJECT_REPOTAG_TYPE",
        default_value = "tag"
    )]
    pub repotag_type: String,

    /// Regex applied to the version to compute the repotag
    #[arg(long = "repotag-regex", value_name = "PATTERN", env = "PKG_TO_REPOTAG_REGEX")]
    pub repotag_regex: Option<String>,

    /// Replacement paired with the repotag regex
    #[arg(
        long = "repotag-replacement",
        value_name = "REPL",
        env = "PKG_TO_REPOTAG_REPLACEMENT"
    )]
    pub repotag_replacement: Option<String>,

    /// Sync submodules after checkout (any non-empty value enables)
    #[arg(long, value_name = "FLAG", env = "GIT_SUBMODULE")]
    pub submodule: Option<String>,

    /// Recurse into nested submodules (any non-empty value enables)
    #[arg(
        long = "submodule-recursive",
        value_name = "FLAG",
        env = "GIT_SUBMODULE_RECURSIVE"
    )]
    pub submodule_recursive: Option<String>,

    /// Directory holding optional patch files
    #[arg(long = "patch-dir", value_name = "PATH", env = "PATCH_DIR")]
    pub patch_dir: Option<PathBuf>,

    /// Package output directory
    #[arg(long = "out-dir", value_name = "PATH", env = "PKG_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Worker count passed through to external build tools
    #[arg(long, value_name = "N", env = "PKG_JOBS")]
    pub jobs: Option<usize>,

    /// Extra arguments appended to build tool invocations
    #[arg(long = "build-args", value_name = "ARGS", env = "PKG_BUILD_ARGS")]
    pub build_args: Option<String>,

    /// Build targets for tools that take them
    #[arg(long = "build-targets", value_name = "TARGETS", env = "PKG_BUILD_TARGETS")]
    pub build_targets: Option<String>,

    /// Project phase-override file (YAML map of phase name to command)
    #[arg(long = "override-file", value_name = "PATH", env = "PKG_OVERRIDE_FILE")]
    pub override_file: Option<PathBuf>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Shell-style flag: set and non-empty means enabled.
fn env_flag(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Execute the build command
pub fn execute(args: BuildArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();

    // Missing identity is a clean no-op, not an error: batch orchestration
    // invokes the driver blindly for filtered entries.
    let name = args.package.unwrap_or_default();
    let version = args.pkg_version.unwrap_or_default();
    let builder_raw = args.builder.unwrap_or_default();
    if name.is_empty() || version.is_empty() || builder_raw.is_empty() {
        log::debug!("package identity incomplete - nothing to do");
        return Ok(());
    }

    let builder_kind = BuilderKind::from_name(&builder_raw);
    if !builder_kind.is_known() {
        log::warn!(
            "builder kind '{}' has no built-in defaults (known kinds: {})",
            builder_kind,
            suggestions::known_builders()
        );
    }

    let repotag_type = RepoTagType::parse(&args.repotag_type)?;
    let pattern = args
        .repotag_regex
        .unwrap_or_else(|| defaults::DEFAULT_REPOTAG_REGEX.to_string());
    let replacement = args
        .repotag_replacement
        .unwrap_or_else(|| defaults::DEFAULT_REPOTAG_REPLACEMENT.to_string());
    if let Err(e) = regex::Regex::new(&pattern) {
        return Err(suggestions::invalid_regex(&pattern, &e));
    }

    let config = BuildConfig {
        repo: args.repo,
        repotag: args.repotag,
        repotag_type,
        tag_rule: TagRule::new(pattern, replacement),
        submodules: env_flag(&args.submodule),
        submodules_recursive: env_flag(&args.submodule_recursive),
        patch_dir: args.patch_dir,
        out_dir: args.out_dir.unwrap_or_else(defaults::default_out_dir),
        jobs: args.jobs.unwrap_or_else(defaults::default_jobs),
        build_args: args.build_args.as_deref().map(split_opts).unwrap_or_default(),
        build_targets: args
            .build_targets
            .as_deref()
            .map(split_opts)
            .unwrap_or_default(),
    };

    // Resolve overrides once, before any phase runs. An explicitly
    // requested file must exist; the default name is best effort.
    let overrides = match &args.override_file {
        Some(path) => {
            if !path.exists() {
                return Err(suggestions::override_file_not_found(path));
            }
            Overrides::from_file(path)?
        }
        None => {
            let default_path = PathBuf::from(defaults::DEFAULT_OVERRIDE_FILE);
            if default_path.exists() {
                Overrides::from_file(&default_path)?
            } else {
                Overrides::new()
            }
        }
    };

    if !args.quiet {
        println!(
            "{} pkgforge build: {} {} [{}]",
            emoji(output, "🔨", "[BUILD]"),
            name,
            version,
            builder_kind
        );
    }

    let package = PackageId {
        name,
        version,
        parent: args.parent,
        builder: builder_kind,
        alias_name: args.alias_name,
        alias_version: args.alias_version,
    };

    let driver = Driver::new(package, config, overrides);
    match driver.run() {
        Ok(()) => {
            if !args.quiet {
                println!(
                    "{} built in {:.2}s",
                    emoji(output, "✅", "[OK]"),
                    start_time.elapsed().as_secs_f64()
                );
            }
            Ok(())
        }
        Err(e) => {
            if !args.quiet {
                println!("{} build failed", emoji(output, "❌", "[FAIL]"));
            }
            Err(e.into())
        }
    }
}

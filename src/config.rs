//! # Build Configuration
//!
//! This module defines the data structures that carry a resolved build
//! configuration: the package identity, the repotag resolution rule, and the
//! variable-defaulting layer that backs the whole phase pipeline.
//!
//! Configuration is resolved exactly once at startup (CLI flags with
//! environment fallbacks, then documented defaults) and is immutable
//! afterwards. There is no validation beyond presence/absence here:
//! malformed values surface later as tool invocation failures.

use std::path::PathBuf;

use regex::Regex;

use crate::builder::BuilderKind;
use crate::defaults;
use crate::error::{Error, Result};

/// The identity of the package being built.
///
/// `name` and `version` being non-empty is a hard precondition of the
/// driver; callers check it before constructing a `PackageId` and exit
/// cleanly when it does not hold. The identity is immutable after
/// construction except for the alias fields, which override the canonical
/// name/version for display and artifact-file naming only.
#[derive(Debug, Clone)]
pub struct PackageId {
    /// Canonical package name.
    pub name: String,
    /// Canonical package version.
    pub version: String,
    /// Enclosing project for qualified sub-builds, if any.
    pub parent: Option<String>,
    /// The builder ecosystem this package is constructed with.
    pub builder: BuilderKind,
    /// Alias overriding `name` for display and artifact naming.
    pub alias_name: Option<String>,
    /// Alias overriding `version` for display and artifact naming.
    pub alias_version: Option<String>,
}

impl PackageId {
    pub fn new(name: impl Into<String>, version: impl Into<String>, builder: BuilderKind) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            parent: None,
            builder,
            alias_name: None,
            alias_version: None,
        }
    }

    /// The name used for display and artifact file naming.
    pub fn effective_name(&self) -> &str {
        self.alias_name.as_deref().unwrap_or(&self.name)
    }

    /// The version used for display, artifact file naming, and repotag
    /// resolution.
    pub fn effective_version(&self) -> &str {
        self.alias_version.as_deref().unwrap_or(&self.version)
    }

    /// `parent/name` when a parent is set, plain `name` otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}/{}", parent, self.effective_name()),
            None => self.effective_name().to_string(),
        }
    }
}

/// Which kind of git ref the resolved repotag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepoTagType {
    /// An annotated or lightweight tag. The default.
    #[default]
    Tag,
    /// A branch head.
    Branch,
    /// An exact commit SHA, fetched and pinned regardless of upstream
    /// branch movement.
    Commit,
}

impl RepoTagType {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tag" => Ok(Self::Tag),
            "branch" => Ok(Self::Branch),
            "commit" => Ok(Self::Commit),
            other => Err(Error::Config {
                message: format!(
                    "unknown repotag type '{}' (expected tag, branch, or commit)",
                    other
                ),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Branch => "branch",
            Self::Commit => "commit",
        }
    }
}

/// Regex substitution mapping a package version to its repotag string.
#[derive(Debug, Clone)]
pub struct TagRule {
    /// Pattern matched against the package version.
    pub pattern: String,
    /// Replacement string; may reference capture groups (`$1`).
    pub replacement: String,
}

impl TagRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Apply the substitution to a version string.
    pub fn resolve(&self, version: &str) -> Result<String> {
        let re = Regex::new(&self.pattern)?;
        Ok(re.replace(version, self.replacement.as_str()).into_owned())
    }
}

impl Default for TagRule {
    fn default() -> Self {
        Self::new(
            defaults::DEFAULT_REPOTAG_REGEX,
            defaults::DEFAULT_REPOTAG_REPLACEMENT,
        )
    }
}

/// The resolved variable-defaulting layer: every recognized option with its
/// documented default applied.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source repository URL. Without it the get-source default is a no-op.
    pub repo: Option<String>,
    /// Explicit repotag, bypassing the tag rule. Mostly useful for
    /// commit-pinned builds where the SHA has no relation to the version.
    pub repotag: Option<String>,
    /// What kind of ref the repotag names.
    pub repotag_type: RepoTagType,
    /// Version-to-repotag substitution rule.
    pub tag_rule: TagRule,
    /// Sync submodules after checkout.
    pub submodules: bool,
    /// Recurse into nested submodules.
    pub submodules_recursive: bool,
    /// Directory holding optional patch files.
    pub patch_dir: Option<PathBuf>,
    /// Package output directory.
    pub out_dir: PathBuf,
    /// Worker count passed through to external build tools.
    pub jobs: usize,
    /// Opaque extra arguments appended to compile-style tool invocations.
    pub build_args: Vec<String>,
    /// Opaque build targets for tools that take them.
    pub build_targets: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            repo: None,
            repotag: None,
            repotag_type: RepoTagType::default(),
            tag_rule: TagRule::default(),
            submodules: false,
            submodules_recursive: false,
            patch_dir: None,
            out_dir: defaults::default_out_dir(),
            jobs: defaults::default_jobs(),
            build_args: Vec::new(),
            build_targets: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Resolve the repotag for a package: the explicit override wins,
    /// otherwise the tag rule is applied to the effective version.
    pub fn resolve_repotag(&self, package: &PackageId) -> Result<String> {
        match &self.repotag {
            Some(explicit) => Ok(explicit.clone()),
            None => self.tag_rule.resolve(package.effective_version()),
        }
    }
}

//! # Builder Kinds and the Per-Phase Dispatch Interface
//!
//! A builder kind classifies which build tool ecosystem a package uses. The
//! kind carries no behavior of its own; it selects which [`Builder`]
//! implementation supplies the default action for each pipeline phase.
//!
//! The [`Builder`] trait has one method per phase, each defaulting to a
//! no-op. A phase with no default for the active builder is therefore
//! silently skipped unless the project supplies an override. Known kinds
//! map to the concrete implementations in [`crate::builders`]; unknown
//! kinds are accepted as [`BuilderKind::Custom`] with no defaults at all,
//! so a project can drive a bespoke builder entirely through its override
//! file.

use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::phases::BuildContext;

/// Classification of the build tool ecosystem a package uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuilderKind {
    Pip,
    Maven,
    Bazel,
    Cmake,
    /// A kind pkgforge has no defaults for. Every phase is a no-op unless
    /// the project overrides it.
    Custom(String),
}

impl BuilderKind {
    /// The kinds with built-in phase defaults.
    pub const KNOWN: [&'static str; 4] = ["pip", "maven", "bazel", "cmake"];

    pub fn name(&self) -> &str {
        match self {
            Self::Pip => "pip",
            Self::Maven => "maven",
            Self::Bazel => "bazel",
            Self::Cmake => "cmake",
            Self::Custom(name) => name,
        }
    }

    /// Whether this kind has built-in phase defaults.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Parse a kind name. Every name is accepted; unrecognized ones become
    /// [`BuilderKind::Custom`].
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pip" => Self::Pip,
            "maven" => Self::Maven,
            "bazel" => Self::Bazel,
            "cmake" => Self::Cmake,
            _ => Self::Custom(s.to_string()),
        }
    }
}

impl FromStr for BuilderKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for BuilderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-phase default actions for one builder ecosystem.
///
/// Every method defaults to a no-op; concrete builders override exactly the
/// phases their ecosystem has a default for. Errors propagate to the
/// dispatcher and abort the pipeline, with one documented exception: the
/// get-source default swallows tag/branch clone failures itself (see
/// [`crate::source::acquire`]).
pub trait Builder {
    /// The kind this builder implements.
    fn kind(&self) -> BuilderKind;

    /// One-time builder tooling preparation (e.g. upgrading pip itself).
    fn builder_setup(&self, _ctx: &mut BuildContext) -> Result<()> {
        Ok(())
    }

    /// Acquire the package source.
    fn get_source(&self, _ctx: &mut BuildContext) -> Result<()> {
        Ok(())
    }

    /// Apply the project patch, if one exists.
    fn patch(&self, _ctx: &mut BuildContext) -> Result<()> {
        Ok(())
    }

    /// Configure the source tree for building.
    fn configure(&self, _ctx: &mut BuildContext) -> Result<()> {
        Ok(())
    }

    /// Compile the source tree.
    fn compile(&self, _ctx: &mut BuildContext) -> Result<()> {
        Ok(())
    }

    /// Compute the expected artifact file name and record it on the
    /// context.
    fn package_filename(&self, _ctx: &mut BuildContext) -> Result<()> {
        Ok(())
    }

    /// Produce the distributable artifact.
    fn package(&self, _ctx: &mut BuildContext) -> Result<()> {
        Ok(())
    }

    /// Install the produced artifact.
    fn install(&self, _ctx: &mut BuildContext) -> Result<()> {
        Ok(())
    }
}

/// A builder with no default actions, used for [`BuilderKind::Custom`].
pub struct NullBuilder {
    kind: BuilderKind,
}

impl NullBuilder {
    pub fn new(kind: BuilderKind) -> Self {
        Self { kind }
    }
}

impl Builder for NullBuilder {
    fn kind(&self) -> BuilderKind {
        self.kind.clone()
    }
}

/// Map a builder kind to its default-action implementation.
pub fn builder_for(kind: &BuilderKind) -> Box<dyn Builder> {
    match kind {
        BuilderKind::Pip => Box::new(crate::builders::pip::PipBuilder),
        BuilderKind::Maven => Box::new(crate::builders::maven::MavenBuilder),
        BuilderKind::Bazel => Box::new(crate::builders::bazel::BazelBuilder),
        BuilderKind::Cmake => Box::new(crate::builders::cmake::CmakeBuilder),
        BuilderKind::Custom(_) => Box::new(NullBuilder::new(kind.clone())),
    }
}

//! # The Phase Pipeline and Dispatcher
//!
//! A package build is an ordered sequence of named phases. For each phase
//! the dispatcher resolves exactly one action, in this precedence order:
//!
//! 1. A project-supplied override registered for that phase.
//! 2. The active builder's default implementation (a no-op when the builder
//!    defines none).
//!
//! The override mechanism lets a project replace any single phase without
//! forking the whole pipeline, while untouched phases keep their per-builder
//! defaults. Overrides are resolved once at startup: programmatically via
//! [`Overrides::set`], or from a project override file (a YAML map of phase
//! name to shell command) via [`Overrides::from_file`].
//!
//! Dispatch never retries and never catches errors from the invoked action.
//! A failed phase aborts the remaining pipeline. The one exception lives
//! inside the get-source default itself, which swallows tag/branch clone
//! failures (see [`crate::source::acquire`]).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::builder::{builder_for, Builder};
use crate::config::{BuildConfig, PackageId};
use crate::error::{Error, Result};
use crate::source::DirGuard;

/// One step of the fixed build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    BuilderSetup,
    GetSource,
    Patch,
    Configure,
    Compile,
    PackageFilename,
    Package,
    Install,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 8] = [
        Phase::BuilderSetup,
        Phase::GetSource,
        Phase::Patch,
        Phase::Configure,
        Phase::Compile,
        Phase::PackageFilename,
        Phase::Package,
        Phase::Install,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::BuilderSetup => "builder-setup",
            Phase::GetSource => "get-source",
            Phase::Patch => "patch",
            Phase::Configure => "configure",
            Phase::Compile => "compile",
            Phase::PackageFilename => "package-filename",
            Phase::Package => "package",
            Phase::Install => "install",
        }
    }

    pub fn from_name(name: &str) -> Option<Phase> {
        Phase::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared state threaded through every phase action.
///
/// The context owns the working-directory guard taken by source
/// acquisition, so the previous directory is restored when the context is
/// dropped, no matter which later phase failed.
pub struct BuildContext {
    pub package: PackageId,
    pub config: BuildConfig,
    /// Checkout directory, set by the get-source default on success.
    pub source_dir: Option<PathBuf>,
    /// Expected artifact file name (or glob pattern), set by the
    /// package-filename phase.
    pub package_file: Option<String>,
    dir_guard: Option<DirGuard>,
}

impl BuildContext {
    pub fn new(package: PackageId, config: BuildConfig) -> Self {
        Self {
            package,
            config,
            source_dir: None,
            package_file: None,
            dir_guard: None,
        }
    }

    /// Record the checkout directory and hold its guard for the rest of
    /// the run.
    pub(crate) fn enter_source_dir(&mut self, dir: PathBuf, guard: DirGuard) {
        self.source_dir = Some(dir);
        self.dir_guard = Some(guard);
    }

    /// Restore the pre-acquisition working directory. Called once at the
    /// end of a successful run; the `Drop` of the held guard covers every
    /// failure path.
    pub fn restore_dir(&mut self) {
        self.dir_guard.take();
    }

    /// The environment exported to override commands and foreach children.
    pub fn export_env(&self) -> Vec<(String, String)> {
        let mut env = vec![
            ("PACKAGE".to_string(), self.package.name.clone()),
            ("PACKAGE_VERSION".to_string(), self.package.version.clone()),
            (
                "PACKAGE_BUILDER".to_string(),
                self.package.builder.name().to_string(),
            ),
            (
                "PKG_OUT_DIR".to_string(),
                self.config.out_dir.display().to_string(),
            ),
            ("PKG_JOBS".to_string(), self.config.jobs.to_string()),
        ];
        if let Some(parent) = &self.package.parent {
            env.push(("PACKAGE_PARENT".to_string(), parent.clone()));
        }
        if !self.config.build_args.is_empty() {
            env.push((
                "PKG_BUILD_ARGS".to_string(),
                self.config.build_args.join(" "),
            ));
        }
        if !self.config.build_targets.is_empty() {
            env.push((
                "PKG_BUILD_TARGETS".to_string(),
                self.config.build_targets.join(" "),
            ));
        }
        if let Some(dir) = &self.source_dir {
            env.push(("PKG_SOURCE_DIR".to_string(), dir.display().to_string()));
        }
        if let Some(file) = &self.package_file {
            env.push(("PKG_PACKAGE_FILE".to_string(), file.clone()));
        }
        env
    }
}

/// A phase action: an override closure or a wrapped shell command.
pub type PhaseAction = Box<dyn Fn(&mut BuildContext) -> Result<()>>;

/// Project-supplied per-phase overrides, resolved once at startup.
#[derive(Default)]
pub struct Overrides {
    actions: HashMap<Phase, PhaseAction>,
}

impl std::fmt::Debug for Overrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overrides")
            .field("phases", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an override for a phase. The latest registration wins.
    pub fn set<F>(&mut self, phase: Phase, action: F)
    where
        F: Fn(&mut BuildContext) -> Result<()> + 'static,
    {
        self.actions.insert(phase, Box::new(action));
    }

    pub fn get(&self, phase: Phase) -> Option<&PhaseAction> {
        self.actions.get(&phase)
    }

    pub fn contains(&self, phase: Phase) -> bool {
        self.actions.contains_key(&phase)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Load overrides from a project override file: a YAML map of phase
    /// name to shell command. Unknown phase names are an error, caught
    /// before any phase runs.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let raw: OverrideFile = serde_yaml::from_str(&text).map_err(|e| Error::OverrideParse {
            message: format!("{}: {}", path.display(), e),
        })?;

        let mut overrides = Self::new();
        for (phase, command) in [
            (Phase::BuilderSetup, raw.builder_setup),
            (Phase::GetSource, raw.get_source),
            (Phase::Patch, raw.patch),
            (Phase::Configure, raw.configure),
            (Phase::Compile, raw.compile),
            (Phase::PackageFilename, raw.package_filename),
            (Phase::Package, raw.package),
            (Phase::Install, raw.install),
        ] {
            if let Some(command) = command {
                debug!("override registered for phase {}: {}", phase, command);
                overrides.set(phase, move |ctx| crate::exec::run_shell(&command, ctx));
            }
        }
        Ok(overrides)
    }
}

/// On-disk schema of the project override file: one optional shell command
/// per phase, keyed by the phase name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct OverrideFile {
    builder_setup: Option<String>,
    get_source: Option<String>,
    patch: Option<String>,
    configure: Option<String>,
    compile: Option<String>,
    package_filename: Option<String>,
    package: Option<String>,
    install: Option<String>,
}

/// The phase pipeline driver.
pub struct Driver {
    builder: Box<dyn Builder>,
    overrides: Overrides,
    ctx: BuildContext,
}

impl Driver {
    /// Construct a driver for a package, selecting the builder
    /// implementation from the package's kind.
    pub fn new(package: PackageId, config: BuildConfig, overrides: Overrides) -> Self {
        let builder = builder_for(&package.builder);
        Self {
            builder,
            overrides,
            ctx: BuildContext::new(package, config),
        }
    }

    /// Construct a driver with an explicit builder implementation.
    pub fn with_builder(
        builder: Box<dyn Builder>,
        package: PackageId,
        config: BuildConfig,
        overrides: Overrides,
    ) -> Self {
        Self {
            builder,
            overrides,
            ctx: BuildContext::new(package, config),
        }
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    /// Execute every phase in order, then restore the working directory.
    pub fn run(mut self) -> Result<()> {
        info!(
            "building {} {} with builder {}",
            self.ctx.package.qualified_name(),
            self.ctx.package.effective_version(),
            self.builder.kind()
        );
        for phase in Phase::ALL {
            self.dispatch(phase)?;
        }
        self.ctx.restore_dir();
        info!("build of {} finished", self.ctx.package.qualified_name());
        Ok(())
    }

    /// Resolve and invoke exactly one action for a phase: the project
    /// override when registered, the builder default otherwise.
    pub fn dispatch(&mut self, phase: Phase) -> Result<()> {
        if let Some(action) = self.overrides.get(phase) {
            info!(
                "phase {} [builder {}]: dispatching to project override",
                phase,
                self.ctx.package.builder.name()
            );
            return action(&mut self.ctx);
        }

        info!(
            "phase {} [builder {}]: dispatching to builder default",
            phase,
            self.ctx.package.builder.name()
        );
        let builder = self.builder.as_ref();
        match phase {
            Phase::BuilderSetup => builder.builder_setup(&mut self.ctx),
            Phase::GetSource => builder.get_source(&mut self.ctx),
            Phase::Patch => builder.patch(&mut self.ctx),
            Phase::Configure => builder.configure(&mut self.ctx),
            Phase::Compile => builder.compile(&mut self.ctx),
            Phase::PackageFilename => builder.package_filename(&mut self.ctx),
            Phase::Package => builder.package(&mut self.ctx),
            Phase::Install => builder.install(&mut self.ctx),
        }
    }
}

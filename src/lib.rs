//! # pkgforge Library
//!
//! This library provides the core functionality for driving multi-builder
//! package construction. It is designed to be used by the `pkgforge`
//! command-line tool but can also be integrated into other applications
//! that need a pluggable phase pipeline around external build tools.
//!
//! ## Quick Example
//!
//! ```
//! use pkgforge::builder::BuilderKind;
//! use pkgforge::config::{BuildConfig, PackageId};
//! use pkgforge::phases::{Driver, Overrides, Phase};
//!
//! // Declare the package identity and configuration.
//! let package = PackageId::new("foo", "1.2.3", BuilderKind::Pip);
//! let config = BuildConfig::default();
//!
//! // A project can override any single phase without forking the rest.
//! let mut overrides = Overrides::new();
//! overrides.set(Phase::Configure, |_ctx| Ok(()));
//!
//! let driver = Driver::new(package, config, overrides);
//! // driver.run() would execute the full phase pipeline.
//! drop(driver);
//! ```
//!
//! ## Core Concepts
//!
//! - **Phases (`phases`)**: a package build is a fixed ordered sequence of
//!   named phases (builder-setup, get-source, patch, configure, compile,
//!   package-filename, package, install). The `Driver` resolves each phase
//!   to exactly one action: a project override when one is registered, the
//!   active builder's default otherwise.
//! - **Builders (`builder`, `builders`)**: a builder kind classifies the
//!   build tool ecosystem (pip, maven, bazel, cmake). The `Builder` trait
//!   has one method per phase, each defaulting to a no-op; unknown kinds
//!   run with no defaults at all.
//! - **Source acquisition (`source`)**: resolves a package version into a
//!   repotag, reuses an existing checkout when present, shallow clones
//!   tags/branches (best effort) or pins exact commits (fatal on failure),
//!   and manages the working directory through a scoped guard.
//! - **Patching (`patch`)**: applies an optional per-version patch with a
//!   reverse dry-run idempotence check.
//! - **Requirements iteration (`requirements`)**: fans a user-supplied
//!   command out over the entries of a JSON or flat-text requirements
//!   manifest, exporting per-entry fields into each invocation's
//!   environment.
//!
//! ## Execution Flow
//!
//! The `build` command resolves configuration once (flags, environment,
//! documented defaults), loads the project override file if present, then
//! hands everything to `phases::Driver::run`, which dispatches the eight
//! phases in order and restores the working directory at the end. The
//! `foreach` command is an independent entry point consumed by higher-level
//! orchestration, typically invoking the build driver once per manifest
//! entry.

pub mod builder;
pub mod builders;
pub mod config;
pub mod defaults;
pub mod error;
pub mod exec;
pub mod output;
pub mod patch;
pub mod phases;
pub mod requirements;
pub mod source;
pub mod suggestions;

#[cfg(test)]
mod repotag_proptest;

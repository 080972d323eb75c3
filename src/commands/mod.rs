//! Subcommand implementations for the pkgforge CLI.

pub mod build;
pub mod completions;
pub mod foreach;

//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for
//! `pkgforge`. It uses the `thiserror` library to create a comprehensive
//! `Error` enum that covers all anticipated failure modes, providing clear
//! and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures.
//!
//! The variants cover the failure surface of the build pipeline: git clone
//! and command failures, submodule sync failures, patch application, external
//! tool invocation, override file parsing, requirements manifest handling,
//! and per-entry foreach command failures, plus wrapped io/json/yaml/regex/
//! glob errors.

use thiserror::Error;

/// Main error type for pkgforge operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while resolving build configuration values.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An error occurred while parsing the project phase-override file.
    #[error("Override file error: {message}")]
    OverrideParse { message: String },

    /// An error occurred while cloning a Git repository.
    ///
    /// Includes the repository URL, ref (tag/branch), and captured stderr.
    #[error("Git clone error for {url}@{r#ref}: {message}")]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
    },

    /// An error occurred while executing a Git command.
    #[error("Git command failed: {command} - {stderr}")]
    GitCommand { command: String, stderr: String },

    /// Submodule synchronization failed, leaving a broken checkout.
    #[error("Submodule sync failed in {dir}: {message}")]
    Submodule { dir: String, message: String },

    /// An error occurred while applying a patch file.
    #[error("Patch application error for {file}: {message}")]
    Patch { file: String, message: String },

    /// An external build tool exited unsuccessfully or could not be spawned.
    #[error("Tool invocation failed: {tool} - {message}")]
    Tool { tool: String, message: String },

    /// An error occurred while reading or selecting from a requirements
    /// manifest.
    #[error("Manifest error: {message}")]
    Manifest { message: String },

    /// The per-entry foreach command failed for a requirement entry.
    #[error("Requirement command failed for {entry}: {message}")]
    Foreach { entry: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

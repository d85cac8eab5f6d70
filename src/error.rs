//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for `modrun`.
//! It uses the `thiserror` library to create an `Error` enum that covers the
//! failure modes of change detection, module mapping and orchestration.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Each variant carries enough context to tell
//!   the operator what failed and, where possible, how to fix it.
//!
//! - **`ModuleFailures`**: The aggregate produced by an orchestration run. It
//!   holds one `ModuleFailure` per module whose operation returned an error,
//!   in the order the modules were given. A run without failures is `Ok(())`,
//!   so a `ModuleFailures` value is never empty.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Two variants are treated specially by callers:
//!
//! - `RefNotFound` is recovered locally by the change detector, which falls
//!   back to uncommitted changes only.
//! - `ModuleFailures` is never fatal to a run; it is produced once, after
//!   every module has been processed.

use std::fmt;

use thiserror::Error;

use crate::module::ModuleDescriptor;

/// Main error type for modrun operations
#[derive(Error, Debug)]
pub enum Error {
    /// The `.modrun.yaml` configuration file could not be parsed or failed
    /// validation.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A git command could not be run or exited unsuccessfully.
    #[error("Git command failed in {repo}: git {command} - {stderr}")]
    GitCommand {
        command: String,
        repo: String,
        stderr: String,
    },

    /// The given directory is not inside a git work tree.
    #[error("Not a git repository: {path}\n  hint: run inside a git checkout or pass --root")]
    NotARepository { path: String },

    /// The base reference does not resolve to a commit.
    ///
    /// This is the only git failure the change detector recovers from.
    #[error("Git reference not found: {r#ref}")]
    RefNotFound { r#ref: String },

    /// No default branch could be determined for the configured remote.
    #[error("Could not auto-detect the default branch of remote '{remote}' (tried: {tried})\n  hint: pass an explicit base with --ref <REF>")]
    DefaultBranchNotFound { remote: String, tried: String },

    /// The bounded worker pool could not be created.
    #[error("Failed to start worker pool: {message}")]
    ThreadPool { message: String },

    /// One or more modules failed during an orchestration run.
    #[error(transparent)]
    ModuleFailures(#[from] ModuleFailures),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// A single module's failed operation.
#[derive(Debug)]
pub struct ModuleFailure {
    /// The module the operation ran against.
    pub module: ModuleDescriptor,
    /// The error returned by the operation.
    pub source: anyhow::Error,
}

impl fmt::Display for ModuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {:#}",
            self.module.name, self.module.path, self.source
        )
    }
}

/// Every failure collected during one orchestration run.
#[derive(Debug)]
pub struct ModuleFailures {
    failures: Vec<ModuleFailure>,
}

impl ModuleFailures {
    /// Builds the aggregate from collected failures.
    ///
    /// Returns `None` when nothing failed, so success is never represented as
    /// an empty error.
    pub fn from_failures(failures: Vec<ModuleFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// Number of modules that failed.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether no module failed.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Names of the failing modules, in module order.
    pub fn module_names(&self) -> Vec<&str> {
        self.failures
            .iter()
            .map(|f| f.module.name.as_str())
            .collect()
    }
}

impl fmt::Display for ModuleFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} module(s) failed:", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for ModuleFailures {}

//! Default values for modrun configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::num::NonZeroUsize;

/// Name of the optional configuration file at the repository root.
pub const DEFAULT_CONFIG_FILENAME: &str = ".modrun.yaml";

/// File patterns that mark a directory as a module root.
pub const DEFAULT_MARKERS: &[&str] = &["*.tf", "*.tofu"];

/// Auxiliary directory names that never count as module roots.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".terraform",
    ".git",
    "tests",
    "test",
    "examples",
    "fixtures",
];

/// Remote consulted when auto-detecting the default branch.
pub const DEFAULT_REMOTE: &str = "origin";

/// Conventional branch names probed when the remote has no HEAD pointer.
pub const DEFAULT_BRANCHES: &[&str] = &["main", "master"];

/// Infrastructure tool invoked by `fmt`, `validate` and `test`.
pub const DEFAULT_BINARY: &str = "terraform";

/// Returns the default number of parallel jobs.
///
/// Uses the number of available processing units, falling back to 1 when
/// that cannot be determined.
pub fn default_max_jobs() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

//! # Modules and Module Discovery
//!
//! A module is a directory that directly contains marker source files
//! (`*.tf` by default). Modules live below one of a few category directories
//! (`components/`, `bases/`, `projects/`) that group them by role.
//!
//! This module provides:
//!
//! - **`ModuleDescriptor`**: the identity of one module in a run.
//! - **`ModuleProbe`**: the "does this directory hold marker files" test the
//!   boundary mapper depends on. `MarkerProbe` is the filesystem
//!   implementation; any `Fn(&Path) -> bool` also works, which keeps mapper
//!   tests free of disk access.
//! - **`discover_modules`**: a recursive scan used when every module should
//!   be processed, not only the changed ones.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::debug;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Result;
use crate::path;

/// The role a module plays in the repository layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Reusable building block
    Component,
    /// Shared foundation composed by projects
    Base,
    /// Deployable composition
    Project,
    #[serde(other)]
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Component => "component",
            Category::Base => "base",
            Category::Project => "project",
            Category::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One module selected for a run.
///
/// Lists of descriptors hold at most one entry per `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    /// Last segment of `path`
    pub name: String,
    pub category: Category,
    /// Forward-slash path relative to the configured base directory
    pub path: String,
    /// Absolute directory the module's operations run in
    pub dir: PathBuf,
}

impl ModuleDescriptor {
    /// Build a descriptor from a base-relative module path.
    pub fn new(category: Category, path: &str, base_abs: &Path) -> Self {
        let path = path::normalize(path);
        Self {
            name: path::file_name(&path).to_string(),
            category,
            dir: base_abs.join(&path),
            path,
        }
    }
}

/// Decides whether a directory is a module root.
pub trait ModuleProbe: Send + Sync {
    /// True when `dir` itself (not a child) contains marker files.
    fn is_module_dir(&self, dir: &Path) -> bool;
}

impl<F> ModuleProbe for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn is_module_dir(&self, dir: &Path) -> bool {
        self(dir)
    }
}

/// Filesystem probe that looks for files matching the marker globs.
#[derive(Debug, Clone)]
pub struct MarkerProbe {
    markers: Vec<Pattern>,
}

impl MarkerProbe {
    /// Compile the marker patterns (e.g. `*.tf`).
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Result<Self> {
        let markers = markers
            .iter()
            .map(|m| Pattern::new(m.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { markers })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.markers)
    }
}

impl ModuleProbe for MarkerProbe {
    fn is_module_dir(&self, dir: &Path) -> bool {
        let Ok(entries) = fs::read_dir(dir) else {
            return false;
        };
        entries.filter_map(|entry| entry.ok()).any(|entry| {
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            is_file
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| self.markers.iter().any(|p| p.matches(name)))
        })
    }
}

/// Find every module below the configured category directories.
///
/// Excluded directory names are pruned from the walk, category directories
/// themselves are never modules, and the result is sorted by path.
pub fn discover_modules(
    repo_root: &Path,
    config: &Config,
    probe: &dyn ModuleProbe,
) -> Result<Vec<ModuleDescriptor>> {
    let base_abs = config.base_abs(repo_root);
    let excluded = config.excluded_dirs();
    let mut modules = Vec::new();

    for category in &config.categories {
        let category_abs = base_abs.join(&category.dir);
        if !category_abs.is_dir() {
            debug!("Category directory {} does not exist", category_abs.display());
            continue;
        }

        let walker = WalkDir::new(&category_abs)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| excluded.contains(name)))
            });

        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_dir() || !probe.is_module_dir(entry.path()) {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&base_abs)
                .map(|p| path::normalize(&p.to_string_lossy()))
                .unwrap_or_default();
            modules.push(ModuleDescriptor::new(category.kind, &rel, &base_abs));
        }
    }

    modules.sort_by(|a, b| a.path.cmp(&b.path));
    modules.dedup_by(|a, b| a.path == b.path);
    debug!("Discovered {} module(s)", modules.len());
    Ok(modules)
}

//! # Module Boundary Mapping
//!
//! Resolves each changed file to the module directory that owns it.
//!
//! ## Resolution Rules
//!
//! 1. Only files below `<base_dir>/<category_dir>/` are considered; all
//!    other changes are ignored.
//! 2. The file's own directory is the first candidate. A candidate is a
//!    module root when it directly contains marker files.
//! 3. Otherwise the walk moves upward one directory at a time. It stops
//!    before reaching the category directory, so neither the category
//!    directory nor the base directory is ever a module.
//! 4. Candidates inside an excluded auxiliary directory (`tests/`,
//!    `.terraform/`, …) are skipped even when they hold marker files, so a
//!    test fixture resolves to the module that owns it.
//! 5. Files with no owning module are dropped silently.
//!
//! The result holds one descriptor per module path, sorted by path, so the
//! same change set always yields the same list regardless of input order.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::debug;

use crate::changes::ChangeSet;
use crate::config::{CategoryDir, Config};
use crate::module::{ModuleDescriptor, ModuleProbe};
use crate::path;

/// Maps changed files onto module descriptors.
pub struct ModuleMapper<'a> {
    base_dir: String,
    base_abs: PathBuf,
    /// Longest directory first so nested categories win over their parents
    categories: Vec<&'a CategoryDir>,
    excluded: BTreeSet<String>,
    probe: &'a dyn ModuleProbe,
}

impl<'a> ModuleMapper<'a> {
    pub fn new(repo_root: &Path, config: &'a Config, probe: &'a dyn ModuleProbe) -> Self {
        // An empty dir would make the base directory a category
        let mut categories: Vec<&CategoryDir> = config
            .categories
            .iter()
            .filter(|c| !path::normalize(&c.dir).is_empty())
            .collect();
        categories.sort_by(|a, b| b.dir.len().cmp(&a.dir.len()));
        Self {
            base_dir: path::normalize(&config.base_dir),
            base_abs: config.base_abs(repo_root),
            categories,
            excluded: config.excluded_dirs(),
            probe,
        }
    }

    /// Resolve a change set to its sorted, deduplicated modules.
    pub fn map(&self, changes: &ChangeSet) -> Vec<ModuleDescriptor> {
        let mut modules: BTreeMap<String, ModuleDescriptor> = BTreeMap::new();

        for file in changes.iter() {
            match self.resolve(file) {
                Some(module) => {
                    modules.entry(module.path.clone()).or_insert(module);
                }
                None => debug!("No module owns {}", file),
            }
        }

        debug!(
            "{} changed file(s) map to {} module(s)",
            changes.len(),
            modules.len()
        );
        modules.into_values().collect()
    }

    /// Resolve one repository-relative file to its owning module.
    pub fn resolve(&self, file: &str) -> Option<ModuleDescriptor> {
        let file = path::normalize(file);
        let rel = path::strip_dir_prefix(&file, &self.base_dir)?;
        let category = self
            .categories
            .iter()
            .find(|c| path::strip_dir_prefix(rel, &c.dir).is_some())?;

        let mut dir = path::parent(rel);
        while let Some(below_category) = path::strip_dir_prefix(dir, &category.dir) {
            if !path::has_excluded_segment(below_category, &self.excluded)
                && self.probe.is_module_dir(&self.base_abs.join(dir))
            {
                return Some(ModuleDescriptor::new(category.kind, dir, &self.base_abs));
            }
            dir = path::parent(dir);
        }

        None
    }
}

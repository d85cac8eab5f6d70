//! Module selection: which modules a run should process.
//!
//! Either every module in the repository, or only those owning a changed
//! file. Change-based selection chains the change detector and the boundary
//! mapper; any repository-access error surfaces here, before a single module
//! has run.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::changes::{ChangeDetector, ChangeSet};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::Vcs;
use crate::mapper::ModuleMapper;
use crate::module::{self, ModuleDescriptor, ModuleProbe};
use crate::path;

/// Every module below the configured categories.
pub fn all_modules(
    repo_root: &Path,
    config: &Config,
    probe: &dyn ModuleProbe,
) -> Result<Vec<ModuleDescriptor>> {
    module::discover_modules(repo_root, config, probe)
}

/// Modules owning a file changed relative to `base_ref` (or the remote's
/// default branch when `None`), including uncommitted changes.
///
/// `workspace_root` may be a subdirectory of the work tree. Changed paths
/// are re-based onto it and changes outside it are ignored.
pub fn changed_modules(
    vcs: &dyn Vcs,
    workspace_root: &Path,
    config: &Config,
    probe: &dyn ModuleProbe,
    base_ref: Option<&str>,
) -> Result<Vec<ModuleDescriptor>> {
    let toplevel = vcs.repo_root()?;
    let prefix = workspace_prefix(workspace_root, &toplevel).ok_or_else(|| {
        Error::NotARepository {
            path: workspace_root.display().to_string(),
        }
    })?;

    let changes = ChangeDetector::new(vcs).detect(base_ref)?;
    let rebased: ChangeSet = changes
        .iter()
        .filter_map(|file| path::strip_dir_prefix(file, &prefix))
        .collect();
    if rebased.len() < changes.len() {
        debug!(
            "{} changed file(s) lie outside {}",
            changes.len() - rebased.len(),
            workspace_root.display()
        );
    }

    let modules = ModuleMapper::new(workspace_root, config, probe).map(&rebased);
    info!(
        "{} changed file(s) touch {} module(s)",
        rebased.len(),
        modules.len()
    );
    Ok(modules)
}

/// Forward-slash location of `workspace_root` inside the work tree, `""`
/// for the top level. `None` when it lies outside the work tree.
fn workspace_prefix(workspace_root: &Path, toplevel: &Path) -> Option<String> {
    let canonical = |p: &Path| fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
    let root = canonical(workspace_root);
    let rel = root.strip_prefix(canonical(toplevel)).ok()?;
    Some(path::normalize(&rel.to_string_lossy()))
}

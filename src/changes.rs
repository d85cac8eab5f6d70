//! # Change Detection
//!
//! Produces the set of files a run should consider "changed": the union of
//! the committed difference between a base reference and HEAD, and every
//! uncommitted modification in the working tree.
//!
//! ## Failure Behavior
//!
//! - When the base reference does not resolve (not fetched yet, or a typo),
//!   detection degrades to uncommitted changes only and logs a warning.
//! - Every other git failure is fatal and returned to the caller before any
//!   module work starts.
//! - Without an explicit base reference the remote's default branch is
//!   auto-detected first; failing that is an error asking for `--ref`.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::git::Vcs;

/// Repository-relative, forward-slash paths of changed files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    files: BTreeSet<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, file: &str) -> bool {
        self.files.contains(file)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for ChangeSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.files.extend(iter.into_iter().map(Into::into));
    }
}

/// Computes change sets through a `Vcs` implementation.
pub struct ChangeDetector<'a> {
    vcs: &'a dyn Vcs,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(vcs: &'a dyn Vcs) -> Self {
        Self { vcs }
    }

    /// Collect committed and uncommitted changes relative to `base_ref`.
    ///
    /// `None` auto-detects the remote's default branch.
    pub fn detect(&self, base_ref: Option<&str>) -> Result<ChangeSet> {
        let base_ref = match base_ref {
            Some(r) => r.to_string(),
            None => self.vcs.default_branch()?,
        };

        let mut changes = ChangeSet::new();

        match self.vcs.changed_files(&base_ref) {
            Ok(files) => {
                debug!("{} file(s) differ between {} and HEAD", files.len(), base_ref);
                changes.extend(files);
            }
            Err(Error::RefNotFound { r#ref }) => {
                warn!(
                    "Base ref '{}' not found, only uncommitted changes will be considered",
                    r#ref
                );
            }
            Err(e) => return Err(e),
        }

        let uncommitted = self.vcs.uncommitted_files()?;
        debug!("{} uncommitted file(s)", uncommitted.len());
        changes.extend(uncommitted);

        Ok(changes)
    }
}

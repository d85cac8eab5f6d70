//! # Git Access
//!
//! The change detector talks to version control through the `Vcs` trait so
//! it can be exercised with in-memory fakes. `SystemGit` is the real
//! implementation; it shells out to the system `git` binary, which picks up
//! whatever configuration, credentials and worktree layout the user already
//! has.
//!
//! Paths returned by every method are repository-relative and use forward
//! slashes. Commands run with `-z` so unusual file names never need
//! unquoting.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::debug;

use crate::error::{Error, Result};
use crate::path;

/// Version-control operations the change detector depends on.
pub trait Vcs: Send + Sync {
    /// Absolute path of the repository's top-level directory.
    fn repo_root(&self) -> Result<PathBuf>;

    /// Files that differ between the tree at `base_ref` and the tree at HEAD.
    ///
    /// Renames report both the old and the new path. Must return
    /// `Error::RefNotFound` when `base_ref` does not resolve to a commit.
    fn changed_files(&self, base_ref: &str) -> Result<Vec<String>>;

    /// Files with a non-clean status in the index or the working tree,
    /// untracked files included.
    fn uncommitted_files(&self) -> Result<Vec<String>>;

    /// The remote's default branch as `<remote>/<branch>`.
    fn default_branch(&self) -> Result<String>;
}

/// `Vcs` backed by the system `git` command.
#[derive(Debug, Clone)]
pub struct SystemGit {
    root: PathBuf,
    remote: String,
    branch_candidates: Vec<String>,
}

impl SystemGit {
    /// Locate the repository containing `start`.
    pub fn discover(start: &Path, remote: &str, branch_candidates: &[String]) -> Result<Self> {
        let output = git_output(start, &["rev-parse", "--show-toplevel"])?;
        if !output.status.success() {
            return Err(Error::NotARepository {
                path: start.display().to_string(),
            });
        }
        let root = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        debug!("Repository root: {}", root.display());
        Ok(Self {
            root,
            remote: remote.to_string(),
            branch_candidates: branch_candidates.to_vec(),
        })
    }

    fn git(&self, args: &[&str]) -> Result<Output> {
        git_output(&self.root, args)
    }

    /// Run a command that is expected to succeed and return its stdout.
    fn git_checked(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = self.git(args)?;
        if !output.status.success() {
            return Err(Error::GitCommand {
                command: args.join(" "),
                repo: self.root.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// Whether `reference` names an existing object of the given kind.
    fn verifies(&self, reference: &str) -> Result<bool> {
        let output = self.git(&["rev-parse", "--verify", "--quiet", reference])?;
        Ok(output.status.success())
    }
}

impl Vcs for SystemGit {
    fn repo_root(&self) -> Result<PathBuf> {
        Ok(self.root.clone())
    }

    fn changed_files(&self, base_ref: &str) -> Result<Vec<String>> {
        if !self.verifies(&format!("{}^{{commit}}", base_ref))? {
            return Err(Error::RefNotFound {
                r#ref: base_ref.to_string(),
            });
        }
        // --no-renames reports a rename as delete + add, so both sides count
        let stdout = self.git_checked(&[
            "diff",
            "--name-only",
            "--no-renames",
            "-z",
            base_ref,
            "HEAD",
            "--",
        ])?;
        Ok(parse_nul_list(&stdout))
    }

    fn uncommitted_files(&self) -> Result<Vec<String>> {
        let stdout = self.git_checked(&[
            "status",
            "--porcelain=v1",
            "-z",
            "--untracked-files=all",
        ])?;
        Ok(parse_porcelain_z(&stdout))
    }

    fn default_branch(&self) -> Result<String> {
        let head_ref = format!("refs/remotes/{}/HEAD", self.remote);
        let output = self.git(&["symbolic-ref", "--quiet", &head_ref])?;
        if output.status.success() {
            let target = String::from_utf8_lossy(&output.stdout);
            if let Some(branch) = branch_from_symbolic_ref(target.trim()) {
                debug!("Default branch from {}: {}", head_ref, branch);
                return Ok(branch);
            }
        }

        for candidate in &self.branch_candidates {
            let full = format!("refs/remotes/{}/{}", self.remote, candidate);
            if self.verifies(&full)? {
                debug!("Default branch probed: {}/{}", self.remote, candidate);
                return Ok(format!("{}/{}", self.remote, candidate));
            }
        }

        Err(Error::DefaultBranchNotFound {
            remote: self.remote.clone(),
            tried: self.branch_candidates.join(", "),
        })
    }
}

fn git_output(dir: &Path, args: &[&str]) -> Result<Output> {
    Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            repo: dir.display().to_string(),
            stderr: e.to_string(),
        })
}

/// Split NUL-terminated `git -z` output into normalized paths.
pub fn parse_nul_list(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .map(|entry| path::normalize(&String::from_utf8_lossy(entry)))
        .collect()
}

/// Parse `git status --porcelain=v1 -z` output.
///
/// Each record is `XY <path>`. Renames and copies are followed by an extra
/// record holding the original path, which is reported as well.
pub fn parse_porcelain_z(stdout: &[u8]) -> Vec<String> {
    let mut files = Vec::new();
    let mut records = stdout.split(|b| *b == 0).filter(|r| !r.is_empty());

    while let Some(record) = records.next() {
        if record.len() < 4 {
            continue;
        }
        let status = &record[..2];
        files.push(path::normalize(&String::from_utf8_lossy(&record[3..])));

        if matches!(status[0], b'R' | b'C') {
            if let Some(original) = records.next() {
                files.push(path::normalize(&String::from_utf8_lossy(original)));
            }
        }
    }

    files
}

/// Turn `refs/remotes/origin/main` into `origin/main`.
pub fn branch_from_symbolic_ref(target: &str) -> Option<String> {
    target
        .strip_prefix("refs/remotes/")
        .filter(|rest| rest.contains('/'))
        .map(|rest| rest.to_string())
}

//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the `.modrun.yaml`
//! configuration file and the logic for loading it. The file is optional:
//! every field has a default, so a repository laid out as
//! `components/`, `bases/` and `projects/` with `*.tf` modules needs no
//! configuration at all.
//!
//! ## Example
//!
//! ```yaml
//! base_dir: infra
//! categories:
//!   - { dir: components, kind: component }
//!   - { dir: projects, kind: project }
//! markers: ["*.tf"]
//! exclude_dirs: [".terraform", "tests", "examples"]
//! remote: origin
//! default_branches: [main]
//! binary: tofu
//! max_parallel: 4
//! tasks:
//!   lint:
//!     command: ["tflint", "--recursive"]
//! ```
//!
//! A `Config` is loaded once per invocation and passed by reference to the
//! detector, mapper and orchestrator; nothing reads settings from global
//! state.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::module::Category;
use crate::path;

/// A top-level directory grouping modules of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryDir {
    /// Directory relative to `base_dir`.
    pub dir: String,
    /// Category assigned to every module found below `dir`.
    #[serde(default = "default_kind")]
    pub kind: Category,
}

fn default_kind() -> Category {
    Category::Unknown
}

/// A named command that `modrun task <name>` runs in every selected module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDef {
    /// Program followed by its arguments.
    pub command: Vec<String>,
    /// Shown by `modrun task --list`.
    #[serde(default)]
    pub description: Option<String>,
}

/// The complete `.modrun.yaml` configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Repository-relative directory module paths are displayed against.
    /// Never itself a module.
    pub base_dir: String,
    pub categories: Vec<CategoryDir>,
    /// Glob patterns identifying module source files.
    pub markers: Vec<String>,
    /// Directory names that are never module roots.
    pub exclude_dirs: Vec<String>,
    pub remote: String,
    pub default_branches: Vec<String>,
    /// `terraform` or `tofu`.
    pub binary: String,
    pub max_parallel: Option<usize>,
    pub tasks: BTreeMap<String, TaskDef>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: String::new(),
            categories: vec![
                CategoryDir {
                    dir: "components".to_string(),
                    kind: Category::Component,
                },
                CategoryDir {
                    dir: "bases".to_string(),
                    kind: Category::Base,
                },
                CategoryDir {
                    dir: "projects".to_string(),
                    kind: Category::Project,
                },
            ],
            markers: to_strings(defaults::DEFAULT_MARKERS),
            exclude_dirs: to_strings(defaults::DEFAULT_EXCLUDE_DIRS),
            remote: defaults::DEFAULT_REMOTE.to_string(),
            default_branches: to_strings(defaults::DEFAULT_BRANCHES),
            binary: defaults::DEFAULT_BINARY.to_string(),
            max_parallel: None,
            tasks: BTreeMap::new(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Config {
    /// Excluded directory names as a set.
    pub fn excluded_dirs(&self) -> BTreeSet<String> {
        self.exclude_dirs.iter().cloned().collect()
    }

    /// Absolute base directory for a repository root.
    pub fn base_abs(&self, repo_root: &Path) -> PathBuf {
        if self.base_dir.is_empty() {
            repo_root.to_path_buf()
        } else {
            repo_root.join(&self.base_dir)
        }
    }

    fn validate(mut self) -> Result<Self> {
        self.base_dir = path::normalize(&self.base_dir);

        if self.categories.is_empty() {
            return Err(Error::ConfigParse {
                message: "no module categories configured".to_string(),
                hint: Some("Add at least one entry under 'categories:'".to_string()),
            });
        }
        for category in &mut self.categories {
            category.dir = path::normalize(&category.dir);
            if category.dir.is_empty() {
                return Err(Error::ConfigParse {
                    message: "category directory must not be empty".to_string(),
                    hint: Some(
                        "The base directory itself is never a module category".to_string(),
                    ),
                });
            }
        }

        if self.markers.is_empty() {
            return Err(Error::ConfigParse {
                message: "no module marker patterns configured".to_string(),
                hint: Some("Use e.g. markers: [\"*.tf\"]".to_string()),
            });
        }
        for marker in &self.markers {
            glob::Pattern::new(marker).map_err(|e| Error::ConfigParse {
                message: format!("invalid marker pattern '{}': {}", marker, e),
                hint: None,
            })?;
        }

        if self.binary.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: "binary must not be empty".to_string(),
                hint: Some("Use 'terraform' or 'tofu'".to_string()),
            });
        }

        for (name, task) in &self.tasks {
            if task.command.is_empty() || task.command[0].trim().is_empty() {
                return Err(Error::ConfigParse {
                    message: format!("task '{}' has an empty command", name),
                    hint: Some("Use e.g. command: [\"tflint\", \"--recursive\"]".to_string()),
                });
            }
        }

        Ok(self)
    }
}

/// Parse a configuration from a YAML string.
///
/// An empty document yields the default configuration.
pub fn parse(yaml_content: &str) -> Result<Config> {
    if yaml_content.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: None,
    })?;
    config.validate()
}

/// Parse a configuration file from disk.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse(&content)
}

/// Load the configuration for a repository.
///
/// An explicit path must exist. Without one, `<repo_root>/.modrun.yaml` is
/// used when present and the defaults otherwise.
pub fn load(repo_root: &Path, explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => from_file(path),
        None => {
            let candidate = repo_root.join(defaults::DEFAULT_CONFIG_FILENAME);
            if candidate.is_file() {
                from_file(candidate)
            } else {
                Ok(Config::default())
            }
        }
    }
}

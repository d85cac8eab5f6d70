//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fixture that lays out a module repository in a
//! temporary directory, plus helpers for running the `modrun` binary in it.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_module("components/vpc");
//!     fixture.command().arg("list").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// OpenTofu instead of Terraform, two tasks.
    pub const WITH_TASKS: &str = r#"
binary: tofu
tasks:
  hello:
    command: ["sh", "-c", "echo hello from $(basename $PWD)"]
    description: Print a greeting
  fail:
    command: ["sh", "-c", "echo broken >&2; exit 4"]
"#;

    /// Modules grouped below an `infra/` directory.
    pub const WITH_BASE_DIR: &str = r#"
base_dir: infra
categories:
  - { dir: modules, kind: component }
  - { dir: live, kind: project }
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "invalid: yaml: content:";

    /// Valid YAML with a misspelled key.
    pub const UNKNOWN_FIELD: &str = "markerz: [\"*.tf\"]\n";
}

/// A temporary repository populated with modules.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_module("components/vpc")
///     .with_file("components/vpc/tests/vpc_test.go", "package test");
///
/// fixture.command().arg("list").assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// The fixture with one module in each default category.
    #[allow(dead_code)]
    pub fn standard() -> Self {
        Self::new()
            .with_module("components/network")
            .with_module("components/storage")
            .with_module("bases/platform")
            .with_module("projects/prod")
            .with_file("components/network/examples/basic/main.tf", "")
            .with_file("components/network/tests/network_test.go", "package test\n")
    }

    /// Add a `.modrun.yaml` configuration file with the given content.
    #[allow(dead_code)]
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(".modrun.yaml", content)
    }

    /// Add a module directory containing a `main.tf`.
    pub fn with_module(self, path: &str) -> Self {
        self.with_file(&format!("{}/main.tf", path), "terraform {}\n")
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Run `git` in the fixture, panicking on failure.
    #[allow(dead_code)]
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Turn the fixture into a git repository on `main` with everything
    /// committed.
    #[allow(dead_code)]
    pub fn with_git(self) -> Self {
        self.git(&["init", "--quiet", "--initial-branch=main"]);
        self.git(&["config", "user.email", "dev@example.com"]);
        self.git(&["config", "user.name", "Dev"]);
        self.git(&["config", "commit.gpgsign", "false"]);
        self.commit_all("initial");
        self
    }

    /// Stage everything and commit.
    #[allow(dead_code)]
    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "--allow-empty", "-m", message]);
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command rooted at this fixture with color disabled.
    pub fn command(&self) -> assert_cmd::Command {
        self.command_at("")
    }

    /// Create a command rooted at a subdirectory of this fixture.
    pub fn command_at(&self, subdir: &str) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("modrun");
        cmd.current_dir(self.path())
            .arg("--root")
            .arg(self.path().join(subdir))
            .arg("--color")
            .arg("never")
            .env_remove("MODRUN_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_module() {
        let fixture = TestFixture::new().with_module("components/vpc");
        assert!(fixture.path().join("components/vpc/main.tf").exists());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        for config in [configs::WITH_TASKS, configs::WITH_BASE_DIR, configs::UNKNOWN_FIELD] {
            serde_yaml::from_str::<serde_yaml::Value>(config).expect("Config should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}

//! # modrun
//!
//! Run one operation (format, validate, test, a custom task) across the
//! infrastructure modules of a repository, optionally limited to the modules
//! a change actually touches. Concurrent runs keep every output line and
//! every error attributed to the module that produced it.
//!
//! ## Quick Example
//!
//! ```
//! use std::io::Write;
//! use std::path::Path;
//!
//! use modrun::changes::ChangeSet;
//! use modrun::config::Config;
//! use modrun::mapper::ModuleMapper;
//! use modrun::module::ModuleDescriptor;
//! use modrun::multiplex::Multiplexer;
//! use modrun::orchestrator::{run_on_modules, RunPolicy};
//!
//! let config = Config::default();
//! let probe = |dir: &Path| dir == Path::new("/repo/components/vpc");
//! let mapper = ModuleMapper::new(Path::new("/repo"), &config, &probe);
//!
//! let changes: ChangeSet = ["components/vpc/main.tf", "components/vpc/tests/vpc_test.go"]
//!     .into_iter()
//!     .collect();
//! let modules = mapper.map(&changes);
//! assert_eq!(modules.len(), 1);
//!
//! let mux = Multiplexer::new(std::io::sink(), std::io::sink(), &modules, false);
//! let op = |m: &ModuleDescriptor, out: &mut (dyn Write + Send), _err: &mut (dyn Write + Send)| -> anyhow::Result<()> {
//!     writeln!(out, "checking {}", m.path)?;
//!     Ok(())
//! };
//! run_on_modules(&modules, &RunPolicy::parallel(Some(2)), &mux, &op).unwrap();
//! ```
//!
//! ## Core Concepts
//!
//! - **Change detection (`changes`, `git`)**: the union of files changed
//!   between a base ref and HEAD and all uncommitted changes. An unknown base
//!   ref degrades to uncommitted changes only.
//! - **Boundary mapping (`mapper`, `module`)**: each changed file resolves to
//!   the module directory owning it, walking up out of auxiliary directories
//!   like `tests/` or `examples/`.
//! - **Orchestration (`orchestrator`)**: sequential or bounded-parallel
//!   execution that runs every module and collects every failure.
//! - **Multiplexing (`multiplex`)**: per-module, line-buffered, color-coded
//!   and timestamped output that never splices two modules onto one line.
//!
//! Configuration (`config`) is loaded once and passed by reference; nothing
//! depends on global state.

pub mod changes;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod mapper;
pub mod module;
pub mod multiplex;
pub mod orchestrator;
pub mod output;
pub mod path;
pub mod process;
pub mod selection;
pub mod suggestions;

#[cfg(test)]
mod path_proptest;

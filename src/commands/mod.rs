//! # CLI Command Implementations
//!
//! Each subcommand of `modrun` lives in its own file with an `Args` struct
//! (derived with `clap`) and an `execute` function.
//!
//! Everything that picks modules or runs an operation goes through the
//! helpers here:
//!
//! - **`SelectionArgs`**: `--changed`, `--ref`, `-p/--parallel` and
//!   `--max-parallel`, shared by every command that processes modules.
//! - **`Workspace`**: the repository root and its loaded configuration,
//!   resolved once per invocation.
//! - **`run_operation`**: selection, multiplexed execution and the final
//!   summary.

pub mod completions;
pub mod list;
pub mod run;
pub mod task;
pub mod tool;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::debug;

use modrun::config::{self, Config};
use modrun::git::{SystemGit, Vcs};
use modrun::module::{MarkerProbe, ModuleDescriptor};
use modrun::multiplex::Multiplexer;
use modrun::orchestrator::{run_on_modules, Operation, RunPolicy};
use modrun::output::OutputConfig;
use modrun::selection::{all_modules, changed_modules};

use crate::cli::GlobalArgs;

/// Which modules to process and how.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Only process modules with committed or uncommitted changes
    #[arg(long)]
    pub changed: bool,

    /// Base ref to compare against (implies --changed). Defaults to the
    /// remote's default branch.
    #[arg(long = "ref", value_name = "REF")]
    pub base_ref: Option<String>,

    /// Process modules in parallel
    #[arg(short, long)]
    pub parallel: bool,

    /// Maximum number of modules processed at once (implies --parallel).
    /// Defaults to `max_parallel` from the configuration, then the CPU count.
    #[arg(long, value_name = "N")]
    pub max_parallel: Option<usize>,
}

impl SelectionArgs {
    fn changed_only(&self) -> bool {
        self.changed || self.base_ref.is_some()
    }

    /// Concurrency policy; the flag overrides the configuration file.
    pub fn policy(&self, config: &Config) -> RunPolicy {
        if self.parallel || self.max_parallel.is_some() {
            RunPolicy::parallel(self.max_parallel.or(config.max_parallel))
        } else {
            RunPolicy::sequential()
        }
    }
}

/// Repository root and configuration for one invocation.
pub struct Workspace {
    pub root: PathBuf,
    pub config: Config,
}

impl Workspace {
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        let start = match &global.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };

        let root = match &global.root {
            Some(_) => start,
            None => SystemGit::discover(&start, "origin", &[])
                .and_then(|git| git.repo_root())
                .unwrap_or(start),
        };
        debug!("Workspace root: {}", root.display());

        if let Some(path) = &global.config {
            if !path.exists() {
                return Err(modrun::suggestions::config_not_found(path));
            }
        }
        let config = config::load(&root, global.config.as_deref())
            .with_context(|| format!("Failed to load configuration for {}", root.display()))?;

        Ok(Self { root, config })
    }

    /// The modules picked by `selection`.
    pub fn select(&self, selection: &SelectionArgs) -> Result<Vec<ModuleDescriptor>> {
        let probe = MarkerProbe::from_config(&self.config)?;

        if selection.changed_only() {
            let git = SystemGit::discover(
                &self.root,
                &self.config.remote,
                &self.config.default_branches,
            )?;
            Ok(changed_modules(
                &git,
                &self.root,
                &self.config,
                &probe,
                selection.base_ref.as_deref(),
            )?)
        } else {
            Ok(all_modules(&self.root, &self.config, &probe)?)
        }
    }
}

/// Select modules, run `operation` on them and report the outcome.
pub fn run_operation(
    global: &GlobalArgs,
    workspace: &Workspace,
    selection: &SelectionArgs,
    operation: &dyn Operation,
) -> Result<()> {
    let modules = workspace.select(selection)?;
    let out = OutputConfig::new(global.color.into());

    if modules.is_empty() {
        eprintln!("No modules selected");
        return Ok(());
    }

    let policy = selection.policy(&workspace.config);
    let mux = Multiplexer::stdio(&modules, out.use_color);
    run_on_modules(&modules, &policy, &mux, operation).map_err(|e| {
        eprintln!("{}", out.failure("FAILED"));
        anyhow::Error::from(e)
    })?;

    eprintln!(
        "{} {} module(s) succeeded",
        out.success("OK"),
        modules.len()
    );
    Ok(())
}

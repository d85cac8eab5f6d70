//! # Built-in Terraform/OpenTofu Operations
//!
//! `fmt`, `validate` and `test` run the configured binary (`terraform` by
//! default, `tofu` with `binary: tofu`) in each selected module.

use anyhow::Result;
use clap::Args;

use modrun::config::Config;
use modrun::process::{CommandOperation, CommandSpec};

use super::{run_operation, SelectionArgs, Workspace};
use crate::cli::GlobalArgs;

/// Arguments for `validate` and `test`.
#[derive(Args, Debug)]
pub struct ToolArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}

/// Format module sources
#[derive(Args, Debug)]
pub struct FmtArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Fail instead of rewriting files, showing the diff
    #[arg(long)]
    pub check: bool,
}

/// Execute the `fmt` command.
pub fn execute_fmt(args: FmtArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let operation = fmt_operation(&workspace.config, args.check);
    run_operation(global, &workspace, &args.selection, &operation)
}

/// Execute the `validate` command.
pub fn execute_validate(args: ToolArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let operation = validate_operation(&workspace.config);
    run_operation(global, &workspace, &args.selection, &operation)
}

/// Execute the `test` command.
pub fn execute_test(args: ToolArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let operation = test_operation(&workspace.config);
    run_operation(global, &workspace, &args.selection, &operation)
}

fn fmt_operation(config: &Config, check: bool) -> CommandOperation {
    let args: &[&str] = if check {
        &["fmt", "-check", "-diff"]
    } else {
        &["fmt"]
    };
    CommandOperation::new(CommandSpec::new(config.binary.as_str(), args.iter().copied()))
}

// Validation needs provider schemas, so each module is initialized first
// without touching its backend.
fn validate_operation(config: &Config) -> CommandOperation {
    let binary = config.binary.as_str();
    CommandOperation::new(CommandSpec::new(
        binary,
        ["init", "-backend=false", "-input=false"],
    ))
    .then(CommandSpec::new(binary, ["validate"]))
    .env("TF_IN_AUTOMATION", "1")
}

fn test_operation(config: &Config) -> CommandOperation {
    CommandOperation::new(CommandSpec::new(config.binary.as_str(), ["test"]))
        .env("TF_IN_AUTOMATION", "1")
}

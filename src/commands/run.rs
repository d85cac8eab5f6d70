//! # Run Command Implementation
//!
//! Runs an arbitrary program in every selected module directory:
//!
//! ```bash
//! modrun run --changed -p -- terraform init -backend=false
//! ```

use anyhow::Result;
use clap::Args;

use modrun::process::{CommandOperation, CommandSpec};
use modrun::suggestions;

use super::{run_operation, SelectionArgs, Workspace};
use crate::cli::GlobalArgs;

/// Run an arbitrary command in every selected module
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Program and arguments to run in each module directory
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Execute the `run` command.
pub fn execute(args: RunArgs, global: &GlobalArgs) -> Result<()> {
    let spec = CommandSpec::from_argv(&args.command).ok_or_else(suggestions::missing_command)?;
    let workspace = Workspace::open(global)?;
    run_operation(
        global,
        &workspace,
        &args.selection,
        &CommandOperation::new(spec),
    )
}

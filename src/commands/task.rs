//! # Task Command Implementation
//!
//! Runs a named task from the `tasks:` section of `.modrun.yaml`:
//!
//! ```yaml
//! tasks:
//!   lint:
//!     command: ["tflint", "--recursive"]
//!     description: Run tflint
//! ```
//!
//! `modrun task --list` shows the defined tasks.

use anyhow::Result;
use clap::Args;

use modrun::config::Config;
use modrun::process::{CommandOperation, CommandSpec};
use modrun::suggestions;

use super::{run_operation, SelectionArgs, Workspace};
use crate::cli::GlobalArgs;

/// Run a task defined in .modrun.yaml
#[derive(Args, Debug)]
pub struct TaskArgs {
    /// Name of the task to run
    #[arg(required_unless_present = "list")]
    pub name: Option<String>,

    /// List the defined tasks and exit
    #[arg(long, conflicts_with = "name")]
    pub list: bool,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

/// Execute the `task` command.
pub fn execute(args: TaskArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::open(global)?;

    let name = match args.name {
        Some(name) if !args.list => name,
        _ => {
            print!("{}", render_task_list(&workspace.config));
            return Ok(());
        }
    };

    let operation = task_operation(&workspace.config, &name)?;
    run_operation(global, &workspace, &args.selection, &operation)
}

fn task_operation(config: &Config, name: &str) -> Result<CommandOperation> {
    let task = config
        .tasks
        .get(name)
        .ok_or_else(|| suggestions::unknown_task(name, config))?;
    let spec = CommandSpec::from_argv(&task.command).ok_or_else(suggestions::missing_command)?;
    Ok(CommandOperation::new(spec))
}

fn render_task_list(config: &Config) -> String {
    if config.tasks.is_empty() {
        return "No tasks defined\n".to_string();
    }

    let width = config.tasks.keys().map(String::len).max().unwrap_or(0);
    let mut output = String::new();
    for (name, task) in &config.tasks {
        let description = task
            .description
            .clone()
            .unwrap_or_else(|| task.command.join(" "));
        output.push_str(&format!("{:<width$}  {}\n", name, description, width = width));
    }
    output
}

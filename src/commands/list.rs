//! # List Command Implementation
//!
//! Prints the modules a run would process, without running anything. With
//! `--changed` this is the quickest way to check what a change touches.
//!
//! Output formats:
//!
//! - default: `<category>  <path>` per line
//! - `--names`: module names only, one per line
//! - `--json`: a JSON array of module descriptors

use anyhow::Result;
use clap::Args;

use modrun::module::ModuleDescriptor;

use super::{SelectionArgs, Workspace};
use crate::cli::GlobalArgs;

/// List the selected modules
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print the module list as JSON
    #[arg(long, conflicts_with = "names")]
    pub json: bool,

    /// Print module names only
    #[arg(long)]
    pub names: bool,
}

/// Execute the `list` command.
pub fn execute(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let modules = workspace.select(&args.selection)?;
    print!("{}", render(&modules, args.json, args.names)?);
    Ok(())
}

fn render(modules: &[ModuleDescriptor], json: bool, names: bool) -> Result<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(modules)?));
    }

    let mut output = String::new();
    for module in modules {
        if names {
            output.push_str(&module.name);
        } else {
            output.push_str(&format!("{:<9}  {}", module.category, module.path));
        }
        output.push('\n');
    }
    Ok(output)
}

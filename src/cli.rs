//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

use modrun::output::ColorMode;

use crate::commands;

/// modrun - Run operations across the infrastructure modules a change touches
#[derive(Parser, Debug)]
#[command(name = "modrun")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Colorize output
    #[arg(long, global = true, value_enum, value_name = "WHEN", default_value = "auto")]
    pub color: ColorArg,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Repository root. Defaults to the enclosing git work tree, or the
    /// current directory outside of git.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to the configuration file. Defaults to <root>/.modrun.yaml when present.
    #[arg(short, long, global = true, value_name = "FILE", env = "MODRUN_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

impl From<ColorArg> for ColorMode {
    fn from(value: ColorArg) -> Self {
        match value {
            ColorArg::Auto => ColorMode::Auto,
            ColorArg::Always => ColorMode::Always,
            ColorArg::Never => ColorMode::Never,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the selected modules
    List(commands::list::ListArgs),

    /// Run an arbitrary command in every selected module
    Run(commands::run::RunArgs),

    /// Format module sources with terraform/tofu fmt
    Fmt(commands::tool::FmtArgs),

    /// Initialize and validate every selected module
    Validate(commands::tool::ToolArgs),

    /// Run the module test suites with terraform/tofu test
    Test(commands::tool::ToolArgs),

    /// Run a task defined in .modrun.yaml
    Task(commands::task::TaskArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.global.log_level);

        match self.command {
            Commands::List(args) => commands::list::execute(args, &self.global),
            Commands::Run(args) => commands::run::execute(args, &self.global),
            Commands::Fmt(args) => commands::tool::execute_fmt(args, &self.global),
            Commands::Validate(args) => commands::tool::execute_validate(args, &self.global),
            Commands::Test(args) => commands::tool::execute_test(args, &self.global),
            Commands::Task(args) => commands::task::execute(args, &self.global),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

//! Run external programs as module operations.
//!
//! `CommandOperation` starts a program inside the module directory and
//! streams its stdout and stderr into the module's writers while it runs.
//! Both pipes are drained concurrently so a chatty child can never block on
//! a full pipe.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use log::debug;

use crate::module::ModuleDescriptor;
use crate::orchestrator::Operation;

/// One program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<S: Into<String>>(program: impl Into<String>, args: impl IntoIterator<Item = S>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from `[program, args...]`; `None` when empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }

    /// Shell-like rendering used in messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs a sequence of commands in each module directory, stopping at the
/// first one that fails.
#[derive(Debug, Clone)]
pub struct CommandOperation {
    steps: Vec<CommandSpec>,
    env: Vec<(String, String)>,
}

impl CommandOperation {
    pub fn new(step: CommandSpec) -> Self {
        Self {
            steps: vec![step],
            env: Vec::new(),
        }
    }

    /// Run `step` after the existing steps.
    pub fn then(mut self, step: CommandSpec) -> Self {
        self.steps.push(step);
        self
    }

    /// Set an environment variable for every step.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn steps(&self) -> &[CommandSpec] {
        &self.steps
    }

    fn run_step(
        &self,
        step: &CommandSpec,
        module: &ModuleDescriptor,
        out: &mut (dyn Write + Send),
        err: &mut (dyn Write + Send),
    ) -> Result<()> {
        debug!("{}: running `{}`", module.name, step.display());
        let mut child = Command::new(&step.program)
            .args(&step.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&module.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start `{}`", step.display()))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;

        let (out_copy, err_copy) = thread::scope(|s| {
            let err_handle = s.spawn(|| io::copy(&mut stderr, err));
            let out_copy = io::copy(&mut stdout, out);
            let err_copy = err_handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stderr reader panicked")));
            (out_copy, err_copy)
        });

        let status = child
            .wait()
            .with_context(|| format!("failed to wait for `{}`", step.display()))?;
        out_copy.context("failed to forward stdout")?;
        err_copy.context("failed to forward stderr")?;

        if !status.success() {
            match status.code() {
                Some(code) => bail!("`{}` exited with status {}", step.display(), code),
                None => bail!("`{}` was terminated by a signal", step.display()),
            }
        }
        Ok(())
    }
}

impl Operation for CommandOperation {
    fn run(
        &self,
        module: &ModuleDescriptor,
        out: &mut (dyn Write + Send),
        err: &mut (dyn Write + Send),
    ) -> Result<()> {
        for step in &self.steps {
            self.run_step(step, module, out, err)?;
        }
        Ok(())
    }
}

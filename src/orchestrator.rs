//! # Orchestrator
//!
//! Runs one operation against every module of a list, either one module at a
//! time or with a bounded number of modules in flight.
//!
//! ## Guarantees
//!
//! - An empty module list succeeds without invoking the operation.
//! - Sequential runs invoke the operation strictly in list order and flush
//!   each module's residual output before the next module starts.
//! - Parallel runs use a dedicated rayon pool with exactly `jobs` worker
//!   threads, so at most `jobs` operations execute at any instant. Modules
//!   beyond that wait in the pool's queue.
//! - Every module runs. A failing (or panicking) module never cancels or
//!   skips another one.
//! - The outcome is `Ok(())` or a single `Error::ModuleFailures` naming every
//!   failed module, in list order. Nothing is retried.
//!
//! Operations must not use rayon themselves: a worker blocked inside a
//! nested rayon call may pick up another module and exceed the job limit.

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, info};
use rayon::prelude::*;

use crate::defaults;
use crate::error::{Error, ModuleFailure, ModuleFailures, Result};
use crate::module::ModuleDescriptor;
use crate::multiplex::Multiplexer;

/// Sequential or bounded-parallel execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunPolicy {
    pub parallel: bool,
    /// Upper bound on concurrent modules; `None` means one per CPU.
    pub max_jobs: Option<usize>,
}

impl RunPolicy {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            max_jobs: None,
        }
    }

    pub fn parallel(max_jobs: Option<usize>) -> Self {
        Self {
            parallel: true,
            max_jobs,
        }
    }

    /// Effective number of concurrent modules, never below 1.
    pub fn jobs(&self) -> usize {
        if !self.parallel {
            return 1;
        }
        self.max_jobs
            .unwrap_or_else(defaults::default_max_jobs)
            .max(1)
    }
}

/// Work performed once per module.
///
/// `out` and `err` are the module's prefixed primary and diagnostic streams.
pub trait Operation: Sync {
    fn run(
        &self,
        module: &ModuleDescriptor,
        out: &mut (dyn Write + Send),
        err: &mut (dyn Write + Send),
    ) -> anyhow::Result<()>;
}

impl<F> Operation for F
where
    F: Fn(&ModuleDescriptor, &mut (dyn Write + Send), &mut (dyn Write + Send)) -> anyhow::Result<()>
        + Sync,
{
    fn run(
        &self,
        module: &ModuleDescriptor,
        out: &mut (dyn Write + Send),
        err: &mut (dyn Write + Send),
    ) -> anyhow::Result<()> {
        self(module, out, err)
    }
}

/// Run `operation` on every module under `policy`.
pub fn run_on_modules(
    modules: &[ModuleDescriptor],
    policy: &RunPolicy,
    mux: &Multiplexer,
    operation: &dyn Operation,
) -> Result<()> {
    if modules.is_empty() {
        debug!("No modules to run");
        return Ok(());
    }

    let failures: Vec<ModuleFailure> = if policy.parallel {
        let jobs = policy.jobs();
        info!("Running {} module(s) with up to {} job(s)", modules.len(), jobs);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("modrun-worker-{}", i))
            .build()
            .map_err(|e| Error::ThreadPool {
                message: e.to_string(),
            })?;
        pool.install(|| {
            modules
                .par_iter()
                .enumerate()
                .filter_map(|(index, module)| run_module(index, module, mux, operation))
                .collect()
        })
    } else {
        info!("Running {} module(s) sequentially", modules.len());
        modules
            .iter()
            .enumerate()
            .filter_map(|(index, module)| run_module(index, module, mux, operation))
            .collect()
    };

    info!(
        "{} module(s) finished, {} failed",
        modules.len(),
        failures.len()
    );

    match ModuleFailures::from_failures(failures) {
        Some(failures) => Err(failures.into()),
        None => Ok(()),
    }
}

fn run_module(
    index: usize,
    module: &ModuleDescriptor,
    mux: &Multiplexer,
    operation: &dyn Operation,
) -> Option<ModuleFailure> {
    debug!("Starting {} ({})", module.name, module.path);
    let (mut out, mut err) = mux.writers(index, module);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        operation.run(module, &mut out, &mut err)
    }))
    .unwrap_or_else(|payload| {
        Err(anyhow::anyhow!(
            "operation panicked: {}",
            panic_message(payload.as_ref())
        ))
    });

    let flushed = out.flush_residual().and(err.flush_residual());
    let outcome = outcome.and_then(|()| flushed.map_err(anyhow::Error::from));

    match outcome {
        Ok(()) => {
            debug!("Finished {}", module.name);
            None
        }
        Err(source) => {
            debug!("Failed {}: {:#}", module.name, source);
            Some(ModuleFailure {
                module: module.clone(),
                source,
            })
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Category;
    use std::io;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    fn modules(names: &[&str]) -> Vec<ModuleDescriptor> {
        names
            .iter()
            .map(|n| ModuleDescriptor::new(Category::Component, &format!("components/{}", n), Path::new("/repo")))
            .collect()
    }

    fn quiet_mux(mods: &[ModuleDescriptor]) -> Multiplexer {
        Multiplexer::new(io::sink(), io::sink(), mods, false)
    }

    fn failed_names(result: Result<()>) -> Vec<String> {
        match result {
            Err(Error::ModuleFailures(failures)) => failures
                .module_names()
                .into_iter()
                .map(String::from)
                .collect(),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(()) => Vec::new(),
        }
    }

    #[test]
    fn test_policy_jobs() {
        assert_eq!(RunPolicy::sequential().jobs(), 1);
        assert_eq!(RunPolicy::parallel(Some(4)).jobs(), 4);
        assert_eq!(RunPolicy::parallel(Some(0)).jobs(), 1);
        assert!(RunPolicy::parallel(None).jobs() >= 1);
    }

    #[test]
    fn test_empty_module_list_is_noop() {
        let calls = AtomicUsize::new(0);
        let op = |_: &ModuleDescriptor, _: &mut (dyn Write + Send), _: &mut (dyn Write + Send)| -> anyhow::Result<()> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        for policy in [RunPolicy::sequential(), RunPolicy::parallel(Some(2))] {
            assert!(run_on_modules(&[], &policy, &quiet_mux(&[]), &op).is_ok());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_sequential_preserves_order() {
        let mods = modules(&["c", "a", "b", "e", "d"]);
        let seen = Mutex::new(Vec::new());
        let op = |m: &ModuleDescriptor, _: &mut (dyn Write + Send), _: &mut (dyn Write + Send)| -> anyhow::Result<()> {
            seen.lock().unwrap().push(m.name.clone());
            Ok(())
        };

        run_on_modules(&mods, &RunPolicy::sequential(), &quiet_mux(&mods), &op).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["c", "a", "b", "e", "d"]);
    }

    #[test]
    fn test_sequential_failure_of_b_only() {
        let mods = modules(&["a", "b", "c"]);
        let calls = Mutex::new(Vec::new());
        let op = |m: &ModuleDescriptor, _: &mut (dyn Write + Send), _: &mut (dyn Write + Send)| -> anyhow::Result<()> {
            calls.lock().unwrap().push(m.name.clone());
            if m.name == "b" {
                anyhow::bail!("b is broken");
            }
            Ok(())
        };

        let result = run_on_modules(&mods, &RunPolicy::sequential(), &quiet_mux(&mods), &op);
        let message = result.as_ref().unwrap_err().to_string();
        assert!(message.contains("b (components/b): b is broken"));
        assert!(!message.contains("components/a"));
        assert!(!message.contains("components/c"));
        assert_eq!(failed_names(result), vec!["b"]);
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_all_failures_collected_in_both_modes() {
        let names = ["m0", "m1", "m2", "m3", "m4", "m5", "m6", "m7", "m8", "m9"];
        let mods = modules(&names);
        let failing = ["m1", "m4", "m5", "m9"];
        let op = |m: &ModuleDescriptor, _: &mut (dyn Write + Send), _: &mut (dyn Write + Send)| -> anyhow::Result<()> {
            if failing.contains(&m.name.as_str()) {
                anyhow::bail!("failed on purpose");
            }
            Ok(())
        };

        for policy in [RunPolicy::sequential(), RunPolicy::parallel(Some(3))] {
            let result = run_on_modules(&mods, &policy, &quiet_mux(&mods), &op);
            assert_eq!(failed_names(result), failing.to_vec(), "policy {:?}", policy);
        }
    }

    #[test]
    fn test_parallel_respects_job_limit() {
        let names: Vec<String> = (0..12).map(|i| format!("mod{}", i)).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mods = modules(&name_refs);

        for limit in [1usize, 2, 3] {
            let active = AtomicUsize::new(0);
            let peak = AtomicUsize::new(0);
            let calls = AtomicUsize::new(0);
            let op = |_: &ModuleDescriptor, _: &mut (dyn Write + Send), _: &mut (dyn Write + Send)| -> anyhow::Result<()> {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(15));
                active.fetch_sub(1, Ordering::SeqCst);
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            };

            run_on_modules(&mods, &RunPolicy::parallel(Some(limit)), &quiet_mux(&mods), &op).unwrap();
            assert_eq!(peak.load(Ordering::SeqCst), limit);
            assert_eq!(calls.load(Ordering::SeqCst), 12);
        }
    }

    #[test]
    fn test_panicking_module_is_collected() {
        let mods = modules(&["ok", "boom", "fine"]);
        let calls = AtomicUsize::new(0);
        let op = |m: &ModuleDescriptor, _: &mut (dyn Write + Send), _: &mut (dyn Write + Send)| -> anyhow::Result<()> {
            calls.fetch_add(1, Ordering::SeqCst);
            if m.name == "boom" {
                panic!("kaboom");
            }
            Ok(())
        };

        let result = run_on_modules(&mods, &RunPolicy::parallel(Some(2)), &quiet_mux(&mods), &op);
        let message = result.as_ref().unwrap_err().to_string();
        assert!(message.contains("operation panicked: kaboom"));
        assert_eq!(failed_names(result), vec!["boom"]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_output_is_attributed_and_residual_flushed() {
        let mods = modules(&["net", "storage"]);
        let out = Capture::default();
        let err = Capture::default();
        let mux = Multiplexer::new(out.clone(), err.clone(), &mods, false);
        let op = |m: &ModuleDescriptor, out: &mut (dyn Write + Send), err: &mut (dyn Write + Send)| -> anyhow::Result<()> {
            for i in 0..50 {
                writeln!(out, "{} says {}", m.name, i)?;
            }
            write!(err, "{} warning without newline", m.name)?;
            Ok(())
        };

        run_on_modules(&mods, &RunPolicy::parallel(Some(2)), &mux, &op).unwrap();

        let stdout = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert_eq!(stdout.lines().count(), 100);
        for line in stdout.lines() {
            let (label, message) = line.split_once(" | ").unwrap();
            let name = label.split_whitespace().next().unwrap();
            assert!(message.starts_with(&format!("{} says ", name)), "{}", line);
        }

        let stderr = String::from_utf8(err.0.lock().unwrap().clone()).unwrap();
        assert_eq!(stderr.lines().count(), 2);
        assert!(stderr.contains("| net warning without newline\n"));
        assert!(stderr.contains("| storage warning without newline\n"));
    }
}

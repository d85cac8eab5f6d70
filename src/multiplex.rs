//! # Output Multiplexing
//!
//! Several modules may run at once, all writing to the same terminal. The
//! `Multiplexer` hands every module a pair of `PrefixWriter`s (primary and
//! diagnostic). Each writer buffers bytes until a newline arrives and then
//! emits the whole line, prefixed, in one `write_all` while holding the
//! destination's lock. Lines from different modules can therefore interleave
//! with each other but never inside one another.
//!
//! A prefixed line looks like:
//!
//! ```text
//!     vpc 14:03:27.412 | Success! The configuration is valid.
//! network 14:03:27.415 | Initializing the backend...
//! ```
//!
//! The module name is colored from a fixed palette keyed by the module's
//! position in the run and padded to the longest name so the separators
//! line up.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::Local;
use console::{Color, Style};

use crate::module::ModuleDescriptor;

/// Colors cycled through by module position.
pub const PALETTE: &[Color] = &[
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
];

const SEPARATOR: &str = " | ";

/// A destination shared by every writer of a run.
pub type SharedSink = Arc<Mutex<Box<dyn Write + Send>>>;

fn shared(sink: impl Write + Send + 'static) -> SharedSink {
    Arc::new(Mutex::new(Box::new(sink)))
}

/// Hands out per-module writers for one run.
#[derive(Clone)]
pub struct Multiplexer {
    out: SharedSink,
    err: SharedSink,
    width: usize,
    use_color: bool,
}

impl Multiplexer {
    /// Multiplex onto arbitrary sinks.
    ///
    /// `modules` is the full module list of the run; it only determines the
    /// name column width.
    pub fn new(
        out: impl Write + Send + 'static,
        err: impl Write + Send + 'static,
        modules: &[ModuleDescriptor],
        use_color: bool,
    ) -> Self {
        Self::with_sinks(shared(out), shared(err), modules, use_color)
    }

    /// Multiplex onto already shared sinks, e.g. to inspect them in tests.
    pub fn with_sinks(
        out: SharedSink,
        err: SharedSink,
        modules: &[ModuleDescriptor],
        use_color: bool,
    ) -> Self {
        let width = modules
            .iter()
            .map(|m| m.name.chars().count())
            .max()
            .unwrap_or(0);
        Self {
            out,
            err,
            width,
            use_color,
        }
    }

    /// Multiplex onto the process's stdout and stderr.
    pub fn stdio(modules: &[ModuleDescriptor], use_color: bool) -> Self {
        Self::new(io::stdout(), io::stderr(), modules, use_color)
    }

    /// The primary and diagnostic writers for the module at `index`.
    pub fn writers(&self, index: usize, module: &ModuleDescriptor) -> (PrefixWriter, PrefixWriter) {
        let label = self.label(index, &module.name);
        (
            PrefixWriter::new(self.out.clone(), label.clone()),
            PrefixWriter::new(self.err.clone(), label),
        )
    }

    fn label(&self, index: usize, name: &str) -> String {
        let padded = format!("{:>width$}", name, width = self.width);
        if self.use_color {
            let color = PALETTE[index % PALETTE.len()];
            Style::new()
                .fg(color)
                .bold()
                .force_styling(true)
                .apply_to(padded)
                .to_string()
        } else {
            padded
        }
    }
}

/// Line-buffering writer that prefixes every line with its module label.
///
/// Dropping the writer emits any unterminated tail.
pub struct PrefixWriter {
    sink: SharedSink,
    label: String,
    buf: Vec<u8>,
}

impl PrefixWriter {
    fn new(sink: SharedSink, label: String) -> Self {
        Self {
            sink,
            label,
            buf: Vec::new(),
        }
    }

    /// Emit buffered content that has no trailing newline yet.
    ///
    /// The tail is written as its own line so the next writer starts on a
    /// fresh one.
    pub fn flush_residual(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let tail = std::mem::take(&mut self.buf);
        self.emit(&tail)
    }

    fn emit(&self, line: &[u8]) -> io::Result<()> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let timestamp = Local::now().format("%H:%M:%S%.3f");
        let mut frame = format!("{} {}{}", self.label, timestamp, SEPARATOR).into_bytes();
        frame.extend_from_slice(line);
        frame.push(b'\n');

        let mut sink = self
            .sink
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output sink lock poisoned"))?;
        sink.write_all(&frame)
    }
}

impl Write for PrefixWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            self.emit(&line[..pos])?;
        }
        Ok(data.len())
    }

    /// Flushes the destination; partial lines stay buffered.
    fn flush(&mut self) -> io::Result<()> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output sink lock poisoned"))?;
        sink.flush()
    }
}

impl Drop for PrefixWriter {
    fn drop(&mut self) {
        let _ = self.flush_residual();
    }
}

//! Diagnostic output for the wrapper
//!
//! User-facing diagnostics are single lines on stderr prefixed with the
//! wrapper's program name, e.g. `psqlw: Cannot detect username to login`.
//! They go through the [`Logger`] trait so the resolver and launcher can be
//! exercised with a [`MemoryLogger`] in tests.
//!
//! Developer diagnostics (which source won, which provider was picked) are
//! `tracing` events and only show up when `PGW_DEBUG` is enabled.

use std::cell::RefCell;
use std::io::Write;
use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Program name used when argv[0] is missing or unusable
pub const DEFAULT_PROGRAM_NAME: &str = "psqlw";

/// How serious a diagnostic line is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Non-fatal, the invocation goes on
    Warning,
    /// Fatal to the invocation
    Error,
}

/// Sink for user-facing diagnostic lines
pub trait Logger {
    fn log(&self, severity: Severity, message: &str);

    fn warn(&self, message: &str) {
        self.log(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }
}

/// Writes `<prefix>: <message>` lines to stderr
#[derive(Debug, Clone)]
pub struct StderrLogger {
    prefix: String,
}

impl StderrLogger {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Logger prefixed with the file name of the invocation path
    pub fn for_invocation(invoked_path: &str) -> Self {
        Self::new(program_name(invoked_path))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Logger for StderrLogger {
    fn log(&self, _severity: Severity, message: &str) {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        // Nowhere left to report a failing stderr
        let _ = writeln!(handle, "{}: {}", self.prefix, message);
    }
}

/// Keeps every line in memory, for tests
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: RefCell<Vec<(Severity, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Severity, String)> {
        self.lines.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines.borrow().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.lines
            .borrow()
            .iter()
            .filter(|(s, _)| *s == severity)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, severity: Severity, message: &str) {
        self.lines.borrow_mut().push((severity, message.to_string()));
    }
}

/// File name component of the invocation path
pub fn program_name(invoked_path: &str) -> String {
    Path::new(invoked_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_string())
}

/// Install the tracing subscriber for developer diagnostics.
///
/// `RUST_LOG` refines the filter; without it everything this crate emits at
/// debug level is shown. Output goes to stderr so stdout stays untouched for
/// the wrapped client.
pub fn init_debug_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("psql_wrapper=debug,psqlw=debug"));

    // A subscriber installed earlier (tests) is fine to keep
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

//! Child process execution
//!
//! Both child processes the wrapper starts (the password provider and psql
//! itself) go through [`ProcessRunner`], so tests can substitute a fake that
//! records invocations instead of spawning anything.

use std::ffi::{OsStr, OsString};
use std::io;
use std::process::{Command, ExitStatus, Stdio};

use crate::environment::Environment;

/// How the child's standard streams are wired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// stdin, stdout and stderr are the wrapper's own
    Inherit,
    /// stdout is captured, stdin and stderr are the wrapper's own
    CaptureStdout,
}

/// A single child process to run to completion
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub program: &'a OsStr,
    pub args: &'a [OsString],
    /// Full child environment, or `None` to inherit the wrapper's
    pub env: Option<&'a Environment>,
    pub stdio: StdioMode,
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
}

impl Termination {
    /// Exit code to report, using the shell convention of 128 + signal
    pub fn exit_code(self) -> i32 {
        match self {
            Termination::Exited(code) => code,
            Termination::Signaled(signal) => 128 + signal,
        }
    }

    pub fn success(self) -> bool {
        self == Termination::Exited(0)
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exit status: {}", code),
            Termination::Signaled(signal) => write!(f, "signal: {}", signal),
        }
    }
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Termination::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Termination::Signaled(signal);
            }
        }
        Termination::Exited(1)
    }
}

/// Result of a finished child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub termination: Termination,
    /// Captured stdout, empty unless [`StdioMode::CaptureStdout`] was used
    pub stdout: Vec<u8>,
}

impl Completion {
    pub fn exited(code: i32) -> Self {
        Self {
            termination: Termination::Exited(code),
            stdout: Vec::new(),
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<Vec<u8>>) -> Self {
        self.stdout = stdout.into();
        self
    }
}

/// Runs a child process and blocks until it exits
pub trait ProcessRunner {
    /// `Err` means the process could not be started at all
    fn run(&self, invocation: &Invocation<'_>) -> io::Result<Completion>;
}

/// Runs real processes with `std::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation<'_>) -> io::Result<Completion> {
        let mut command = Command::new(invocation.program);
        command.args(invocation.args);
        if let Some(env) = invocation.env {
            command.env_clear().envs(env.iter());
        }

        match invocation.stdio {
            StdioMode::Inherit => {
                let mut child = command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .spawn()?;
                // Terminal interrupts belong to the interactive child
                let _guard = IgnoreInterrupts::install();
                let status = child.wait()?;
                Ok(Completion {
                    termination: status.into(),
                    stdout: Vec::new(),
                })
            }
            StdioMode::CaptureStdout => {
                let output = command
                    .stdin(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .output()?;
                Ok(Completion {
                    termination: output.status.into(),
                    stdout: output.stdout,
                })
            }
        }
    }
}

/// Ignores SIGINT and SIGQUIT until dropped, then restores the previous
/// dispositions
#[cfg(unix)]
struct IgnoreInterrupts {
    previous: [(libc::c_int, libc::sighandler_t); 2],
}

#[cfg(unix)]
impl IgnoreInterrupts {
    fn install() -> Self {
        let previous = [libc::SIGINT, libc::SIGQUIT].map(|signal| {
            // SAFETY: installing SIG_IGN has no handler code to run
            let old = unsafe { libc::signal(signal, libc::SIG_IGN) };
            (signal, old)
        });
        Self { previous }
    }
}

#[cfg(unix)]
impl Drop for IgnoreInterrupts {
    fn drop(&mut self) {
        for (signal, old) in self.previous {
            if old != libc::SIG_ERR {
                // SAFETY: restores whatever disposition was in place before
                unsafe {
                    libc::signal(signal, old);
                }
            }
        }
    }
}

#[cfg(not(unix))]
struct IgnoreInterrupts;

#[cfg(not(unix))]
impl IgnoreInterrupts {
    fn install() -> Self {
        // Console control events are not intercepted on this platform
        IgnoreInterrupts
    }
}

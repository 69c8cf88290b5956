//! Password provider lookup and invocation
//!
//! A password provider is any executable that takes a username as its only
//! argument and prints the password on stdout:
//!
//! ```text
//! $ password_provider alice
//! s3cr3t
//! ```
//!
//! It is found in this order:
//! 1. `PGW_PASSWORD_PROVIDER`, used as given (a bare name goes through PATH)
//! 2. `password_provider` in the directory the wrapper was started from, if
//!    such a file exists

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{Config, DEFAULT_PASSWORD_PROVIDER};
use crate::error::{Result, WrapperError};
use crate::process_runner::{Invocation, ProcessRunner, StdioMode};

/// A resolved password provider executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordProvider {
    program: PathBuf,
}

impl PasswordProvider {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Name used in diagnostics
    pub fn display_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Ask the provider for `username`'s password.
    ///
    /// Trailing newlines are removed and a result made only of whitespace
    /// counts as no password; anything else is returned exactly as printed.
    pub fn fetch(&self, runner: &dyn ProcessRunner, username: &str) -> Result<String> {
        let args = [OsString::from(username)];
        debug!(provider = %self.display_name(), "invoking password provider");

        let completion = runner
            .run(&Invocation {
                program: self.program.as_os_str(),
                args: &args,
                env: None,
                stdio: StdioMode::CaptureStdout,
            })
            .map_err(|source| WrapperError::ProviderInvocation {
                provider: self.display_name(),
                source,
            })?;

        if !completion.termination.success() {
            return Err(WrapperError::ProviderFailed {
                provider: self.display_name(),
                status: completion.termination.to_string(),
            });
        }

        let output =
            String::from_utf8(completion.stdout).map_err(|_| WrapperError::ProviderOutput {
                provider: self.display_name(),
            })?;

        Ok(strip_trailing_newlines(&output).to_string())
    }
}

/// Drop trailing `\n` characters; whitespace-only output becomes empty
pub fn strip_trailing_newlines(output: &str) -> &str {
    let stripped = output.trim_end_matches('\n');
    if stripped.trim().is_empty() {
        ""
    } else {
        stripped
    }
}

/// Find the password provider for this invocation
pub fn locate(config: &Config, invoked_path: &Path) -> Option<PasswordProvider> {
    if let Some(ref provider) = config.password_provider {
        debug!(provider = %provider, "password provider from environment");
        return Some(PasswordProvider::new(provider));
    }

    let candidate = wrapper_directory(invoked_path)?.join(DEFAULT_PASSWORD_PROVIDER);
    if candidate.is_file() {
        debug!(provider = %candidate.display(), "password provider next to wrapper");
        Some(PasswordProvider::new(candidate))
    } else {
        debug!(candidate = %candidate.display(), "no password provider next to wrapper");
        None
    }
}

/// Directory holding the wrapper binary.
///
/// When the wrapper was found through PATH its invocation path is a bare
/// name, so the running executable is asked instead.
pub fn wrapper_directory(invoked_path: &Path) -> Option<PathBuf> {
    match invoked_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => Some(dir.to_path_buf()),
        _ => env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::io;

    use crate::process_runner::{Completion, Termination};

    struct ScriptedRunner {
        result: RefCell<Option<io::Result<Completion>>>,
        seen: RefCell<Vec<(PathBuf, Vec<OsString>, StdioMode)>>,
    }

    impl ScriptedRunner {
        fn new(result: io::Result<Completion>) -> Self {
            Self {
                result: RefCell::new(Some(result)),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn run(&self, invocation: &Invocation<'_>) -> io::Result<Completion> {
            self.seen.borrow_mut().push((
                PathBuf::from(invocation.program),
                invocation.args.to_vec(),
                invocation.stdio,
            ));
            self.result
                .borrow_mut()
                .take()
                .unwrap_or_else(|| Ok(Completion::exited(0)))
        }
    }

    #[test]
    fn test_strip_trailing_newlines() {
        assert_eq!(strip_trailing_newlines("secret\n"), "secret");
        assert_eq!(strip_trailing_newlines("secret\n\n\n"), "secret");
        assert_eq!(strip_trailing_newlines("secret"), "secret");
    }

    #[test]
    fn test_strip_keeps_carriage_return() {
        assert_eq!(strip_trailing_newlines("secret\r\n"), "secret\r");
        assert_eq!(strip_trailing_newlines("pw\r"), "pw\r");
    }

    #[test]
    fn test_strip_keeps_inner_and_leading_whitespace() {
        assert_eq!(strip_trailing_newlines("  pass word\n"), "  pass word");
        assert_eq!(strip_trailing_newlines("pass\nword\n"), "pass\nword");
        assert_eq!(strip_trailing_newlines("secret \n"), "secret ");
    }

    #[test]
    fn test_strip_whitespace_only_is_empty() {
        assert_eq!(strip_trailing_newlines(""), "");
        assert_eq!(strip_trailing_newlines("\n\n"), "");
        assert_eq!(strip_trailing_newlines("  \t\n"), "");
    }

    #[test]
    fn test_fetch_passes_username_and_captures() {
        let runner = ScriptedRunner::new(Ok(Completion::exited(0).with_stdout("hunter2\n")));
        let provider = PasswordProvider::new("/opt/bin/provider");

        let password = provider.fetch(&runner, "alice").unwrap();

        assert_eq!(password, "hunter2");
        let seen = runner.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, PathBuf::from("/opt/bin/provider"));
        assert_eq!(seen[0].1, vec![OsString::from("alice")]);
        assert_eq!(seen[0].2, StdioMode::CaptureStdout);
    }

    #[test]
    fn test_fetch_non_zero_exit() {
        let runner = ScriptedRunner::new(Ok(Completion::exited(3)));
        let provider = PasswordProvider::new("vault-pass");

        let err = provider.fetch(&runner, "alice").unwrap_err();

        assert!(matches!(err, WrapperError::ProviderFailed { .. }));
        assert!(err.to_string().contains("\"vault-pass\""));
    }

    #[test]
    fn test_fetch_killed_provider() {
        let runner = ScriptedRunner::new(Ok(Completion {
            termination: Termination::Signaled(9),
            stdout: b"partial".to_vec(),
        }));
        let err = PasswordProvider::new("vault-pass")
            .fetch(&runner, "alice")
            .unwrap_err();
        assert!(matches!(err, WrapperError::ProviderFailed { .. }));
    }

    #[test]
    fn test_fetch_cannot_start() {
        let runner = ScriptedRunner::new(Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "Permission denied",
        )));
        let err = PasswordProvider::new("/tmp/provider")
            .fetch(&runner, "alice")
            .unwrap_err();
        assert!(matches!(err, WrapperError::ProviderInvocation { .. }));
    }

    #[test]
    fn test_fetch_rejects_binary_output() {
        let runner =
            ScriptedRunner::new(Ok(Completion::exited(0).with_stdout(vec![0xffu8, 0xfe])));
        let err = PasswordProvider::new("p").fetch(&runner, "alice").unwrap_err();
        assert!(matches!(err, WrapperError::ProviderOutput { .. }));
    }

    #[test]
    fn test_locate_prefers_override() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_PASSWORD_PROVIDER), "#!/bin/sh\n").unwrap();
        let config = Config {
            password_provider: Some("my-provider".to_string()),
            ..Config::default()
        };

        let provider = locate(&config, &dir.path().join("psqlw")).unwrap();

        assert_eq!(provider.program(), Path::new("my-provider"));
    }

    #[test]
    fn test_locate_next_to_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let expected = dir.path().join(DEFAULT_PASSWORD_PROVIDER);
        fs::write(&expected, "#!/bin/sh\n").unwrap();

        let provider = locate(&Config::default(), &dir.path().join("psqlw")).unwrap();

        assert_eq!(provider.program(), expected.as_path());
    }

    #[test]
    fn test_locate_nothing_configured() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(locate(&Config::default(), &dir.path().join("psqlw")), None);
    }

    #[test]
    fn test_locate_ignores_directory_named_like_provider() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(DEFAULT_PASSWORD_PROVIDER)).unwrap();
        assert_eq!(locate(&Config::default(), &dir.path().join("psqlw")), None);
    }

    #[test]
    fn test_wrapper_directory() {
        assert_eq!(
            wrapper_directory(Path::new("/usr/local/bin/psqlw")),
            Some(PathBuf::from("/usr/local/bin"))
        );
        assert_eq!(
            wrapper_directory(Path::new("./psqlw")),
            Some(PathBuf::from("."))
        );
        // Bare name: falls back to the running executable's directory
        assert!(wrapper_directory(Path::new("psqlw")).is_some());
    }
}

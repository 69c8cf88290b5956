//! Launcher for the wrapped client
//!
//! Builds the child environment (resolving the username and asking the
//! password provider for the password), then runs the client with the
//! unchanged argument vector and the wrapper's own stdio, and hands back the
//! client's exit code.
//!
//! Every failure ends here as one diagnostic line and an exit code:
//! - no provider for a resolved username, or a failing provider: 1, and the
//!   client is never started
//! - client cannot be started: 1
//! - client killed by a signal: 128 + signal
//! - client exited: its own exit code

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use tracing::debug;

use crate::config::{Config, PASSWORD_VAR};
use crate::environment::Environment;
use crate::error::{Result, WrapperError};
use crate::logger::{Logger, StderrLogger};
use crate::password_provider;
use crate::process_runner::{Invocation, ProcessRunner, StdioMode, SystemRunner, Termination};
use crate::username_resolver::UsernameResolver;

/// Exit code for failures of the wrapper itself
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Runs the wrapped client on behalf of one invocation
pub struct Launcher<'a> {
    config: &'a Config,
    logger: &'a dyn Logger,
    runner: &'a dyn ProcessRunner,
    invoked_path: PathBuf,
}

impl<'a> Launcher<'a> {
    pub fn new(
        config: &'a Config,
        logger: &'a dyn Logger,
        runner: &'a dyn ProcessRunner,
        invoked_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            logger,
            runner,
            invoked_path: invoked_path.into(),
        }
    }

    /// Run `command` with `args` and return the exit code to exit with
    pub fn launch(&self, command: &str, args: &[OsString]) -> i32 {
        let env = match self.build_environment(args) {
            Ok(env) => env,
            Err(e) => {
                self.logger.error(&e.to_string());
                return FAILURE_EXIT_CODE;
            }
        };

        match self.run_command(command, args, &env) {
            Ok(code) => code,
            Err(e) => {
                self.logger.error(&e.to_string());
                match e {
                    WrapperError::Terminated { signal, .. } => {
                        Termination::Signaled(signal).exit_code()
                    }
                    _ => FAILURE_EXIT_CODE,
                }
            }
        }
    }

    /// Copy of the current environment, plus the password when one is found.
    ///
    /// Arguments that are not valid UTF-8 are scanned lossily; the client
    /// still receives them byte for byte.
    pub fn build_environment(&self, args: &[OsString]) -> Result<Environment> {
        let mut env = Environment::capture();

        let scanned: Vec<String> = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let resolver = UsernameResolver::new(self.config, self.logger);
        let Some(username) = resolver.resolve(&scanned) else {
            self.logger.warn("Cannot detect username to login");
            return Ok(env);
        };

        let password = self.retrieve_password(&username)?;
        if password.is_empty() {
            debug!("password provider returned nothing, not setting {}", PASSWORD_VAR);
        } else {
            env.push(PASSWORD_VAR, password);
        }

        Ok(env)
    }

    fn retrieve_password(&self, username: &str) -> Result<String> {
        let provider = password_provider::locate(self.config, &self.invoked_path)
            .ok_or(WrapperError::ProviderNotConfigured)?;
        provider.fetch(self.runner, username)
    }

    fn run_command(&self, command: &str, args: &[OsString], env: &Environment) -> Result<i32> {
        debug!(command, args = args.len(), "starting client");

        let completion = self
            .runner
            .run(&Invocation {
                program: OsStr::new(command),
                args,
                env: Some(env),
                stdio: StdioMode::Inherit,
            })
            .map_err(|source| WrapperError::Launch {
                command: command.to_string(),
                source,
            })?;

        match completion.termination {
            Termination::Exited(code) => Ok(code),
            Termination::Signaled(signal) => Err(WrapperError::Terminated {
                command: command.to_string(),
                signal,
            }),
        }
    }
}

/// Run `target_command` for a wrapper started as `invoked_name`, with the
/// process environment for configuration, stderr for diagnostics and real
/// child processes.
pub fn launch(invoked_name: &str, target_command: &str, args: &[OsString]) -> i32 {
    let config = Config::from_env();
    let logger = StderrLogger::for_invocation(invoked_name);
    Launcher::new(&config, &logger, &SystemRunner, invoked_name).launch(target_command, args)
}

//! psql-wrapper library
//!
//! Runs psql with `PGPASSWORD` taken from an external password provider,
//! for whichever user psql is about to log in as.

pub mod config;
pub mod conninfo;
pub mod environment;
pub mod error;
pub mod launcher;
pub mod logger;
pub mod options;
pub mod password_provider;
pub mod process_runner;
pub mod username_resolver;

// Re-export commonly used items
pub use config::{
    Config, CLIENT_VAR, DEFAULT_CLIENT, DEFAULT_PASSWORD_PROVIDER, DEFAULT_USER_VAR,
    PASSWORD_PROVIDER_VAR, PASSWORD_VAR,
};
pub use conninfo::{
    is_connection_uri, username_from_connection_spec, username_from_keywords, username_from_uri,
};
pub use environment::Environment;
pub use error::{Result, WrapperError};
pub use launcher::{launch, Launcher, FAILURE_EXIT_CODE};
pub use logger::{
    init_debug_tracing, program_name, Logger, MemoryLogger, Severity, StderrLogger,
};
pub use options::{long_option_takes_value, short_option_takes_value};
pub use password_provider::{locate as locate_password_provider, PasswordProvider};
pub use process_runner::{
    Completion, Invocation, ProcessRunner, StdioMode, SystemRunner, Termination,
};
pub use username_resolver::{scan_arguments, ArgumentScan, UsernameResolver};

//! Configuration from environment variables
//!
//! The wrapper defines no command-line options of its own, so everything it
//! needs to know about itself comes from the environment. The snapshot is
//! taken once at start-up and handed to the components by reference.

use std::env;

/// Default username when none is given on the command line
pub const DEFAULT_USER_VAR: &str = "PGUSER";

/// Password variable injected into the child environment
pub const PASSWORD_VAR: &str = "PGPASSWORD";

/// Explicit password provider override
pub const PASSWORD_PROVIDER_VAR: &str = "PGW_PASSWORD_PROVIDER";

/// Client to run in place of psql
pub const CLIENT_VAR: &str = "PGW_CLIENT";

/// Enables developer diagnostics on stderr
pub const DEBUG_VAR: &str = "PGW_DEBUG";

/// Client run when PGW_CLIENT is not set
pub const DEFAULT_CLIENT: &str = "psql";

/// Provider executable looked up next to the wrapper binary
pub const DEFAULT_PASSWORD_PROVIDER: &str = "password_provider";

/// Configuration from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Client executable (PGW_CLIENT, default psql)
    pub client: String,
    /// Fallback username (PGUSER)
    pub default_user: Option<String>,
    /// Password provider override (PGW_PASSWORD_PROVIDER)
    pub password_provider: Option<String>,
    /// Developer diagnostics (PGW_DEBUG)
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            client: env_string(CLIENT_VAR).unwrap_or_else(|| DEFAULT_CLIENT.to_string()),
            default_user: env_string(DEFAULT_USER_VAR),
            password_provider: env_string(PASSWORD_PROVIDER_VAR),
            debug: env_bool(DEBUG_VAR),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client: DEFAULT_CLIENT.to_string(),
            default_user: None,
            password_provider: None,
            debug: false,
        }
    }
}

/// Read a variable, treating unset, empty and non-UTF-8 values alike
fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_bool(name: &str) -> bool {
    env::var(name).is_ok_and(|v| v == "1" || v == "true")
}

//! Errors raised while preparing or launching the wrapped client
//!
//! Messages are printed verbatim as the single diagnostic line of a failed
//! invocation, so none of them may carry the password.

use std::io;

use thiserror::Error;

use crate::config::PASSWORD_PROVIDER_VAR;

#[derive(Debug, Error)]
pub enum WrapperError {
    /// A username was found but there is nothing to ask for its password
    #[error("environment variable {} is undefined", PASSWORD_PROVIDER_VAR)]
    ProviderNotConfigured,

    /// The provider ran and reported failure
    #[error("password provider \"{provider}\" exited with an error: {status}")]
    ProviderFailed { provider: String, status: String },

    /// The provider could not be started at all
    #[error("failed to invoke the password provider \"{provider}\": {source}")]
    ProviderInvocation {
        provider: String,
        #[source]
        source: io::Error,
    },

    /// The provider printed something that is not text
    #[error("password provider \"{provider}\" printed a password that is not valid UTF-8")]
    ProviderOutput { provider: String },

    /// The target client could not be started
    #[error("failed to run {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The target client was killed by a signal
    #[error("{command} was terminated by signal {signal}")]
    Terminated { command: String, signal: i32 },

    /// Malformed connection URI
    #[error("invalid connection URI: {0}")]
    InvalidUri(String),
}

pub type Result<T> = std::result::Result<T, WrapperError>;

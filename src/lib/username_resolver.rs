//! Username resolution for psql command lines
//!
//! Works out which role psql is going to log in as, using the same sources
//! psql itself consults:
//!
//! 1. `-U name`, `-Uname`, `--username name`, `--username=name`
//! 2. trailing positional arguments, which override the options:
//!    - one argument: a connection URI or keyword/value string
//!    - two arguments: `dbname username`
//! 3. the `PGUSER` environment variable, when nothing else gave a name

use tracing::debug;

use crate::config::Config;
use crate::conninfo::username_from_connection_spec;
use crate::logger::Logger;
use crate::options::{
    long_option_takes_value, short_option_takes_value, USERNAME_LONG_OPTION,
    USERNAME_SHORT_OPTION,
};

/// Outcome of the option scan over the argument vector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentScan {
    /// Value of the last username option seen, possibly empty
    pub option_username: Option<String>,
    /// Arguments that are neither options nor option values, in order
    pub positional: Vec<String>,
}

/// Resolves the login username from a psql argument vector
pub struct UsernameResolver<'a> {
    config: &'a Config,
    logger: &'a dyn Logger,
}

impl<'a> UsernameResolver<'a> {
    pub fn new(config: &'a Config, logger: &'a dyn Logger) -> Self {
        Self { config, logger }
    }

    /// Username psql would authenticate with, if any can be determined
    pub fn resolve(&self, args: &[String]) -> Option<String> {
        let scan = scan_arguments(args);

        let mut username = scan.option_username.filter(|u| !u.is_empty());
        if username.is_some() {
            debug!(source = "option", "username found in options");
        }

        if let Some(found) = self.username_from_positional(&scan.positional) {
            username = Some(found);
        }

        if username.is_none() {
            username = self.config.default_user.clone();
            if username.is_some() {
                debug!(source = "environment", "falling back to PGUSER");
            }
        }

        debug!(username = ?username, "username resolution finished");
        username
    }

    fn username_from_positional(&self, positional: &[String]) -> Option<String> {
        let found = match positional {
            [] => None,
            [spec] => self.username_from_connection_arg(spec),
            [_, user] => {
                debug!(source = "positional", "username given after dbname");
                Some(user.clone())
            }
            _ => {
                self.logger.warn(&format!(
                    "Too many positional arguments: {}",
                    positional.len()
                ));
                None
            }
        };
        found.filter(|u| !u.is_empty())
    }

    fn username_from_connection_arg(&self, spec: &str) -> Option<String> {
        match username_from_connection_spec(spec) {
            Ok(found) => {
                if found.is_some() {
                    debug!(source = "connection", "username found in connection specifier");
                }
                found
            }
            Err(e) => {
                self.logger.error(&e.to_string());
                None
            }
        }
    }
}

/// Walk the argument vector the way psql's getopt does.
///
/// Option values are consumed even for options that have nothing to do with
/// the username, so every remaining token lines up with what psql sees as a
/// positional argument.
pub fn scan_arguments(args: &[String]) -> ArgumentScan {
    let mut scan = ArgumentScan::default();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(long) = arg.strip_prefix("--") {
            if long.is_empty() {
                i += 1;
                continue;
            }

            let (name, value) = match long.split_once('=') {
                Some((name, inline)) => (name, Some(inline.to_string())),
                None if long_option_takes_value(long) => {
                    let next = args.get(i + 1).cloned();
                    if next.is_some() {
                        i += 1;
                    }
                    (long, next)
                }
                None => (long, None),
            };

            if name == USERNAME_LONG_OPTION {
                scan.option_username = Some(value.unwrap_or_default());
            }
        } else if let Some(short) = arg.strip_prefix('-') {
            let mut chars = short.chars();
            let Some(letter) = chars.next() else {
                i += 1;
                continue;
            };

            let inline = chars.as_str();
            let value = if !inline.is_empty() {
                Some(inline.to_string())
            } else if short_option_takes_value(letter) {
                let next = args.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            } else {
                None
            };

            if letter == USERNAME_SHORT_OPTION {
                scan.option_username = Some(value.unwrap_or_default());
            }
        } else {
            scan.positional.push(arg.clone());
        }

        i += 1;
    }

    scan
}

//! psqlw CLI
//!
//! Drop-in replacement for psql: takes exactly psql's arguments, works out
//! the login user, fetches its password from the password provider and runs
//! psql with `PGPASSWORD` set in psql's environment only.
//!
//! Environment:
//!   PGUSER                  Username when none is given on the command line
//!   PGW_PASSWORD_PROVIDER   Password provider executable
//!   PGW_CLIENT              Client to run instead of `psql`
//!   PGW_DEBUG               Print resolution details to stderr (1/true)

use std::env;
use std::ffi::OsString;
use std::process;

use psql_wrapper::{init_debug_tracing, launch, logger::DEFAULT_PROGRAM_NAME, Config};

fn main() {
    let mut argv = env::args_os();
    let invoked = argv
        .next()
        .map(|arg0| arg0.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_string());

    let config = Config::from_env();
    if config.debug {
        init_debug_tracing();
    }

    // Forwarded to psql byte for byte, UTF-8 or not
    let args: Vec<OsString> = argv.collect();

    process::exit(launch(&invoked, &config.client, &args));
}

//! Command line front end
//!
//! Every command spawns a [`crate::session::SessionHandle`] and talks to the
//! open project only through it.

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands};
pub use router::execute_command;

/// Map the `-v` count to a tracing filter
pub fn get_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,walkdir=debug", // -vvv shows everything including dependencies
    }
}

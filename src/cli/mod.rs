//! Command-line interface
//!
//! - select: choose a routing plan for a JSON request on stdin
//! - settings: print a partition scheme's settings schema

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{run, run_command, select, settings, SelectRequest};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};

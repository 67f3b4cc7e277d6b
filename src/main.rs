//! polystore CLI entry point
//!
//! Parses arguments, runs one command, prints the error to stderr and
//! exits non-zero on failure. All logic lives in the `cli` module.

use polystore::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

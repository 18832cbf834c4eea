//! planenum CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, reports errors as a JSON
//! error response and exits non-zero on failure.

use planenum::cli;

fn main() {
    if let Err(e) = cli::run() {
        if cli::write_error(e.code_str(), e.message()).is_err() {
            eprintln!("{}", e);
        }
        std::process::exit(1);
    }
}

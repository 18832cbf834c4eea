//! CLI module for planenum
//!
//! Provides command-line interface for:
//! - plan: enumerate and print the tagged plan
//! - explain: enumerate and print the memo and assignments

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, RequestArgs};
pub use commands::{
    explain, explain_request, load_config, plan, plan_request, run, run_command, PlanRequest,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};

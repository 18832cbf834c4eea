//! CLI argument definitions using clap
//!
//! Commands:
//! - planenum plan [--input <path>] [--config <path>] [--skip-rating]
//! - planenum explain [--input <path>] [--config <path>] [--skip-rating]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// planenum - index assignment enumerator for predicate trees
#[derive(Parser, Debug)]
#[command(name = "planenum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// Request file ({"catalog": [...], "filter": {...}}); stdin when omitted
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Path to enumerator configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use relevance tags already present in the filter instead of rating indexes
    #[arg(long)]
    pub skip_rating: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Enumerate and print the tagged plan
    Plan(RequestArgs),

    /// Enumerate and print the memo and assignments
    Explain(RequestArgs),
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

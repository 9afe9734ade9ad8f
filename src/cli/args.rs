//! Defines the command-line arguments for the `calc` binary.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "calc",
    version,
    about = "Evaluate arithmetic expressions with a memoizing PEG parser."
)]
pub struct CalcArgs {
    /// Expressions to evaluate. Starts an interactive session when omitted.
    pub exprs: Vec<String>,

    /// Print one JSON object per expression instead of plain text.
    #[arg(long)]
    pub json: bool,

    /// Render parse errors as miette reports on stderr.
    #[arg(long, conflicts_with = "json")]
    pub fancy: bool,

    /// Load parse options from a JSON file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the maximum rule nesting depth.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Log level for stderr output (off, error, warn, info, debug, trace).
    /// Falls back to `RUST_LOG`.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LevelFilter>,
}

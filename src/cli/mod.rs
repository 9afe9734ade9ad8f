//! The `calc` Command-Line Interface.
//!
//! Evaluates the expressions given as arguments, or starts the REPL when
//! there are none. The process exits with status 1 if any expression fails.

use std::io::{self, Write};
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use log::LevelFilter;
use termcolor::StandardStream;
use thiserror::Error;

use crate::calculator;
use crate::config::ParseOptions;
use crate::diagnostics::{self, stdout_color_choice};
use crate::errors::{ConfigError, GrammarError};
use crate::input::Input;
use crate::repl;

pub mod args;
pub mod output;

use args::CalcArgs;
use output::Evaluation;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("calculator grammar is invalid: {0}")]
    Grammar(#[from] GrammarError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = CalcArgs::parse();
    init_logging(args.log_level);

    match execute(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the command described by `args`; `Ok(false)` means some expression
/// failed to parse.
pub fn execute(args: &CalcArgs) -> Result<bool, CliError> {
    let options = load_options(args)?;
    let calc = calculator::shared()?;

    if args.exprs.is_empty() {
        repl::run_repl(calc, options)?;
        return Ok(true);
    }

    let mut stdout = StandardStream::stdout(stdout_color_choice());
    let mut all_ok = true;
    for (index, text) in args.exprs.iter().enumerate() {
        let input = Input::new(text);
        let result = calc.parse_input(&input, options.clone());
        all_ok &= result.success;
        if args.json {
            output::write_json(&mut stdout, &Evaluation::new(text, &result))?;
        } else if args.fancy && !result.success {
            let name = format!("<arg {}>", index + 1);
            diagnostics::print_report(result.into_report(&name, &input));
        } else {
            output::write_text(&mut stdout, &input, &result)?;
        }
    }
    stdout.flush()?;
    Ok(all_ok)
}

fn load_options(args: &CalcArgs) -> Result<ParseOptions, CliError> {
    let mut options = match &args.config {
        Some(path) => ParseOptions::load(path)?,
        None => ParseOptions::default(),
    };
    if let Some(depth) = args.max_depth {
        options = options.with_max_depth(depth);
    }
    log::debug!("parse options: {options:?}");
    Ok(options)
}

fn init_logging(flag: Option<LevelFilter>) {
    let level = flag
        .or_else(|| {
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|value| LevelFilter::from_str(&value).ok())
        })
        .unwrap_or(LevelFilter::Warn);

    // A logger may already be installed when embedded in a larger host.
    let _ = simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_custom(&[])
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    );
}

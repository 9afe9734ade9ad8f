//! Calculator REPL (Read-Eval-Print Loop)
//!
//! Reads one expression per line and prints its value or its parse errors.
//! An empty line (or end of input) exits.

use std::io::{self, BufRead, Write};

use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

use crate::calculator::Calculator;
use crate::config::ParseOptions;
use crate::diagnostics::{render_errors, stdout_color_choice};
use crate::input::Input;

const BANNER: &str = "enter a math expression (+ - * / floats parentheses) or enter to exit:";

/// State that persists across evaluated lines.
pub struct ReplState<'c> {
    calculator: &'c Calculator,
    options: ParseOptions,
    line_number: usize,
}

impl<'c> ReplState<'c> {
    pub fn new(calculator: &'c Calculator, options: ParseOptions) -> Self {
        Self {
            calculator,
            options,
            line_number: 1,
        }
    }

    /// Evaluates one line, writing the result or the errors to `out`.
    /// Returns whether the line parsed.
    pub fn eval_line(&mut self, line: &str, out: &mut dyn WriteColor) -> io::Result<bool> {
        log::debug!("repl line {}: {line:?}", self.line_number);
        self.line_number += 1;

        let input = Input::new(line);
        let result = self.calculator.parse_input(&input, self.options.clone());
        if result.success {
            let value = result.root.map_or(f64::NAN, |node| node.eval());
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(out, "success")?;
            out.reset()?;
            writeln!(out, "; result = {value}")?;
        } else {
            render_errors(out, &result.errors, &input)?;
        }
        Ok(result.success)
    }

    pub fn lines_evaluated(&self) -> usize {
        self.line_number - 1
    }
}

/// REPL command results
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Continue,
    Quit,
}

/// Handle special REPL commands that start with ':'
fn handle_repl_command(command: &str, out: &mut dyn WriteColor) -> io::Result<ReplCommand> {
    match command.to_ascii_lowercase().as_str() {
        ":help" | ":h" => {
            writeln!(out, "Calculator REPL Commands:")?;
            writeln!(out, "  :help, :h     Show this help")?;
            writeln!(out, "  :quit, :q     Exit the REPL")?;
            writeln!(out)?;
            writeln!(out, "Enter an arithmetic expression to evaluate it.")?;
            writeln!(out, "An empty line exits.")?;
            Ok(ReplCommand::Continue)
        }
        ":quit" | ":q" => Ok(ReplCommand::Quit),
        _ => {
            writeln!(
                out,
                "Unknown command: {command}. Type :help for available commands."
            )?;
            Ok(ReplCommand::Continue)
        }
    }
}

/// Runs the loop over arbitrary streams.
pub fn run_repl_with(
    calculator: &Calculator,
    options: ParseOptions,
    input: &mut dyn BufRead,
    out: &mut dyn WriteColor,
) -> io::Result<()> {
    let mut state = ReplState::new(calculator, options);
    loop {
        writeln!(out)?;
        writeln!(out, "{BANNER}")?;
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if line.starts_with(':') {
            match handle_repl_command(line, out)? {
                ReplCommand::Continue => continue,
                ReplCommand::Quit => break,
            }
        }
        state.eval_line(line, out)?;
    }
    log::debug!("repl exiting after {} lines", state.lines_evaluated());
    Ok(())
}

/// Main REPL entry point, on stdin and stdout.
pub fn run_repl(calculator: &Calculator, options: ParseOptions) -> io::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = StandardStream::stdout(stdout_color_choice());
    run_repl_with(calculator, options, &mut input, &mut out)
}

// Arithmetic calculator on top of the pegloom engine.
// Usage: calc [EXPR]... [--json] [--config FILE] [--max-depth N] [--log-level LEVEL]

use std::process::ExitCode;

fn main() -> ExitCode {
    pegloom::cli::run()
}

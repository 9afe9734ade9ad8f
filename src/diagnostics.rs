//! User-facing presentation of parse errors.
//!
//! Two renderers are provided:
//! - [`render_errors`]: compact `line L, col C: message` rows with the
//!   offending source line and a caret, colored through `termcolor`;
//! - [`ParseReport`]: a `miette` diagnostic with one label per error, for
//!   hosts that already print miette reports.

use std::fmt;
use std::io::{self, IsTerminal, Write};

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use termcolor::{Color, ColorChoice, ColorSpec, NoColor, WriteColor};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use crate::errors::{ErrorKind, ParseError};
use crate::input::Input;
use crate::parser::ParseResult;

// ============================================================================
// TEXT RENDERING
// ============================================================================

/// Writes every error followed by a source excerpt pointing at it.
pub fn render_errors(
    out: &mut dyn WriteColor,
    errors: &[ParseError],
    input: &Input,
) -> io::Result<()> {
    let text = input.source_text();
    for error in errors {
        out.set_color(ColorSpec::new().set_fg(Some(error_color(error.kind))).set_bold(true))?;
        write!(out, "{}", error.kind)?;
        out.reset()?;
        writeln!(out, ": {error}")?;

        let byte = input.byte_offset(error.offset());
        let Some((line_text, prefix)) = excerpt(&text, byte) else {
            continue;
        };
        let gutter = error.line().to_string();
        out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)))?;
        write!(out, "{gutter} | ")?;
        out.reset()?;
        writeln!(out, "{line_text}")?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)))?;
        write!(out, "{:width$} | ", "", width = gutter.len())?;
        out.set_color(ColorSpec::new().set_fg(Some(error_color(error.kind))))?;
        writeln!(out, "{:pad$}^", "", pad = prefix.width())?;
        out.reset()?;
    }
    Ok(())
}

/// [`render_errors`] into a plain string.
pub fn format_errors(errors: &[ParseError], input: &Input) -> String {
    let mut out = NoColor::new(Vec::new());
    // Writing into a Vec cannot fail.
    let _ = render_errors(&mut out, errors, input);
    String::from_utf8_lossy(&out.into_inner()).into_owned()
}

/// Colors only when stdout is an interactive terminal.
pub fn stdout_color_choice() -> ColorChoice {
    if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn error_color(kind: ErrorKind) -> Color {
    match kind {
        ErrorKind::User(_) => Color::Yellow,
        _ => Color::Red,
    }
}

/// The source line containing byte offset `byte`, and the part of it before
/// `byte`.
fn excerpt(text: &str, byte: usize) -> Option<(&str, &str)> {
    if byte > text.len() {
        return None;
    }
    let start = text[..byte].rfind('\n').map_or(0, |i| i + 1);
    let end = text[byte..].find('\n').map_or(text.len(), |i| byte + i);
    let line = text[start..end].trim_end_matches('\r');
    let prefix = &text[start..byte.min(start + line.len())];
    Some((line, prefix))
}

// ============================================================================
// MIETTE REPORT
// ============================================================================

/// All errors of one parse as a single miette diagnostic.
#[derive(Debug, Error)]
#[error("{summary}")]
pub struct ParseReport {
    summary: String,
    code: &'static str,
    help: Option<String>,
    src: NamedSource<String>,
    labels: Vec<LabeledSpan>,
}

impl ParseReport {
    pub fn new(name: &str, input: &Input, errors: &[ParseError]) -> Self {
        let labels = errors
            .iter()
            .map(|error| {
                let (start, len) = input.byte_span(error.range);
                LabeledSpan::new(Some(error.message.clone()), start, len)
            })
            .collect();
        let primary = errors.first().map(|e| e.kind);
        let summary = match errors {
            [] => format!("{name} parsed without errors"),
            [only] => format!("failed to parse {name}: {}", only.kind),
            many => format!("failed to parse {name}: {} errors", many.len()),
        };
        Self {
            summary,
            code: primary.map_or("pegloom::parse", report_code),
            help: primary.and_then(report_help),
            src: NamedSource::new(name, input.source_text()),
            labels,
        }
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}

fn report_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Syntax => "pegloom::parse::syntax",
        ErrorKind::InvalidEof => "pegloom::parse::invalid_eof",
        ErrorKind::RecursionLimit => "pegloom::parse::recursion_limit",
        ErrorKind::User(_) => "pegloom::parse::user",
    }
}

fn report_help(kind: ErrorKind) -> Option<String> {
    match kind {
        ErrorKind::InvalidEof => Some("the input has trailing text the grammar does not accept".into()),
        ErrorKind::RecursionLimit => Some("raise `max_depth` in the parse options".into()),
        ErrorKind::Syntax | ErrorKind::User(_) => None,
    }
}

impl Diagnostic for ParseReport {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(self.labels.iter().cloned()))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }
}

impl<N> ParseResult<N> {
    /// Packages this result's errors as a miette report over `input`.
    pub fn into_report(self, name: &str, input: &Input) -> ParseReport {
        ParseReport::new(name, input, &self.errors)
    }
}

/// Prints a report with miette's graphical handler to stderr.
pub fn print_report(report: ParseReport) {
    let report = miette::Report::new(report);
    eprintln!("{report:?}");
}

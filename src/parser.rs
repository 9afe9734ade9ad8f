//! Top-level parse entry points.
//!
//! Every call builds a fresh [`ParseContext`], so memo tables, the node stack
//! and collected errors never outlive the call that produced them.

use crate::config::ParseOptions;
use crate::engine::{Mode, ParseContext};
use crate::errors::{ErrorKind, ErrorReport, ParseError};
use crate::grammar::{Expr, Grammar, RuleId};
use crate::input::{Input, InputRange, Position};

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of a top-level parse.
#[derive(Debug, Clone)]
pub struct ParseResult<N> {
    /// The root rule matched and the whole input was consumed.
    pub success: bool,
    /// The single node left on the construction stack after a successful
    /// parse, if any.
    pub root: Option<N>,
    /// Furthest-failure errors (plus any end-of-input or hook errors), in
    /// ascending position order. Populated even on success.
    pub errors: Vec<ParseError>,
}

impl<N> ParseResult<N> {
    /// `{ line, column, kind, message }` rows for display.
    pub fn reports(&self) -> Vec<ErrorReport> {
        self.errors.iter().map(ErrorReport::from).collect()
    }

    /// The root node of a successful parse, or the errors of a failed one.
    pub fn into_root(self) -> Result<Option<N>, Vec<ParseError>> {
        if self.success {
            Ok(self.root)
        } else {
            Err(self.errors)
        }
    }
}

/// Outcome of evaluating one expression with [`Parser::probe`].
#[derive(Debug, Clone)]
pub struct Probe<N> {
    pub end: Option<Position>,
    /// Nodes left on the construction stack.
    pub nodes: Vec<N>,
    pub errors: Vec<ParseError>,
}

// ============================================================================
// PARSER
// ============================================================================

/// A configured view of a grammar, ready to parse any number of inputs.
#[derive(Debug, Clone)]
pub struct Parser<'g, N> {
    grammar: &'g Grammar<N>,
    whitespace: Option<RuleId>,
    options: ParseOptions,
}

impl<'g, N: Clone> Parser<'g, N> {
    pub fn new(grammar: &'g Grammar<N>) -> Self {
        Self {
            grammar,
            whitespace: None,
            options: ParseOptions::default(),
        }
    }

    pub fn with_whitespace(mut self, whitespace: RuleId) -> Self {
        self.whitespace = Some(whitespace);
        self
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn grammar(&self) -> &'g Grammar<N> {
        self.grammar
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Matches `root` against the whole of `input`.
    ///
    /// Leading whitespace is skipped, and the match must reach the end of the
    /// input (after trailing whitespace, unless disabled); otherwise an
    /// invalid-end-of-file error is added at the position reached.
    pub fn parse(&self, input: &Input, root: RuleId) -> ParseResult<N> {
        let root_name = self.grammar.name(root);
        log::debug!("parsing {} code points with `{root_name}`", input.len());

        let mut cx = ParseContext::new(self.grammar, input, &self.options, self.whitespace);
        let mut eof_error = None;
        let success = match cx.eval_rule(root, Position::start(), Mode::Token) {
            Some(end) => {
                let end = if self.options.skip_trailing_whitespace {
                    cx.skip_whitespace(end)
                } else {
                    end
                };
                match input.get(end.offset) {
                    None => true,
                    Some(c) => {
                        eof_error = Some(ParseError::new(
                            InputRange::empty(end),
                            ErrorKind::InvalidEof,
                            format!("invalid end of file: unexpected {c:?}"),
                        ));
                        false
                    }
                }
            }
            None => false,
        };

        let memo_entries = cx.memo_len();
        let furthest = cx.furthest_failure();
        let (nodes, errors) = cx.finish(eof_error);
        log::debug!(
            "`{root_name}` {}: {} errors, furthest failure {:?}, {memo_entries} memo entries",
            if success { "matched" } else { "failed" },
            errors.len(),
            furthest,
        );

        let root = if success {
            single_root(nodes, root_name)
        } else {
            None
        };
        ParseResult {
            success,
            root,
            errors,
        }
    }

    pub fn parse_str(&self, text: &str, root: RuleId) -> ParseResult<N> {
        self.parse(&Input::new(text), root)
    }

    /// Evaluates a single expression at `start` with fresh parse state.
    ///
    /// No end-of-input requirement applies.
    pub fn probe(&self, input: &Input, expr: &Expr, start: Position) -> Probe<N> {
        let mut cx = ParseContext::new(self.grammar, input, &self.options, self.whitespace);
        let end = cx.eval(expr, start, Mode::Token);
        let (nodes, errors) = cx.finish(None);
        Probe { end, nodes, errors }
    }
}

fn single_root<N>(mut nodes: Vec<N>, root_name: &str) -> Option<N> {
    match nodes.len() {
        0 | 1 => nodes.pop(),
        n => {
            log::warn!("`{root_name}` left {n} unclaimed nodes; no single AST root");
            None
        }
    }
}

/// Parses `input` with `root`, skipping `whitespace` between tokens, using
/// default options.
pub fn parse<N: Clone>(
    grammar: &Grammar<N>,
    input: &Input,
    root: RuleId,
    whitespace: RuleId,
) -> ParseResult<N> {
    Parser::new(grammar).with_whitespace(whitespace).parse(input, root)
}

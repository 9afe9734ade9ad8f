//! The backtracking evaluator.
//!
//! A [`ParseContext`] owns everything that changes during one parse: the
//! memo tables, the node construction stack, the error collector and the
//! rule nesting depth. Positions are passed and returned by value, so
//! backtracking is just continuing from the snapshot the caller still holds.
//!
//! ## Invariants
//! - A failed evaluation leaves the construction stack exactly as it was
//!   before the attempt (enforced once, in [`ParseContext::eval`]).
//! - A successful evaluation never ends before it started.
//! - A rule re-entered at the same offset and mode before its first
//!   evaluation completes fails immediately (left-recursion guard).

use crate::ast::{Match, NodeStack};
use crate::config::ParseOptions;
use crate::errors::{ErrorCollector, ErrorKind, ParseError};
use crate::grammar::{Expr, ExprKind, Grammar, RuleId};
use crate::input::{Input, InputRange, Position};

pub mod memo;

use memo::{MemoEntry, MemoKey, MemoTable};

/// Whether whitespace is skipped before tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Default: the whitespace rule runs before every terminal and rule.
    Token,
    /// Inside `term(..)` and the whitespace rule itself.
    Term,
}

pub(crate) struct ParseContext<'g, N> {
    grammar: &'g Grammar<N>,
    input: &'g Input,
    options: &'g ParseOptions,
    whitespace: Option<RuleId>,
    memo: MemoTable<N>,
    stack: NodeStack<N>,
    errors: ErrorCollector,
    depth: usize,
}

impl<'g, N: Clone> ParseContext<'g, N> {
    pub(crate) fn new(
        grammar: &'g Grammar<N>,
        input: &'g Input,
        options: &'g ParseOptions,
        whitespace: Option<RuleId>,
    ) -> Self {
        Self {
            grammar,
            input,
            options,
            whitespace,
            memo: MemoTable::new(grammar.len()),
            stack: NodeStack::new(),
            errors: ErrorCollector::new(options.max_errors),
            depth: 0,
        }
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    /// Evaluates `expr` at `pos`, returning the end position on success.
    pub(crate) fn eval(&mut self, expr: &Expr, pos: Position, mode: Mode) -> Option<Position> {
        let mark = self.stack.mark();
        let result = self.eval_kind(expr, pos, mode);
        if result.is_none() {
            self.stack.truncate(mark);
        }
        result
    }

    fn eval_kind(&mut self, expr: &Expr, pos: Position, mode: Mode) -> Option<Position> {
        match expr.kind() {
            ExprKind::Char(expected) => {
                let pos = self.token_start(pos, mode);
                match self.input.advance(pos) {
                    Some((c, next)) if c == *expected => Some(next),
                    _ => self.expected(pos, expr),
                }
            }
            ExprKind::String(expected) => {
                let pos = self.token_start(pos, mode);
                if !self.input.rest(pos).starts_with(expected) {
                    return self.expected(pos, expr);
                }
                Some(expected.iter().fold(pos, |p, _| p.advanced()))
            }
            ExprKind::Set(members) => {
                let pos = self.token_start(pos, mode);
                match self.input.advance(pos) {
                    Some((c, next)) if members.binary_search(&c).is_ok() => Some(next),
                    _ => self.expected(pos, expr),
                }
            }
            ExprKind::Range(min, max) => {
                let pos = self.token_start(pos, mode);
                match self.input.advance(pos) {
                    Some((c, next)) if (*min..=*max).contains(&c) => Some(next),
                    _ => self.expected(pos, expr),
                }
            }
            ExprKind::Sequence(left, right) => {
                let mid = self.eval(left, pos, mode)?;
                self.eval(right, mid, mode)
            }
            ExprKind::Choice(left, right) => {
                if let Some(end) = self.eval(left, pos, mode) {
                    return Some(end);
                }
                self.eval(right, pos, mode)
            }
            ExprKind::ZeroOrMore(inner) => Some(self.repeat(inner, pos, mode)),
            ExprKind::OneOrMore(inner) => {
                let first = self.eval(inner, pos, mode)?;
                if first.offset == pos.offset {
                    return Some(first);
                }
                Some(self.repeat(inner, first, mode))
            }
            ExprKind::Optional(inner) => Some(self.eval(inner, pos, mode).unwrap_or(pos)),
            ExprKind::And(inner) => {
                let mark = self.stack.mark();
                let result = self.eval(inner, pos, mode);
                self.stack.truncate(mark);
                result.map(|_| pos)
            }
            ExprKind::Not(inner) => {
                let mark = self.stack.mark();
                self.errors.push_quiet();
                let result = self.eval(inner, pos, mode);
                self.errors.pop_quiet();
                self.stack.truncate(mark);
                match result {
                    Some(_) => {
                        self.errors.fail(pos, ErrorKind::Syntax, || {
                            format!("unexpected {}", inner.expectation())
                        });
                        None
                    }
                    None => Some(pos),
                }
            }
            ExprKind::Rule(id) => self.eval_rule(*id, pos, mode),
            ExprKind::Newline(inner) => self.eval(inner, pos, mode).map(Position::next_line),
            ExprKind::Term(inner) => {
                let pos = self.token_start(pos, mode);
                self.eval(inner, pos, Mode::Term)
            }
            ExprKind::Eof => {
                let pos = self.token_start(pos, mode);
                if self.input.at_end(pos) {
                    Some(pos)
                } else {
                    self.expected(pos, expr)
                }
            }
            ExprKind::Any => {
                let pos = self.token_start(pos, mode);
                match self.input.advance(pos) {
                    Some((_, next)) => Some(next),
                    None => self.expected(pos, expr),
                }
            }
        }
    }

    /// Repeats `inner` until it fails or stops consuming input.
    ///
    /// A repetition that consumes nothing is accepted once and ends the loop.
    fn repeat(&mut self, inner: &Expr, pos: Position, mode: Mode) -> Position {
        let mut current = pos;
        while let Some(next) = self.eval(inner, current, mode) {
            let progressed = next.offset > current.offset;
            current = next;
            if !progressed {
                break;
            }
        }
        current
    }

    fn expected(&mut self, pos: Position, expr: &Expr) -> Option<Position> {
        self.errors.fail(pos, ErrorKind::Syntax, || {
            format!("expected {}", expr.expectation())
        });
        None
    }

    // ========================================================================
    // WHITESPACE
    // ========================================================================

    fn token_start(&mut self, pos: Position, mode: Mode) -> Position {
        match mode {
            Mode::Token => self.skip_whitespace(pos),
            Mode::Term => pos,
        }
    }

    /// Skips the whitespace rule at `pos`, if one is configured.
    ///
    /// Whitespace never reports errors and never contributes nodes.
    pub(crate) fn skip_whitespace(&mut self, pos: Position) -> Position {
        let Some(ws) = self.whitespace else {
            return pos;
        };
        let mark = self.stack.mark();
        self.errors.push_quiet();
        let end = self.eval_rule(ws, pos, Mode::Term);
        self.errors.pop_quiet();
        self.stack.truncate(mark);
        end.unwrap_or(pos)
    }

    // ========================================================================
    // RULES
    // ========================================================================

    /// Invokes rule `id` at `pos` through its memo table.
    pub(crate) fn eval_rule(&mut self, id: RuleId, pos: Position, mode: Mode) -> Option<Position> {
        let grammar = self.grammar;
        let pos = self.token_start(pos, mode);
        let key = MemoKey {
            offset: pos.offset,
            term: mode == Mode::Term,
            quiet: self.errors.is_quiet(),
        };

        match self.memo.get(id, key) {
            Some(MemoEntry::Succeeded { end, nodes }) => {
                let end = *end;
                let nodes = nodes.clone();
                log::trace!("memo hit `{}` at {} -> {}", grammar.name(id), pos.offset, end.offset);
                self.stack.extend(nodes);
                return Some(end);
            }
            Some(MemoEntry::Failed) => return None,
            Some(MemoEntry::InProgress) => {
                let name = grammar.name(id);
                log::trace!("left recursion in `{name}` at {}", pos.offset);
                self.errors.fail(pos, ErrorKind::Syntax, || {
                    format!("left recursion in rule `{name}`")
                });
                return None;
            }
            None => {}
        }

        let Some(rule) = grammar.get(id) else {
            log::warn!("rule id {id} does not belong to this grammar");
            self.errors.fail(pos, ErrorKind::Syntax, || format!("unknown rule {id}"));
            return None;
        };
        let Some(expr) = rule.expr() else {
            log::warn!("rule `{}` is declared but never defined", rule.name());
            self.errors.fail(pos, ErrorKind::Syntax, || {
                format!("rule `{}` is not defined", rule.name())
            });
            return None;
        };
        if self.depth >= self.options.max_depth {
            let limit = self.options.max_depth;
            self.errors.fail(pos, ErrorKind::RecursionLimit, || {
                format!("rule `{}` nested deeper than {limit} levels", rule.name())
            });
            return None;
        }

        self.memo.insert(id, key, MemoEntry::InProgress);
        self.depth += 1;
        log::trace!("enter `{}` at {}", rule.name(), pos.offset);

        let mark = self.stack.mark();
        let mut result = self.eval(expr, pos, mode);
        if let (Some(end), Some(hook)) = (result, rule.hook()) {
            let children = self.stack.split_off(mark);
            let matched = Match::new(self.input, InputRange::new(pos, end), rule.name());
            match hook(&matched, children) {
                Ok(node) => self.stack.push(node),
                Err(err) => {
                    log::debug!("rule `{}` rejected {:?}: {}", rule.name(), matched.text(), err);
                    self.errors.user(ParseError::new(
                        matched.range(),
                        ErrorKind::User(err.code),
                        err.message,
                    ));
                    result = None;
                }
            }
        }

        self.depth -= 1;
        let entry = match result {
            Some(end) => MemoEntry::Succeeded {
                end,
                nodes: self.stack.snapshot(mark),
            },
            None => MemoEntry::Failed,
        };
        self.memo.insert(id, key, entry);
        log::trace!(
            "exit `{}` at {}: {:?}",
            rule.name(),
            pos.offset,
            result.map(|end| end.offset)
        );
        result
    }

    // ========================================================================
    // RESULTS
    // ========================================================================

    pub(crate) fn memo_len(&self) -> usize {
        self.memo.len()
    }

    pub(crate) fn furthest_failure(&self) -> Option<usize> {
        self.errors.furthest()
    }

    /// Consumes the context, yielding the leftover nodes and the final error
    /// set (with `extra` merged in).
    pub(crate) fn finish(self, extra: Option<ParseError>) -> (Vec<N>, Vec<ParseError>) {
        (self.stack.into_vec(), self.errors.finish(extra))
    }
}

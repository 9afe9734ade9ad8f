//! A parsing-expression-grammar engine with memoized rules, furthest-failure
//! error reporting and hook-driven AST construction.

pub use crate::ast::{Match, NodeError, NodeHook};
pub use crate::config::ParseOptions;
pub use crate::errors::{ErrorKind, ErrorReport, GrammarError, ParseError, USER_ERROR_BASE};
pub use crate::grammar::{
    and, any, ch, choice, choice_of, eof, nl, not, one_or_more, optional, range, rule_ref, seq_of,
    sequence, set, string, term, zero_or_more, Expr, ExprKind, Grammar, Rule, RuleId,
};
pub use crate::input::{Input, InputRange, Position};
pub use crate::parser::{parse, ParseResult, Parser, Probe};

pub mod ast;
pub mod calculator;
pub mod cli;
pub mod config;
pub mod diagnostics;
mod engine;
pub mod errors;
pub mod grammar;
pub mod input;
pub mod parser;
pub mod repl;

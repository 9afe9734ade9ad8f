//! Error types and the furthest-failure collector.
//!
//! Combinator failures are ordinary backtracking signals, so the engine never
//! raises them. Instead every failure is offered to an [`ErrorCollector`],
//! which keeps only the failures at the furthest offset reached. That set is
//! what a failed parse reports.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::{InputRange, Position};

/// First error code available to grammar-specific diagnostics.
pub const USER_ERROR_BASE: u16 = 100;

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// Classification of a reported parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A combinator failed to match.
    Syntax,
    /// The grammar matched but did not consume the whole input.
    InvalidEof,
    /// Rule nesting exceeded the configured depth.
    RecursionLimit,
    /// Grammar-specific diagnostic raised by a node hook.
    User(u16),
}

impl ErrorKind {
    pub fn code(self) -> u16 {
        match self {
            ErrorKind::Syntax => 1,
            ErrorKind::InvalidEof => 2,
            ErrorKind::RecursionLimit => 3,
            ErrorKind::User(code) => code,
        }
    }

    pub fn is_user(self) -> bool {
        matches!(self, ErrorKind::User(_))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::InvalidEof => write!(f, "invalid end of file"),
            ErrorKind::RecursionLimit => write!(f, "recursion limit exceeded"),
            ErrorKind::User(code) => write!(f, "error {code}"),
        }
    }
}

/// One reported error, located by an input range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("line {}, col {}: {message}", .range.begin.line, .range.begin.column)]
pub struct ParseError {
    pub range: InputRange,
    pub kind: ErrorKind,
    pub message: String,
}

impl ParseError {
    pub fn new(range: InputRange, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            range,
            kind,
            message: message.into(),
        }
    }

    pub fn at(pos: Position, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(InputRange::empty(pos), kind, message)
    }

    pub fn offset(&self) -> usize {
        self.range.begin.offset
    }

    pub fn line(&self) -> usize {
        self.range.begin.line
    }

    pub fn column(&self) -> usize {
        self.range.begin.column
    }

    pub fn code(&self) -> u16 {
        self.kind.code()
    }
}

/// Flat `{ line, column, kind, message }` view of an error for display or
/// serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub line: usize,
    pub column: usize,
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ParseError> for ErrorReport {
    fn from(error: &ParseError) -> Self {
        Self {
            line: error.line(),
            column: error.column(),
            kind: error.kind,
            message: error.message.clone(),
        }
    }
}

// ============================================================================
// GRAMMAR & CONFIG ERRORS
// ============================================================================

/// Faults in a grammar definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("rule `{name}` is defined more than once")]
    Redefined { name: String },

    #[error("rule `{name}` is declared but never defined")]
    Undefined { name: String },

    #[error("rule id {id} does not belong to this grammar")]
    UnknownRule { id: usize },
}

/// Failures while loading [`ParseOptions`](crate::config::ParseOptions).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid parse options: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// FURTHEST-FAILURE COLLECTOR
// ============================================================================

/// Accumulates failures during one parse.
///
/// Policy:
/// - a failure behind the furthest offset seen so far is dropped;
/// - a failure beyond it clears the retained set and becomes the new front;
/// - a failure at the same offset is appended unless an identical message is
///   already there, up to `limit` entries;
/// - user-kind errors from hooks bypass the filter and are always kept.
///
/// While quiet (whitespace skipping, negative lookahead bodies) failures are
/// not recorded at all.
#[derive(Debug)]
pub(crate) struct ErrorCollector {
    furthest: Option<usize>,
    front: Vec<ParseError>,
    user: Vec<ParseError>,
    quiet: usize,
    limit: usize,
}

impl ErrorCollector {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            furthest: None,
            front: Vec::new(),
            user: Vec::new(),
            quiet: 0,
            limit: limit.max(1),
        }
    }

    /// Offers a failure at `at`; `message` is only built if it is retained.
    pub(crate) fn fail(&mut self, at: Position, kind: ErrorKind, message: impl FnOnce() -> String) {
        if self.quiet > 0 {
            return;
        }
        match self.furthest {
            Some(furthest) if at.offset < furthest => return,
            Some(furthest) if at.offset == furthest => {}
            _ => {
                self.furthest = Some(at.offset);
                self.front.clear();
            }
        }
        if self.front.len() >= self.limit {
            return;
        }
        let message = message();
        if self
            .front
            .iter()
            .any(|e| e.kind == kind && e.message == message)
        {
            return;
        }
        self.front.push(ParseError::at(at, kind, message));
    }

    pub(crate) fn user(&mut self, error: ParseError) {
        if self.quiet > 0 || self.user.contains(&error) {
            return;
        }
        self.user.push(error);
    }

    pub(crate) fn push_quiet(&mut self) {
        self.quiet += 1;
    }

    pub(crate) fn pop_quiet(&mut self) {
        self.quiet = self.quiet.saturating_sub(1);
    }

    pub(crate) fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub(crate) fn furthest(&self) -> Option<usize> {
        self.furthest
    }

    /// All retained errors plus `extra`, ordered by ascending begin position.
    pub(crate) fn finish(self, extra: Option<ParseError>) -> Vec<ParseError> {
        let mut errors = self.user;
        errors.extend(self.front);
        errors.extend(extra);
        errors.sort_by_key(|e| e.range.begin.offset);
        errors
    }
}

//! Grammar expressions and their builders.
//!
//! An [`Expr`] is an immutable handle over an [`ExprKind`]. Cloning an `Expr`
//! shares the underlying node, so a grammar is a DAG of expressions whose
//! cycles only ever pass through [`RuleId`] references.

use std::fmt;
use std::sync::Arc;

use super::RuleId;

/// One combinator node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Char(char),
    String(Vec<char>),
    /// Sorted, deduplicated membership set.
    Set(Vec<char>),
    Range(char, char),
    Sequence(Expr, Expr),
    Choice(Expr, Expr),
    ZeroOrMore(Expr),
    OneOrMore(Expr),
    Optional(Expr),
    And(Expr),
    Not(Expr),
    Rule(RuleId),
    Newline(Expr),
    /// Evaluates the inner expression without whitespace skipping.
    Term(Expr),
    Eof,
    Any,
}

/// Shared handle over an expression node.
#[derive(Clone, PartialEq)]
pub struct Expr(Arc<ExprKind>);

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self(Arc::new(kind))
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    // ------------------------------------------------------------------------
    // Chaining combinators
    // ------------------------------------------------------------------------

    /// `self` followed by `next`.
    pub fn then(self, next: impl Into<Expr>) -> Expr {
        sequence(self, next)
    }

    /// Ordered choice: `self`, or `other` if `self` fails.
    pub fn or(self, other: impl Into<Expr>) -> Expr {
        choice(self, other)
    }

    pub fn zero_or_more(self) -> Expr {
        zero_or_more(self)
    }

    pub fn one_or_more(self) -> Expr {
        one_or_more(self)
    }

    pub fn optional(self) -> Expr {
        optional(self)
    }

    /// Positive lookahead.
    pub fn followed_by(self) -> Expr {
        and(self)
    }

    /// Negative lookahead.
    pub fn not_followed_by(self) -> Expr {
        not(self)
    }

    /// Human-readable name of what this expression expects, used in syntax
    /// error messages.
    pub fn expectation(&self) -> String {
        match self.kind() {
            ExprKind::Char(c) => format!("{c:?}"),
            ExprKind::String(s) => format!("{:?}", s.iter().collect::<String>()),
            ExprKind::Set(s) => format!("one of {:?}", s.iter().collect::<String>()),
            ExprKind::Range(min, max) => format!("{min:?}..={max:?}"),
            ExprKind::Eof => "end of input".to_string(),
            ExprKind::Any => "any character".to_string(),
            _ => self.to_string(),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.kind(), f)
    }
}

/// PEG-style notation, mainly for logs and test failure messages.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Char(c) => write!(f, "{c:?}"),
            ExprKind::String(s) => write!(f, "{:?}", s.iter().collect::<String>()),
            ExprKind::Set(s) => write!(f, "[{}]", s.iter().collect::<String>()),
            ExprKind::Range(min, max) => write!(f, "[{min}-{max}]"),
            ExprKind::Sequence(l, r) => write!(f, "({l} {r})"),
            ExprKind::Choice(l, r) => write!(f, "({l} / {r})"),
            ExprKind::ZeroOrMore(e) => write!(f, "{e}*"),
            ExprKind::OneOrMore(e) => write!(f, "{e}+"),
            ExprKind::Optional(e) => write!(f, "{e}?"),
            ExprKind::And(e) => write!(f, "&{e}"),
            ExprKind::Not(e) => write!(f, "!{e}"),
            ExprKind::Rule(id) => write!(f, "{id}"),
            ExprKind::Newline(e) => write!(f, "nl({e})"),
            ExprKind::Term(e) => write!(f, "term({e})"),
            ExprKind::Eof => write!(f, "EOF"),
            ExprKind::Any => write!(f, "."),
        }
    }
}

impl From<char> for Expr {
    fn from(c: char) -> Self {
        ch(c)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        string(s)
    }
}

impl From<RuleId> for Expr {
    fn from(id: RuleId) -> Self {
        rule_ref(id)
    }
}

// ============================================================================
// TERMINAL BUILDERS
// ============================================================================

pub fn ch(c: char) -> Expr {
    Expr::new(ExprKind::Char(c))
}

/// Exact code point sequence. A one-character string becomes a [`ch`].
pub fn string(s: &str) -> Expr {
    let chars: Vec<char> = s.chars().collect();
    match chars.as_slice() {
        [c] => ch(*c),
        _ => Expr::new(ExprKind::String(chars)),
    }
}

/// Any single code point from `members`.
pub fn set(members: &str) -> Expr {
    let mut chars: Vec<char> = members.chars().collect();
    chars.sort_unstable();
    chars.dedup();
    Expr::new(ExprKind::Set(chars))
}

/// Any single code point in `min..=max`.
pub fn range(min: char, max: char) -> Expr {
    Expr::new(ExprKind::Range(min, max))
}

pub fn any() -> Expr {
    Expr::new(ExprKind::Any)
}

pub fn eof() -> Expr {
    Expr::new(ExprKind::Eof)
}

// ============================================================================
// COMBINATOR BUILDERS
// ============================================================================

pub fn sequence(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    Expr::new(ExprKind::Sequence(left.into(), right.into()))
}

pub fn choice(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    Expr::new(ExprKind::Choice(left.into(), right.into()))
}

/// Right-folds `items` into nested sequences. Panics on an empty list.
pub fn seq_of<I, E>(items: I) -> Expr
where
    I: IntoIterator<Item = E>,
    I::IntoIter: DoubleEndedIterator,
    E: Into<Expr>,
{
    fold_right(items, sequence, "seq_of")
}

/// Right-folds `items` into nested ordered choices. Panics on an empty list.
pub fn choice_of<I, E>(items: I) -> Expr
where
    I: IntoIterator<Item = E>,
    I::IntoIter: DoubleEndedIterator,
    E: Into<Expr>,
{
    fold_right(items, choice, "choice_of")
}

fn fold_right<I, E>(items: I, join: fn(Expr, Expr) -> Expr, what: &str) -> Expr
where
    I: IntoIterator<Item = E>,
    I::IntoIter: DoubleEndedIterator,
    E: Into<Expr>,
{
    let mut items = items.into_iter().rev().map(Into::into);
    let last = items
        .next()
        .unwrap_or_else(|| panic!("{what} requires at least one expression"));
    items.fold(last, |acc, item| join(item, acc))
}

pub fn zero_or_more(e: impl Into<Expr>) -> Expr {
    Expr::new(ExprKind::ZeroOrMore(e.into()))
}

pub fn one_or_more(e: impl Into<Expr>) -> Expr {
    Expr::new(ExprKind::OneOrMore(e.into()))
}

pub fn optional(e: impl Into<Expr>) -> Expr {
    Expr::new(ExprKind::Optional(e.into()))
}

pub fn and(e: impl Into<Expr>) -> Expr {
    Expr::new(ExprKind::And(e.into()))
}

pub fn not(e: impl Into<Expr>) -> Expr {
    Expr::new(ExprKind::Not(e.into()))
}

/// On success of `e`, moves to the next line and resets the column.
pub fn nl(e: impl Into<Expr>) -> Expr {
    Expr::new(ExprKind::Newline(e.into()))
}

/// Matches `e` as a single token: no whitespace is skipped inside it.
pub fn term(e: impl Into<Expr>) -> Expr {
    Expr::new(ExprKind::Term(e.into()))
}

pub fn rule_ref(id: RuleId) -> Expr {
    Expr::new(ExprKind::Rule(id))
}

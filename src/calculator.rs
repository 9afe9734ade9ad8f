//! Arithmetic expression grammar built on the engine.
//!
//! ```text
//! ws    <- ([ \t\r] / nl('\n'))*
//! digit <- [0-9]
//! num   <- term(digit+ ('.' digit+ ([eE] [+-]? digit+)?)?)
//! val   <- num / '(' exp ')'
//! mul   <- val (('*' / '/') mul)?
//! add   <- mul (('+' / '-') add)?
//! exp   <- add
//! ```
//!
//! Composition is right-recursive, so `8-4-2` groups as `8-(4-2)`.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::ast::{Match, NodeError};
use crate::config::ParseOptions;
use crate::errors::{GrammarError, ParseError, USER_ERROR_BASE};
use crate::grammar::{ch, nl, optional, range, set, term, Expr, Grammar, RuleId};
use crate::input::Input;
use crate::parser::{ParseResult, Parser};

/// Error code for a numeric literal that does not convert to `f64`.
pub const INVALID_NUMBER: u16 = USER_ERROR_BASE;

// ============================================================================
// AST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Add => left + right,
            BinaryOp::Sub => left - right,
            BinaryOp::Mul => left * right,
            BinaryOp::Div => left / right,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CalcNode {
    Number(f64),
    /// Marker left by an operator token until its parent folds it.
    Operator(BinaryOp),
    Binary {
        op: BinaryOp,
        left: Box<CalcNode>,
        right: Box<CalcNode>,
    },
}

impl CalcNode {
    pub fn binary(op: BinaryOp, left: CalcNode, right: CalcNode) -> Self {
        CalcNode::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Evaluates the tree. A stray operator marker evaluates to NaN.
    pub fn eval(&self) -> f64 {
        match self {
            CalcNode::Number(value) => *value,
            CalcNode::Operator(_) => f64::NAN,
            CalcNode::Binary { op, left, right } => op.apply(left.eval(), right.eval()),
        }
    }
}

impl fmt::Display for CalcNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcNode::Number(value) => write!(f, "{value}"),
            CalcNode::Operator(op) => write!(f, "{}", op.symbol()),
            CalcNode::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
        }
    }
}

// ============================================================================
// GRAMMAR
// ============================================================================

/// The calculator grammar together with its entry points.
pub struct Calculator {
    grammar: Grammar<CalcNode>,
    exp: RuleId,
    ws: RuleId,
}

impl Calculator {
    pub fn new() -> Result<Self, GrammarError> {
        let mut g = Grammar::new();

        let ws = g.rule("ws", set(" \t\r").or(nl('\n')).zero_or_more());
        let digit = g.rule("digit", range('0', '9'));
        let digits = Expr::from(digit).one_or_more();
        let num = g.rule(
            "num",
            term(
                digits.clone().then(optional(
                    ch('.')
                        .then(digits.clone())
                        .then(optional(set("eE").then(optional(set("+-"))).then(digits))),
                )),
            ),
        );
        g.bind(num, number_literal)?;

        let exp = g.declare("exp");
        let val = g.rule("val", Expr::from(num).or(ch('(').then(exp).then(')')));

        let mul_op = operator(&mut g, '*', BinaryOp::Mul);
        let div_op = operator(&mut g, '/', BinaryOp::Div);
        let mul = g.declare("mul");
        g.define(mul, Expr::from(val).then(optional(mul_op.or(div_op).then(mul))))?;
        g.bind(mul, fold_binary)?;

        let add_op = operator(&mut g, '+', BinaryOp::Add);
        let sub_op = operator(&mut g, '-', BinaryOp::Sub);
        let add = g.declare("add");
        g.define(add, Expr::from(mul).then(optional(add_op.or(sub_op).then(add))))?;
        g.bind(add, fold_binary)?;

        g.define(exp, add)?;
        g.validate()?;

        Ok(Self {
            grammar: g,
            exp,
            ws,
        })
    }

    pub fn grammar(&self) -> &Grammar<CalcNode> {
        &self.grammar
    }

    /// A parser with the calculator's whitespace rule installed.
    pub fn parser(&self, options: ParseOptions) -> Parser<'_, CalcNode> {
        Parser::new(&self.grammar)
            .with_whitespace(self.ws)
            .with_options(options)
    }

    pub fn parse(&self, text: &str) -> ParseResult<CalcNode> {
        self.parse_input(&Input::new(text), ParseOptions::default())
    }

    pub fn parse_input(&self, input: &Input, options: ParseOptions) -> ParseResult<CalcNode> {
        self.parser(options).parse(input, self.exp)
    }

    /// Parses and evaluates `text`.
    pub fn evaluate(&self, text: &str) -> Result<f64, Vec<ParseError>> {
        let root = self.parse(text).into_root()?;
        Ok(root.map_or(f64::NAN, |node| node.eval()))
    }
}

static CALCULATOR: Lazy<Result<Calculator, GrammarError>> = Lazy::new(Calculator::new);

/// The process-wide calculator, built on first use.
pub fn shared() -> Result<&'static Calculator, GrammarError> {
    CALCULATOR.as_ref().map_err(Clone::clone)
}

fn operator(g: &mut Grammar<CalcNode>, symbol: char, op: BinaryOp) -> Expr {
    g.node(symbol, move |_, _| Ok(CalcNode::Operator(op)))
}

fn number_literal(m: &Match<'_>, _: Vec<CalcNode>) -> Result<CalcNode, NodeError> {
    let text = m.text();
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(CalcNode::Number(value)),
        _ => Err(m.reject(INVALID_NUMBER, format!("invalid number literal `{text}`"))),
    }
}

/// `[lhs]` passes through, `[lhs, op, rhs]` becomes a binary node.
fn fold_binary(m: &Match<'_>, children: Vec<CalcNode>) -> Result<CalcNode, NodeError> {
    let found = children.len();
    let mut children = children.into_iter();
    match (children.next(), children.next(), children.next()) {
        (Some(lhs), None, None) => Ok(lhs),
        (Some(left), Some(CalcNode::Operator(op)), Some(right)) if found == 3 => {
            Ok(CalcNode::binary(op, left, right))
        }
        _ => Err(NodeError::shape(m.rule_name(), found)),
    }
}

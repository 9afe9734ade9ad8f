//! Shared helpers for the integration tests.
#![allow(dead_code)]

use pegloom::{nl, set, Expr, Grammar, Input, ParseResult, Parser, Position, Probe, RuleId};

/// Generic test AST: leaves keep their text, branches keep their rule name.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(String),
    Branch(String, Vec<Node>),
}

impl Node {
    /// Compact s-expression rendering, e.g. `(list a b)`.
    pub fn render(&self) -> String {
        match self {
            Node::Leaf(text) => text.clone(),
            Node::Branch(name, children) => {
                let mut out = format!("({name}");
                for child in children {
                    out.push(' ');
                    out.push_str(&child.render());
                }
                out.push(')');
                out
            }
        }
    }
}

/// A rule whose node is the matched text.
pub fn leaf(g: &mut Grammar<Node>, name: &str, expr: impl Into<Expr>) -> RuleId {
    let id = g.rule(name, expr);
    g.bind(id, |m, _| Ok(Node::Leaf(m.text()))).unwrap();
    id
}

/// A rule whose node wraps the nodes of its nested matches.
pub fn branch(g: &mut Grammar<Node>, name: &str, expr: impl Into<Expr>) -> RuleId {
    let id = g.rule(name, expr);
    g.bind(id, |m, children| {
        Ok(Node::Branch(m.rule_name().to_string(), children))
    })
    .unwrap();
    id
}

/// Blanks, tabs and counted newlines.
pub fn spaces<N>(g: &mut Grammar<N>) -> RuleId {
    g.rule("ws", set(" \t").or(nl('\n')).zero_or_more())
}

pub fn parse_with(g: &Grammar<Node>, root: RuleId, ws: RuleId, text: &str) -> ParseResult<Node> {
    Parser::new(g).with_whitespace(ws).parse_str(text, root)
}

/// Evaluates `expr` from the start of `text` without whitespace skipping.
pub fn probe<N: Clone>(g: &Grammar<N>, expr: &Expr, text: &str) -> Probe<N> {
    Parser::new(g).probe(&Input::new(text), expr, Position::start())
}

pub fn end_offset<N>(probe: &Probe<N>) -> Option<usize> {
    probe.end.map(|end| end.offset)
}

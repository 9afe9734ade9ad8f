//! Grammar definition.
//!
//! A [`Grammar`] is an arena of rules addressed by [`RuleId`]. Rule
//! references inside expressions store the id, never a pointer, so rules may
//! reference each other (or themselves) freely and may be declared before
//! they are defined.
//!
//! The grammar is immutable while parsing; every piece of parse-time state
//! lives in the per-call context, so one grammar can serve many parses,
//! including concurrent ones.

use std::fmt;
use std::sync::Arc;

use crate::ast::{Match, NodeError, NodeHook};
use crate::errors::GrammarError;

pub mod expr;

pub use expr::{
    and, any, ch, choice, choice_of, eof, nl, not, one_or_more, optional, range, rule_ref, seq_of,
    sequence, set, string, term, zero_or_more, Expr, ExprKind,
};

// ============================================================================
// RULE IDENTIFIERS
// ============================================================================

/// Stable index of a rule inside its [`Grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(u32);

impl RuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named parsing unit.
pub struct Rule<N> {
    name: String,
    expr: Option<Expr>,
    hook: Option<NodeHook<N>>,
}

impl<N> Rule<N> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` while the rule is only forward-declared.
    pub fn expr(&self) -> Option<&Expr> {
        self.expr.as_ref()
    }

    pub fn hook(&self) -> Option<&NodeHook<N>> {
        self.hook.as_ref()
    }
}

impl<N> fmt::Debug for Rule<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("expr", &self.expr)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

// ============================================================================
// GRAMMAR
// ============================================================================

/// Rule arena producing AST nodes of type `N`.
pub struct Grammar<N> {
    rules: Vec<Rule<N>>,
}

impl<N> Grammar<N> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Forward-declares a rule so it can be referenced before its definition.
    pub fn declare(&mut self, name: impl Into<String>) -> RuleId {
        let id = RuleId(self.rules.len() as u32);
        self.rules.push(Rule {
            name: name.into(),
            expr: None,
            hook: None,
        });
        id
    }

    /// Gives a declared rule its expression. Each rule is defined once.
    pub fn define(&mut self, id: RuleId, expr: impl Into<Expr>) -> Result<(), GrammarError> {
        let rule = self
            .rules
            .get_mut(id.index())
            .ok_or(GrammarError::UnknownRule { id: id.index() })?;
        if rule.expr.is_some() {
            return Err(GrammarError::Redefined {
                name: rule.name.clone(),
            });
        }
        rule.expr = Some(expr.into());
        Ok(())
    }

    /// Declares and defines a rule in one step.
    pub fn rule(&mut self, name: impl Into<String>, expr: impl Into<Expr>) -> RuleId {
        let id = self.declare(name);
        self.rules[id.index()].expr = Some(expr.into());
        id
    }

    /// Attaches a node-construction hook, replacing any previous one.
    ///
    /// On every successful match of the rule the hook receives the matched
    /// range and the nodes pushed by nested bound matches, and returns the
    /// node that replaces them on the construction stack.
    pub fn bind<F>(&mut self, id: RuleId, hook: F) -> Result<(), GrammarError>
    where
        F: Fn(&Match<'_>, Vec<N>) -> Result<N, NodeError> + Send + Sync + 'static,
    {
        let rule = self
            .rules
            .get_mut(id.index())
            .ok_or(GrammarError::UnknownRule { id: id.index() })?;
        rule.hook = Some(Arc::new(hook));
        Ok(())
    }

    /// Binds a hook to a sub-expression.
    ///
    /// The expression is wrapped into an anonymous rule carrying the hook and
    /// a reference to that rule is returned, so the sub-expression gets the
    /// same memoization and construction semantics as a named rule.
    pub fn node<F>(&mut self, expr: impl Into<Expr>, hook: F) -> Expr
    where
        F: Fn(&Match<'_>, Vec<N>) -> Result<N, NodeError> + Send + Sync + 'static,
    {
        let expr = expr.into();
        let name = format!("<{expr}>");
        let id = self.rule(name, expr);
        self.rules[id.index()].hook = Some(Arc::new(hook));
        rule_ref(id)
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule<N>> {
        self.rules.get(id.index())
    }

    pub fn name(&self, id: RuleId) -> &str {
        self.get(id).map_or("<unknown>", |rule| rule.name())
    }

    pub fn find(&self, name: &str) -> Option<RuleId> {
        self.rules
            .iter()
            .position(|rule| rule.name == name)
            .map(|index| RuleId(index as u32))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks that every rule is defined and every rule reference resolves.
    pub fn validate(&self) -> Result<(), GrammarError> {
        for rule in &self.rules {
            let Some(expr) = &rule.expr else {
                return Err(GrammarError::Undefined {
                    name: rule.name.clone(),
                });
            };
            self.check_refs(expr)?;
        }
        Ok(())
    }

    fn check_refs(&self, expr: &Expr) -> Result<(), GrammarError> {
        match expr.kind() {
            ExprKind::Rule(id) => {
                if id.index() >= self.rules.len() {
                    return Err(GrammarError::UnknownRule { id: id.index() });
                }
                Ok(())
            }
            ExprKind::Sequence(l, r) | ExprKind::Choice(l, r) => {
                self.check_refs(l)?;
                self.check_refs(r)
            }
            ExprKind::ZeroOrMore(e)
            | ExprKind::OneOrMore(e)
            | ExprKind::Optional(e)
            | ExprKind::And(e)
            | ExprKind::Not(e)
            | ExprKind::Newline(e)
            | ExprKind::Term(e) => self.check_refs(e),
            ExprKind::Char(_)
            | ExprKind::String(_)
            | ExprKind::Set(_)
            | ExprKind::Range(..)
            | ExprKind::Eof
            | ExprKind::Any => Ok(()),
        }
    }
}

impl<N> Default for Grammar<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> fmt::Debug for Grammar<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.rules).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_declaration() {
        let mut g: Grammar<()> = Grammar::new();
        let value = g.declare("value");
        let list = g.rule("list", ch('(').then(zero_or_more(value)).then(')'));
        assert!(matches!(g.validate(), Err(GrammarError::Undefined { name }) if name == "value"));
        g.define(value, range('0', '9').or(list)).unwrap();
        assert!(g.validate().is_ok());
        assert_eq!(g.find("list"), Some(list));
    }

    #[test]
    fn test_redefinition_rejected() {
        let mut g: Grammar<()> = Grammar::new();
        let r = g.rule("r", 'a');
        assert!(matches!(g.define(r, 'b'), Err(GrammarError::Redefined { .. })));
    }

    #[test]
    fn test_foreign_rule_id_detected() {
        let mut other: Grammar<()> = Grammar::new();
        other.declare("a");
        let foreign = other.declare("b");
        let mut g: Grammar<()> = Grammar::new();
        g.rule("uses_foreign", rule_ref(foreign));
        assert!(matches!(g.validate(), Err(GrammarError::UnknownRule { id: 1 })));
    }

    #[test]
    fn test_node_creates_anonymous_rule() {
        let mut g: Grammar<u32> = Grammar::new();
        let plus = g.node('+', |_, _| Ok(1));
        let ExprKind::Rule(id) = plus.kind() else {
            panic!("expected a rule reference");
        };
        assert_eq!(g.name(*id), "<'+'>");
        assert!(g.get(*id).unwrap().hook().is_some());
    }
}

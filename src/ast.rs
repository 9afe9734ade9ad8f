//! AST construction protocol.
//!
//! Bound rules turn matched input into nodes as a side effect of matching.
//! Nodes live on a [`NodeStack`] owned by the parse context until a parent
//! claims them:
//!
//! - a rule records the stack height when it starts;
//! - on success its hook receives every node pushed above that mark (left to
//!   right) and the returned node is pushed in their place;
//! - on failure anything above the mark is truncated, so nodes built during
//!   an abandoned attempt never survive backtracking.
//!
//! Leaves are simply hooks that receive no children.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::USER_ERROR_BASE;
use crate::input::{Input, InputRange};

/// Node construction hook attached to a rule.
pub type NodeHook<N> = Arc<dyn Fn(&Match<'_>, Vec<N>) -> Result<N, NodeError> + Send + Sync>;

// ============================================================================
// MATCH VIEW
// ============================================================================

/// What a hook gets to see of a successful match.
#[derive(Clone, Copy)]
pub struct Match<'a> {
    input: &'a Input,
    range: InputRange,
    rule: &'a str,
}

impl<'a> Match<'a> {
    pub(crate) fn new(input: &'a Input, range: InputRange, rule: &'a str) -> Self {
        Self { input, range, rule }
    }

    pub fn range(&self) -> InputRange {
        self.range
    }

    pub fn chars(&self) -> &'a [char] {
        self.input.chars(self.range)
    }

    pub fn text(&self) -> String {
        self.input.text(self.range)
    }

    pub fn rule_name(&self) -> &'a str {
        self.rule
    }

    /// Shorthand for a hook rejecting this match.
    pub fn reject(&self, code: u16, message: impl Into<String>) -> NodeError {
        NodeError::new(code, message)
    }
}

impl fmt::Debug for Match<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("rule", &self.rule)
            .field("range", &self.range)
            .field("text", &self.text())
            .finish()
    }
}

// ============================================================================
// HOOK ERRORS
// ============================================================================

/// A hook's refusal to build a node from a match, e.g. a malformed literal.
///
/// The refusing rule fails like any other mismatch (so alternatives are still
/// tried), and the refusal is reported as a user-defined error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct NodeError {
    pub code: u16,
    pub message: String,
}

impl NodeError {
    /// Codes below [`USER_ERROR_BASE`] are reserved for the engine and are
    /// raised to the base.
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: code.max(USER_ERROR_BASE),
            message: message.into(),
        }
    }

    /// Hook received a child list of the wrong shape.
    pub fn shape(rule: &str, found: usize) -> Self {
        Self::new(
            USER_ERROR_BASE,
            format!("rule `{rule}` cannot build a node from {found} children"),
        )
    }
}

// ============================================================================
// CONSTRUCTION STACK
// ============================================================================

/// Nodes built so far and not yet claimed by a parent.
#[derive(Debug, Clone)]
pub struct NodeStack<N> {
    nodes: Vec<N>,
}

impl<N> NodeStack<N> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Current height, to be handed back to [`truncate`](Self::truncate) or
    /// [`split_off`](Self::split_off).
    pub fn mark(&self) -> usize {
        self.nodes.len()
    }

    pub fn push(&mut self, node: N) {
        self.nodes.push(node);
    }

    /// Discards everything pushed since `mark`.
    pub fn truncate(&mut self, mark: usize) {
        self.nodes.truncate(mark);
    }

    /// Removes and returns everything pushed since `mark`, oldest first.
    pub fn split_off(&mut self, mark: usize) -> Vec<N> {
        self.nodes.split_off(mark.min(self.nodes.len()))
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = N>) {
        self.nodes.extend(nodes);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_vec(self) -> Vec<N> {
        self.nodes
    }
}

impl<N: Clone> NodeStack<N> {
    /// Copies of everything pushed since `mark`, oldest first.
    pub fn snapshot(&self, mark: usize) -> Vec<N> {
        self.nodes
            .get(mark..)
            .map(<[N]>::to_vec)
            .unwrap_or_default()
    }
}

impl<N> Default for NodeStack<N> {
    fn default() -> Self {
        Self::new()
    }
}

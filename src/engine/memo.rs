//! Per-parse rule memoization.
//!
//! One table per rule, keyed by start offset, evaluation mode and whether
//! error recording was muted. A muted failure never recorded its error, so it
//! must not answer a call that would have. A table is created with the parse context and dropped with it, so nothing leaks from
//! one parse into the next.

use std::collections::HashMap;

use crate::grammar::RuleId;
use crate::input::Position;

/// Outcome of a rule at one start position.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoEntry<N> {
    /// Evaluation started and has not finished: re-entry is left recursion.
    InProgress,
    Failed,
    /// Matched up to `end`, leaving `nodes` on the construction stack.
    Succeeded { end: Position, nodes: Vec<N> },
}

/// Where and how a rule was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoKey {
    pub offset: usize,
    pub term: bool,
    pub quiet: bool,
}

#[derive(Debug)]
pub struct MemoTable<N> {
    rules: Vec<HashMap<MemoKey, MemoEntry<N>>>,
}

impl<N> MemoTable<N> {
    pub fn new(rule_count: usize) -> Self {
        Self {
            rules: (0..rule_count).map(|_| HashMap::new()).collect(),
        }
    }

    pub fn get(&self, rule: RuleId, key: MemoKey) -> Option<&MemoEntry<N>> {
        self.rules.get(rule.index())?.get(&key)
    }

    pub fn insert(&mut self, rule: RuleId, key: MemoKey, entry: MemoEntry<N>) {
        if let Some(table) = self.rules.get_mut(rule.index()) {
            table.insert(key, entry);
        }
    }

    /// Total number of recorded outcomes across all rules.
    pub fn len(&self) -> usize {
        self.rules.iter().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn key(offset: usize, term: bool, quiet: bool) -> MemoKey {
        MemoKey {
            offset,
            term,
            quiet,
        }
    }

    #[test]
    fn test_entries_are_keyed_by_rule_offset_and_mode() {
        let mut g: Grammar<()> = Grammar::new();
        let a = g.declare("a");
        let b = g.declare("b");
        let mut memo: MemoTable<()> = MemoTable::new(g.len());
        memo.insert(a, key(0, false, false), MemoEntry::InProgress);
        memo.insert(a, key(0, true, false), MemoEntry::Failed);
        assert_eq!(memo.get(a, key(0, false, false)), Some(&MemoEntry::InProgress));
        assert_eq!(memo.get(a, key(0, true, false)), Some(&MemoEntry::Failed));
        assert_eq!(memo.get(b, key(0, false, false)), None);
        assert_eq!(memo.get(a, key(1, false, false)), None);
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn test_muted_outcome_is_kept_apart() {
        let mut g: Grammar<()> = Grammar::new();
        let a = g.declare("a");
        let mut memo: MemoTable<()> = MemoTable::new(g.len());
        memo.insert(a, key(3, true, true), MemoEntry::Failed);
        assert_eq!(memo.get(a, key(3, true, false)), None);
        assert_eq!(memo.get(a, key(3, true, true)), Some(&MemoEntry::Failed));
    }
}

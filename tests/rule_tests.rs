// tests/rule_tests.rs

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{leaf, Node};
use pegloom::{
    ch, choice, rule_ref, seq_of, ErrorKind, Grammar, GrammarError, ParseOptions, Parser,
};

fn counted_item(g: &mut Grammar<Node>, calls: &Arc<AtomicUsize>) -> pegloom::RuleId {
    let item = g.rule("item", 'x');
    let calls = Arc::clone(calls);
    g.bind(item, move |m, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Node::Leaf(m.text()))
    })
    .unwrap();
    item
}

// ---
// Memoization
// ---

#[test]
fn test_memo_hit_reuses_nodes_without_rerunning_hook() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut g = Grammar::new();
    let item = counted_item(&mut g, &calls);
    let list = g.rule(
        "list",
        choice(rule_ref(item).then(';'), rule_ref(item).then(',')),
    );

    let result = Parser::new(&g).parse_str("x,", list);
    assert!(result.success);
    assert_eq!(result.root, Some(Node::Leaf("x".into())));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_memo_does_not_leak_between_parses() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut g = Grammar::new();
    let item = counted_item(&mut g, &calls);
    let parser = Parser::new(&g);

    let first = parser.parse_str("x", item);
    let second = parser.parse_str("x", item);
    assert_eq!(first.root, second.root);
    assert_eq!(first.success, second.success);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ---
// Left recursion
// ---

#[test]
fn test_direct_left_recursion_terminates() {
    let mut g: Grammar<()> = Grammar::new();
    let expr = g.declare("expr");
    g.define(expr, choice(seq_of([rule_ref(expr), ch('+'), ch('n')]), 'n'))
        .unwrap();
    let parser = Parser::new(&g);

    let result = parser.parse_str("n+n", expr);
    assert!(!result.success);
    assert!(result
        .errors
        .iter()
        .any(|e| e.offset() == 0 && e.message == "left recursion in rule `expr`"));

    // The non-recursive alternative still matches on its own.
    assert!(parser.parse_str("n", expr).success);
}

#[test]
fn test_indirect_left_recursion_terminates() {
    let mut g: Grammar<()> = Grammar::new();
    let a = g.declare("a");
    let b = g.rule("b", rule_ref(a).then('z'));
    g.define(a, choice(rule_ref(b).then('x'), 'y')).unwrap();

    let result = Parser::new(&g).parse_str("yx", a);
    assert!(!result.success);
    assert!(result
        .errors
        .iter()
        .any(|e| e.offset() == 0 && e.message.contains("left recursion in rule `a`")));
}

// ---
// Depth limit and undefined rules
// ---

#[test]
fn test_depth_limit_fails_instead_of_overflowing() {
    let mut g: Grammar<()> = Grammar::new();
    let nested = g.declare("nested");
    g.define(nested, choice(seq_of([ch('('), rule_ref(nested), ch(')')]), 'x'))
        .unwrap();
    let text = format!("{}x{}", "(".repeat(10), ")".repeat(10));

    let shallow = Parser::new(&g)
        .with_options(ParseOptions::default().with_max_depth(8))
        .parse_str(&text, nested);
    assert!(!shallow.success);
    assert!(shallow
        .errors
        .iter()
        .any(|e| e.kind == ErrorKind::RecursionLimit));

    let deep = Parser::new(&g).parse_str(&text, nested);
    assert!(deep.success);
    assert_eq!(deep.root, None);
}

#[test]
fn test_undefined_rule_fails_parse() {
    let mut g: Grammar<()> = Grammar::new();
    let missing = g.declare("missing");
    let root = g.rule("root", rule_ref(missing));
    assert!(matches!(g.validate(), Err(GrammarError::Undefined { name }) if name == "missing"));

    let result = Parser::new(&g).parse_str("a", root);
    assert!(!result.success);
    assert_eq!(result.errors[0].message, "rule `missing` is not defined");
}

#[test]
fn test_rule_entry_skips_whitespace() {
    let mut g = Grammar::new();
    let ws = common::spaces(&mut g);
    let word = leaf(&mut g, "word", pegloom::term(pegloom::one_or_more(pegloom::range('a', 'z'))));
    let result = Parser::new(&g).with_whitespace(ws).parse_str("   hello  ", word);
    assert!(result.success);
    assert_eq!(result.root, Some(Node::Leaf("hello".into())));
}

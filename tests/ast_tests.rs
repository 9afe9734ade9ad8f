// tests/ast_tests.rs

mod common;

use common::{branch, leaf, parse_with, spaces, Node};
use pegloom::{
    ch, choice, one_or_more, range, rule_ref, term, zero_or_more, ErrorKind, Grammar, NodeError,
    Parser, USER_ERROR_BASE,
};

fn ident(g: &mut Grammar<Node>) -> pegloom::RuleId {
    leaf(g, "ident", term(one_or_more(range('a', 'z'))))
}

#[test]
fn test_children_arrive_in_match_order() {
    let mut g = Grammar::new();
    let ws = spaces(&mut g);
    let item = ident(&mut g);
    let list = branch(&mut g, "list", ch('(').then(zero_or_more(item)).then(')'));

    let result = parse_with(&g, list, ws, "( a bb  c )");
    assert!(result.success);
    assert_eq!(result.root.unwrap().render(), "(list a bb c)");
}

#[test]
fn test_backtracked_nodes_are_discarded() {
    let mut g = Grammar::new();
    let ws = spaces(&mut g);
    let id = ident(&mut g);
    let assign = branch(&mut g, "assign", rule_ref(id).then('=').then(id));
    let call = branch(&mut g, "call", rule_ref(id).then('(').then(')'));
    let stmt = g.rule("stmt", choice(assign, call));

    let result = parse_with(&g, stmt, ws, "f ( )");
    assert!(result.success);
    assert_eq!(result.root.unwrap().render(), "(call f)");

    let result = parse_with(&g, stmt, ws, "x = y");
    assert_eq!(result.root.unwrap().render(), "(assign x y)");
}

#[test]
fn test_bound_sub_expression() {
    let mut g = Grammar::new();
    let ws = spaces(&mut g);
    let id = ident(&mut g);
    let colon = g.node(':', |m, children| {
        assert!(children.is_empty());
        Ok(Node::Leaf(format!("<{}>", m.text())))
    });
    let pair = branch(&mut g, "pair", rule_ref(id).then(colon).then(id));

    let result = parse_with(&g, pair, ws, "a : b");
    assert_eq!(result.root.unwrap().render(), "(pair a <:> b)");
}

#[test]
fn test_nested_branches_build_a_tree() {
    let mut g = Grammar::new();
    let ws = spaces(&mut g);
    let atom = ident(&mut g);
    let list = g.declare("list");
    let value = g.rule("value", choice(atom, list));
    g.define(list, ch('(').then(zero_or_more(value)).then(')'))
        .unwrap();
    g.bind(list, |m, children| {
        Ok(Node::Branch(m.rule_name().to_string(), children))
    })
    .unwrap();

    let result = parse_with(&g, value, ws, "(a (b c) () d)");
    assert!(result.success);
    assert_eq!(result.root.unwrap().render(), "(list a (list b c) (list) d)");
}

#[test]
fn test_hook_rejection_is_user_error_and_alternatives_continue() {
    let mut g = Grammar::new();
    let ws = spaces(&mut g);
    let digits = term(one_or_more(range('0', '9')));
    let number = g.rule("number", digits.clone());
    g.bind(number, |m, _| {
        if m.text() == "13" {
            Err(m.reject(142, "unlucky number"))
        } else {
            Ok(Node::Leaf(m.text()))
        }
    })
    .unwrap();
    let fallback = leaf(&mut g, "fallback", digits);
    let value = g.rule("value", choice(number, fallback));

    let result = parse_with(&g, value, ws, "13");
    assert!(result.success);
    assert_eq!(result.root, Some(Node::Leaf("13".into())));
    let rejection = result
        .errors
        .iter()
        .find(|e| e.kind == ErrorKind::User(142))
        .expect("rejection reported");
    assert_eq!(rejection.message, "unlucky number");
    assert_eq!(rejection.range.len(), 2);

    let result = parse_with(&g, value, ws, "7");
    assert!(result.success);
    assert!(!result.errors.iter().any(|e| e.kind.is_user()));
}

#[test]
fn test_engine_codes_are_reserved() {
    assert_eq!(NodeError::new(5, "low").code, USER_ERROR_BASE);
    assert_eq!(NodeError::new(230, "custom").code, 230);
}

#[test]
fn test_several_leftover_nodes_give_no_root() {
    let mut g = Grammar::new();
    let a = leaf(&mut g, "a", 'a');
    let b = leaf(&mut g, "b", 'b');
    let root = g.rule("root", rule_ref(a).then(b));

    let result = Parser::new(&g).parse_str("ab", root);
    assert!(result.success);
    assert_eq!(result.root, None);
}

#[test]
fn test_into_root_separates_outcomes() {
    let mut g = Grammar::new();
    let a = leaf(&mut g, "a", 'a');
    let parser = Parser::new(&g);

    assert_eq!(
        parser.parse_str("a", a).into_root(),
        Ok(Some(Node::Leaf("a".into())))
    );
    let errors = parser.parse_str("b", a).into_root().unwrap_err();
    assert_eq!(errors[0].message, "expected 'a'");
}

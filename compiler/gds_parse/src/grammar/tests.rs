#![allow(clippy::unwrap_used, clippy::expect_used)]

use gds_ir::{Keyword, LeafKind, NodeKind, Slot, SyntaxTree, TokenId};
use pretty_assertions::assert_eq;

use crate::tests::{invalid_texts, item_kinds, members, sexpr, slot};
use crate::{parse, Parser};

fn file(text: &str) -> SyntaxTree {
    let tree = parse(text).unwrap();
    assert_eq!(tree.text(), text);
    tree
}

fn statements(text: &str) -> SyntaxTree {
    let tree = Parser::default().parse_statements(text).unwrap();
    assert_eq!(tree.text(), text);
    tree
}

fn nth_item(tree: &SyntaxTree, list: TokenId, n: usize) -> TokenId {
    tree.arena().items(list).nth(n).unwrap()
}

fn leaf_text(tree: &SyntaxTree, id: TokenId) -> &str {
    tree.arena().text(id).unwrap()
}

const DECLARATIONS: &str = "\
@tool
class_name Player extends CharacterBody2D

signal hit(damage: int)
enum State { IDLE, RUN = 2 }
const MAX := 10
@export var speed: float = 1.5
static var count = 0
var hp: int:
\tget:
\t\treturn _hp
\tset(value):
\t\t_hp = value

func _ready() -> void:
\tpass

class Inner extends Node:
\tvar x
";

#[test]
fn class_members() {
    let tree = file(DECLARATIONS);
    assert!(tree.is_well_formed(), "{}", tree.dump());
    assert_eq!(
        item_kinds(&tree, members(&tree)),
        vec![
            NodeKind::Annotation,
            NodeKind::ClassName,
            NodeKind::Extends,
            NodeKind::Signal,
            NodeKind::Enum,
            NodeKind::Constant,
            NodeKind::Annotation,
            NodeKind::Variable,
            NodeKind::Variable,
            NodeKind::Variable,
            NodeKind::Method,
            NodeKind::InnerClass,
        ]
    );
}

#[test]
fn variable_parts() {
    let tree = file(DECLARATIONS);
    let list = members(&tree);

    let speed = nth_item(&tree, list, 7);
    assert_eq!(leaf_text(&tree, slot(&tree, speed, Slot::Name)), "speed");
    assert_eq!(sexpr(&tree, slot(&tree, speed, Slot::Type)), "float");
    assert_eq!(sexpr(&tree, slot(&tree, speed, Slot::Initializer)), "1.5");

    let count = nth_item(&tree, list, 8);
    let stat = slot(&tree, count, Slot::Static);
    assert_eq!(tree.arena().keyword(stat), Some(Keyword::Static));

    let hp = nth_item(&tree, list, 9);
    assert!(tree.arena().slot(hp, Slot::AccessorColon).is_some());
    let accessors = slot(&tree, hp, Slot::Accessors);
    assert_eq!(
        item_kinds(&tree, accessors),
        vec![NodeKind::GetAccessor, NodeKind::SetAccessor]
    );
}

#[test]
fn inferred_type_leaves_type_empty() {
    let tree = file("const MAX := 10\n");
    let constant = nth_item(&tree, members(&tree), 0);
    assert!(tree.arena().slot(constant, Slot::TypeColon).is_some());
    assert!(tree.arena().slot(constant, Slot::Type).is_none());
    assert_eq!(sexpr(&tree, slot(&tree, constant, Slot::Value)), "10");
}

#[test]
fn accessor_colon_without_type() {
    let tree = file("var hp:\n\tget = get_hp\n");
    assert!(tree.is_well_formed(), "{}", tree.dump());
    let hp = nth_item(&tree, members(&tree), 0);
    assert!(tree.arena().slot(hp, Slot::TypeColon).is_none());
    assert!(tree.arena().slot(hp, Slot::AccessorColon).is_some());
    let get = nth_item(&tree, slot(&tree, hp, Slot::Accessors), 0);
    assert_eq!(sexpr(&tree, slot(&tree, get, Slot::Method)), "get_hp");
}

#[test]
fn method_signature() {
    let tree = file("static func add(a: int, b := 2) -> int:\n\treturn a + b\n");
    assert!(tree.is_well_formed(), "{}", tree.dump());
    let method = nth_item(&tree, members(&tree), 0);
    assert!(tree.arena().slot(method, Slot::Static).is_some());
    let params = slot(&tree, method, Slot::Parameters);
    assert_eq!(tree.arena().items(params).count(), 2);
    let b = nth_item(&tree, params, 1);
    assert_eq!(sexpr(&tree, slot(&tree, b, Slot::Default)), "2");
    assert_eq!(sexpr(&tree, slot(&tree, method, Slot::ReturnType)), "int");
    let body = slot(&tree, method, Slot::Body);
    assert_eq!(item_kinds(&tree, body), vec![NodeKind::ReturnStatement]);
}

#[test]
fn one_line_bodies() {
    let tree = file("func f(): pass\nfunc g(): return 1; pass\n");
    assert!(tree.is_well_formed(), "{}", tree.dump());
    let g = nth_item(&tree, members(&tree), 1);
    assert_eq!(
        item_kinds(&tree, slot(&tree, g, Slot::Body)),
        vec![NodeKind::ReturnStatement, NodeKind::PassStatement]
    );
}

#[test]
fn enum_values() {
    let tree = file("enum { A, B = 2, C }\n");
    let values = slot(&tree, nth_item(&tree, members(&tree), 0), Slot::Values);
    let names: Vec<_> = tree
        .arena()
        .items(values)
        .map(|value| leaf_text(&tree, slot(&tree, value, Slot::Name)).to_owned())
        .collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn inner_class_body_ends_at_dedent() {
    let tree = file("class A:\n\tvar x\n\tfunc f():\n\t\tpass\nvar y\n");
    assert!(tree.is_well_formed(), "{}", tree.dump());
    let list = members(&tree);
    assert_eq!(item_kinds(&tree, list), vec![NodeKind::InnerClass, NodeKind::Variable]);
    let inner = slot(&tree, nth_item(&tree, list, 0), Slot::Members);
    assert_eq!(item_kinds(&tree, inner), vec![NodeKind::Variable, NodeKind::Method]);
}

const STATEMENTS: &str = "\
var a = 1
if a > 0:
\tprint(a)
elif a < 0:
\tpass
else:
\treturn
for i in range(3):
\tcontinue
while true:
\tbreak
match a:
\t1, 2:
\t\tpass
\t[var x, ..] when x > 0:
\t\tpass
\t_:
\t\tbreakpoint
";

#[test]
fn statement_kinds() {
    let tree = statements(STATEMENTS);
    assert!(tree.is_well_formed(), "{}", tree.dump());
    assert_eq!(
        item_kinds(&tree, tree.root()),
        vec![
            NodeKind::VariableDeclaration,
            NodeKind::IfStatement,
            NodeKind::ForStatement,
            NodeKind::WhileStatement,
            NodeKind::MatchStatement,
        ]
    );
}

#[test]
fn elif_and_else_chain() {
    let tree = statements(STATEMENTS);
    let first = nth_item(&tree, tree.root(), 1);
    let elif = slot(&tree, first, Slot::ElseBranch);
    assert_eq!(tree.arena().node_kind(elif), Some(NodeKind::IfStatement));
    assert_eq!(sexpr(&tree, slot(&tree, elif, Slot::Condition)), "(a < 0)");
    let other = slot(&tree, elif, Slot::ElseBranch);
    assert_eq!(tree.arena().node_kind(other), Some(NodeKind::ElseBranch));
    assert_eq!(
        item_kinds(&tree, slot(&tree, other, Slot::Body)),
        vec![NodeKind::ReturnStatement]
    );
}

#[test]
fn for_loop_parts() {
    let tree = statements(STATEMENTS);
    let for_loop = nth_item(&tree, tree.root(), 2);
    assert_eq!(leaf_text(&tree, slot(&tree, for_loop, Slot::Variable)), "i");
    assert_eq!(sexpr(&tree, slot(&tree, for_loop, Slot::Collection)), "range(3)");
}

#[test]
fn match_cases() {
    let tree = statements(STATEMENTS);
    let stmt = nth_item(&tree, tree.root(), 4);
    let cases = slot(&tree, stmt, Slot::Cases);
    let patterns: Vec<_> = tree
        .arena()
        .items(cases)
        .map(|case| sexpr(&tree, slot(&tree, case, Slot::Patterns)))
        .collect();
    assert_eq!(patterns, vec!["1, 2", "[var x, ..]", "_"]);
    let guarded = nth_item(&tree, cases, 1);
    assert_eq!(sexpr(&tree, slot(&tree, guarded, Slot::Guard)), "(x > 0)");
}

#[test]
fn else_without_if_is_invalid() {
    let tree = statements("pass\nelse:\n\tpass\n");
    assert_eq!(tree.text(), "pass\nelse:\n\tpass\n");
    assert!(invalid_texts(&tree).contains(&"else".to_owned()));
}

#[test]
fn repeated_static_is_invalid() {
    let tree = file("static static func f():\n\tpass\n");
    assert_eq!(invalid_texts(&tree), vec!["static".to_owned()]);
    let method = nth_item(&tree, members(&tree), 0);
    assert_eq!(tree.arena().node_kind(method), Some(NodeKind::Method));
    assert!(tree.arena().slot(method, Slot::Static).is_some());
}

#[test]
fn over_indented_line_is_invalid_indentation() {
    let tree = file("func f():\n\tpass\n\t\tpass\n");
    assert_eq!(tree.text(), "func f():\n\tpass\n\t\tpass\n");
    let invalid = tree.invalid_tokens();
    assert_eq!(invalid.len(), 1);
    assert_eq!(tree.arena().leaf_kind(invalid[0]), Some(LeafKind::Invalid));
    assert_eq!(tree.arena().text(invalid[0]), Some("\t\t"));
}

#[test]
fn empty_body_at_end_of_file() {
    let tree = file("func f():\n");
    let method = nth_item(&tree, members(&tree), 0);
    assert!(item_kinds(&tree, slot(&tree, method, Slot::Body)).is_empty());
}

#[test]
fn comments_do_not_end_blocks() {
    let tree = file("func f():\n\tpass\n# note\n\n\tpass\n");
    assert!(tree.is_well_formed(), "{}", tree.dump());
    let method = nth_item(&tree, members(&tree), 0);
    assert_eq!(
        item_kinds(&tree, slot(&tree, method, Slot::Body)),
        vec![NodeKind::PassStatement, NodeKind::PassStatement]
    );
}

#[test]
fn line_continuation_joins_lines() {
    let tree = statements("var total = a + \\\n\tb\n");
    assert!(tree.is_well_formed(), "{}", tree.dump());
    let decl = nth_item(&tree, tree.root(), 0);
    assert_eq!(sexpr(&tree, slot(&tree, decl, Slot::Initializer)), "(a + b)");
}

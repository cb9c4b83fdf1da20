#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Read;

use gds_ir::{LeafKind, OperatorKind, Slot};
use gds_stack::DepthLimit;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

/// Compact, trivia-free rendering of an expression subtree.
pub(crate) fn sexpr(tree: &SyntaxTree, id: TokenId) -> String {
    let arena = tree.arena();
    if arena.leaf_kind(id) == Some(LeafKind::Operator(OperatorKind::NotIn)) {
        return "not in".to_owned();
    }
    if let Some(text) = arena.text(id) {
        return text.to_owned();
    }
    let slot = |slot: Slot| {
        arena
            .slot(id, slot)
            .map_or_else(|| "?".to_owned(), |token| sexpr(tree, token))
    };
    let items = |sep: &str| {
        arena
            .items(id)
            .map(|item| sexpr(tree, item))
            .collect::<Vec<_>>()
            .join(sep)
    };
    match arena.node_kind(id) {
        Some(NodeKind::ExpressionStatement) => slot(Slot::Expression),
        Some(NodeKind::DualOperator) => {
            format!("({} {} {})", slot(Slot::Left), slot(Slot::Operator), slot(Slot::Right))
        }
        Some(NodeKind::SingleOperator) => format!("({} {})", slot(Slot::Operator), slot(Slot::Operand)),
        Some(NodeKind::Await) => format!("(await {})", slot(Slot::Operand)),
        Some(NodeKind::Ternary) => format!(
            "({} if {} else {})",
            slot(Slot::TrueValue),
            slot(Slot::Condition),
            slot(Slot::FalseValue)
        ),
        Some(NodeKind::Parenthesized) => format!("({})", slot(Slot::Inner)),
        Some(NodeKind::Subscript) => format!("[{}]", slot(Slot::Inner)),
        Some(NodeKind::MemberAccess) => format!("{}.{}", slot(Slot::Target), slot(Slot::Member)),
        Some(NodeKind::Call) => format!("{}{}", slot(Slot::Callee), slot(Slot::Arguments)),
        Some(NodeKind::Indexer) => format!("{}{}", slot(Slot::Target), slot(Slot::Subscript)),
        Some(NodeKind::ArgumentsList) => format!("({})", items(", ")),
        Some(NodeKind::ArrayInitializer) => format!("[{}]", items(", ")),
        Some(NodeKind::DictionaryInitializer) => format!("{{{}}}", items(", ")),
        Some(NodeKind::PatternsList) => items(", "),
        Some(NodeKind::KeyValue) if arena.slot(id, Slot::Colon).is_some() => {
            format!("{}: {}", slot(Slot::Key), slot(Slot::Value))
        }
        Some(NodeKind::KeyValue) => format!("{} = {}", slot(Slot::Key), slot(Slot::Value)),
        Some(NodeKind::MatchBinding) => format!("var {}", slot(Slot::Name)),
        Some(kind) => format!("<{kind:?}>"),
        None => "<leaf>".to_owned(),
    }
}

/// Node kinds of the items of `list`.
pub(crate) fn item_kinds(tree: &SyntaxTree, list: TokenId) -> Vec<NodeKind> {
    tree.arena()
        .items(list)
        .filter_map(|item| tree.arena().node_kind(item))
        .collect()
}

/// The token in `slot` of `node`, which must be filled.
pub(crate) fn slot(tree: &SyntaxTree, node: TokenId, slot: Slot) -> TokenId {
    tree.arena()
        .slot(node, slot)
        .unwrap_or_else(|| panic!("{:?} has no {slot}", tree.arena().kind(node)))
}

pub(crate) fn members(tree: &SyntaxTree) -> TokenId {
    slot(tree, tree.root(), Slot::Members)
}

pub(crate) fn invalid_texts(tree: &SyntaxTree) -> Vec<String> {
    tree.invalid_tokens()
        .into_iter()
        .map(|id| tree.render_token(id, RenderMode::Literal))
        .collect()
}

const SCRIPT: &str = "\
@tool
class_name Player extends CharacterBody2D
## Player controller.

signal hit(damage: int)

const SPEED := 300.0

@export var health: int = 100:
\tset(value):
\t\thealth = clamp(value, 0, 100)

var _dir := Vector2.ZERO


func _physics_process(delta: float) -> void:
\tvar input = Input.get_vector(\"left\", \"right\", \"up\", \"down\")
\tif input.length() > 0:  # moving
\t\t_dir = input
\telse:
\t\t_dir = Vector2.ZERO
\tvelocity = _dir * SPEED * delta
\tmove_and_slide()
";

#[test]
fn script_round_trips() {
    let tree = parse(SCRIPT).unwrap();
    assert_eq!(tree.text(), SCRIPT);
    assert!(tree.is_well_formed(), "{}", tree.dump());
}

#[test]
fn file_root_holds_class_members() {
    let tree = parse(SCRIPT).unwrap();
    assert_eq!(tree.arena().node_kind(tree.root()), Some(NodeKind::File));
    assert_eq!(
        item_kinds(&tree, members(&tree)),
        vec![
            NodeKind::Annotation,
            NodeKind::ClassName,
            NodeKind::Extends,
            NodeKind::Signal,
            NodeKind::Constant,
            NodeKind::Annotation,
            NodeKind::Variable,
            NodeKind::Variable,
            NodeKind::Method,
        ]
    );
}

#[test]
fn positions_match_text() {
    let tree = parse(SCRIPT).unwrap();
    let root = tree.root();
    assert_eq!(tree.arena().end(root).offset as usize, SCRIPT.len());
    for leaf in tree.leaves(root) {
        let span = tree.arena().span(leaf);
        assert_eq!(&SCRIPT[span.to_range()], tree.arena().text(leaf).unwrap());
    }
    let method = tree.arena().items(members(&tree)).last().unwrap();
    let start = tree.arena().start(method);
    assert_eq!((start.line, start.column), (15, 0));
}

#[test]
fn token_at_finds_the_leaf() {
    let tree = parse("var speed = 10\n").unwrap();
    let leaf = tree.token_at(5).unwrap();
    assert_eq!(tree.arena().text(leaf), Some("speed"));
}

#[test]
fn empty_and_blank_input() {
    for text in ["", "\n\n", "   \n", "# only a comment"] {
        let tree = parse(text).unwrap();
        assert_eq!(tree.text(), text);
        assert!(tree.is_well_formed());
        assert_eq!(item_kinds(&tree, members(&tree)), vec![]);
    }
}

#[test]
fn garbage_is_kept_as_invalid_text() {
    let text = "var x = )\n??\nfunc f(:\n\tpass\n";
    let tree = parse(text).unwrap();
    assert_eq!(tree.text(), text);
    assert!(!tree.is_well_formed());
    assert!(invalid_texts(&tree).contains(&"??".to_owned()));
}

#[test]
fn statement_entry_hoists_a_single_statement() {
    let parser = Parser::default();
    let tree = parser.parse_statement("return a + b  # done").unwrap();
    assert_eq!(tree.arena().node_kind(tree.root()), Some(NodeKind::ReturnStatement));
    assert_eq!(sexpr(&tree, slot(&tree, tree.root(), Slot::Value)), "(a + b)");
    assert_eq!(tree.text(), "return a + b  # done");

    let tree = parser.parse_statement("a = 1; b = 2").unwrap();
    assert_eq!(tree.arena().node_kind(tree.root()), Some(NodeKind::StatementsList));
    assert_eq!(
        item_kinds(&tree, tree.root()),
        vec![NodeKind::ExpressionStatement, NodeKind::ExpressionStatement]
    );
}

#[test]
fn statements_entry_roots_at_the_list() {
    let tree = Parser::default().parse_statements("pass\nbreak\n").unwrap();
    assert_eq!(
        item_kinds(&tree, tree.root()),
        vec![NodeKind::PassStatement, NodeKind::BreakStatement]
    );
}

#[test]
fn expression_entry_spans_lines() {
    let tree = Parser::default().parse_expression("a +\n  b").unwrap();
    assert_eq!(tree.arena().node_kind(tree.root()), Some(NodeKind::ExpressionStatement));
    assert_eq!(sexpr(&tree, tree.root()), "(a + b)");
    assert!(tree.is_well_formed());
}

#[test]
fn expression_entry_rejects_a_second_expression() {
    let tree = Parser::default().parse_expression("a b").unwrap();
    assert_eq!(tree.text(), "a b");
    assert_eq!(invalid_texts(&tree), vec!["b".to_owned()]);
}

#[test]
fn tabs_and_spaces_indent_alike() {
    let tabs = parse("func f():\n\tif x:\n\t\tpass\n").unwrap();
    let spaces = parse("func f():\n    if x:\n        pass\n").unwrap();
    assert!(tabs.is_well_formed());
    assert!(spaces.is_well_formed());
}

#[test]
fn indentation_size_is_configurable() {
    let text = "func f():\n  if x:\n    pass\n";
    let tree = Parser::new(ParserConfig::default().with_indentation_size(2))
        .parse_file(text)
        .unwrap();
    assert!(tree.is_well_formed(), "{}", tree.dump());
}

#[test]
fn spaces_can_be_excluded_from_indentation() {
    let text = "func f():\n    pass\n";
    let tree = Parser::new(ParserConfig::default().with_spaces_as_indentation(false))
        .parse_file(text)
        .unwrap();
    assert_eq!(tree.text(), text);
    assert!(!tree.is_well_formed());
}

#[test]
fn nesting_beyond_the_reading_stack_fails() {
    let text = format!("var x = {}1{}\n", "(".repeat(100), ")".repeat(100));
    let err = parse(&text).unwrap_err();
    let overflow = err.depth_overflow().unwrap();
    assert_eq!(overflow.limit, DepthLimit::ReadingStack);
    assert_eq!(overflow.max, 64);
}

#[test]
fn long_assignment_chains_hit_the_frame_limit() {
    let text = "a = ".repeat(600) + "a";
    let config = ParserConfig::default().with_max_reading_stack(None);
    let err = Parser::new(config).parse_expression(&text).unwrap_err();
    let overflow = err.depth_overflow().unwrap();
    assert_eq!(overflow.limit, DepthLimit::TraceFrames);
    assert_eq!(overflow.max, 512);
}

#[test]
fn limits_can_be_lifted() {
    let text = format!("var x = {}1{}\n", "(".repeat(100), ")".repeat(100));
    let config = ParserConfig::default().with_max_reading_stack(None);
    let tree = Parser::new(config).parse_file(&text).unwrap();
    assert_eq!(tree.text(), text);
    assert!(tree.is_well_formed());
}

/// Hands out at most `step` bytes per read.
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn reader_matches_string_parse() {
    let text = "var näme := \"ünïcödé\"\nfunc f():\n\treturn näme\n";
    let expected = parse(text).unwrap().dump();
    for chunk in [1, 2, 3, 7, 4096] {
        let config = ParserConfig::default().with_read_buffer_size(chunk);
        let tree = Parser::new(config).parse_reader(text.as_bytes()).unwrap();
        assert_eq!(tree.dump(), expected, "chunk size {chunk}");
    }
    let tree = Parser::default()
        .parse_reader(Trickle {
            data: text.as_bytes(),
            step: 1,
        })
        .unwrap();
    assert_eq!(tree.dump(), expected);
}

#[test]
fn reader_rejects_invalid_utf8() {
    let bytes = b"var x\n\xff\xfe";
    let err = Parser::default().parse_reader(&bytes[..]).unwrap_err();
    assert!(matches!(err, ParseError::InvalidUtf8 { offset: 6 }), "{err}");

    let truncated = "é".as_bytes();
    let err = Parser::default().parse_reader(&truncated[..1]).unwrap_err();
    assert!(matches!(err, ParseError::InvalidUtf8 { offset: 0 }), "{err}");
}

#[test]
fn render_modes() {
    let tree = parse("var a = 1 # note\n").unwrap();
    assert_eq!(tree.render(RenderMode::Literal), "var a = 1 # note\n");
    assert_eq!(tree.to_string(), tree.text());
}

fn unbounded() -> Parser {
    Parser::new(ParserConfig::default().with_max_reading_stack(None))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn any_text_round_trips(text in "[a-z_0-9 \t\n:=+\\-*/()\\[\\]{}.,\"'#@$%<>!&|^~\\\\;]{0,80}") {
        let tree = unbounded().parse_file(&text).unwrap();
        prop_assert_eq!(tree.text(), text.clone());
        let end = tree.arena().end(tree.root());
        prop_assert_eq!(end.offset as usize, text.len());
    }

    #[test]
    fn keyword_soup_round_trips(
        words in prop::collection::vec(
            prop::sample::select(vec![
                "var", "func", "if", "elif", "else", "for", "in", "while", "match", "return",
                "x", "1", ":", "=", "(", ")", "\n", "\t", " ", "static", "class", "enum",
                "{", "}", ",", "not", "and", "await", "get", "set", "when", "..",
            ]),
            0..40,
        )
    ) {
        let text = words.concat();
        let tree = unbounded().parse_file(&text).unwrap();
        prop_assert_eq!(tree.text(), text);
    }
}

/// Every leaf sits at the offset its text occupies in `text`.
fn assert_leaves_in_place(tree: &SyntaxTree, text: &str) {
    for leaf in tree.leaves(tree.root()) {
        let span = tree.arena().span(leaf);
        assert_eq!(&text[span.to_range()], tree.arena().text(leaf).unwrap(), "{}", tree.dump());
    }
}

#[test]
fn text_before_an_expression_is_kept() {
    let parser = Parser::default();
    let cases: [(&str, fn(&Parser, &str) -> ParseResult<SyntaxTree>); 6] = [
        ("var a = .x\n", Parser::parse_file),
        ("return .x\n", Parser::parse_statements),
        ("if .x:\n\tpass\n", Parser::parse_statements),
        ("print(.x)\n", Parser::parse_statements),
        ("return .x", Parser::parse_statement),
        (".x", Parser::parse_expression),
    ];
    for (text, entry) in cases {
        let tree = entry(&parser, text).unwrap();
        assert_eq!(tree.text(), text);
        assert_leaves_in_place(&tree, text);
        assert!(invalid_texts(&tree).contains(&".".to_owned()), "{text:?}\n{}", tree.dump());
    }
}

#[test]
fn leading_invalid_text_stays_before_the_value() {
    let tree = parse("var a = .x + 1\n").unwrap();
    assert_eq!(tree.text(), "var a = .x + 1\n");
    let variable = tree.arena().items(members(&tree)).next().unwrap();
    assert_eq!(sexpr(&tree, slot(&tree, variable, Slot::Initializer)), "(x + 1)");
}

/// Lines of block headers, statements and stray punctuation, each behind a
/// random indentation.
fn script_lines() -> impl Strategy<Value = String> {
    let indent = prop::sample::select(vec!["", "\t", "\t\t", "    ", "  ", "\t "]);
    let line = prop::sample::select(vec![
        "func f(a, b := 1) -> int:",
        "if x:",
        "elif .y:",
        "else:",
        "for i in range(3):",
        "while not done:",
        "match v:",
        "1, [_, ..]:",
        "class Inner extends Node:",
        "var a = .x",
        "@export var b := 2",
        "return -a * (b + 1)",
        "print(.x, y)",
        "pass",
        "x = {\"k\": [1, 2]}",
        "await get_tree().process_frame",
        "var f = func(): return 1",
        ")",
        "]",
        ".",
        ", a",
        ":",
        "* 2",
        "# note",
        "",
    ]);
    let newline = prop::sample::select(vec!["\n", "\r\n"]);
    prop::collection::vec((indent, line, newline), 0..12)
        .prop_map(|lines| lines.into_iter().map(|(i, l, n)| format!("{i}{l}{n}")).collect())
}

fn leaves_in_place(tree: &SyntaxTree, text: &str) -> bool {
    tree.leaves(tree.root()).all(|leaf| {
        let span = tree.arena().span(leaf);
        text.get(span.to_range()) == tree.arena().text(leaf)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn structured_scripts_round_trip_at_every_entry(text in script_lines()) {
        let parser = unbounded();
        let entries: [fn(&Parser, &str) -> ParseResult<SyntaxTree>; 4] = [
            Parser::parse_file,
            Parser::parse_statements,
            Parser::parse_statement,
            Parser::parse_expression,
        ];
        for entry in entries {
            let tree = entry(&parser, &text).unwrap();
            prop_assert_eq!(tree.text(), text.clone());
            prop_assert_eq!(tree.arena().end(tree.root()).offset as usize, text.len());
            prop_assert!(leaves_in_place(&tree, &text), "{}", tree.dump());
        }
    }
}

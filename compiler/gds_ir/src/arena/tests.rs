#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn roles(arena: &TokenArena, node: TokenId) -> Vec<Role> {
    arena.entries(node).iter().map(|e| e.role).collect()
}

// === Leaf validation ===

#[test]
fn test_identifier_validation() {
    let mut arena = TokenArena::new();
    let id = arena.identifier("speed_2").unwrap();
    assert_eq!(arena.text(id), Some("speed_2"));
    assert_eq!(arena.leaf_kind(id), Some(LeafKind::Identifier));

    assert!(matches!(arena.identifier("if"), Err(TokenError::InvalidLiteral { .. })));
    assert!(matches!(arena.identifier("2fast"), Err(TokenError::InvalidLiteral { .. })));
}

#[test]
fn test_number_validation_carries_source() {
    let mut arena = TokenArena::new();
    assert!(arena.number("0x1F").is_ok());
    assert!(arena.number("1_000.5e3").is_ok());
    let err = arena.number("1.2.3").unwrap_err();
    match err {
        TokenError::InvalidLiteral { kind, source, .. } => {
            assert_eq!(kind, LeafKind::Number);
            assert!(source.is_some());
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_string_and_misc_validation() {
    let mut arena = TokenArena::new();
    assert!(arena.string("\"a\\tb\"").is_ok());
    assert!(arena.string("'open").is_err());
    assert!(arena.leaf(LeafKind::NodePath, "$Player/Sprite").is_ok());
    assert!(arena.leaf(LeafKind::NodePath, "%\"Unique Name\"").is_ok());
    assert!(arena.leaf(LeafKind::NodePath, "$").is_err());
    assert!(arena.leaf(LeafKind::Comment, "# note").is_ok());
    assert!(arena.leaf(LeafKind::Comment, "# a\nb").is_err());
    assert!(arena.leaf(LeafKind::Operator(OperatorKind::And), "&&").is_ok());
    assert!(arena.leaf(LeafKind::Operator(OperatorKind::And), "&").is_err());
    assert!(arena.leaf(LeafKind::Invalid, "?!").is_ok());
}

#[test]
fn test_invalidate_keeps_text() {
    let mut arena = TokenArena::new();
    let id = arena.punct(Punct::Colon);
    arena.invalidate(id);
    assert!(arena.kind(id).is_invalid());
    assert_eq!(arena.text(id), Some(":"));
}

// === Slots and items ===

#[test]
fn test_set_slot_keeps_declared_order() {
    let mut arena = TokenArena::new();
    let node = arena.alloc_node(NodeKind::IfStatement);
    let body = arena.alloc_node(NodeKind::StatementsList);
    let cond = arena.identifier("ready").unwrap();
    let kw = arena.keyword_leaf(Keyword::If);

    arena.set_slot(node, Slot::Body, body).unwrap();
    arena.set_slot(node, Slot::Condition, cond).unwrap();
    arena.set_slot(node, Slot::Keyword, kw).unwrap();

    assert_eq!(
        roles(&arena, node),
        vec![Role::Slot(Slot::Keyword), Role::Slot(Slot::Condition), Role::Slot(Slot::Body)]
    );
    assert_eq!(arena.slot(node, Slot::Condition), Some(cond));
    assert_eq!(arena.parent(cond), Some(node));
    assert_eq!(arena.filled_slots(node), 3);
}

#[test]
fn test_set_slot_replaces_and_detaches_previous() {
    let mut arena = TokenArena::new();
    let node = arena.alloc_node(NodeKind::ReturnStatement);
    let first = arena.number("1").unwrap();
    let second = arena.number("2").unwrap();
    assert_eq!(arena.set_slot(node, Slot::Value, first).unwrap(), None);
    assert_eq!(arena.set_slot(node, Slot::Value, second).unwrap(), Some(first));
    assert_eq!(arena.parent(first), None);
    assert_eq!(arena.slot(node, Slot::Value), Some(second));
}

#[test]
fn test_slots_surround_items() {
    let mut arena = TokenArena::new();
    let array = arena.alloc_node(NodeKind::ArrayInitializer);
    let a = arena.number("1").unwrap();
    let b = arena.number("2").unwrap();
    arena.push_item(array, a).unwrap();
    arena.push_item(array, b).unwrap();
    let open = arena.punct(Punct::OpenBracket);
    let close = arena.punct(Punct::CloseBracket);
    arena.set_slot(array, Slot::Close, close).unwrap();
    arena.set_slot(array, Slot::Open, open).unwrap();

    let tokens: Vec<TokenId> = arena.children(array).collect();
    assert_eq!(tokens, vec![open, a, b, close]);
    assert_eq!(arena.items(array).collect::<Vec<_>>(), vec![a, b]);
}

#[test]
fn test_push_rejects_misuse() {
    let mut arena = TokenArena::new();
    let node = arena.alloc_node(NodeKind::PassStatement);
    let leaf = arena.keyword_leaf(Keyword::Pass);
    let other = arena.keyword_leaf(Keyword::Pass);

    arena.push(node, leaf, Role::Slot(Slot::Keyword)).unwrap();
    assert_eq!(
        arena.push(node, other, Role::Slot(Slot::Keyword)),
        Err(TokenError::SlotOccupied { node, slot: Slot::Keyword })
    );
    assert_eq!(
        arena.push(node, other, Role::Slot(Slot::Body)),
        Err(TokenError::UnknownSlot {
            kind: NodeKind::PassStatement,
            slot: Slot::Body
        })
    );
    assert_eq!(arena.push_item(node, other), Err(TokenError::NoItems(NodeKind::PassStatement)));
    assert_eq!(arena.push_extra(leaf, other), Err(TokenError::NotANode(leaf)));
}

#[test]
fn test_cycles_are_rejected() {
    let mut arena = TokenArena::new();
    let outer = arena.alloc_node(NodeKind::Parenthesized);
    let inner = arena.alloc_node(NodeKind::Parenthesized);
    arena.set_slot(outer, Slot::Inner, inner).unwrap();

    assert_eq!(
        arena.set_slot(inner, Slot::Inner, outer),
        Err(TokenError::Cycle { node: inner, token: outer })
    );
    assert_eq!(
        arena.push_extra(outer, outer),
        Err(TokenError::Cycle { node: outer, token: outer })
    );
    assert!(arena.is_ancestor(outer, inner));
    assert!(!arena.is_ancestor(inner, outer));
}

#[test]
fn test_attaching_moves_ownership() {
    let mut arena = TokenArena::new();
    let first = arena.alloc_node(NodeKind::StatementsList);
    let second = arena.alloc_node(NodeKind::StatementsList);
    let stmt = arena.alloc_node(NodeKind::PassStatement);

    arena.push_item(first, stmt).unwrap();
    arena.push_item(second, stmt).unwrap();

    assert_eq!(arena.items(first).count(), 0);
    assert_eq!(arena.items(second).collect::<Vec<_>>(), vec![stmt]);
    assert_eq!(arena.parent(stmt), Some(second));
}

#[test]
fn test_pushing_within_same_form_moves_to_end() {
    let mut arena = TokenArena::new();
    let list = arena.alloc_node(NodeKind::StatementsList);
    let a = arena.alloc_node(NodeKind::PassStatement);
    let b = arena.alloc_node(NodeKind::BreakStatement);
    arena.push_item(list, a).unwrap();
    arena.push_item(list, b).unwrap();
    arena.push_item(list, a).unwrap();
    assert_eq!(arena.children(list).collect::<Vec<_>>(), vec![b, a]);
}

#[test]
fn test_sibling_insertion_roles() {
    let mut arena = TokenArena::new();
    let list = arena.alloc_node(NodeKind::StatementsList);
    let stmt = arena.alloc_node(NodeKind::PassStatement);
    arena.push_item(list, stmt).unwrap();

    let before = arena.alloc_node(NodeKind::BreakStatement);
    arena.insert_before(stmt, before).unwrap();
    let space = arena.space(2);
    let keyword = arena.keyword_leaf(Keyword::Pass);
    arena.set_slot(stmt, Slot::Keyword, keyword).unwrap();
    arena.insert_after(keyword, space).unwrap();

    assert_eq!(arena.children(list).collect::<Vec<_>>(), vec![before, stmt]);
    assert_eq!(arena.role(before), Some(Role::Item));
    assert_eq!(arena.role(space), Some(Role::Extra));

    let loose = arena.space(1);
    let orphan = arena.space(1);
    assert_eq!(arena.insert_after(orphan, loose), Err(TokenError::Detached(orphan)));
}

#[test]
fn test_replace_takes_role() {
    let mut arena = TokenArena::new();
    let node = arena.alloc_node(NodeKind::DualOperator);
    let left = arena.identifier("a").unwrap();
    let op = arena.operator(OperatorKind::Add);
    arena.set_slot(node, Slot::Left, left).unwrap();
    arena.set_slot(node, Slot::Operator, op).unwrap();

    let replacement = arena.identifier("b").unwrap();
    arena.replace(left, replacement).unwrap();
    assert_eq!(arena.slot(node, Slot::Left), Some(replacement));
    assert_eq!(arena.parent(left), None);
    assert_eq!(arena.replace(left, op), Err(TokenError::Detached(left)));
}

#[test]
fn test_clear_slot_and_detach_trailing_extras() {
    let mut arena = TokenArena::new();
    let node = arena.alloc_node(NodeKind::ElseBranch);
    let kw = arena.keyword_leaf(Keyword::Else);
    arena.set_slot(node, Slot::Keyword, kw).unwrap();
    let space = arena.space(1);
    let newline = arena.newline();
    arena.push_extra(node, space).unwrap();
    arena.push_extra(node, newline).unwrap();

    assert_eq!(arena.detach_trailing_extras(node), vec![space, newline]);
    assert_eq!(arena.remove(space), Err(TokenError::Detached(space)));
    assert_eq!(arena.entries(node).len(), 1);
    assert_eq!(arena.clear_slot(node, Slot::Keyword), Some(kw));
    assert!(arena.entries(node).is_empty());
    assert_eq!(arena.detach_trailing_extras(node), Vec::<TokenId>::new());
}

// === Copying ===

#[test]
fn test_import_subtree_is_independent() {
    let mut source = TokenArena::new();
    let call = source.alloc_node(NodeKind::Call);
    let callee = source.identifier("print").unwrap();
    let args = source.alloc_node(NodeKind::ArgumentsList);
    let open = source.punct(Punct::OpenParen);
    let close = source.punct(Punct::CloseParen);
    source.set_slot(call, Slot::Callee, callee).unwrap();
    source.set_slot(call, Slot::Arguments, args).unwrap();
    source.set_slot(args, Slot::Open, open).unwrap();
    source.set_slot(args, Slot::Close, close).unwrap();

    let mut target = TokenArena::new();
    let copy = target.import_subtree(&source, call);
    assert_eq!(target.len(), 5);
    assert_eq!(target.parent(copy), None);
    let copied_args = target.slot(copy, Slot::Arguments).unwrap();
    assert_eq!(target.parent(copied_args), Some(copy));
    assert_eq!(
        target.children(copied_args).filter_map(|t| target.text(t)).collect::<String>(),
        "()"
    );

    let copied_callee = target.slot(copy, Slot::Callee).unwrap();
    target.invalidate(copied_callee);
    assert_eq!(source.leaf_kind(callee), Some(LeafKind::Identifier));
}

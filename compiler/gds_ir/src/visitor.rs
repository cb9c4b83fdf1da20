//! Tree Visitor Pattern
//!
//! Enter/leave traversal over a [`SyntaxTree`].
//!
//! # Design
//!
//! Every node produces an `enter_node` call before its children and a
//! `leave_node` call after them; every leaf produces one `visit_leaf`. The
//! node kind is passed along so visitors can dispatch per construct without
//! looking it up. Returning [`Walk::SkipChildren`] from `enter_node` skips the
//! subtree (its `leave_node` still fires).
//!
//! The walk keeps its own stack instead of recursing.
//!
//! # Example
//!
//! ```text
//! struct CountMethods(usize);
//!
//! impl Visitor for CountMethods {
//!     fn enter_node(&mut self, _: &SyntaxTree, _: TokenId, kind: NodeKind) -> Walk {
//!         if kind == NodeKind::Method {
//!             self.0 += 1;
//!         }
//!         Walk::Continue
//!     }
//! }
//! ```

use crate::{LeafKind, NodeKind, SyntaxTree, TokenId, TokenKind};

/// Whether to descend into a node's children.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Walk {
    #[default]
    Continue,
    SkipChildren,
}

/// Tree visitor. All methods default to doing nothing.
pub trait Visitor {
    fn enter_node(&mut self, _tree: &SyntaxTree, _node: TokenId, _kind: NodeKind) -> Walk {
        Walk::Continue
    }

    fn leave_node(&mut self, _tree: &SyntaxTree, _node: TokenId, _kind: NodeKind) {}

    fn visit_leaf(&mut self, _tree: &SyntaxTree, _leaf: TokenId, _kind: LeafKind) {}
}

enum Event {
    Enter(TokenId),
    Leave(TokenId, NodeKind),
}

/// Walk the subtree rooted at `top`.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, tree: &SyntaxTree, top: TokenId) {
    let arena = tree.arena();
    let mut stack = vec![Event::Enter(top)];
    while let Some(event) = stack.pop() {
        match event {
            Event::Enter(id) => match arena.kind(id) {
                TokenKind::Leaf(kind) => visitor.visit_leaf(tree, id, kind),
                TokenKind::Node(kind) => {
                    stack.push(Event::Leave(id, kind));
                    if visitor.enter_node(tree, id, kind) == Walk::Continue {
                        stack.extend(arena.children(id).rev().map(Event::Enter));
                    }
                }
            },
            Event::Leave(id, kind) => visitor.leave_node(tree, id, kind),
        }
    }
}

/// Walk the whole tree.
pub fn walk_tree<V: Visitor + ?Sized>(visitor: &mut V, tree: &SyntaxTree) {
    walk(visitor, tree, tree.root());
}

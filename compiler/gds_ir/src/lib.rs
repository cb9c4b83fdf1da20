//! GDScript IR - Lossless Concrete Syntax Trees
//!
//! This crate contains the core data structures shared by the GDScript
//! parser and its clients:
//! - Spans and positions for source locations
//! - Token kinds: keywords, punctuation, operators, leaf and node kinds
//! - The token arena holding every token of a tree
//! - Rooted syntax trees with rendering, position and copy operations
//! - Edit descriptions for incremental reparsing
//!
//! # Design Philosophy
//!
//! - **Lossless**: every character of the source lives in exactly one leaf,
//!   so rendering a tree reproduces its text byte for byte
//! - **Flat Storage**: no `Box<Node>` graphs; tokens are `TokenId(u32)`
//!   indices into one arena, parents are plain indices
//! - **Named Slots**: node children are tagged with a [`Role`], so the tree
//!   can be navigated by meaning (`condition`, `body`) rather than position
//!
//! Nothing here recurses on tree depth; arbitrarily deep trees are safe to
//! render, copy and walk.

mod arena;
mod error;
pub mod incremental;
mod kind;
mod span;
mod tree;
pub mod visitor;

pub use arena::{FormEntry, Role, TokenArena, TokenId};
pub use error::TokenError;
pub use incremental::{ChangeMarker, EditBatch, EditError, TextEdit};
pub use kind::{
    Keyword, LeafKind, NodeKind, OperatorKind, Punct, Slot, TokenKind, AWAIT_PRECEDENCE,
    SYMBOLIC_OPERATORS, TERNARY_PRECEDENCE,
};
pub use span::{Position, Span};
pub use tree::{position_subtree, Preorder, RenderMode, SyntaxTree};
pub use visitor::{walk, walk_tree, Visitor, Walk};

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

static_assert_size!(TokenId, 4);
static_assert_size!(Span, 8);
static_assert_size!(Position, 12);

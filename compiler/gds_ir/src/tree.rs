//! Rooted syntax trees.
//!
//! A [`SyntaxTree`] pairs an arena with the token that roots the tree. It
//! renders text, recomputes positions, answers position queries and produces
//! independent copies. Every traversal here is iterative, so trees of any
//! depth are safe to walk.

use std::fmt::{self, Write as _};

use crate::{LeafKind, Position, Role, TokenArena, TokenId, TokenKind};

/// How leaves are rendered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Every byte of every leaf.
    #[default]
    Literal,
    /// Carriage returns omitted.
    Canonical,
}

/// A rooted concrete syntax tree.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    arena: TokenArena,
    root: TokenId,
}

impl SyntaxTree {
    pub fn new(arena: TokenArena, root: TokenId) -> Self {
        SyntaxTree { arena, root }
    }

    #[inline]
    pub fn root(&self) -> TokenId {
        self.root
    }

    #[inline]
    pub fn arena(&self) -> &TokenArena {
        &self.arena
    }

    #[inline]
    pub fn arena_mut(&mut self) -> &mut TokenArena {
        &mut self.arena
    }

    /// Tokens reachable from `top`, parents before children.
    pub fn preorder(&self, top: TokenId) -> Preorder<'_> {
        Preorder {
            arena: &self.arena,
            stack: vec![top],
        }
    }

    /// Leaves reachable from `top`, in text order.
    pub fn leaves(&self, top: TokenId) -> impl Iterator<Item = TokenId> + '_ {
        self.preorder(top).filter(|id| self.arena.kind(*id).is_leaf())
    }

    // === Rendering ===

    /// Write the text of `top` into `out`.
    pub fn write_token(&self, top: TokenId, mode: RenderMode, out: &mut impl fmt::Write) -> fmt::Result {
        for leaf in self.leaves(top) {
            let text = self.arena.text(leaf).unwrap_or_default();
            match mode {
                RenderMode::Literal => out.write_str(text)?,
                RenderMode::Canonical => {
                    if self.arena.leaf_kind(leaf) == Some(LeafKind::CarriageReturn) {
                        continue;
                    }
                    for c in text.chars().filter(|c| *c != '\r') {
                        out.write_char(c)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn render_token(&self, top: TokenId, mode: RenderMode) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_token(top, mode, &mut out);
        out
    }

    pub fn render(&self, mode: RenderMode) -> String {
        self.render_token(self.root, mode)
    }

    /// Literal text of the whole tree.
    pub fn text(&self) -> String {
        self.render(RenderMode::Literal)
    }

    // === Positions ===

    /// Recompute every position, with the root starting at `base`.
    pub fn recompute_positions_from(&mut self, base: Position) -> Position {
        position_subtree(&mut self.arena, self.root, base)
    }

    pub fn recompute_positions(&mut self) -> Position {
        self.recompute_positions_from(Position::START)
    }

    /// Deepest leaf covering byte `offset`.
    pub fn token_at(&self, offset: u32) -> Option<TokenId> {
        let mut current = self.root;
        if !self.arena.span(current).contains(offset) {
            return None;
        }
        'descend: loop {
            for child in self.arena.children(current) {
                if self.arena.span(child).contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Chain from `id` up to the root, `id` first.
    pub fn ancestors(&self, id: TokenId) -> impl Iterator<Item = TokenId> + '_ {
        std::iter::successors(Some(id), |id| self.arena.parent(*id))
    }

    // === Validity ===

    pub fn invalid_tokens(&self) -> Vec<TokenId> {
        self.preorder(self.root)
            .filter(|id| self.arena.kind(*id).is_invalid())
            .collect()
    }

    /// A tree is well-formed when the grammar placed every character.
    pub fn is_well_formed(&self) -> bool {
        !self.preorder(self.root).any(|id| self.arena.kind(id).is_invalid())
    }

    // === Copies ===

    /// An independent tree holding a deep copy of the subtree at `top`.
    ///
    /// Positions keep the coordinates of the source tree.
    pub fn clone_subtree(&self, top: TokenId) -> SyntaxTree {
        let mut arena = TokenArena::with_capacity(64);
        let root = arena.import_subtree(&self.arena, top);
        SyntaxTree { arena, root }
    }

    /// Drop detached tokens left behind by edits.
    pub fn compact(&mut self) {
        *self = self.clone_subtree(self.root);
    }

    // === Debugging ===

    /// Indented outline of the tree: kind, role, span and leaf text.
    ///
    /// Two trees with equal dumps have equal structure, text and positions.
    pub fn dump(&self) -> String {
        self.dump_token(self.root)
    }

    pub fn dump_token(&self, top: TokenId) -> String {
        let mut out = String::new();
        let mut stack: Vec<(TokenId, usize, Option<Role>)> = vec![(top, 0, None)];
        while let Some((id, depth, role)) = stack.pop() {
            for _ in 0..depth {
                out.push_str("  ");
            }
            match role {
                Some(Role::Slot(slot)) => {
                    let _ = write!(out, "{slot}: ");
                }
                Some(Role::Extra) => out.push_str("~ "),
                Some(Role::Item) | None => {}
            }
            let _ = write!(out, "{} {:?}", self.arena.kind(id), self.arena.span(id));
            if let Some(text) = self.arena.text(id) {
                let _ = write!(out, " {text:?}");
            }
            out.push('\n');
            for entry in self.arena.entries(id).iter().rev() {
                stack.push((entry.token, depth + 1, Some(entry.role)));
            }
        }
        out
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_token(self.root, RenderMode::Literal, f)
    }
}

/// Assign positions to the subtree at `top`, starting at `base`.
///
/// Returns the position after the subtree's last character.
pub fn position_subtree(arena: &mut TokenArena, top: TokenId, base: Position) -> Position {
    if let Some(end) = arena.text(top).map(|text| base.advance(text)) {
        arena.set_positions(top, base, end);
        return end;
    }
    let mut pos = base;
    let mut stack: Vec<(TokenId, usize, Position)> = vec![(top, 0, base)];
    while let Some(frame) = stack.last_mut() {
        let (node, index, start) = *frame;
        let Some(entry) = arena.entries(node).get(index).copied() else {
            arena.set_positions(node, start, pos);
            stack.pop();
            continue;
        };
        frame.1 += 1;
        match arena.kind(entry.token) {
            TokenKind::Leaf(_) => {
                let end = pos.advance(arena.text(entry.token).unwrap_or_default());
                arena.set_positions(entry.token, pos, end);
                pos = end;
            }
            TokenKind::Node(_) => stack.push((entry.token, 0, pos)),
        }
    }
    pos
}

/// Preorder traversal over attached tokens.
pub struct Preorder<'a> {
    arena: &'a TokenArena,
    stack: Vec<TokenId>,
}

impl Iterator for Preorder<'_> {
    type Item = TokenId;

    fn next(&mut self) -> Option<TokenId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.arena.children(id).rev());
        Some(id)
    }
}

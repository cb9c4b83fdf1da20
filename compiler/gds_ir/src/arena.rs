//! Token storage.
//!
//! # Architecture
//!
//! All tokens of a tree live in one [`TokenArena`] and are addressed by
//! [`TokenId`]. A node's children are listed in its *form*: an ordered run of
//! [`FormEntry`]s, each tagging a child with its [`Role`]. Concatenating the
//! text of a node's form, in order, reproduces the node's source text.
//!
//! Ownership is strictly single: a token appears in at most one form, and its
//! `parent` field (a plain index, never an owning reference) names that form's
//! node. Every mutation that attaches a token first detaches it from wherever
//! it was.
//!
//! # Key Types
//!
//! - [`TokenArena`]: storage, queries and structural editing
//! - [`TokenId`]: index of a token in its arena
//! - [`Role`]: slot, list item, or extra (trivia, separators, invalid text)

use gds_lexer_core::{is_identifier, is_inline_space, parse_number, string_value, LiteralError};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{Keyword, LeafKind, NodeKind, OperatorKind, Position, Punct, Slot, Span, TokenError, TokenKind};

/// Index of a token in its arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenId(u32);

impl TokenId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    fn from_index(index: usize) -> Self {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "arenas are bounded by u32 source offsets"
        )]
        TokenId(index as u32)
    }
}

/// Role of a child within its parent's form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// A named, fixed position.
    Slot(Slot),
    /// One element of a repeating list.
    Item,
    /// Trivia, separators and invalid text.
    Extra,
}

/// One child of a node, tagged with its role.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FormEntry {
    pub token: TokenId,
    pub role: Role,
}

type Form = SmallVec<[FormEntry; 4]>;

#[derive(Clone, Debug)]
enum Body {
    Leaf(Box<str>),
    Node(Form),
}

#[derive(Clone, Debug)]
struct TokenData {
    kind: TokenKind,
    parent: Option<TokenId>,
    body: Body,
    start: Position,
    end: Position,
}

/// Owner of every token of a tree.
#[derive(Clone, Debug, Default)]
pub struct TokenArena {
    tokens: Vec<TokenData>,
}

// === Queries ===

impl TokenArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TokenArena {
            tokens: Vec::with_capacity(capacity),
        }
    }

    /// Number of allocated tokens, including detached ones.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    fn data(&self, id: TokenId) -> &TokenData {
        &self.tokens[id.index()]
    }

    #[inline]
    fn data_mut(&mut self, id: TokenId) -> &mut TokenData {
        &mut self.tokens[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: TokenId) -> TokenKind {
        self.data(id).kind
    }

    pub fn leaf_kind(&self, id: TokenId) -> Option<LeafKind> {
        match self.kind(id) {
            TokenKind::Leaf(kind) => Some(kind),
            TokenKind::Node(_) => None,
        }
    }

    pub fn node_kind(&self, id: TokenId) -> Option<NodeKind> {
        match self.kind(id) {
            TokenKind::Node(kind) => Some(kind),
            TokenKind::Leaf(_) => None,
        }
    }

    pub fn is_node(&self, id: TokenId) -> bool {
        !self.kind(id).is_leaf()
    }

    /// Text of a leaf; `None` for nodes.
    pub fn text(&self, id: TokenId) -> Option<&str> {
        match &self.data(id).body {
            Body::Leaf(text) => Some(text),
            Body::Node(_) => None,
        }
    }

    /// Keyword of a keyword leaf.
    pub fn keyword(&self, id: TokenId) -> Option<Keyword> {
        match self.kind(id) {
            TokenKind::Leaf(LeafKind::Keyword(kw)) => Some(kw),
            _ => None,
        }
    }

    #[inline]
    pub fn parent(&self, id: TokenId) -> Option<TokenId> {
        self.data(id).parent
    }

    /// A node's form; empty for leaves.
    pub fn entries(&self, id: TokenId) -> &[FormEntry] {
        match &self.data(id).body {
            Body::Node(form) => form,
            Body::Leaf(_) => &[],
        }
    }

    /// Children of a node in form order.
    pub fn children(&self, id: TokenId) -> impl DoubleEndedIterator<Item = TokenId> + '_ {
        self.entries(id).iter().map(|e| e.token)
    }

    /// Occupant of a named slot.
    pub fn slot(&self, node: TokenId, slot: Slot) -> Option<TokenId> {
        self.entries(node)
            .iter()
            .find(|e| e.role == Role::Slot(slot))
            .map(|e| e.token)
    }

    /// List items of a node, in order.
    pub fn items(&self, node: TokenId) -> impl DoubleEndedIterator<Item = TokenId> + '_ {
        self.entries(node)
            .iter()
            .filter(|e| e.role == Role::Item)
            .map(|e| e.token)
    }

    /// Number of occupied slots.
    pub fn filled_slots(&self, node: TokenId) -> usize {
        self.entries(node)
            .iter()
            .filter(|e| matches!(e.role, Role::Slot(_)))
            .count()
    }

    /// Role of `id` within its parent's form.
    pub fn role(&self, id: TokenId) -> Option<Role> {
        let parent = self.parent(id)?;
        self.entries(parent)
            .iter()
            .find(|e| e.token == id)
            .map(|e| e.role)
    }

    /// Is `ancestor` a proper ancestor of `id`?
    pub fn is_ancestor(&self, ancestor: TokenId, id: TokenId) -> bool {
        let mut cursor = self.parent(id);
        while let Some(p) = cursor {
            if p == ancestor {
                return true;
            }
            cursor = self.parent(p);
        }
        false
    }

    pub fn start(&self, id: TokenId) -> Position {
        self.data(id).start
    }

    pub fn end(&self, id: TokenId) -> Position {
        self.data(id).end
    }

    pub fn span(&self, id: TokenId) -> Span {
        let data = self.data(id);
        Span::new(data.start.offset, data.end.offset)
    }

    pub fn set_positions(&mut self, id: TokenId, start: Position, end: Position) {
        let data = self.data_mut(id);
        data.start = start;
        data.end = end;
    }
}

// === Construction ===

impl TokenArena {
    /// Allocate a leaf without validating `text` against `kind`.
    ///
    /// Readers that produce text by construction use this; everything else
    /// should go through [`leaf`](Self::leaf).
    pub fn alloc_leaf(&mut self, kind: LeafKind, text: impl Into<Box<str>>) -> TokenId {
        self.alloc(TokenKind::Leaf(kind), Body::Leaf(text.into()))
    }

    /// Allocate an empty node.
    pub fn alloc_node(&mut self, kind: NodeKind) -> TokenId {
        self.alloc(TokenKind::Node(kind), Body::Node(Form::new()))
    }

    fn alloc(&mut self, kind: TokenKind, body: Body) -> TokenId {
        let id = TokenId::from_index(self.tokens.len());
        self.tokens.push(TokenData {
            kind,
            parent: None,
            body,
            start: Position::START,
            end: Position::START,
        });
        id
    }

    /// Allocate a leaf after checking that `text` is valid for `kind`.
    pub fn leaf(&mut self, kind: LeafKind, text: &str) -> Result<TokenId, TokenError> {
        validate_leaf(kind, text)?;
        Ok(self.alloc_leaf(kind, text))
    }

    pub fn identifier(&mut self, name: &str) -> Result<TokenId, TokenError> {
        self.leaf(LeafKind::Identifier, name)
    }

    pub fn number(&mut self, text: &str) -> Result<TokenId, TokenError> {
        self.leaf(LeafKind::Number, text)
    }

    /// A string leaf from its literal text (quotes included).
    pub fn string(&mut self, text: &str) -> Result<TokenId, TokenError> {
        self.leaf(LeafKind::String, text)
    }

    pub fn keyword_leaf(&mut self, keyword: Keyword) -> TokenId {
        self.alloc_leaf(LeafKind::Keyword(keyword), keyword.as_str())
    }

    pub fn punct(&mut self, punct: Punct) -> TokenId {
        self.alloc_leaf(LeafKind::Punct(punct), punct.as_str())
    }

    /// An operator leaf with its first spelling.
    pub fn operator(&mut self, op: OperatorKind) -> TokenId {
        self.alloc_leaf(LeafKind::Operator(op), op.spellings()[0])
    }

    pub fn space(&mut self, width: usize) -> TokenId {
        self.alloc_leaf(LeafKind::Space, " ".repeat(width))
    }

    pub fn newline(&mut self) -> TokenId {
        self.alloc_leaf(LeafKind::NewLine, "\n")
    }

    /// Turn a leaf into an invalid leaf, keeping its text.
    pub fn invalidate(&mut self, id: TokenId) {
        self.set_leaf_kind(id, LeafKind::Invalid);
    }

    /// Re-kind a leaf without touching its text. No-op on nodes.
    pub fn set_leaf_kind(&mut self, id: TokenId, kind: LeafKind) {
        let data = self.data_mut(id);
        if data.kind.is_leaf() {
            data.kind = TokenKind::Leaf(kind);
        }
    }
}

fn validate_leaf(kind: LeafKind, text: &str) -> Result<(), TokenError> {
    let invalid = |source: Option<LiteralError>| TokenError::InvalidLiteral {
        kind,
        text: text.to_owned(),
        source,
    };
    let ok = match kind {
        LeafKind::Space => !text.is_empty() && text.chars().all(is_inline_space),
        LeafKind::Indentation => text.chars().all(is_inline_space),
        LeafKind::NewLine => text == "\n",
        LeafKind::CarriageReturn => text == "\r",
        LeafKind::Comment => text.starts_with('#') && !text.contains(['\n', '\r']),
        LeafKind::LineContinuation => matches!(text, "\\\n" | "\\\r\n"),
        LeafKind::Identifier => {
            if !is_identifier(text) || Keyword::from_text(text).is_some() {
                return Err(invalid(Some(LiteralError::InvalidIdentifier(text.to_owned()))));
            }
            true
        }
        LeafKind::Keyword(kw) => text == kw.as_str(),
        LeafKind::Number => {
            parse_number(text).map_err(|e| invalid(Some(e)))?;
            true
        }
        LeafKind::String => {
            string_value(text).map_err(|e| invalid(Some(e)))?;
            true
        }
        LeafKind::NodePath => is_node_path(text),
        LeafKind::Punct(p) => text == p.as_str(),
        LeafKind::Operator(op) => op.spellings().contains(&text),
        LeafKind::Invalid => true,
    };
    if ok {
        Ok(())
    } else {
        Err(invalid(None))
    }
}

fn is_node_path(text: &str) -> bool {
    let Some(rest) = text.strip_prefix('$').or_else(|| text.strip_prefix('%')) else {
        return false;
    };
    if rest.starts_with(['"', '\'']) {
        return string_value(rest).is_ok();
    }
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c == '_' || c == '/' || c == '%' || c == '.' || c.is_alphanumeric())
}

// === Structural editing ===

impl TokenArena {
    fn form_mut(&mut self, node: TokenId) -> Result<&mut Form, TokenError> {
        match &mut self.data_mut(node).body {
            Body::Node(form) => Ok(form),
            Body::Leaf(_) => Err(TokenError::NotANode(node)),
        }
    }

    fn check_attach(&self, node: TokenId, token: TokenId, role: Role) -> Result<NodeKind, TokenError> {
        let kind = self.node_kind(node).ok_or(TokenError::NotANode(node))?;
        if node == token || self.is_ancestor(token, node) {
            return Err(TokenError::Cycle { node, token });
        }
        match role {
            Role::Slot(slot) if kind.slot_index(slot).is_none() => Err(TokenError::UnknownSlot { kind, slot }),
            Role::Item if !kind.has_items() => Err(TokenError::NoItems(kind)),
            _ => Ok(kind),
        }
    }

    /// Remove `token` from its parent's form. Returns the role it had.
    pub fn detach(&mut self, token: TokenId) -> Option<Role> {
        let parent = self.parent(token)?;
        self.data_mut(token).parent = None;
        let form = self.form_mut(parent).ok()?;
        let index = form.iter().position(|e| e.token == token)?;
        Some(form.remove(index).role)
    }

    /// Like [`detach`](Self::detach), but a token without a parent is an error.
    pub fn remove(&mut self, token: TokenId) -> Result<Role, TokenError> {
        self.detach(token).ok_or(TokenError::Detached(token))
    }

    fn insert_at(&mut self, node: TokenId, index: usize, token: TokenId, role: Role) -> Result<(), TokenError> {
        self.detach(token);
        let form = self.form_mut(node)?;
        let index = index.min(form.len());
        form.insert(index, FormEntry { token, role });
        self.data_mut(token).parent = Some(node);
        Ok(())
    }

    /// Append `token` to the end of `node`'s form.
    pub fn push(&mut self, node: TokenId, token: TokenId, role: Role) -> Result<(), TokenError> {
        self.check_attach(node, token, role)?;
        if let Role::Slot(slot) = role {
            if self.slot(node, slot).is_some() {
                return Err(TokenError::SlotOccupied { node, slot });
            }
        }
        // Detaching may shorten this very form, so measure afterwards.
        self.detach(token);
        let len = self.entries(node).len();
        self.insert_at(node, len, token, role)
    }

    pub fn push_item(&mut self, node: TokenId, token: TokenId) -> Result<(), TokenError> {
        self.push(node, token, Role::Item)
    }

    pub fn push_extra(&mut self, node: TokenId, token: TokenId) -> Result<(), TokenError> {
        self.push(node, token, Role::Extra)
    }

    /// Put `token` into `slot`, returning the detached previous occupant.
    ///
    /// An empty slot is inserted before the first entry belonging to a later
    /// slot (or to the item list when the kind has one).
    pub fn set_slot(&mut self, node: TokenId, slot: Slot, token: TokenId) -> Result<Option<TokenId>, TokenError> {
        let kind = self.check_attach(node, token, Role::Slot(slot))?;
        self.detach(token);
        let role = Role::Slot(slot);
        if let Some(index) = self.entries(node).iter().position(|e| e.role == role) {
            let previous = self.entries(node)[index].token;
            self.form_mut(node)?[index].token = token;
            self.data_mut(previous).parent = None;
            self.data_mut(token).parent = Some(node);
            return Ok(Some(previous));
        }
        let order = kind.slot_index(slot).unwrap_or(usize::MAX);
        // Items sit between the opening slots and `close`.
        let item_rank = kind.slot_index(Slot::Close).unwrap_or(kind.slots().len());
        let index = self
            .entries(node)
            .iter()
            .position(|e| match e.role {
                Role::Slot(other) => kind.slot_index(other).is_some_and(|o| o > order),
                Role::Item => order < item_rank,
                Role::Extra => false,
            })
            .unwrap_or(self.entries(node).len());
        self.insert_at(node, index, token, role)?;
        Ok(None)
    }

    /// Empty `slot`, returning its former occupant.
    pub fn clear_slot(&mut self, node: TokenId, slot: Slot) -> Option<TokenId> {
        let token = self.slot(node, slot)?;
        self.detach(token);
        Some(token)
    }

    fn sibling_insert(&mut self, anchor: TokenId, token: TokenId, after: bool) -> Result<(), TokenError> {
        let parent = self.parent(anchor).ok_or(TokenError::Detached(anchor))?;
        let anchor_role = self.role(anchor).ok_or(TokenError::Detached(anchor))?;
        let role = if anchor_role == Role::Item { Role::Item } else { Role::Extra };
        self.check_attach(parent, token, role)?;
        self.detach(token);
        let index = self
            .entries(parent)
            .iter()
            .position(|e| e.token == anchor)
            .ok_or(TokenError::Detached(anchor))?;
        self.insert_at(parent, if after { index + 1 } else { index }, token, role)
    }

    /// Insert `token` right before `anchor` in the same form.
    ///
    /// Next to a list item the new token becomes an item; otherwise an extra.
    pub fn insert_before(&mut self, anchor: TokenId, token: TokenId) -> Result<(), TokenError> {
        self.sibling_insert(anchor, token, false)
    }

    /// Insert `token` right after `anchor` in the same form.
    pub fn insert_after(&mut self, anchor: TokenId, token: TokenId) -> Result<(), TokenError> {
        self.sibling_insert(anchor, token, true)
    }

    /// Put `new` where `old` is, with `old`'s role. `old` ends up detached.
    pub fn replace(&mut self, old: TokenId, new: TokenId) -> Result<(), TokenError> {
        let parent = self.parent(old).ok_or(TokenError::Detached(old))?;
        if new == old {
            return Ok(());
        }
        let role = self.role(old).ok_or(TokenError::Detached(old))?;
        if new == parent || self.is_ancestor(new, parent) {
            return Err(TokenError::Cycle { node: parent, token: new });
        }
        self.detach(new);
        let form = self.form_mut(parent)?;
        let index = form
            .iter()
            .position(|e| e.token == old)
            .ok_or(TokenError::Detached(old))?;
        form[index] = FormEntry { token: new, role };
        self.data_mut(old).parent = None;
        self.data_mut(new).parent = Some(parent);
        Ok(())
    }

    /// Detach the extras that follow the last non-extra entry of `node`.
    pub fn detach_trailing_extras(&mut self, node: TokenId) -> Vec<TokenId> {
        let entries = self.entries(node);
        let keep = entries
            .iter()
            .rposition(|e| e.role != Role::Extra)
            .map_or(0, |i| i + 1);
        let trailing: Vec<TokenId> = entries[keep..].iter().map(|e| e.token).collect();
        for &token in &trailing {
            self.detach(token);
        }
        trailing
    }
}

// === Copying ===

impl TokenArena {
    /// Deep-copy the subtree rooted at `top` of `source` into this arena.
    ///
    /// The copy is detached, keeps the source positions and shares nothing
    /// with the original.
    pub fn import_subtree(&mut self, source: &TokenArena, top: TokenId) -> TokenId {
        let mut order = Vec::new();
        let mut stack = vec![top];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(source.children(id).rev());
        }

        let mut map: FxHashMap<TokenId, TokenId> = FxHashMap::default();
        map.reserve(order.len());
        self.tokens.reserve(order.len());
        for &old in &order {
            let data = source.data(old);
            let body = match &data.body {
                Body::Leaf(text) => Body::Leaf(text.clone()),
                Body::Node(_) => Body::Node(Form::new()),
            };
            let new = self.alloc(data.kind, body);
            self.set_positions(new, data.start, data.end);
            map.insert(old, new);
        }

        for &old in &order {
            let Body::Node(form) = &source.data(old).body else {
                continue;
            };
            let parent = map[&old];
            let copied: Form = form
                .iter()
                .map(|e| FormEntry {
                    token: map[&e.token],
                    role: e.role,
                })
                .collect();
            for entry in &copied {
                self.data_mut(entry.token).parent = Some(parent);
            }
            self.data_mut(parent).body = Body::Node(copied);
        }
        map[&top]
    }
}

#[cfg(test)]
mod tests;

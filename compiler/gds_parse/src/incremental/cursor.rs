//! Locating reparse boundaries for a batch of edits.

use std::ops::Range;

use gds_ir::{LeafKind, NodeKind, Role, Span, SyntaxTree, TextEdit, TokenId};
use gds_lexer_core::measure_indentation;

use crate::grammar::BlockKind;
use crate::ParserConfig;

/// A block-list item that can be reparsed on its own.
///
/// An item sharing its line with annotations (or a `class_name`) before it
/// is reparsed together with them, starting at `first`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Candidate {
    /// First list entry of the line run; `item` itself when it starts the line.
    pub first: TokenId,
    pub item: TokenId,
    pub kind: BlockKind,
    pub level: usize,
    /// Span in the coordinates of the unedited text.
    pub span: Span,
}

impl Candidate {
    /// Does `edit` touch this item? The item's end offset counts as inside.
    pub(crate) fn touches(&self, edit: &TextEdit) -> bool {
        edit.offset <= self.span.end && edit.old_end() >= self.span.start
    }

    fn covers(&self, start: u32, end: u32) -> bool {
        self.span.start <= start && end <= self.span.end
    }
}

/// Consecutive edits reparsed together, with the items that may absorb them.
#[derive(Clone, Debug)]
pub(crate) struct Group {
    /// Indices into the sorted edit list.
    pub edits: Range<usize>,
    /// Innermost first.
    pub candidates: Vec<Candidate>,
}

impl Group {
    fn span(&self) -> Span {
        self.candidates.first().map_or_else(Span::default, |c| c.span)
    }
}

/// Split sorted, non-overlapping `edits` into groups with disjoint items.
///
/// Returns `None` when some edit has no enclosing item.
pub(crate) fn plan(tree: &SyntaxTree, config: &ParserConfig, edits: &[TextEdit]) -> Option<Vec<Group>> {
    let mut groups: Vec<Group> = Vec::new();
    let mut next = 0;
    while next < edits.len() {
        let mut first = next;
        let mut last = next;
        let group = loop {
            let start = edits[first].offset;
            let end = edits[last].old_end();
            let mut candidates = candidates(tree, config, start, end);
            // An item that a later edit cuts through cannot absorb it.
            let innermost = candidates.iter().position(|c| {
                edits[last + 1..]
                    .iter()
                    .take_while(|e| e.offset <= c.span.end)
                    .all(|e| e.old_end() <= c.span.end)
            })?;
            candidates.drain(..innermost);
            let span = candidates[0].span;
            while last + 1 < edits.len() && edits[last + 1].offset <= span.end {
                last += 1;
            }
            match groups.last() {
                Some(previous) if previous.span().end >= span.start => {
                    first = previous.edits.start;
                    groups.pop();
                }
                _ => {
                    break Group {
                        edits: first..last + 1,
                        candidates,
                    }
                }
            }
        };
        next = group.edits.end;
        groups.push(group);
    }
    Some(groups)
}

/// Items enclosing `[start, end]`, innermost first.
pub(crate) fn candidates(tree: &SyntaxTree, config: &ParserConfig, start: u32, end: u32) -> Vec<Candidate> {
    let arena = tree.arena();
    let mut path = Vec::new();
    let mut current = tree.root();
    'descend: loop {
        for child in arena.children(current) {
            let span = arena.span(child);
            if arena.is_node(child) && span.start <= start && end <= span.end {
                path.push(child);
                current = child;
                continue 'descend;
            }
        }
        break;
    }
    path.iter()
        .rev()
        .filter_map(|&item| candidate(tree, config, item))
        .filter(|c| c.covers(start, end))
        .collect()
}

/// `item` as a reparse boundary, if it starts a line of its block.
fn candidate(tree: &SyntaxTree, config: &ParserConfig, item: TokenId) -> Option<Candidate> {
    let arena = tree.arena();
    if arena.role(item) != Some(Role::Item) {
        return None;
    }
    let list = arena.parent(item)?;
    let kind = BlockKind::from_list(arena.node_kind(list)?)?;
    // Lambda bodies read their lines inside an expression.
    if tree
        .ancestors(list)
        .any(|id| arena.node_kind(id) == Some(NodeKind::Lambda))
    {
        return None;
    }
    let entries = arena.entries(list);
    let index = run_start(tree, list, entries.iter().position(|e| e.token == item)?);
    let first = entries[index].token;
    let previous = index.checked_sub(1).map(|i| entries[i].token);
    let root = list == tree.root()
        || arena
            .parent(list)
            .is_some_and(|parent| arena.node_kind(parent) == Some(NodeKind::File));
    let level = match previous {
        None if root => 0,
        Some(previous) if root && arena.leaf_kind(previous) == Some(LeafKind::NewLine) => 0,
        Some(previous) if !root && arena.leaf_kind(previous) == Some(LeafKind::Indentation) => {
            let measured = measure_indentation(
                arena.text(previous)?,
                config.indentation_size,
                config.spaces_as_indentation,
            );
            if !measured.exact {
                return None;
            }
            measured.units
        }
        _ => return None,
    };
    Some(Candidate {
        first,
        item,
        kind,
        level,
        span: Span::new(arena.start(first).offset, arena.end(item).offset),
    })
}

/// Index of the first entry of the same-line run ending at entry `index`.
///
/// Annotations and `class_name` leave the line open for the next item, so
/// `@export var speed` reads as one run.
fn run_start(tree: &SyntaxTree, list: TokenId, mut index: usize) -> usize {
    let arena = tree.arena();
    let entries = arena.entries(list);
    loop {
        let mut before = index;
        while before > 0 && arena.leaf_kind(entries[before - 1].token) == Some(LeafKind::Space) {
            before -= 1;
        }
        let opener = before
            .checked_sub(1)
            .map(|i| entries[i])
            .filter(|e| e.role == Role::Item)
            .and_then(|e| arena.node_kind(e.token));
        match opener {
            Some(NodeKind::Annotation | NodeKind::ClassName) => index = before - 1,
            _ => return index,
        }
    }
}

/// Is there invalid text between `item` and the next item of its list?
///
/// Such text may belong to the item once it changes, e.g. an `else` that
/// could not attach before.
pub(crate) fn followed_by_invalid(tree: &SyntaxTree, item: TokenId) -> bool {
    let arena = tree.arena();
    let Some(list) = arena.parent(item) else {
        return false;
    };
    arena
        .entries(list)
        .iter()
        .skip_while(|e| e.token != item)
        .skip(1)
        .take_while(|e| e.role != Role::Item)
        .any(|e| arena.kind(e.token).is_invalid())
}

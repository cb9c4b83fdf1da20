//! Reparsing one item and splicing it into the tree.

use gds_ir::{position_subtree, EditBatch, FormEntry, Position, RenderMode, Role, SyntaxTree, TextEdit, TokenId};
use gds_lexer_core::is_inline_space;
use tracing::debug;

use super::cursor::{followed_by_invalid, Candidate};
use crate::grammar::BlockState;
use crate::{ParseResult, Parser};

/// Reparse `candidate` with `edits` applied and splice the result in.
///
/// Returns the number of items the new subtrees hold, or `None` when the
/// item cannot be reparsed on its own.
pub(crate) fn reparse_item(
    parser: &Parser,
    tree: &mut SyntaxTree,
    candidate: &Candidate,
    edits: &[TextEdit],
) -> ParseResult<Option<usize>> {
    let item = candidate.item;
    let Some(old_run) = run_entries(tree, candidate) else {
        return Ok(None);
    };
    let base = tree.arena().start(candidate.first);
    let old_end = tree.arena().end(item);

    if followed_by_invalid(tree, item) {
        debug!(item = ?item, "invalid text follows the item");
        return Ok(None);
    }

    let old_text: String = old_run
        .iter()
        .map(|e| tree.render_token(e.token, RenderMode::Literal))
        .collect();
    let local: Vec<TextEdit> = edits
        .iter()
        .map(|e| TextEdit::new(e.offset - base.offset, e.removed, e.inserted.clone()))
        .collect();
    let text = match EditBatch::new(&local).and_then(|batch| batch.apply(&old_text)) {
        Ok(text) => text,
        Err(e) => {
            debug!(error = %e, "edits do not fit the item");
            return Ok(None);
        }
    };
    // Leading space would change the line's indentation.
    if text.starts_with(is_inline_space) {
        debug!("edit reaches into the item's indentation");
        return Ok(None);
    }

    let parsed = parser.run(
        |cx| BlockState::single(cx, candidate.kind, candidate.level),
        |reader| reader.feed(&text),
    )?;
    if parsed.truncated || parsed.escaped {
        debug!(
            truncated = parsed.truncated,
            escaped = parsed.escaped,
            "item reparse leaks past its text"
        );
        return Ok(None);
    }
    let output = &parsed.output;
    if !output.leading.is_empty()
        || !output.trailing.is_empty()
        || output.handback.is_some()
        || output.line.is_some()
    {
        debug!("item reparse left text outside the item");
        return Ok(None);
    }
    let Some(list) = output.token else {
        return Ok(None);
    };
    let new_run = parsed.arena.entries(list);
    let same_shape = new_run.len() == old_run.len()
        && old_run.iter().zip(new_run).all(|(old, new)| {
            old.role == new.role
                && !parsed.arena.kind(new.token).is_invalid()
                && (old.role != Role::Item
                    || tree.arena().node_kind(old.token) == parsed.arena.node_kind(new.token))
        });
    if !same_shape {
        debug!(
            old = old_run.len(),
            new = new_run.len(),
            "item reparse changed the run's entries or kinds"
        );
        return Ok(None);
    }

    let arena = tree.arena_mut();
    let mut placed = Vec::with_capacity(new_run.len());
    let mut new_end = base;
    for (old, new) in old_run.iter().zip(new_run) {
        let token = arena.import_subtree(&parsed.arena, new.token);
        new_end = position_subtree(arena, token, new_end);
        arena.replace(old.token, token)?;
        placed.push(token);
    }
    shift_after(tree, &placed, old_end, new_end);
    debug!(
        start = base.offset,
        old_end = old_end.offset,
        new_end = new_end.offset,
        entries = placed.len(),
        "item reparsed"
    );
    Ok(Some(placed.iter().map(|&token| count_items(tree, token)).sum()))
}

/// List entries from `candidate.first` through `candidate.item`.
fn run_entries(tree: &SyntaxTree, candidate: &Candidate) -> Option<Vec<FormEntry>> {
    let arena = tree.arena();
    let entries = arena.entries(arena.parent(candidate.item)?);
    let from = entries.iter().position(|e| e.token == candidate.first)?;
    let to = entries.iter().position(|e| e.token == candidate.item)?;
    entries.get(from..=to).map(<[FormEntry]>::to_vec)
}

/// Move every position at or after `old_end` so that `old_end` lands on
/// `new_end`. The subtrees in `skip` are already positioned.
fn shift_after(tree: &mut SyntaxTree, skip: &[TokenId], old_end: Position, new_end: Position) {
    if old_end == new_end {
        return;
    }
    let root = tree.root();
    let arena = tree.arena_mut();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if skip.contains(&id) {
            continue;
        }
        let start = shifted(arena.start(id), old_end, new_end);
        let end = shifted(arena.end(id), old_end, new_end);
        arena.set_positions(id, start, end);
        stack.extend(arena.children(id));
    }
}

pub(super) fn shifted(pos: Position, old_end: Position, new_end: Position) -> Position {
    if pos.offset < old_end.offset {
        return pos;
    }
    let column = if pos.line == old_end.line {
        pos.column - old_end.column + new_end.column
    } else {
        pos.column
    };
    Position {
        offset: pos.offset - old_end.offset + new_end.offset,
        line: pos.line - old_end.line + new_end.line,
        column,
    }
}

/// Block-list items in the subtree at `top`, `top` included.
pub(crate) fn count_items(tree: &SyntaxTree, top: TokenId) -> usize {
    let arena = tree.arena();
    tree.preorder(top)
        .filter(|&id| {
            arena.role(id) == Some(Role::Item)
                && arena
                    .parent(id)
                    .and_then(|parent| arena.node_kind(parent))
                    .is_some_and(|kind| kind.is_block_list())
        })
        .count()
}

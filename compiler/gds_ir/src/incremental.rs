//! Incremental Parsing Support
//!
//! Types describing text edits and the source regions they invalidate.
//!
//! # Architecture
//!
//! 1. **Text Edit** - one replacement `[offset, offset + removed)` → `inserted`,
//!    in coordinates of the text *before* the whole batch
//! 2. **Edit Batch** - a validated, offset-ordered set of edits that can be
//!    applied to text and tells how far each old offset moves
//! 3. **Change Marker** - the merged affected region of a group of edits,
//!    with the position adjustment for everything after it

use crate::Span;

/// A single text edit.
///
/// # Examples
///
/// ```
/// use gds_ir::incremental::TextEdit;
///
/// let edit = TextEdit::replace(8, 1, "100");
/// assert_eq!(edit.old_end(), 9);
/// assert_eq!(edit.delta(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextEdit {
    /// Start byte offset in the pre-batch text.
    pub offset: u32,
    /// Number of bytes removed.
    pub removed: u32,
    /// Replacement text.
    pub inserted: String,
}

impl TextEdit {
    pub fn new(offset: u32, removed: u32, inserted: impl Into<String>) -> Self {
        TextEdit {
            offset,
            removed,
            inserted: inserted.into(),
        }
    }

    /// Insert `text` at `at`.
    pub fn insert(at: u32, text: impl Into<String>) -> Self {
        Self::new(at, 0, text)
    }

    /// Delete `len` bytes starting at `start`.
    pub fn delete(start: u32, len: u32) -> Self {
        Self::new(start, len, String::new())
    }

    /// Replace `len` bytes starting at `start` with `text`.
    pub fn replace(start: u32, len: u32, text: impl Into<String>) -> Self {
        Self::new(start, len, text)
    }

    /// End byte offset of the removed region (exclusive).
    ///
    /// Saturates at `u32::MAX`; [`EditBatch::new`] rejects such edits.
    #[inline]
    pub fn old_end(&self) -> u32 {
        self.offset.saturating_add(self.removed)
    }

    #[inline]
    pub fn new_len(&self) -> u32 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "inserted text is bounded by u32 source offsets"
        )]
        {
            self.inserted.len() as u32
        }
    }

    /// Net change in document length (positive = grew, negative = shrank).
    #[inline]
    pub fn delta(&self) -> i64 {
        i64::from(self.new_len()) - i64::from(self.removed)
    }

    /// Does this edit touch any byte of `span` (or sit inside it)?
    #[inline]
    pub fn intersects(&self, span: Span) -> bool {
        self.offset < span.end && span.start < self.old_end()
    }

    /// Check if a span is entirely before this edit.
    #[inline]
    pub fn is_before(&self, span: Span) -> bool {
        span.end <= self.offset
    }

    /// Check if a span is entirely after this edit.
    #[inline]
    pub fn is_after(&self, span: Span) -> bool {
        span.start >= self.old_end()
    }
}

/// Why an edit batch cannot be applied.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("edits starting at {first} and {second} overlap")]
    Overlapping { first: u32, second: u32 },
    #[error("edit {start}..{end} lies outside the {len}-byte text")]
    OutOfBounds { start: u32, end: u32, len: usize },
    #[error("edit boundary {0} splits a character")]
    NotCharBoundary(u32),
    #[error("edit at {offset} removing {removed} bytes ends beyond the largest offset")]
    Overflow { offset: u32, removed: u32 },
}

/// A validated set of edits, ordered by offset.
///
/// Edits may be supplied in any order; all offsets refer to the text before
/// the batch. Insertions at the same offset keep their supplied order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditBatch {
    edits: Vec<TextEdit>,
}

impl EditBatch {
    pub fn new(edits: &[TextEdit]) -> Result<Self, EditError> {
        if let Some(edit) = edits.iter().find(|e| e.offset.checked_add(e.removed).is_none()) {
            return Err(EditError::Overflow {
                offset: edit.offset,
                removed: edit.removed,
            });
        }
        let mut edits = edits.to_vec();
        edits.sort_by_key(|e| e.offset);
        for pair in edits.windows(2) {
            if pair[0].old_end() > pair[1].offset {
                return Err(EditError::Overlapping {
                    first: pair[0].offset,
                    second: pair[1].offset,
                });
            }
        }
        Ok(EditBatch { edits })
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextEdit> {
        self.edits.iter()
    }

    /// Net change in document length.
    pub fn delta(&self) -> i64 {
        self.edits.iter().map(TextEdit::delta).sum()
    }

    /// Shift applied to an old offset by the edits that end at or before it.
    pub fn delta_before(&self, offset: u32) -> i64 {
        self.edits
            .iter()
            .filter(|e| e.old_end() <= offset && e.offset < offset)
            .map(TextEdit::delta)
            .sum()
    }

    /// Apply the batch to `old`.
    pub fn apply(&self, old: &str) -> Result<String, EditError> {
        let grown = usize::try_from(self.delta().max(0)).unwrap_or(0);
        let mut out = String::with_capacity(old.len() + grown);
        let mut cursor = 0usize;
        for edit in &self.edits {
            let start = edit.offset as usize;
            let end = edit.old_end() as usize;
            if end > old.len() {
                return Err(EditError::OutOfBounds {
                    start: edit.offset,
                    end: edit.old_end(),
                    len: old.len(),
                });
            }
            for boundary in [edit.offset, edit.old_end()] {
                if !old.is_char_boundary(boundary as usize) {
                    return Err(EditError::NotCharBoundary(boundary));
                }
            }
            out.push_str(&old[cursor..start]);
            out.push_str(&edit.inserted);
            cursor = end;
        }
        out.push_str(&old[cursor..]);
        Ok(out)
    }

    /// Merged affected region of the whole batch.
    pub fn marker(&self) -> Option<ChangeMarker> {
        ChangeMarker::covering(&self.edits)
    }
}

/// Tracks which spans are affected by a group of edits.
///
/// Spans that intersect the affected region must be reparsed. Spans entirely
/// before it are reused unchanged; spans entirely after it are reused with
/// their positions shifted by `delta`.
///
/// # Examples
///
/// ```
/// use gds_ir::incremental::{ChangeMarker, TextEdit};
///
/// let marker = ChangeMarker::covering(&[TextEdit::replace(100, 10, "x".repeat(15))]).unwrap();
/// assert_eq!(marker.adjust_position(50), 50);
/// assert_eq!(marker.adjust_position(200), 205);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChangeMarker {
    /// Start of the affected region in the old text.
    pub affected_start: u32,
    /// End of the affected region in the old text.
    pub affected_end: u32,
    /// Position adjustment for positions after the affected region.
    pub delta: i64,
}

impl ChangeMarker {
    #[inline]
    pub const fn new(affected_start: u32, affected_end: u32, delta: i64) -> Self {
        ChangeMarker {
            affected_start,
            affected_end,
            delta,
        }
    }

    /// Smallest region covering every edit in `edits`.
    pub fn covering(edits: &[TextEdit]) -> Option<Self> {
        let start = edits.iter().map(|e| e.offset).min()?;
        let end = edits.iter().map(TextEdit::old_end).max()?;
        Some(ChangeMarker {
            affected_start: start,
            affected_end: end,
            delta: edits.iter().map(TextEdit::delta).sum(),
        })
    }

    /// Grow the region to also cover `other`.
    #[must_use]
    pub fn merge(&self, other: &ChangeMarker) -> ChangeMarker {
        ChangeMarker {
            affected_start: self.affected_start.min(other.affected_start),
            affected_end: self.affected_end.max(other.affected_end),
            delta: self.delta + other.delta,
        }
    }

    #[inline]
    pub fn intersects(&self, span: Span) -> bool {
        self.affected_start < span.end && span.start < self.affected_end
    }

    /// Is the affected region inside `span` (boundaries included)?
    #[inline]
    pub fn within(&self, span: Span) -> bool {
        span.start <= self.affected_start && self.affected_end <= span.end
    }

    #[inline]
    pub fn is_before(&self, span: Span) -> bool {
        span.end <= self.affected_start
    }

    #[inline]
    pub fn is_after(&self, span: Span) -> bool {
        span.start >= self.affected_end
    }

    /// Adjust a position from old text to new text.
    ///
    /// Positions inside the affected region have no counterpart and are
    /// returned unchanged for the caller to handle.
    #[inline]
    pub fn adjust_position(&self, pos: u32) -> u32 {
        if pos < self.affected_start || (pos < self.affected_end && pos >= self.affected_start) {
            pos
        } else {
            #[allow(
                clippy::cast_sign_loss,
                clippy::cast_possible_truncation,
                reason = "Bounds-checked: delta computed from u32 values"
            )]
            {
                (i64::from(pos) + self.delta) as u32
            }
        }
    }

    /// Adjust a span from old text to new text, or `None` when it must be
    /// reparsed.
    #[inline]
    pub fn adjust_span(&self, span: Span) -> Option<Span> {
        if self.intersects(span) {
            None
        } else {
            Some(Span::new(
                self.adjust_position(span.start),
                self.adjust_position(span.end),
            ))
        }
    }
}

#[cfg(test)]
mod tests;

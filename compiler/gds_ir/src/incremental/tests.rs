#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

#[test]
fn test_edit_constructors() {
    let insert = TextEdit::insert(10, "hello");
    assert_eq!(insert.old_end(), 10);
    assert_eq!(insert.delta(), 5);

    let delete = TextEdit::delete(5, 3);
    assert_eq!(delete.old_end(), 8);
    assert_eq!(delete.delta(), -3);

    let replace = TextEdit::replace(0, 3, "hello");
    assert_eq!(replace.new_len(), 5);
    assert_eq!(replace.delta(), 2);
}

#[test]
fn test_edit_relations() {
    let edit = TextEdit::replace(10, 5, "x");
    assert!(edit.intersects(Span::new(12, 20)));
    assert!(edit.intersects(Span::new(0, 11)));
    assert!(!edit.intersects(Span::new(0, 10)));
    assert!(!edit.intersects(Span::new(15, 20)));
    assert!(edit.is_before(Span::new(0, 10)));
    assert!(edit.is_after(Span::new(15, 20)));
}

#[test]
fn test_batch_sorts_edits() {
    let batch = EditBatch::new(&[TextEdit::replace(18, 1, "200"), TextEdit::replace(8, 1, "100")]).unwrap();
    let offsets: Vec<u32> = batch.iter().map(|e| e.offset).collect();
    assert_eq!(offsets, vec![8, 18]);
    assert_eq!(batch.delta(), 4);
}

#[test]
fn test_batch_applies_in_old_coordinates() {
    let old = "var a = 1\nvar b = 2\nvar c = 3\n";
    let batch = EditBatch::new(&[TextEdit::replace(8, 1, "100"), TextEdit::replace(18, 1, "200")]).unwrap();
    assert_eq!(batch.apply(old).unwrap(), "var a = 100\nvar b = 200\nvar c = 3\n");
}

#[test]
fn test_batch_rejects_overlap() {
    let err = EditBatch::new(&[TextEdit::replace(0, 5, "a"), TextEdit::replace(3, 1, "b")]).unwrap_err();
    assert_eq!(err, EditError::Overlapping { first: 0, second: 3 });
}

#[test]
fn test_adjacent_edits_do_not_overlap() {
    let batch = EditBatch::new(&[TextEdit::replace(0, 2, "x"), TextEdit::insert(2, "y")]).unwrap();
    assert_eq!(batch.apply("abcd").unwrap(), "xycd");
}

#[test]
fn test_batch_out_of_bounds() {
    let batch = EditBatch::new(&[TextEdit::delete(2, 10)]).unwrap();
    assert!(matches!(batch.apply("abc"), Err(EditError::OutOfBounds { .. })));
}

#[test]
fn test_batch_rejects_offset_overflow() {
    let edit = TextEdit::replace(u32::MAX, 2, "");
    assert_eq!(edit.old_end(), u32::MAX);
    assert!(!edit.intersects(Span::new(0, 10)));
    let err = EditBatch::new(&[TextEdit::insert(0, "a"), edit]).unwrap_err();
    assert_eq!(err, EditError::Overflow { offset: u32::MAX, removed: 2 });
}

#[test]
fn test_batch_char_boundary() {
    let batch = EditBatch::new(&[TextEdit::delete(1, 1)]).unwrap();
    assert_eq!(batch.apply("é"), Err(EditError::NotCharBoundary(1)));
}

#[test]
fn test_delta_before() {
    let batch = EditBatch::new(&[TextEdit::replace(8, 1, "100"), TextEdit::replace(18, 1, "200")]).unwrap();
    assert_eq!(batch.delta_before(0), 0);
    assert_eq!(batch.delta_before(9), 2);
    assert_eq!(batch.delta_before(19), 4);
}

#[test]
fn test_empty_batch() {
    let batch = EditBatch::new(&[]).unwrap();
    assert!(batch.is_empty());
    assert_eq!(batch.marker(), None);
    assert_eq!(batch.apply("text").unwrap(), "text");
}

#[test]
fn test_marker_adjusts_positions() {
    let marker = ChangeMarker::covering(&[TextEdit::replace(100, 10, "x".repeat(15))]).unwrap();
    assert_eq!(marker.adjust_position(50), 50);
    assert_eq!(marker.adjust_position(105), 105);
    assert_eq!(marker.adjust_position(110), 115);
    assert_eq!(marker.adjust_span(Span::new(200, 210)), Some(Span::new(205, 215)));
    assert_eq!(marker.adjust_span(Span::new(90, 101)), None);
}

#[test]
fn test_marker_merge_and_within() {
    let a = ChangeMarker::new(10, 12, 1);
    let b = ChangeMarker::new(20, 25, -2);
    let merged = a.merge(&b);
    assert_eq!(merged, ChangeMarker::new(10, 25, -1));
    assert!(merged.within(Span::new(0, 30)));
    assert!(!merged.within(Span::new(11, 30)));
    assert!(merged.is_before(Span::new(0, 10)));
    assert!(merged.is_after(Span::new(30, 40)));
}

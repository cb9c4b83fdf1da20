//! Source locations.
//!
//! Offsets are byte offsets into the source text. Lines and columns are
//! zero-based; columns count characters, not bytes.

use std::fmt;

/// Byte range `[start, end)` in the source text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create a point span (zero-length).
    #[inline]
    pub const fn point(offset: u32) -> Span {
        Span {
            start: offset,
            end: offset,
        }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if an offset is within this span.
    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Check if another span is fully contained within this span.
    #[inline]
    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Merge two spans to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Convert to a `std::ops::Range`.
    #[inline]
    pub fn to_range(self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A point in the source: byte offset plus line and column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position {
        offset: 0,
        line: 0,
        column: 0,
    };

    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }

    /// The position reached after reading `text` from here.
    #[must_use]
    pub fn advance(self, text: &str) -> Position {
        let mut pos = self;
        for c in text.chars() {
            pos.advance_char(c);
        }
        pos
    }

    #[inline]
    pub fn advance_char(&mut self, c: char) {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "char::len_utf8 is at most 4"
        )]
        {
            self.offset += c.len_utf8() as u32;
        }
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.offset, self.line, self.column)
    }
}

/// One-based `line:column`, the way editors print locations.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let span = Span::new(10, 20);
        assert_eq!(span.len(), 10);
        assert!(span.contains(10));
        assert!(!span.contains(20));
        assert!(span.contains_span(Span::new(12, 20)));
        assert_eq!(span.merge(Span::new(5, 12)), Span::new(5, 20));
        assert!(Span::point(3).is_empty());
    }

    #[test]
    fn advance_counts_lines_and_chars() {
        let pos = Position::START.advance("ab\ncé");
        assert_eq!(pos, Position::new(6, 1, 2));
        assert_eq!(pos.to_string(), "2:3");
    }
}

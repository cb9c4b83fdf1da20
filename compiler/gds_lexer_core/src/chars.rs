//! Character classes shared by the scanners and the reading automaton.

/// Can `c` start an identifier or keyword?
#[inline]
pub fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Can `c` continue an identifier or keyword?
#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Horizontal whitespace that separates tokens within a line.
#[inline]
pub fn is_inline_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{0b}' | '\u{0c}')
}

/// Is `text` a single, complete identifier?
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if is_ident_start(first) => chars.all(is_ident_continue),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_identifier("_ready"));
        assert!(is_identifier("Node2D"));
        assert!(is_identifier("переменная"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2d"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier("a b"));
    }

    #[test]
    fn inline_space() {
        assert!(is_inline_space(' '));
        assert!(is_inline_space('\t'));
        assert!(!is_inline_space('\n'));
        assert!(!is_inline_space('\r'));
    }
}

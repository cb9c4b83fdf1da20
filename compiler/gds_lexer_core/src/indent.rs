//! Indentation measurement.

/// Indentation of a line, in units.
///
/// A unit is one tab, or (when spaces count as indentation) one group of
/// `size` spaces. A trailing partial group rounds up and marks the level
/// inexact, so a half-indented line still compares as "deeper".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IndentLevel {
    pub units: usize,
    pub exact: bool,
}

impl IndentLevel {
    pub const ZERO: IndentLevel = IndentLevel { units: 0, exact: true };
}

/// Measure the leading whitespace `text` of a line.
///
/// With `spaces_as_indentation` off, spaces contribute nothing and any space
/// makes the level inexact.
pub fn measure_indentation(text: &str, size: usize, spaces_as_indentation: bool) -> IndentLevel {
    let mut tabs: usize = 0;
    let mut spaces: usize = 0;
    for c in text.chars() {
        match c {
            '\t' => tabs += 1,
            _ => spaces += 1,
        }
    }
    if !spaces_as_indentation || size == 0 {
        return IndentLevel {
            units: tabs,
            exact: spaces == 0,
        };
    }
    IndentLevel {
        units: tabs + spaces.div_ceil(size),
        exact: spaces % size == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_and_space_groups_are_equivalent() {
        assert_eq!(measure_indentation("\t\t", 4, true), measure_indentation("        ", 4, true));
        assert_eq!(
            measure_indentation("\t    ", 4, true),
            IndentLevel { units: 2, exact: true }
        );
    }

    #[test]
    fn partial_group_rounds_up_and_is_inexact() {
        assert_eq!(
            measure_indentation("      ", 4, true),
            IndentLevel { units: 2, exact: false }
        );
        assert_eq!(
            measure_indentation("  ", 2, true),
            IndentLevel { units: 1, exact: true }
        );
    }

    #[test]
    fn spaces_ignored_when_disabled() {
        assert_eq!(
            measure_indentation("\t  ", 4, false),
            IndentLevel { units: 1, exact: false }
        );
        assert_eq!(measure_indentation("", 4, false), IndentLevel::ZERO);
    }
}

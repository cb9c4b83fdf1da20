//! Incremental reparse of one file version into the next.
//!
//! The edit between the two versions is recovered as a single replacement
//! covering everything between their common prefix and common suffix. The
//! incremental result is checked against a fresh parse of the new text.

use std::fmt;

use gds_parse::{ReparseStats, Reparser, TextEdit};

use super::{read_file, CliOptions};

/// Outcome of reparsing one version into the next.
#[derive(Clone, Debug, PartialEq)]
pub struct ReparseReport {
    /// The edit that was applied, if the versions differ.
    pub edit: Option<TextEdit>,
    pub stats: ReparseStats,
    /// The incremental tree equals a fresh parse of the new text.
    pub consistent: bool,
}

impl fmt::Display for ReparseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.edit {
            Some(edit) => writeln!(
                f,
                "edit: replace {} byte(s) at {} with {:?}",
                edit.removed, edit.offset, edit.inserted
            )?,
            None => writeln!(f, "edit: none")?,
        }
        writeln!(f, "reused: {}", self.stats.reused_count)?;
        writeln!(f, "reparsed: {}", self.stats.reparsed_count)?;
        writeln!(f, "full reparse: {}", self.stats.full_reparse)?;
        writeln!(f, "reuse rate: {:.1}%", self.stats.reuse_rate())?;
        write!(
            f,
            "consistent: {}",
            if self.consistent { "yes" } else { "NO" }
        )
    }
}

/// The smallest single edit turning `old` into `new`, on char boundaries.
///
/// Returns `Ok(None)` when the texts are equal.
///
/// # Examples
///
/// ```
/// use gdsc::commands::single_edit;
///
/// let edit = single_edit("var a = 1\n", "var a = 10\n").unwrap().unwrap();
/// assert_eq!((edit.offset, edit.removed, edit.inserted.as_str()), (9, 0, "0"));
/// ```
pub fn single_edit(old: &str, new: &str) -> Result<Option<TextEdit>, String> {
    if old == new {
        return Ok(None);
    }
    let prefix = old
        .char_indices()
        .zip(new.chars())
        .find(|((_, a), b)| a != b)
        .map_or_else(|| old.len().min(new.len()), |((at, _), _)| at);
    let (old_rest, new_rest) = (&old[prefix..], &new[prefix..]);
    let suffix: usize = old_rest
        .chars()
        .rev()
        .zip(new_rest.chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();
    let removed = old_rest.len() - suffix;
    let inserted = &new_rest[..new_rest.len() - suffix];
    let to_u32 = |n: usize| u32::try_from(n).map_err(|_| "file is too large to edit".to_owned());
    Ok(Some(TextEdit::new(to_u32(prefix)?, to_u32(removed)?, inserted)))
}

/// Parse `old`, reparse it into `new`, and compare with a full parse.
pub fn reparse_source(old: &str, new: &str, options: &CliOptions) -> Result<ReparseReport, String> {
    let reparser = Reparser::new(options.config);
    let edit = single_edit(old, new)?;
    let edits: Vec<TextEdit> = edit.iter().cloned().collect();
    let tree = reparser.parser().parse_file(old).map_err(|e| e.to_string())?;
    let (updated, stats) = reparser
        .reparse(&tree, new, &edits)
        .map_err(|e| e.to_string())?;
    let fresh = reparser.parser().parse_file(new).map_err(|e| e.to_string())?;
    let consistent = updated.text() == new && updated.dump() == fresh.dump();
    Ok(ReparseReport {
        edit,
        stats,
        consistent,
    })
}

/// Reparse `old_path` into `new_path` and print the report.
///
/// Exits with status 1 when the incremental tree differs from a full parse.
pub fn reparse_files(old_path: &str, new_path: &str, options: &CliOptions) {
    let old = read_file(old_path);
    let new = read_file(new_path);
    match reparse_source(&old, &new, options) {
        Ok(report) => {
            println!("{report}");
            if !report.consistent {
                std::process::exit(1);
            }
        }
        Err(msg) => {
            eprintln!("error: {msg}");
            std::process::exit(2);
        }
    }
}

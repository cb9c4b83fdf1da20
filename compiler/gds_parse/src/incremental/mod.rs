//! Incremental Reparsing
//!
//! Brings a tree up to date with an edited text by reparsing only the block
//! items the edits touch.
//!
//! # Architecture
//!
//! 1. **Validation** - edits are sorted and checked against the new text;
//!    anything inconsistent falls back to a full parse
//! 2. **Planning** - each edit is mapped to the innermost item of a block
//!    list that starts its own line (`cursor`); edits sharing an item, or
//!    items overlapping each other, are grouped
//! 3. **Splicing** - each group's item is reparsed alone at its block's
//!    level, checked, and swapped in; later positions shift by the size
//!    change (`splice`)
//!
//! Groups are processed from the end of the text backwards, so the positions
//! of every group still to be processed refer to the unedited text.
//!
//! A result is always identical to a full parse of the new text: whenever an
//! item cannot prove that (it changed kind, ran past its end, or left text
//! that might now attach to it) the next enclosing item is tried, and as a
//! last resort the whole text is parsed again.

mod cursor;
mod splice;

use gds_ir::{EditBatch, SyntaxTree, TextEdit};
use tracing::debug;

use crate::{Entry, ParseResult, Parser, ParserConfig};

/// Statistics for one incremental reparse.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReparseStats {
    /// Number of block items carried over from the old tree.
    pub reused_count: usize,
    /// Number of block items that were parsed again.
    pub reparsed_count: usize,
    /// The whole text was parsed again.
    pub full_reparse: bool,
}

impl ReparseStats {
    /// Calculate reuse rate as a percentage.
    #[allow(
        clippy::cast_precision_loss,
        reason = "counts won't approach 2^52; precision loss irrelevant for display"
    )]
    pub fn reuse_rate(&self) -> f64 {
        let total = self.reused_count + self.reparsed_count;
        if total == 0 {
            0.0
        } else {
            (self.reused_count as f64 / total as f64) * 100.0
        }
    }
}

/// Applies edits to parsed trees.
#[derive(Clone, Debug, Default)]
pub struct Reparser {
    parser: Parser,
}

impl Reparser {
    pub fn new(config: ParserConfig) -> Self {
        Reparser {
            parser: Parser::new(config),
        }
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// A new tree for `new_text`, which `edits` produced from the text of
    /// `old`. `old` is left untouched.
    pub fn reparse(
        &self,
        old: &SyntaxTree,
        new_text: &str,
        edits: &[TextEdit],
    ) -> ParseResult<(SyntaxTree, ReparseStats)> {
        let mut tree = old.clone();
        let stats = self.apply(&mut tree, new_text, edits)?;
        Ok((tree, stats))
    }

    /// Update `tree` in place to represent `new_text`.
    ///
    /// Edit offsets refer to the text of `tree` before any of them is
    /// applied; the order of `edits` does not matter.
    pub fn apply(&self, tree: &mut SyntaxTree, new_text: &str, edits: &[TextEdit]) -> ParseResult<ReparseStats> {
        let old_text = tree.text();
        if edits.is_empty() {
            if old_text == new_text {
                return Ok(ReparseStats {
                    reused_count: splice::count_items(tree, tree.root()),
                    ..ReparseStats::default()
                });
            }
            debug!("no edits, but the text changed");
            return self.full(tree, new_text);
        }

        let batch = match EditBatch::new(edits) {
            Ok(batch) => batch,
            Err(e) => {
                debug!(error = %e, "unusable edit batch");
                return self.full(tree, new_text);
            }
        };
        match batch.apply(&old_text) {
            Ok(applied) if applied == new_text => {}
            Ok(_) => {
                debug!("edits do not produce the new text");
                return self.full(tree, new_text);
            }
            Err(e) => {
                debug!(error = %e, "edits do not fit the old text");
                return self.full(tree, new_text);
            }
        }

        if let Some(marker) = batch.marker() {
            debug!(
                start = marker.affected_start,
                end = marker.affected_end,
                delta = marker.delta,
                "affected region"
            );
        }
        let edits = batch.edits();
        let Some(groups) = cursor::plan(tree, self.parser.config(), edits) else {
            debug!("an edit lies outside every reparsable item");
            return self.full(tree, new_text);
        };
        debug!(edits = edits.len(), groups = groups.len(), "reparse planned");

        let mut reparsed = 0;
        for group in groups.iter().rev() {
            let own = &edits[group.edits.clone()];
            let mut done = false;
            for candidate in &group.candidates {
                let foreign = edits
                    .iter()
                    .enumerate()
                    .any(|(i, e)| !group.edits.contains(&i) && candidate.touches(e));
                if foreign {
                    debug!(item = ?candidate.item, "item spans another edit group");
                    break;
                }
                if let Some(count) = splice::reparse_item(&self.parser, tree, candidate, own)? {
                    reparsed += count;
                    done = true;
                    break;
                }
                debug!(item = ?candidate.item, "candidate rejected, trying the enclosing item");
            }
            if !done {
                debug!("no item could absorb the edits");
                return self.full(tree, new_text);
            }
        }

        let total = splice::count_items(tree, tree.root());
        Ok(ReparseStats {
            reused_count: total.saturating_sub(reparsed),
            reparsed_count: reparsed,
            full_reparse: false,
        })
    }

    fn full(&self, tree: &mut SyntaxTree, new_text: &str) -> ParseResult<ReparseStats> {
        debug!(len = new_text.len(), "full reparse");
        *tree = self.parser.parse_entry(Entry::of(tree), new_text)?;
        Ok(ReparseStats {
            reused_count: 0,
            reparsed_count: splice::count_items(tree, tree.root()),
            full_reparse: true,
        })
    }
}

//! Character-driven parser for `GDScript`.
//!
//! Produces lossless [`SyntaxTree`]s: every character of the input, including
//! whitespace, comments and text the grammar could not place, lives in
//! exactly one leaf, so rendering a tree reproduces its source. Malformed
//! input never fails a parse; it becomes invalid leaves at the position
//! where it was found.
//!
//! # Architecture
//!
//! - `reader`: the character automaton (signals, reading states, driver)
//! - `grammar`: reading states that assemble blocks, declarations,
//!   statements and expressions
//! - [`incremental`]: reparsing only the items touched by an edit
//!
//! # Example
//!
//! ```
//! let tree = gds_parse::parse("extends Node\n\nfunc _ready():\n\tpass\n").unwrap();
//! assert_eq!(tree.text(), "extends Node\n\nfunc _ready():\n\tpass\n");
//! assert!(tree.is_well_formed());
//! ```

mod config;
mod error;
mod grammar;
pub mod incremental;
mod reader;

pub use config::ParserConfig;
pub use error::{ParseError, ParseResult};
pub use incremental::{ReparseStats, Reparser};

pub use gds_ir::{
    EditBatch, NodeKind, Position, RenderMode, Slot, Span, SyntaxTree, TextEdit, TokenId, TokenKind,
};

use std::io::Read;

use gds_ir::{Role, TokenArena};
use tracing::debug;

use crate::grammar::{BlockKind, BlockState, ExpressionRootState};
use crate::reader::{Cx, Output, Reader, ReadingState};

/// What kind of text a parse starts from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Entry {
    File,
    Statements,
    Statement,
    Expression,
}

impl Entry {
    /// The entry point that produced `tree`.
    pub(crate) fn of(tree: &SyntaxTree) -> Entry {
        match tree.arena().node_kind(tree.root()) {
            Some(NodeKind::File) => Entry::File,
            Some(NodeKind::StatementsList) => Entry::Statements,
            Some(NodeKind::ExpressionStatement) => Entry::Expression,
            _ => Entry::Statement,
        }
    }
}

/// A finished parse plus what the reader noticed on the way.
pub(crate) struct Parsed {
    pub arena: TokenArena,
    pub output: Output,
    /// Input ended inside an unfinished construct.
    pub truncated: bool,
    /// A line fell below the level of a single-item block.
    pub escaped: bool,
}

/// Parser entry points sharing one configuration.
#[derive(Clone, Debug, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Parser { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a whole script. The root is a `File` node.
    pub fn parse_file(&self, text: &str) -> ParseResult<SyntaxTree> {
        debug!(len = text.len(), "parse file");
        self.parse_entry(Entry::File, text)
    }

    /// Parse a run of statements. The root is a `StatementsList`.
    pub fn parse_statements(&self, text: &str) -> ParseResult<SyntaxTree> {
        debug!(len = text.len(), "parse statements");
        self.parse_entry(Entry::Statements, text)
    }

    /// Parse one statement. The root is the statement node itself, unless
    /// the text holds zero or several statements, in which case it is the
    /// enclosing `StatementsList`.
    pub fn parse_statement(&self, text: &str) -> ParseResult<SyntaxTree> {
        debug!(len = text.len(), "parse statement");
        self.parse_entry(Entry::Statement, text)
    }

    /// Parse one expression, which may span lines. The root is an
    /// `ExpressionStatement`.
    pub fn parse_expression(&self, text: &str) -> ParseResult<SyntaxTree> {
        debug!(len = text.len(), "parse expression");
        self.parse_entry(Entry::Expression, text)
    }

    /// Parse a script streamed from `source` in chunks of
    /// [`ParserConfig::read_buffer_size`] bytes.
    pub fn parse_reader(&self, mut source: impl Read) -> ParseResult<SyntaxTree> {
        debug!(chunk = self.config.read_buffer_size, "parse stream");
        let parsed = self.run(
            |cx| BlockState::root(cx, BlockKind::Members),
            |reader| {
                let mut chunk = vec![0u8; self.config.read_buffer_size.max(1)];
                let mut undecoded: Vec<u8> = Vec::new();
                let mut consumed = 0usize;
                loop {
                    let read = match source.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(read) => read,
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(e.into()),
                    };
                    undecoded.extend_from_slice(&chunk[..read]);
                    let valid = match std::str::from_utf8(&undecoded) {
                        Ok(_) => undecoded.len(),
                        // A character split across chunks: wait for the rest.
                        Err(e) if e.error_len().is_none() => e.valid_up_to(),
                        Err(e) => {
                            return Err(ParseError::InvalidUtf8 {
                                offset: consumed + e.valid_up_to(),
                            })
                        }
                    };
                    let text = std::str::from_utf8(&undecoded[..valid])
                        .map_err(|_| ParseError::InvalidUtf8 { offset: consumed })?;
                    reader.feed(text)?;
                    consumed += valid;
                    undecoded.drain(..valid);
                }
                if undecoded.is_empty() {
                    Ok(())
                } else {
                    Err(ParseError::InvalidUtf8 { offset: consumed })
                }
            },
        )?;
        finish_tree(Entry::File, parsed)
    }

    pub(crate) fn parse_entry(&self, entry: Entry, text: &str) -> ParseResult<SyntaxTree> {
        let parsed = match entry {
            Entry::File | Entry::Statements | Entry::Statement => {
                let kind = if entry == Entry::File {
                    BlockKind::Members
                } else {
                    BlockKind::Statements
                };
                self.run(|cx| BlockState::root(cx, kind), |reader| reader.feed(text))?
            }
            Entry::Expression => self.run(|cx| ExpressionRootState::new(cx), |reader| reader.feed(text))?,
        };
        finish_tree(entry, parsed)
    }

    /// Drive a reader rooted at `root` over whatever `feed` delivers.
    pub(crate) fn run(
        &self,
        root: impl FnOnce(&mut Cx) -> Box<dyn ReadingState>,
        feed: impl FnOnce(&mut Reader) -> ParseResult<()>,
    ) -> ParseResult<Parsed> {
        let mut reader = Reader::new(self.config, root)?;
        feed(&mut reader)?;
        let (cx, output) = reader.finish()?;
        Ok(Parsed {
            arena: cx.arena,
            output,
            truncated: cx.truncated,
            escaped: cx.escaped,
        })
    }
}

/// Root the reader output according to `entry` and assign positions.
fn finish_tree(entry: Entry, parsed: Parsed) -> ParseResult<SyntaxTree> {
    let Parsed {
        mut arena, output, ..
    } = parsed;
    let Output {
        leading, token, trailing, ..
    } = output;
    let Some(top) = token else {
        // Roots always produce a token; keep the text regardless.
        let root = arena.alloc_node(NodeKind::StatementsList);
        for leaf in leading.into_iter().chain(trailing) {
            arena.push_extra(root, leaf)?;
        }
        return Ok(positioned(arena, root));
    };

    for leaf in leading.into_iter().rev() {
        let first = arena.children(top).next();
        match first {
            Some(first) => arena.insert_before(first, leaf)?,
            None => arena.push_extra(top, leaf)?,
        }
    }
    let root = match entry {
        Entry::File => {
            let file = arena.alloc_node(NodeKind::File);
            arena.set_slot(file, Slot::Members, top)?;
            for leaf in trailing {
                arena.push_extra(file, leaf)?;
            }
            file
        }
        Entry::Statements | Entry::Expression => {
            for leaf in trailing {
                arena.push_extra(top, leaf)?;
            }
            top
        }
        Entry::Statement => {
            for leaf in trailing {
                arena.push_extra(top, leaf)?;
            }
            hoist_single_item(&mut arena, top)?
        }
    };
    Ok(positioned(arena, root))
}

/// The only item of `list`, with the list's extras moved into it.
fn hoist_single_item(arena: &mut TokenArena, list: TokenId) -> ParseResult<TokenId> {
    let entries = arena.entries(list).to_vec();
    let mut items = entries.iter().filter(|e| e.role == Role::Item);
    let (Some(item), None) = (items.next(), items.next()) else {
        return Ok(list);
    };
    let item = item.token;
    let at = entries.iter().position(|e| e.token == item).unwrap_or(0);
    arena.remove(item)?;
    let first = arena.children(item).next();
    for entry in &entries[..at] {
        match first {
            Some(first) => arena.insert_before(first, entry.token)?,
            None => arena.push_extra(item, entry.token)?,
        }
    }
    for entry in &entries[at + 1..] {
        arena.push_extra(item, entry.token)?;
    }
    Ok(item)
}

fn positioned(arena: TokenArena, root: TokenId) -> SyntaxTree {
    let mut tree = SyntaxTree::new(arena, root);
    tree.recompute_positions();
    tree
}

/// Parse a script with the default configuration.
pub fn parse(text: &str) -> ParseResult<SyntaxTree> {
    Parser::default().parse_file(text)
}

/// Reparse `old` after `edits` turned its text into `new_text`, with the
/// default configuration.
pub fn reparse(old: &SyntaxTree, new_text: &str, edits: &[TextEdit]) -> ParseResult<(SyntaxTree, ReparseStats)> {
    Reparser::default().reparse(old, new_text, edits)
}

#[cfg(test)]
mod tests;

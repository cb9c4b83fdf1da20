//! Character Reading Automaton
//!
//! The parser never tokenizes ahead. Source characters are delivered one at a
//! time, as [`Signal`]s, to the reading state on top of an explicit stack.
//! Each state decides, per signal, whether to consume it, hand it to a new
//! child state, or finish and let its parent see the same signal again.
//!
//! # Architecture
//!
//! - [`ReadingState`]: one handler per signal category plus `on_child` (a
//!   pushed child finished) and `finish` (build the state's token)
//! - [`Step`]: what the driver does after a handler returns
//! - [`Output`]: what a finished state hands its parent
//! - [`Cx`]: the arena being built, the configuration and the depth counters
//! - [`Reader`]: the driver owning the stack
//!
//! Leaf states (words, numbers, strings, whitespace, ...) live in `leaf`;
//! grammar states live in `crate::grammar`.

mod driver;
mod leaf;

pub(crate) use driver::Reader;
pub(crate) use leaf::{
    is_operator_start, CommentState, DotsState, InvalidState, LineContinuationState, NodePathState,
    NumberState, OperatorState, StringState, WhitespaceState, WordState,
};

use std::fmt;

use gds_ir::{LeafKind, NodeKind, TokenArena, TokenId};
use gds_lexer_core::{measure_indentation, IndentLevel};
use gds_stack::FrameCounter;

use crate::{ParseResult, ParserConfig};

/// One unit of input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Signal {
    Char(char),
    NewLine,
    CarriageReturn,
    /// `#`
    CommentStart,
    /// `\`
    Escape,
    Eof,
}

impl Signal {
    pub(crate) fn from_char(c: char) -> Signal {
        match c {
            '\n' => Signal::NewLine,
            '\r' => Signal::CarriageReturn,
            '#' => Signal::CommentStart,
            '\\' => Signal::Escape,
            c => Signal::Char(c),
        }
    }

    /// The character carried by this signal.
    pub(crate) fn char(self) -> Option<char> {
        match self {
            Signal::Char(c) => Some(c),
            Signal::NewLine => Some('\n'),
            Signal::CarriageReturn => Some('\r'),
            Signal::CommentStart => Some('#'),
            Signal::Escape => Some('\\'),
            Signal::Eof => None,
        }
    }
}

/// Driver instruction returned by a handler.
pub(crate) enum Step {
    /// The signal was consumed.
    Accept,
    /// The signal was consumed and the state is finished.
    AcceptAndComplete,
    /// The state is finished; the parent receives the same signal.
    Complete,
    /// Push a child; the child receives the same signal.
    Push(Box<dyn ReadingState>),
    /// Push the invalid-text absorber; it receives the same signal.
    Invalid,
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Accept => f.write_str("Accept"),
            Step::AcceptAndComplete => f.write_str("AcceptAndComplete"),
            Step::Complete => f.write_str("Complete"),
            Step::Push(state) => write!(f, "Push({})", state.name()),
            Step::Invalid => f.write_str("Invalid"),
        }
    }
}

/// Indentation of a line that a dedenting block already read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct PendingLine {
    /// The indentation leaf, absent for a line starting at column zero.
    pub indent: Option<TokenId>,
    pub level: IndentLevel,
}

/// What a finished state hands its parent.
#[derive(Debug, Default)]
pub(crate) struct Output {
    /// Trivia and invalid text read before the token, in text order.
    pub leading: Vec<TokenId>,
    /// The token the state built.
    pub token: Option<TokenId>,
    /// Trivia read after the token, in text order.
    pub trailing: Vec<TokenId>,
    /// A significant token the state read but could not place.
    pub handback: Option<TokenId>,
    /// The start of a line at a lower indentation.
    pub line: Option<PendingLine>,
}

impl Output {
    pub(crate) fn token(token: TokenId) -> Self {
        Output {
            token: Some(token),
            ..Output::default()
        }
    }

    /// Every token carried, in text order.
    pub(crate) fn into_tokens(self) -> impl Iterator<Item = TokenId> {
        self.leading
            .into_iter()
            .chain(self.token)
            .chain(self.trailing)
            .chain(self.handback)
            .chain(self.line.and_then(|line| line.indent))
    }
}

/// Shared context of one parse.
pub(crate) struct Cx {
    pub arena: TokenArena,
    pub config: ParserConfig,
    pub frames: FrameCounter,
    /// Input ended inside a construct that would have read further
    /// (multiline string, open bracket, line continuation).
    pub truncated: bool,
    /// A line fell below the fixed level of a single-item block.
    pub escaped: bool,
}

impl Cx {
    pub(crate) fn new(config: ParserConfig) -> Self {
        Cx {
            arena: TokenArena::with_capacity(256),
            frames: FrameCounter::new(config.max_trace_frames),
            config,
            truncated: false,
            escaped: false,
        }
    }

    #[inline]
    pub(crate) fn leaf(&mut self, kind: LeafKind, text: &str) -> TokenId {
        self.arena.alloc_leaf(kind, text)
    }

    #[inline]
    pub(crate) fn node(&mut self, kind: NodeKind) -> TokenId {
        self.arena.alloc_node(kind)
    }

    pub(crate) fn indent_level(&self, token: Option<TokenId>) -> IndentLevel {
        let text = token.and_then(|t| self.arena.text(t)).unwrap_or_default();
        measure_indentation(text, self.config.indentation_size, self.config.spaces_as_indentation)
    }
}

/// A state of the reading automaton.
///
/// Handlers default to finishing the state, except `on_escape`, which treats
/// a stray backslash like any other character.
pub(crate) trait ReadingState {
    fn name(&self) -> &'static str;

    fn on_char(&mut self, cx: &mut Cx, c: char) -> ParseResult<Step>;

    fn on_newline(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        Ok(Step::Complete)
    }

    fn on_carriage_return(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        Ok(Step::Complete)
    }

    fn on_comment_start(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        Ok(Step::Complete)
    }

    fn on_escape(&mut self, cx: &mut Cx) -> ParseResult<Step> {
        self.on_char(cx, '\\')
    }

    fn on_eof(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        Ok(Step::Complete)
    }

    /// A child pushed by this state finished.
    fn on_child(&mut self, _cx: &mut Cx, _out: Output) -> ParseResult<()> {
        Ok(())
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output>;

    /// Route `signal` to its handler.
    fn on_signal(&mut self, cx: &mut Cx, signal: Signal) -> ParseResult<Step> {
        match signal {
            Signal::Char(c) => self.on_char(cx, c),
            Signal::NewLine => self.on_newline(cx),
            Signal::CarriageReturn => self.on_carriage_return(cx),
            Signal::CommentStart => self.on_comment_start(cx),
            Signal::Escape => self.on_escape(cx),
            Signal::Eof => self.on_eof(cx),
        }
    }
}

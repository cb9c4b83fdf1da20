//! Line-oriented lists.
//!
//! A [`BlockState`] reads one item per line (or several separated by `;`)
//! and decides, from the indentation of each new line, whether the line
//! belongs to it. A line indented less than the block ends the block: the
//! block hands the already-read indentation up as a
//! [`PendingLine`] and the first enclosing block at or below that level
//! takes over. Blank and comment-only lines never end a block.

use gds_ir::{Keyword, LeafKind, NodeKind, Punct, Slot, TokenId};
use gds_lexer_core::{is_ident_start, is_inline_space};

use super::expr::{can_start_expression, is_expression_word, ExprCtx};
use super::sequence::SequenceState;
use super::inline_trivia;
use crate::reader::{CommentState, Cx, Output, PendingLine, ReadingState, Signal, Step, WhitespaceState, WordState};
use crate::ParseResult;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BlockKind {
    Members,
    Statements,
    MatchCases,
    Accessors,
}

impl BlockKind {
    pub(crate) fn list_kind(self) -> NodeKind {
        match self {
            BlockKind::Members => NodeKind::ClassMembersList,
            BlockKind::Statements => NodeKind::StatementsList,
            BlockKind::MatchCases => NodeKind::MatchCasesList,
            BlockKind::Accessors => NodeKind::AccessorsList,
        }
    }

    pub(crate) fn from_list(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::ClassMembersList => Some(BlockKind::Members),
            NodeKind::StatementsList => Some(BlockKind::Statements),
            NodeKind::MatchCasesList => Some(BlockKind::MatchCases),
            NodeKind::AccessorsList => Some(BlockKind::Accessors),
            _ => None,
        }
    }

    fn separator(self) -> Punct {
        match self {
            BlockKind::Accessors => Punct::Comma,
            _ => Punct::Semicolon,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    /// Top of a file or statement list: level zero, never ends early.
    Root,
    /// Body on the lines after a `:`; the first content line fixes the
    /// level, which must exceed `parent`.
    Indented { parent: usize },
    /// Body on the same line as its `:`; ends with the line.
    Inline,
    /// Exactly one item at a known level, for reparsing.
    Single,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    /// Rest of the line holding the `:`.
    Header,
    LineStart,
    /// Indentation read; the line may still turn out blank.
    AfterIndent,
    ItemStart,
    AfterItem,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Awaiting {
    Trivia,
    Indent,
    /// The first word of an item.
    Word,
    Item,
    /// An `elif`/`else` branch for this `if` chain tail.
    Branch(TokenId),
}

pub(crate) struct BlockState {
    kind: BlockKind,
    list: TokenId,
    mode: Mode,
    level: Option<usize>,
    phase: Phase,
    /// Indentation of the current line, placed once the line is classified.
    indent: Option<TokenId>,
    awaiting: Awaiting,
    pending: Option<Box<dyn ReadingState>>,
    /// `static` (plus trivia after it) waiting for `func` or `var`.
    held: Vec<TokenId>,
    /// After `class_name`, only `extends` may follow on the same line.
    extends_only: bool,
    done: bool,
    line: Option<PendingLine>,
}

impl BlockState {
    fn with_mode(cx: &mut Cx, kind: BlockKind, mode: Mode, level: Option<usize>, phase: Phase) -> Box<Self> {
        Box::new(BlockState {
            kind,
            list: cx.node(kind.list_kind()),
            mode,
            level,
            phase,
            indent: None,
            awaiting: Awaiting::Trivia,
            pending: None,
            held: Vec::new(),
            extends_only: false,
            done: false,
            line: None,
        })
    }

    pub(crate) fn root(cx: &mut Cx, kind: BlockKind) -> Box<Self> {
        Self::with_mode(cx, kind, Mode::Root, Some(0), Phase::LineStart)
    }

    pub(crate) fn indented(cx: &mut Cx, kind: BlockKind, parent: usize) -> Box<Self> {
        Self::with_mode(cx, kind, Mode::Indented { parent }, None, Phase::Header)
    }

    pub(crate) fn inline(cx: &mut Cx, kind: BlockKind, level: usize) -> Box<Self> {
        Self::with_mode(cx, kind, Mode::Inline, Some(level), Phase::ItemStart)
    }

    /// A block holding the single item that starts the input, at `level`.
    pub(crate) fn single(cx: &mut Cx, kind: BlockKind, level: usize) -> Box<Self> {
        Self::with_mode(cx, kind, Mode::Single, Some(level), Phase::ItemStart)
    }

    fn item_level(&self) -> usize {
        match (self.level, self.mode) {
            (Some(level), _) => level,
            (None, Mode::Indented { parent }) => parent + 1,
            (None, _) => 0,
        }
    }

    fn push(&mut self, awaiting: Awaiting, state: Box<dyn ReadingState>) -> Step {
        self.awaiting = awaiting;
        Step::Push(state)
    }

    fn extra(&mut self, cx: &mut Cx, kind: LeafKind, text: &str) -> ParseResult<Step> {
        let leaf = cx.leaf(kind, text);
        cx.arena.push_extra(self.list, leaf)?;
        Ok(Step::Accept)
    }

    fn place_trivia(&mut self, cx: &mut Cx, token: TokenId) -> ParseResult<()> {
        if self.held.is_empty() {
            cx.arena.push_extra(self.list, token)?;
        } else {
            self.held.push(token);
        }
        Ok(())
    }

    /// Held `static` tokens that no `func` or `var` claimed.
    fn release_held(&mut self, cx: &mut Cx) -> ParseResult<()> {
        for token in std::mem::take(&mut self.held) {
            if !cx.arena.kind(token).is_trivia() {
                cx.arena.invalidate(token);
            }
            cx.arena.push_extra(self.list, token)?;
        }
        Ok(())
    }

    fn place_indent(&mut self, cx: &mut Cx, invalid: bool) -> ParseResult<()> {
        if let Some(indent) = self.indent.take() {
            if invalid {
                cx.arena.invalidate(indent);
            }
            cx.arena.push_extra(self.list, indent)?;
        }
        Ok(())
    }

    /// End the block; the parent continues with the line just started.
    fn dedent(&mut self, line: PendingLine) -> Step {
        self.line = Some(line);
        self.done = true;
        Step::Complete
    }

    fn mark_empty(&self, cx: &mut Cx) {
        if matches!(self.mode, Mode::Indented { .. }) && self.level.is_none() {
            cx.truncated = true;
        }
    }

    fn header(&mut self, cx: &mut Cx, signal: Signal) -> ParseResult<Step> {
        match signal {
            Signal::NewLine => {
                self.phase = Phase::LineStart;
                self.extra(cx, LeafKind::NewLine, "\n")
            }
            Signal::CarriageReturn => self.extra(cx, LeafKind::CarriageReturn, "\r"),
            Signal::CommentStart => Ok(self.push(Awaiting::Trivia, CommentState::new())),
            Signal::Eof => {
                self.mark_empty(cx);
                Ok(Step::Complete)
            }
            _ => match inline_trivia(signal) {
                Some(state) => Ok(self.push(Awaiting::Trivia, state)),
                None => {
                    self.awaiting = Awaiting::Trivia;
                    Ok(Step::Invalid)
                }
            },
        }
    }

    fn line_start(&mut self, cx: &mut Cx, signal: Signal) -> ParseResult<Step> {
        if let Signal::Char(c) = signal {
            if is_inline_space(c) {
                return Ok(self.push(Awaiting::Indent, WhitespaceState::new(LeafKind::Indentation)));
            }
        }
        self.phase = Phase::AfterIndent;
        self.after_indent(cx, signal)
    }

    fn after_indent(&mut self, cx: &mut Cx, signal: Signal) -> ParseResult<Step> {
        match signal {
            Signal::NewLine => {
                self.place_indent(cx, false)?;
                self.phase = Phase::LineStart;
                self.extra(cx, LeafKind::NewLine, "\n")
            }
            Signal::CarriageReturn => {
                self.place_indent(cx, false)?;
                self.extra(cx, LeafKind::CarriageReturn, "\r")
            }
            Signal::CommentStart => {
                self.place_indent(cx, false)?;
                Ok(self.push(Awaiting::Trivia, CommentState::new()))
            }
            Signal::Eof => {
                self.place_indent(cx, false)?;
                self.mark_empty(cx);
                Ok(Step::Complete)
            }
            _ => self.content_line(cx, signal),
        }
    }

    /// The current line holds content: place it by its indentation.
    fn content_line(&mut self, cx: &mut Cx, signal: Signal) -> ParseResult<Step> {
        let measured = cx.indent_level(self.indent);
        let units = measured.units;
        if let Mode::Indented { parent } = self.mode {
            if self.level.is_none() {
                if units <= parent {
                    let indent = self.indent.take();
                    return Ok(self.dedent(PendingLine { indent, level: measured }));
                }
                self.level = Some(units);
            }
        }
        let level = self.item_level();
        if units < level {
            match self.mode {
                Mode::Indented { .. } => {
                    let indent = self.indent.take();
                    return Ok(self.dedent(PendingLine { indent, level: measured }));
                }
                Mode::Single => cx.escaped = true,
                Mode::Root | Mode::Inline => {}
            }
        }
        let exact = units == level && measured.exact;
        self.place_indent(cx, !exact)?;
        self.phase = Phase::ItemStart;
        self.extends_only = false;
        self.item_start(cx, signal)
    }

    fn item_start(&mut self, cx: &mut Cx, signal: Signal) -> ParseResult<Step> {
        if let Some(state) = inline_trivia(signal) {
            return Ok(self.push(Awaiting::Trivia, state));
        }
        match signal {
            Signal::Char(c) => self.dispatch_char(cx, c),
            _ if self.mode == Mode::Inline => {
                self.release_held(cx)?;
                Ok(Step::Complete)
            }
            _ => {
                self.release_held(cx)?;
                self.phase = Phase::AfterItem;
                self.after_item(cx, signal)
            }
        }
    }

    fn dispatch_char(&mut self, cx: &mut Cx, c: char) -> ParseResult<Step> {
        let level = self.item_level();
        if self.kind == BlockKind::MatchCases {
            if can_start_expression(c, ExprCtx::pattern(level)) {
                self.release_held(cx)?;
                let case = SequenceState::new(cx, NodeKind::MatchCase, level, false);
                return Ok(self.push(Awaiting::Item, case));
            }
            return self.no_item(cx);
        }
        if is_ident_start(c) {
            return Ok(self.push(Awaiting::Word, WordState::new()));
        }
        let production = match self.kind {
            BlockKind::Members if c == '@' && !self.extends_only => NodeKind::Annotation,
            BlockKind::Statements if can_start_expression(c, ExprCtx::statement(level)) => {
                NodeKind::ExpressionStatement
            }
            _ => return self.no_item(cx),
        };
        self.release_held(cx)?;
        let item = SequenceState::new(cx, production, level, false);
        Ok(self.push(Awaiting::Item, item))
    }

    fn no_item(&mut self, cx: &mut Cx) -> ParseResult<Step> {
        self.release_held(cx)?;
        if self.mode == Mode::Inline {
            return Ok(Step::Complete);
        }
        self.awaiting = Awaiting::Trivia;
        Ok(Step::Invalid)
    }

    fn dispatch_word(&mut self, cx: &mut Cx, word: TokenId) -> ParseResult<()> {
        let keyword = cx.arena.keyword(word);
        let level = self.item_level();
        if self.extends_only && keyword != Some(Keyword::Extends) {
            return self.reject_word(cx, word);
        }
        if self.kind == BlockKind::Members && keyword == Some(Keyword::Static) {
            if !self.held.is_empty() {
                cx.arena.invalidate(word);
            }
            self.held.push(word);
            return Ok(());
        }
        let production = match (self.kind, keyword) {
            (BlockKind::Members, Some(Keyword::Var)) => NodeKind::Variable,
            (BlockKind::Members, Some(Keyword::Func)) => NodeKind::Method,
            (BlockKind::Members, Some(Keyword::Const)) => NodeKind::Constant,
            (BlockKind::Members, Some(Keyword::Signal)) => NodeKind::Signal,
            (BlockKind::Members, Some(Keyword::Enum)) => NodeKind::Enum,
            (BlockKind::Members, Some(Keyword::Class)) => NodeKind::InnerClass,
            (BlockKind::Members, Some(Keyword::ClassName)) => NodeKind::ClassName,
            (BlockKind::Members, Some(Keyword::Extends)) => NodeKind::Extends,
            (BlockKind::Statements, Some(Keyword::If)) => NodeKind::IfStatement,
            (BlockKind::Statements, Some(Keyword::For)) => NodeKind::ForStatement,
            (BlockKind::Statements, Some(Keyword::While)) => NodeKind::WhileStatement,
            (BlockKind::Statements, Some(Keyword::Match)) => NodeKind::MatchStatement,
            (BlockKind::Statements, Some(Keyword::Return)) => NodeKind::ReturnStatement,
            (BlockKind::Statements, Some(Keyword::Pass)) => NodeKind::PassStatement,
            (BlockKind::Statements, Some(Keyword::Break)) => NodeKind::BreakStatement,
            (BlockKind::Statements, Some(Keyword::Continue)) => NodeKind::ContinueStatement,
            (BlockKind::Statements, Some(Keyword::Breakpoint)) => NodeKind::BreakpointStatement,
            (BlockKind::Statements, Some(Keyword::Var)) => NodeKind::VariableDeclaration,
            (BlockKind::Statements, Some(Keyword::Const)) => NodeKind::Constant,
            (BlockKind::Statements, Some(Keyword::Elif | Keyword::Else)) => return self.attach_branch(cx, word),
            (BlockKind::Statements, _) if is_expression_word(cx, word, ExprCtx::statement(level)) => {
                NodeKind::ExpressionStatement
            }
            (BlockKind::Accessors, None) => match cx.arena.text(word) {
                Some("get") => NodeKind::GetAccessor,
                Some("set") => NodeKind::SetAccessor,
                _ => return self.reject_word(cx, word),
            },
            _ => return self.reject_word(cx, word),
        };
        if !matches!(production, NodeKind::Variable | NodeKind::Method) {
            self.release_held(cx)?;
        }
        let mut item = SequenceState::new(cx, production, level, false);
        for token in std::mem::take(&mut self.held) {
            item.seed(cx, token)?;
        }
        item.seed(cx, word)?;
        self.awaiting = Awaiting::Item;
        self.pending = Some(item);
        Ok(())
    }

    /// A word that starts nothing here: it and the rest of the line are
    /// invalid.
    fn reject_word(&mut self, cx: &mut Cx, word: TokenId) -> ParseResult<()> {
        self.release_held(cx)?;
        cx.arena.invalidate(word);
        cx.arena.push_extra(self.list, word)?;
        self.phase = Phase::AfterItem;
        Ok(())
    }

    /// `elif` / `else`: continue the `if` chain ending the list, if any.
    fn attach_branch(&mut self, cx: &mut Cx, word: TokenId) -> ParseResult<()> {
        let Some(tail) = chain_tail(cx, self.list) else {
            return self.reject_word(cx, word);
        };
        // Lines between the `if` body and the branch belong to the chain.
        for token in cx.arena.detach_trailing_extras(self.list) {
            cx.arena.push_extra(tail, token)?;
        }
        let kind = if cx.arena.keyword(word) == Some(Keyword::Elif) {
            NodeKind::IfStatement
        } else {
            NodeKind::ElseBranch
        };
        let mut branch = SequenceState::new(cx, kind, self.item_level(), false);
        branch.seed(cx, word)?;
        self.awaiting = Awaiting::Branch(tail);
        self.pending = Some(branch);
        Ok(())
    }

    /// A line arrived from a finished item.
    fn receive_line(&mut self, cx: &mut Cx, line: PendingLine) -> ParseResult<()> {
        let level = self.item_level();
        match self.mode {
            Mode::Inline => {
                self.dedent(line);
                return Ok(());
            }
            Mode::Indented { .. } if line.level.units < level => {
                self.dedent(line);
                return Ok(());
            }
            Mode::Single if line.level.units < level => cx.escaped = true,
            _ => {}
        }
        let exact = line.level.units == level && line.level.exact;
        self.indent = line.indent;
        self.place_indent(cx, !exact)?;
        self.phase = Phase::ItemStart;
        self.extends_only = false;
        Ok(())
    }

    fn after_item(&mut self, cx: &mut Cx, signal: Signal) -> ParseResult<Step> {
        if let Some(state) = inline_trivia(signal) {
            return Ok(self.push(Awaiting::Trivia, state));
        }
        let separator = self.kind.separator();
        match signal {
            Signal::Char(c) if separator.as_str().starts_with(c) => {
                self.phase = Phase::ItemStart;
                let leaf = cx.arena.punct(separator);
                cx.arena.push_extra(self.list, leaf)?;
                Ok(Step::Accept)
            }
            _ if self.mode == Mode::Inline => Ok(Step::Complete),
            Signal::NewLine => {
                self.phase = Phase::LineStart;
                self.extra(cx, LeafKind::NewLine, "\n")
            }
            Signal::CarriageReturn => self.extra(cx, LeafKind::CarriageReturn, "\r"),
            Signal::CommentStart => Ok(self.push(Awaiting::Trivia, CommentState::new())),
            Signal::Eof => Ok(Step::Complete),
            _ => {
                self.awaiting = Awaiting::Trivia;
                Ok(Step::Invalid)
            }
        }
    }
}

/// The last `if` of the chain ending `list`, when it still lacks an `else`.
fn chain_tail(cx: &Cx, list: TokenId) -> Option<TokenId> {
    let mut current = cx.arena.items(list).next_back()?;
    loop {
        if cx.arena.node_kind(current) != Some(NodeKind::IfStatement) {
            return None;
        }
        match cx.arena.slot(current, Slot::ElseBranch) {
            None => return Some(current),
            Some(next) => current = next,
        }
    }
}

impl ReadingState for BlockState {
    fn name(&self) -> &'static str {
        match self.kind {
            BlockKind::Members => "members",
            BlockKind::Statements => "statements",
            BlockKind::MatchCases => "match cases",
            BlockKind::Accessors => "accessors",
        }
    }

    fn on_char(&mut self, cx: &mut Cx, c: char) -> ParseResult<Step> {
        self.on_signal(cx, Signal::Char(c))
    }

    fn on_signal(&mut self, cx: &mut Cx, signal: Signal) -> ParseResult<Step> {
        if let Some(next) = self.pending.take() {
            return Ok(Step::Push(next));
        }
        if self.done {
            return Ok(Step::Complete);
        }
        match self.phase {
            Phase::Header => self.header(cx, signal),
            Phase::LineStart => self.line_start(cx, signal),
            Phase::AfterIndent => self.after_indent(cx, signal),
            Phase::ItemStart => self.item_start(cx, signal),
            Phase::AfterItem => self.after_item(cx, signal),
        }
    }

    fn on_child(&mut self, cx: &mut Cx, out: Output) -> ParseResult<()> {
        let awaiting = std::mem::replace(&mut self.awaiting, Awaiting::Trivia);
        let Output {
            leading,
            token,
            trailing,
            handback,
            line,
        } = out;
        for token in leading {
            self.place_trivia(cx, token)?;
        }
        if let Some(token) = token {
            let kind = cx.arena.kind(token);
            match awaiting {
                Awaiting::Indent if kind.is_trivia() => {
                    self.indent = Some(token);
                    self.phase = Phase::AfterIndent;
                }
                _ if kind.is_trivia() || kind.is_invalid() => self.place_trivia(cx, token)?,
                Awaiting::Trivia | Awaiting::Indent => self.place_trivia(cx, token)?,
                Awaiting::Word => self.dispatch_word(cx, token)?,
                Awaiting::Item => {
                    cx.arena.push_item(self.list, token)?;
                    self.phase = match cx.arena.node_kind(token) {
                        Some(NodeKind::Annotation) => Phase::ItemStart,
                        Some(NodeKind::ClassName) => {
                            self.extends_only = true;
                            Phase::ItemStart
                        }
                        _ => Phase::AfterItem,
                    };
                }
                Awaiting::Branch(tail) => {
                    cx.arena.set_slot(tail, Slot::ElseBranch, token)?;
                    self.phase = Phase::AfterItem;
                }
            }
        }
        for token in trailing {
            cx.arena.push_extra(self.list, token)?;
        }
        if let Some(token) = handback {
            cx.arena.invalidate(token);
            cx.arena.push_extra(self.list, token)?;
            self.phase = Phase::AfterItem;
        }
        if let Some(line) = line {
            self.receive_line(cx, line)?;
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        if let Some(pending) = self.pending.take() {
            let out = pending.finish(cx)?;
            self.on_child(cx, out)?;
        }
        self.release_held(cx)?;
        if self.line.is_none() {
            self.place_indent(cx, false)?;
        }
        let trailing = cx.arena.detach_trailing_extras(self.list);
        Ok(Output {
            token: Some(self.list),
            trailing,
            handback: None,
            line: self.line,
            ..Output::default()
        })
    }
}

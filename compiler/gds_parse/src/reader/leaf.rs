//! Reading states that produce a single leaf.

use gds_ir::{Keyword, LeafKind, OperatorKind, Punct, SYMBOLIC_OPERATORS};
use gds_lexer_core::{is_ident_continue, is_ident_start, is_inline_space, Feed, NumberScanner, StringScanner};

use super::{Cx, Output, ReadingState, Step};
use crate::ParseResult;

fn feed_step(text: &mut String, c: char, feed: Feed) -> Step {
    match feed {
        Feed::Accept => {
            text.push(c);
            Step::Accept
        }
        Feed::Done => {
            text.push(c);
            Step::AcceptAndComplete
        }
        Feed::Stop => Step::Complete,
    }
}

/// Can `c` begin a symbolic operator?
pub(crate) fn is_operator_start(c: char) -> bool {
    SYMBOLIC_OPERATORS.iter().any(|op| op.starts_with(c))
}

/// Leaf kind of a complete operator spelling, before context decides
/// between its binary and prefix meaning.
pub(crate) fn operator_leaf_kind(text: &str) -> LeafKind {
    OperatorKind::binary_from_text(text)
        .or_else(|| OperatorKind::prefix_from_text(text))
        .or_else(|| (text == "->").then_some(OperatorKind::Arrow))
        .map_or(LeafKind::Invalid, LeafKind::Operator)
}

// === Trivia ===

/// A run of spaces and tabs.
pub(crate) struct WhitespaceState {
    kind: LeafKind,
    text: String,
}

impl WhitespaceState {
    /// `kind` is [`LeafKind::Space`] or [`LeafKind::Indentation`].
    pub(crate) fn new(kind: LeafKind) -> Box<Self> {
        Box::new(WhitespaceState {
            kind,
            text: String::new(),
        })
    }
}

impl ReadingState for WhitespaceState {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn on_char(&mut self, _cx: &mut Cx, c: char) -> ParseResult<Step> {
        if is_inline_space(c) {
            self.text.push(c);
            Ok(Step::Accept)
        } else {
            Ok(Step::Complete)
        }
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        Ok(Output::token(cx.leaf(self.kind, &self.text)))
    }
}

/// `#` up to the end of the line.
pub(crate) struct CommentState {
    text: String,
}

impl CommentState {
    pub(crate) fn new() -> Box<Self> {
        Box::new(CommentState { text: String::new() })
    }
}

impl ReadingState for CommentState {
    fn name(&self) -> &'static str {
        "comment"
    }

    fn on_char(&mut self, _cx: &mut Cx, c: char) -> ParseResult<Step> {
        self.text.push(c);
        Ok(Step::Accept)
    }

    fn on_comment_start(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        self.text.push('#');
        Ok(Step::Accept)
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        Ok(Output::token(cx.leaf(LeafKind::Comment, &self.text)))
    }
}

/// `\` followed by a line break.
pub(crate) struct LineContinuationState {
    text: String,
}

impl LineContinuationState {
    pub(crate) fn new() -> Box<Self> {
        Box::new(LineContinuationState { text: String::new() })
    }
}

impl ReadingState for LineContinuationState {
    fn name(&self) -> &'static str {
        "line_continuation"
    }

    fn on_char(&mut self, _cx: &mut Cx, _c: char) -> ParseResult<Step> {
        Ok(Step::Complete)
    }

    fn on_escape(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        if self.text.is_empty() {
            self.text.push('\\');
            Ok(Step::Accept)
        } else {
            Ok(Step::Complete)
        }
    }

    fn on_carriage_return(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        if self.text == "\\" {
            self.text.push('\r');
            Ok(Step::Accept)
        } else {
            Ok(Step::Complete)
        }
    }

    fn on_newline(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        if self.text.is_empty() {
            return Ok(Step::Complete);
        }
        self.text.push('\n');
        Ok(Step::AcceptAndComplete)
    }

    fn on_eof(&mut self, cx: &mut Cx) -> ParseResult<Step> {
        cx.truncated = true;
        Ok(Step::Complete)
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        let kind = if self.text.ends_with('\n') {
            LeafKind::LineContinuation
        } else {
            LeafKind::Invalid
        };
        Ok(Output::token(cx.leaf(kind, &self.text)))
    }
}

// === Words and literals ===

/// An identifier or a keyword.
pub(crate) struct WordState {
    text: String,
}

impl WordState {
    pub(crate) fn new() -> Box<Self> {
        Box::new(WordState { text: String::new() })
    }
}

impl ReadingState for WordState {
    fn name(&self) -> &'static str {
        "word"
    }

    fn on_char(&mut self, _cx: &mut Cx, c: char) -> ParseResult<Step> {
        let fits = if self.text.is_empty() {
            is_ident_start(c)
        } else {
            is_ident_continue(c)
        };
        if fits {
            self.text.push(c);
            Ok(Step::Accept)
        } else {
            Ok(Step::Complete)
        }
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        let token = match Keyword::from_text(&self.text) {
            Some(keyword) => cx.arena.keyword_leaf(keyword),
            None => cx.leaf(LeafKind::Identifier, &self.text),
        };
        Ok(Output::token(token))
    }
}

/// A numeric literal; an incomplete one (`0x`, `1e`) becomes invalid.
pub(crate) struct NumberState {
    scanner: NumberScanner,
    text: String,
}

impl NumberState {
    pub(crate) fn new() -> Box<Self> {
        Box::new(NumberState {
            scanner: NumberScanner::new(),
            text: String::new(),
        })
    }
}

impl ReadingState for NumberState {
    fn name(&self) -> &'static str {
        "number"
    }

    fn on_char(&mut self, _cx: &mut Cx, c: char) -> ParseResult<Step> {
        let feed = self.scanner.feed(c);
        Ok(feed_step(&mut self.text, c, feed))
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        let kind = if self.scanner.kind().is_some() {
            LeafKind::Number
        } else {
            LeafKind::Invalid
        };
        Ok(Output::token(cx.leaf(kind, &self.text)))
    }
}

/// A string literal, optionally `&` or `^` prefixed.
pub(crate) struct StringState {
    scanner: StringScanner,
    text: String,
    at_eof: bool,
}

impl StringState {
    pub(crate) fn new() -> Box<Self> {
        Box::new(StringState {
            scanner: StringScanner::new(),
            text: String::new(),
            at_eof: false,
        })
    }

    fn feed(&mut self, c: char) -> ParseResult<Step> {
        let feed = self.scanner.feed(c);
        Ok(feed_step(&mut self.text, c, feed))
    }
}

impl ReadingState for StringState {
    fn name(&self) -> &'static str {
        "string"
    }

    fn on_char(&mut self, _cx: &mut Cx, c: char) -> ParseResult<Step> {
        self.feed(c)
    }

    fn on_newline(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        self.feed('\n')
    }

    fn on_carriage_return(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        self.feed('\r')
    }

    fn on_comment_start(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        self.feed('#')
    }

    fn on_escape(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        self.feed('\\')
    }

    fn on_eof(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        self.at_eof = true;
        Ok(Step::Complete)
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        let kind = if self.scanner.is_terminated() {
            LeafKind::String
        } else {
            // An escaped line break or an open triple quote would have
            // carried the literal past the end of this input.
            if self.at_eof {
                cx.truncated = true;
            }
            LeafKind::Invalid
        };
        Ok(Output::token(cx.leaf(kind, &self.text)))
    }
}

/// `$Path/To`, `$"quoted"`, `%Unique`.
pub(crate) struct NodePathState {
    text: String,
    quoted: Option<StringScanner>,
    terminated: bool,
}

impl NodePathState {
    pub(crate) fn new() -> Box<Self> {
        Box::new(NodePathState {
            text: String::new(),
            quoted: None,
            terminated: false,
        })
    }

    fn feed(&mut self, c: char) -> ParseResult<Step> {
        if self.text.is_empty() {
            self.text.push(c);
            return Ok(Step::Accept);
        }
        if self.text.len() == 1 && matches!(c, '"' | '\'') {
            self.quoted = Some(StringScanner::new());
        }
        if let Some(scanner) = &mut self.quoted {
            let feed = scanner.feed(c);
            self.terminated = scanner.is_terminated();
            return Ok(feed_step(&mut self.text, c, feed));
        }
        if is_ident_continue(c) || c == '/' || c == '%' {
            self.text.push(c);
            Ok(Step::Accept)
        } else {
            Ok(Step::Complete)
        }
    }
}

impl ReadingState for NodePathState {
    fn name(&self) -> &'static str {
        "node_path"
    }

    fn on_char(&mut self, _cx: &mut Cx, c: char) -> ParseResult<Step> {
        self.feed(c)
    }

    fn on_comment_start(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        if self.quoted.is_some() {
            self.feed('#')
        } else {
            Ok(Step::Complete)
        }
    }

    fn on_escape(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        if self.quoted.is_some() {
            self.feed('\\')
        } else {
            Ok(Step::Complete)
        }
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        let complete = match self.quoted {
            Some(_) => self.terminated,
            None => self.text.len() > 1,
        };
        let kind = if complete { LeafKind::NodePath } else { LeafKind::Invalid };
        Ok(Output::token(cx.leaf(kind, &self.text)))
    }
}

/// The longest symbolic operator spelling.
pub(crate) struct OperatorState {
    text: String,
}

impl OperatorState {
    pub(crate) fn new() -> Box<Self> {
        Box::new(OperatorState { text: String::new() })
    }
}

impl ReadingState for OperatorState {
    fn name(&self) -> &'static str {
        "operator"
    }

    fn on_char(&mut self, _cx: &mut Cx, c: char) -> ParseResult<Step> {
        let extends = SYMBOLIC_OPERATORS.iter().any(|op| {
            op.strip_prefix(self.text.as_str())
                .is_some_and(|rest| rest.starts_with(c))
        });
        if extends || self.text.is_empty() {
            self.text.push(c);
            Ok(Step::Accept)
        } else {
            Ok(Step::Complete)
        }
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        let kind = operator_leaf_kind(&self.text);
        Ok(Output::token(cx.leaf(kind, &self.text)))
    }
}

/// `..` in a pattern; a lone `.` comes out as a point.
pub(crate) struct DotsState {
    dots: usize,
}

impl DotsState {
    pub(crate) fn new() -> Box<Self> {
        Box::new(DotsState { dots: 0 })
    }
}

impl ReadingState for DotsState {
    fn name(&self) -> &'static str {
        "dots"
    }

    fn on_char(&mut self, _cx: &mut Cx, c: char) -> ParseResult<Step> {
        if c != '.' {
            return Ok(Step::Complete);
        }
        self.dots += 1;
        Ok(if self.dots == 2 {
            Step::AcceptAndComplete
        } else {
            Step::Accept
        })
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        let punct = if self.dots == 2 { Punct::DoubleDot } else { Punct::Point };
        Ok(Output::token(cx.arena.punct(punct)))
    }
}

// === Recovery ===

/// Absorbs text the grammar cannot place.
///
/// The first character is always taken, so every absorber makes progress.
pub(crate) struct InvalidState {
    text: String,
}

impl InvalidState {
    pub(crate) fn new() -> Box<Self> {
        Box::new(InvalidState { text: String::new() })
    }

    fn absorb(&mut self, c: char) -> ParseResult<Step> {
        let stops = c.is_whitespace() || matches!(c, '#' | '(' | ')' | '[' | ']' | '{' | '}' | ',' | ':' | ';');
        if self.text.is_empty() || !stops {
            self.text.push(c);
            Ok(Step::Accept)
        } else {
            Ok(Step::Complete)
        }
    }
}

impl ReadingState for InvalidState {
    fn name(&self) -> &'static str {
        "invalid"
    }

    fn on_char(&mut self, _cx: &mut Cx, c: char) -> ParseResult<Step> {
        self.absorb(c)
    }

    fn on_newline(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        self.absorb('\n')
    }

    fn on_carriage_return(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        self.absorb('\r')
    }

    fn on_comment_start(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        self.absorb('#')
    }

    fn on_escape(&mut self, _cx: &mut Cx) -> ParseResult<Step> {
        self.absorb('\\')
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        if self.text.is_empty() {
            return Ok(Output::default());
        }
        Ok(Output::token(cx.leaf(LeafKind::Invalid, &self.text)))
    }
}

//! Fixed-order productions.
//!
//! Every declaration and statement (and a few expression forms with a
//! keyword, such as lambdas) is a [`SequenceState`] walking a static part
//! table. A part names the slot it fills, the shape of token that fits it
//! and, optionally, a slot that must already be filled before it may start.
//! Parts are optional: input that fits none of the remaining parts ends the
//! production and is left for the parent.

use gds_ir::{Keyword, LeafKind, NodeKind, OperatorKind, Punct, Slot, TokenId};
use gds_lexer_core::is_ident_start;

use super::block::{BlockKind, BlockState};
use super::expr::{can_start_expression, is_expression_word, ExprCtx, ExpressionState};
use super::group::{GroupKind, GroupState};
use super::inline_trivia;
use crate::reader::{Cx, OperatorState, Output, PendingLine, ReadingState, Signal, Step, WordState};
use crate::ParseResult;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ExprMode {
    Value,
    Statement,
    Type,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Shape {
    Keyword(&'static [Keyword]),
    /// An identifier with fixed text (`get`, `set`, `when`).
    Contextual(&'static str),
    Name,
    Punct(Punct),
    Operator(OperatorKind),
    Expr(ExprMode),
    Group(GroupKind),
    Block(BlockKind),
}

impl Shape {
    /// Parts filled by a single word or operator leaf, which is offered to
    /// the remaining parts once read.
    fn reads_leaf(self) -> bool {
        matches!(
            self,
            Shape::Keyword(_) | Shape::Contextual(_) | Shape::Name | Shape::Operator(_)
        )
    }
}

#[derive(Copy, Clone, Debug)]
struct Part {
    slot: Slot,
    shape: Shape,
    requires: Option<Slot>,
}

const fn part(slot: Slot, shape: Shape) -> Part {
    Part {
        slot,
        shape,
        requires: None,
    }
}

const fn after(requires: Slot, slot: Slot, shape: Shape) -> Part {
    Part {
        slot,
        shape,
        requires: Some(requires),
    }
}

use ExprMode as E;
use Shape as P;
use Slot as S;

const EXTENDS: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::Extends])),
    part(S::Base, P::Expr(E::Type)),
];

const CLASS_NAME: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::ClassName])),
    part(S::Name, P::Name),
    part(S::Comma, P::Punct(Punct::Comma)),
    after(S::Comma, S::Icon, P::Expr(E::Value)),
];

const INNER_CLASS: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::Class])),
    part(S::Name, P::Name),
    part(S::ExtendsKeyword, P::Keyword(&[Keyword::Extends])),
    after(S::ExtendsKeyword, S::Base, P::Expr(E::Type)),
    part(S::Colon, P::Punct(Punct::Colon)),
    after(S::Colon, S::Members, P::Block(BlockKind::Members)),
];

const ANNOTATION: &[Part] = &[
    part(S::At, P::Punct(Punct::At)),
    after(S::At, S::Name, P::Name),
    after(S::Name, S::Arguments, P::Group(GroupKind::Arguments)),
];

const SIGNAL: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::Signal])),
    part(S::Name, P::Name),
    part(S::Parameters, P::Group(GroupKind::Parameters)),
];

const ENUM: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::Enum])),
    part(S::Name, P::Name),
    part(S::Values, P::Group(GroupKind::EnumValues)),
];

const ENUM_VALUE: &[Part] = &[
    part(S::Name, P::Name),
    part(S::Assign, P::Operator(OperatorKind::Assign)),
    after(S::Assign, S::Value, P::Expr(E::Value)),
];

const CONSTANT: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::Const])),
    part(S::Name, P::Name),
    part(S::TypeColon, P::Punct(Punct::Colon)),
    after(S::TypeColon, S::Type, P::Expr(E::Type)),
    part(S::Assign, P::Operator(OperatorKind::Assign)),
    after(S::Assign, S::Value, P::Expr(E::Value)),
];

const VARIABLE: &[Part] = &[
    part(S::Static, P::Keyword(&[Keyword::Static])),
    part(S::Keyword, P::Keyword(&[Keyword::Var])),
    part(S::Name, P::Name),
    part(S::TypeColon, P::Punct(Punct::Colon)),
    after(S::TypeColon, S::Type, P::Expr(E::Type)),
    part(S::Assign, P::Operator(OperatorKind::Assign)),
    after(S::Assign, S::Initializer, P::Expr(E::Value)),
    part(S::AccessorColon, P::Punct(Punct::Colon)),
    after(S::AccessorColon, S::Accessors, P::Block(BlockKind::Accessors)),
];

const GET_ACCESSOR: &[Part] = &[
    part(S::Keyword, P::Contextual("get")),
    part(S::Assign, P::Operator(OperatorKind::Assign)),
    after(S::Assign, S::Method, P::Name),
    part(S::Colon, P::Punct(Punct::Colon)),
    after(S::Colon, S::Body, P::Block(BlockKind::Statements)),
];

const SET_ACCESSOR: &[Part] = &[
    part(S::Keyword, P::Contextual("set")),
    part(S::Parameters, P::Group(GroupKind::Parameters)),
    part(S::Assign, P::Operator(OperatorKind::Assign)),
    after(S::Assign, S::Method, P::Name),
    part(S::Colon, P::Punct(Punct::Colon)),
    after(S::Colon, S::Body, P::Block(BlockKind::Statements)),
];

const METHOD: &[Part] = &[
    part(S::Static, P::Keyword(&[Keyword::Static])),
    part(S::Keyword, P::Keyword(&[Keyword::Func])),
    part(S::Name, P::Name),
    part(S::Parameters, P::Group(GroupKind::Parameters)),
    part(S::Arrow, P::Operator(OperatorKind::Arrow)),
    after(S::Arrow, S::ReturnType, P::Expr(E::Type)),
    part(S::Colon, P::Punct(Punct::Colon)),
    after(S::Colon, S::Body, P::Block(BlockKind::Statements)),
];

const LAMBDA: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::Func])),
    part(S::Name, P::Name),
    part(S::Parameters, P::Group(GroupKind::Parameters)),
    part(S::Arrow, P::Operator(OperatorKind::Arrow)),
    after(S::Arrow, S::ReturnType, P::Expr(E::Type)),
    part(S::Colon, P::Punct(Punct::Colon)),
    after(S::Colon, S::Body, P::Block(BlockKind::Statements)),
];

const PARAMETER: &[Part] = &[
    part(S::Name, P::Name),
    part(S::TypeColon, P::Punct(Punct::Colon)),
    after(S::TypeColon, S::Type, P::Expr(E::Type)),
    part(S::Assign, P::Operator(OperatorKind::Assign)),
    after(S::Assign, S::Default, P::Expr(E::Value)),
];

const EXPRESSION_STATEMENT: &[Part] = &[part(S::Expression, P::Expr(E::Statement))];

const VARIABLE_DECLARATION: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::Var])),
    part(S::Name, P::Name),
    part(S::TypeColon, P::Punct(Punct::Colon)),
    after(S::TypeColon, S::Type, P::Expr(E::Type)),
    part(S::Assign, P::Operator(OperatorKind::Assign)),
    after(S::Assign, S::Initializer, P::Expr(E::Value)),
];

const IF_STATEMENT: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::If, Keyword::Elif])),
    part(S::Condition, P::Expr(E::Value)),
    part(S::Colon, P::Punct(Punct::Colon)),
    after(S::Colon, S::Body, P::Block(BlockKind::Statements)),
];

const ELSE_BRANCH: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::Else])),
    part(S::Colon, P::Punct(Punct::Colon)),
    after(S::Colon, S::Body, P::Block(BlockKind::Statements)),
];

const FOR_STATEMENT: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::For])),
    part(S::Variable, P::Name),
    part(S::TypeColon, P::Punct(Punct::Colon)),
    after(S::TypeColon, S::Type, P::Expr(E::Type)),
    part(S::InKeyword, P::Keyword(&[Keyword::In])),
    after(S::InKeyword, S::Collection, P::Expr(E::Value)),
    part(S::Colon, P::Punct(Punct::Colon)),
    after(S::Colon, S::Body, P::Block(BlockKind::Statements)),
];

const WHILE_STATEMENT: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::While])),
    part(S::Condition, P::Expr(E::Value)),
    part(S::Colon, P::Punct(Punct::Colon)),
    after(S::Colon, S::Body, P::Block(BlockKind::Statements)),
];

const MATCH_STATEMENT: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::Match])),
    part(S::Value, P::Expr(E::Value)),
    part(S::Colon, P::Punct(Punct::Colon)),
    after(S::Colon, S::Cases, P::Block(BlockKind::MatchCases)),
];

const MATCH_CASE: &[Part] = &[
    part(S::Patterns, P::Group(GroupKind::Patterns)),
    part(S::WhenKeyword, P::Contextual("when")),
    after(S::WhenKeyword, S::Guard, P::Expr(E::Value)),
    part(S::Colon, P::Punct(Punct::Colon)),
    after(S::Colon, S::Body, P::Block(BlockKind::Statements)),
];

const MATCH_BINDING: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::Var])),
    part(S::Name, P::Name),
];

const RETURN_STATEMENT: &[Part] = &[
    part(S::Keyword, P::Keyword(&[Keyword::Return])),
    part(S::Value, P::Expr(E::Value)),
];

const PASS_STATEMENT: &[Part] = &[part(S::Keyword, P::Keyword(&[Keyword::Pass]))];
const BREAK_STATEMENT: &[Part] = &[part(S::Keyword, P::Keyword(&[Keyword::Break]))];
const CONTINUE_STATEMENT: &[Part] = &[part(S::Keyword, P::Keyword(&[Keyword::Continue]))];
const BREAKPOINT_STATEMENT: &[Part] = &[part(S::Keyword, P::Keyword(&[Keyword::Breakpoint]))];

fn parts(kind: NodeKind) -> &'static [Part] {
    match kind {
        NodeKind::Extends => EXTENDS,
        NodeKind::ClassName => CLASS_NAME,
        NodeKind::InnerClass => INNER_CLASS,
        NodeKind::Annotation => ANNOTATION,
        NodeKind::Signal => SIGNAL,
        NodeKind::Enum => ENUM,
        NodeKind::EnumValue => ENUM_VALUE,
        NodeKind::Constant => CONSTANT,
        NodeKind::Variable => VARIABLE,
        NodeKind::GetAccessor => GET_ACCESSOR,
        NodeKind::SetAccessor => SET_ACCESSOR,
        NodeKind::Method => METHOD,
        NodeKind::Lambda => LAMBDA,
        NodeKind::Parameter => PARAMETER,
        NodeKind::ExpressionStatement => EXPRESSION_STATEMENT,
        NodeKind::VariableDeclaration => VARIABLE_DECLARATION,
        NodeKind::IfStatement => IF_STATEMENT,
        NodeKind::ElseBranch => ELSE_BRANCH,
        NodeKind::ForStatement => FOR_STATEMENT,
        NodeKind::WhileStatement => WHILE_STATEMENT,
        NodeKind::MatchStatement => MATCH_STATEMENT,
        NodeKind::MatchCase => MATCH_CASE,
        NodeKind::MatchBinding => MATCH_BINDING,
        NodeKind::ReturnStatement => RETURN_STATEMENT,
        NodeKind::PassStatement => PASS_STATEMENT,
        NodeKind::BreakStatement => BREAK_STATEMENT,
        NodeKind::ContinueStatement => CONTINUE_STATEMENT,
        NodeKind::BreakpointStatement => BREAKPOINT_STATEMENT,
        _ => &[],
    }
}

/// How an offered token fits a part.
enum Fit {
    No,
    /// The token fills the slot as is.
    Place,
    /// The token is the first word of an expression filling the slot.
    Seed(ExprMode),
}

pub(crate) struct SequenceState {
    node: TokenId,
    kind: NodeKind,
    parts: &'static [Part],
    /// First part that may still be filled.
    cursor: usize,
    /// Part the pushed child is reading for; `None` for trivia.
    active: Option<usize>,
    level: usize,
    brackets: bool,
    pending: Option<Box<dyn ReadingState>>,
    done: bool,
    handback: Option<TokenId>,
    line: Option<PendingLine>,
}

impl SequenceState {
    /// A production at indentation `level`. Inside `brackets` its
    /// expressions may span lines.
    pub(crate) fn new(cx: &mut Cx, kind: NodeKind, level: usize, brackets: bool) -> Box<Self> {
        Box::new(SequenceState {
            node: cx.node(kind),
            kind,
            parts: parts(kind),
            cursor: 0,
            active: None,
            level,
            brackets,
            pending: None,
            done: false,
            handback: None,
            line: None,
        })
    }

    /// Feed a token read before this production was chosen.
    pub(crate) fn seed(&mut self, cx: &mut Cx, token: TokenId) -> ParseResult<()> {
        if cx.arena.kind(token).is_trivia() {
            return Ok(cx.arena.push_extra(self.node, token)?);
        }
        if !self.offer(cx, token, self.cursor)? {
            cx.arena.invalidate(token);
            cx.arena.push_extra(self.node, token)?;
        }
        Ok(())
    }

    fn ctx(&self, mode: ExprMode) -> ExprCtx {
        let ctx = match mode {
            ExprMode::Value => ExprCtx::value(self.level),
            ExprMode::Statement => ExprCtx::statement(self.level),
            ExprMode::Type => ExprCtx::type_name(self.level),
        };
        if self.brackets {
            ctx.bracketed()
        } else {
            ctx
        }
    }

    fn requirement_met(&self, cx: &Cx, part: &Part) -> bool {
        part.requires.is_none_or(|slot| cx.arena.slot(self.node, slot).is_some())
    }

    fn fit(&self, cx: &Cx, part: &Part, token: TokenId) -> Fit {
        let kind = cx.arena.leaf_kind(token);
        let fits = match part.shape {
            Shape::Keyword(keywords) => cx.arena.keyword(token).is_some_and(|kw| keywords.contains(&kw)),
            Shape::Contextual(text) => kind == Some(LeafKind::Identifier) && cx.arena.text(token) == Some(text),
            Shape::Name => kind == Some(LeafKind::Identifier),
            Shape::Punct(p) => kind == Some(LeafKind::Punct(p)),
            Shape::Operator(op) => kind == Some(LeafKind::Operator(op)),
            Shape::Expr(mode) => {
                return if is_expression_word(cx, token, self.ctx(mode)) {
                    Fit::Seed(mode)
                } else {
                    Fit::No
                };
            }
            Shape::Group(_) | Shape::Block(_) => false,
        };
        if fits {
            Fit::Place
        } else {
            Fit::No
        }
    }

    /// Put `token` into the first part from `from` on that takes it.
    fn offer(&mut self, cx: &mut Cx, token: TokenId, from: usize) -> ParseResult<bool> {
        for index in from..self.parts.len() {
            let part = self.parts[index];
            if !self.requirement_met(cx, &part) {
                continue;
            }
            match self.fit(cx, &part, token) {
                Fit::No => {}
                Fit::Place => {
                    cx.arena.set_slot(self.node, part.slot, token)?;
                    self.cursor = index + 1;
                    return Ok(true);
                }
                Fit::Seed(mode) => {
                    let ctx = self.ctx(mode);
                    self.pending = Some(ExpressionState::seeded(cx, ctx, token)?);
                    self.active = Some(index);
                    self.cursor = index;
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn starts(&self, shape: Shape, signal: Signal) -> bool {
        let Signal::Char(c) = signal else {
            return matches!(shape, Shape::Block(_)) && signal != Signal::Eof;
        };
        match shape {
            Shape::Keyword(_) | Shape::Contextual(_) | Shape::Name => is_ident_start(c),
            Shape::Punct(p) => p.as_str().starts_with(c),
            Shape::Operator(op) => op.spellings().iter().any(|s| s.starts_with(c)),
            Shape::Expr(mode) => can_start_expression(c, self.ctx(mode)),
            Shape::Group(GroupKind::Patterns) => can_start_expression(c, ExprCtx::pattern(self.level)),
            Shape::Group(kind) => kind.opener() == Some(c),
            Shape::Block(_) => true,
        }
    }

    /// First part from the cursor that may start on `signal`.
    fn startable(&self, cx: &Cx, signal: Signal) -> Option<usize> {
        (self.cursor..self.parts.len()).find(|&index| {
            let part = &self.parts[index];
            self.requirement_met(cx, part) && self.starts(part.shape, signal)
        })
    }

    fn start(&mut self, cx: &mut Cx, index: usize, signal: Signal) -> ParseResult<Step> {
        let part = self.parts[index];
        self.active = Some(index);
        let state: Box<dyn ReadingState> = match part.shape {
            Shape::Keyword(_) | Shape::Contextual(_) | Shape::Name => WordState::new(),
            Shape::Operator(_) => OperatorState::new(),
            Shape::Punct(p) => {
                self.active = None;
                let leaf = cx.arena.punct(p);
                cx.arena.set_slot(self.node, part.slot, leaf)?;
                self.cursor = index + 1;
                return Ok(Step::Accept);
            }
            Shape::Expr(mode) => ExpressionState::new(self.ctx(mode)),
            Shape::Group(GroupKind::Patterns) => {
                GroupState::new(cx, GroupKind::Patterns, ExprCtx::pattern(self.level))
            }
            Shape::Group(kind) => GroupState::new(cx, kind, ExprCtx::value(self.level).bracketed()),
            Shape::Block(kind) => match signal {
                Signal::Char(_) => BlockState::inline(cx, kind, self.level),
                _ => BlockState::indented(cx, kind, self.level),
            },
        };
        Ok(Step::Push(state))
    }

    /// A block part whose opening is in place but which never started.
    fn body_missing(&self, cx: &Cx) -> bool {
        self.parts.iter().any(|part| {
            matches!(part.shape, Shape::Block(_))
                && self.requirement_met(cx, part)
                && cx.arena.slot(self.node, part.slot).is_none()
        })
    }

    /// `var x:` followed by a line break: the colon opens an accessor block
    /// rather than a type.
    fn retarget_accessor_colon(&mut self, cx: &mut Cx) -> ParseResult<()> {
        let filled = |slot| cx.arena.slot(self.node, slot).is_some();
        if !filled(Slot::TypeColon) || filled(Slot::Type) || filled(Slot::Assign) || filled(Slot::AccessorColon) {
            return Ok(());
        }
        let trailing = cx.arena.detach_trailing_extras(self.node);
        if let Some(colon) = cx.arena.clear_slot(self.node, Slot::TypeColon) {
            cx.arena.set_slot(self.node, Slot::AccessorColon, colon)?;
        }
        for token in trailing {
            cx.arena.push_extra(self.node, token)?;
        }
        if let Some(index) = self.parts.iter().position(|p| p.slot == Slot::Accessors) {
            self.cursor = index;
        }
        Ok(())
    }

    fn hand_back(&mut self, cx: &mut Cx, token: TokenId) -> ParseResult<()> {
        if let Some(earlier) = self.handback.replace(token) {
            cx.arena.invalidate(earlier);
            cx.arena.push_extra(self.node, earlier)?;
        }
        self.done = true;
        Ok(())
    }
}

impl ReadingState for SequenceState {
    fn name(&self) -> &'static str {
        "sequence"
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
        if let Some(state) = inline_trivia(signal) {
            self.active = None;
            return Ok(Step::Push(state));
        }
        match signal {
            Signal::Eof => {
                if self.body_missing(cx) {
                    cx.truncated = true;
                }
                return Ok(Step::Complete);
            }
            Signal::NewLine | Signal::CarriageReturn | Signal::CommentStart if self.kind == NodeKind::Variable => {
                self.retarget_accessor_colon(cx)?;
            }
            _ => {}
        }
        match self.startable(cx, signal) {
            Some(index) => self.start(cx, index, signal),
            None => Ok(Step::Complete),
        }
    }

    fn on_child(&mut self, cx: &mut Cx, out: Output) -> ParseResult<()> {
        let active = self.active.take();
        let Output {
            leading,
            token,
            trailing,
            handback,
            line,
        } = out;
        for token in leading {
            cx.arena.push_extra(self.node, token)?;
        }
        if let Some(token) = token {
            let kind = cx.arena.kind(token);
            match active.map(|index| (index, self.parts[index])) {
                _ if kind.is_trivia() || kind.is_invalid() => cx.arena.push_extra(self.node, token)?,
                None => cx.arena.push_extra(self.node, token)?,
                Some((index, part)) if part.shape.reads_leaf() => {
                    if !self.offer(cx, token, index)? {
                        self.hand_back(cx, token)?;
                    }
                }
                Some((index, part)) => {
                    cx.arena.set_slot(self.node, part.slot, token)?;
                    self.cursor = index + 1;
                }
            }
        } else if let Some(index) = active {
            // The part produced nothing; do not try it again.
            self.cursor = self.cursor.max(index + 1);
        }
        for token in trailing {
            cx.arena.push_extra(self.node, token)?;
        }
        if let Some(token) = handback {
            if self.done || !self.offer(cx, token, self.cursor)? {
                self.hand_back(cx, token)?;
            }
        }
        if let Some(line) = line {
            self.line = Some(line);
            self.done = true;
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        if let Some(pending) = self.pending.take() {
            let out = pending.finish(cx)?;
            self.on_child(cx, out)?;
        }
        let trailing = cx.arena.detach_trailing_extras(self.node);
        Ok(Output {
            token: Some(self.node),
            trailing,
            handback: self.handback,
            line: self.line,
            ..Output::default()
        })
    }
}

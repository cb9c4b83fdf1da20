//! Bracketed and comma-separated lists.

use gds_ir::{LeafKind, NodeKind, OperatorKind, Punct, Slot, TokenId};
use gds_lexer_core::is_ident_start;

use super::expr::{can_start_expression, ExprCtx, ExpressionState};
use super::sequence::SequenceState;
use super::{bracket_trivia, inline_trivia, TriviaStep};
use crate::reader::{Cx, Output, PendingLine, ReadingState, Signal, Step};
use crate::ParseResult;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum GroupKind {
    Arguments,
    Array,
    Dictionary,
    Parenthesized,
    Subscript,
    Parameters,
    EnumValues,
    /// Match-case patterns: no brackets, ends at the first token that is
    /// not a pattern or a comma.
    Patterns,
}

impl GroupKind {
    fn node_kind(self) -> NodeKind {
        match self {
            GroupKind::Arguments => NodeKind::ArgumentsList,
            GroupKind::Array => NodeKind::ArrayInitializer,
            GroupKind::Dictionary => NodeKind::DictionaryInitializer,
            GroupKind::Parenthesized => NodeKind::Parenthesized,
            GroupKind::Subscript => NodeKind::Subscript,
            GroupKind::Parameters => NodeKind::ParametersList,
            GroupKind::EnumValues => NodeKind::EnumValuesList,
            GroupKind::Patterns => NodeKind::PatternsList,
        }
    }

    fn brackets(self) -> Option<(Punct, Punct)> {
        match self {
            GroupKind::Arguments | GroupKind::Parenthesized | GroupKind::Parameters => {
                Some((Punct::OpenParen, Punct::CloseParen))
            }
            GroupKind::Array | GroupKind::Subscript => Some((Punct::OpenBracket, Punct::CloseBracket)),
            GroupKind::Dictionary | GroupKind::EnumValues => Some((Punct::OpenBrace, Punct::CloseBrace)),
            GroupKind::Patterns => None,
        }
    }

    /// Holds exactly one inner expression instead of a list.
    fn single(self) -> bool {
        matches!(self, GroupKind::Parenthesized | GroupKind::Subscript)
    }

    /// The character that opens this group.
    pub(crate) fn opener(self) -> Option<char> {
        self.brackets().and_then(|(open, _)| open.as_str().chars().next())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Expect {
    /// A new item (or dictionary key) may start.
    Item,
    /// A dictionary value may start.
    Value,
    /// Only a separator or the closing bracket.
    Separator,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Awaiting {
    Trivia,
    Item,
    Value,
}

pub(crate) struct GroupState {
    kind: GroupKind,
    node: TokenId,
    ctx: ExprCtx,
    opened: bool,
    expect: Expect,
    awaiting: Awaiting,
    /// Dictionary entry whose value is still being read.
    entry: Option<TokenId>,
    done: bool,
    handback: Option<TokenId>,
    line: Option<PendingLine>,
}

impl GroupState {
    /// `ctx` is the context of the group's items.
    pub(crate) fn new(cx: &mut Cx, kind: GroupKind, ctx: ExprCtx) -> Box<Self> {
        Box::new(GroupState {
            kind,
            node: cx.node(kind.node_kind()),
            ctx,
            opened: kind.brackets().is_none(),
            expect: Expect::Item,
            awaiting: Awaiting::Trivia,
            entry: None,
            done: false,
            handback: None,
            line: None,
        })
    }

    fn bare(&self) -> bool {
        self.kind.brackets().is_none()
    }

    /// Where trivia goes right now.
    fn container(&self) -> TokenId {
        self.entry.unwrap_or(self.node)
    }

    fn can_start_item(&self, c: char) -> bool {
        match self.kind {
            GroupKind::Parameters | GroupKind::EnumValues => is_ident_start(c),
            _ => can_start_expression(c, self.ctx),
        }
    }

    fn start_item(&mut self, cx: &mut Cx, awaiting: Awaiting) -> Box<dyn ReadingState> {
        self.awaiting = awaiting;
        match self.kind {
            GroupKind::Parameters => SequenceState::new(cx, NodeKind::Parameter, self.ctx.level, true),
            GroupKind::EnumValues => SequenceState::new(cx, NodeKind::EnumValue, self.ctx.level, true),
            _ => ExpressionState::new(self.ctx),
        }
    }

    fn place_item(&mut self, cx: &mut Cx, token: TokenId) -> ParseResult<()> {
        match self.kind {
            GroupKind::Parenthesized | GroupKind::Subscript => {
                cx.arena.set_slot(self.node, Slot::Inner, token)?;
            }
            GroupKind::Dictionary => {
                let entry = cx.node(NodeKind::KeyValue);
                cx.arena.set_slot(entry, Slot::Key, token)?;
                cx.arena.push_item(self.node, entry)?;
                self.entry = Some(entry);
            }
            _ => cx.arena.push_item(self.node, token)?,
        }
        self.expect = Expect::Separator;
        Ok(())
    }

    /// Place a token this group has no position for.
    fn reject(&mut self, cx: &mut Cx, token: TokenId) -> ParseResult<()> {
        if self.bare() && self.handback.is_none() {
            self.handback = Some(token);
            self.done = true;
            return Ok(());
        }
        cx.arena.invalidate(token);
        cx.arena.push_extra(self.container(), token)?;
        Ok(())
    }

    fn on_significant(&mut self, cx: &mut Cx, c: char) -> ParseResult<Step> {
        if let Some((_, close)) = self.kind.brackets() {
            if close.as_str().starts_with(c) {
                let leaf = cx.arena.punct(close);
                cx.arena.set_slot(self.node, Slot::Close, leaf)?;
                return Ok(Step::AcceptAndComplete);
            }
        }
        match c {
            ',' if !self.kind.single() => {
                self.entry = None;
                let comma = cx.arena.punct(Punct::Comma);
                cx.arena.push_extra(self.node, comma)?;
                self.expect = Expect::Item;
                Ok(Step::Accept)
            }
            ':' if self.kind == GroupKind::Dictionary && self.expect == Expect::Separator => {
                let Some(entry) = self.entry else {
                    return Ok(Step::Invalid);
                };
                let colon = cx.arena.punct(Punct::Colon);
                cx.arena.set_slot(entry, Slot::Colon, colon)?;
                self.expect = Expect::Value;
                Ok(Step::Accept)
            }
            c if self.expect == Expect::Item && self.can_start_item(c) => {
                Ok(Step::Push(self.start_item(cx, Awaiting::Item)))
            }
            c if self.expect == Expect::Value && can_start_expression(c, self.ctx) => {
                Ok(Step::Push(self.start_item(cx, Awaiting::Value)))
            }
            _ if self.bare() => Ok(Step::Complete),
            _ => Ok(Step::Invalid),
        }
    }
}

impl ReadingState for GroupState {
    fn name(&self) -> &'static str {
        match self.kind {
            GroupKind::Arguments => "arguments",
            GroupKind::Array => "array",
            GroupKind::Dictionary => "dictionary",
            GroupKind::Parenthesized => "parenthesized",
            GroupKind::Subscript => "subscript",
            GroupKind::Parameters => "parameters",
            GroupKind::EnumValues => "enum values",
            GroupKind::Patterns => "patterns",
        }
    }

    fn on_char(&mut self, cx: &mut Cx, c: char) -> ParseResult<Step> {
        self.on_signal(cx, Signal::Char(c))
    }

    fn on_signal(&mut self, cx: &mut Cx, signal: Signal) -> ParseResult<Step> {
        if self.done {
            return Ok(Step::Complete);
        }
        if !self.opened {
            // Pushed on the opening bracket.
            if let Some((open, _)) = self.kind.brackets() {
                let leaf = cx.arena.punct(open);
                cx.arena.set_slot(self.node, Slot::Open, leaf)?;
            }
            self.opened = true;
            return Ok(Step::Accept);
        }
        let trivia = if self.bare() {
            inline_trivia(signal).map(TriviaStep::Push)
        } else {
            bracket_trivia(cx, signal)
        };
        match trivia {
            Some(TriviaStep::Leaf(leaf)) => {
                cx.arena.push_extra(self.container(), leaf)?;
                return Ok(Step::Accept);
            }
            Some(TriviaStep::Push(state)) => {
                self.awaiting = Awaiting::Trivia;
                return Ok(Step::Push(state));
            }
            None => {}
        }
        match signal {
            Signal::Char(c) => self.on_significant(cx, c),
            Signal::Eof => {
                if !self.bare() {
                    cx.truncated = true;
                }
                Ok(Step::Complete)
            }
            _ => Ok(Step::Complete),
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
            cx.arena.push_extra(self.container(), token)?;
        }
        if let Some(token) = token {
            let kind = cx.arena.kind(token);
            match awaiting {
                _ if kind.is_trivia() || kind.is_invalid() => cx.arena.push_extra(self.container(), token)?,
                Awaiting::Trivia => cx.arena.push_extra(self.container(), token)?,
                Awaiting::Item => self.place_item(cx, token)?,
                Awaiting::Value => {
                    if let Some(entry) = self.entry.take() {
                        cx.arena.set_slot(entry, Slot::Value, token)?;
                    } else {
                        cx.arena.push_item(self.node, token)?;
                    }
                    self.expect = Expect::Separator;
                }
            }
        }
        for token in trailing {
            cx.arena.push_extra(self.container(), token)?;
        }
        if let Some(token) = handback {
            let assign = cx.arena.leaf_kind(token) == Some(LeafKind::Operator(OperatorKind::Assign));
            match self.entry {
                Some(entry) if assign && self.expect == Expect::Separator => {
                    cx.arena.set_slot(entry, Slot::Assign, token)?;
                    self.expect = Expect::Value;
                }
                _ => self.reject(cx, token)?,
            }
        }
        if let Some(line) = line {
            if self.bare() {
                self.line = Some(line);
                self.done = true;
            } else if let Some(indent) = line.indent {
                cx.arena.set_leaf_kind(indent, LeafKind::Space);
                cx.arena.push_extra(self.container(), indent)?;
            }
        }
        Ok(())
    }

    fn finish(self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
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

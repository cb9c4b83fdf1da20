//! Grammar Construct Builders
//!
//! Reading states that assemble nodes out of the leaves produced by
//! `crate::reader`. One state type covers each family of productions:
//!
//! - [`BlockState`]: line-oriented lists (class members, statements, match
//!   cases, property accessors) and the indentation rules that end them
//! - [`SequenceState`](sequence::SequenceState): productions made of named
//!   parts in a fixed order, driven by a per-kind part table
//! - [`ExpressionState`]: operands and operators read flat, then folded by
//!   precedence climbing
//! - [`GroupState`](group::GroupState): bracketed and comma-separated lists
//!
//! # Placement Rules
//!
//! Trivia read inside a node becomes an extra of that node. Trivia read
//! after a node's last significant token travels up in
//! [`Output::trailing`](crate::reader::Output) and is placed by the parent,
//! so a node never ends with whitespace.

mod block;
mod expr;
mod group;
mod sequence;

pub(crate) use block::{BlockKind, BlockState};
pub(crate) use expr::{can_start_expression, ExprCtx, ExpressionState};

use gds_ir::{LeafKind, NodeKind, Slot, TokenId};
use gds_lexer_core::is_inline_space;

use crate::reader::{
    CommentState, Cx, LineContinuationState, Output, ReadingState, Signal, Step, WhitespaceState,
};
use crate::ParseResult;

/// Reader for trivia that may appear anywhere inside brackets.
///
/// Line breaks become leaves directly; everything else that is trivia gets
/// a child state. Returns `None` for significant input.
fn bracket_trivia(cx: &mut Cx, signal: Signal) -> Option<TriviaStep> {
    match signal {
        Signal::NewLine => Some(TriviaStep::Leaf(cx.leaf(LeafKind::NewLine, "\n"))),
        Signal::CarriageReturn => Some(TriviaStep::Leaf(cx.leaf(LeafKind::CarriageReturn, "\r"))),
        Signal::CommentStart => Some(TriviaStep::Push(CommentState::new())),
        _ => inline_trivia(signal).map(TriviaStep::Push),
    }
}

/// Reader for trivia allowed inside a line.
fn inline_trivia(signal: Signal) -> Option<Box<dyn ReadingState>> {
    match signal {
        Signal::Char(c) if is_inline_space(c) => Some(WhitespaceState::new(LeafKind::Space)),
        Signal::Escape => Some(LineContinuationState::new()),
        _ => None,
    }
}

enum TriviaStep {
    /// Already read; place it and accept the signal.
    Leaf(TokenId),
    /// Push this reader; its token arrives through `on_child`.
    Push(Box<dyn ReadingState>),
}

/// Root state of a standalone expression.
///
/// The expression is read as if inside brackets, so it may span lines, and
/// anything after it is invalid.
pub(crate) struct ExpressionRootState {
    node: TokenId,
    read: bool,
}

impl ExpressionRootState {
    pub(crate) fn new(cx: &mut Cx) -> Box<Self> {
        Box::new(ExpressionRootState {
            node: cx.node(NodeKind::ExpressionStatement),
            read: false,
        })
    }

    fn ctx() -> ExprCtx {
        ExprCtx {
            assign: true,
            ..ExprCtx::value(0).bracketed()
        }
    }
}

impl ReadingState for ExpressionRootState {
    fn name(&self) -> &'static str {
        "expression root"
    }

    fn on_char(&mut self, cx: &mut Cx, c: char) -> ParseResult<Step> {
        self.on_signal(cx, Signal::Char(c))
    }

    fn on_signal(&mut self, cx: &mut Cx, signal: Signal) -> ParseResult<Step> {
        if let Some(trivia) = bracket_trivia(cx, signal) {
            return match trivia {
                TriviaStep::Leaf(leaf) => {
                    cx.arena.push_extra(self.node, leaf)?;
                    Ok(Step::Accept)
                }
                TriviaStep::Push(state) => Ok(Step::Push(state)),
            };
        }
        match signal {
            Signal::Eof => Ok(Step::Complete),
            Signal::Char(c) if !self.read && can_start_expression(c, Self::ctx()) => {
                self.read = true;
                Ok(Step::Push(ExpressionState::new(Self::ctx())))
            }
            _ => Ok(Step::Invalid),
        }
    }

    fn on_child(&mut self, cx: &mut Cx, out: Output) -> ParseResult<()> {
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
            if kind.is_trivia() || kind.is_invalid() || cx.arena.slot(self.node, Slot::Expression).is_some() {
                cx.arena.push_extra(self.node, token)?;
            } else {
                cx.arena.set_slot(self.node, Slot::Expression, token)?;
            }
        }
        for token in trailing {
            cx.arena.push_extra(self.node, token)?;
        }
        if let Some(token) = handback {
            cx.arena.invalidate(token);
            cx.arena.push_extra(self.node, token)?;
        }
        if let Some(indent) = line.and_then(|line| line.indent) {
            cx.arena.push_extra(self.node, indent)?;
        }
        Ok(())
    }

    fn finish(self: Box<Self>, _cx: &mut Cx) -> ParseResult<Output> {
        Ok(Output::token(self.node))
    }
}

#[cfg(test)]
mod tests;

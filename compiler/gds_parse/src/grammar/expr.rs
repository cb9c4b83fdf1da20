//! Expressions.
//!
//! An [`ExpressionState`] reads a flat run of pieces (operands, operator
//! leaves and trivia) while tracking only whether it expects an operand or
//! an operator. Postfix forms (`.member`, calls, subscripts) wrap the last
//! operand as soon as they finish. When the run ends, [`Fold`] climbs
//! precedence over the pieces to build the nested operator nodes.

use gds_ir::{Keyword, LeafKind, NodeKind, OperatorKind, Punct, Slot, TokenId, AWAIT_PRECEDENCE, TERNARY_PRECEDENCE};
use gds_lexer_core::is_ident_start;
use gds_stack::ensure_sufficient_stack;

use super::group::{GroupKind, GroupState};
use super::sequence::SequenceState;
use super::{bracket_trivia, inline_trivia, TriviaStep};
use crate::reader::{
    is_operator_start, Cx, DotsState, NodePathState, NumberState, OperatorState, Output, PendingLine,
    ReadingState, Signal, Step, StringState, WordState,
};
use crate::ParseResult;

/// Where an expression is read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ExprCtx {
    /// Inside brackets: line breaks and comments are trivia.
    pub brackets: bool,
    /// Assignment operators are allowed.
    pub assign: bool,
    /// Operators are read at all; type names only take dotted identifiers
    /// and subscripts.
    pub operators: bool,
    /// A match pattern: `..` and `var name` bindings are operands.
    pub pattern: bool,
    /// Indentation level of the enclosing statement, for lambda bodies.
    pub level: usize,
}

impl ExprCtx {
    pub(crate) fn value(level: usize) -> Self {
        ExprCtx {
            brackets: false,
            assign: false,
            operators: true,
            pattern: false,
            level,
        }
    }

    pub(crate) fn statement(level: usize) -> Self {
        ExprCtx {
            assign: true,
            ..Self::value(level)
        }
    }

    pub(crate) fn type_name(level: usize) -> Self {
        ExprCtx {
            operators: false,
            ..Self::value(level)
        }
    }

    pub(crate) fn pattern(level: usize) -> Self {
        ExprCtx {
            pattern: true,
            ..Self::value(level)
        }
    }

    #[must_use]
    pub(crate) fn bracketed(self) -> Self {
        ExprCtx {
            brackets: true,
            assign: false,
            ..self
        }
    }
}

/// Can `c` begin an expression in `ctx`?
pub(crate) fn can_start_expression(c: char, ctx: ExprCtx) -> bool {
    if is_ident_start(c) {
        return true;
    }
    if !ctx.operators {
        return matches!(c, '"' | '\'');
    }
    c.is_ascii_digit()
        || matches!(
            c,
            '.' | '"' | '\'' | '&' | '^' | '$' | '%' | '(' | '[' | '{' | '-' | '+' | '!' | '~'
        )
}

/// Can a word already read begin an expression in `ctx`?
pub(crate) fn is_expression_word(cx: &Cx, token: TokenId, ctx: ExprCtx) -> bool {
    match cx.arena.leaf_kind(token) {
        Some(LeafKind::Identifier) => true,
        Some(LeafKind::Keyword(kw)) if ctx.operators => {
            kw.is_literal()
                || matches!(kw, Keyword::Not | Keyword::Await)
                || (kw == Keyword::Func && !ctx.pattern)
                || (kw == Keyword::Var && ctx.pattern)
        }
        _ => false,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Op {
    Binary(OperatorKind),
    Prefix(OperatorKind),
    Await,
    TernaryIf,
    TernaryElse,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Piece {
    Operand(TokenId),
    Op(Op, TokenId),
    Trivia(TokenId),
}

impl Piece {
    fn token(self) -> TokenId {
        match self {
            Piece::Operand(t) | Piece::Op(_, t) | Piece::Trivia(t) => t,
        }
    }
}

/// What the pushed child will produce.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Awaiting {
    Trivia,
    Word,
    Member,
    Operand,
    Operator,
    Call,
    Index,
}

pub(crate) struct ExpressionState {
    ctx: ExprCtx,
    pieces: Vec<Piece>,
    awaiting: Awaiting,
    pending: Option<Box<dyn ReadingState>>,
    /// Index of a `.` still waiting for its member name.
    point: Option<usize>,
    /// Index of a `not` still waiting for `in`.
    not: Option<usize>,
    open_ternaries: usize,
    done: bool,
    handback: Option<TokenId>,
    line: Option<PendingLine>,
}

impl ExpressionState {
    pub(crate) fn new(ctx: ExprCtx) -> Box<Self> {
        Box::new(ExpressionState {
            ctx,
            pieces: Vec::new(),
            awaiting: Awaiting::Trivia,
            pending: None,
            point: None,
            not: None,
            open_ternaries: 0,
            done: false,
            handback: None,
            line: None,
        })
    }

    /// An expression whose first word was read by someone else.
    pub(crate) fn seeded(cx: &mut Cx, ctx: ExprCtx, word: TokenId) -> ParseResult<Box<Self>> {
        let mut state = Self::new(ctx);
        state.on_word(cx, word)?;
        Ok(state)
    }

    fn expects_operand(&self) -> bool {
        !matches!(
            self.pieces.iter().rev().find(|p| !matches!(p, Piece::Trivia(_))),
            Some(Piece::Operand(_))
        )
    }

    fn push(&mut self, awaiting: Awaiting, state: Box<dyn ReadingState>) -> ParseResult<Step> {
        self.awaiting = awaiting;
        Ok(Step::Push(state))
    }

    fn hand_back(&mut self, token: TokenId) {
        self.handback = Some(token);
        self.done = true;
    }

    fn on_significant(&mut self, cx: &mut Cx, c: char) -> ParseResult<Step> {
        if let Some(index) = self.point {
            if is_ident_start(c) {
                return self.push(Awaiting::Member, WordState::new());
            }
            self.point = None;
            cx.arena.invalidate(self.pieces[index].token());
        }
        if let Some(index) = self.not {
            if is_ident_start(c) {
                return self.push(Awaiting::Word, WordState::new());
            }
            self.not = None;
            cx.arena.invalidate(self.pieces[index].token());
        }
        if self.expects_operand() {
            self.operand_char(cx, c)
        } else {
            self.operator_char(cx, c)
        }
    }

    fn operand_char(&mut self, cx: &mut Cx, c: char) -> ParseResult<Step> {
        if is_ident_start(c) {
            return self.push(Awaiting::Word, WordState::new());
        }
        if !self.ctx.operators {
            return match c {
                '"' | '\'' => self.push(Awaiting::Operand, StringState::new()),
                _ => Ok(Step::Complete),
            };
        }
        let inner = self.ctx.bracketed();
        match c {
            '0'..='9' => self.push(Awaiting::Operand, NumberState::new()),
            '.' if self.ctx.pattern => self.push(Awaiting::Operand, DotsState::new()),
            '.' => self.push(Awaiting::Operand, NumberState::new()),
            '"' | '\'' | '&' | '^' => self.push(Awaiting::Operand, StringState::new()),
            '$' | '%' => self.push(Awaiting::Operand, NodePathState::new()),
            '(' => self.push(Awaiting::Operand, GroupState::new(cx, GroupKind::Parenthesized, inner)),
            '[' => self.push(Awaiting::Operand, GroupState::new(cx, GroupKind::Array, inner)),
            '{' => self.push(Awaiting::Operand, GroupState::new(cx, GroupKind::Dictionary, inner)),
            c if is_operator_start(c) => self.push(Awaiting::Operator, OperatorState::new()),
            _ => Ok(Step::Complete),
        }
    }

    fn operator_char(&mut self, cx: &mut Cx, c: char) -> ParseResult<Step> {
        let inner = self.ctx.bracketed();
        match c {
            '.' => {
                let point = cx.arena.punct(Punct::Point);
                self.point = Some(self.pieces.len());
                self.pieces.push(Piece::Trivia(point));
                Ok(Step::Accept)
            }
            '[' => self.push(Awaiting::Index, GroupState::new(cx, GroupKind::Subscript, inner)),
            _ if !self.ctx.operators => Ok(Step::Complete),
            '(' => self.push(Awaiting::Call, GroupState::new(cx, GroupKind::Arguments, inner)),
            c if is_ident_start(c) => self.push(Awaiting::Word, WordState::new()),
            c if is_operator_start(c) => self.push(Awaiting::Operator, OperatorState::new()),
            _ => Ok(Step::Complete),
        }
    }

    fn on_word(&mut self, cx: &mut Cx, word: TokenId) -> ParseResult<()> {
        if let Some(index) = self.not.take() {
            let not = self.pieces[index].token();
            if cx.arena.keyword(word) == Some(Keyword::In) {
                cx.arena.set_leaf_kind(not, LeafKind::Operator(OperatorKind::NotIn));
                self.pieces[index] = Piece::Op(Op::Binary(OperatorKind::NotIn), not);
                self.pieces.push(Piece::Trivia(word));
                return Ok(());
            }
            cx.arena.invalidate(not);
        }

        let keyword = cx.arena.keyword(word);
        let ops = self.ctx.operators;
        if self.expects_operand() {
            match keyword {
                None => self.pieces.push(Piece::Operand(word)),
                Some(kw) if ops && kw.is_literal() => self.pieces.push(Piece::Operand(word)),
                Some(Keyword::Not) if ops => {
                    cx.arena.set_leaf_kind(word, LeafKind::Operator(OperatorKind::Not));
                    self.pieces.push(Piece::Op(Op::Prefix(OperatorKind::Not), word));
                }
                Some(Keyword::Await) if ops => self.pieces.push(Piece::Op(Op::Await, word)),
                Some(Keyword::Func) if ops && !self.ctx.pattern => {
                    let mut lambda = SequenceState::new(cx, NodeKind::Lambda, self.ctx.level, false);
                    lambda.seed(cx, word)?;
                    self.pending = Some(lambda);
                    self.awaiting = Awaiting::Operand;
                }
                Some(Keyword::Var) if self.ctx.pattern => {
                    let mut binding = SequenceState::new(cx, NodeKind::MatchBinding, self.ctx.level, false);
                    binding.seed(cx, word)?;
                    self.pending = Some(binding);
                    self.awaiting = Awaiting::Operand;
                }
                _ => self.hand_back(word),
            }
            return Ok(());
        }

        if !ops {
            self.hand_back(word);
            return Ok(());
        }
        let binary = match keyword {
            Some(Keyword::And) => Some(OperatorKind::And),
            Some(Keyword::Or) => Some(OperatorKind::Or),
            Some(Keyword::In) => Some(OperatorKind::In),
            Some(Keyword::Is) => Some(OperatorKind::Is),
            Some(Keyword::As) => Some(OperatorKind::As),
            _ => None,
        };
        if let Some(kind) = binary {
            cx.arena.set_leaf_kind(word, LeafKind::Operator(kind));
            self.pieces.push(Piece::Op(Op::Binary(kind), word));
            return Ok(());
        }
        match keyword {
            Some(Keyword::Not) => {
                self.not = Some(self.pieces.len());
                self.pieces.push(Piece::Trivia(word));
            }
            Some(Keyword::If) if !self.ctx.pattern => {
                self.open_ternaries += 1;
                self.pieces.push(Piece::Op(Op::TernaryIf, word));
            }
            Some(Keyword::Else) if self.open_ternaries > 0 => {
                self.open_ternaries -= 1;
                self.pieces.push(Piece::Op(Op::TernaryElse, word));
            }
            _ => self.hand_back(word),
        }
        Ok(())
    }

    fn on_operator(&mut self, cx: &mut Cx, op: TokenId) {
        let text = cx.arena.text(op).unwrap_or_default();
        let prefix = OperatorKind::prefix_from_text(text);
        let binary = OperatorKind::binary_from_text(text);
        let arrow = text == "->";

        if self.expects_operand() {
            match prefix {
                Some(kind) => {
                    cx.arena.set_leaf_kind(op, LeafKind::Operator(kind));
                    self.pieces.push(Piece::Op(Op::Prefix(kind), op));
                }
                // Nothing read yet: the operator belongs to whoever comes next.
                None if self.pieces.is_empty() => self.hand_back(op),
                None => {
                    cx.arena.invalidate(op);
                    self.pieces.push(Piece::Trivia(op));
                }
            }
            return;
        }
        match binary {
            Some(kind) if kind.is_assignment() && !self.ctx.assign => self.hand_back(op),
            Some(kind) => self.pieces.push(Piece::Op(Op::Binary(kind), op)),
            None if arrow => self.hand_back(op),
            None => {
                cx.arena.invalidate(op);
                self.pieces.push(Piece::Trivia(op));
            }
        }
    }

    /// Index of the last operand, which a postfix form is about to wrap.
    fn last_operand(&self) -> Option<usize> {
        self.pieces.iter().rposition(|p| matches!(p, Piece::Operand(_)))
    }

    fn on_member(&mut self, cx: &mut Cx, word: TokenId) -> ParseResult<()> {
        let (Some(point), Some(target)) = (self.point.take(), self.last_operand()) else {
            cx.arena.invalidate(word);
            self.pieces.push(Piece::Trivia(word));
            return Ok(());
        };
        if cx.arena.keyword(word).is_some() {
            cx.arena.set_leaf_kind(word, LeafKind::Identifier);
        }
        let node = cx.node(NodeKind::MemberAccess);
        cx.arena.set_slot(node, Slot::Target, self.pieces[target].token())?;
        for piece in &self.pieces[target + 1..point] {
            cx.arena.push_extra(node, piece.token())?;
        }
        cx.arena.set_slot(node, Slot::Point, self.pieces[point].token())?;
        for piece in &self.pieces[point + 1..] {
            cx.arena.push_extra(node, piece.token())?;
        }
        cx.arena.set_slot(node, Slot::Member, word)?;
        self.pieces.truncate(target);
        self.pieces.push(Piece::Operand(node));
        Ok(())
    }

    fn wrap_postfix(&mut self, cx: &mut Cx, kind: NodeKind, target_slot: Slot, tail_slot: Slot, tail: TokenId) -> ParseResult<()> {
        let Some(target) = self.last_operand() else {
            self.pieces.push(Piece::Operand(tail));
            return Ok(());
        };
        let node = cx.node(kind);
        cx.arena.set_slot(node, target_slot, self.pieces[target].token())?;
        for piece in &self.pieces[target + 1..] {
            cx.arena.push_extra(node, piece.token())?;
        }
        cx.arena.set_slot(node, tail_slot, tail)?;
        self.pieces.truncate(target);
        self.pieces.push(Piece::Operand(node));
        Ok(())
    }
}

impl ReadingState for ExpressionState {
    fn name(&self) -> &'static str {
        "expression"
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
        let trivia = if self.ctx.brackets {
            bracket_trivia(cx, signal)
        } else {
            inline_trivia(signal).map(TriviaStep::Push)
        };
        match trivia {
            Some(TriviaStep::Leaf(leaf)) => {
                self.pieces.push(Piece::Trivia(leaf));
                return Ok(Step::Accept);
            }
            Some(TriviaStep::Push(state)) => return self.push(Awaiting::Trivia, state),
            None => {}
        }
        match signal {
            Signal::Char(c) => self.on_significant(cx, c),
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
            self.pieces.push(Piece::Trivia(token));
        }
        if let Some(token) = token {
            let kind = cx.arena.kind(token);
            if kind.is_trivia() || kind.is_invalid() || cx.arena.leaf_kind(token) == Some(LeafKind::Punct(Punct::Point)) {
                if !kind.is_trivia() {
                    cx.arena.invalidate(token);
                }
                self.pieces.push(Piece::Trivia(token));
            } else {
                match awaiting {
                    Awaiting::Trivia => self.pieces.push(Piece::Trivia(token)),
                    Awaiting::Word => self.on_word(cx, token)?,
                    Awaiting::Member => self.on_member(cx, token)?,
                    Awaiting::Operand => self.pieces.push(Piece::Operand(token)),
                    Awaiting::Operator => self.on_operator(cx, token),
                    Awaiting::Call => self.wrap_postfix(cx, NodeKind::Call, Slot::Callee, Slot::Arguments, token)?,
                    Awaiting::Index => self.wrap_postfix(cx, NodeKind::Indexer, Slot::Target, Slot::Subscript, token)?,
                }
            }
        }
        for token in trailing {
            self.pieces.push(Piece::Trivia(token));
        }
        if let Some(token) = handback {
            if self.done {
                cx.arena.invalidate(token);
                self.pieces.push(Piece::Trivia(token));
            } else if cx.arena.leaf_kind(token).is_some_and(|k| matches!(k, LeafKind::Keyword(_) | LeafKind::Identifier)) {
                self.on_word(cx, token)?;
            } else {
                self.hand_back(token);
            }
        }
        if let Some(line) = line {
            if self.ctx.brackets {
                if let Some(indent) = line.indent {
                    cx.arena.set_leaf_kind(indent, LeafKind::Space);
                    self.pieces.push(Piece::Trivia(indent));
                }
            } else {
                self.line = Some(line);
                self.done = true;
            }
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>, cx: &mut Cx) -> ParseResult<Output> {
        if let Some(pending) = self.pending.take() {
            let out = pending.finish(cx)?;
            self.on_child(cx, out)?;
        }
        for index in self.point.take().into_iter().chain(self.not.take()) {
            cx.arena.invalidate(self.pieces[index].token());
        }
        let ExpressionState {
            pieces, handback, line, ..
        } = *self;

        let mut fold = Fold { cx, pieces: &pieces, pos: 0 };
        let top = fold.expr(0)?;
        let first = top.map_or(0, |built| built.start);
        let rest = top.map_or(0, |built| built.end);
        for piece in &pieces[rest..] {
            if let Piece::Op(_, token) = piece {
                cx.arena.invalidate(*token);
            }
        }
        Ok(Output {
            leading: pieces[..first].iter().map(|p| p.token()).collect(),
            token: top.map(|built| built.token),
            trailing: pieces[rest..].iter().map(|p| p.token()).collect(),
            handback,
            line,
        })
    }
}

/// A node built over the pieces `start..end`.
#[derive(Copy, Clone, Debug)]
struct Built {
    token: TokenId,
    start: usize,
    end: usize,
}

/// Precedence climbing over a finished run of pieces.
struct Fold<'a> {
    cx: &'a mut Cx,
    pieces: &'a [Piece],
    pos: usize,
}

impl Fold<'_> {
    /// Next significant piece at or after the cursor.
    fn peek(&self) -> Option<(usize, Piece)> {
        self.pieces[self.pos..]
            .iter()
            .position(|p| !matches!(p, Piece::Trivia(_)))
            .map(|offset| (self.pos + offset, self.pieces[self.pos + offset]))
    }

    fn single(index: usize, token: TokenId) -> Built {
        Built {
            token,
            start: index,
            end: index + 1,
        }
    }

    fn expr(&mut self, min: u8) -> ParseResult<Option<Built>> {
        self.cx.frames.enter()?;
        let built = ensure_sufficient_stack(|| self.expr_inner(min));
        self.cx.frames.leave();
        built
    }

    fn expr_inner(&mut self, min: u8) -> ParseResult<Option<Built>> {
        let Some(mut lhs) = self.prefix()? else {
            return Ok(None);
        };
        while let Some((index, Piece::Op(op, token))) = self.peek() {
            match op {
                Op::Binary(kind) => {
                    let Some(prec) = kind.binary_precedence() else {
                        break;
                    };
                    if prec < min {
                        break;
                    }
                    self.pos = index + 1;
                    let next = if kind.is_right_associative() { prec } else { prec + 1 };
                    let Some(rhs) = self.expr(next)? else {
                        self.cx.arena.invalidate(token);
                        break;
                    };
                    lhs = self.assemble(
                        NodeKind::DualOperator,
                        &[(Slot::Left, lhs), (Slot::Operator, Self::single(index, token)), (Slot::Right, rhs)],
                    )?;
                }
                Op::TernaryIf => {
                    if TERNARY_PRECEDENCE < min {
                        break;
                    }
                    self.pos = index + 1;
                    let mut parts = vec![(Slot::TrueValue, lhs), (Slot::IfKeyword, Self::single(index, token))];
                    let condition = self.expr(TERNARY_PRECEDENCE + 1)?;
                    let mut complete = false;
                    if let Some(condition) = condition {
                        parts.push((Slot::Condition, condition));
                        if let Some((at, Piece::Op(Op::TernaryElse, else_token))) = self.peek() {
                            self.pos = at + 1;
                            parts.push((Slot::ElseKeyword, Self::single(at, else_token)));
                            match self.expr(TERNARY_PRECEDENCE)? {
                                Some(value) => {
                                    parts.push((Slot::FalseValue, value));
                                    complete = true;
                                }
                                None => self.cx.arena.invalidate(else_token),
                            }
                        }
                    }
                    if !complete {
                        self.cx.arena.invalidate(token);
                    }
                    lhs = self.assemble(NodeKind::Ternary, &parts)?;
                }
                // An `else` belonging to an enclosing ternary, or a stray prefix.
                _ => break,
            }
        }
        Ok(Some(lhs))
    }

    fn prefix(&mut self) -> ParseResult<Option<Built>> {
        let Some((index, piece)) = self.peek() else {
            return Ok(None);
        };
        let (node_kind, op_slot, prec, token) = match piece {
            Piece::Operand(token) => {
                self.pos = index + 1;
                return Ok(Some(Self::single(index, token)));
            }
            Piece::Op(Op::Prefix(kind), token) => (
                NodeKind::SingleOperator,
                Slot::Operator,
                kind.prefix_precedence().unwrap_or(AWAIT_PRECEDENCE),
                token,
            ),
            Piece::Op(Op::Await, token) => (NodeKind::Await, Slot::Keyword, AWAIT_PRECEDENCE, token),
            _ => return Ok(None),
        };
        self.pos = index + 1;
        match self.expr(prec)? {
            Some(operand) => self
                .assemble(node_kind, &[(op_slot, Self::single(index, token)), (Slot::Operand, operand)])
                .map(Some),
            None => {
                self.cx.arena.invalidate(token);
                Ok(None)
            }
        }
    }

    /// Build a `kind` node over `parts` (in text order); pieces between them
    /// become extras.
    fn assemble(&mut self, kind: NodeKind, parts: &[(Slot, Built)]) -> ParseResult<Built> {
        let node = self.cx.node(kind);
        let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
            return Ok(Built { token: node, start: self.pos, end: self.pos });
        };
        let (start, end) = (first.1.start, last.1.end);
        let mut at = start;
        let mut next = parts.iter().peekable();
        while at < end {
            match next.peek() {
                Some((slot, built)) if built.start == at => {
                    self.cx.arena.set_slot(node, *slot, built.token)?;
                    at = built.end;
                    next.next();
                }
                _ => {
                    self.cx.arena.push_extra(node, self.pieces[at].token())?;
                    at += 1;
                }
            }
        }
        Ok(Built { token: node, start, end })
    }
}

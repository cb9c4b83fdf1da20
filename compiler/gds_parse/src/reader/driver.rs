//! The automaton driver: owns the state stack and routes signals.

use gds_ir::LeafKind;
use gds_stack::{check_depth, DepthLimit};
use tracing::trace;

use super::{Cx, InvalidState, Output, ReadingState, Signal, Step};
use crate::{ParseResult, ParserConfig};

/// Steps one signal may take beyond four per stacked state before the top
/// state is forced to absorb it as invalid text.
const REPASS_SLACK: usize = 16;

pub(crate) struct Reader {
    cx: Cx,
    stack: Vec<Box<dyn ReadingState>>,
    output: Option<Output>,
    /// Text that arrived after the root state finished.
    leftover: String,
}

impl Reader {
    /// A reader whose root state is built by `root`.
    pub(crate) fn new(
        config: ParserConfig,
        root: impl FnOnce(&mut Cx) -> Box<dyn ReadingState>,
    ) -> ParseResult<Self> {
        let mut cx = Cx::new(config);
        let root = root(&mut cx);
        let mut reader = Reader {
            cx,
            stack: Vec::with_capacity(16),
            output: None,
            leftover: String::new(),
        };
        reader.push(root)?;
        Ok(reader)
    }

    pub(crate) fn feed(&mut self, text: &str) -> ParseResult<()> {
        for c in text.chars() {
            self.signal(Signal::from_char(c))?;
        }
        Ok(())
    }

    /// Deliver end of input and return the root state's output.
    pub(crate) fn finish(mut self) -> ParseResult<(Cx, Output)> {
        self.signal(Signal::Eof)?;
        while !self.stack.is_empty() {
            self.pop()?;
        }
        let mut output = self.output.take().unwrap_or_default();
        if !self.leftover.is_empty() {
            let leaf = self.cx.leaf(LeafKind::Invalid, &self.leftover);
            output.trailing.push(leaf);
        }
        Ok((self.cx, output))
    }

    fn signal(&mut self, signal: Signal) -> ParseResult<()> {
        let mut budget = 4 * (self.stack.len() + REPASS_SLACK);
        let mut steps = 0;
        loop {
            let Some(top) = self.stack.last_mut() else {
                if let Some(c) = signal.char() {
                    self.leftover.push(c);
                }
                return Ok(());
            };
            steps += 1;
            let step = if steps > budget {
                trace!(state = top.name(), ?signal, "repass limit reached");
                Step::Invalid
            } else {
                top.on_signal(&mut self.cx, signal)?
            };
            match step {
                Step::Accept => return Ok(()),
                Step::AcceptAndComplete => {
                    self.pop()?;
                    return Ok(());
                }
                Step::Complete => self.pop()?,
                Step::Push(state) => self.push(state)?,
                // Nothing is left to absorb: end of input always unwinds.
                Step::Invalid if signal == Signal::Eof => self.pop()?,
                Step::Invalid => {
                    trace!(?signal, depth = self.stack.len(), "absorbing invalid text");
                    self.push(InvalidState::new())?;
                    steps = 0;
                    budget = 1;
                }
            }
        }
    }

    fn push(&mut self, state: Box<dyn ReadingState>) -> ParseResult<()> {
        let depth = self.stack.len() + 1;
        check_depth(depth, self.cx.config.max_reading_stack, DepthLimit::ReadingStack)?;
        trace!(state = state.name(), depth, "push");
        self.stack.push(state);
        Ok(())
    }

    fn pop(&mut self) -> ParseResult<()> {
        let Some(state) = self.stack.pop() else {
            return Ok(());
        };
        trace!(state = state.name(), depth = self.stack.len(), "pop");
        let output = state.finish(&mut self.cx)?;
        match self.stack.last_mut() {
            Some(parent) => parent.on_child(&mut self.cx, output),
            None => {
                self.output = Some(output);
                Ok(())
            }
        }
    }
}

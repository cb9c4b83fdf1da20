//! Depth limits and stack safety for deep recursion.
//!
//! Two independent bounds protect the parser from pathological input:
//!
//! - the **reading stack**: the explicit stack of reading states kept by the
//!   character automaton (one entry per open construct);
//! - **trace frames**: native recursion performed while assembling trees,
//!   for example precedence climbing over a long operator chain.
//!
//! Exceeding either bound yields a [`DepthOverflow`] that names the limit, so
//! callers can tell the two apart. Native recursion additionally runs under
//! [`ensure_sufficient_stack`], which grows the stack on demand.
//!
//! # Platform Support
//!
//! - **Native targets**: Uses the `stacker` crate to grow the stack on demand.
//! - **WASM targets**: No-op passthrough (WASM has its own stack management).

use std::fmt;

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// If the remaining stack is below the red zone threshold, additional stack
/// space is allocated before calling `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Which depth bound was exceeded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DepthLimit {
    /// Too many nested reading states.
    ReadingStack,
    /// Too many nested recursive frames while assembling a tree.
    TraceFrames,
}

impl fmt::Display for DepthLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepthLimit::ReadingStack => f.write_str("reading stack"),
            DepthLimit::TraceFrames => f.write_str("trace frames"),
        }
    }
}

/// Nesting exceeded a configured maximum.
///
/// This is the only failure a parse can report; malformed text never is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{limit} depth {depth} exceeds the configured maximum of {max}")]
pub struct DepthOverflow {
    /// The depth that was about to be reached.
    pub depth: usize,
    /// The configured maximum.
    pub max: usize,
    /// Which bound was hit.
    pub limit: DepthLimit,
}

/// Check that growing a stack to `depth` entries stays within `max`.
///
/// `None` disables the check.
#[inline]
pub fn check_depth(depth: usize, max: Option<usize>, limit: DepthLimit) -> Result<(), DepthOverflow> {
    match max {
        Some(max) if depth > max => Err(DepthOverflow { depth, max, limit }),
        _ => Ok(()),
    }
}

/// Counts nested recursive frames against the trace-frame limit.
///
/// Callers pair every successful [`enter`](Self::enter) with a
/// [`leave`](Self::leave). A failed `enter` leaves the count unchanged, and
/// the whole parse is abandoned with the returned error anyway.
#[derive(Clone, Debug)]
pub struct FrameCounter {
    depth: usize,
    peak: usize,
    max: Option<usize>,
}

impl FrameCounter {
    pub fn new(max: Option<usize>) -> Self {
        FrameCounter { depth: 0, peak: 0, max }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest nesting seen so far.
    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// Enter one frame, failing when the limit would be exceeded.
    #[inline]
    pub fn enter(&mut self) -> Result<(), DepthOverflow> {
        let next = self.depth + 1;
        check_depth(next, self.max, DepthLimit::TraceFrames)?;
        self.depth = next;
        self.peak = self.peak.max(next);
        Ok(())
    }

    /// Leave the innermost frame.
    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "unbalanced FrameCounter::leave");
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests;

//! Offset and context windows for vector-based `Parser` types
//!
//! This module contains the stateful components of buffer-based `Parser`
//! implementations: a monotonically increasing index into an immutable
//! buffer, and a stack of *context-window* target offsets that bound how
//! far the index is allowed to advance before the innermost window is
//! closed.

use crate::parse::error::{ParseError, ParseResult, WindowError};

/// Wrapper around [`usize`] that represents monotonically increasing indices
/// into a buffer.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
struct Index(usize);

impl Index {
    /// Constructs a new `Index` object initialized to `0`
    #[inline(always)]
    #[must_use]
    fn new() -> Self {
        Self(0usize)
    }

    /// Advances the held value by `n` unless this would cause it to exceed
    /// `lim`.
    ///
    /// Returns the original value (before incrementation), along with a
    /// boolean value that is `true` if and only if the increment occurred.
    #[inline]
    fn increment_checked(&mut self, n: usize, lim: usize) -> (usize, bool) {
        let ret = self.0;
        let is_valid = self.0 + n <= lim;
        if is_valid {
            self.0 += n;
        }
        (ret, is_valid)
    }

    #[must_use]
    #[inline(always)]
    fn to_usize(self) -> usize {
        self.0
    }
}

/// Vector-based stack of target offsets representing the implicit bounds of
/// context windows.
///
/// The elements of a `FrameStack` are guaranteed by induction to be sorted
/// with the smallest value at the top of the stack.
#[derive(Debug, Default)]
#[repr(transparent)]
struct FrameStack(Vec<usize>);

impl FrameStack {
    fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns a copy of the innermost target offset, or `None` when there
    /// are no extant context windows.
    fn peek(&self) -> Option<usize> {
        self.0.last().copied()
    }

    fn pop(&mut self) -> Option<usize> {
        self.0.pop()
    }

    /// Pushes a new target offset, provided that doing so would not violate
    /// the nesting invariant against the innermost extant window.
    fn push_frame(&mut self, target: usize) -> ParseResult<()> {
        match self.peek() {
            Some(limit) if target > limit => Err(ParseError::Window(
                WindowError::OpenWouldExceedWindow {
                    limit,
                    request: target,
                },
            )),
            _ => {
                self.0.push(target);
                Ok(())
            }
        }
    }
}

/// Utility type for tracking both the current offset of a static
/// buffer-based parser, and its stack of context-windows.
#[derive(Debug)]
pub(crate) struct ContextOffset {
    abs: usize,
    frames: FrameStack,
    cur: Index,
}

impl ContextOffset {
    /// Constructor for `ContextOffset` that takes the maximal index in the
    /// buffer it is tracking an offset into, and initializes its internal
    /// index to `0`.
    #[must_use]
    pub fn with_limit(abs: usize) -> Self {
        Self {
            abs,
            frames: FrameStack::new(),
            cur: Index::new(),
        }
    }

    /// Returns the current value of the tracked offset.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.cur.to_usize()
    }

    /// Returns the upper bound of the narrowest context-window, or the
    /// absolute limit if there are no context windows set.
    #[inline]
    #[must_use]
    pub fn limit(&self) -> usize {
        self.frames.peek().unwrap_or(self.abs)
    }

    /// Attempt to increment the index-value by `n`.
    ///
    /// Returns a tuple containing the original index, as well as a boolean
    /// indicating whether the increment was valid, and therefore, whether
    /// it was performed.
    #[inline]
    pub fn advance(&mut self, n: usize) -> (usize, bool) {
        self.cur.increment_checked(n, self.limit())
    }

    /// Attempts to create a new context-frame of the specified window-size,
    /// measured from the current value of the offset index. Will fail if the
    /// novel context-frame exceeds the absolute limit set at time of
    /// creation, or if it would violate the nesting invariant of the
    /// innermost context-frame of the stack, assuming it is non-empty.
    pub fn set_fit(&mut self, winsize: usize) -> ParseResult<()> {
        let cur: usize = self.index();
        let new_tgt: usize = cur + winsize;
        if new_tgt > self.abs {
            Err(ParseError::Window(WindowError::OpenWouldExceedBuffer {
                bytes_left: self.abs - cur,
                request: winsize,
            }))
        } else {
            self.frames.push_frame(new_tgt)
        }
    }

    /// Tests whether the current offset matches the goal offset of the
    /// innermost context frame; in other words, whether a call to
    /// [`enforce_target`](Self::enforce_target) would succeed in the
    /// current state.
    pub fn test_target(&self) -> ParseResult<bool> {
        let cur = self.index();

        if let Some(tgt) = self.frames.peek() {
            match tgt.cmp(&cur) {
                std::cmp::Ordering::Equal => Ok(true),
                std::cmp::Ordering::Greater => Ok(false),
                std::cmp::Ordering::Less => Err(ParseError::Window(WindowError::OffsetOverflow {
                    excess: cur - tgt,
                })),
            }
        } else {
            Ok(false)
        }
    }

    /// Attempts to close the innermost context-frame.
    ///
    /// This method returns `Ok(())` when the current offset exactly equals
    /// the innermost target offset, and fails otherwise, including the case
    /// where there are no context-windows to close.
    pub fn enforce_target(&mut self) -> ParseResult<()> {
        let cur: usize = self.index();

        match self.frames.pop() {
            None => Err(ParseError::Window(WindowError::CloseWithoutWindow)),
            Some(tgt) => match tgt.cmp(&cur) {
                std::cmp::Ordering::Equal => Ok(()),
                std::cmp::Ordering::Greater => {
                    Err(ParseError::Window(WindowError::CloseWithResidue {
                        residual: tgt - cur,
                    }))
                }
                std::cmp::Ordering::Less => Err(ParseError::Window(WindowError::OffsetOverflow {
                    excess: cur - tgt,
                })),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn window_nesting() {
        let mut offset = ContextOffset::with_limit(10);
        assert!(offset.set_fit(6).is_ok());
        assert!(offset.set_fit(8).is_err());
        assert_eq!(offset.advance(4), (0, true));
        assert!(offset.set_fit(2).is_ok());
        assert_eq!(offset.advance(3), (4, false));
        assert_eq!(offset.advance(2), (4, true));
        assert!(offset.enforce_target().is_ok());
        assert!(offset.enforce_target().is_ok());
        assert!(offset.enforce_target().is_err());
    }
}

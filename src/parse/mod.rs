//! Custom parsing model with byte-level precision
//!
//! This module provides the fundamental definitions related to the abstract
//! task of processing raw sequences of binary data into the low-level
//! fragments at the leaf nodes of an arbitrarily complex user-defined type.
//!
//! For type-aware parsing, in other words, parsing user-defined types
//! directly rather than as an unstructured sequence of primitives, see the
//! [`Decode`](crate::conv::Decode) trait, which is a high-level interface
//! built almost entirely around the definitions contained within this
//! module.
//!
//! # Model
//!
//! * A Parser-object is constructed over an immutable byte-buffer.
//! * All parsing is done in a non-backtracking, zero-lookahead fashion; a
//!   byte in the buffer can only be viewed by consuming it, and only after
//!   all preceding indices in the buffer have been consumed; after a byte
//!   is consumed, it cannot be consumed again.
//! * A *context-window*, or a bounded contiguous view of a section of the
//!   buffer, may be constructed. While a context-window exists, any bytes
//!   beyond its upper bound are protected and cannot be consumed by any
//!   Parser method until that context window is lifted. A context-window
//!   can only be lifted by calling [`enforce_target`] when all bytes within
//!   the window have been consumed.
//!
//! Context-windows are how every length-prefixed composite in the wire
//! formats of this crate is delimited on decode: the length prefix is
//! consumed, a window of exactly that many bytes is opened with
//! [`set_fit`], the contents are parsed, and the window is closed. A
//! declared length that extends past the enclosing window or buffer is
//! detected at `set_fit` time, and contents that fall short of their
//! declared length are detected at `enforce_target` time.
//!
//! [`set_fit`]: Parser::set_fit
//! [`enforce_target`]: Parser::enforce_target

pub mod error;

pub use error::ParseResult;
use error::{InternalError, ParseError, TagError, TokenError};
use std::convert::{TryFrom, TryInto};

/// Abstraction over stateful parse-objects with context-window support
///
/// The following properties should be respected by each implementation of
/// the `Parser` trait:
///
/// * A fresh `p : impl Parser` object should have `p.offset() == 0` and
///   `p.view_len()` equal to the length of the parse-buffer
/// * `self.remainder() := self.view_len() - self.offset()` is the largest
///   possible `n` for which `self.consume(n)` returns an `Ok(_)` value,
///   which should also be the largest possible `n` for which
///   `self.set_fit(n)` succeeds.
/// * Immediately after a successful call of `self.set_fit(n)`,
///   `self.remainder()` should return `n`
/// * `self.enforce_target()` should remove the most recently set target if
///   and only if the current window has been fully consumed
pub trait Parser {
    /// Buffer type a new `Parser` object can be safely and infallibly
    /// instantiated from a value of.
    type Buffer;

    /// Constructs an initialized `Parser` value over a buffer
    fn from_buffer(buf: Self::Buffer) -> Self;

    /// Computes the length of the current view of the Parser's buffer.
    fn view_len(&self) -> usize;

    /// Computes the current value of the offset into the Parser's buffer.
    fn offset(&self) -> usize;

    /// Computes the remaining number of bytes that can be safely consumed
    /// in the current context.
    fn remainder(&self) -> usize {
        self.view_len() - self.offset()
    }

    /// Consumes and returns a single byte from the current offset position
    /// in the buffer.
    fn consume_byte(&mut self) -> ParseResult<u8>;

    /// Attempt to consume and return a slice of length `nbytes`,
    /// starting from the first unconsumed byte in the buffer.
    ///
    /// # Invariants
    ///
    /// This method **MUST** return `Ok(s)` when and only when no bounds or
    /// limits were violated, and in such cases, `s.len()` must be equal to
    /// the requested length `nbytes`. Failure to guarantee this is an
    /// implementation bug.
    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]>;

    /// Creates a new context-window that permits exactly `n` more bytes to
    /// be consumed before subsequent consume operations fail.
    fn set_fit(&mut self, n: usize) -> ParseResult<()>;

    /// Tests whether there is a context window open that can be safely
    /// closed without consuming any more bytes.
    fn test_target(&mut self) -> ParseResult<bool>;

    /// Attempts to close the current context-window.
    ///
    /// This method must fail when there are no context windows left
    /// unclosed, or when there is at least one byte remaining in the
    /// current context window.
    fn enforce_target(&mut self) -> ParseResult<()>;

    /// Consumes `N` bytes and returns them in array-form
    fn consume_arr<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        error::coerce_slice(self.consume(N)?)
    }

    /// Consumes one byte and returns it as a `u8` value
    #[inline]
    fn take_u8(&mut self) -> ParseResult<u8> {
        self.consume_byte()
    }

    /// Consumes one byte and returns it as an `i8` value
    #[inline]
    fn take_i8(&mut self) -> ParseResult<i8> {
        Ok(self.consume_byte()? as i8)
    }

    /// Consumes two bytes and returns the corresponding `u16` value
    ///
    /// As with all fixed-width multi-byte numeric `take_X` methods,
    /// this method performs an implicitly big-endian conversion with
    /// respect to the individual bytes consumed.
    #[inline]
    fn take_u16(&mut self) -> ParseResult<u16> {
        self.consume_arr::<2>().map(u16::from_be_bytes)
    }

    /// Consumes two bytes and returns the corresponding `i16` value
    #[inline]
    fn take_i16(&mut self) -> ParseResult<i16> {
        self.consume_arr::<2>().map(i16::from_be_bytes)
    }

    /// Consumes four bytes and returns the corresponding `u32` value
    #[inline]
    fn take_u32(&mut self) -> ParseResult<u32> {
        self.consume_arr::<4>().map(u32::from_be_bytes)
    }

    /// Consumes four bytes and returns the corresponding `i32` value
    #[inline]
    fn take_i32(&mut self) -> ParseResult<i32> {
        self.consume_arr::<4>().map(i32::from_be_bytes)
    }

    /// Consumes eight bytes and returns the corresponding `u64` value
    #[inline]
    fn take_u64(&mut self) -> ParseResult<u64> {
        self.consume_arr::<8>().map(u64::from_be_bytes)
    }

    /// Consumes eight bytes and returns the corresponding `i64` value
    #[inline]
    fn take_i64(&mut self) -> ParseResult<i64> {
        self.consume_arr::<8>().map(i64::from_be_bytes)
    }

    /// Consumes a single byte and returns the boolean value it represents
    ///
    /// The only valid boolean encodings are `0xff` for `true` and `0x00`
    /// for `false`.
    #[inline]
    fn take_bool(&mut self) -> ParseResult<bool> {
        match self.consume_byte()? {
            0xff => Ok(true),
            0x00 => Ok(false),
            byte => Err(ParseError::Token(TokenError::InvalidBoolean(byte))),
        }
    }

    /// Parses a one-byte discriminant and verifies that it is a valid tag
    /// for the intended type `T`, before returning it.
    ///
    /// # Invariants
    ///
    /// All implementations must uphold the contract that the only possible
    /// return values are `Err(_)`, and `Ok(val)` for some `val` in `valid`.
    fn take_tagword<T: ?Sized>(&mut self, valid: &[u8]) -> ParseResult<u8>
    where
        Self: Sized,
    {
        let actual: u8 = self.consume_byte()?;
        if valid.contains(&actual) {
            Ok(actual)
        } else if !valid.is_empty() {
            Err(TagError::with_type::<T>(actual, Some(valid.to_vec())).into())
        } else {
            Err(ParseError::Internal(InternalError::NoValidTags))
        }
    }

    /// Consumes and returns a `Vec<u8>` of length `nbytes`, following
    /// the same behavioral guarantees as [`consume`](Self::consume).
    #[inline]
    fn take_dynamic(&mut self, nbytes: usize) -> ParseResult<Vec<u8>> {
        self.consume(nbytes).map(Vec::from)
    }

    /// Consumes and returns an array of the constant length `N`
    #[inline]
    fn take_fixed<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        self.consume_arr::<N>()
    }

    /// Consumes bytes until the predicate `is_terminal` is satisfied,
    /// returning a `Vec<u8>` consisting of all the bytes that were
    /// consumed, up until and including the first byte that satisfied
    /// the predicate.
    ///
    /// If the predicate has not been satisfied by the time no additional
    /// bytes can be legally consumed, returns an error.
    ///
    /// This is primarily intended for the schema-inherent self-terminating
    /// zarith types [`N`](crate::zarith::n::N) and
    /// [`Z`](crate::zarith::z::Z).
    fn take_self_terminating<F>(&mut self, is_terminal: F) -> ParseResult<Vec<u8>>
    where
        F: Fn(u8) -> bool,
    {
        let mut ret: Vec<u8> = Vec::new();
        loop {
            match self.consume_byte() {
                Ok(byte) => {
                    ret.push(byte);
                    if is_terminal(byte) {
                        break Ok(ret);
                    }
                }
                Err(_) => break Err(ParseError::from(TokenError::NonTerminating(ret))),
            }
        }
    }
}

pub mod buffer {
    //! Common buffer types for `Parser` implementors

    use crate::hexstring::HexString;

    /// Newtype around `Vec<u8>` that only permits immutable access
    ///
    /// This newtype is used to allow for explicit signalling of intended
    /// role for the use of `Vec<u8>` as the underlying, immutable buffer of
    /// a [`ByteParser`](crate::parse::byteparser::ByteParser).
    #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[repr(transparent)]
    pub struct VecBuffer(Vec<u8>);

    impl VecBuffer {
        /// Returns the number of bytes in a `VecBuffer`
        pub fn len(&self) -> usize {
            self.0.len()
        }

        /// Returns `true` if the buffer contains zero bytes
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        /// Borrows a range of bytes starting at index `ix`, of length `len`.
        ///
        /// # Panics
        ///
        /// Will panic if `ix + len` is out-of-bounds
        pub fn get_slice(&self, ix: usize, len: usize) -> &[u8] {
            &self.0[ix..ix + len]
        }

        /// Returns the byte at the specified index.
        ///
        /// # Panics
        ///
        /// Will panic if `ix` is out-of-bounds
        pub fn get_byte(&self, ix: usize) -> u8 {
            self.0[ix]
        }
    }

    impl std::fmt::Debug for VecBuffer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            <Vec<u8> as std::fmt::Debug>::fmt(&self.0, f)
        }
    }

    impl From<&[u8]> for VecBuffer {
        fn from(bytes: &[u8]) -> Self {
            Self(bytes.to_owned())
        }
    }

    impl From<Vec<u8>> for VecBuffer {
        fn from(bytes: Vec<u8>) -> Self {
            Self(bytes)
        }
    }

    impl From<&Vec<u8>> for VecBuffer {
        fn from(bytes: &Vec<u8>) -> Self {
            Self(bytes.clone())
        }
    }

    impl<const N: usize> From<[u8; N]> for VecBuffer {
        fn from(bytes: [u8; N]) -> Self {
            Self(bytes.to_vec())
        }
    }

    impl<const N: usize> From<&'_ [u8; N]> for VecBuffer {
        fn from(bytes: &'_ [u8; N]) -> Self {
            Self(bytes.to_vec())
        }
    }

    impl From<HexString> for VecBuffer {
        fn from(hex: HexString) -> Self {
            Self(hex.into_vec())
        }
    }
}

pub mod byteparser {
    //! Buffer-with-offset implementation of [`Parser`]

    use crate::internal::ContextOffset;

    use super::buffer::VecBuffer;
    use super::error::{ParseResult, WindowError};
    use super::Parser;

    /// `Parser` implementation over an owned, immutable buffer with a
    /// mutating offset and a stack of context windows.
    #[derive(Debug)]
    pub struct ByteParser {
        buffer: VecBuffer,
        offset: ContextOffset,
    }

    impl Parser for ByteParser {
        type Buffer = VecBuffer;

        /// Create a `ByteParser` over the provided buffer, with an offset
        /// of 0 and no context windows at time of creation.
        fn from_buffer(buffer: Self::Buffer) -> Self {
            let offset = ContextOffset::with_limit(buffer.len());
            Self { buffer, offset }
        }

        #[inline]
        #[must_use]
        fn view_len(&self) -> usize {
            self.offset.limit()
        }

        #[inline]
        #[must_use]
        fn offset(&self) -> usize {
            self.offset.index()
        }

        fn consume_byte(&mut self) -> ParseResult<u8> {
            let (ix, adv) = self.offset.advance(1);
            if adv {
                Ok(self.buffer.get_byte(ix))
            } else {
                Err(WindowError::ConsumeWouldExceedLimit {
                    offset: ix,
                    requested: 1,
                    limit: self.view_len(),
                }
                .into())
            }
        }

        fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
            let (ix, adv) = self.offset.advance(nbytes);
            if adv {
                Ok(self.buffer.get_slice(ix, nbytes))
            } else {
                Err(WindowError::ConsumeWouldExceedLimit {
                    offset: ix,
                    requested: nbytes,
                    limit: self.view_len(),
                }
                .into())
            }
        }

        #[inline]
        fn set_fit(&mut self, n: usize) -> ParseResult<()> {
            self.offset.set_fit(n)
        }

        #[inline]
        fn test_target(&mut self) -> ParseResult<bool> {
            self.offset.test_target()
        }

        #[inline]
        fn enforce_target(&mut self) -> ParseResult<()> {
            self.offset.enforce_target()
        }
    }

    impl Iterator for ByteParser {
        type Item = u8;

        fn next(&mut self) -> Option<Self::Item> {
            <ByteParser as Parser>::consume_byte(self).ok()
        }
    }
}

use byteparser::ByteParser;

/// Helper trait marking types that can be converted (possibly fallibly),
/// into `Parser` objects of the specified type.
///
/// When no generic argument is provided, the default `Parser` type
/// used is [`ByteParser`]
pub trait TryIntoParser<P = ByteParser>
where
    P: Parser,
{
    /// Attempt to produce a parser object of type `P` over the bytes
    /// represented by `self`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the conversion from `self`
    /// into the buffer-type of `P` failed.
    fn try_into_parser(self) -> ParseResult<P>;
}

impl<P, T> TryIntoParser<P> for T
where
    P: Parser,
    <P as Parser>::Buffer: TryFrom<T>,
    <T as TryInto<<P as Parser>::Buffer>>::Error: Into<ParseError>,
{
    fn try_into_parser(self) -> ParseResult<P> {
        let buffer = match <<P as Parser>::Buffer as TryFrom<T>>::try_from(self) {
            Ok(x) => x,
            Err(err) => return Err(err.into()),
        };
        Ok(P::from_buffer(buffer))
    }
}

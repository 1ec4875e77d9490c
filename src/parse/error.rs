//! Error types used to report failure in low-level parsing
//!
//! This module contains a hierarchy of types representing specific classes
//! of error that may arise as a result of calls to [`Parser`] methods.
//!
//! # Layout
//!
//! This module defines the primary type `ParseError` and the alias
//! `ParseResult<T>`; it additionally defines the type-level refinements of
//! `ParseError`, grouped according to similar provenance or nature.
//!
//! [`Parser`]: crate::parse::Parser

use std::array::TryFromSliceError;
use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Display, Formatter, Result};
use std::string::FromUtf8Error;

/// Enumeration type over all errors that may be encountered when calling
/// methods on `Parser` types.
#[derive(Debug)]
pub enum ParseError {
    /// Error class encountered when opening, closing, or checking context
    /// windows.
    Window(WindowError),
    /// Error class encountered when internal invariants or preconditions
    /// are violated
    Internal(InternalError),
    /// Error class encountered when low-level parsing is successful but
    /// the resultant raw value cannot be converted into a legal value of
    /// a post-parse type
    External(ExternalError),
    /// Error class encountered when low-level parsing is unsuccessful due
    /// to a failure of expectation in terms of the binary-lexical contents
    /// of the buffer.
    ///
    /// This includes invalid tag-words, illegal values for bytes intended
    /// to represent booleans, and failure of self-terminating values to
    /// terminate before reaching a frame-limit.
    Token(TokenError),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ParseError::Window(err) => Display::fmt(err, f),
            ParseError::Internal(err) => Display::fmt(err, f),
            ParseError::External(err) => Display::fmt(err, f),
            ParseError::Token(err) => Display::fmt(err, f),
        }
    }
}

impl From<Infallible> for ParseError {
    fn from(_: Infallible) -> Self {
        unreachable!()
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Window(err) => Some(err),
            ParseError::Internal(err) => Some(err),
            ParseError::External(err) => Some(err),
            ParseError::Token(err) => Some(err),
        }
    }
}

/// Type alias for Result with an error type of [`ParseError`]
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors related to opening, closing, and adhering to context-windows for
/// `Parser` types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// Error case when a method that attempts to consume some number
    /// of bytes from the buffer of a `Parser` would violate either
    /// the absolute end-of-buffer or the current context-window in
    /// doing so.
    ConsumeWouldExceedLimit {
        offset: usize,
        requested: usize,
        limit: usize,
    },
    /// Error case when a method call attempts to open a window
    /// that, if created, would extend beyond the final byte in
    /// the parse-buffer.
    OpenWouldExceedBuffer { bytes_left: usize, request: usize },
    /// Error case when a method call attempts to open a window
    /// that, if created, would be wider than the narrowest
    /// open context-window.
    OpenWouldExceedWindow { limit: usize, request: usize },
    /// Error case when a method call attempts to close the narrowest open
    /// context-window but there are unconsumed bytes remaining within said
    /// window.
    CloseWithResidue { residual: usize },
    /// Error case when a method call attempts to close the narrowest open
    /// context-window, but there are no open context-windows to begin with.
    CloseWithoutWindow,
    /// Generic error case where the current offset of a Parser exceeds the
    /// bounds of the narrowest open context-window.
    ///
    /// It is a critical error in the implementation of a parser if this
    /// error is ever reported.
    OffsetOverflow { excess: usize },
}

impl From<WindowError> for ParseError {
    fn from(err: WindowError) -> Self {
        Self::Window(err)
    }
}

impl Display for WindowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match *self {
            WindowError::ConsumeWouldExceedLimit {
                limit,
                offset,
                requested,
            } => {
                write!(
                    f,
                    "cannot increment offset by {} bytes (currently at byte {} out of limit {})",
                    requested, offset, limit
                )
            }
            WindowError::OpenWouldExceedBuffer {
                bytes_left,
                request,
            } => {
                write!(
                    f,
                    "cannot open {}-byte context window: parse-buffer has only {} bytes remaining",
                    request, bytes_left
                )
            }
            WindowError::OpenWouldExceedWindow { limit, request } => {
                write!(
                    f,
                    "cannot open context window ending at byte {}: extends past current window (limit {})",
                    request, limit
                )
            }
            WindowError::CloseWithResidue { residual } => {
                write!(
                    f,
                    "cannot close context window with {} residual bytes",
                    residual
                )
            }
            WindowError::CloseWithoutWindow => write!(f, "no context window to close"),
            WindowError::OffsetOverflow { excess } => {
                write!(
                    f,
                    "BUG: detected an offset that exceeds the current limit by {} bytes",
                    excess
                )
            }
        }
    }
}

impl Error for WindowError {}

/// Errors arising from unexpected tokens in the buffer
///
/// Includes tag errors, boolean value errors, and non-termination
/// of supposedly self-terminating values
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenError {
    /// Byte parsed was neither of the two legal boolean encodings
    InvalidBoolean(u8),
    /// Byte parsed could not be interpreted as a valid discriminant for an
    /// enumerated type with one-byte tag
    InvalidTag(TagError),
    /// Supposedly self-terminating byte-sequence failed to terminate before
    /// reaching end of buffer
    NonTerminating(Vec<u8>),
}

impl From<TokenError> for ParseError {
    fn from(tok_e: TokenError) -> Self {
        Self::Token(tok_e)
    }
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::InvalidBoolean(byte) => {
                write!(f, "invalid boolean encoding 0x{byte:02x}")
            }
            Self::InvalidTag(err) => {
                write!(f, "invalid tag: {}", err)
            }
            Self::NonTerminating(buf) => {
                write!(
                    f,
                    "element failed to terminate: {}",
                    crate::hexstring::util::hex_of_bytes(buf)
                )
            }
        }
    }
}

impl Error for TokenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TokenError::InvalidBoolean(_) => None,
            TokenError::InvalidTag(err) => Some(err),
            TokenError::NonTerminating(_) => None,
        }
    }
}

/// Implementation-internal errors
///
/// This error class represents certain 'impossible' cases, which signify
/// an implementation bug in either the implementation of a `Parser` type,
/// or a violation of a precondition for calling certain `Parser` methods.
#[derive(Debug, Clone, Copy)]
pub enum InternalError {
    SliceCoerceFailure(TryFromSliceError),
    NoValidTags,
}

impl From<TryFromSliceError> for InternalError {
    fn from(err: TryFromSliceError) -> Self {
        Self::SliceCoerceFailure(err)
    }
}

impl From<InternalError> for ParseError {
    fn from(err: InternalError) -> Self {
        Self::Internal(err)
    }
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            InternalError::SliceCoerceFailure(_err) => {
                write!(f, "failed to coerce from byte-slice to fixed-length array")
            }
            InternalError::NoValidTags => {
                write!(f, "cannot parse enum with no known-valid discriminants")
            }
        }
    }
}

impl Error for InternalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InternalError::SliceCoerceFailure(err) => Some(err),
            InternalError::NoValidTags => None,
        }
    }
}

/// Enumerated type representing contextually invalid results obtained from
/// otherwise successfully executed method calls to a Parser object. These
/// typically indicate that the actual byte content of the buffer differs
/// from the byte content that is considered valid in the context imposed by
/// a particular parse method call or combination thereof.
#[derive(Debug)]
pub enum ExternalError {
    /// Error scenario in which a coercion from `&[u8]` to `String`
    /// performed on the result of a `consume` operation could not be
    /// performed for the specified reason.
    UncoercableString(FromUtf8Error),
    /// Error scenario in which a parsed zarith byte-sequence could not be
    /// interpreted as a legal big-integer value.
    UninterpretableZarith(Vec<u8>),
    /// Any other case that cannot be explicitly listed in this library
    GenericError(Box<dyn Send + Sync + std::error::Error>),
}

impl<T> From<T> for ParseError
where
    ExternalError: From<T>,
{
    fn from(err: T) -> Self {
        ParseError::External(ExternalError::from(err))
    }
}

impl From<FromUtf8Error> for ExternalError {
    fn from(err: FromUtf8Error) -> Self {
        Self::UncoercableString(err)
    }
}

impl From<Box<dyn Error + Send + Sync>> for ExternalError {
    fn from(value: Box<dyn Error + Send + Sync>) -> Self {
        Self::GenericError(value)
    }
}

impl Display for ExternalError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ExternalError::UncoercableString(err) => {
                write!(
                    f,
                    "parsed byte-array could not be coerced to String: {}",
                    err
                )
            }
            ExternalError::UninterpretableZarith(buf) => {
                write!(
                    f,
                    "parsed byte-array is not a legal zarith encoding: {}",
                    crate::hexstring::util::hex_of_bytes(buf)
                )
            }
            ExternalError::GenericError(e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl Error for ExternalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExternalError::UncoercableString(err) => Some(err),
            ExternalError::UninterpretableZarith(_) => None,
            ExternalError::GenericError(err) => Some(err.as_ref()),
        }
    }
}

/// Converts a borrowed byte-slice into an owned byte-array
///
/// Returns a [`ParseError`] corresponding to the reason for
/// failure if this conversion cannot be performed for any reason.
///
/// This error is guaranteed to be an `InternalError`.
pub(crate) fn coerce_slice<const N: usize>(bytes: &'_ [u8]) -> ParseResult<[u8; N]> {
    match <[u8; N] as std::convert::TryFrom<&'_ [u8]>>::try_from(bytes) {
        Ok(array) => Ok(array),
        Err(err) => Err(ParseError::from(InternalError::from(err))),
    }
}

/// Error representing invalid one-byte enum-tag values
///
/// Records the rejected discriminant, the name of the type being parsed,
/// and, when available, the set of discriminants that would have been
/// accepted in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagError {
    actual: u8,
    for_type: &'static str,
    expected: Option<Vec<u8>>,
}

impl TagError {
    /// Constructs a `TagError` value with the provided type-name `for_type`
    /// and set of valid values `expected`
    pub fn new(actual: u8, for_type: &'static str, expected: Option<Vec<u8>>) -> Self {
        Self {
            actual,
            for_type,
            expected,
        }
    }

    /// Constructs a `TagError` from the invalid tag value and a list of
    /// valid tag-values, using an inferred type-name via
    /// [`type_name`](std::any::type_name)
    pub fn with_type<U: ?Sized>(actual: u8, expected: Option<Vec<u8>>) -> Self {
        Self {
            actual,
            for_type: std::any::type_name::<U>(),
            expected,
        }
    }

    /// Returns the rejected discriminant byte.
    pub fn actual(&self) -> u8 {
        self.actual
    }
}

impl From<TagError> for ParseError {
    fn from(val: TagError) -> Self {
        TokenError::InvalidTag(val).into()
    }
}

impl Display for TagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "unexpected discriminant {:#04x} for enum-type {}",
            &self.actual, self.for_type,
        )
    }
}

impl Error for TagError {}

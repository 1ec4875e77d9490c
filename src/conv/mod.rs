//! Core of the binary-conversion API
//!
//! This module contains definitions for the high-level transcoding traits
//! `Encode` and `Decode`, which are motivationally equivalent to the
//! `Serialize` and `Deserialize` traits defined in `serde`, specialized to
//! the binary encoding scheme described and defined by the `data-encoding`
//! (OCaml) library that Octez uses for every value it puts on the wire.
//!
//! Every type in this crate with a network-exact binary form — Micheline
//! nodes, zarith integers, hashes, keys, operations and their sixteen
//! content kinds — implements both traits. The submodule [`target`] offers
//! an abstraction along the lines of [`std::io::Write`], namely the
//! [`target::Target`] trait; this is the dual to
//! [`crate::parse::Parser`], acting as the generic bound for serialization
//! in the [`Encode::write_to`] method.

use crate::parse::{ParseResult, Parser, TryIntoParser};

use self::target::Target;

pub mod error;
pub mod target;

pub use error::{DecodeError, DecodeResult};

/// Trait for types that support serialization into an Octez-interoperable
/// binary form
///
/// Implementing [`Encode`] can be as simple as providing a definition of the
/// required method [`write_to`](Encode::write_to); the remaining methods are
/// defined in terms of it and only need overriding when a type can do
/// better.
///
/// The natural definition of `write_to` is structurally inductive on the
/// physical or virtual fields of the type in question, in conformance with
/// the serialization format defined by `data-encoding`.
pub trait Encode {
    /// Appends the serialized bytes of this value to a generic buffer,
    /// returning the exact number of bytes written
    ///
    /// Morally related to the trait method [`std::io::Write::write`], with
    /// the caveat that `write_to` should be infallible under almost all
    /// operating conditions, as well as being generic over any buffer that
    /// satisfies the trait-bound of [`Target`].
    fn write_to<U: Target>(&self, buf: &mut U) -> usize;

    /// Appends the serialized bytes of this value to a monomorphized
    /// [`Vec<u8>`] buffer.
    #[inline]
    fn write_to_vec(&self, buf: &mut Vec<u8>) {
        let _ = self.write_to(buf);
    }

    /// Creates a new buffer and fills it with the serialized bytes of this
    /// value.
    #[must_use]
    #[inline]
    fn encode<U: Target>(&self) -> U {
        let mut buf: U = U::create();
        let _ = self.write_to::<U>(&mut buf);
        buf
    }

    /// Creates a [`Vec<u8>`] and fills it with the serialized bytes of this
    /// value.
    #[must_use]
    #[inline]
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_to_vec(&mut buf);
        buf
    }

    /// Computes, without allocation, the number of bytes in the serialized
    /// form of `self`, based on the implementation of
    /// [`write_to`](Encode::write_to).
    #[must_use]
    #[inline]
    fn enc_len(&self) -> usize {
        self.write_to(&mut std::io::sink())
    }
}

/// Trait providing methods for deserializing binary data into values of a
/// certain type
///
/// It is almost always expected that a type implementing `Decode` will also
/// implement [`Encode`], although this is not enforced at any level except
/// in certain contexts, where both traits may appear as simultaneous bounds
/// on generic types.
///
/// Implementations are defined by one required method, [`parse`], which
/// attempts to consume the contextually appropriate number of bytes from a
/// [`Parser`] type, either returning a valid value of the implementing type
/// that was interpreted from the consumed sequence, or an error if parsing
/// either failed, or yielded a value that was determined to be invalid.
///
/// [`parse`]: Decode::parse
pub trait Decode {
    /// Attempt to consume and interpret a value of type `Self` from an
    /// existing `Parser` object over a binary buffer.
    ///
    /// # Errors
    ///
    /// In most cases, the errors returned by this method will be propagated
    /// from calls made to [`Parser`] methods in the implementation logic.
    ///
    /// In rare cases, it may be necessary to return newly minted
    /// `ParseError` values based on certain invariants of the type being
    /// parsed.
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self>
    where
        Self: Sized;

    /// Attempt to decode a value of the `Self` type from a value `input` of
    /// the generic type `U: TryIntoParser<P>`.
    ///
    /// The input buffer must be consumed in its entirety; a parse that
    /// succeeds with leftover bytes is reported as
    /// [`DecodeError::Incomplete`] rather than silently accepted, so that a
    /// truncated or padded serialization can never masquerade as a valid
    /// one.
    fn try_decode<U, P>(input: U) -> DecodeResult<Self>
    where
        Self: Sized,
        P: Parser,
        U: TryIntoParser<P>,
    {
        let mut p: P = input.try_into_parser()?;
        let ret = Self::parse(&mut p)?;
        let leftover = p.remainder();
        if leftover != 0 {
            return Err(DecodeError::Incomplete { leftover });
        }
        Ok(ret)
    }

    /// Decodes a value of type `Self` from a value `input` of the generic
    /// type `U: TryIntoParser`, using [`ByteParser`] as the `Parser` type
    /// internally.
    ///
    /// # Panics
    ///
    /// This method will panic if the interior call to
    /// [`try_decode`](Decode::try_decode) returns an `Err(_)` value.
    ///
    /// [`ByteParser`]: crate::parse::byteparser::ByteParser
    fn decode<U>(inp: U) -> Self
    where
        Self: Sized,
        U: TryIntoParser,
    {
        Self::try_decode::<U, crate::parse::byteparser::ByteParser>(inp).unwrap_or_else(|err| {
            panic!(
                "<{} as Decode>::decode encountered error: {:?}",
                std::any::type_name::<Self>(),
                err
            )
        })
    }
}

impl Encode for Vec<u8> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_all(self)
    }

    fn write_to_vec(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_slice())
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.clone()
    }
}

impl Decode for Vec<u8> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_dynamic(p.remainder())
    }
}

impl Encode for String {
    fn write_to<W: Target>(&self, buf: &mut W) -> usize {
        buf.push_all(self.as_bytes())
    }
}

impl Decode for String {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let buf: Vec<u8> = p.take_dynamic(p.remainder())?;
        Ok(String::from_utf8(buf)?)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        match self {
            Some(val) => buf.push_one(0xff) + val.write_to(buf),
            None => buf.push_one(0x00),
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        match p.take_tagword::<Option<T>>(&[0x00u8, 0xff])? {
            0xff => Ok(Some(T::parse(p)?)),
            0x00 => Ok(None),
            _ => unreachable!(),
        }
    }
}

impl Encode for bool {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_one(if *self { 0xff } else { 0x00 })
    }
}

impl Decode for bool {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_bool()
    }
}

macro_rules! impl_encode_words {
    ( $( $t:ty ),+ $(,)? ) => {
        $(
            impl Encode for $t {
                fn write_to<U: Target>(&self, buf: &mut U) -> usize {
                    buf.push_many(self.to_be_bytes())
                }
            }
        )+
    };
}

impl_encode_words!(u8, i8, u16, i16, u32, i32, u64, i64);

impl Decode for u8 {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_u8()
    }
}

impl Decode for i8 {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_i8()
    }
}

impl Decode for u16 {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_u16()
    }
}

impl Decode for i16 {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_i16()
    }
}

impl Decode for u32 {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_u32()
    }
}

impl Decode for i32 {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_i32()
    }
}

impl Decode for u64 {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_u64()
    }
}

impl Decode for i64 {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_i64()
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_many(*self)
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_fixed::<N>()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hexstring::HexString;

    #[test]
    fn word_roundtrip() {
        assert_eq!(0x0102i32.encode::<HexString>().to_hex(), "00000102");
        assert_eq!(i32::decode(crate::hex!("00000102")), 0x0102);
        assert_eq!((-1i32).encode::<HexString>().to_hex(), "ffffffff");
    }

    #[test]
    fn option_flag() {
        assert_eq!(Some(0x01u8).encode::<HexString>().to_hex(), "ff01");
        assert_eq!(None::<u8>.encode::<HexString>().to_hex(), "00");
        assert_eq!(Option::<u8>::decode(crate::hex!("ff2a")), Some(0x2a));
    }

    #[test]
    fn incomplete_parse_rejected() {
        assert!(matches!(
            u16::try_decode::<_, crate::parse::byteparser::ByteParser>(vec![0u8, 1, 2]),
            Err(DecodeError::Incomplete { leftover: 1 })
        ));
    }
}

//! Validated conversion to and from hex-encoded strings
//!
//! It is common practice within Octez-adjacent tooling to represent the
//! serialized bytes of an encoded value as a *hex-string*, rather than as a
//! raw bytestring: a string of ASCII characters matching
//! `([0-9a-fA-F]{2})*`, where each aligned pair of characters encodes one
//! byte (`"deadbeef" ~ [0xde, 0xad, 0xbe, 0xef]`).
//!
//! The struct [`HexString`] removes any ambiguity as to whether a
//! string-like value is to be read as raw binary or as hex-encoded binary:
//! `From` conversions are binary-based, and `TryFrom` conversions are
//! fallible parses of hex-encoded data. The [`hex`](crate::hex) macro is
//! provided for lightweight construction from string literals, and is the
//! standard way of writing byte-level test vectors in this crate.

use crate::conv::target::Target;
use crate::error::HexConvError;
use std::convert::TryFrom;
use std::iter::FromIterator;

pub(crate) mod util {
    use crate::error::HexConvError;
    use std::fmt::Write;

    /// Formats a sequence of bytes into an undelimited hexadecimal `String`
    #[must_use]
    #[inline]
    pub fn hex_of_bytes(bytes: &[u8]) -> String {
        let mut hex: String = String::with_capacity(bytes.len() * 2);
        for &byte in bytes {
            match write!(&mut hex, "{byte:02x}") {
                Ok(_) => (),
                Err(_) => unreachable!("write to String should never fail"),
            };
        }
        hex
    }

    /// Attempt to parse a hexadecimally encoded string, returning either a
    /// `Vec<u8>` holding the decoded bytes or an error containing the
    /// invalid string.
    ///
    /// # Errors
    ///
    /// If the string has odd parity, `Err(OddParity)` is returned.
    /// Otherwise, if the string contains any character that is not a valid
    /// hexadecimal digit (case-insensitive), returns `Err(NonHex)`.
    pub fn bytes_of_hex(src: &str) -> Result<Vec<u8>, HexConvError> {
        let ascii_len = src.len();

        if ascii_len == 0 {
            return Ok(Vec::new());
        } else if ascii_len % 2 != 0 {
            return Err(HexConvError::OddParity(src.to_owned()));
        }

        let mut dst = Vec::with_capacity(ascii_len / 2);

        for ix in (0..ascii_len).step_by(2) {
            match u8::from_str_radix(&src[ix..ix + 2], 16) {
                Ok(word) => dst.push(word),
                Err(_) => return Err(HexConvError::NonHex(src.to_owned())),
            }
        }
        Ok(dst)
    }
}

/// Newtype representing byte-arrays that are parsed from and displayed as
/// hexadecimally encoded `String` values, but stored in memory as byte-buffers
/// holding the individual words parsed from the string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[repr(transparent)]
pub struct HexString {
    bytes: Vec<u8>,
}

impl HexString {
    /// Constructs a new, empty `HexString`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Extracts a slice containing the entirety of the underlying vector
    #[inline(always)]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Destructs a `HexString` into its underlying byte-vector
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    /// Returns `true` if the `HexString` has length 0
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the number of bytes in `self`
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns a String consisting of a hexadecimal encoding of `self`,
    /// with two characters encoding each byte in order.
    #[inline(always)]
    #[must_use]
    pub fn to_hex(&self) -> String {
        util::hex_of_bytes(&self.bytes)
    }

    /// Attempt to parse a hexadecimally encoded string into the sequence of
    /// bytes it represents
    ///
    /// Returns an error if the string length is of odd parity, or if it
    /// contains any characters that are not valid hexadecimal digits,
    /// insensitive to case.
    pub fn from_hex<S>(hex: S) -> Result<Self, HexConvError>
    where
        S: AsRef<str>,
    {
        Ok(Self {
            bytes: util::bytes_of_hex(hex.as_ref())?,
        })
    }
}

impl AsRef<[u8]> for HexString {
    fn as_ref(&self) -> &[u8] {
        self.bytes.as_ref()
    }
}

impl std::fmt::Debug for HexString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HexString").field(&self.to_hex()).finish()
    }
}

impl std::fmt::Display for HexString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.to_hex(), f)
    }
}

impl FromIterator<u8> for HexString {
    fn from_iter<T: IntoIterator<Item = u8>>(iter: T) -> Self {
        Self {
            bytes: <Vec<u8> as FromIterator<u8>>::from_iter(iter),
        }
    }
}

impl Extend<u8> for HexString {
    fn extend<T: IntoIterator<Item = u8>>(&mut self, iter: T) {
        self.bytes.extend(iter)
    }
}

impl IntoIterator for HexString {
    type Item = u8;

    type IntoIter = std::vec::IntoIter<u8>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.bytes.into_iter()
    }
}

impl Target for HexString {
    fn anticipate(&mut self, extra: usize) {
        self.bytes.anticipate(extra)
    }

    fn create() -> Self {
        HexString { bytes: Vec::new() }
    }

    fn push_one(&mut self, b: u8) -> usize {
        self.bytes.push_one(b)
    }

    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.bytes.push_many(arr)
    }

    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.bytes.push_all(buf)
    }
}

impl From<HexString> for Vec<u8> {
    fn from(val: HexString) -> Self {
        val.bytes
    }
}

macro_rules! impl_from {
    ( $src:ty ) => {
        impl From<$src> for HexString {
            fn from(bytes: $src) -> Self {
                Self { bytes }
            }
        }
    };
    ( $src:ty, $meth:ident ) => {
        impl From<$src> for HexString {
            fn from(src: $src) -> Self {
                Self {
                    bytes: src.$meth(),
                }
            }
        }
    };
    ( $cg:ident, $src:ty, $meth:ident ) => {
        impl<const $cg: usize> From<$src> for HexString {
            fn from(src: $src) -> Self {
                Self {
                    bytes: src.$meth(),
                }
            }
        }
    };
}

impl_from!(Vec<u8>);
impl_from!(&[u8], to_vec);
impl_from!(N, [u8; N], to_vec);
impl_from!(N, &[u8; N], to_vec);

macro_rules! impl_try_from {
    ( $src:ty ) => {
        impl TryFrom<$src> for HexString {
            type Error = HexConvError;

            fn try_from(s: $src) -> Result<Self, Self::Error> {
                Ok(HexString {
                    bytes: $crate::hexstring::util::bytes_of_hex(s.as_ref())?,
                })
            }
        }
    };
}

impl_try_from!(&str);
impl_try_from!(String);
impl_try_from!(std::borrow::Cow<'_, str>);

/// Converts a string-like literal or expression into a HexString by parsing it
/// as hexadecimal
///
/// Will panic if the argument is not a valid hex-string and therefore cannot
/// be converted.
#[macro_export]
macro_rules! hex {
    ($s : expr) => {{
        $crate::hexstring::HexString::from_hex($s).expect("hex! macro encountered error")
    }};
}

impl std::str::FromStr for HexString {
    type Err = HexConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let h = hex!("deadbeef");
        assert_eq!(h.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(h.to_hex(), "deadbeef");
        assert_eq!(HexString::from(vec![0xde, 0xad, 0xbe, 0xef]), h);
    }

    #[test]
    fn hex_rejects_invalid() {
        assert!(HexString::from_hex("abc").is_err());
        assert!(HexString::from_hex("zz").is_err());
        assert!(HexString::from_hex("").unwrap().is_empty());
    }
}

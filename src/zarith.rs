//! Self-terminating arbitrary-precision integer encodings
//!
//! Octez encodes unbounded integers as *zarith* byte-sequences: base-128
//! little-endian groups in which the high bit of every byte but the last is
//! set, making the encoding self-delimiting without a length prefix. The
//! unsigned flavor [`N`](n::N) uses all seven low bits of every group; the
//! signed flavor [`Z`](z::Z) reserves bit 6 of the first group for the
//! sign, so the first group carries six payload bits and every subsequent
//! group carries seven.
//!
//! Both types appear pervasively in the operation wire format (fees,
//! counters, gas and storage limits, amounts) and as the payload of
//! Micheline integer literals.

use crate::conv::target::Target;
use crate::conv::{Decode, Encode};
use crate::parse::error::ExternalError;
use crate::parse::{ParseResult, Parser};

/// Returns `true` for the final byte of a zarith group sequence.
#[inline]
const fn is_terminal(byte: u8) -> bool {
    byte & 0x80 == 0
}

pub mod n {
    //! Unsigned zarith naturals

    use super::*;
    use num_bigint::BigUint;
    use num_integer::Integer;
    use std::convert::TryFrom;
    use std::fmt::Display;
    use std::ops::Deref;

    /// Arbitrary-precision natural number with a zarith wire encoding
    #[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Default)]
    #[repr(transparent)]
    pub struct N(pub BigUint);

    impl N {
        pub const fn new(nat: BigUint) -> Self {
            Self(nat)
        }

        pub fn into_inner(self) -> BigUint {
            self.0
        }

        pub const fn as_inner(&self) -> &BigUint {
            &self.0
        }

        /// Serializes `self` into its zarith group sequence.
        #[must_use]
        pub fn to_zarith_bytes(&self) -> Vec<u8> {
            let mut groups = self.0.to_radix_le(0x80);
            let last = groups.len() - 1;
            for byte in &mut groups[..last] {
                *byte |= 0x80;
            }
            groups
        }

        /// Reassembles a natural from the bytes of a zarith group sequence.
        ///
        /// Returns `None` when the byte-sequence is empty. Continuation
        /// bits are ignored; callers are expected to have delimited the
        /// sequence already.
        #[must_use]
        pub fn from_zarith_bytes(bytes: &[u8]) -> Option<Self> {
            if bytes.is_empty() {
                return None;
            }
            let lo7: Vec<u8> = bytes.iter().map(|b| b & 0x7f).collect();
            BigUint::from_radix_le(&lo7, 0x80).map(Self)
        }

        /// Number of bytes in the zarith serialization of `self`.
        #[must_use]
        pub fn zarith_len(&self) -> usize {
            let n: usize = self.0.bits() as usize;
            std::cmp::max(1, Integer::div_ceil(&n, &7))
        }
    }

    impl std::fmt::Debug for N {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, r#"ℕ({})"#, &self.0.to_string())
        }
    }

    impl Display for N {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
            <BigUint as Display>::fmt(&self.0, f)
        }
    }

    impl From<N> for BigUint {
        fn from(val: N) -> Self {
            val.0
        }
    }

    impl From<BigUint> for N {
        fn from(value: BigUint) -> Self {
            Self(value)
        }
    }

    macro_rules! impl_nat_from {
        ($src:ty) => {
            impl From<$src> for N {
                fn from(val: $src) -> Self {
                    Self(<BigUint as From<$src>>::from(val))
                }
            }
        };
    }

    impl_nat_from!(u8);
    impl_nat_from!(u16);
    impl_nat_from!(u32);
    impl_nat_from!(u64);

    macro_rules! impl_nat_coerce {
        ($src:ty) => {
            impl TryFrom<N> for $src {
                type Error = <$src as TryFrom<BigUint>>::Error;

                fn try_from(val: N) -> Result<$src, Self::Error> {
                    <$src as TryFrom<BigUint>>::try_from(val.0)
                }
            }
        };
    }

    impl_nat_coerce!(u8);
    impl_nat_coerce!(u16);
    impl_nat_coerce!(u32);
    impl_nat_coerce!(u64);

    impl Deref for N {
        type Target = BigUint;

        fn deref(&self) -> &Self::Target {
            &self.0
        }
    }

    impl Encode for N {
        fn write_to<U: Target>(&self, buf: &mut U) -> usize {
            buf.push_all(&self.to_zarith_bytes())
        }
    }

    impl Decode for N {
        fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
            let groups = p.take_self_terminating(is_terminal)?;
            Self::from_zarith_bytes(&groups)
                .ok_or_else(|| ExternalError::UninterpretableZarith(groups).into())
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;
        use crate::hexstring::HexString;

        fn nat(i: u64) -> N {
            N::from(i)
        }

        #[test]
        fn nat_conv() {
            assert_eq!(nat(0), N::decode(crate::hex!("00")));
            assert_eq!(nat(1), N::decode(crate::hex!("01")));
            assert_eq!(nat(128), N::decode(crate::hex!("8001")));
            assert_eq!(nat(0).encode::<HexString>(), crate::hex!("00"));
            assert_eq!(nat(128).encode::<HexString>(), crate::hex!("8001"));
            assert_eq!(nat(1_000_000).encode::<HexString>(), crate::hex!("c0843d"));
        }

        #[test]
        fn nat_len() {
            assert_eq!(nat(0).zarith_len(), 1);
            assert_eq!(nat(127).zarith_len(), 1);
            assert_eq!(nat(128).zarith_len(), 2);
        }
    }
}

pub mod z {
    //! Signed zarith integers

    use super::*;
    use num_bigint::{BigInt, BigUint, Sign};
    use std::convert::TryFrom;
    use std::fmt::Display;
    use std::ops::Deref;
    use std::str::FromStr;

    /// Arbitrary-precision signed integer with a zarith wire encoding
    #[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Default)]
    #[repr(transparent)]
    pub struct Z(pub BigInt);

    impl Z {
        pub const fn new(int: BigInt) -> Self {
            Self(int)
        }

        pub fn into_inner(self) -> BigInt {
            self.0
        }

        pub const fn as_inner(&self) -> &BigInt {
            &self.0
        }

        /// Serializes `self` into its zarith group sequence.
        ///
        /// The first group carries the sign in bit 6 and the six lowest
        /// payload bits; subsequent groups carry seven bits each.
        #[must_use]
        pub fn to_zarith_bytes(&self) -> Vec<u8> {
            let (sign, abs) = self.0.clone().into_parts();

            let first_payload: u8 = (&abs & BigUint::from(0x3fu8)).to_bytes_le()[0];
            let rest = abs >> 6usize;

            let mut groups: Vec<u8> = Vec::new();
            groups.push(first_payload);
            if rest.bits() > 0 {
                groups.extend(rest.to_radix_le(0x80));
            }

            if sign == Sign::Minus {
                groups[0] |= 0x40;
            }
            let last = groups.len() - 1;
            for byte in &mut groups[..last] {
                *byte |= 0x80;
            }
            groups
        }

        /// Reassembles a signed integer from the bytes of a zarith group
        /// sequence.
        ///
        /// Returns `None` when the byte-sequence is empty.
        #[must_use]
        pub fn from_zarith_bytes(bytes: &[u8]) -> Option<Self> {
            let (&first, tail) = bytes.split_first()?;

            let sign = if first & 0x40 == 0 {
                Sign::Plus
            } else {
                Sign::Minus
            };
            let low6 = BigUint::from(first & 0x3fu8);

            let lo7: Vec<u8> = tail.iter().map(|b| b & 0x7f).collect();
            let mut abs = BigUint::from_radix_le(&lo7, 0x80)?;
            abs <<= 6usize;
            abs |= low6;

            Some(Self(BigInt::from_biguint(sign, abs)))
        }
    }

    impl std::fmt::Debug for Z {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "\u{2124}({})", &self.0.to_string())
        }
    }

    impl Display for Z {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
            <BigInt as Display>::fmt(&self.0, f)
        }
    }

    impl From<Z> for BigInt {
        fn from(val: Z) -> Self {
            val.0
        }
    }

    impl From<BigInt> for Z {
        fn from(value: BigInt) -> Self {
            Self(value)
        }
    }

    impl FromStr for Z {
        type Err = <BigInt as FromStr>::Err;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Ok(Self(BigInt::from_str(s)?))
        }
    }

    macro_rules! impl_int_from {
        ($src:ty) => {
            impl From<$src> for Z {
                fn from(val: $src) -> Self {
                    Self(<BigInt as From<$src>>::from(val))
                }
            }
        };
    }

    impl_int_from!(i8);
    impl_int_from!(i16);
    impl_int_from!(i32);
    impl_int_from!(i64);
    impl_int_from!(u8);
    impl_int_from!(u16);
    impl_int_from!(u32);
    impl_int_from!(u64);

    macro_rules! impl_int_coerce {
        ($src:ty) => {
            impl TryFrom<Z> for $src {
                type Error = <$src as TryFrom<BigInt>>::Error;
                fn try_from(val: Z) -> Result<$src, Self::Error> {
                    <$src as TryFrom<BigInt>>::try_from(val.0)
                }
            }
        };
    }

    impl_int_coerce!(i8);
    impl_int_coerce!(i16);
    impl_int_coerce!(i32);
    impl_int_coerce!(i64);
    impl_int_coerce!(u8);
    impl_int_coerce!(u16);
    impl_int_coerce!(u32);
    impl_int_coerce!(u64);

    impl Deref for Z {
        type Target = BigInt;

        fn deref(&self) -> &Self::Target {
            &self.0
        }
    }

    impl Encode for Z {
        fn write_to<U: Target>(&self, buf: &mut U) -> usize {
            buf.push_all(&self.to_zarith_bytes())
        }
    }

    impl Decode for Z {
        fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
            let groups = p.take_self_terminating(is_terminal)?;
            Self::from_zarith_bytes(&groups)
                .ok_or_else(|| ExternalError::UninterpretableZarith(groups).into())
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;
        use crate::hexstring::HexString;

        fn int(i: i64) -> Z {
            Z::from(i)
        }

        #[test]
        fn int_conv() {
            assert_eq!(int(0), Z::decode(crate::hex!("00")));
            assert_eq!(int(0).encode::<HexString>(), crate::hex!("00"));
            assert_eq!(int(1), Z::decode(crate::hex!("01")));
            assert_eq!(int(1).encode::<HexString>(), crate::hex!("01"));
            assert_eq!(int(64), Z::decode(crate::hex!("8001")));
            assert_eq!(int(64).encode::<HexString>(), crate::hex!("8001"));
            assert_eq!(int(-32), Z::decode(crate::hex!("60")));
            assert_eq!(int(-32).encode::<HexString>(), crate::hex!("60"));
            assert_eq!(int(-64).encode::<HexString>(), crate::hex!("c001"));
        }

        #[test]
        fn int_roundtrip_wide() {
            for v in [-1_000_000i64, -4096, -129, -128, -1, 0, 1, 127, 128, 4095, 1 << 40] {
                let z = int(v);
                assert_eq!(z, Z::decode(z.encode::<HexString>()), "value {v}");
            }
        }
    }
}

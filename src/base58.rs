//! Base58check transcoding for protocol hash, key, and signature kinds
//!
//! Every fixed-length binary identity in the protocol — block and
//! operation hashes, public key hashes, public keys, signatures, chain ids
//! — has a human-readable rendering as a base58check string with a
//! kind-specific binary prefix chosen so that the rendered form starts
//! with a recognizable sigil (`B`, `tz1`, `edpk`, …). The full payload of
//! a rendering is `prefix ++ data ++ sha256(sha256(prefix ++ data))[..4]`,
//! interpreted as a big-endian base-58 numeral with one leading `1` per
//! leading zero byte.
//!
//! This module implements the generic codec plus the static table of the
//! prefix kinds the rest of the crate consumes, one entry per semantic
//! kind.

use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Digit alphabet of the base58 numeral system, in ascending value order.
const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Enumerated reasons a base58check string can fail to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base58Error {
    /// A character outside the base58 alphabet was encountered
    InvalidCharacter(char),
    /// The trailing four checksum bytes did not match the payload
    BadChecksum,
    /// The payload did not begin with the binary prefix of the expected
    /// kind
    WrongPrefix { expected: &'static str },
    /// The payload had the right prefix but the wrong number of data bytes
    WrongLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl Display for Base58Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Base58Error::InvalidCharacter(c) => {
                write!(f, "character {c:?} is not in the base58 alphabet")
            }
            Base58Error::BadChecksum => write!(f, "base58check checksum mismatch"),
            Base58Error::WrongPrefix { expected } => {
                write!(f, "base58check payload lacks the `{expected}` prefix")
            }
            Base58Error::WrongLength {
                kind,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{kind} payload is {actual} bytes, expected exactly {expected}"
                )
            }
        }
    }
}

impl Error for Base58Error {}

/// A semantic kind of base58check-rendered value: its name, the sigil its
/// renderings start with, its binary prefix, and its fixed data length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashKind {
    pub name: &'static str,
    pub sigil: &'static str,
    pub prefix: &'static [u8],
    pub data_len: usize,
}

/// The protocol-fixed prefix table, one constant per semantic kind.
pub mod kinds {
    use super::HashKind;

    macro_rules! kind {
        ( $konst:ident, $name:literal, $sigil:literal, [ $( $b:literal ),+ ], $len:literal ) => {
            pub const $konst: HashKind = HashKind {
                name: $name,
                sigil: $sigil,
                prefix: &[ $( $b ),+ ],
                data_len: $len,
            };
        };
    }

    kind!(BLOCK_HASH, "block hash", "B", [1, 52], 32);
    kind!(OPERATION_HASH, "operation hash", "o", [5, 116], 32);
    kind!(
        OPERATION_LIST_LIST_HASH,
        "operation list-list hash",
        "LLo",
        [29, 159, 109],
        32
    );
    kind!(PROTOCOL_HASH, "protocol hash", "P", [2, 170], 32);
    kind!(CONTEXT_HASH, "context hash", "Co", [79, 199], 32);
    kind!(
        BLOCK_PAYLOAD_HASH,
        "block payload hash",
        "vh",
        [1, 106, 242],
        32
    );
    kind!(NONCE_HASH, "seed nonce hash", "nce", [69, 220, 169], 32);
    kind!(CHAIN_ID, "chain id", "Net", [87, 82, 0], 4);

    kind!(ED25519_KEY_HASH, "ed25519 key hash", "tz1", [6, 161, 159], 20);
    kind!(
        SECP256K1_KEY_HASH,
        "secp256k1 key hash",
        "tz2",
        [6, 161, 161],
        20
    );
    kind!(P256_KEY_HASH, "p256 key hash", "tz3", [6, 161, 164], 20);
    kind!(CONTRACT_HASH, "contract hash", "KT1", [2, 90, 121], 20);

    kind!(
        ED25519_PUBLIC_KEY,
        "ed25519 public key",
        "edpk",
        [13, 15, 37, 217],
        32
    );
    kind!(
        SECP256K1_PUBLIC_KEY,
        "secp256k1 public key",
        "sppk",
        [3, 254, 226, 86],
        33
    );
    kind!(
        P256_PUBLIC_KEY,
        "p256 public key",
        "p2pk",
        [3, 178, 139, 127],
        33
    );

    kind!(
        ED25519_SIGNATURE,
        "ed25519 signature",
        "edsig",
        [9, 245, 205, 134, 18],
        64
    );
    kind!(
        SECP256K1_SIGNATURE,
        "secp256k1 signature",
        "spsig1",
        [13, 115, 101, 19, 63],
        64
    );
    kind!(
        P256_SIGNATURE,
        "p256 signature",
        "p2sig",
        [54, 240, 44, 52],
        64
    );
    kind!(GENERIC_SIGNATURE, "generic signature", "sig", [4, 130, 43], 64);
}

fn checksum(payload: &[u8]) -> [u8; 4] {
    let digest = Sha256::digest(Sha256::digest(payload));
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Renders `prefix ++ data` as a checksummed base58 string.
fn encode_raw(payload: &[u8]) -> String {
    let mut full = payload.to_vec();
    full.extend_from_slice(&checksum(payload));

    let leading_zeros = full.iter().take_while(|&&b| b == 0).count();
    let digits = BigUint::from_bytes_be(&full).to_radix_be(58);

    let mut out = String::with_capacity(leading_zeros + digits.len());
    for _ in 0..leading_zeros {
        out.push('1');
    }
    // value zero renders as a single zero digit, which duplicates the
    // leading-zero run; suppress it
    if !(digits.len() == 1 && digits[0] == 0) {
        for d in digits {
            out.push(ALPHABET[d as usize] as char);
        }
    }
    out
}

/// Decodes a checksummed base58 string back into `prefix ++ data` bytes.
fn decode_raw(encoded: &str) -> Result<Vec<u8>, Base58Error> {
    let mut digits: Vec<u8> = Vec::with_capacity(encoded.len());
    for c in encoded.chars() {
        let pos = ALPHABET
            .iter()
            .position(|&a| a as char == c)
            .ok_or(Base58Error::InvalidCharacter(c))?;
        digits.push(pos as u8);
    }

    let leading_ones = digits.iter().take_while(|&&d| d == 0).count();
    let numeral =
        BigUint::from_radix_be(&digits, 58).ok_or(Base58Error::InvalidCharacter('?'))?;

    let mut full = vec![0u8; leading_ones];
    if numeral.bits() > 0 {
        full.extend(numeral.to_bytes_be());
    }

    if full.len() < 4 {
        return Err(Base58Error::BadChecksum);
    }
    let (payload, check) = full.split_at(full.len() - 4);
    if checksum(payload).as_slice() != check {
        return Err(Base58Error::BadChecksum);
    }
    Ok(payload.to_vec())
}

/// Renders the binary `data` of the given kind as its base58check string.
///
/// # Panics
///
/// Panics if `data` is not exactly `kind.data_len` bytes long; callers
/// hold fixed-width values, so a mismatch is an implementation bug rather
/// than input-dependent behavior.
#[must_use]
pub fn encode(kind: &HashKind, data: &[u8]) -> String {
    assert_eq!(
        data.len(),
        kind.data_len,
        "{} payload must be exactly {} bytes",
        kind.name,
        kind.data_len
    );
    let mut payload = kind.prefix.to_vec();
    payload.extend_from_slice(data);
    encode_raw(&payload)
}

/// Decodes a base58check string of the given kind, returning its raw data
/// bytes.
///
/// Fails when the string is not well-formed base58check, when the decoded
/// payload does not carry the kind's binary prefix, or when the data
/// portion has the wrong length.
pub fn decode(kind: &HashKind, encoded: &str) -> Result<Vec<u8>, Base58Error> {
    let payload = decode_raw(encoded)?;
    let data = payload
        .strip_prefix(kind.prefix)
        .ok_or(Base58Error::WrongPrefix {
            expected: kind.sigil,
        })?;
    if data.len() != kind.data_len {
        return Err(Base58Error::WrongLength {
            kind: kind.name,
            expected: kind.data_len,
            actual: data.len(),
        });
    }
    Ok(data.to_vec())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn block_hash_vector() {
        // known mainnet block hash and its raw digest
        let decoded = decode(
            &kinds::BLOCK_HASH,
            "BLyKu3tnc9NCuiFfCqfeVGPCoZTyW63dYh2XAYxkM7fQYKCqsju",
        )
        .unwrap();
        assert_eq!(
            crate::hexstring::util::hex_of_bytes(&decoded),
            "a5db12a8a7716fa5445bd374c8b3239c876dde8397efae0eb0dd223dc23a51c7"
        );
        assert_eq!(
            encode(&kinds::BLOCK_HASH, &decoded),
            "BLyKu3tnc9NCuiFfCqfeVGPCoZTyW63dYh2XAYxkM7fQYKCqsju"
        );
    }

    #[test]
    fn sigils_match_prefixes() {
        for kind in [
            kinds::BLOCK_HASH,
            kinds::OPERATION_HASH,
            kinds::OPERATION_LIST_LIST_HASH,
            kinds::PROTOCOL_HASH,
            kinds::CONTEXT_HASH,
            kinds::BLOCK_PAYLOAD_HASH,
            kinds::NONCE_HASH,
            kinds::CHAIN_ID,
            kinds::ED25519_KEY_HASH,
            kinds::SECP256K1_KEY_HASH,
            kinds::P256_KEY_HASH,
            kinds::CONTRACT_HASH,
            kinds::ED25519_PUBLIC_KEY,
            kinds::SECP256K1_PUBLIC_KEY,
            kinds::P256_PUBLIC_KEY,
            kinds::ED25519_SIGNATURE,
            kinds::SECP256K1_SIGNATURE,
            kinds::P256_SIGNATURE,
            kinds::GENERIC_SIGNATURE,
        ] {
            let rendered = encode(&kind, &vec![0u8; kind.data_len]);
            assert!(
                rendered.starts_with(kind.sigil),
                "{} rendered as {rendered}, expected sigil {}",
                kind.name,
                kind.sigil
            );
            assert_eq!(decode(&kind, &rendered).unwrap(), vec![0u8; kind.data_len]);
        }
    }

    #[test]
    fn corruption_detected() {
        let good = encode(&kinds::CHAIN_ID, &[0xde, 0xad, 0xbe, 0xef]);
        let mut chars: Vec<char> = good.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == '1' { '2' } else { '1' };
        let bad: String = chars.into_iter().collect();
        assert!(matches!(
            decode(&kinds::CHAIN_ID, &bad),
            Err(Base58Error::BadChecksum) | Err(Base58Error::InvalidCharacter(_))
        ));
    }

    #[test]
    fn wrong_kind_rejected() {
        let as_block = encode(&kinds::BLOCK_HASH, &[7u8; 32]);
        assert!(matches!(
            decode(&kinds::OPERATION_HASH, &as_block),
            Err(Base58Error::WrongPrefix { .. })
        ));
    }
}

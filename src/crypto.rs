//! Typed hashes, key hashes, public keys, signatures, and addresses
//!
//! Each type in this module pairs a fixed-width binary representation used
//! on the wire with a base58check rendering used in Micheline strings and
//! RPC JSON. Conversions in both directions go through the prefix table in
//! [`crate::base58`]; binary transcoding goes through [`Encode`]/[`Decode`]
//! like every other wire type.

use crate::base58::{self, kinds, Base58Error, HashKind};
use crate::conv::target::Target;
use crate::conv::{Decode, Encode};
use crate::parse::{ParseResult, Parser};

macro_rules! fixed_hash {
    ( $(#[$doc:meta])* $name:ident, $kind:path, $len:literal ) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// The [`HashKind`] governing this type's base58 rendering.
            pub const KIND: HashKind = $kind;

            /// Wraps raw bytes without validation.
            #[must_use]
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Borrows the raw bytes.
            #[must_use]
            pub const fn as_array(&self) -> &[u8; $len] {
                &self.0
            }

            /// Parses the base58check rendering of this kind.
            pub fn from_base58(encoded: &str) -> Result<Self, Base58Error> {
                let data = base58::decode(&Self::KIND, encoded)?;
                let mut bytes = [0u8; $len];
                bytes.copy_from_slice(&data);
                Ok(Self(bytes))
            }

            /// Renders `self` as its base58check string.
            #[must_use]
            pub fn to_base58(&self) -> String {
                base58::encode(&Self::KIND, &self.0)
            }
        }

        impl Encode for $name {
            fn write_to<U: Target>(&self, buf: &mut U) -> usize {
                buf.push_many(self.0)
            }
        }

        impl Decode for $name {
            fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
                Ok(Self(p.take_fixed::<$len>()?))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(&self.to_base58())
                    .finish()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_base58())
            }
        }

        impl std::str::FromStr for $name {
            type Err = Base58Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_base58(s)
            }
        }
    };
}

fixed_hash!(
    /// Reference to a block (`B…`)
    BlockHash,
    kinds::BLOCK_HASH,
    32
);
fixed_hash!(
    /// Hash of an injected operation (`o…`)
    OperationHash,
    kinds::OPERATION_HASH,
    32
);
fixed_hash!(
    /// Root of a block's operation lists (`LLo…`)
    OperationListListHash,
    kinds::OPERATION_LIST_LIST_HASH,
    32
);
fixed_hash!(
    /// Hash of an economic protocol (`P…`)
    ProtocolHash,
    kinds::PROTOCOL_HASH,
    32
);
fixed_hash!(
    /// Hash of a context state (`Co…`)
    ContextHash,
    kinds::CONTEXT_HASH,
    32
);
fixed_hash!(
    /// Hash of a round's consensus payload (`vh…`)
    BlockPayloadHash,
    kinds::BLOCK_PAYLOAD_HASH,
    32
);
fixed_hash!(
    /// Commitment to a seed nonce (`nce…`)
    NonceHash,
    kinds::NONCE_HASH,
    32
);
fixed_hash!(
    /// Hash of an originated contract (`KT1…`)
    ContractHash,
    kinds::CONTRACT_HASH,
    20
);
fixed_hash!(
    /// Network discriminator (`Net…`)
    ChainId,
    kinds::CHAIN_ID,
    4
);

/// Hash of a public key, discriminated by signature scheme
///
/// Wire form is a one-byte scheme tag (`0` ed25519, `1` secp256k1,
/// `2` p256) followed by the 20-byte hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyHash {
    Ed25519([u8; 20]),
    Secp256k1([u8; 20]),
    P256([u8; 20]),
}

impl KeyHash {
    const TAGS: [u8; 3] = [0, 1, 2];

    /// The scheme tag byte of this hash.
    #[must_use]
    pub const fn scheme_tag(&self) -> u8 {
        match self {
            KeyHash::Ed25519(_) => 0,
            KeyHash::Secp256k1(_) => 1,
            KeyHash::P256(_) => 2,
        }
    }

    /// Borrows the 20 hash bytes, without the scheme tag.
    #[must_use]
    pub const fn hash_bytes(&self) -> &[u8; 20] {
        match self {
            KeyHash::Ed25519(h) | KeyHash::Secp256k1(h) | KeyHash::P256(h) => h,
        }
    }

    fn kind(&self) -> &'static HashKind {
        match self {
            KeyHash::Ed25519(_) => &kinds::ED25519_KEY_HASH,
            KeyHash::Secp256k1(_) => &kinds::SECP256K1_KEY_HASH,
            KeyHash::P256(_) => &kinds::P256_KEY_HASH,
        }
    }

    /// Parses any of the three `tz…` renderings.
    pub fn from_base58(encoded: &str) -> Result<Self, Base58Error> {
        for (kind, make) in [
            (
                &kinds::ED25519_KEY_HASH,
                KeyHash::Ed25519 as fn([u8; 20]) -> KeyHash,
            ),
            (&kinds::SECP256K1_KEY_HASH, KeyHash::Secp256k1 as fn([u8; 20]) -> KeyHash),
            (&kinds::P256_KEY_HASH, KeyHash::P256 as fn([u8; 20]) -> KeyHash),
        ] {
            match base58::decode(kind, encoded) {
                Ok(data) => {
                    let mut bytes = [0u8; 20];
                    bytes.copy_from_slice(&data);
                    return Ok(make(bytes));
                }
                Err(Base58Error::WrongPrefix { .. }) => continue,
                Err(other) => return Err(other),
            }
        }
        Err(Base58Error::WrongPrefix { expected: "tz" })
    }

    /// Renders `self` as its `tz…` string.
    #[must_use]
    pub fn to_base58(&self) -> String {
        base58::encode(self.kind(), self.hash_bytes())
    }
}

impl Encode for KeyHash {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_one(self.scheme_tag()) + buf.push_many(*self.hash_bytes())
    }
}

impl Decode for KeyHash {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let tag = p.take_tagword::<KeyHash>(&Self::TAGS)?;
        let hash = p.take_fixed::<20>()?;
        Ok(match tag {
            0 => KeyHash::Ed25519(hash),
            1 => KeyHash::Secp256k1(hash),
            2 => KeyHash::P256(hash),
            _ => unreachable!(),
        })
    }
}

impl std::fmt::Debug for KeyHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("KeyHash").field(&self.to_base58()).finish()
    }
}

impl std::fmt::Display for KeyHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl std::str::FromStr for KeyHash {
    type Err = Base58Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

/// Public key, discriminated by signature scheme
///
/// Wire form is a one-byte scheme tag followed by the scheme's
/// fixed-length key material: 32 bytes for ed25519, 33 compressed bytes
/// for secp256k1 and p256.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicKey {
    Ed25519([u8; 32]),
    Secp256k1([u8; 33]),
    P256([u8; 33]),
}

impl PublicKey {
    const TAGS: [u8; 3] = [0, 1, 2];

    /// The scheme tag byte of this key.
    #[must_use]
    pub const fn scheme_tag(&self) -> u8 {
        match self {
            PublicKey::Ed25519(_) => 0,
            PublicKey::Secp256k1(_) => 1,
            PublicKey::P256(_) => 2,
        }
    }

    /// Parses any of the three `edpk…`/`sppk…`/`p2pk…` renderings.
    pub fn from_base58(encoded: &str) -> Result<Self, Base58Error> {
        match base58::decode(&kinds::ED25519_PUBLIC_KEY, encoded) {
            Ok(data) => {
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(&data);
                return Ok(PublicKey::Ed25519(bytes));
            }
            Err(Base58Error::WrongPrefix { .. }) => {}
            Err(other) => return Err(other),
        }
        for (kind, make) in [
            (
                &kinds::SECP256K1_PUBLIC_KEY,
                PublicKey::Secp256k1 as fn([u8; 33]) -> PublicKey,
            ),
            (&kinds::P256_PUBLIC_KEY, PublicKey::P256 as fn([u8; 33]) -> PublicKey),
        ] {
            match base58::decode(kind, encoded) {
                Ok(data) => {
                    let mut bytes = [0u8; 33];
                    bytes.copy_from_slice(&data);
                    return Ok(make(bytes));
                }
                Err(Base58Error::WrongPrefix { .. }) => continue,
                Err(other) => return Err(other),
            }
        }
        Err(Base58Error::WrongPrefix { expected: "edpk" })
    }

    /// Renders `self` as its base58check string.
    #[must_use]
    pub fn to_base58(&self) -> String {
        match self {
            PublicKey::Ed25519(k) => base58::encode(&kinds::ED25519_PUBLIC_KEY, k),
            PublicKey::Secp256k1(k) => base58::encode(&kinds::SECP256K1_PUBLIC_KEY, k),
            PublicKey::P256(k) => base58::encode(&kinds::P256_PUBLIC_KEY, k),
        }
    }
}

impl Encode for PublicKey {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_one(self.scheme_tag())
            + match self {
                PublicKey::Ed25519(k) => buf.push_many(*k),
                PublicKey::Secp256k1(k) | PublicKey::P256(k) => buf.push_many(*k),
            }
    }
}

impl Decode for PublicKey {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        match p.take_tagword::<PublicKey>(&Self::TAGS)? {
            0 => Ok(PublicKey::Ed25519(p.take_fixed::<32>()?)),
            1 => Ok(PublicKey::Secp256k1(p.take_fixed::<33>()?)),
            2 => Ok(PublicKey::P256(p.take_fixed::<33>()?)),
            _ => unreachable!(),
        }
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_base58()).finish()
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl std::str::FromStr for PublicKey {
    type Err = Base58Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

/// A 64-byte signature in scheme-generic form
///
/// Scheme-specific renderings (`edsig…`, `spsig1…`, `p2sig…`) and the
/// generic `sig…` rendering all carry the same 64 raw bytes; parsing
/// accepts any of the four, rendering always produces the generic form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// Parses any signature rendering into generic form.
    pub fn from_base58(encoded: &str) -> Result<Self, Base58Error> {
        for kind in [
            &kinds::GENERIC_SIGNATURE,
            &kinds::ED25519_SIGNATURE,
            &kinds::SECP256K1_SIGNATURE,
            &kinds::P256_SIGNATURE,
        ] {
            match base58::decode(kind, encoded) {
                Ok(data) => {
                    let mut bytes = [0u8; 64];
                    bytes.copy_from_slice(&data);
                    return Ok(Self(bytes));
                }
                Err(Base58Error::WrongPrefix { .. }) => continue,
                Err(other) => return Err(other),
            }
        }
        Err(Base58Error::WrongPrefix { expected: "sig" })
    }

    /// Renders `self` in the scheme-generic `sig…` form.
    #[must_use]
    pub fn to_base58(&self) -> String {
        base58::encode(&kinds::GENERIC_SIGNATURE, &self.0)
    }
}

impl Encode for Signature {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_many(self.0)
    }
}

impl Decode for Signature {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self(p.take_fixed::<64>()?))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Signature").field(&self.to_base58()).finish()
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl std::str::FromStr for Signature {
    type Err = Base58Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

/// Destination of a transaction: an implicit account or an originated
/// contract
///
/// Wire form is 22 bytes: tag `0` followed by a 21-byte [`KeyHash`], or
/// tag `1` followed by the 20-byte contract hash and one byte of padding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractId {
    Implicit(KeyHash),
    Originated(ContractHash),
}

impl ContractId {
    const TAGS: [u8; 2] = [0, 1];

    /// Parses either a `tz…` or a `KT1…` rendering.
    pub fn from_base58(encoded: &str) -> Result<Self, Base58Error> {
        match ContractHash::from_base58(encoded) {
            Ok(hash) => return Ok(ContractId::Originated(hash)),
            Err(Base58Error::WrongPrefix { .. }) => {}
            Err(other) => return Err(other),
        }
        KeyHash::from_base58(encoded).map(ContractId::Implicit)
    }

    /// Renders `self` as its base58check string.
    #[must_use]
    pub fn to_base58(&self) -> String {
        match self {
            ContractId::Implicit(kh) => kh.to_base58(),
            ContractId::Originated(ch) => ch.to_base58(),
        }
    }
}

impl Encode for ContractId {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        match self {
            ContractId::Implicit(kh) => buf.push_one(0) + kh.write_to(buf),
            ContractId::Originated(ch) => {
                buf.push_one(1) + ch.write_to(buf) + buf.push_one(0)
            }
        }
    }
}

impl Decode for ContractId {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        match p.take_tagword::<ContractId>(&Self::TAGS)? {
            0 => Ok(ContractId::Implicit(KeyHash::parse(p)?)),
            1 => {
                let hash = ContractHash::parse(p)?;
                let _padding = p.consume_byte()?;
                Ok(ContractId::Originated(hash))
            }
            _ => unreachable!(),
        }
    }
}

impl std::fmt::Debug for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ContractId").field(&self.to_base58()).finish()
    }
}

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl std::str::FromStr for ContractId {
    type Err = Base58Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

/// A contract reference with an optional entrypoint suffix
///
/// The readable rendering is `<contract>` or `<contract>%<entrypoint>`;
/// the packed binary rendering appends the UTF-8 entrypoint name directly
/// after the 22 contract bytes, its extent delimited by the enclosing
/// byte literal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub contract: ContractId,
    pub entrypoint: Option<String>,
}

impl Address {
    /// Address of a contract with no entrypoint suffix.
    #[must_use]
    pub const fn plain(contract: ContractId) -> Self {
        Self {
            contract,
            entrypoint: None,
        }
    }

    /// Parses `<base58>` or `<base58>%<entrypoint>`.
    pub fn from_base58(encoded: &str) -> Result<Self, Base58Error> {
        let (contract_part, entrypoint) = match encoded.split_once('%') {
            Some((c, e)) => (c, Some(e.to_owned())),
            None => (encoded, None),
        };
        Ok(Self {
            contract: ContractId::from_base58(contract_part)?,
            entrypoint,
        })
    }

    /// Renders `self` with its `%entrypoint` suffix, when present.
    #[must_use]
    pub fn to_base58(&self) -> String {
        match &self.entrypoint {
            Some(ep) => format!("{}%{}", self.contract.to_base58(), ep),
            None => self.contract.to_base58(),
        }
    }

    /// Packed binary form: 22 contract bytes plus the raw entrypoint name.
    #[must_use]
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        let mut bytes = self.contract.to_bytes();
        if let Some(ep) = &self.entrypoint {
            bytes.extend_from_slice(ep.as_bytes());
        }
        bytes
    }

    /// Reads the packed binary form back; everything after the 22 contract
    /// bytes is the entrypoint name.
    pub fn from_packed_bytes(bytes: &[u8]) -> ParseResult<Self> {
        use crate::parse::TryIntoParser;

        let mut p: crate::parse::byteparser::ByteParser = bytes.try_into_parser()?;
        let contract = ContractId::parse(&mut p)?;
        let trailing = p.take_dynamic(p.remainder())?;
        let entrypoint = if trailing.is_empty() {
            None
        } else {
            Some(String::from_utf8(trailing).map_err(crate::parse::error::ParseError::from)?)
        };
        Ok(Self {
            contract,
            entrypoint,
        })
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Address").field(&self.to_base58()).finish()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl std::str::FromStr for Address {
    type Err = Base58Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hexstring::HexString;

    #[test]
    fn key_hash_binary_roundtrip() {
        let kh = KeyHash::Ed25519([0x11; 20]);
        let bytes: HexString = kh.encode();
        assert_eq!(bytes.len(), 21);
        assert_eq!(bytes.as_bytes()[0], 0);
        assert_eq!(KeyHash::decode(bytes), kh);

        let tz = kh.to_base58();
        assert!(tz.starts_with("tz1"));
        assert_eq!(KeyHash::from_base58(&tz).unwrap(), kh);
    }

    #[test]
    fn contract_id_binary_forms() {
        let implicit = ContractId::Implicit(KeyHash::P256([0x22; 20]));
        let originated = ContractId::Originated(ContractHash::new([0x33; 20]));
        for cid in [implicit, originated] {
            let bytes: HexString = cid.encode();
            assert_eq!(bytes.len(), 22);
            assert_eq!(ContractId::decode(bytes), cid);
        }
    }

    #[test]
    fn address_entrypoint_split() {
        let originated = ContractId::Originated(ContractHash::new([0x44; 20]));
        let plain = Address::plain(originated);
        let with_ep = Address {
            contract: originated,
            entrypoint: Some("transfer".to_owned()),
        };

        let rendered = with_ep.to_base58();
        assert!(rendered.ends_with("%transfer"));
        assert_eq!(Address::from_base58(&rendered).unwrap(), with_ep);
        assert_eq!(Address::from_base58(&plain.to_base58()).unwrap(), plain);

        let packed = with_ep.to_packed_bytes();
        assert_eq!(packed.len(), 22 + "transfer".len());
        assert_eq!(Address::from_packed_bytes(&packed).unwrap(), with_ep);
    }

    #[test]
    fn signature_scheme_renderings_agree() {
        let sig = Signature([0x55; 64]);
        let generic = sig.to_base58();
        assert!(generic.starts_with("sig"));
        assert_eq!(Signature::from_base58(&generic).unwrap(), sig);

        let edsig = base58::encode(&kinds::ED25519_SIGNATURE, &sig.0);
        assert_eq!(Signature::from_base58(&edsig).unwrap(), sig);
    }
}

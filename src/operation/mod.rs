//! The operation envelope and its forging/unforging entry points
//!
//! An operation is a branch (the hash of a recent block), an ordered list
//! of contents, and optionally a signature. *Forging* is the byte-exact
//! serialization broadcast to peers: branch bytes, then each content's
//! encoding in order, then — for signed operations — the raw 64 signature
//! bytes, with no separators. Layout is self-delimiting via fixed widths
//! and 4-byte length prefixes, so unforging needs no out-of-band framing:
//! contents are consumed until the buffer (minus a trailing signature, in
//! the signed case) is exhausted.
//!
//! Signing is pure: [`Operation::sign`] computes the watermarked preimage,
//! asks the [`Signer`](crate::client::Signer) seam for a signature, and
//! returns a new envelope.

pub mod content;
pub mod header;

pub use content::{
    BallotVote, Consensus, Content, ContentKind, Manager, Parameters, Script,
};
pub use header::{BlockHeader, InlinedEndorsement, InlinedPreendorsement};

use crate::client::{Signer, SignerError};
use crate::conv::target::Target;
use crate::conv::{Decode, DecodeError, DecodeResult, Encode};
use crate::crypto::{BlockHash, Signature};
use crate::parse::byteparser::ByteParser;
use crate::parse::{ParseResult, Parser, TryIntoParser};

/// Watermark byte prefixed to the forged bytes of a generic operation
/// before signing.
pub const GENERIC_OPERATION_WATERMARK: u8 = 0x03;

/// An operation envelope, unsigned or signed
///
/// The two states share one representation: `signature` is `None` for an
/// unsigned envelope and `Some` once signed. Signing never mutates; it
/// produces a new value.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    pub branch: BlockHash,
    pub contents: Vec<Content>,
    pub signature: Option<Signature>,
}

impl Operation {
    /// A fresh unsigned envelope.
    #[must_use]
    pub fn unsigned(branch: BlockHash, contents: Vec<Content>) -> Self {
        Self {
            branch,
            contents,
            signature: None,
        }
    }

    /// A copy of this envelope carrying the given signature.
    #[must_use]
    pub fn with_signature(&self, signature: Signature) -> Self {
        Self {
            branch: self.branch,
            contents: self.contents.clone(),
            signature: Some(signature),
        }
    }

    /// Serializes this envelope to its network-exact bytes.
    #[must_use]
    pub fn forge(&self) -> Vec<u8> {
        self.to_bytes()
    }

    /// The watermarked bytes a signer commits to: the generic-operation
    /// watermark followed by the forged unsigned envelope.
    #[must_use]
    pub fn signing_preimage(&self) -> Vec<u8> {
        let mut preimage = vec![GENERIC_OPERATION_WATERMARK];
        self.branch.write_to_vec(&mut preimage);
        for content in &self.contents {
            content.write_to_vec(&mut preimage);
        }
        preimage
    }

    /// Signs this envelope through the given signer, returning a new,
    /// signed envelope.
    pub fn sign<S: Signer + ?Sized>(&self, signer: &S) -> Result<Operation, SignerError> {
        let signature = signer.sign(&self.signing_preimage())?;
        Ok(self.with_signature(signature))
    }

    /// Checks this envelope's signature through the given signer.
    ///
    /// An unsigned envelope never verifies.
    #[must_use]
    pub fn verify<S: Signer + ?Sized>(&self, signer: &S) -> bool {
        match &self.signature {
            Some(signature) => signer.verify(&self.signing_preimage(), signature),
            None => false,
        }
    }

    /// Parses an unsigned operation: branch, then contents until the end
    /// of the buffer.
    pub fn unforge(bytes: &[u8]) -> DecodeResult<Operation> {
        let mut p: ByteParser = bytes.try_into_parser()?;
        let op = Self::parse_unsigned(&mut p)?;
        debug_assert_eq!(p.remainder(), 0);
        Ok(op)
    }

    /// Parses a signed operation: branch, then contents until exactly the
    /// 64 trailing signature bytes remain.
    pub fn unforge_signed(bytes: &[u8]) -> DecodeResult<Operation> {
        let mut p: ByteParser = bytes.try_into_parser()?;
        let branch = BlockHash::parse(&mut p)?;
        let mut contents = Vec::new();
        while p.remainder() > 64 {
            contents.push(Content::parse(&mut p)?);
        }
        let signature = Signature::parse(&mut p)?;
        let leftover = p.remainder();
        if leftover != 0 {
            return Err(DecodeError::Incomplete { leftover });
        }
        Ok(Operation {
            branch,
            contents,
            signature: Some(signature),
        })
    }

    fn parse_unsigned<P: Parser>(p: &mut P) -> ParseResult<Operation> {
        let branch = BlockHash::parse(p)?;
        let mut contents = Vec::new();
        while p.remainder() > 0 {
            contents.push(Content::parse(p)?);
        }
        Ok(Operation {
            branch,
            contents,
            signature: None,
        })
    }
}

impl Encode for Operation {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        let mut written = self.branch.write_to(buf);
        for content in &self.contents {
            written += content.write_to(buf);
        }
        // the signature is appended raw, with no presence flag; the two
        // envelope states are distinguished by total length at parse time
        if let Some(signature) = &self.signature {
            written += signature.write_to(buf);
        }
        written
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::KeyHash;
    use crate::hexstring::util::hex_of_bytes;
    use crate::micheline::Micheline;
    use crate::zarith::n::N;

    fn branch() -> BlockHash {
        BlockHash::from_base58("BLyKu3tnc9NCuiFfCqfeVGPCoZTyW63dYh2XAYxkM7fQYKCqsju").unwrap()
    }

    fn sample_contents() -> Vec<Content> {
        vec![Content::Transaction {
            manager: Manager {
                source: KeyHash::Ed25519([0x5a; 20]),
                fee: N::from(1_283u32),
                counter: N::from(7u32),
                gas_limit: N::from(10_307u32),
                storage_limit: N::from(0u32),
            },
            amount: N::from(50_000u32),
            destination: crate::crypto::ContractId::Implicit(KeyHash::Ed25519([0x6b; 20])),
            parameters: None,
        }]
    }

    #[test]
    fn empty_unsigned_operation_forges_to_branch_bytes() {
        let op = Operation::unsigned(branch(), vec![]);
        assert_eq!(
            hex_of_bytes(&op.forge()),
            "a5db12a8a7716fa5445bd374c8b3239c876dde8397efae0eb0dd223dc23a51c7"
        );
    }

    #[test]
    fn unsigned_roundtrip() {
        let op = Operation::unsigned(branch(), sample_contents());
        let bytes = op.forge();
        let parsed = Operation::unforge(&bytes).unwrap();
        assert_eq!(parsed, op);
        assert_eq!(parsed.forge(), bytes);
    }

    #[test]
    fn signed_roundtrip() {
        let op = Operation::unsigned(branch(), sample_contents())
            .with_signature(Signature([0x77; 64]));
        let bytes = op.forge();
        assert_eq!(bytes.len(), 32 + 64 + sample_contents()[0].to_bytes().len());
        let parsed = Operation::unforge_signed(&bytes).unwrap();
        assert_eq!(parsed, op);
        assert_eq!(parsed.forge(), bytes);
    }

    #[test]
    fn truncated_branch_is_malformed() {
        let op = Operation::unsigned(branch(), vec![]);
        let mut bytes = op.forge();
        bytes.pop();
        assert!(Operation::unforge(&bytes).is_err());
    }

    #[test]
    fn truncated_content_is_malformed() {
        let op = Operation::unsigned(branch(), sample_contents());
        let mut bytes = op.forge();
        bytes.pop();
        assert!(Operation::unforge(&bytes).is_err());
    }

    #[test]
    fn preimage_is_watermarked_forge() {
        let op = Operation::unsigned(branch(), sample_contents());
        let preimage = op.signing_preimage();
        assert_eq!(preimage[0], GENERIC_OPERATION_WATERMARK);
        assert_eq!(&preimage[1..], op.forge().as_slice());
    }

    #[test]
    fn transaction_parameters_surface_in_forge() {
        let mut contents = sample_contents();
        if let Content::Transaction { parameters, .. } = &mut contents[0] {
            *parameters = Some(Parameters {
                entrypoint: crate::entrypoint::Entrypoint::Default,
                value: Micheline::unit(),
            });
        }
        let op = Operation::unsigned(branch(), contents);
        let bytes = op.forge();
        let parsed = Operation::unforge(&bytes).unwrap();
        assert_eq!(parsed.forge(), bytes);
    }
}

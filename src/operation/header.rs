//! Block headers and inlined consensus operations
//!
//! Double-signing evidence embeds complete signed artifacts: baking
//! evidence carries two full block headers, (pre)endorsement evidence
//! carries two inlined consensus operations. Each embedded artifact is
//! wrapped in a 4-byte dynamic frame by its enclosing content.

use super::content::Consensus;
use crate::conv::target::Target;
use crate::conv::{Decode, Encode};
use crate::crypto::{BlockHash, BlockPayloadHash, ContextHash, NonceHash, OperationListListHash, Signature};
use crate::dynamic::{parse_dynamic_bytes, write_dynamic_bytes};
use crate::parse::{ParseResult, Parser};

/// A complete (shell + protocol) block header
#[derive(Clone, Debug, PartialEq)]
pub struct BlockHeader {
    pub level: i32,
    pub proto: u8,
    pub predecessor: BlockHash,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    pub validation_pass: u8,
    pub operations_hash: OperationListListHash,
    /// Raw fitness components, each its own dynamic frame
    pub fitness: Vec<Vec<u8>>,
    pub context: ContextHash,
    pub payload_hash: BlockPayloadHash,
    pub payload_round: i32,
    pub proof_of_work_nonce: [u8; 8],
    pub seed_nonce_hash: Option<NonceHash>,
    pub liquidity_baking_escape_vote: bool,
    pub signature: Signature,
}

impl Encode for BlockHeader {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        let mut fitness_payload: Vec<u8> = Vec::new();
        for component in &self.fitness {
            write_dynamic_bytes(&mut fitness_payload, component);
        }

        self.level.write_to(buf)
            + self.proto.write_to(buf)
            + self.predecessor.write_to(buf)
            + self.timestamp.write_to(buf)
            + self.validation_pass.write_to(buf)
            + self.operations_hash.write_to(buf)
            + write_dynamic_bytes(buf, &fitness_payload)
            + self.context.write_to(buf)
            + self.payload_hash.write_to(buf)
            + self.payload_round.write_to(buf)
            + buf.push_many(self.proof_of_work_nonce)
            + self.seed_nonce_hash.write_to(buf)
            + self.liquidity_baking_escape_vote.write_to(buf)
            + self.signature.write_to(buf)
    }
}

impl Decode for BlockHeader {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let level = p.take_i32()?;
        let proto = p.take_u8()?;
        let predecessor = BlockHash::parse(p)?;
        let timestamp = p.take_i64()?;
        let validation_pass = p.take_u8()?;
        let operations_hash = OperationListListHash::parse(p)?;

        let fitness_len = p.take_u32()? as usize;
        p.set_fit(fitness_len)?;
        let mut fitness = Vec::new();
        while !p.test_target()? {
            fitness.push(parse_dynamic_bytes(p)?);
        }
        p.enforce_target()?;

        Ok(Self {
            level,
            proto,
            predecessor,
            timestamp,
            validation_pass,
            operations_hash,
            fitness,
            context: ContextHash::parse(p)?,
            payload_hash: BlockPayloadHash::parse(p)?,
            payload_round: p.take_i32()?,
            proof_of_work_nonce: p.take_fixed::<8>()?,
            seed_nonce_hash: Option::<NonceHash>::parse(p)?,
            liquidity_baking_escape_vote: p.take_bool()?,
            signature: Signature::parse(p)?,
        })
    }
}

/// An endorsement embedded, with its branch and signature, inside
/// double-endorsement evidence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlinedEndorsement {
    pub branch: BlockHash,
    pub endorsement: Consensus,
    pub signature: Signature,
}

impl Encode for InlinedEndorsement {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.branch.write_to(buf)
            + buf.push_one(super::content::ContentKind::Endorsement.tag())
            + self.endorsement.write_to(buf)
            + self.signature.write_to(buf)
    }
}

impl Decode for InlinedEndorsement {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let branch = BlockHash::parse(p)?;
        let _tag = p.take_tagword::<InlinedEndorsement>(&[
            super::content::ContentKind::Endorsement.tag()
        ])?;
        Ok(Self {
            branch,
            endorsement: Consensus::parse(p)?,
            signature: Signature::parse(p)?,
        })
    }
}

/// A preendorsement embedded inside double-preendorsement evidence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlinedPreendorsement {
    pub branch: BlockHash,
    pub preendorsement: Consensus,
    pub signature: Signature,
}

impl Encode for InlinedPreendorsement {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.branch.write_to(buf)
            + buf.push_one(super::content::ContentKind::Preendorsement.tag())
            + self.preendorsement.write_to(buf)
            + self.signature.write_to(buf)
    }
}

impl Decode for InlinedPreendorsement {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let branch = BlockHash::parse(p)?;
        let _tag = p.take_tagword::<InlinedPreendorsement>(&[
            super::content::ContentKind::Preendorsement.tag()
        ])?;
        Ok(Self {
            branch,
            preendorsement: Consensus::parse(p)?,
            signature: Signature::parse(p)?,
        })
    }
}

//! The sixteen operation content kinds and their tag-dispatch codec
//!
//! Every content kind owns a protocol-fixed one-byte tag that is a
//! byte-exact prefix of its encoding; no tag is a prefix of another, so
//! decoding selects exactly one kind per valid buffer. Two field shapes
//! recur across kinds: the consensus prefix (slot, level, round, payload
//! hash) and the manager prefix (source, fee, counter, gas limit, storage
//! limit), both modeled once and embedded.
//!
//! Decode dispatch goes through a 256-slot lookup table from tag byte to
//! kind, built once on first use.

use super::header::{BlockHeader, InlinedEndorsement, InlinedPreendorsement};
use crate::conv::target::Target;
use crate::conv::{Decode, Encode};
use crate::crypto::{BlockPayloadHash, ContractId, KeyHash, ProtocolHash, PublicKey};
use crate::dynamic::{parse_dynamic, parse_dynamic_bytes, write_dynamic, write_dynamic_bytes};
use crate::entrypoint::Entrypoint;
use crate::micheline::Micheline;
use crate::parse::error::TagError;
use crate::parse::{ParseResult, Parser};
use crate::zarith::n::N;
use lazy_static::lazy_static;

/// The sixteen content kinds and their protocol-fixed tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContentKind {
    SeedNonceRevelation = 1,
    DoubleEndorsementEvidence = 2,
    DoubleBakingEvidence = 3,
    ActivateAccount = 4,
    Proposals = 5,
    Ballot = 6,
    DoublePreendorsementEvidence = 7,
    FailingNoop = 17,
    Preendorsement = 20,
    Endorsement = 21,
    Reveal = 107,
    Transaction = 108,
    Origination = 109,
    Delegation = 110,
    RegisterGlobalConstant = 111,
    SetDepositsLimit = 112,
}

impl ContentKind {
    /// All kinds, in tag order.
    pub const ALL: [ContentKind; 16] = [
        ContentKind::SeedNonceRevelation,
        ContentKind::DoubleEndorsementEvidence,
        ContentKind::DoubleBakingEvidence,
        ContentKind::ActivateAccount,
        ContentKind::Proposals,
        ContentKind::Ballot,
        ContentKind::DoublePreendorsementEvidence,
        ContentKind::FailingNoop,
        ContentKind::Preendorsement,
        ContentKind::Endorsement,
        ContentKind::Reveal,
        ContentKind::Transaction,
        ContentKind::Origination,
        ContentKind::Delegation,
        ContentKind::RegisterGlobalConstant,
        ContentKind::SetDepositsLimit,
    ];

    /// The fixed one-byte tag of this kind.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> u8 {
        *self as u8
    }

    /// The RPC-facing name of this kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            ContentKind::SeedNonceRevelation => "seed_nonce_revelation",
            ContentKind::DoubleEndorsementEvidence => "double_endorsement_evidence",
            ContentKind::DoubleBakingEvidence => "double_baking_evidence",
            ContentKind::ActivateAccount => "activate_account",
            ContentKind::Proposals => "proposals",
            ContentKind::Ballot => "ballot",
            ContentKind::DoublePreendorsementEvidence => "double_preendorsement_evidence",
            ContentKind::FailingNoop => "failing_noop",
            ContentKind::Preendorsement => "preendorsement",
            ContentKind::Endorsement => "endorsement",
            ContentKind::Reveal => "reveal",
            ContentKind::Transaction => "transaction",
            ContentKind::Origination => "origination",
            ContentKind::Delegation => "delegation",
            ContentKind::RegisterGlobalConstant => "register_global_constant",
            ContentKind::SetDepositsLimit => "set_deposits_limit",
        }
    }

    /// Looks a kind up by its tag byte.
    #[inline]
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<ContentKind> {
        KIND_BY_TAG[tag as usize]
    }
}

lazy_static! {
    /// Tag-byte to kind lookup table, built once.
    static ref KIND_BY_TAG: [Option<ContentKind>; 256] = {
        let mut table = [Option::<ContentKind>::None; 256];
        for kind in ContentKind::ALL {
            table[kind.tag() as usize] = Some(kind);
        }
        table
    };
}

/// Field prefix shared by the consensus content kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Consensus {
    pub slot: u16,
    pub level: i32,
    pub round: i32,
    pub block_payload_hash: BlockPayloadHash,
}

impl Encode for Consensus {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.slot.write_to(buf)
            + self.level.write_to(buf)
            + self.round.write_to(buf)
            + self.block_payload_hash.write_to(buf)
    }
}

impl Decode for Consensus {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self {
            slot: p.take_u16()?,
            level: p.take_i32()?,
            round: p.take_i32()?,
            block_payload_hash: BlockPayloadHash::parse(p)?,
        })
    }
}

/// Field prefix shared by the manager content kinds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manager {
    pub source: KeyHash,
    /// Fee in mutez
    pub fee: N,
    pub counter: N,
    pub gas_limit: N,
    pub storage_limit: N,
}

impl Encode for Manager {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.source.write_to(buf)
            + self.fee.write_to(buf)
            + self.counter.write_to(buf)
            + self.gas_limit.write_to(buf)
            + self.storage_limit.write_to(buf)
    }
}

impl Decode for Manager {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self {
            source: KeyHash::parse(p)?,
            fee: N::parse(p)?,
            counter: N::parse(p)?,
            gas_limit: N::parse(p)?,
            storage_limit: N::parse(p)?,
        })
    }
}

/// A contract script: code and initial storage, each its own dynamic frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    pub code: Micheline,
    pub storage: Micheline,
}

impl Encode for Script {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        write_dynamic(buf, &self.code) + write_dynamic(buf, &self.storage)
    }
}

impl Decode for Script {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self {
            code: parse_dynamic(p)?,
            storage: parse_dynamic(p)?,
        })
    }
}

/// Transaction parameters: an entrypoint and a dynamically-framed value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameters {
    pub entrypoint: Entrypoint,
    pub value: Micheline,
}

impl Encode for Parameters {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.entrypoint.write_to(buf) + write_dynamic(buf, &self.value)
    }
}

impl Decode for Parameters {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self {
            entrypoint: Entrypoint::parse(p)?,
            value: parse_dynamic(p)?,
        })
    }
}

/// Vote carried by a ballot operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BallotVote {
    Yay = 0,
    Nay = 1,
    Pass = 2,
}

impl Encode for BallotVote {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_one(*self as u8)
    }
}

impl Decode for BallotVote {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        match p.take_tagword::<BallotVote>(&[0, 1, 2])? {
            0 => Ok(BallotVote::Yay),
            1 => Ok(BallotVote::Nay),
            2 => Ok(BallotVote::Pass),
            _ => unreachable!(),
        }
    }
}

/// One operation content, a 16-way tagged union
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    SeedNonceRevelation {
        level: i32,
        nonce: [u8; 32],
    },
    DoubleEndorsementEvidence {
        op1: InlinedEndorsement,
        op2: InlinedEndorsement,
    },
    DoubleBakingEvidence {
        bh1: BlockHeader,
        bh2: BlockHeader,
    },
    ActivateAccount {
        /// Raw ed25519 key hash, no scheme tag
        pkh: [u8; 20],
        secret: [u8; 20],
    },
    Proposals {
        source: KeyHash,
        period: i32,
        proposals: Vec<ProtocolHash>,
    },
    Ballot {
        source: KeyHash,
        period: i32,
        proposal: ProtocolHash,
        ballot: BallotVote,
    },
    DoublePreendorsementEvidence {
        op1: InlinedPreendorsement,
        op2: InlinedPreendorsement,
    },
    FailingNoop {
        arbitrary: Vec<u8>,
    },
    Preendorsement(Consensus),
    Endorsement(Consensus),
    Reveal {
        manager: Manager,
        public_key: PublicKey,
    },
    Transaction {
        manager: Manager,
        /// Amount in mutez
        amount: N,
        destination: ContractId,
        parameters: Option<Parameters>,
    },
    Origination {
        manager: Manager,
        /// Initial balance in mutez
        balance: N,
        delegate: Option<KeyHash>,
        script: Script,
    },
    Delegation {
        manager: Manager,
        delegate: Option<KeyHash>,
    },
    RegisterGlobalConstant {
        manager: Manager,
        value: Micheline,
    },
    SetDepositsLimit {
        manager: Manager,
        limit: Option<N>,
    },
}

impl Content {
    /// The kind (and therefore the wire tag) of this content.
    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        match self {
            Content::SeedNonceRevelation { .. } => ContentKind::SeedNonceRevelation,
            Content::DoubleEndorsementEvidence { .. } => ContentKind::DoubleEndorsementEvidence,
            Content::DoubleBakingEvidence { .. } => ContentKind::DoubleBakingEvidence,
            Content::ActivateAccount { .. } => ContentKind::ActivateAccount,
            Content::Proposals { .. } => ContentKind::Proposals,
            Content::Ballot { .. } => ContentKind::Ballot,
            Content::DoublePreendorsementEvidence { .. } => {
                ContentKind::DoublePreendorsementEvidence
            }
            Content::FailingNoop { .. } => ContentKind::FailingNoop,
            Content::Preendorsement(_) => ContentKind::Preendorsement,
            Content::Endorsement(_) => ContentKind::Endorsement,
            Content::Reveal { .. } => ContentKind::Reveal,
            Content::Transaction { .. } => ContentKind::Transaction,
            Content::Origination { .. } => ContentKind::Origination,
            Content::Delegation { .. } => ContentKind::Delegation,
            Content::RegisterGlobalConstant { .. } => ContentKind::RegisterGlobalConstant,
            Content::SetDepositsLimit { .. } => ContentKind::SetDepositsLimit,
        }
    }
}

impl Encode for Content {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_one(self.kind().tag())
            + match self {
                Content::SeedNonceRevelation { level, nonce } => {
                    level.write_to(buf) + buf.push_many(*nonce)
                }
                Content::DoubleEndorsementEvidence { op1, op2 } => {
                    write_dynamic(buf, op1) + write_dynamic(buf, op2)
                }
                Content::DoubleBakingEvidence { bh1, bh2 } => {
                    write_dynamic(buf, bh1) + write_dynamic(buf, bh2)
                }
                Content::ActivateAccount { pkh, secret } => {
                    buf.push_many(*pkh) + buf.push_many(*secret)
                }
                Content::Proposals {
                    source,
                    period,
                    proposals,
                } => {
                    let mut payload: Vec<u8> = Vec::new();
                    for proposal in proposals {
                        proposal.write_to_vec(&mut payload);
                    }
                    source.write_to(buf)
                        + period.write_to(buf)
                        + write_dynamic_bytes(buf, &payload)
                }
                Content::Ballot {
                    source,
                    period,
                    proposal,
                    ballot,
                } => {
                    source.write_to(buf)
                        + period.write_to(buf)
                        + proposal.write_to(buf)
                        + ballot.write_to(buf)
                }
                Content::DoublePreendorsementEvidence { op1, op2 } => {
                    write_dynamic(buf, op1) + write_dynamic(buf, op2)
                }
                Content::FailingNoop { arbitrary } => write_dynamic_bytes(buf, arbitrary),
                Content::Preendorsement(consensus) | Content::Endorsement(consensus) => {
                    consensus.write_to(buf)
                }
                Content::Reveal {
                    manager,
                    public_key,
                } => manager.write_to(buf) + public_key.write_to(buf),
                Content::Transaction {
                    manager,
                    amount,
                    destination,
                    parameters,
                } => {
                    manager.write_to(buf)
                        + amount.write_to(buf)
                        + destination.write_to(buf)
                        + parameters.write_to(buf)
                }
                Content::Origination {
                    manager,
                    balance,
                    delegate,
                    script,
                } => {
                    manager.write_to(buf)
                        + balance.write_to(buf)
                        + delegate.write_to(buf)
                        + script.write_to(buf)
                }
                Content::Delegation { manager, delegate } => {
                    manager.write_to(buf) + delegate.write_to(buf)
                }
                Content::RegisterGlobalConstant { manager, value } => {
                    manager.write_to(buf) + write_dynamic(buf, value)
                }
                Content::SetDepositsLimit { manager, limit } => {
                    manager.write_to(buf) + limit.write_to(buf)
                }
            }
    }
}

impl Decode for Content {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let tag = p.consume_byte()?;
        let kind = ContentKind::from_tag(tag).ok_or_else(|| {
            TagError::with_type::<Content>(
                tag,
                Some(ContentKind::ALL.iter().map(|k| k.tag()).collect()),
            )
        })?;
        Self::parse_kind(kind, p)
    }
}

impl Content {
    /// Parses the body of a content whose tag has already been consumed.
    fn parse_kind<P: Parser>(kind: ContentKind, p: &mut P) -> ParseResult<Self> {
        match kind {
            ContentKind::SeedNonceRevelation => Ok(Content::SeedNonceRevelation {
                level: p.take_i32()?,
                nonce: p.take_fixed::<32>()?,
            }),
            ContentKind::DoubleEndorsementEvidence => Ok(Content::DoubleEndorsementEvidence {
                op1: parse_dynamic(p)?,
                op2: parse_dynamic(p)?,
            }),
            ContentKind::DoubleBakingEvidence => Ok(Content::DoubleBakingEvidence {
                bh1: parse_dynamic(p)?,
                bh2: parse_dynamic(p)?,
            }),
            ContentKind::ActivateAccount => Ok(Content::ActivateAccount {
                pkh: p.take_fixed::<20>()?,
                secret: p.take_fixed::<20>()?,
            }),
            ContentKind::Proposals => {
                let source = KeyHash::parse(p)?;
                let period = p.take_i32()?;
                let payload_len = p.take_u32()? as usize;
                p.set_fit(payload_len)?;
                let mut proposals = Vec::new();
                while !p.test_target()? {
                    proposals.push(ProtocolHash::parse(p)?);
                }
                p.enforce_target()?;
                Ok(Content::Proposals {
                    source,
                    period,
                    proposals,
                })
            }
            ContentKind::Ballot => Ok(Content::Ballot {
                source: KeyHash::parse(p)?,
                period: p.take_i32()?,
                proposal: ProtocolHash::parse(p)?,
                ballot: BallotVote::parse(p)?,
            }),
            ContentKind::DoublePreendorsementEvidence => {
                Ok(Content::DoublePreendorsementEvidence {
                    op1: parse_dynamic(p)?,
                    op2: parse_dynamic(p)?,
                })
            }
            ContentKind::FailingNoop => Ok(Content::FailingNoop {
                arbitrary: parse_dynamic_bytes(p)?,
            }),
            ContentKind::Preendorsement => Ok(Content::Preendorsement(Consensus::parse(p)?)),
            ContentKind::Endorsement => Ok(Content::Endorsement(Consensus::parse(p)?)),
            ContentKind::Reveal => Ok(Content::Reveal {
                manager: Manager::parse(p)?,
                public_key: PublicKey::parse(p)?,
            }),
            ContentKind::Transaction => Ok(Content::Transaction {
                manager: Manager::parse(p)?,
                amount: N::parse(p)?,
                destination: ContractId::parse(p)?,
                parameters: Option::<Parameters>::parse(p)?,
            }),
            ContentKind::Origination => Ok(Content::Origination {
                manager: Manager::parse(p)?,
                balance: N::parse(p)?,
                delegate: Option::<KeyHash>::parse(p)?,
                script: Script::parse(p)?,
            }),
            ContentKind::Delegation => Ok(Content::Delegation {
                manager: Manager::parse(p)?,
                delegate: Option::<KeyHash>::parse(p)?,
            }),
            ContentKind::RegisterGlobalConstant => Ok(Content::RegisterGlobalConstant {
                manager: Manager::parse(p)?,
                value: parse_dynamic(p)?,
            }),
            ContentKind::SetDepositsLimit => Ok(Content::SetDepositsLimit {
                manager: Manager::parse(p)?,
                limit: Option::<N>::parse(p)?,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hexstring::HexString;

    fn sample_manager() -> Manager {
        Manager {
            source: KeyHash::Ed25519([0x0f; 20]),
            fee: N::from(1_420u32),
            counter: N::from(2_011_278u32),
            gas_limit: N::from(10_100u32),
            storage_limit: N::from(257u32),
        }
    }

    #[test]
    fn seed_nonce_revelation_vector() {
        let content = Content::SeedNonceRevelation {
            level: 1,
            nonce: crate::hex!("6cdaf9367e551995a670a5c642a9396290f8c9d17e6bc3c1555bfaa910d92214")
                .as_bytes()
                .try_into()
                .unwrap(),
        };
        let encoded = content.encode::<HexString>();
        assert_eq!(
            encoded.to_hex(),
            "01000000016cdaf9367e551995a670a5c642a9396290f8c9d17e6bc3c1555bfaa910d92214"
        );
        assert_eq!(encoded.as_bytes()[0], 0x01, "leading byte is the kind tag");
        assert_eq!(Content::decode(encoded), content);
    }

    #[test]
    fn tag_exclusivity() {
        let mut seen = std::collections::HashSet::new();
        for kind in ContentKind::ALL {
            assert!(seen.insert(kind.tag()), "duplicate tag {}", kind.tag());
            assert_eq!(ContentKind::from_tag(kind.tag()), Some(kind));
        }
        for tag in 0u8..=255 {
            let known = ContentKind::ALL.iter().any(|k| k.tag() == tag);
            assert_eq!(ContentKind::from_tag(tag).is_some(), known);
        }
    }

    #[test]
    fn unknown_tag_is_fatal() {
        // tag 99 is not assigned to any kind
        assert!(
            Content::try_decode::<_, crate::parse::byteparser::ByteParser>(vec![99u8, 0, 0])
                .is_err()
        );
    }

    #[test]
    fn transaction_roundtrip_with_parameters() {
        let content = Content::Transaction {
            manager: sample_manager(),
            amount: N::from(1_000_000u32),
            destination: ContractId::Originated(crate::crypto::ContractHash::new([0x21; 20])),
            parameters: Some(Parameters {
                entrypoint: Entrypoint::named("transfer"),
                value: Micheline::pair(Micheline::int(1), Micheline::string("dest")),
            }),
        };
        let bytes: HexString = content.encode();
        assert_eq!(Content::decode(bytes), content);
    }

    #[test]
    fn transaction_without_parameters_has_zero_flag() {
        let content = Content::Transaction {
            manager: sample_manager(),
            amount: N::from(1u8),
            destination: ContractId::Implicit(KeyHash::Ed25519([0x01; 20])),
            parameters: Option::None,
        };
        let bytes = content.to_bytes();
        assert_eq!(*bytes.last().unwrap(), 0x00, "absent parameters flag");
        assert_eq!(Content::decode(HexString::from(bytes)), content);
    }

    #[test]
    fn manager_kinds_roundtrip() {
        let contents = vec![
            Content::Reveal {
                manager: sample_manager(),
                public_key: PublicKey::Ed25519([0x42; 32]),
            },
            Content::Origination {
                manager: sample_manager(),
                balance: N::from(0u8),
                delegate: Some(KeyHash::Secp256k1([0x03; 20])),
                script: Script {
                    code: Micheline::seq(vec![]),
                    storage: Micheline::unit(),
                },
            },
            Content::Delegation {
                manager: sample_manager(),
                delegate: Option::None,
            },
            Content::RegisterGlobalConstant {
                manager: sample_manager(),
                value: Micheline::int(999),
            },
            Content::SetDepositsLimit {
                manager: sample_manager(),
                limit: Some(N::from(5_000_000u32)),
            },
        ];
        for content in contents {
            let bytes: HexString = content.encode();
            assert_eq!(Content::decode(bytes), content, "kind {:?}", content.kind());
        }
    }

    #[test]
    fn voting_kinds_roundtrip() {
        let proposals = Content::Proposals {
            source: KeyHash::Ed25519([0x09; 20]),
            period: 41,
            proposals: vec![ProtocolHash::new([0x0a; 32]), ProtocolHash::new([0x0b; 32])],
        };
        let ballot = Content::Ballot {
            source: KeyHash::P256([0x0c; 20]),
            period: 41,
            proposal: ProtocolHash::new([0x0d; 32]),
            ballot: BallotVote::Pass,
        };
        for content in [proposals, ballot] {
            let bytes: HexString = content.encode();
            assert_eq!(Content::decode(bytes), content);
        }
    }

    #[test]
    fn consensus_kinds_roundtrip() {
        let consensus = Consensus {
            slot: 7,
            level: 100_000,
            round: 1,
            block_payload_hash: BlockPayloadHash::new([0x1f; 32]),
        };
        for content in [
            Content::Endorsement(consensus),
            Content::Preendorsement(consensus),
        ] {
            let bytes: HexString = content.encode();
            assert_eq!(bytes.as_bytes()[0], content.kind().tag());
            assert_eq!(Content::decode(bytes), content);
        }
    }

    #[test]
    fn failing_noop_roundtrip() {
        let content = Content::FailingNoop {
            arbitrary: vec![0xde, 0xad, 0xbe, 0xef],
        };
        let bytes: HexString = content.encode();
        assert_eq!(bytes.to_hex(), "1100000004deadbeef");
        assert_eq!(Content::decode(bytes), content);
    }
}

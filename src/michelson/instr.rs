//! The instruction hierarchy of the contract language

use super::{seq_of_instructions, Data, IntoMicheline, Type};
use crate::micheline::{Micheline, Prim};

/// An instruction: one opcode plus the node's own annotations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub node: InstrNode,
    pub annots: Vec<String>,
}

impl Instruction {
    /// An instruction with no annotations.
    #[must_use]
    pub const fn new(node: InstrNode) -> Self {
        Self {
            node,
            annots: Vec::new(),
        }
    }

    /// Appends a raw annotation string to this instruction.
    #[must_use]
    pub fn annot(mut self, raw: &str) -> Self {
        self.annots.push(raw.to_owned());
        self
    }
}

impl From<InstrNode> for Instruction {
    fn from(node: InstrNode) -> Self {
        Self::new(node)
    }
}

/// The closed set of opcodes.
///
/// Opcodes that take an optional stack-depth argument model it as an
/// `Option`; `DIG`/`DUG` require theirs. Branching opcodes carry their
/// nested instruction sequences directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstrNode {
    // stack and arithmetic
    Abs,
    Add,
    And,
    Compare,
    Ediv,
    Eq,
    Ge,
    Gt,
    Int,
    IsNat,
    Le,
    Lsl,
    Lsr,
    Lt,
    Mul,
    Neg,
    Neq,
    Not,
    Or,
    Sub,
    SubMutez,
    Swap,
    Xor,
    Drop(Option<u16>),
    Dup(Option<u16>),
    Dig(u16),
    Dug(u16),
    // pairs, options, unions
    Car,
    Cdr,
    Pair(Option<u16>),
    Unpair(Option<u16>),
    Left(Type),
    Right(Type),
    None(Type),
    Some,
    Unit,
    // collections
    Concat,
    Cons,
    EmptyBigMap(Type, Type),
    EmptyMap(Type, Type),
    EmptySet(Type),
    Get(Option<u16>),
    GetAndUpdate,
    Mem,
    Nil(Type),
    Size,
    Slice,
    Update(Option<u16>),
    // control flow
    Apply,
    Dip(Option<u16>, Vec<Instruction>),
    Exec,
    Failwith,
    If(Vec<Instruction>, Vec<Instruction>),
    IfCons(Vec<Instruction>, Vec<Instruction>),
    IfLeft(Vec<Instruction>, Vec<Instruction>),
    IfNone(Vec<Instruction>, Vec<Instruction>),
    Iter(Vec<Instruction>),
    Lambda(Type, Type, Vec<Instruction>),
    Loop(Vec<Instruction>),
    LoopLeft(Vec<Instruction>),
    Map(Vec<Instruction>),
    Never,
    Push(Type, Data),
    // domain-specific
    Address,
    Amount,
    Balance,
    Blake2b,
    ChainId,
    CheckSignature,
    Contract(Type),
    CreateContract {
        parameter: Type,
        storage: Type,
        code: Vec<Instruction>,
    },
    HashKey,
    ImplicitAccount,
    JoinTickets,
    Keccak,
    Level,
    Now,
    Pack,
    PairingCheck,
    ReadTicket,
    SaplingEmptyState(u64),
    SaplingVerifyUpdate,
    SelfAddress,
    SelfRef,
    Sender,
    SetDelegate,
    Sha256,
    Sha3,
    Sha512,
    Source,
    SplitTicket,
    Ticket,
    TotalVotingPower,
    TransferTokens,
    Unpack(Type),
    VotingPower,
}

fn opt_depth(prefix: Option<u16>, rest: Vec<Micheline>) -> Vec<Micheline> {
    match prefix {
        Option::Some(n) => {
            let mut args = vec![Micheline::int(n)];
            args.extend(rest);
            args
        }
        Option::None => rest,
    }
}

impl IntoMicheline for Instruction {
    fn into_micheline(self) -> Micheline {
        let annots = self.annots;
        let (prim, args): (Prim, Vec<Micheline>) = match self.node {
            InstrNode::Abs => (Prim::ABS, vec![]),
            InstrNode::Add => (Prim::ADD, vec![]),
            InstrNode::And => (Prim::AND, vec![]),
            InstrNode::Compare => (Prim::COMPARE, vec![]),
            InstrNode::Ediv => (Prim::EDIV, vec![]),
            InstrNode::Eq => (Prim::EQ, vec![]),
            InstrNode::Ge => (Prim::GE, vec![]),
            InstrNode::Gt => (Prim::GT, vec![]),
            InstrNode::Int => (Prim::INT, vec![]),
            InstrNode::IsNat => (Prim::ISNAT, vec![]),
            InstrNode::Le => (Prim::LE, vec![]),
            InstrNode::Lsl => (Prim::LSL, vec![]),
            InstrNode::Lsr => (Prim::LSR, vec![]),
            InstrNode::Lt => (Prim::LT, vec![]),
            InstrNode::Mul => (Prim::MUL, vec![]),
            InstrNode::Neg => (Prim::NEG, vec![]),
            InstrNode::Neq => (Prim::NEQ, vec![]),
            InstrNode::Not => (Prim::NOT, vec![]),
            InstrNode::Or => (Prim::OR, vec![]),
            InstrNode::Sub => (Prim::SUB, vec![]),
            InstrNode::SubMutez => (Prim::SUB_MUTEZ, vec![]),
            InstrNode::Swap => (Prim::SWAP, vec![]),
            InstrNode::Xor => (Prim::XOR, vec![]),
            InstrNode::Drop(n) => (Prim::DROP, opt_depth(n, vec![])),
            InstrNode::Dup(n) => (Prim::DUP, opt_depth(n, vec![])),
            InstrNode::Dig(n) => (Prim::DIG, vec![Micheline::int(n)]),
            InstrNode::Dug(n) => (Prim::DUG, vec![Micheline::int(n)]),
            InstrNode::Car => (Prim::CAR, vec![]),
            InstrNode::Cdr => (Prim::CDR, vec![]),
            InstrNode::Pair(n) => (Prim::PAIR, opt_depth(n, vec![])),
            InstrNode::Unpair(n) => (Prim::UNPAIR, opt_depth(n, vec![])),
            InstrNode::Left(ty) => (Prim::LEFT, vec![ty.into_micheline()]),
            InstrNode::Right(ty) => (Prim::RIGHT, vec![ty.into_micheline()]),
            InstrNode::None(ty) => (Prim::NONE, vec![ty.into_micheline()]),
            InstrNode::Some => (Prim::SOME, vec![]),
            InstrNode::Unit => (Prim::UNIT, vec![]),
            InstrNode::Concat => (Prim::CONCAT, vec![]),
            InstrNode::Cons => (Prim::CONS, vec![]),
            InstrNode::EmptyBigMap(k, v) => (
                Prim::EMPTY_BIG_MAP,
                vec![k.into_micheline(), v.into_micheline()],
            ),
            InstrNode::EmptyMap(k, v) => (
                Prim::EMPTY_MAP,
                vec![k.into_micheline(), v.into_micheline()],
            ),
            InstrNode::EmptySet(ty) => (Prim::EMPTY_SET, vec![ty.into_micheline()]),
            InstrNode::Get(n) => (Prim::GET, opt_depth(n, vec![])),
            InstrNode::GetAndUpdate => (Prim::GET_AND_UPDATE, vec![]),
            InstrNode::Mem => (Prim::MEM, vec![]),
            InstrNode::Nil(ty) => (Prim::NIL, vec![ty.into_micheline()]),
            InstrNode::Size => (Prim::SIZE, vec![]),
            InstrNode::Slice => (Prim::SLICE, vec![]),
            InstrNode::Update(n) => (Prim::UPDATE, opt_depth(n, vec![])),
            InstrNode::Apply => (Prim::APPLY, vec![]),
            InstrNode::Dip(n, code) => {
                (Prim::DIP, opt_depth(n, vec![seq_of_instructions(code)]))
            }
            InstrNode::Exec => (Prim::EXEC, vec![]),
            InstrNode::Failwith => (Prim::FAILWITH, vec![]),
            InstrNode::If(bt, bf) => (
                Prim::IF,
                vec![seq_of_instructions(bt), seq_of_instructions(bf)],
            ),
            InstrNode::IfCons(bt, bf) => (
                Prim::IF_CONS,
                vec![seq_of_instructions(bt), seq_of_instructions(bf)],
            ),
            InstrNode::IfLeft(bt, bf) => (
                Prim::IF_LEFT,
                vec![seq_of_instructions(bt), seq_of_instructions(bf)],
            ),
            InstrNode::IfNone(bt, bf) => (
                Prim::IF_NONE,
                vec![seq_of_instructions(bt), seq_of_instructions(bf)],
            ),
            InstrNode::Iter(code) => (Prim::ITER, vec![seq_of_instructions(code)]),
            InstrNode::Lambda(dom, codom, code) => (
                Prim::LAMBDA,
                vec![
                    dom.into_micheline(),
                    codom.into_micheline(),
                    seq_of_instructions(code),
                ],
            ),
            InstrNode::Loop(code) => (Prim::LOOP, vec![seq_of_instructions(code)]),
            InstrNode::LoopLeft(code) => (Prim::LOOP_LEFT, vec![seq_of_instructions(code)]),
            InstrNode::Map(code) => (Prim::MAP, vec![seq_of_instructions(code)]),
            InstrNode::Never => (Prim::NEVER, vec![]),
            InstrNode::Push(ty, value) => (
                Prim::PUSH,
                vec![ty.into_micheline(), value.into_micheline()],
            ),
            InstrNode::Address => (Prim::ADDRESS, vec![]),
            InstrNode::Amount => (Prim::AMOUNT, vec![]),
            InstrNode::Balance => (Prim::BALANCE, vec![]),
            InstrNode::Blake2b => (Prim::BLAKE2B, vec![]),
            InstrNode::ChainId => (Prim::CHAIN_ID, vec![]),
            InstrNode::CheckSignature => (Prim::CHECK_SIGNATURE, vec![]),
            InstrNode::Contract(ty) => (Prim::CONTRACT, vec![ty.into_micheline()]),
            InstrNode::CreateContract {
                parameter,
                storage,
                code,
            } => (
                Prim::CREATE_CONTRACT,
                vec![Micheline::Seq(vec![
                    Micheline::app(Prim::parameter, vec![parameter.into_micheline()]),
                    Micheline::app(Prim::storage, vec![storage.into_micheline()]),
                    Micheline::app(Prim::code, vec![seq_of_instructions(code)]),
                ])],
            ),
            InstrNode::HashKey => (Prim::HASH_KEY, vec![]),
            InstrNode::ImplicitAccount => (Prim::IMPLICIT_ACCOUNT, vec![]),
            InstrNode::JoinTickets => (Prim::JOIN_TICKETS, vec![]),
            InstrNode::Keccak => (Prim::KECCAK, vec![]),
            InstrNode::Level => (Prim::LEVEL, vec![]),
            InstrNode::Now => (Prim::NOW, vec![]),
            InstrNode::Pack => (Prim::PACK, vec![]),
            InstrNode::PairingCheck => (Prim::PAIRING_CHECK, vec![]),
            InstrNode::ReadTicket => (Prim::READ_TICKET, vec![]),
            InstrNode::SaplingEmptyState(memo) => {
                (Prim::SAPLING_EMPTY_STATE, vec![Micheline::int(memo)])
            }
            InstrNode::SaplingVerifyUpdate => (Prim::SAPLING_VERIFY_UPDATE, vec![]),
            InstrNode::SelfAddress => (Prim::SELF_ADDRESS, vec![]),
            InstrNode::SelfRef => (Prim::SELF, vec![]),
            InstrNode::Sender => (Prim::SENDER, vec![]),
            InstrNode::SetDelegate => (Prim::SET_DELEGATE, vec![]),
            InstrNode::Sha256 => (Prim::SHA256, vec![]),
            InstrNode::Sha3 => (Prim::SHA3, vec![]),
            InstrNode::Sha512 => (Prim::SHA512, vec![]),
            InstrNode::Source => (Prim::SOURCE, vec![]),
            InstrNode::SplitTicket => (Prim::SPLIT_TICKET, vec![]),
            InstrNode::Ticket => (Prim::TICKET, vec![]),
            InstrNode::TotalVotingPower => (Prim::TOTAL_VOTING_POWER, vec![]),
            InstrNode::TransferTokens => (Prim::TRANSFER_TOKENS, vec![]),
            InstrNode::Unpack(ty) => (Prim::UNPACK, vec![ty.into_micheline()]),
            InstrNode::VotingPower => (Prim::VOTING_POWER, vec![]),
        };
        Micheline::app_annot(prim, args, annots)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::michelson::TypeNode;

    #[test]
    fn branch_arguments_are_sequences() {
        let instr = Instruction::new(InstrNode::IfNone(
            vec![Instruction::new(InstrNode::Unit)],
            vec![Instruction::new(InstrNode::Failwith)],
        ));
        let m = instr.into_micheline();
        assert!(m.is_prim(Prim::IF_NONE));
        let args = m.args_of().unwrap();
        assert_eq!(args.len(), 2);
        assert!(args[0].as_seq().is_some());
        assert!(args[1].as_seq().is_some());
    }

    #[test]
    fn optional_depth_prefixes_argument_list() {
        let dip = Instruction::new(InstrNode::Dip(
            Option::Some(2),
            vec![Instruction::new(InstrNode::Swap)],
        ));
        let m = dip.into_micheline();
        let args = m.args_of().unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], Micheline::int(2));
        assert!(args[1].as_seq().is_some());

        let bare = Instruction::new(InstrNode::Dip(Option::None, vec![]));
        assert_eq!(bare.into_micheline().args_of().unwrap().len(), 1);
    }

    #[test]
    fn create_contract_wraps_script_sections() {
        let instr = Instruction::new(InstrNode::CreateContract {
            parameter: Type::new(TypeNode::Unit),
            storage: Type::new(TypeNode::Nat),
            code: vec![],
        });
        let m = instr.into_micheline();
        let script = &m.args_of().unwrap()[0];
        let sections = script.as_seq().unwrap();
        assert!(sections[0].is_prim(Prim::parameter));
        assert!(sections[1].is_prim(Prim::storage));
        assert!(sections[2].is_prim(Prim::code));
    }
}

//! Convenience re-exports of the types most callers touch

pub use crate::conv::{Decode, DecodeError, DecodeResult, Encode};
pub use crate::crypto::{
    Address, BlockHash, ChainId, ContractHash, ContractId, KeyHash, PublicKey, Signature,
};
pub use crate::entrypoint::{resolve, Entrypoint, EntrypointParameter, ParamMeta, ResolveError};
pub use crate::hexstring::HexString;
pub use crate::micheline::{Micheline, Prim};
pub use crate::michelson::{Data, InstrNode, Instruction, IntoMicheline, Type, TypeNode};
pub use crate::operation::{Content, ContentKind, Manager, Operation, Parameters, Script};
pub use crate::pack::{pack, unpack, PackError};
pub use crate::parse::{ParseResult, Parser, TryIntoParser};
pub use crate::zarith::{n::N, z::Z};

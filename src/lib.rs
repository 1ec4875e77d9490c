//! Data-plane codec for a Tezos client
//!
//! # Overview
//!
//! This library implements the value- and operation-level transcoding a
//! Tezos client performs between three representations of on-chain data:
//! the self-describing [Micheline](micheline) tree that contract code,
//! parameters, and storage travel as; the byte-exact binary encodings
//! broadcast to peers; and the ergonomic, type-directed values a calling
//! application supplies.
//!
//! Three subsystems form the core:
//!
//! * [`pack`] — the schema-guided transformation between the "readable"
//!   and "optimized" wire encodings of a typed value, wrapped in the
//!   fixed `0x05` pack tag;
//! * [`operation`] — tag-dispatch binary forging and unforging of the
//!   operation envelope and its sixteen content kinds;
//! * [`entrypoint`] — resolution of a caller-supplied, possibly
//!   partially-named parameter tree into the single canonical value a
//!   contract entrypoint expects.
//!
//! Everything else is the plumbing those cores stand on, in the manner of
//! the `data-encoding`-derived runtimes this crate grew out of: the
//! [`Encode`](conv::Encode)/[`Decode`](conv::Decode) traits over
//! [`Target`](conv::target::Target) and [`Parser`](parse::Parser)
//! abstractions with context-window delimiting, self-terminating
//! [zarith](zarith) integers, the [base58check](base58) prefix table, and
//! the typed [hashes, keys, and addresses](crypto) built on it.
//!
//! All transformations are pure, synchronous functions over immutable
//! inputs; identical input always yields the identical value or the
//! identical typed error. The cryptographic backend and the RPC transport
//! are consumed through the seams in [`client`], never implemented here.

pub mod base58;
pub mod client;
pub mod conv;
pub mod dynamic;
pub mod entrypoint;
pub mod error;
pub mod hexstring;
mod internal;
pub mod micheline;
pub mod michelson;
pub mod operation;
pub mod pack;
pub mod parse;
pub mod prelude;
pub mod timestamp;
pub mod zarith;

pub mod crypto;

pub use crate::conv::{Decode, DecodeError, DecodeResult, Encode};
pub use crate::hexstring::HexString;
pub use crate::micheline::{Micheline, Prim};
pub use crate::operation::{Content, ContentKind, Operation};
pub use crate::parse::{
    byteparser::ByteParser, error::ParseError, ParseResult, Parser, TryIntoParser,
};
pub use crate::zarith::{n::N, z::Z};

//! The data-literal hierarchy of the contract language

use super::{seq_of_instructions, Instruction, IntoMicheline};
use crate::micheline::{Micheline, Prim};
use num_bigint::BigInt;

/// A typed data literal.
///
/// Integer, string, and byte literals project to the corresponding
/// Micheline literals, which cannot carry annotations; constructor-shaped
/// data (`Pair`, `Left`, …) projects to annotation-free primitive
/// applications, matching what the protocol accepts in operation
/// parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Data {
    Int(BigInt),
    String(String),
    Bytes(Vec<u8>),
    Unit,
    True,
    False,
    /// `Pair` with two or more constituents
    Pair(Vec<Data>),
    Left(Box<Data>),
    Right(Box<Data>),
    Some(Box<Data>),
    None,
    /// A sequence of data values (`list`/`set` contents)
    Sequence(Vec<Data>),
    /// A map literal: ordered `Elt` bindings
    Map(Vec<(Data, Data)>),
    /// A lambda value: an embedded instruction sequence
    Lambda(Vec<Instruction>),
}

impl IntoMicheline for Data {
    fn into_micheline(self) -> Micheline {
        match self {
            Data::Int(i) => Micheline::int(i),
            Data::String(s) => Micheline::String(s),
            Data::Bytes(b) => Micheline::Bytes(b),
            Data::Unit => Micheline::prim(Prim::Unit),
            Data::True => Micheline::prim(Prim::True),
            Data::False => Micheline::prim(Prim::False),
            Data::Pair(items) => Micheline::app(
                Prim::Pair,
                items.into_iter().map(IntoMicheline::into_micheline).collect(),
            ),
            Data::Left(inner) => Micheline::left(inner.into_micheline()),
            Data::Right(inner) => Micheline::right(inner.into_micheline()),
            Data::Some(inner) => Micheline::some(inner.into_micheline()),
            Data::None => Micheline::none(),
            Data::Sequence(items) => Micheline::Seq(
                items.into_iter().map(IntoMicheline::into_micheline).collect(),
            ),
            Data::Map(entries) => Micheline::Seq(
                entries
                    .into_iter()
                    .map(|(k, v)| Micheline::elt(k.into_micheline(), v.into_micheline()))
                    .collect(),
            ),
            Data::Lambda(code) => seq_of_instructions(code),
        }
    }
}

impl From<i64> for Data {
    fn from(i: i64) -> Self {
        Data::Int(i.into())
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Data::String(s.to_owned())
    }
}

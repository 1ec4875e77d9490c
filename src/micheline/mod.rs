//! The untyped expression tree ("Micheline")
//!
//! Micheline is the self-describing tree representation in which all
//! contract code, parameters, and storage travel, both as JSON over RPC and
//! in the binary form embedded in operations. A node is one of five shapes:
//! an arbitrary-precision integer literal, a string literal, a raw byte
//! literal, a primitive application (a name from the protocol's primitive
//! table, an ordered argument list, and an ordered list of annotation
//! strings), or a sequence.
//!
//! Values of this type are immutable once built and compare structurally.
//! The binary codec lives in [`codec`]; the typed hierarchies in
//! [`crate::michelson`] project into this type.

pub mod codec;
pub mod prim;

#[cfg(feature = "serde_impls")]
pub mod json;

pub use prim::Prim;

use crate::zarith::z::Z;
use num_bigint::BigInt;

/// A single node of the untyped expression tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Micheline {
    /// Arbitrary-precision integer literal
    Int(Z),
    /// String literal
    String(String),
    /// Raw byte-sequence literal
    Bytes(Vec<u8>),
    /// Application of a protocol primitive to ordered arguments, with
    /// ordered annotations
    App {
        prim: Prim,
        args: Vec<Micheline>,
        annots: Vec<String>,
    },
    /// Ordered sequence of nodes
    Seq(Vec<Micheline>),
}

impl Micheline {
    /// Integer literal constructor.
    pub fn int(val: impl Into<BigInt>) -> Self {
        Self::Int(Z::new(val.into()))
    }

    /// String literal constructor.
    pub fn string(val: impl Into<String>) -> Self {
        Self::String(val.into())
    }

    /// Byte literal constructor.
    pub fn bytes(val: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(val.into())
    }

    /// Bare primitive application with neither arguments nor annotations.
    pub const fn prim(prim: Prim) -> Self {
        Self::App {
            prim,
            args: Vec::new(),
            annots: Vec::new(),
        }
    }

    /// Primitive application with arguments.
    pub fn app(prim: Prim, args: Vec<Micheline>) -> Self {
        Self::App {
            prim,
            args,
            annots: Vec::new(),
        }
    }

    /// Primitive application with arguments and annotations.
    pub fn app_annot(prim: Prim, args: Vec<Micheline>, annots: Vec<String>) -> Self {
        Self::App { prim, args, annots }
    }

    /// Sequence constructor.
    pub fn seq(items: Vec<Micheline>) -> Self {
        Self::Seq(items)
    }

    /// `Pair a b`
    pub fn pair(left: Micheline, right: Micheline) -> Self {
        Self::app(Prim::Pair, vec![left, right])
    }

    /// `Some a`
    pub fn some(arg: Micheline) -> Self {
        Self::app(Prim::Some, vec![arg])
    }

    /// `None`
    pub const fn none() -> Self {
        Self::prim(Prim::None)
    }

    /// `Left a`
    pub fn left(arg: Micheline) -> Self {
        Self::app(Prim::Left, vec![arg])
    }

    /// `Right a`
    pub fn right(arg: Micheline) -> Self {
        Self::app(Prim::Right, vec![arg])
    }

    /// `Elt k v`
    pub fn elt(key: Micheline, value: Micheline) -> Self {
        Self::app(Prim::Elt, vec![key, value])
    }

    /// `Unit`
    pub const fn unit() -> Self {
        Self::prim(Prim::Unit)
    }

    /// The primitive name at this node, when it is an application.
    #[must_use]
    pub fn prim_of(&self) -> Option<Prim> {
        match self {
            Micheline::App { prim, .. } => Some(*prim),
            _ => None,
        }
    }

    /// The argument list at this node, when it is an application.
    #[must_use]
    pub fn args_of(&self) -> Option<&[Micheline]> {
        match self {
            Micheline::App { args, .. } => Some(args.as_slice()),
            _ => None,
        }
    }

    /// The annotation list at this node, when it is an application.
    #[must_use]
    pub fn annots_of(&self) -> Option<&[String]> {
        match self {
            Micheline::App { annots, .. } => Some(annots.as_slice()),
            _ => None,
        }
    }

    /// The integer payload of an `Int` literal.
    #[must_use]
    pub fn as_int(&self) -> Option<&Z> {
        match self {
            Micheline::Int(z) => Some(z),
            _ => None,
        }
    }

    /// The string payload of a `String` literal.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Micheline::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The byte payload of a `Bytes` literal.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Micheline::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// The item list of a `Seq` node.
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Micheline]> {
        match self {
            Micheline::Seq(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Returns `true` when this node is an application of `prim`.
    #[must_use]
    pub fn is_prim(&self, prim: Prim) -> bool {
        self.prim_of() == Some(prim)
    }

    /// The field annotation (`%name`) at this node, if one is present.
    #[must_use]
    pub fn field_annot(&self) -> Option<&str> {
        self.annots_of()?
            .iter()
            .find_map(|a| a.strip_prefix('%'))
            .filter(|a| !a.is_empty())
    }
}

impl From<Z> for Micheline {
    fn from(z: Z) -> Self {
        Self::Int(z)
    }
}

impl From<BigInt> for Micheline {
    fn from(i: BigInt) -> Self {
        Self::Int(Z::new(i))
    }
}

impl From<i64> for Micheline {
    fn from(i: i64) -> Self {
        Self::int(i)
    }
}

impl From<&str> for Micheline {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn structural_equality() {
        let a = Micheline::pair(Micheline::int(1), Micheline::string("x"));
        let b = Micheline::pair(Micheline::int(1), Micheline::string("x"));
        assert_eq!(a, b);
        assert_ne!(a, Micheline::pair(Micheline::int(2), Micheline::string("x")));
    }

    #[test]
    fn field_annot_extraction() {
        let node = Micheline::app_annot(
            Prim::nat,
            vec![],
            vec![":alias".to_owned(), "%counter".to_owned()],
        );
        assert_eq!(node.field_annot(), Some("counter"));
        assert_eq!(Micheline::prim(Prim::nat).field_annot(), None);
    }
}

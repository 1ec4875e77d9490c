//! The type hierarchy of the contract language

use super::IntoMicheline;
use crate::micheline::{Micheline, Prim};

/// A type expression: one constructor plus the node's own annotations.
///
/// Field annotations (`%name`) on constituent types are what entrypoint
/// resolution keys on, so annotations are first-class here rather than an
/// afterthought of rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Type {
    pub node: TypeNode,
    pub annots: Vec<String>,
}

impl Type {
    /// A type with no annotations.
    #[must_use]
    pub const fn new(node: TypeNode) -> Self {
        Self {
            node,
            annots: Vec::new(),
        }
    }

    /// Appends a field annotation (`%name`) to this type.
    #[must_use]
    pub fn field(mut self, name: &str) -> Self {
        self.annots.push(format!("%{name}"));
        self
    }

    /// Appends a raw annotation string to this type.
    #[must_use]
    pub fn annot(mut self, raw: &str) -> Self {
        self.annots.push(raw.to_owned());
        self
    }
}

impl From<TypeNode> for Type {
    fn from(node: TypeNode) -> Self {
        Self::new(node)
    }
}

/// The closed set of type constructors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeNode {
    Unit,
    Never,
    Bool,
    Int,
    Nat,
    String,
    ChainId,
    Bytes,
    Mutez,
    KeyHash,
    Key,
    Signature,
    Timestamp,
    Address,
    Operation,
    Bls12_381G1,
    Bls12_381G2,
    Bls12_381Fr,
    Chest,
    ChestKey,
    /// `sapling_state <memo-size>`
    SaplingState(u64),
    /// `sapling_transaction <memo-size>`
    SaplingTransaction(u64),
    Option(Box<Type>),
    List(Box<Type>),
    Set(Box<Type>),
    Contract(Box<Type>),
    Ticket(Box<Type>),
    /// `pair` with two or more constituents
    Pair(Vec<Type>),
    Or(Box<Type>, Box<Type>),
    Lambda(Box<Type>, Box<Type>),
    Map(Box<Type>, Box<Type>),
    BigMap(Box<Type>, Box<Type>),
}

impl IntoMicheline for Type {
    fn into_micheline(self) -> Micheline {
        let annots = self.annots;
        let (prim, args): (Prim, Vec<Micheline>) = match self.node {
            TypeNode::Unit => (Prim::unit, vec![]),
            TypeNode::Never => (Prim::never, vec![]),
            TypeNode::Bool => (Prim::bool, vec![]),
            TypeNode::Int => (Prim::int, vec![]),
            TypeNode::Nat => (Prim::nat, vec![]),
            TypeNode::String => (Prim::string, vec![]),
            TypeNode::ChainId => (Prim::chain_id, vec![]),
            TypeNode::Bytes => (Prim::bytes, vec![]),
            TypeNode::Mutez => (Prim::mutez, vec![]),
            TypeNode::KeyHash => (Prim::key_hash, vec![]),
            TypeNode::Key => (Prim::key, vec![]),
            TypeNode::Signature => (Prim::signature, vec![]),
            TypeNode::Timestamp => (Prim::timestamp, vec![]),
            TypeNode::Address => (Prim::address, vec![]),
            TypeNode::Operation => (Prim::operation, vec![]),
            TypeNode::Bls12_381G1 => (Prim::bls12_381_g1, vec![]),
            TypeNode::Bls12_381G2 => (Prim::bls12_381_g2, vec![]),
            TypeNode::Bls12_381Fr => (Prim::bls12_381_fr, vec![]),
            TypeNode::Chest => (Prim::chest, vec![]),
            TypeNode::ChestKey => (Prim::chest_key, vec![]),
            TypeNode::SaplingState(memo) => (Prim::sapling_state, vec![Micheline::int(memo)]),
            TypeNode::SaplingTransaction(memo) => {
                (Prim::sapling_transaction, vec![Micheline::int(memo)])
            }
            TypeNode::Option(inner) => (Prim::option, vec![inner.into_micheline()]),
            TypeNode::List(elem) => (Prim::list, vec![elem.into_micheline()]),
            TypeNode::Set(elem) => (Prim::set, vec![elem.into_micheline()]),
            TypeNode::Contract(param) => (Prim::contract, vec![param.into_micheline()]),
            TypeNode::Ticket(payload) => (Prim::ticket, vec![payload.into_micheline()]),
            TypeNode::Pair(items) => (
                Prim::pair,
                items.into_iter().map(IntoMicheline::into_micheline).collect(),
            ),
            TypeNode::Or(lhs, rhs) => (
                Prim::or,
                vec![lhs.into_micheline(), rhs.into_micheline()],
            ),
            TypeNode::Lambda(dom, codom) => (
                Prim::lambda,
                vec![dom.into_micheline(), codom.into_micheline()],
            ),
            TypeNode::Map(key, value) => (
                Prim::map,
                vec![key.into_micheline(), value.into_micheline()],
            ),
            TypeNode::BigMap(key, value) => (
                Prim::big_map,
                vec![key.into_micheline(), value.into_micheline()],
            ),
        };
        Micheline::app_annot(prim, args, annots)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn leaf_projection_keeps_annotations() {
        let ty = Type::new(TypeNode::Nat).field("counter");
        let m = ty.into_micheline();
        assert!(m.is_prim(Prim::nat));
        assert_eq!(m.field_annot(), Some("counter"));
    }

    #[test]
    fn nested_projection() {
        let ty = Type::new(TypeNode::Pair(vec![
            Type::new(TypeNode::Option(Box::new(
                Type::new(TypeNode::Address).field("address"),
            ))),
            Type::new(TypeNode::Map(
                Box::new(Type::new(TypeNode::String)),
                Box::new(Type::new(TypeNode::Nat)),
            )),
        ]));
        let m = ty.into_micheline();
        assert!(m.is_prim(Prim::pair));
        let args = m.args_of().unwrap();
        assert!(args[0].is_prim(Prim::option));
        assert_eq!(args[0].args_of().unwrap()[0].field_annot(), Some("address"));
        assert!(args[1].is_prim(Prim::map));
    }

    #[test]
    fn sapling_memo_size_is_an_argument() {
        let m = Type::new(TypeNode::SaplingState(8)).into_micheline();
        assert_eq!(m.args_of().unwrap()[0], Micheline::int(8));
    }
}

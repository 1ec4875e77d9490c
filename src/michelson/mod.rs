//! Typed views of the contract language
//!
//! The untyped tree in [`crate::micheline`] is what travels on the wire;
//! this module models the three typed hierarchies it is a projection of:
//! data literals ([`data::Data`]), types ([`types::Type`]), and
//! instructions ([`instr::Instruction`]). Each hierarchy is a closed union
//! whose projection into the untyped tree is a total, exhaustively-matched
//! function, so adding a constructor without extending the projection is a
//! compile error.
//!
//! Only the typed-to-untyped direction is provided; values arriving from
//! the chain stay untyped until a schema-directed transformation (packing,
//! entrypoint resolution) gives them meaning.

pub mod data;
pub mod instr;
pub mod types;

pub use data::Data;
pub use instr::{Instruction, InstrNode};
pub use types::{Type, TypeNode};

use crate::micheline::Micheline;

/// Total projection of a typed node into the untyped tree.
pub trait IntoMicheline {
    fn into_micheline(self) -> Micheline;
}

pub(crate) fn seq_of_instructions(code: Vec<Instruction>) -> Micheline {
    Micheline::Seq(code.into_iter().map(IntoMicheline::into_micheline).collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::micheline::Prim;

    #[test]
    fn projection_composes() {
        // PUSH nat 5 ; DROP
        let code = vec![
            Instruction::new(InstrNode::Push(
                Type::new(TypeNode::Nat),
                Data::Int(5.into()),
            )),
            Instruction::new(InstrNode::Drop(Option::None)),
        ];
        let projected = seq_of_instructions(code);
        let items = projected.as_seq().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_prim(Prim::PUSH));
        assert_eq!(items[0].args_of().unwrap().len(), 2);
        assert!(items[1].is_prim(Prim::DROP));
        assert!(items[1].args_of().unwrap().is_empty());
    }
}

//! Entrypoints: named, typed endpoints of a contract's parameter type
//!
//! A contract's parameter type is a tree of `or` nodes whose
//! field-annotated branches are addressable by name, akin to the branches
//! of a tagged union. This module models the entrypoint *name* (with its
//! compact wire encoding), locates the type fragment an entrypoint denotes
//! inside a parameter type, and — in [`meta`] and [`resolve`] — turns a
//! caller-supplied, possibly partially-named parameter tree into the one
//! canonical value an entrypoint expects.

pub mod meta;
pub mod resolve;

pub use meta::ParamMeta;
pub use resolve::{resolve, EntrypointParameter, ResolveError};

use crate::conv::target::Target;
use crate::conv::{Decode, Encode};
use crate::micheline::{Micheline, Prim};
use crate::parse::{ParseResult, Parser};

/// An entrypoint name
///
/// Five names have reserved one-byte wire tags; any other name is encoded
/// as `0xff` followed by a one-byte length and the UTF-8 name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Entrypoint {
    Default,
    Root,
    Do,
    SetDelegate,
    RemoveDelegate,
    Named(String),
}

impl Entrypoint {
    const TAGS: [u8; 6] = [0, 1, 2, 3, 4, 0xff];

    /// Canonicalizing constructor: reserved names map to their dedicated
    /// constructors, everything else becomes [`Entrypoint::Named`].
    #[must_use]
    pub fn named(name: &str) -> Self {
        match name {
            "default" | "" => Entrypoint::Default,
            "root" => Entrypoint::Root,
            "do" => Entrypoint::Do,
            "set_delegate" => Entrypoint::SetDelegate,
            "remove_delegate" => Entrypoint::RemoveDelegate,
            other => Entrypoint::Named(other.to_owned()),
        }
    }

    /// The textual name of the entrypoint.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Entrypoint::Default => "default",
            Entrypoint::Root => "root",
            Entrypoint::Do => "do",
            Entrypoint::SetDelegate => "set_delegate",
            Entrypoint::RemoveDelegate => "remove_delegate",
            Entrypoint::Named(name) => name.as_str(),
        }
    }
}

impl Default for Entrypoint {
    fn default() -> Self {
        Entrypoint::Default
    }
}

impl std::fmt::Display for Entrypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Encode for Entrypoint {
    /// # Panics
    ///
    /// Panics when a named entrypoint exceeds the 255-byte limit of its
    /// one-byte length prefix; the protocol caps entrypoint names well
    /// below that.
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        match self {
            Entrypoint::Default => buf.push_one(0),
            Entrypoint::Root => buf.push_one(1),
            Entrypoint::Do => buf.push_one(2),
            Entrypoint::SetDelegate => buf.push_one(3),
            Entrypoint::RemoveDelegate => buf.push_one(4),
            Entrypoint::Named(name) => {
                let len: u8 = name
                    .len()
                    .try_into()
                    .expect("entrypoint name exceeds one-byte length prefix");
                buf.push_one(0xff) + buf.push_one(len) + buf.push_all(name.as_bytes())
            }
        }
    }
}

impl Decode for Entrypoint {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        match p.take_tagword::<Entrypoint>(&Self::TAGS)? {
            0 => Ok(Entrypoint::Default),
            1 => Ok(Entrypoint::Root),
            2 => Ok(Entrypoint::Do),
            3 => Ok(Entrypoint::SetDelegate),
            4 => Ok(Entrypoint::RemoveDelegate),
            0xff => {
                let len = p.take_u8()? as usize;
                let raw = p.take_dynamic(len)?;
                Ok(Entrypoint::Named(String::from_utf8(raw)?))
            }
            _ => unreachable!(),
        }
    }
}

/// Walks a parameter type's `or` tree and returns the type fragment the
/// given entrypoint denotes.
///
/// The default entrypoint denotes the entire parameter type. Only `or`
/// nodes are descended into; the first fragment whose field annotation
/// matches wins.
#[must_use]
pub fn find_entrypoint<'a>(
    parameter_type: &'a Micheline,
    entrypoint: &Entrypoint,
) -> Option<&'a Micheline> {
    if matches!(entrypoint, Entrypoint::Default) {
        return Some(parameter_type);
    }
    find_named(parameter_type, entrypoint.name())
}

fn find_named<'a>(ty: &'a Micheline, name: &str) -> Option<&'a Micheline> {
    if ty.field_annot() == Some(name) {
        return Some(ty);
    }
    if ty.is_prim(Prim::or) {
        for arg in ty.args_of().unwrap_or(&[]) {
            if let Some(found) = find_named(arg, name) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hexstring::HexString;

    #[test]
    fn reserved_tags() {
        assert_eq!(Entrypoint::Default.encode::<HexString>().to_hex(), "00");
        assert_eq!(Entrypoint::Do.encode::<HexString>().to_hex(), "02");
        assert_eq!(
            Entrypoint::named("transfer").encode::<HexString>().to_hex(),
            "ff087472616e73666572"
        );
    }

    #[test]
    fn codec_roundtrip() {
        for ep in [
            Entrypoint::Default,
            Entrypoint::Root,
            Entrypoint::Do,
            Entrypoint::SetDelegate,
            Entrypoint::RemoveDelegate,
            Entrypoint::named("update_config"),
        ] {
            let bytes: HexString = ep.encode();
            assert_eq!(Entrypoint::decode(bytes), ep);
        }
    }

    #[test]
    fn named_constructor_canonicalizes() {
        assert_eq!(Entrypoint::named("default"), Entrypoint::Default);
        assert_eq!(Entrypoint::named("do"), Entrypoint::Do);
        assert!(matches!(
            Entrypoint::named("mint"),
            Entrypoint::Named(name) if name == "mint"
        ));
    }

    #[test]
    fn entrypoint_lookup_in_or_tree() {
        use crate::michelson::{IntoMicheline, Type, TypeNode};

        let parameter = Type::new(TypeNode::Or(
            Box::new(Type::new(TypeNode::Nat).field("mint")),
            Box::new(Type::new(TypeNode::Or(
                Box::new(Type::new(TypeNode::String).field("name")),
                Box::new(Type::new(TypeNode::Unit).field("halt")),
            ))),
        ))
        .into_micheline();

        let halt = find_entrypoint(&parameter, &Entrypoint::named("halt")).unwrap();
        assert!(halt.is_prim(crate::micheline::Prim::unit));
        assert!(find_entrypoint(&parameter, &Entrypoint::named("absent")).is_none());
        assert_eq!(
            find_entrypoint(&parameter, &Entrypoint::Default).unwrap(),
            &parameter
        );
    }
}

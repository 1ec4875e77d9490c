//! Derived, read-only mirror of a parameter type
//!
//! Resolution never walks the raw type tree directly; it walks a
//! [`ParamMeta`] built from it once per entrypoint. Each meta node
//! classifies its type fragment into one of four shapes, records the
//! fragment itself (for error reporting and leaf coercion), its own field
//! annotation, its arg-index trace relative to its parent, and — the part
//! resolution keys on — an eagerly computed map from every reachable
//! field annotation to the arg-index path that leads to it. A node's own
//! annotation short-circuits the merge: an annotated subtree is
//! addressable only as a whole.

use super::resolve::ResolveError;
use crate::micheline::{Micheline, Prim};
use std::collections::BTreeMap;

/// Per-node bookkeeping shared by every meta shape.
#[derive(Clone, Debug)]
pub struct MetaInfo {
    /// The primitive at the head of the type fragment
    pub prim: Prim,
    /// The full type fragment this node mirrors
    pub schema: Micheline,
    /// This node's own field annotation, without the `%`
    pub field_name: Option<String>,
    /// Arg-index path from the parent node (`[0]` = Left for `or`)
    pub trace: Vec<usize>,
    /// Reachable field annotations, each mapped to the arg-index path
    /// that reaches it from this node
    pub names: BTreeMap<String, Vec<usize>>,
}

/// The classified mirror of one type node.
#[derive(Clone, Debug)]
pub enum ParamMeta {
    /// A leaf: zero-argument types plus the opaque `big_map`, `lambda`,
    /// `contract`, and sapling leaves
    Value(MetaInfo),
    /// `list` or `set`, with one element meta
    Sequence(MetaInfo, Box<ParamMeta>),
    /// `map`, with key and value metas
    Map(MetaInfo, Box<ParamMeta>, Box<ParamMeta>),
    /// Any other one- or two-argument constructor, notably
    /// `pair`/`or`/`option`
    Object(MetaInfo, Vec<ParamMeta>),
}

/// Type constructors whose argument is not a constituent type, or whose
/// contents resolution treats as opaque.
fn is_opaque_leaf(prim: Prim) -> bool {
    matches!(
        prim,
        Prim::big_map
            | Prim::lambda
            | Prim::contract
            | Prim::sapling_state
            | Prim::sapling_transaction
    )
}

impl ParamMeta {
    /// Builds the meta mirror of a parameter type fragment.
    pub fn build(ty: &Micheline) -> Result<ParamMeta, ResolveError> {
        Self::build_node(ty, Vec::new())
    }

    fn build_node(ty: &Micheline, trace: Vec<usize>) -> Result<ParamMeta, ResolveError> {
        let (prim, args) = match ty {
            Micheline::App { prim, args, .. } => (*prim, args.as_slice()),
            _ => {
                return Err(ResolveError::InvalidType {
                    schema: ty.clone(),
                })
            }
        };
        let field_name = ty.field_annot().map(str::to_owned);

        let mut info = MetaInfo {
            prim,
            schema: ty.clone(),
            field_name,
            trace,
            names: BTreeMap::new(),
        };

        if args.is_empty() || is_opaque_leaf(prim) {
            info.names = own_names(&info);
            return Ok(ParamMeta::Value(info));
        }

        match prim {
            Prim::list | Prim::set => {
                if args.len() != 1 {
                    return Err(ResolveError::InvalidType { schema: ty.clone() });
                }
                let elem = Self::build_node(&args[0], vec![0])?;
                info.names = own_names(&info);
                Ok(ParamMeta::Sequence(info, Box::new(elem)))
            }
            Prim::map => {
                if args.len() != 2 {
                    return Err(ResolveError::InvalidType { schema: ty.clone() });
                }
                let key = Self::build_node(&args[0], vec![0])?;
                let value = Self::build_node(&args[1], vec![1])?;
                info.names = own_names(&info);
                Ok(ParamMeta::Map(info, Box::new(key), Box::new(value)))
            }
            Prim::pair if args.len() > 2 => {
                // n-ary pairs mirror their binary right-combed shape; the
                // node's own annotations survive on the outer pair
                let mut combed = comb_pair(args);
                if let Micheline::App { annots, .. } = &mut combed {
                    *annots = ty.annots_of().unwrap_or(&[]).to_vec();
                }
                let mut meta = Self::build_node(&combed, info.trace.clone())?;
                if let ParamMeta::Object(combed_info, _) = &mut meta {
                    combed_info.schema = ty.clone();
                }
                Ok(meta)
            }
            _ => {
                let arity_ok = match prim {
                    Prim::or | Prim::pair => args.len() == 2,
                    Prim::option => args.len() == 1,
                    _ => args.len() <= 2,
                };
                if !arity_ok {
                    return Err(ResolveError::InvalidType { schema: ty.clone() });
                }
                let mut children = Vec::with_capacity(args.len());
                for (ix, arg) in args.iter().enumerate() {
                    children.push(Self::build_node(arg, vec![ix])?);
                }
                info.names = merged_names(&info, &children);
                Ok(ParamMeta::Object(info, children))
            }
        }
    }

    /// The shared bookkeeping of this node.
    #[must_use]
    pub fn info(&self) -> &MetaInfo {
        match self {
            ParamMeta::Value(info)
            | ParamMeta::Sequence(info, _)
            | ParamMeta::Map(info, _, _)
            | ParamMeta::Object(info, _) => info,
        }
    }

    /// `true` when this node mirrors an `option` constructor.
    #[must_use]
    pub(crate) fn is_option(&self) -> bool {
        matches!(self, ParamMeta::Object(info, _) if info.prim == Prim::option)
    }

    /// `true` when `name` addresses this node or one of its reachable
    /// descendants.
    #[must_use]
    pub(crate) fn answers_to(&self, name: &str) -> bool {
        let info = self.info();
        info.field_name.as_deref() == Some(name) || info.names.contains_key(name)
    }
}

fn own_names(info: &MetaInfo) -> BTreeMap<String, Vec<usize>> {
    let mut names = BTreeMap::new();
    if let Some(name) = &info.field_name {
        names.insert(name.clone(), Vec::new());
    }
    names
}

fn merged_names(info: &MetaInfo, children: &[ParamMeta]) -> BTreeMap<String, Vec<usize>> {
    if info.field_name.is_some() {
        return own_names(info);
    }
    let mut names = BTreeMap::new();
    for (ix, child) in children.iter().enumerate() {
        for (name, trace) in &child.info().names {
            let mut full = vec![ix];
            full.extend(trace.iter().copied());
            // first occurrence wins on duplicate annotations
            names.entry(name.clone()).or_insert(full);
        }
    }
    names
}

fn comb_pair(args: &[Micheline]) -> Micheline {
    match args {
        [lhs, rhs] => Micheline::app(Prim::pair, vec![lhs.clone(), rhs.clone()]),
        [head, tail @ ..] => {
            Micheline::app(Prim::pair, vec![head.clone(), comb_pair(tail)])
        }
        _ => unreachable!("comb_pair is only called with two or more components"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::michelson::{IntoMicheline, Type, TypeNode};

    fn meta_of(ty: Type) -> ParamMeta {
        ParamMeta::build(&ty.into_micheline()).unwrap()
    }

    #[test]
    fn leaf_classification() {
        assert!(matches!(meta_of(Type::new(TypeNode::Nat)), ParamMeta::Value(_)));
        assert!(matches!(
            meta_of(Type::new(TypeNode::BigMap(
                Box::new(Type::new(TypeNode::Nat)),
                Box::new(Type::new(TypeNode::Nat)),
            ))),
            ParamMeta::Value(_)
        ));
        assert!(matches!(
            meta_of(Type::new(TypeNode::Lambda(
                Box::new(Type::new(TypeNode::Unit)),
                Box::new(Type::new(TypeNode::Unit)),
            ))),
            ParamMeta::Value(_)
        ));
        assert!(matches!(
            meta_of(Type::new(TypeNode::List(Box::new(Type::new(TypeNode::Nat))))),
            ParamMeta::Sequence(..)
        ));
        assert!(matches!(
            meta_of(Type::new(TypeNode::Option(Box::new(Type::new(TypeNode::Nat))))),
            ParamMeta::Object(..)
        ));
    }

    #[test]
    fn names_union_prepends_child_traces() {
        let meta = meta_of(Type::new(TypeNode::Pair(vec![
            Type::new(TypeNode::Option(Box::new(Type::new(TypeNode::Address)))).field("address"),
            Type::new(TypeNode::Pair(vec![
                Type::new(TypeNode::Bytes).field("label"),
                Type::new(TypeNode::Address).field("owner"),
            ])),
        ])));
        let names = &meta.info().names;
        assert_eq!(names["address"], vec![0]);
        assert_eq!(names["label"], vec![1, 0]);
        assert_eq!(names["owner"], vec![1, 1]);
    }

    #[test]
    fn own_annotation_short_circuits_children() {
        let meta = meta_of(
            Type::new(TypeNode::Pair(vec![
                Type::new(TypeNode::Nat).field("a"),
                Type::new(TypeNode::Nat).field("b"),
            ]))
            .field("outer"),
        );
        let names = &meta.info().names;
        assert_eq!(names.len(), 1);
        assert_eq!(names["outer"], Vec::<usize>::new());
    }

    #[test]
    fn nary_pair_is_combed() {
        let meta = meta_of(Type::new(TypeNode::Pair(vec![
            Type::new(TypeNode::Nat).field("a"),
            Type::new(TypeNode::Nat).field("b"),
            Type::new(TypeNode::Nat).field("c"),
        ])));
        match &meta {
            ParamMeta::Object(info, children) => {
                assert_eq!(children.len(), 2);
                assert_eq!(info.names["a"], vec![0]);
                assert_eq!(info.names["b"], vec![1, 0]);
                assert_eq!(info.names["c"], vec![1, 1]);
            }
            other => panic!("expected an Object meta, got {other:?}"),
        }
    }

    #[test]
    fn or_children_carry_directional_traces() {
        let meta = meta_of(Type::new(TypeNode::Or(
            Box::new(Type::new(TypeNode::Nat).field("inc")),
            Box::new(Type::new(TypeNode::Nat).field("dec")),
        )));
        match &meta {
            ParamMeta::Object(info, children) => {
                assert_eq!(info.names["inc"], vec![0]);
                assert_eq!(info.names["dec"], vec![1]);
                assert_eq!(children[0].info().trace, vec![0]);
                assert_eq!(children[1].info().trace, vec![1]);
            }
            other => panic!("expected an Object meta, got {other:?}"),
        }
    }

    #[test]
    fn non_application_type_rejected() {
        assert!(matches!(
            ParamMeta::build(&Micheline::int(3)),
            Err(ResolveError::InvalidType { .. })
        ));
    }
}

//! Resolution of a user-supplied parameter tree against an entrypoint type
//!
//! A caller describes an entrypoint argument loosely: leaves may be named
//! or positional, tuple fields may arrive flat or nested, option fields
//! may simply be absent, and an `or` branch may be selected implicitly by
//! the name of any field reachable inside it. [`resolve`] consumes such a
//! tree against the entrypoint's [`ParamMeta`] and produces the single
//! canonical Micheline value the type's binary shape dictates.
//!
//! Named fields are consumed from their enclosing object at most once,
//! via a tombstoning [`FieldBag`]; unmatched leftovers, arity
//! disagreements, and ambiguous `or` directions are all fatal typed
//! errors — there is no silent coercion.

use super::meta::{MetaInfo, ParamMeta};
use crate::micheline::{Micheline, Prim};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A caller-facing parameter tree
#[derive(Clone, Debug, PartialEq)]
pub enum EntrypointParameter {
    /// A concrete leaf (or, with `value: None`, a deliberately absent
    /// field), optionally named
    Value {
        name: Option<String>,
        value: Option<Micheline>,
    },
    /// An ordered collection of named or positional sub-parameters,
    /// standing for a multi-argument constructor such as a pair, an `or`
    /// branch, or an option
    Object {
        name: Option<String>,
        fields: Vec<EntrypointParameter>,
    },
    /// An ordered collection of homogeneous elements (`list`/`set`)
    Sequence {
        name: Option<String>,
        items: Vec<EntrypointParameter>,
    },
    /// An ordered collection of key/value bindings
    Map {
        name: Option<String>,
        entries: Vec<(EntrypointParameter, EntrypointParameter)>,
    },
}

impl EntrypointParameter {
    /// An unnamed concrete leaf.
    pub fn value(value: impl Into<Micheline>) -> Self {
        Self::Value {
            name: None,
            value: Some(value.into()),
        }
    }

    /// A named concrete leaf.
    pub fn named_value(name: &str, value: impl Into<Micheline>) -> Self {
        Self::Value {
            name: Some(name.to_owned()),
            value: Some(value.into()),
        }
    }

    /// A named but deliberately absent field.
    #[must_use]
    pub fn absent(name: &str) -> Self {
        Self::Value {
            name: Some(name.to_owned()),
            value: None,
        }
    }

    /// An unnamed field collection.
    #[must_use]
    pub fn object(fields: Vec<EntrypointParameter>) -> Self {
        Self::Object { name: None, fields }
    }

    /// A named field collection.
    #[must_use]
    pub fn named_object(name: &str, fields: Vec<EntrypointParameter>) -> Self {
        Self::Object {
            name: Some(name.to_owned()),
            fields,
        }
    }

    /// An unnamed element sequence.
    #[must_use]
    pub fn sequence(items: Vec<EntrypointParameter>) -> Self {
        Self::Sequence { name: None, items }
    }

    /// An unnamed binding collection.
    #[must_use]
    pub fn map(entries: Vec<(EntrypointParameter, EntrypointParameter)>) -> Self {
        Self::Map {
            name: None,
            entries,
        }
    }

    /// The field name this parameter carries, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            EntrypointParameter::Value { name, .. }
            | EntrypointParameter::Object { name, .. }
            | EntrypointParameter::Sequence { name, .. }
            | EntrypointParameter::Map { name, .. } => name.as_deref(),
        }
    }
}

/// Failures of entrypoint parameter resolution
#[derive(Debug)]
pub enum ResolveError {
    /// The runtime structure of the parameter disagrees with the type
    Mismatch {
        parameter: Box<EntrypointParameter>,
        schema: Micheline,
    },
    /// A required field could not be located by name or position
    MissingField {
        name: Option<String>,
        schema: Micheline,
    },
    /// Named fields select more than one `or` direction
    AmbiguousDirection {
        names: Vec<String>,
        schema: Micheline,
    },
    /// Fields remained unconsumed after resolution
    ExtraFields { count: usize, schema: Micheline },
    /// The entrypoint type itself is not a well-formed type fragment
    InvalidType { schema: Micheline },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Mismatch { parameter, schema } => {
                write!(f, "parameter {parameter:?} does not fit type {schema:?}")
            }
            ResolveError::MissingField { name, schema } => match name {
                Some(name) => write!(f, "no field `{name}` for type {schema:?}"),
                None => write!(f, "missing positional field for type {schema:?}"),
            },
            ResolveError::AmbiguousDirection { names, schema } => {
                write!(
                    f,
                    "fields {names:?} select conflicting branches of {schema:?}"
                )
            }
            ResolveError::ExtraFields { count, schema } => {
                write!(f, "{count} unconsumed fields after resolving {schema:?}")
            }
            ResolveError::InvalidType { schema } => {
                write!(f, "{schema:?} is not a resolvable parameter type")
            }
        }
    }
}

impl Error for ResolveError {}

/// Resolves a user parameter tree against an entrypoint type, producing
/// the canonical Micheline value.
pub fn resolve(
    entrypoint_type: &Micheline,
    parameter: EntrypointParameter,
) -> Result<Micheline, ResolveError> {
    let meta = ParamMeta::build(entrypoint_type)?;
    resolve_node(&meta, parameter)
}

/// Caller-local consumable field collection
///
/// Fields are tombstoned as they are matched, enforcing "each field used
/// at most once" without disturbing the positional order of the
/// survivors.
struct FieldBag {
    slots: Vec<Option<EntrypointParameter>>,
}

impl FieldBag {
    fn new(fields: Vec<EntrypointParameter>) -> Self {
        Self {
            slots: fields.into_iter().map(Some).collect(),
        }
    }

    fn remaining(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Names of all unconsumed fields, in positional order.
    fn live_names(&self) -> Vec<String> {
        self.slots
            .iter()
            .flatten()
            .filter_map(|f| f.name().map(str::to_owned))
            .collect()
    }

    /// Removes and returns the first unconsumed field named `name`.
    fn take_named(&mut self, name: &str) -> Option<EntrypointParameter> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|f| f.name() == Some(name)))?;
        slot.take()
    }

    /// Removes and returns the first unconsumed field.
    fn take_first(&mut self) -> Option<EntrypointParameter> {
        let slot = self.slots.iter_mut().find(|s| s.is_some())?;
        slot.take()
    }

    /// Borrows the first unconsumed field without removing it.
    fn peek_first(&self) -> Option<&EntrypointParameter> {
        self.slots.iter().flatten().next()
    }

    /// Removes and returns the unique unconsumed field satisfying `pred`,
    /// or `None` when zero or several do.
    fn take_only_matching(
        &mut self,
        pred: impl Fn(&EntrypointParameter) -> bool,
    ) -> Option<EntrypointParameter> {
        let mut found: Option<usize> = None;
        for (ix, slot) in self.slots.iter().enumerate() {
            if slot.as_ref().is_some_and(&pred) {
                if found.is_some() {
                    return None;
                }
                found = Some(ix);
            }
        }
        self.slots[found?].take()
    }
}

fn mismatch(parameter: EntrypointParameter, info: &MetaInfo) -> ResolveError {
    ResolveError::Mismatch {
        parameter: Box::new(parameter),
        schema: info.schema.clone(),
    }
}

fn resolve_node(
    meta: &ParamMeta,
    parameter: EntrypointParameter,
) -> Result<Micheline, ResolveError> {
    match parameter {
        EntrypointParameter::Object { fields, .. } => {
            // a concrete-valued object is consumed field-by-field; the
            // enclosing object must end up empty
            let mut bag = FieldBag::new(fields);
            let resolved = resolve_with_bag(meta, &mut bag)?;
            let leftover = bag.remaining();
            if leftover != 0 {
                return Err(ResolveError::ExtraFields {
                    count: leftover,
                    schema: meta.info().schema.clone(),
                });
            }
            Ok(resolved)
        }
        other => resolve_direct(meta, other),
    }
}

/// Resolution of a non-Object parameter against any meta shape.
fn resolve_direct(
    meta: &ParamMeta,
    parameter: EntrypointParameter,
) -> Result<Micheline, ResolveError> {
    match meta {
        ParamMeta::Value(info) => match parameter {
            EntrypointParameter::Value {
                value: Some(v), ..
            } => coerce_leaf(info, v),
            EntrypointParameter::Value { value: None, name } => {
                if info.prim == Prim::unit {
                    Ok(Micheline::unit())
                } else {
                    Err(ResolveError::MissingField {
                        name: name.or_else(|| info.field_name.clone()),
                        schema: info.schema.clone(),
                    })
                }
            }
            other => Err(mismatch(other, info)),
        },

        ParamMeta::Sequence(info, elem) => match parameter {
            EntrypointParameter::Sequence { items, .. } => {
                let resolved = items
                    .into_iter()
                    .map(|item| resolve_node(elem, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Micheline::Seq(resolved))
            }
            EntrypointParameter::Value {
                value: Some(Micheline::Seq(raw)),
                ..
            } => Ok(Micheline::Seq(raw)),
            other => Err(mismatch(other, info)),
        },

        ParamMeta::Map(info, key, value) => match parameter {
            EntrypointParameter::Map { entries, .. } => {
                let resolved = entries
                    .into_iter()
                    .map(|(k, v)| {
                        Ok(Micheline::elt(
                            resolve_node(key, k)?,
                            resolve_node(value, v)?,
                        ))
                    })
                    .collect::<Result<Vec<_>, ResolveError>>()?;
                Ok(Micheline::Seq(resolved))
            }
            EntrypointParameter::Value {
                value: Some(Micheline::Seq(raw)),
                ..
            } => Ok(Micheline::Seq(raw)),
            other => Err(mismatch(other, info)),
        },

        ParamMeta::Object(info, children) => {
            // a raw Micheline leaf that already has the constructed shape
            // passes through unchanged
            let parameter = match parameter {
                EntrypointParameter::Value {
                    value: Some(v),
                    name,
                } => {
                    if already_canonical(info.prim, &v) {
                        return Ok(v);
                    }
                    EntrypointParameter::Value {
                        value: Some(v),
                        name,
                    }
                }
                other => other,
            };
            match info.prim {
                Prim::option => match parameter {
                    EntrypointParameter::Value { value: None, .. } => Ok(Micheline::none()),
                    other => Ok(Micheline::some(resolve_node(&children[0], other)?)),
                },
                Prim::or => match parameter {
                    named @ EntrypointParameter::Value {
                        name: Some(_), ..
                    } => {
                        // a lone named leaf can still select a branch
                        let mut bag = FieldBag::new(vec![named]);
                        let resolved = resolve_or(info, children, &mut bag)?;
                        if bag.remaining() != 0 {
                            return Err(ResolveError::ExtraFields {
                                count: bag.remaining(),
                                schema: info.schema.clone(),
                            });
                        }
                        Ok(resolved)
                    }
                    other => Err(mismatch(other, info)),
                },
                Prim::pair => Err(mismatch(parameter, info)),
                // generic single-argument constructor: unwrap and recurse
                _ => resolve_node(&children[0], parameter),
            }
        }
    }
}

/// `true` when a raw Micheline value already has the constructed shape
/// the given Object-meta primitive dictates.
fn already_canonical(prim: Prim, value: &Micheline) -> bool {
    match prim {
        Prim::pair => {
            matches!(value, Micheline::Seq(_)) || value.is_prim(Prim::Pair)
        }
        Prim::or => value.is_prim(Prim::Left) || value.is_prim(Prim::Right),
        Prim::option => value.is_prim(Prim::Some) || value.is_prim(Prim::None),
        _ => false,
    }
}

/// Resolution of a meta node that consumes fields from a shared bag.
fn resolve_with_bag(meta: &ParamMeta, bag: &mut FieldBag) -> Result<Micheline, ResolveError> {
    match meta {
        ParamMeta::Value(info) => {
            if let Some(name) = &info.field_name {
                if let Some(field) = bag.take_named(name) {
                    return resolve_node(meta, field);
                }
            }
            if bag.remaining() == 1 {
                let field = bag.take_first().expect("remaining() was 1");
                return resolve_node(meta, field);
            }
            Err(ResolveError::MissingField {
                name: info.field_name.clone(),
                schema: info.schema.clone(),
            })
        }

        ParamMeta::Sequence(info, _) | ParamMeta::Map(info, _, _) => {
            // locate the collection inside the object by name, then by
            // structure
            if let Some(name) = &info.field_name {
                if let Some(field) = bag.take_named(name) {
                    return resolve_node(meta, field);
                }
            }
            let wants_map = matches!(meta, ParamMeta::Map(..));
            let located = bag.take_only_matching(|candidate| match candidate {
                EntrypointParameter::Sequence { .. } => !wants_map,
                EntrypointParameter::Map { .. } => wants_map,
                EntrypointParameter::Value {
                    value: Some(Micheline::Seq(_)),
                    ..
                } => true,
                _ => false,
            });
            match located {
                Some(field) => resolve_node(meta, field),
                None => Err(ResolveError::MissingField {
                    name: info.field_name.clone(),
                    schema: info.schema.clone(),
                }),
            }
        }

        ParamMeta::Object(info, children) => match info.prim {
            Prim::option => {
                let inner = &children[0];
                let addressed = bag
                    .live_names()
                    .iter()
                    .any(|name| inner.answers_to(name));
                let positional = bag.peek_first().is_some_and(|f| f.name().is_none());
                if addressed || positional {
                    Ok(Micheline::some(extract_resolve(inner, bag)?))
                } else {
                    // zero matched fields: the option is absent
                    Ok(Micheline::none())
                }
            }
            Prim::or => resolve_or(info, children, bag),
            Prim::pair => {
                let left = extract_resolve(&children[0], bag)?;
                let right = extract_resolve(&children[1], bag)?;
                Ok(Micheline::pair(left, right))
            }
            _ => extract_resolve(&children[0], bag),
        },
    }
}

/// Determines the one direction the bag's named fields select, then
/// resolves the chosen branch and wraps it.
fn resolve_or(
    info: &MetaInfo,
    children: &[ParamMeta],
    bag: &mut FieldBag,
) -> Result<Micheline, ResolveError> {
    let mut directions: BTreeSet<usize> = BTreeSet::new();
    let mut matched: Vec<String> = Vec::new();
    for name in bag.live_names() {
        for (ix, child) in children.iter().enumerate() {
            if child.answers_to(&name) {
                directions.insert(ix);
                matched.push(name.clone());
            }
        }
    }
    match directions.len() {
        0 => Err(ResolveError::MissingField {
            name: None,
            schema: info.schema.clone(),
        }),
        1 => {
            let dir = *directions.iter().next().expect("len() was 1");
            let inner = extract_resolve(&children[dir], bag)?;
            Ok(if dir == 0 {
                Micheline::left(inner)
            } else {
                Micheline::right(inner)
            })
        }
        _ => Err(ResolveError::AmbiguousDirection {
            names: matched,
            schema: info.schema.clone(),
        }),
    }
}

/// Obtains one constituent from the bag: own-name match first, then
/// pass-through for reachable descendant names, then the first leftover
/// field positionally; an empty bag leaves an option child absent.
fn extract_resolve(child: &ParamMeta, bag: &mut FieldBag) -> Result<Micheline, ResolveError> {
    let info = child.info();

    if let Some(name) = &info.field_name {
        if let Some(field) = bag.take_named(name) {
            return resolve_node(child, field);
        }
    }

    let descendant_matched = bag
        .live_names()
        .iter()
        .any(|name| info.names.contains_key(name.as_str()));
    if descendant_matched {
        return resolve_with_bag(child, bag);
    }

    // an unaddressed option constituent consumes a positional field only
    // when that field is itself unnamed; a named leftover belongs to some
    // other constituent and the option is simply absent
    if child.is_option() {
        let positional_available = bag.peek_first().is_some_and(|f| f.name().is_none());
        if positional_available {
            let field = bag.take_first().expect("peek_first() was Some");
            return resolve_node(child, field);
        }
        return Ok(Micheline::none());
    }

    if let Some(field) = bag.take_first() {
        return resolve_node(child, field);
    }

    Err(ResolveError::MissingField {
        name: info.field_name.clone(),
        schema: info.schema.clone(),
    })
}

/// Validates that a concrete leaf literal is the kind of literal the
/// leaf type expects, passing it through unchanged on success.
fn coerce_leaf(info: &MetaInfo, value: Micheline) -> Result<Micheline, ResolveError> {
    let ok = match info.prim {
        Prim::nat | Prim::int | Prim::mutez => matches!(value, Micheline::Int(_)),
        Prim::string => matches!(value, Micheline::String(_)),
        Prim::bytes | Prim::bls12_381_g1 | Prim::bls12_381_g2 | Prim::bls12_381_fr
        | Prim::chest | Prim::chest_key => matches!(value, Micheline::Bytes(_)),
        Prim::bool => value.is_prim(Prim::True) || value.is_prim(Prim::False),
        Prim::unit => value.is_prim(Prim::Unit),
        Prim::timestamp => {
            matches!(value, Micheline::Int(_) | Micheline::String(_))
        }
        Prim::address
        | Prim::contract
        | Prim::key
        | Prim::key_hash
        | Prim::signature
        | Prim::chain_id => {
            matches!(value, Micheline::String(_) | Micheline::Bytes(_))
        }
        Prim::big_map => matches!(value, Micheline::Int(_) | Micheline::Seq(_)),
        Prim::lambda => matches!(value, Micheline::Seq(_)),
        Prim::never | Prim::operation => false,
        _ => true,
    };
    if ok {
        Ok(value)
    } else {
        Err(ResolveError::Mismatch {
            parameter: Box::new(EntrypointParameter::Value {
                name: info.field_name.clone(),
                value: Some(value),
            }),
            schema: info.schema.clone(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::michelson::{IntoMicheline, Type, TypeNode};

    fn ty(node: TypeNode) -> Type {
        Type::new(node)
    }

    fn schema(t: Type) -> Micheline {
        t.into_micheline()
    }

    #[test]
    fn bare_leaf_and_named_object_agree() {
        // parameter type `nat %current_version`
        let sch = schema(ty(TypeNode::Nat).field("current_version"));

        let from_leaf = resolve(&sch, EntrypointParameter::value(1)).unwrap();
        let from_object = resolve(
            &sch,
            EntrypointParameter::object(vec![EntrypointParameter::named_value(
                "current_version",
                1,
            )]),
        )
        .unwrap();

        assert_eq!(from_leaf, Micheline::int(1));
        assert_eq!(from_object, Micheline::int(1));
    }

    #[test]
    fn flat_named_object_matches_nested_binary_shape() {
        // pair (option %address address) (pair (bytes %label) (address %owner))
        let sch = schema(ty(TypeNode::Pair(vec![
            ty(TypeNode::Option(Box::new(ty(TypeNode::Address)))).field("address"),
            ty(TypeNode::Pair(vec![
                ty(TypeNode::Bytes).field("label"),
                ty(TypeNode::Address).field("owner"),
            ])),
        ])));

        let resolved = resolve(
            &sch,
            EntrypointParameter::object(vec![
                EntrypointParameter::named_value("owner", Micheline::string("tz1owner")),
                EntrypointParameter::named_value("address", Micheline::string("tz1self")),
                EntrypointParameter::named_value("label", Micheline::bytes(vec![0x01])),
            ]),
        )
        .unwrap();

        assert_eq!(
            resolved,
            Micheline::pair(
                Micheline::some(Micheline::string("tz1self")),
                Micheline::pair(
                    Micheline::bytes(vec![0x01]),
                    Micheline::string("tz1owner")
                ),
            )
        );
    }

    #[test]
    fn positional_and_named_spellings_resolve_identically() {
        let sch = schema(ty(TypeNode::Pair(vec![
            ty(TypeNode::Nat).field("count"),
            ty(TypeNode::String).field("label"),
        ])));

        let positional = resolve(
            &sch,
            EntrypointParameter::object(vec![
                EntrypointParameter::value(3),
                EntrypointParameter::value(Micheline::string("x")),
            ]),
        )
        .unwrap();

        // named fields may arrive in any order
        let named = resolve(
            &sch,
            EntrypointParameter::object(vec![
                EntrypointParameter::named_value("label", Micheline::string("x")),
                EntrypointParameter::named_value("count", 3),
            ]),
        )
        .unwrap();

        assert_eq!(positional, named);
        assert_eq!(
            positional,
            Micheline::pair(Micheline::int(3), Micheline::string("x"))
        );
    }

    #[test]
    fn absent_option_field_resolves_to_none() {
        let sch = schema(ty(TypeNode::Pair(vec![
            ty(TypeNode::Option(Box::new(ty(TypeNode::Nat)))).field("limit"),
            ty(TypeNode::Nat).field("amount"),
        ])));

        let resolved = resolve(
            &sch,
            EntrypointParameter::object(vec![EntrypointParameter::named_value("amount", 9)]),
        )
        .unwrap();

        assert_eq!(
            resolved,
            Micheline::pair(Micheline::none(), Micheline::int(9))
        );
    }

    #[test]
    fn or_direction_from_named_field() {
        let sch = schema(ty(TypeNode::Or(
            Box::new(ty(TypeNode::Nat).field("inc")),
            Box::new(ty(TypeNode::Nat).field("dec")),
        )));

        let left = resolve(
            &sch,
            EntrypointParameter::object(vec![EntrypointParameter::named_value("inc", 5)]),
        )
        .unwrap();
        assert_eq!(left, Micheline::left(Micheline::int(5)));

        let right = resolve(
            &sch,
            EntrypointParameter::object(vec![EntrypointParameter::named_value("dec", 5)]),
        )
        .unwrap();
        assert_eq!(right, Micheline::right(Micheline::int(5)));

        // a lone named leaf, without the object wrapper, selects the same
        // branch
        let bare = resolve(&sch, EntrypointParameter::named_value("inc", 5)).unwrap();
        assert_eq!(bare, left);
    }

    #[test]
    fn or_direction_stable_with_loose_leaf() {
        // left branch: unnamed pair whose first component is %x
        let sch = schema(ty(TypeNode::Or(
            Box::new(ty(TypeNode::Pair(vec![
                ty(TypeNode::Nat).field("x"),
                ty(TypeNode::Nat),
            ]))),
            Box::new(ty(TypeNode::Nat).field("neg")),
        )));

        let parameter = || {
            EntrypointParameter::object(vec![
                EntrypointParameter::named_value("x", 1),
                EntrypointParameter::value(2),
            ])
        };

        let first = resolve(&sch, parameter()).unwrap();
        let second = resolve(&sch, parameter()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            Micheline::left(Micheline::pair(Micheline::int(1), Micheline::int(2)))
        );
    }

    #[test]
    fn ambiguous_or_direction_is_fatal() {
        let sch = schema(ty(TypeNode::Or(
            Box::new(ty(TypeNode::Nat).field("a")),
            Box::new(ty(TypeNode::Nat).field("b")),
        )));

        let err = resolve(
            &sch,
            EntrypointParameter::object(vec![
                EntrypointParameter::named_value("a", 1),
                EntrypointParameter::named_value("b", 2),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::AmbiguousDirection { .. }));
    }

    #[test]
    fn sequences_resolve_elementwise() {
        let sch = schema(ty(TypeNode::List(Box::new(
            ty(TypeNode::Pair(vec![
                ty(TypeNode::Nat).field("id"),
                ty(TypeNode::String).field("tag"),
            ])),
        ))));

        let resolved = resolve(
            &sch,
            EntrypointParameter::sequence(vec![EntrypointParameter::object(vec![
                EntrypointParameter::named_value("tag", Micheline::string("t")),
                EntrypointParameter::named_value("id", 4),
            ])]),
        )
        .unwrap();

        assert_eq!(
            resolved,
            Micheline::seq(vec![Micheline::pair(
                Micheline::int(4),
                Micheline::string("t")
            )])
        );
    }

    #[test]
    fn collection_located_inside_object_by_structure() {
        let sch = schema(ty(TypeNode::Pair(vec![
            ty(TypeNode::Nat).field("batch_id"),
            ty(TypeNode::List(Box::new(ty(TypeNode::Nat)))),
        ])));

        let resolved = resolve(
            &sch,
            EntrypointParameter::object(vec![
                EntrypointParameter::named_value("batch_id", 1),
                EntrypointParameter::sequence(vec![
                    EntrypointParameter::value(2),
                    EntrypointParameter::value(3),
                ]),
            ]),
        )
        .unwrap();

        assert_eq!(
            resolved,
            Micheline::pair(
                Micheline::int(1),
                Micheline::seq(vec![Micheline::int(2), Micheline::int(3)])
            )
        );
    }

    #[test]
    fn map_entries_resolve_pairwise() {
        let sch = schema(ty(TypeNode::Map(
            Box::new(ty(TypeNode::String)),
            Box::new(ty(TypeNode::Nat)),
        )));

        let resolved = resolve(
            &sch,
            EntrypointParameter::map(vec![(
                EntrypointParameter::value(Micheline::string("k")),
                EntrypointParameter::value(7),
            )]),
        )
        .unwrap();

        assert_eq!(
            resolved,
            Micheline::seq(vec![Micheline::elt(
                Micheline::string("k"),
                Micheline::int(7)
            )])
        );
    }

    #[test]
    fn canonical_micheline_passes_through() {
        let sch = schema(ty(TypeNode::Pair(vec![
            ty(TypeNode::Nat),
            ty(TypeNode::Nat),
        ])));
        let raw = Micheline::pair(Micheline::int(1), Micheline::int(2));
        assert_eq!(
            resolve(&sch, EntrypointParameter::value(raw.clone())).unwrap(),
            raw
        );
    }

    #[test]
    fn leftover_fields_are_fatal() {
        let sch = schema(ty(TypeNode::Nat).field("only"));
        let err = resolve(
            &sch,
            EntrypointParameter::object(vec![
                EntrypointParameter::named_value("only", 1),
                EntrypointParameter::named_value("stray", 2),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::ExtraFields { .. }));
    }

    #[test]
    fn wrong_literal_kind_is_fatal() {
        let sch = schema(ty(TypeNode::Nat));
        let err = resolve(
            &sch,
            EntrypointParameter::value(Micheline::string("not a number")),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::Mismatch { .. }));
    }

    #[test]
    fn big_map_reference_accepted_as_leaf() {
        let sch = schema(ty(TypeNode::BigMap(
            Box::new(ty(TypeNode::String)),
            Box::new(ty(TypeNode::Nat)),
        )));
        assert_eq!(
            resolve(&sch, EntrypointParameter::value(4)).unwrap(),
            Micheline::int(4)
        );
    }
}

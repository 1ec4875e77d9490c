//! Schema-guided transformation between readable and optimized value
//! encodings
//!
//! A typed value has two wire-legal Micheline renderings: the *readable*
//! one (base58 strings for addresses and keys, RFC3339 strings for
//! timestamps, flat sequences for tuples) and the *optimized* one (raw
//! bytes, epoch integers, right-combed binary pairs) used wherever values
//! cross the binary boundary — big-map keys, `PACK`ed payloads, bytes
//! prepared for signing.
//!
//! [`pack`] rewrites a readable value into optimized shape under the
//! guidance of its type's untyped projection (the *schema*), serializes
//! it, and prefixes the fixed `0x05` wire tag; [`unpack`] is its exact
//! mirror. Without a schema both functions run the raw codec unchanged.
//! The schema walk matches a closed set of shapes; any disagreement
//! between value and schema is a fatal [`PackError::ShapeMismatch`]
//! carrying both offending nodes.

use crate::conv::{Decode, DecodeError, Encode};
use crate::crypto::{Address, ChainId, KeyHash, PublicKey, Signature};
use crate::micheline::{Micheline, Prim};
use crate::parse::error::ParseError;
use crate::timestamp::{self, TimestampError};
use crate::base58::Base58Error;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wire tag prefixed to every packed value.
pub const PACK_TAG: u8 = 0x05;

/// Failures of the schema-guided transformation
#[derive(Debug)]
pub enum PackError {
    /// The runtime structure of the value disagrees with the schema
    ShapeMismatch {
        value: Micheline,
        schema: Micheline,
    },
    /// A string leaf could not be read as base58check
    Base58(Base58Error),
    /// A timestamp leaf could not be transcoded
    Timestamp(TimestampError),
    /// The binary payload was malformed
    Decode(DecodeError),
    /// The buffer did not start with the `0x05` pack tag
    MissingPackTag,
}

impl PackError {
    fn mismatch(value: &Micheline, schema: &Micheline) -> Self {
        Self::ShapeMismatch {
            value: value.clone(),
            schema: schema.clone(),
        }
    }
}

impl Display for PackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PackError::ShapeMismatch { value, schema } => {
                write!(f, "value {value:?} does not fit schema {schema:?}")
            }
            PackError::Base58(err) => Display::fmt(err, f),
            PackError::Timestamp(err) => Display::fmt(err, f),
            PackError::Decode(err) => Display::fmt(err, f),
            PackError::MissingPackTag => {
                write!(f, "packed value must start with the 0x05 wire tag")
            }
        }
    }
}

impl Error for PackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PackError::Base58(err) => Some(err),
            PackError::Timestamp(err) => Some(err),
            PackError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Base58Error> for PackError {
    fn from(err: Base58Error) -> Self {
        Self::Base58(err)
    }
}

impl From<TimestampError> for PackError {
    fn from(err: TimestampError) -> Self {
        Self::Timestamp(err)
    }
}

impl From<DecodeError> for PackError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl From<ParseError> for PackError {
    fn from(err: ParseError) -> Self {
        Self::Decode(DecodeError::Parse(err))
    }
}

/// Serializes `value` into its packed binary form.
///
/// With a schema, the value is first rewritten from readable to optimized
/// shape; without one, the raw codec runs unchanged.
pub fn pack(value: &Micheline, schema: Option<&Micheline>) -> Result<Vec<u8>, PackError> {
    let transformed = match schema {
        Some(s) => prepack(value, s)?,
        None => value.clone(),
    };
    let mut out = vec![PACK_TAG];
    transformed.write_to_vec(&mut out);
    Ok(out)
}

/// Reads a packed binary buffer back into a Micheline value.
///
/// With a schema, the decoded value is rewritten from optimized back to
/// readable shape; without one, the raw codec runs unchanged. The entire
/// buffer must be consumed.
pub fn unpack(bytes: &[u8], schema: Option<&Micheline>) -> Result<Micheline, PackError> {
    let raw = match bytes.split_first() {
        Some((&PACK_TAG, rest)) => Micheline::try_decode::<_, crate::parse::byteparser::ByteParser>(
            rest.to_vec(),
        )?,
        _ => return Err(PackError::MissingPackTag),
    };
    match schema {
        Some(s) => postunpack(&raw, s),
        None => Ok(raw),
    }
}

/// Direction of a schema-guided rewrite.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Rewrite {
    /// readable -> optimized
    Pack,
    /// optimized -> readable
    Unpack,
}

fn prepack(value: &Micheline, schema: &Micheline) -> Result<Micheline, PackError> {
    transform(value, schema, Rewrite::Pack)
}

fn postunpack(value: &Micheline, schema: &Micheline) -> Result<Micheline, PackError> {
    transform(value, schema, Rewrite::Unpack)
}

fn transform(
    value: &Micheline,
    schema: &Micheline,
    dir: Rewrite,
) -> Result<Micheline, PackError> {
    let (prim, s_args) = match schema {
        Micheline::App { prim, args, .. } => (*prim, args.as_slice()),
        _ => return Ok(value.clone()),
    };

    match prim {
        Prim::option => match value {
            Micheline::App {
                prim: Prim::Some,
                args,
                ..
            } if args.len() == 1 && s_args.len() == 1 => {
                Ok(Micheline::some(transform(&args[0], &s_args[0], dir)?))
            }
            Micheline::App {
                prim: Prim::None,
                args,
                ..
            } if args.is_empty() => Ok(Micheline::none()),
            _ => Err(PackError::mismatch(value, schema)),
        },

        Prim::list | Prim::set => match (value, s_args) {
            (Micheline::Seq(items), [elem_schema]) => {
                let rewritten = items
                    .iter()
                    .map(|item| transform(item, elem_schema, dir))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Micheline::Seq(rewritten))
            }
            _ => Err(PackError::mismatch(value, schema)),
        },

        Prim::map | Prim::big_map => match value {
            // a bare integer is an on-chain big-map reference, untouched
            Micheline::Int(_) => Ok(value.clone()),
            _ => transform_map(value, schema, s_args, dir),
        },

        Prim::pair => transform_pair(value, schema, s_args, dir),

        Prim::or => match (value, s_args) {
            (
                Micheline::App {
                    prim: branch @ (Prim::Left | Prim::Right),
                    args,
                    ..
                },
                [s_left, s_right],
            ) if args.len() == 1 => {
                let sub_schema = if *branch == Prim::Left { s_left } else { s_right };
                Ok(Micheline::app(
                    *branch,
                    vec![transform(&args[0], sub_schema, dir)?],
                ))
            }
            _ => Err(PackError::mismatch(value, schema)),
        },

        Prim::lambda => match value {
            Micheline::Seq(_) => transform_instr(value, dir),
            _ => Err(PackError::mismatch(value, schema)),
        },

        Prim::address | Prim::contract => transform_address(value, schema, dir),
        Prim::key_hash => transform_leaf(
            value,
            schema,
            dir,
            |s| Ok(KeyHash::from_base58(s)?.to_bytes()),
            |b| Ok(KeyHash::try_decode::<_, crate::parse::byteparser::ByteParser>(b.to_vec())?.to_base58()),
        ),
        Prim::key => transform_leaf(
            value,
            schema,
            dir,
            |s| Ok(PublicKey::from_base58(s)?.to_bytes()),
            |b| Ok(PublicKey::try_decode::<_, crate::parse::byteparser::ByteParser>(b.to_vec())?.to_base58()),
        ),
        Prim::signature => transform_leaf(
            value,
            schema,
            dir,
            |s| Ok(Signature::from_base58(s)?.to_bytes()),
            |b| Ok(Signature::try_decode::<_, crate::parse::byteparser::ByteParser>(b.to_vec())?.to_base58()),
        ),
        Prim::chain_id => transform_leaf(
            value,
            schema,
            dir,
            |s| Ok(ChainId::from_base58(s)?.to_bytes()),
            |b| Ok(ChainId::try_decode::<_, crate::parse::byteparser::ByteParser>(b.to_vec())?.to_base58()),
        ),

        Prim::timestamp => transform_timestamp(value, dir),

        _ => Ok(value.clone()),
    }
}

fn transform_map(
    value: &Micheline,
    schema: &Micheline,
    s_args: &[Micheline],
    dir: Rewrite,
) -> Result<Micheline, PackError> {
    let (items, key_schema, value_schema) = match (value, s_args) {
        (Micheline::Seq(items), [k, v]) => (items, k, v),
        _ => return Err(PackError::mismatch(value, schema)),
    };
    let rewritten = items
        .iter()
        .map(|item| match item {
            Micheline::App {
                prim: Prim::Elt,
                args,
                ..
            } if args.len() == 2 => Ok(Micheline::elt(
                transform(&args[0], key_schema, dir)?,
                transform(&args[1], value_schema, dir)?,
            )),
            _ => Err(PackError::mismatch(item, schema)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Micheline::Seq(rewritten))
}

/// Right-combs a flat component list into nested binary `Pair`/`pair`
/// applications.
fn comb(prim: Prim, components: &[Micheline]) -> Micheline {
    match components {
        [lhs, rhs] => Micheline::app(prim, vec![lhs.clone(), rhs.clone()]),
        [head, tail @ ..] => {
            Micheline::app(prim, vec![head.clone(), comb(prim, tail)])
        }
        _ => unreachable!("comb is only called with two or more components"),
    }
}

fn transform_pair(
    value: &Micheline,
    schema: &Micheline,
    s_args: &[Micheline],
    dir: Rewrite,
) -> Result<Micheline, PackError> {
    // a flat sequence of components is an accepted spelling of a tuple
    let components: &[Micheline] = match value {
        Micheline::Seq(items) => items,
        Micheline::App {
            prim: Prim::Pair,
            args,
            ..
        } => args,
        _ => return Err(PackError::mismatch(value, schema)),
    };
    if components.len() < 2 || s_args.len() < 2 {
        return Err(PackError::mismatch(value, schema));
    }

    if components.len() == 2 && s_args.len() == 2 {
        Ok(Micheline::pair(
            transform(&components[0], &s_args[0], dir)?,
            transform(&components[1], &s_args[1], dir)?,
        ))
    } else {
        // normalize both sides into binary right-combed shape, then retry
        let combed_value = comb(Prim::Pair, components);
        let combed_schema = comb(Prim::pair, s_args);
        transform(&combed_value, &combed_schema, dir)
    }
}

fn transform_address(
    value: &Micheline,
    schema: &Micheline,
    dir: Rewrite,
) -> Result<Micheline, PackError> {
    match (dir, value) {
        (Rewrite::Pack, Micheline::String(s)) => Ok(Micheline::Bytes(
            Address::from_base58(s)?.to_packed_bytes(),
        )),
        (Rewrite::Pack, Micheline::Bytes(_)) => Ok(value.clone()),
        (Rewrite::Unpack, Micheline::Bytes(b)) => Ok(Micheline::String(
            Address::from_packed_bytes(b)?.to_base58(),
        )),
        (Rewrite::Unpack, Micheline::String(_)) => Ok(value.clone()),
        _ => Err(PackError::mismatch(value, schema)),
    }
}

fn transform_leaf(
    value: &Micheline,
    schema: &Micheline,
    dir: Rewrite,
    to_bytes: impl Fn(&str) -> Result<Vec<u8>, PackError>,
    to_string: impl Fn(&[u8]) -> Result<String, PackError>,
) -> Result<Micheline, PackError> {
    match (dir, value) {
        (Rewrite::Pack, Micheline::String(s)) => Ok(Micheline::Bytes(to_bytes(s)?)),
        (Rewrite::Pack, Micheline::Bytes(_)) => Ok(value.clone()),
        (Rewrite::Unpack, Micheline::Bytes(b)) => Ok(Micheline::String(to_string(b)?)),
        (Rewrite::Unpack, Micheline::String(_)) => Ok(value.clone()),
        _ => Err(PackError::mismatch(value, schema)),
    }
}

fn transform_timestamp(value: &Micheline, dir: Rewrite) -> Result<Micheline, PackError> {
    match (dir, value) {
        (Rewrite::Pack, Micheline::String(s)) => {
            Ok(Micheline::int(timestamp::millis_of_rfc3339(s)?))
        }
        (Rewrite::Pack, Micheline::Int(_)) => Ok(value.clone()),
        (Rewrite::Unpack, Micheline::Int(z)) => {
            let millis = i64::try_from(z.clone())
                .map_err(|_| PackError::Timestamp(TimestampError::OutOfRange(i64::MAX)))?;
            Ok(Micheline::String(timestamp::rfc3339_of_millis(millis)?))
        }
        (Rewrite::Unpack, Micheline::String(_)) => Ok(value.clone()),
        _ => Err(PackError::mismatch(
            value,
            &Micheline::prim(Prim::timestamp),
        )),
    }
}

/// Instruction-sequence rewrite for `lambda` payloads.
///
/// The nested-code argument of each opcode is located positionally
/// (`MAP`/`ITER`/`LOOP`/`LOOP_LEFT` -> 0, `LAMBDA`/`CREATE_CONTRACT` -> 2,
/// `DIP` -> last); conditionals rewrite both branches. `PUSH` is the one
/// place a schema is discovered inside a value: its first argument types
/// its second.
fn transform_instr(node: &Micheline, dir: Rewrite) -> Result<Micheline, PackError> {
    match node {
        Micheline::Seq(items) => {
            let rewritten = items
                .iter()
                .map(|item| transform_instr(item, dir))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Micheline::Seq(rewritten))
        }
        Micheline::App { prim, args, annots } => {
            let mut args = args.clone();
            match prim {
                Prim::MAP | Prim::ITER | Prim::LOOP | Prim::LOOP_LEFT => {
                    rewrite_code_arg(&mut args, 0, dir)?;
                }
                Prim::LAMBDA | Prim::CREATE_CONTRACT => {
                    rewrite_code_arg(&mut args, 2, dir)?;
                }
                Prim::DIP => {
                    if !args.is_empty() {
                        let last = args.len() - 1;
                        rewrite_code_arg(&mut args, last, dir)?;
                    }
                }
                Prim::IF | Prim::IF_NONE | Prim::IF_CONS | Prim::IF_LEFT => {
                    rewrite_code_arg(&mut args, 0, dir)?;
                    rewrite_code_arg(&mut args, 1, dir)?;
                }
                Prim::PUSH => {
                    if args.len() == 2 {
                        let schema = args[0].clone();
                        args[1] = transform(&args[1], &schema, dir)?;
                    }
                }
                _ => {}
            }
            Ok(Micheline::App {
                prim: *prim,
                args,
                annots: annots.clone(),
            })
        }
        _ => Ok(node.clone()),
    }
}

fn rewrite_code_arg(
    args: &mut [Micheline],
    index: usize,
    dir: Rewrite,
) -> Result<(), PackError> {
    if let Some(arg) = args.get_mut(index) {
        *arg = transform_instr(arg, dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::ContractId;
    use crate::hexstring::util::hex_of_bytes;
    use crate::michelson::{IntoMicheline, Type, TypeNode};

    fn schema(node: TypeNode) -> Micheline {
        Type::new(node).into_micheline()
    }

    #[test]
    fn schemaless_pack_is_raw_codec() {
        assert_eq!(
            hex_of_bytes(&pack(&Micheline::int(0), None).unwrap()),
            "050000"
        );
        assert_eq!(
            unpack(&crate::hex!("050000").into_vec(), None).unwrap(),
            Micheline::int(0)
        );
    }

    #[test]
    fn pair_of_nat_and_string() {
        let sch = schema(TypeNode::Pair(vec![
            Type::new(TypeNode::Nat),
            Type::new(TypeNode::String),
        ]));
        let value = Micheline::pair(Micheline::int(1), Micheline::string("x"));
        let bytes = pack(&value, Some(&sch)).unwrap();
        assert_eq!(hex_of_bytes(&bytes), "0507070001010000000178");
        assert_eq!(unpack(&bytes, Some(&sch)).unwrap(), value);
    }

    #[test]
    fn flat_sequence_normalized_to_comb() {
        let sch = schema(TypeNode::Pair(vec![
            Type::new(TypeNode::Nat),
            Type::new(TypeNode::Nat),
            Type::new(TypeNode::Nat),
        ]));
        let flat = Micheline::seq(vec![
            Micheline::int(1),
            Micheline::int(2),
            Micheline::int(3),
        ]);
        let combed = Micheline::pair(
            Micheline::int(1),
            Micheline::pair(Micheline::int(2), Micheline::int(3)),
        );
        assert_eq!(
            pack(&flat, Some(&sch)).unwrap(),
            pack(&combed, Some(&sch)).unwrap()
        );
        // the readable form recovered from binary is the combed spelling
        assert_eq!(
            unpack(&pack(&flat, Some(&sch)).unwrap(), Some(&sch)).unwrap(),
            combed
        );
    }

    #[test]
    fn address_string_becomes_bytes() {
        let sch = schema(TypeNode::Address);
        let address = Address::plain(ContractId::Implicit(crate::crypto::KeyHash::Ed25519(
            [0xab; 20],
        )));
        let value = Micheline::string(address.to_base58());

        let packed = pack(&value, Some(&sch)).unwrap();
        // 0x05, bytes literal tag, 4-byte length 22, tag 0 implicit, tag 0 ed25519
        assert!(hex_of_bytes(&packed).starts_with("050a000000160000abab"));
        assert_eq!(unpack(&packed, Some(&sch)).unwrap(), value);
    }

    #[test]
    fn address_keeps_entrypoint_suffix() {
        let sch = schema(TypeNode::Address);
        let address = Address {
            contract: ContractId::Originated(crate::crypto::ContractHash::new([0x10; 20])),
            entrypoint: Some("do_it".to_owned()),
        };
        let value = Micheline::string(address.to_base58());
        let roundtrip = unpack(&pack(&value, Some(&sch)).unwrap(), Some(&sch)).unwrap();
        assert_eq!(roundtrip, value);
    }

    #[test]
    fn timestamp_string_becomes_epoch_millis() {
        let sch = schema(TypeNode::Timestamp);
        let value = Micheline::string("1970-01-01T00:00:01Z");
        let packed = pack(&value, Some(&sch)).unwrap();
        // int literal 1000 = zarith e80f... (0x05 0x00 then zarith of 1000)
        assert_eq!(
            unpack(&packed, Some(&sch)).unwrap(),
            Micheline::string("1970-01-01T00:00:01Z")
        );
        assert_eq!(packed[1], 0x00, "timestamp must pack as an int literal");
    }

    #[test]
    fn or_direction_drives_sub_schema() {
        let sch = schema(TypeNode::Or(
            Box::new(Type::new(TypeNode::Timestamp)),
            Box::new(Type::new(TypeNode::Nat)),
        ));
        let left = Micheline::left(Micheline::string("1970-01-01T00:00:00Z"));
        let right = Micheline::right(Micheline::int(5));

        let left_packed = pack(&left, Some(&sch)).unwrap();
        let right_packed = pack(&right, Some(&sch)).unwrap();
        assert_eq!(unpack(&left_packed, Some(&sch)).unwrap(), left);
        assert_eq!(unpack(&right_packed, Some(&sch)).unwrap(), right);
    }

    #[test]
    fn big_map_reference_untouched() {
        let sch = schema(TypeNode::BigMap(
            Box::new(Type::new(TypeNode::String)),
            Box::new(Type::new(TypeNode::Nat)),
        ));
        let reference = Micheline::int(123);
        assert_eq!(
            unpack(&pack(&reference, Some(&sch)).unwrap(), Some(&sch)).unwrap(),
            reference
        );
    }

    #[test]
    fn map_entries_rewritten_pairwise() {
        let sch = schema(TypeNode::Map(
            Box::new(Type::new(TypeNode::String)),
            Box::new(Type::new(TypeNode::Timestamp)),
        ));
        let value = Micheline::seq(vec![Micheline::elt(
            Micheline::string("genesis"),
            Micheline::string("1970-01-01T00:00:00Z"),
        )]);
        assert_eq!(
            unpack(&pack(&value, Some(&sch)).unwrap(), Some(&sch)).unwrap(),
            value
        );
    }

    #[test]
    fn lambda_push_uses_inline_schema() {
        let sch = schema(TypeNode::Lambda(
            Box::new(Type::new(TypeNode::Unit)),
            Box::new(Type::new(TypeNode::Address)),
        ));
        let address = Address::plain(ContractId::Implicit(crate::crypto::KeyHash::P256(
            [0x77; 20],
        )));
        let code = Micheline::seq(vec![
            Micheline::prim(Prim::DROP),
            Micheline::app(
                Prim::PUSH,
                vec![
                    Micheline::prim(Prim::address),
                    Micheline::string(address.to_base58()),
                ],
            ),
        ]);
        let packed = pack(&code, Some(&sch)).unwrap();
        let readable = unpack(&packed, Some(&sch)).unwrap();
        assert_eq!(readable, code);

        // inside the packed form, the PUSH argument is a byte literal
        let raw = unpack(&packed, None).unwrap();
        let push = &raw.as_seq().unwrap()[1];
        assert!(matches!(
            push.args_of().unwrap()[1],
            Micheline::Bytes(_)
        ));
    }

    #[test]
    fn shape_mismatch_is_fatal() {
        let sch = schema(TypeNode::Option(Box::new(Type::new(TypeNode::Nat))));
        let err = pack(&Micheline::int(3), Some(&sch)).unwrap_err();
        assert!(matches!(err, PackError::ShapeMismatch { .. }));
    }

    #[test]
    fn truncated_buffer_rejected() {
        let sch = schema(TypeNode::Nat);
        let mut bytes = pack(&Micheline::int(1_000_000), Some(&sch)).unwrap();
        bytes.pop();
        assert!(matches!(
            unpack(&bytes, Some(&sch)),
            Err(PackError::Decode(_))
        ));
        assert!(matches!(
            unpack(&[], Some(&sch)),
            Err(PackError::MissingPackTag)
        ));
    }
}

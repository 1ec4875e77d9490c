//! Binary codec for the untyped expression tree
//!
//! The node-level layout is a one-byte shape tag followed by the node
//! payload:
//!
//! | tag | shape |
//! |-----|-------|
//! | `0x00` | integer literal (zarith) |
//! | `0x01` | string literal (dynamic) |
//! | `0x02` | sequence (dynamic payload of concatenated nodes) |
//! | `0x03` | primitive, 0 args, no annotations |
//! | `0x04` | primitive, 0 args, annotations |
//! | `0x05` | primitive, 1 arg, no annotations |
//! | `0x06` | primitive, 1 arg, annotations |
//! | `0x07` | primitive, 2 args, no annotations |
//! | `0x08` | primitive, 2 args, annotations |
//! | `0x09` | primitive, n args (dynamic arg payload), annotations always |
//! | `0x0a` | byte literal (dynamic) |
//!
//! Primitive names are encoded as their one-byte index into the protocol
//! table; annotations are space-joined into a single dynamic string. The
//! `0x09` shape writes its annotation field unconditionally, even when
//! empty, and is only produced for arities outside `0..=2`.

use super::prim::Prim;
use super::Micheline;
use crate::conv::target::Target;
use crate::conv::{Decode, Encode};
use crate::dynamic::{parse_dynamic_bytes, write_dynamic_bytes};
use crate::parse::error::TagError;
use crate::parse::{ParseResult, Parser};
use crate::zarith::z::Z;

const TAG_INT: u8 = 0x00;
const TAG_STRING: u8 = 0x01;
const TAG_SEQ: u8 = 0x02;
const TAG_PRIM_0: u8 = 0x03;
const TAG_PRIM_0_ANNOTS: u8 = 0x04;
const TAG_PRIM_1: u8 = 0x05;
const TAG_PRIM_1_ANNOTS: u8 = 0x06;
const TAG_PRIM_2: u8 = 0x07;
const TAG_PRIM_2_ANNOTS: u8 = 0x08;
const TAG_PRIM_N: u8 = 0x09;
const TAG_BYTES: u8 = 0x0a;

const NODE_TAGS: [u8; 11] = [
    TAG_INT,
    TAG_STRING,
    TAG_SEQ,
    TAG_PRIM_0,
    TAG_PRIM_0_ANNOTS,
    TAG_PRIM_1,
    TAG_PRIM_1_ANNOTS,
    TAG_PRIM_2,
    TAG_PRIM_2_ANNOTS,
    TAG_PRIM_N,
    TAG_BYTES,
];

fn write_annots<U: Target>(buf: &mut U, annots: &[String]) -> usize {
    let joined = annots.join(" ");
    write_dynamic_bytes(buf, joined.as_bytes())
}

fn parse_annots<P: Parser>(p: &mut P) -> ParseResult<Vec<String>> {
    let raw = parse_dynamic_bytes(p)?;
    let joined = String::from_utf8(raw)?;
    Ok(joined.split_whitespace().map(str::to_owned).collect())
}

fn write_prim_name<U: Target>(buf: &mut U, prim: Prim) -> usize {
    buf.push_one(prim.tag())
}

fn parse_prim_name<P: Parser>(p: &mut P) -> ParseResult<Prim> {
    let tag = p.consume_byte()?;
    Prim::from_tag(tag)
        .ok_or_else(|| TagError::with_type::<Prim>(tag, Option::None).into())
}

impl Encode for Micheline {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        match self {
            Micheline::Int(z) => buf.push_one(TAG_INT) + z.write_to(buf),
            Micheline::String(s) => {
                buf.push_one(TAG_STRING) + write_dynamic_bytes(buf, s.as_bytes())
            }
            Micheline::Bytes(b) => buf.push_one(TAG_BYTES) + write_dynamic_bytes(buf, b),
            Micheline::Seq(items) => {
                let mut payload: Vec<u8> = Vec::new();
                for item in items {
                    item.write_to_vec(&mut payload);
                }
                buf.push_one(TAG_SEQ) + write_dynamic_bytes(buf, &payload)
            }
            Micheline::App { prim, args, annots } => match (args.len(), annots.is_empty()) {
                (0, true) => buf.push_one(TAG_PRIM_0) + write_prim_name(buf, *prim),
                (0, false) => {
                    buf.push_one(TAG_PRIM_0_ANNOTS)
                        + write_prim_name(buf, *prim)
                        + write_annots(buf, annots)
                }
                (1, true) => {
                    buf.push_one(TAG_PRIM_1)
                        + write_prim_name(buf, *prim)
                        + args[0].write_to(buf)
                }
                (1, false) => {
                    buf.push_one(TAG_PRIM_1_ANNOTS)
                        + write_prim_name(buf, *prim)
                        + args[0].write_to(buf)
                        + write_annots(buf, annots)
                }
                (2, true) => {
                    buf.push_one(TAG_PRIM_2)
                        + write_prim_name(buf, *prim)
                        + args[0].write_to(buf)
                        + args[1].write_to(buf)
                }
                (2, false) => {
                    buf.push_one(TAG_PRIM_2_ANNOTS)
                        + write_prim_name(buf, *prim)
                        + args[0].write_to(buf)
                        + args[1].write_to(buf)
                        + write_annots(buf, annots)
                }
                _ => {
                    let mut payload: Vec<u8> = Vec::new();
                    for arg in args {
                        arg.write_to_vec(&mut payload);
                    }
                    buf.push_one(TAG_PRIM_N)
                        + write_prim_name(buf, *prim)
                        + write_dynamic_bytes(buf, &payload)
                        + write_annots(buf, annots)
                }
            },
        }
    }
}

impl Decode for Micheline {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        match p.take_tagword::<Micheline>(&NODE_TAGS)? {
            TAG_INT => Ok(Micheline::Int(Z::parse(p)?)),
            TAG_STRING => {
                let raw = parse_dynamic_bytes(p)?;
                Ok(Micheline::String(String::from_utf8(raw)?))
            }
            TAG_BYTES => Ok(Micheline::Bytes(parse_dynamic_bytes(p)?)),
            TAG_SEQ => {
                let len = p.take_u32()? as usize;
                p.set_fit(len)?;
                let mut items = Vec::new();
                while !p.test_target()? {
                    items.push(Micheline::parse(p)?);
                }
                p.enforce_target()?;
                Ok(Micheline::Seq(items))
            }
            TAG_PRIM_0 => Ok(Micheline::prim(parse_prim_name(p)?)),
            TAG_PRIM_0_ANNOTS => {
                let prim = parse_prim_name(p)?;
                let annots = parse_annots(p)?;
                Ok(Micheline::app_annot(prim, vec![], annots))
            }
            TAG_PRIM_1 => {
                let prim = parse_prim_name(p)?;
                let arg = Micheline::parse(p)?;
                Ok(Micheline::app(prim, vec![arg]))
            }
            TAG_PRIM_1_ANNOTS => {
                let prim = parse_prim_name(p)?;
                let arg = Micheline::parse(p)?;
                let annots = parse_annots(p)?;
                Ok(Micheline::app_annot(prim, vec![arg], annots))
            }
            TAG_PRIM_2 => {
                let prim = parse_prim_name(p)?;
                let lhs = Micheline::parse(p)?;
                let rhs = Micheline::parse(p)?;
                Ok(Micheline::app(prim, vec![lhs, rhs]))
            }
            TAG_PRIM_2_ANNOTS => {
                let prim = parse_prim_name(p)?;
                let lhs = Micheline::parse(p)?;
                let rhs = Micheline::parse(p)?;
                let annots = parse_annots(p)?;
                Ok(Micheline::app_annot(prim, vec![lhs, rhs], annots))
            }
            TAG_PRIM_N => {
                let prim = parse_prim_name(p)?;
                let arg_len = p.take_u32()? as usize;
                p.set_fit(arg_len)?;
                let mut args = Vec::new();
                while !p.test_target()? {
                    args.push(Micheline::parse(p)?);
                }
                p.enforce_target()?;
                let annots = parse_annots(p)?;
                Ok(Micheline::app_annot(prim, args, annots))
            }
            _ => unreachable!(),
        }
    }
}

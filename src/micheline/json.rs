//! Canonical JSON form of the untyped tree (feature `serde_impls`)
//!
//! The RPC interface exchanges Micheline as JSON: `{"int": "…"}`,
//! `{"string": "…"}`, `{"bytes": "<hex>"}`,
//! `{"prim": "…", "args": […], "annots": […]}` with `args`/`annots`
//! omitted when empty, and sequences as plain arrays. These
//! implementations are hand-written rather than derived because the
//! encoding is externally fixed and none of serde's derive shapes match
//! it.

use super::prim::Prim;
use super::Micheline;
use crate::hexstring::util::{bytes_of_hex, hex_of_bytes};
use crate::zarith::z::Z;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::str::FromStr;

impl Serialize for Micheline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Micheline::Int(z) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("int", &z.to_string())?;
                map.end()
            }
            Micheline::String(s) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("string", s)?;
                map.end()
            }
            Micheline::Bytes(b) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("bytes", &hex_of_bytes(b))?;
                map.end()
            }
            Micheline::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Micheline::App { prim, args, annots } => {
                let entries =
                    1 + usize::from(!args.is_empty()) + usize::from(!annots.is_empty());
                let mut map = serializer.serialize_map(Some(entries))?;
                map.serialize_entry("prim", prim.name())?;
                if !args.is_empty() {
                    map.serialize_entry("args", args)?;
                }
                if !annots.is_empty() {
                    map.serialize_entry("annots", annots)?;
                }
                map.end()
            }
        }
    }
}

struct MichelineVisitor;

impl<'de> Visitor<'de> for MichelineVisitor {
    type Value = Micheline;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a Micheline node object or sequence")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = access.next_element::<Micheline>()? {
            items.push(item);
        }
        Ok(Micheline::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut int: Option<String> = None;
        let mut string: Option<String> = None;
        let mut bytes: Option<String> = None;
        let mut prim: Option<String> = None;
        let mut args: Option<Vec<Micheline>> = None;
        let mut annots: Option<Vec<String>> = None;

        while let Some(key) = access.next_key::<String>()? {
            match key.as_str() {
                "int" => int = Some(access.next_value()?),
                "string" => string = Some(access.next_value()?),
                "bytes" => bytes = Some(access.next_value()?),
                "prim" => prim = Some(access.next_value()?),
                "args" => args = Some(access.next_value()?),
                "annots" => annots = Some(access.next_value()?),
                other => {
                    return Err(de::Error::unknown_field(
                        other,
                        &["int", "string", "bytes", "prim", "args", "annots"],
                    ))
                }
            }
        }

        match (int, string, bytes, prim) {
            (Some(digits), None, None, None) => {
                let z = Z::from_str(&digits)
                    .map_err(|_| de::Error::custom("invalid integer literal"))?;
                Ok(Micheline::Int(z))
            }
            (None, Some(s), None, None) => Ok(Micheline::String(s)),
            (None, None, Some(hex), None) => {
                let raw = bytes_of_hex(&hex)
                    .map_err(|_| de::Error::custom("invalid byte literal"))?;
                Ok(Micheline::Bytes(raw))
            }
            (None, None, None, Some(name)) => {
                let prim = Prim::from_name(&name)
                    .ok_or_else(|| de::Error::custom("unknown primitive name"))?;
                Ok(Micheline::App {
                    prim,
                    args: args.unwrap_or_default(),
                    annots: annots.unwrap_or_default(),
                })
            }
            _ => Err(de::Error::custom(
                "node must carry exactly one of int/string/bytes/prim",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Micheline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MichelineVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn roundtrip(value: &Micheline) -> Micheline {
        let rendered = serde_json::to_string(value).unwrap();
        serde_json::from_str(&rendered).unwrap()
    }

    #[test]
    fn literal_rendering() {
        assert_eq!(
            serde_json::to_string(&Micheline::int(-7)).unwrap(),
            r#"{"int":"-7"}"#
        );
        assert_eq!(
            serde_json::to_string(&Micheline::bytes(vec![0xca, 0xfe])).unwrap(),
            r#"{"bytes":"cafe"}"#
        );
    }

    #[test]
    fn prim_rendering_omits_empty_fields() {
        assert_eq!(
            serde_json::to_string(&Micheline::unit()).unwrap(),
            r#"{"prim":"Unit"}"#
        );
        let annotated = Micheline::app_annot(
            Prim::pair,
            vec![Micheline::prim(Prim::nat)],
            vec!["%x".to_owned()],
        );
        assert_eq!(
            serde_json::to_string(&annotated).unwrap(),
            r#"{"prim":"pair","args":[{"prim":"nat"}],"annots":["%x"]}"#
        );
    }

    #[test]
    fn nested_roundtrip() {
        let value = Micheline::seq(vec![
            Micheline::pair(Micheline::int(1), Micheline::string("x")),
            Micheline::some(Micheline::bytes(vec![0x00, 0x01])),
        ]);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn malformed_nodes_rejected() {
        assert!(serde_json::from_str::<Micheline>(r#"{"prim":"NotAPrim"}"#).is_err());
        assert!(serde_json::from_str::<Micheline>(r#"{"int":"1","string":"x"}"#).is_err());
        assert!(serde_json::from_str::<Micheline>(r#"{"bytes":"zz"}"#).is_err());
    }
}

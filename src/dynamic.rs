//! Length-prefixed ("dynamic") framing helpers
//!
//! Every variable-length composite in the wire formats handled by this
//! crate — strings, byte blobs, sequence payloads, inlined consensus
//! operations, block headers, script fields — is framed as a 4-byte
//! big-endian length followed by exactly that many bytes, with no
//! separators. These helpers centralize the two halves of that contract:
//! writing the prefix from the serialized payload, and opening a
//! context-window of the declared width on decode so that over- and
//! under-runs are detected at the frame boundary.

use crate::conv::target::Target;
use crate::conv::{Decode, Encode};
use crate::parse::{ParseResult, Parser};

/// Serializes `item` and appends it to `buf` behind a 4-byte big-endian
/// length prefix.
///
/// # Panics
///
/// Panics if the serialized payload exceeds `u32::MAX` bytes, which no
/// protocol-legal value can.
pub fn write_dynamic<U: Target, T: Encode + ?Sized>(buf: &mut U, item: &T) -> usize {
    let payload = item.to_bytes();
    write_dynamic_bytes(buf, &payload)
}

/// Appends a raw payload to `buf` behind a 4-byte big-endian length prefix.
///
/// # Panics
///
/// Panics if the payload exceeds `u32::MAX` bytes.
pub fn write_dynamic_bytes<U: Target>(buf: &mut U, payload: &[u8]) -> usize {
    let len: u32 = match payload.len().try_into() {
        Ok(l) => l,
        Err(_) => panic!(
            "dynamic frame payload of {} bytes exceeds 4-byte length prefix",
            payload.len()
        ),
    };
    buf.anticipate(payload.len() + 4);
    buf.push_many(len.to_be_bytes()) + buf.push_all(payload)
}

/// Consumes a 4-byte length prefix and parses a `T` from exactly that many
/// following bytes.
///
/// The declared width is enforced in both directions: a frame that extends
/// past the enclosing window fails at window-open time, and a parse that
/// leaves residue inside the frame fails at window-close time.
pub fn parse_dynamic<P: Parser, T: Decode>(p: &mut P) -> ParseResult<T> {
    let len = p.take_u32()? as usize;
    p.set_fit(len)?;
    let contents = T::parse(p)?;
    p.enforce_target()?;
    Ok(contents)
}

/// Consumes a 4-byte length prefix and returns exactly that many raw bytes.
pub fn parse_dynamic_bytes<P: Parser>(p: &mut P) -> ParseResult<Vec<u8>> {
    let len = p.take_u32()? as usize;
    p.take_dynamic(len)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hexstring::HexString;
    use crate::parse::byteparser::ByteParser;
    use crate::parse::TryIntoParser;

    #[test]
    fn frame_roundtrip() {
        let mut buf = HexString::new();
        write_dynamic_bytes(&mut buf, &[0xab, 0xcd]);
        assert_eq!(buf.to_hex(), "00000002abcd");

        let mut p: ByteParser = buf.try_into_parser().unwrap();
        assert_eq!(parse_dynamic_bytes(&mut p).unwrap(), vec![0xab, 0xcd]);
    }

    #[test]
    fn overlong_frame_rejected() {
        let mut p: ByteParser = crate::hex!("00000003abcd").try_into_parser().unwrap();
        assert!(parse_dynamic::<_, Vec<u8>>(&mut p).is_err());
    }
}

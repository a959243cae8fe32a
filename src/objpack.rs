//! Minimal object-packing codec.
//!
//! Saltpack headers and packets are small value trees built from nil,
//! booleans, small/fixed-width integers, byte strings, UTF-8 strings and
//! arrays — exactly the shape MessagePack's fixed encodings were built
//! for. This module is a thin, byte-exact seam over [`rmpv`] rather than
//! a general-purpose MessagePack façade: the rest of the crate only ever
//! builds and consumes [`Value`] trees shaped like §3 of the header/packet
//! layout, never maps, floats or extension types.
//!
//! Two properties matter more than convenience here:
//!
//! - `encode` is canonical: the same tree always serializes to the same
//!   bytes, which is what header-hash binding depends on.
//! - `decode_one` reports exactly how many bytes it consumed, so callers
//!   can slice the *original* input to get the canonical header bytes
//!   instead of re-encoding the parsed value (re-encoding is not
//!   guaranteed to round-trip and would be a latent interop bug).

use std::io::{Cursor, Read};

use rmpv::Value;

use crate::error::{Error, Result};

/// Encode a value tree to its canonical object-packing bytes.
#[must_use]
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, value).expect("writing to a Vec<u8> cannot fail");
    buf
}

/// Decode exactly one top-level value from the start of `bytes`.
///
/// Returns the parsed value and the number of bytes consumed. Trailing
/// bytes (e.g. subsequent packets) are left untouched.
///
/// # Errors
///
/// Returns `Error::MalformedHeader` if `bytes` does not begin with a
/// well-formed object-packing value.
pub fn decode_one(bytes: &[u8]) -> Result<(Value, usize)> {
    let mut cursor = Cursor::new(bytes);
    let value = rmpv::decode::read_value(&mut cursor)
        .map_err(|reason| Error::MalformedHeader(reason.to_string()))?;
    let consumed = usize::try_from(cursor.position()).expect("position fits usize on this platform");
    Ok((value, consumed))
}

/// Decode exactly one top-level value directly from a stream.
///
/// Returns `Ok(None)` at a clean end of stream (no bytes available
/// before the value would start). Used by the payload decoders, which
/// need to tell "no more packets" apart from "a packet that didn't parse".
///
/// # Errors
///
/// Returns `Error::Io` if the underlying read fails, and
/// `Error::MalformedHeader` if a value starts but does not parse.
pub fn decode_one_from_reader(reader: &mut dyn Read) -> Result<Option<Value>> {
    let mut first = [0u8; 1];
    let n = reader.read(&mut first)?;
    if n == 0 {
        return Ok(None);
    }
    let mut chained = Cursor::new(first).chain(reader);
    let value = rmpv::decode::read_value(&mut chained)
        .map_err(|reason| Error::MalformedHeader(reason.to_string()))?;
    Ok(Some(value))
}

/// Build a byte-string value.
#[must_use]
pub fn bin(bytes: &[u8]) -> Value {
    Value::Binary(bytes.to_vec())
}

/// Build a UTF-8 string value.
#[must_use]
pub fn str_(s: &str) -> Value {
    Value::String(s.into())
}

/// Build a small unsigned integer value.
#[must_use]
pub fn uint(n: u64) -> Value {
    Value::Integer(n.into())
}

/// Build an array value.
#[must_use]
pub fn array(items: Vec<Value>) -> Value {
    Value::Array(items)
}

/// Extract a byte string, if `value` is one.
#[must_use]
pub fn as_bin(value: &Value) -> Option<&[u8]> {
    match value {
        Value::Binary(b) => Some(b.as_slice()),
        _ => None,
    }
}

/// Extract an array slice, if `value` is one.
#[must_use]
pub fn as_array(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) => Some(items.as_slice()),
        _ => None,
    }
}

/// Extract an unsigned integer, if `value` is one and fits in `u64`.
#[must_use]
pub fn as_uint(value: &Value) -> Option<u64> {
    value.as_u64()
}

/// Extract a UTF-8 string, if `value` is one.
#[must_use]
pub fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

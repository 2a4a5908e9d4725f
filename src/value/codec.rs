//! Native byte order encoding of numeric payloads.
//!
//! The interpreter runs on the same machine as the host, so raw payloads
//! use the platform's native byte order on both sides.

use super::{ArrayData, ElementKind, Value};

fn decode_vec<T, const N: usize>(bytes: &[u8], from_bytes: fn([u8; N]) -> T) -> Vec<T> {
    bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut buf = [0u8; N];
            buf.copy_from_slice(chunk);
            from_bytes(buf)
        })
        .collect()
}

/// Decode a raw payload into a flat buffer of `kind` elements.
///
/// Trailing bytes that do not fill a whole element are ignored; callers
/// size payloads from the element width so this only happens on a short read.
#[must_use]
pub fn decode(kind: ElementKind, bytes: &[u8]) -> ArrayData {
    match kind {
        ElementKind::Int8 => ArrayData::Int8(decode_vec(bytes, i8::from_ne_bytes)),
        ElementKind::Int16 => ArrayData::Int16(decode_vec(bytes, i16::from_ne_bytes)),
        ElementKind::Int32 => ArrayData::Int32(decode_vec(bytes, i32::from_ne_bytes)),
        ElementKind::Int64 => ArrayData::Int64(decode_vec(bytes, i64::from_ne_bytes)),
        ElementKind::Float32 => ArrayData::Float32(decode_vec(bytes, f32::from_ne_bytes)),
        ElementKind::Float64 => ArrayData::Float64(decode_vec(bytes, f64::from_ne_bytes)),
    }
}

/// Encode a flat buffer as a raw payload.
#[must_use]
pub fn encode(data: &ArrayData) -> Vec<u8> {
    match data {
        ArrayData::Int8(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
        ArrayData::Int16(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
        ArrayData::Int32(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
        ArrayData::Int64(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
        ArrayData::Float32(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
        ArrayData::Float64(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
    }
}

/// Decode a real scalar of `kind` from exactly `kind.width()` bytes.
///
/// Returns `None` if `bytes` is too short.
#[must_use]
pub fn decode_scalar(kind: ElementKind, bytes: &[u8]) -> Option<Value> {
    let value = match decode(kind, bytes) {
        ArrayData::Int8(v) => Value::Int8(*v.first()?),
        ArrayData::Int16(v) => Value::Int16(*v.first()?),
        ArrayData::Int32(v) => Value::Int32(*v.first()?),
        ArrayData::Int64(v) => Value::Int64(*v.first()?),
        ArrayData::Float32(v) => Value::Float32(*v.first()?),
        ArrayData::Float64(v) => Value::Float64(*v.first()?),
    };
    Some(value)
}

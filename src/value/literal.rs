//! Julia source literals for scalar-shaped values.

use crate::protocol::INF_CONST;

use super::{ArrayData, NumericArray, Value};

/// Literal for a `Float64`, using the installed infinity constant.
#[must_use]
pub fn float64_literal(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 {
            INF_CONST.to_string()
        } else {
            format!("-{INF_CONST}")
        }
    } else {
        // Debug output is the shortest decimal that reads back to the same bits.
        format!("{v:?}")
    }
}

/// Literal for a `Float32`.
#[must_use]
pub fn float32_literal(v: f32) -> String {
    if v.is_nan() {
        "NaN32".to_string()
    } else if v.is_infinite() {
        if v > 0.0 {
            format!("Float32({INF_CONST})")
        } else {
            format!("-Float32({INF_CONST})")
        }
    } else {
        format!("Float32({:?})", f64::from(v))
    }
}

/// Raw string literal for `s`.
///
/// Inside `raw"…"` only quotes and the backslashes directly before a quote
/// (or before the closing quote) are special: a run of `n` backslashes
/// followed by a quote is written as `2n + 1` backslashes and the quote,
/// and a trailing run is doubled.
#[must_use]
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 6);
    out.push_str("raw\"");
    let mut backslashes = 0usize;
    for c in s.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                out.extend(std::iter::repeat('\\').take(2 * backslashes + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.extend(std::iter::repeat('\\').take(backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }
    out.extend(std::iter::repeat('\\').take(2 * backslashes));
    out.push('"');
    out
}

/// Literal for element `index` of `data`.
fn element_literal(data: &ArrayData, index: usize) -> Option<String> {
    let lit = match data {
        ArrayData::Int8(v) => format!("Int8({})", v.get(index)?),
        ArrayData::Int16(v) => format!("Int16({})", v.get(index)?),
        ArrayData::Int32(v) => format!("Int32({})", v.get(index)?),
        ArrayData::Int64(v) => format!("Int64({})", v.get(index)?),
        ArrayData::Float32(v) => float32_literal(*v.get(index)?),
        ArrayData::Float64(v) => float64_literal(*v.get(index)?),
    };
    Some(lit)
}

/// Literal for a boxed scalar (an array without dimensions).
fn boxed_scalar_literal(array: &NumericArray) -> Option<String> {
    if array.is_complex() {
        Some(format!(
            "{}({}, {})",
            array.element_kind().julia_type(true),
            element_literal(array.data(), 0)?,
            element_literal(array.data(), 1)?
        ))
    } else {
        element_literal(array.data(), 0)
    }
}

/// Source literal for a scalar-shaped value.
///
/// Returns `None` for arrays with dimensions, which are streamed instead.
#[must_use]
pub fn literal(value: &Value) -> Option<String> {
    let lit = match value {
        Value::Null => "nothing".to_string(),
        Value::Int8(v) => format!("Int8({v})"),
        Value::Int16(v) => format!("Int16({v})"),
        Value::Int32(v) => format!("Int32({v})"),
        Value::Int64(v) => format!("Int64({v})"),
        Value::Float32(v) => float32_literal(*v),
        Value::Float64(v) => float64_literal(*v),
        Value::String(s) => string_literal(s),
        Value::Expr(e) => e.as_str().to_string(),
        Value::Array(a) if a.is_scalar() => boxed_scalar_literal(a)?,
        Value::Array(_) => return None,
    };
    Some(lit)
}

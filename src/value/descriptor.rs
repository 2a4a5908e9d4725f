//! Parsing of runtime type descriptors printed by the interpreter.

use std::sync::OnceLock;

use regex::Regex;

use super::ElementKind;

/// Decode plan for a value, derived from its runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// `Nothing` or `Missing`.
    Null,
    String,
    Scalar { kind: ElementKind, is_complex: bool },
    Array {
        kind: ElementKind,
        is_complex: bool,
        ndims: usize,
    },
}

fn array_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Array\{(.+),\s*(\d+)\}$").expect("array descriptor pattern is valid")
    })
}

fn complex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Complex\{(\w+)\}$").expect("complex descriptor pattern is valid")
    })
}

/// Parse an element type, plain or `Complex{…}`.
fn parse_element(text: &str) -> Option<(ElementKind, bool)> {
    if let Some(caps) = complex_pattern().captures(text) {
        return ElementKind::from_julia_name(&caps[1]).map(|k| (k, true));
    }
    ElementKind::from_julia_name(text).map(|k| (k, false))
}

impl TypeDescriptor {
    /// Parse a descriptor line. Returns `None` when the type has no plan.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        match text {
            "Nothing" | "Missing" => return Some(TypeDescriptor::Null),
            "String" => return Some(TypeDescriptor::String),
            _ => {}
        }
        if let Some(caps) = array_pattern().captures(text) {
            let (kind, is_complex) = parse_element(caps[1].trim())?;
            let ndims = caps[2].parse().ok()?;
            return Some(TypeDescriptor::Array {
                kind,
                is_complex,
                ndims,
            });
        }
        parse_element(text).map(|(kind, is_complex)| TypeDescriptor::Scalar { kind, is_complex })
    }
}

/// Parse the first `ndims` integers out of a printed dims tuple such as
/// `(2, 3)` or `(4,)`.
///
/// Returns `None` if fewer than `ndims` integers are present or one fails
/// to parse.
#[must_use]
pub fn parse_dims(text: &str, ndims: usize) -> Option<Vec<usize>> {
    let inner = text.trim().trim_start_matches('(');
    let mut dims = Vec::with_capacity(ndims);
    for part in inner.split([',', ')']).map(str::trim) {
        if dims.len() == ndims {
            break;
        }
        if part.is_empty() {
            continue;
        }
        dims.push(part.parse().ok()?);
    }
    (dims.len() == ndims).then_some(dims)
}

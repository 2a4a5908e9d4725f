//! Host-side representation of values exchanged with Julia.

use std::fmt;

/// Primitive element type of a numeric value.
///
/// Each kind pairs a byte width with the Julia type keyword used when
/// declaring or describing it. Complex values are not a separate kind:
/// they reuse the kind of their real part and set an `is_complex` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl ElementKind {
    /// All kinds, narrowest integers first.
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Int8,
        ElementKind::Int16,
        ElementKind::Int32,
        ElementKind::Int64,
        ElementKind::Float32,
        ElementKind::Float64,
    ];

    /// Size of one element in bytes.
    #[must_use]
    pub fn width(self) -> usize {
        match self {
            ElementKind::Int8 => 1,
            ElementKind::Int16 => 2,
            ElementKind::Int32 | ElementKind::Float32 => 4,
            ElementKind::Int64 | ElementKind::Float64 => 8,
        }
    }

    /// Julia type keyword for this kind.
    #[must_use]
    pub fn julia_name(self) -> &'static str {
        match self {
            ElementKind::Int8 => "Int8",
            ElementKind::Int16 => "Int16",
            ElementKind::Int32 => "Int32",
            ElementKind::Int64 => "Int64",
            ElementKind::Float32 => "Float32",
            ElementKind::Float64 => "Float64",
        }
    }

    /// Look up a kind by its Julia type keyword.
    #[must_use]
    pub fn from_julia_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.julia_name() == name)
    }

    /// Julia element type, wrapped in `Complex{…}` when `is_complex` is set.
    #[must_use]
    pub fn julia_type(self, is_complex: bool) -> String {
        if is_complex {
            format!("Complex{{{}}}", self.julia_name())
        } else {
            self.julia_name().to_string()
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.julia_name())
    }
}

/// Flat element buffer of a [`NumericArray`], one variant per element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl ArrayData {
    /// Element kind stored in this buffer.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            ArrayData::Int8(_) => ElementKind::Int8,
            ArrayData::Int16(_) => ElementKind::Int16,
            ArrayData::Int32(_) => ElementKind::Int32,
            ArrayData::Int64(_) => ElementKind::Int64,
            ArrayData::Float32(_) => ElementKind::Float32,
            ArrayData::Float64(_) => ElementKind::Float64,
        }
    }

    /// Number of stored elements (real and imaginary parts count separately).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Int8(v) => v.len(),
            ArrayData::Int16(v) => v.len(),
            ArrayData::Int32(v) => v.len(),
            ArrayData::Int64(v) => v.len(),
            ArrayData::Float32(v) => v.len(),
            ArrayData::Float64(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compare two buffers element by element on their bit patterns, so
    /// that NaN entries compare equal to identical NaN entries.
    #[must_use]
    pub fn bit_eq(&self, other: &ArrayData) -> bool {
        match (self, other) {
            (ArrayData::Float32(a), ArrayData::Float32(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (ArrayData::Float64(a), ArrayData::Float64(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            _ => self == other,
        }
    }
}

impl From<Vec<i8>> for ArrayData {
    fn from(v: Vec<i8>) -> Self {
        ArrayData::Int8(v)
    }
}

impl From<Vec<i16>> for ArrayData {
    fn from(v: Vec<i16>) -> Self {
        ArrayData::Int16(v)
    }
}

impl From<Vec<i32>> for ArrayData {
    fn from(v: Vec<i32>) -> Self {
        ArrayData::Int32(v)
    }
}

impl From<Vec<i64>> for ArrayData {
    fn from(v: Vec<i64>) -> Self {
        ArrayData::Int64(v)
    }
}

impl From<Vec<f32>> for ArrayData {
    fn from(v: Vec<f32>) -> Self {
        ArrayData::Float32(v)
    }
}

impl From<Vec<f64>> for ArrayData {
    fn from(v: Vec<f64>) -> Self {
        ArrayData::Float64(v)
    }
}

/// Error raised when array data does not fit the declared dimensions.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("array data has {actual} elements but dims {dims:?} require {expected}")]
pub struct ShapeError {
    pub dims: Vec<usize>,
    pub expected: usize,
    pub actual: usize,
}

/// Multi-dimensional numeric array in column-major order.
///
/// Complex data is stored as interleaved real/imaginary pairs, so the
/// buffer holds `product(dims) * 2` elements when `is_complex` is set.
/// An array with no dimensions is a boxed scalar; this is how complex
/// scalars travel.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    dims: Vec<usize>,
    data: ArrayData,
    is_complex: bool,
}

impl NumericArray {
    /// Create an array, checking the data length against `dims`.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError` if `data` does not hold exactly
    /// `product(dims)` elements (twice that for complex data).
    pub fn new(
        dims: Vec<usize>,
        data: impl Into<ArrayData>,
        is_complex: bool,
    ) -> Result<Self, ShapeError> {
        let data = data.into();
        let expected = dims.iter().product::<usize>() * if is_complex { 2 } else { 1 };
        if data.len() != expected {
            return Err(ShapeError {
                dims,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            dims,
            data,
            is_complex,
        })
    }

    /// One-dimensional real array holding `data`.
    #[must_use]
    pub fn vector(data: impl Into<ArrayData>) -> Self {
        let data = data.into();
        Self {
            dims: vec![data.len()],
            data,
            is_complex: false,
        }
    }

    /// Boxed complex scalar from its real and imaginary parts.
    #[must_use]
    pub fn complex_scalar(re: f64, im: f64) -> Self {
        Self {
            dims: Vec::new(),
            data: ArrayData::Float64(vec![re, im]),
            is_complex: true,
        }
    }

    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[must_use]
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> ArrayData {
        self.data
    }

    #[must_use]
    pub fn is_complex(&self) -> bool {
        self.is_complex
    }

    #[must_use]
    pub fn element_kind(&self) -> ElementKind {
        self.data.kind()
    }

    /// Number of logical elements, `product(dims)`.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// True for a boxed scalar (no dimensions).
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Size of the raw payload in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len() * self.element_kind().width()
    }

    /// Equality on dims, complex flag and data bit patterns.
    #[must_use]
    pub fn bit_eq(&self, other: &NumericArray) -> bool {
        self.dims == other.dims
            && self.is_complex == other.is_complex
            && self.data.bit_eq(&other.data)
    }
}

/// Julia source text passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JuliaExpr(String);

impl JuliaExpr {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JuliaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Any datum exchanged with the interpreter.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Julia `nothing` or `missing`.
    #[default]
    Null,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Array(NumericArray),
    /// Raw Julia expression, never interpreted by the bridge.
    Expr(JuliaExpr),
}

impl Value {
    /// Short name of the variant, for logs and error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Expr(_) => "expr",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value must be streamed as a raw payload rather than
    /// written as a source literal.
    #[must_use]
    pub fn needs_streaming(&self) -> bool {
        matches!(self, Value::Array(a) if !a.is_scalar())
    }

    /// Equality that compares floats by bit pattern.
    #[must_use]
    pub fn bit_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float32(a), Value::Float32(b)) => a.to_bits() == b.to_bits(),
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (Value::Array(a), Value::Array(b)) => a.bit_eq(b),
            _ => self == other,
        }
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<NumericArray> for Value {
    fn from(v: NumericArray) -> Self {
        Value::Array(v)
    }
}

impl From<JuliaExpr> for Value {
    fn from(v: JuliaExpr) -> Self {
        Value::Expr(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Wrap Julia source text so it is passed through verbatim.
#[must_use]
pub fn expr(text: impl Into<String>) -> JuliaExpr {
    JuliaExpr::new(text)
}

/// Julia expression building a `ComplexF64` from its parts.
#[must_use]
pub fn complex(re: f64, im: f64) -> JuliaExpr {
    JuliaExpr(format!(
        "complex({}, {})",
        super::literal::float64_literal(re),
        super::literal::float64_literal(im)
    ))
}

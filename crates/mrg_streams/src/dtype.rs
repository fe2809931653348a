//! Output precisions and typed sample buffers.
//!
//! Draws are computed in f64 and finished into the requested precision at
//! the edge. Finishing a unit draw clamps to the open interval: a value
//! that rounds to 0 in the target type becomes the smallest positive
//! normal value, one that rounds to 1 becomes `1 - epsilon`. In f64 the
//! clamp never fires (the raw draw is `z * 2^-31` with `z` in `[1, m1]`,
//! exact and interior by construction); in f32 and f16 it is what keeps
//! the `0 < u < 1` contract intact at the interval edges.

use std::fmt;

use half::f16;
use num_traits::{Float, FromPrimitive};

/// Floating-point precision of a draw request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DType {
    /// IEEE half precision (via the `half` crate).
    F16,
    /// Single precision.
    F32,
    /// Double precision.
    #[default]
    F64,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F16 => write!(f, "f16"),
            DType::F32 => write!(f, "f32"),
            DType::F64 => write!(f, "f64"),
        }
    }
}

/// Element types a unit draw can be finished into.
///
/// Blanket-implemented for every float with the needed conversions; the
/// three inhabitants used by the engine are `f16`, `f32` and `f64`.
pub trait SampleFloat: Float + FromPrimitive {}

impl<T: Float + FromPrimitive> SampleFloat for T {}

/// Finishes a raw f64 unit draw into `T`, clamped to the open interval.
#[inline]
pub fn unit_open<T: SampleFloat>(u: f64) -> T {
    let v = T::from_f64(u).unwrap_or_else(T::min_positive_value);
    if v <= T::zero() {
        T::min_positive_value()
    } else if v >= T::one() {
        T::one() - T::epsilon()
    } else {
        v
    }
}

/// Converts an f64 quantity (a parameter or a transformed value, not a
/// unit draw) into `T` without interval clamping.
#[inline]
pub fn to_sample<T: SampleFloat>(x: f64) -> T {
    T::from_f64(x).unwrap_or_else(T::nan)
}

/// Typed flat buffer of one draw's output.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleData {
    /// Half-precision values.
    F16(Vec<f16>),
    /// Single-precision values.
    F32(Vec<f32>),
    /// Double-precision values.
    F64(Vec<f64>),
    /// Integer values (multinomial counts, choice indices).
    I64(Vec<i64>),
}

impl SampleData {
    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            SampleData::F16(v) => v.len(),
            SampleData::F32(v) => v.len(),
            SampleData::F64(v) => v.len(),
            SampleData::I64(v) => v.len(),
        }
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One draw's output: row-major values plus the validated shape.
///
/// The shape is the caller's requested shape after validation (the empty
/// shape denotes a scalar draw of one element); `data.len()` always equals
/// the shape's element count for float draws, and the documented output
/// shape for the integer-valued distributions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    shape: Vec<usize>,
    data: SampleData,
}

impl Sample {
    pub(crate) fn new(shape: Vec<usize>, data: SampleData) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { shape, data }
    }

    /// The draw's output shape (empty for a scalar draw).
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The typed buffer.
    #[inline]
    pub fn data(&self) -> &SampleData {
        &self.data
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the draw produced no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The precision of a float draw, `None` for integer outputs.
    pub fn dtype(&self) -> Option<DType> {
        match self.data {
            SampleData::F16(_) => Some(DType::F16),
            SampleData::F32(_) => Some(DType::F32),
            SampleData::F64(_) => Some(DType::F64),
            SampleData::I64(_) => None,
        }
    }

    /// Widens every element to f64 (lossless from all four buffers).
    pub fn as_f64(&self) -> Vec<f64> {
        match &self.data {
            SampleData::F16(v) => v.iter().map(|x| x.to_f64()).collect(),
            SampleData::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            SampleData::F64(v) => v.clone(),
            SampleData::I64(v) => v.iter().map(|&x| x as f64).collect(),
        }
    }

    /// Borrows the integer buffer of a count/index draw.
    pub fn as_i64(&self) -> Option<&[i64]> {
        match &self.data {
            SampleData::I64(v) => Some(v),
            _ => None,
        }
    }
}

/// Finishes a buffer of unit draws into a typed sample.
pub(crate) fn finish_units(units: &[f64], dtype: DType) -> SampleData {
    match dtype {
        DType::F16 => SampleData::F16(units.iter().map(|&u| unit_open(u)).collect()),
        DType::F32 => SampleData::F32(units.iter().map(|&u| unit_open(u)).collect()),
        DType::F64 => SampleData::F64(units.iter().map(|&u| unit_open(u)).collect()),
    }
}

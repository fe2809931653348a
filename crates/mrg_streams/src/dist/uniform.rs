//! Affine scaling of unit draws.

use crate::dtype::{to_sample, unit_open, DType, SampleData, SampleFloat};

fn scale<T: SampleFloat>(units: &[f64], low: f64, high: f64) -> Vec<T> {
    let low_t = to_sample::<T>(low);
    let span_t = to_sample::<T>(high) - low_t;
    units
        .iter()
        .map(|&u| low_t + unit_open::<T>(u) * span_t)
        .collect()
}

/// Maps unit draws to `low + u * (high - low)` in the target precision.
///
/// The unit draw is clamped to the open interval before scaling, so the
/// default `(0, 1)` draw never collapses onto an endpoint in any
/// precision; the scaled endpoints themselves are reachable only through
/// rounding in the target type.
pub(crate) fn transform(units: &[f64], low: f64, high: f64, dtype: DType) -> SampleData {
    match dtype {
        DType::F16 => SampleData::F16(scale(units, low, high)),
        DType::F32 => SampleData::F32(scale(units, low, high)),
        DType::F64 => SampleData::F64(scale(units, low, high)),
    }
}

//! Box-Muller transform of unit draws.

use std::f64::consts::PI;

use crate::dtype::{to_sample, DType, SampleData, SampleFloat};

/// Turns an even-length buffer of unit draws into standard normal
/// deviates.
///
/// The buffer is split in half: the first half supplies radii
/// `sqrt(-2 ln u)`, the second half angles `2 pi u`. The output is the
/// full cosine block followed by the full sine block, so deviate `i` and
/// deviate `i + half` share a radius. Callers draw an evened count and
/// truncate, which drops the tail of the sine block for odd requests.
fn box_muller(units: &[f64]) -> Vec<f64> {
    let half = units.len() / 2;
    let (u1, u2) = units.split_at(half);
    let radii: Vec<f64> = u1.iter().map(|&u| (-2.0 * u.ln()).sqrt()).collect();
    let mut deviates = Vec::with_capacity(units.len());
    for (r, &u) in radii.iter().zip(u2) {
        deviates.push(r * (2.0 * PI * u).cos());
    }
    for (r, &u) in radii.iter().zip(u2) {
        deviates.push(r * (2.0 * PI * u).sin());
    }
    deviates
}

fn affine<T: SampleFloat>(deviates: &[f64], avg: f64, std: f64, total: usize) -> Vec<T> {
    deviates
        .iter()
        .take(total)
        .map(|&z| to_sample::<T>(avg + std * z))
        .collect()
}

/// Maps `units` (an evened buffer, `total` or `total + 1` long) to
/// `total` draws from N(avg, std^2) in the target precision.
///
/// The deviates and the affine shift are computed in f64 and converted
/// at the edge; unlike the uniform scaler there is no interval clamp,
/// normal draws are unbounded.
pub(crate) fn transform(
    units: &[f64],
    avg: f64,
    std: f64,
    total: usize,
    dtype: DType,
) -> SampleData {
    debug_assert!(units.len() % 2 == 0);
    debug_assert!(units.len() >= total && units.len() - total <= 1);
    let deviates = box_muller(units);
    match dtype {
        DType::F16 => SampleData::F16(affine(&deviates, avg, std, total)),
        DType::F32 => SampleData::F32(affine(&deviates, avg, std, total)),
        DType::F64 => SampleData::F64(affine(&deviates, avg, std, total)),
    }
}

//! Index selection from a weighted population.

use super::multinomial::{bucket, mass_walk};

/// Selects one population index per unit draw.
///
/// Absent weights mean a uniform pick over `0..population`. With
/// replacement every draw buckets independently; without replacement
/// each chosen index's mass is removed before the next draw, so the
/// output never repeats an index. Weight validation and the
/// without-replacement size check happen at allocation.
pub(crate) fn choose(
    units: &[f64],
    population: usize,
    weights: Option<&[f64]>,
    replace: bool,
) -> Vec<i64> {
    let mut row: Vec<f64> = match weights {
        Some(w) => w.to_vec(),
        None => vec![1.0 / population as f64; population],
    };
    if replace {
        units.iter().map(|&u| bucket(u, &row) as i64).collect()
    } else {
        mass_walk(units, &mut row)
    }
}

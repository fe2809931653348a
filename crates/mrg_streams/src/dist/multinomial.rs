//! Categorical bucketing of unit draws.
//!
//! Holds the two primitives behind every categorical output: cumulative
//! bucketing for draws with replacement and the mass-removal walk for
//! draws without. [`choice`](super::choice) composes the same primitives
//! over a single probability row.

/// Buckets one unit draw into the first category whose cumulative
/// probability strictly exceeds it.
///
/// Rows sum to one only within a tolerance, so a draw can overshoot the
/// final cumulative value; that shortfall lands in the last category.
pub(super) fn bucket(u: f64, row: &[f64]) -> usize {
    let mut cum = 0.0;
    for (j, &p) in row.iter().enumerate() {
        cum += p;
        if u < cum {
            return j;
        }
    }
    row.len() - 1
}

/// Draws one category per unit without replacement, zeroing each chosen
/// category's mass.
///
/// The target is `u` scaled by the mass still in play, so the remaining
/// categories keep their relative weights after every removal. A
/// category only qualifies while its own mass is nonzero; if rounding
/// pushes the target past the final cumulative value, the last category
/// still holding mass is chosen.
pub(super) fn mass_walk(units: &[f64], mass: &mut [f64]) -> Vec<i64> {
    let mut picks = Vec::with_capacity(units.len());
    for &u in units {
        let total: f64 = mass.iter().sum();
        let target = u * total;
        let mut chosen = None;
        let mut cum = 0.0;
        for (j, &m) in mass.iter().enumerate() {
            cum += m;
            if cum > target && m > 0.0 {
                chosen = Some(j);
                break;
            }
        }
        let j = match chosen.or_else(|| mass.iter().rposition(|&m| m > 0.0)) {
            Some(j) => j,
            // unreachable while picks stay within the categories that
            // carry mass, which allocation checks up front
            None => break,
        };
        picks.push(j as i64);
        mass[j] = 0.0;
    }
    picks
}

/// Buckets `rows * n` unit draws into per-row category counts.
///
/// Row `r` consumes `units[r*n .. (r+1)*n]`; the output is row-major
/// `rows * n_categories` counts, each row summing to `n`.
pub(crate) fn counts(units: &[f64], pvals: &[Vec<f64>], n: usize) -> Vec<i64> {
    let n_categories = pvals.first().map_or(0, Vec::len);
    debug_assert_eq!(units.len(), pvals.len() * n);
    let mut out = vec![0_i64; pvals.len() * n_categories];
    for (r, row) in pvals.iter().enumerate() {
        for &u in &units[r * n..(r + 1) * n] {
            out[r * n_categories + bucket(u, row)] += 1;
        }
    }
    out
}

/// Draws `n` distinct category indices per row, row-major.
pub(crate) fn indices(units: &[f64], pvals: &[Vec<f64>], n: usize) -> Vec<i64> {
    debug_assert_eq!(units.len(), pvals.len() * n);
    let mut out = Vec::with_capacity(pvals.len() * n);
    for (r, row) in pvals.iter().enumerate() {
        let mut mass = row.clone();
        out.extend(mass_walk(&units[r * n..(r + 1) * n], &mut mass));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // twelve draws of seed [777; 6], single lane
    const UNITS_777: [f64; 12] = [
        0.49391228007152677,
        0.48628911934792995,
        0.9410796947777271,
        0.8763205148279667,
        0.702515659853816,
        0.07853911723941565,
        0.12079345714300871,
        0.008603510912507772,
        0.8162860767915845,
        0.636067661922425,
        0.9220414897426963,
        0.9303780412301421,
    ];

    #[test]
    fn test_reference_counts_seed_777() {
        let pvals = vec![vec![0.2, 0.3, 0.5], vec![0.2, 0.3, 0.5]];
        let out = counts(&UNITS_777, &pvals, 6);
        assert_eq!(out, vec![1, 2, 3, 2, 0, 4]);
    }

    #[test]
    fn test_rows_sum_to_draw_count() {
        let pvals = vec![vec![0.2, 0.3, 0.5], vec![0.2, 0.3, 0.5]];
        let out = counts(&UNITS_777, &pvals, 6);
        assert_eq!(out[..3].iter().sum::<i64>(), 6);
        assert_eq!(out[3..].iter().sum::<i64>(), 6);
    }

    #[test]
    fn test_bucket_boundary_is_strict() {
        let row = [0.2, 0.3, 0.5];
        // u equal to a cumulative boundary belongs to the next category
        assert_eq!(bucket(0.2, &row), 1);
        assert_eq!(bucket(0.199_999_9, &row), 0);
        assert_eq!(bucket(0.5, &row), 2);
    }

    #[test]
    fn test_bucket_shortfall_lands_in_last_category() {
        // sums to 1 - 1e-7, inside tolerance; a draw beyond the final
        // cumulative value must still bucket somewhere
        let row = [0.3, 0.3, 0.399_999_9];
        assert_eq!(bucket(0.999_999_99, &row), 2);
    }

    #[test]
    fn test_mass_walk_skips_emptied_categories() {
        let mut mass = [0.5, 0.0, 0.5];
        // cum reaches 0.5 at both index 0 and 1; index 1 holds no mass
        // and must be passed over
        let picks = mass_walk(&[0.5], &mut mass);
        assert_eq!(picks, vec![2]);
    }

    #[test]
    fn test_mass_walk_rescales_after_removal() {
        let mut mass = [0.25, 0.25, 0.25, 0.25];
        // first pick takes index 3; the second target is 0.95 * 0.75,
        // which the remaining three categories cover at index 2
        let picks = mass_walk(&[0.95, 0.95], &mut mass);
        assert_eq!(picks, vec![3, 2]);
        assert_eq!(mass, [0.25, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_indices_are_distinct_within_row() {
        let pvals = vec![vec![1.0 / 6.0; 6], vec![1.0 / 6.0; 6]];
        let out = indices(&UNITS_777, &pvals, 6);
        assert_eq!(out.len(), 12);
        for row in out.chunks(6) {
            let mut seen = row.to_vec();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), 6, "row repeats a category: {:?}", row);
        }
    }
}

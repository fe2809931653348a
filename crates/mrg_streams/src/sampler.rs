//! Batched uniform drawing across a table's lanes.
//!
//! One draw call advances a prefix of the table's lanes in lock-step and
//! interleaves their outputs lane-major: output position `i` takes sample
//! `i / lanes_used` of lane `i % lanes_used`. Every used lane advances the
//! same number of steps, with trailing samples discarded, so the table
//! state after a draw depends only on `(lanes_used, draws_per_lane)`,
//! never on whether the lanes were advanced serially or in parallel. The
//! interleave order is a reproducibility contract validated against fixed
//! reference data; it is not an implementation detail.

use rayon::prelude::*;

use mrg_core::StateVector;

use crate::config::EngineConfig;
use crate::table::StateTable;

/// Lane and step counts chosen for one draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawPlan {
    /// Lanes advanced by this draw (a prefix of the table).
    pub lanes_used: usize,
    /// Steps taken by every used lane.
    pub draws_per_lane: usize,
}

/// Picks a lane count for a request of `total` elements.
///
/// Enough lanes that each produces a handful of values, capped so small
/// requests do not spread across thousands of lanes. Tuning policy only:
/// callers needing reproducibility across configurations pass an explicit
/// lane count instead.
pub fn guess_lanes(total: usize, max_auto_lanes: usize) -> usize {
    let mut lanes = total;
    if lanes > 6 {
        lanes /= 6;
    }
    lanes.clamp(1, max_auto_lanes)
}

/// Computes the lane/step split for a draw of `total` elements.
///
/// `parallelism` is the caller-specified lane count, if any; otherwise
/// the heuristic chooses from `total`. The result never exceeds the
/// table, and every used lane will advance `draws_per_lane` steps.
pub fn plan_draw(
    table_len: usize,
    total: usize,
    parallelism: Option<usize>,
    config: &EngineConfig,
) -> DrawPlan {
    debug_assert!(table_len > 0 && total > 0);
    let requested = parallelism.unwrap_or_else(|| guess_lanes(total, config.max_auto_lanes()));
    let lanes_used = requested.clamp(1, table_len);
    let draws_per_lane = (total + lanes_used - 1) / lanes_used;
    DrawPlan {
        lanes_used,
        draws_per_lane,
    }
}

/// Draws `total` unit uniforms from `table` and returns them with the
/// successor table.
///
/// The input table is not mutated; the returned table is the atomic
/// replacement the caller must use for the next draw against the same
/// variable. Lanes beyond `plan.lanes_used` carry over untouched.
pub fn draw_uniform(
    table: &StateTable,
    total: usize,
    parallelism: Option<usize>,
    config: &EngineConfig,
) -> (Vec<f64>, StateTable) {
    let plan = plan_draw(table.len(), total, parallelism, config);
    let lanes = &table.lanes()[..plan.lanes_used];

    let advance = |mut state: StateVector| -> (StateVector, Vec<f64>) {
        let mut samples = Vec::with_capacity(plan.draws_per_lane);
        for _ in 0..plan.draws_per_lane {
            samples.push(state.next_f64());
        }
        (state, samples)
    };

    // lanes are independent mid-call; order is restored by collection
    let advanced: Vec<(StateVector, Vec<f64>)> =
        if total >= config.parallel_threshold() && plan.lanes_used > 1 {
            lanes
                .par_iter()
                .map(|lane| advance(lane.state()))
                .collect()
        } else {
            lanes.iter().map(|lane| advance(lane.state())).collect()
        };

    let mut values = Vec::with_capacity(total);
    for i in 0..total {
        values.push(advanced[i % plan.lanes_used].1[i / plan.lanes_used]);
    }

    let states = advanced.into_iter().map(|(state, _)| state).collect();
    (values, table.replaced(states))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrg_core::SeedSpec;

    fn table(n_lanes: usize) -> StateTable {
        let root = SeedSpec::Scalar(12_345).expand().unwrap();
        StateTable::derive(root, 0, n_lanes)
    }

    fn serial_config() -> EngineConfig {
        EngineConfig::builder()
            .parallel_threshold(usize::MAX)
            .build()
            .unwrap()
    }

    fn parallel_config() -> EngineConfig {
        EngineConfig::builder().parallel_threshold(0).build().unwrap()
    }

    /// Seven values over two lanes, seed 12345: lane 0 fills even output
    /// positions, lane 1 odd ones, and lane 1's fourth step is discarded.
    /// Values cross-checked against a direct evaluation of the recurrence.
    const SEVEN_OVER_TWO_LANES: [f64; 7] = [
        0.7353244530968368,
        0.2585685825906694,
        0.6142074400559068,
        0.9489980279468,
        0.11007806099951267,
        0.4309556516818702,
        0.6487741703167558,
    ];

    /// The next seven from the same table: both lanes resume four steps in.
    const SEVEN_OVER_TWO_LANES_SECOND: [f64; 7] = [
        0.36619443260133266,
        0.9760319022461772,
        0.10882294131442904,
        0.6315354662947357,
        0.5330547927878797,
        0.19335915753617883,
        0.9783797566778958,
    ];

    #[test]
    fn test_lane_major_interleave_reference() {
        let (values, next) = draw_uniform(&table(2), 7, Some(2), &serial_config());
        assert_eq!(values, SEVEN_OVER_TWO_LANES);

        // uniform advancement: the discarded trailing sample is consumed
        let (second, _) = draw_uniform(&next, 7, Some(2), &serial_config());
        assert_eq!(second, SEVEN_OVER_TWO_LANES_SECOND);
    }

    #[test]
    fn test_serial_and_parallel_agree_bitwise() {
        for (total, lanes) in [(7, 2), (100, 7), (10_000, 64), (999, 1)] {
            let t = table(lanes);
            let (serial, after_serial) = draw_uniform(&t, total, Some(lanes), &serial_config());
            let (parallel, after_parallel) =
                draw_uniform(&t, total, Some(lanes), &parallel_config());
            assert_eq!(serial, parallel, "values diverged at {:?}", (total, lanes));
            assert_eq!(after_serial, after_parallel);
        }
    }

    #[test]
    fn test_input_table_not_mutated() {
        let t = table(3);
        let snapshot = t.clone();
        let _ = draw_uniform(&t, 50, Some(3), &serial_config());
        assert_eq!(t, snapshot);
    }

    #[test]
    fn test_every_used_lane_advances_equally() {
        let t = table(4);
        let (_, next) = draw_uniform(&t, 10, Some(4), &serial_config());
        // ceil(10/4) = 3 steps per lane
        for (lane, before) in next.lanes().iter().zip(t.lanes()) {
            let mut expected = before.state();
            for _ in 0..3 {
                expected.advance();
            }
            assert_eq!(lane.state(), expected);
        }
    }

    #[test]
    fn test_lanes_beyond_plan_untouched() {
        let t = table(8);
        // explicit parallelism below the table size: lanes 4.. stay put
        let (_, next) = draw_uniform(&t, 12, Some(4), &serial_config());
        assert_eq!(&next.lanes()[4..], &t.lanes()[4..]);
    }

    #[test]
    fn test_more_lanes_than_elements() {
        // 3 elements over 5 lanes: every used lane steps once, the last
        // two outputs are discarded entirely
        let t = table(5);
        let (values, next) = draw_uniform(&t, 3, Some(5), &serial_config());
        assert_eq!(values.len(), 3);
        for (lane, before) in next.lanes().iter().zip(t.lanes()) {
            let mut expected = before.state();
            expected.advance();
            assert_eq!(lane.state(), expected);
        }
    }

    #[test]
    fn test_single_value_draw() {
        let (values, _) = draw_uniform(&table(1), 1, Some(1), &serial_config());
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], 0.7353244530968368);
    }

    #[test]
    fn test_guess_lanes_heuristic_bounds() {
        assert_eq!(guess_lanes(1, 7_680), 1);
        assert_eq!(guess_lanes(6, 7_680), 6);
        assert_eq!(guess_lanes(600, 7_680), 100);
        assert_eq!(guess_lanes(1_000_000, 7_680), 7_680);
        assert_eq!(guess_lanes(1_000_000, 16), 16);
    }

    #[test]
    fn test_plan_clamps_to_table() {
        let config = EngineConfig::default();
        let plan = plan_draw(4, 100, Some(64), &config);
        assert_eq!(plan.lanes_used, 4);
        assert_eq!(plan.draws_per_lane, 25);

        let plan = plan_draw(64, 7, None, &config);
        // heuristic picks ceil-free total/6 = 1 lane for 7 elements
        assert_eq!(plan.lanes_used, 1);
        assert_eq!(plan.draws_per_lane, 7);
    }
}

//! Jump-ahead: deriving stream and substream states in O(1).
//!
//! The recurrence is linear, so advancing a state by `2^k` steps is one
//! matrix-vector product with the companion matrix raised to `2^k`. Two
//! powers partition the generator's period into a two-level hierarchy:
//! `2^134` separates streams, `2^72` separates substreams within a stream.
//! Stream k, substream j of a root seed is
//! `substream_jump^j (stream_jump^k (root))`: stream jump outer,
//! substream jump inner. The ordering is a reproducibility contract:
//! swapping it changes every derived value.

use std::sync::OnceLock;

use crate::arith::{mat_pow_two_exp, mat_vec_mod, Matrix3, Vector3};
use crate::constants::{A1P0, A2P0, M1, M2, STREAM_EXP, SUBSTREAM_EXP};
use crate::state::StateVector;

/// The four precomputed jump matrices, one per (recurrence, level).
///
/// Built once per process by repeated modular squaring of the companion
/// matrices and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JumpMatrices {
    /// `A1^(2^72) mod m1`, the substream jump of the first recurrence.
    pub a1_p72: Matrix3,
    /// `A2^(2^72) mod m2`, the substream jump of the second recurrence.
    pub a2_p72: Matrix3,
    /// `A1^(2^134) mod m1`, the stream jump of the first recurrence.
    pub a1_p134: Matrix3,
    /// `A2^(2^134) mod m2`, the stream jump of the second recurrence.
    pub a2_p134: Matrix3,
}

impl JumpMatrices {
    fn compute() -> Self {
        let a1_p72 = mat_pow_two_exp(&A1P0, SUBSTREAM_EXP, M1);
        let a2_p72 = mat_pow_two_exp(&A2P0, SUBSTREAM_EXP, M2);
        // 134 squarings continue from the 72 already done
        let a1_p134 = mat_pow_two_exp(&a1_p72, STREAM_EXP - SUBSTREAM_EXP, M1);
        let a2_p134 = mat_pow_two_exp(&a2_p72, STREAM_EXP - SUBSTREAM_EXP, M2);
        Self {
            a1_p72,
            a2_p72,
            a1_p134,
            a2_p134,
        }
    }
}

static JUMPS: OnceLock<JumpMatrices> = OnceLock::new();

/// Returns the process-wide jump matrices, computing them on first use.
pub fn jump_matrices() -> &'static JumpMatrices {
    JUMPS.get_or_init(JumpMatrices::compute)
}

/// Applies one matrix pair to a state: `(a1 · first, a2 · second)`.
///
/// This is the general jump primitive; [`advance_substream`] and
/// [`advance_stream`] apply it with the two fixed powers.
#[inline]
pub fn jump(state: &StateVector, a1: &Matrix3, a2: &Matrix3) -> StateVector {
    let first = mat_vec_mod(a1, &state.first_triple(), M1);
    let second = mat_vec_mod(a2, &state.second_triple(), M2);
    StateVector::from_triples(first, second)
}

/// Advances a state by `2^72` raw steps (one substream).
#[inline]
pub fn advance_substream(state: &StateVector) -> StateVector {
    let j = jump_matrices();
    jump(state, &j.a1_p72, &j.a2_p72)
}

/// Advances a state by `2^134` raw steps (one stream).
#[inline]
pub fn advance_stream(state: &StateVector) -> StateVector {
    let j = jump_matrices();
    jump(state, &j.a1_p134, &j.a2_p134)
}

/// Derives the initial state of `(stream, substream)` from a root state.
///
/// Equivalent to `advance_substream^substream (advance_stream^stream
/// (root))`. Engine tables enumerate coordinates incrementally instead,
/// but this direct form anchors the enumeration in tests and lets callers
/// address arbitrary coordinates.
pub fn derive_lane_state(root: &StateVector, stream: u64, substream: u64) -> StateVector {
    let mut state = *root;
    for _ in 0..stream {
        state = advance_stream(&state);
    }
    for _ in 0..substream {
        state = advance_substream(&state);
    }
    state
}

/// The jump-and-combine auxiliary operator.
///
/// Computes `concat(a1 · v1 mod m1, a2 · v2 mod m2)` for two independent
/// (matrix, vector, modulus) triples. Exists so the jump path can be
/// validated against a reference matrix-vector computation performed
/// outside the engine.
pub fn dot_modulo(
    a1: &Matrix3,
    v1: &Vector3,
    m1: i64,
    a2: &Matrix3,
    v2: &Vector3,
    m2: i64,
) -> [i64; 6] {
    let first = mat_vec_mod(a1, v1, m1);
    let second = mat_vec_mod(a2, v2, m2);
    [
        first[0], first[1], first[2], second[0], second[1], second[2],
    ]
}

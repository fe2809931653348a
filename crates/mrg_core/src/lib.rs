//! # mrg_core
//!
//! Exact arithmetic core of the MRG31k3p parallel stream engine.
//!
//! This crate owns everything that must be bit-reproducible forever: the
//! generator constants, overflow-safe modular arithmetic, the combined
//! recurrence step, seed validation, and the matrix-power jump-ahead that
//! partitions one generator into a stream/substream hierarchy.
//!
//! ## Overview
//!
//! - [`constants`]: moduli, recurrence coefficients, companion matrices.
//! - [`arith`]: `mulmod`, matrix-vector and matrix-matrix products mod m,
//!   repeated-squaring powers. Exact integer results, asserted bounds.
//! - [`state`]: [`StateVector`] (six 31-bit residues), [`SeedSpec`]
//!   expansion and validation.
//! - [`step`]: one generator step, yielding the combined integer in
//!   `[1, m1]` and the normalised draw in (0, 1).
//! - [`jump`]: `2^72` substream and `2^134` stream jumps, derived once by
//!   repeated squaring; `(stream, substream)` coordinate derivation;
//!   the `dot_modulo` validation primitive.
//!
//! Batching, state tables and distributions live in the engine crate
//! layered on top; this crate has no I/O, no threads and no floats other
//! than the final normalisation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod arith;
pub mod constants;
pub mod jump;
pub mod state;
pub mod step;

pub use arith::{mat_mul_mod, mat_pow_two_exp, mat_vec_mod, mulmod, Matrix3, Vector3};
pub use constants::{M1, M2, NORM};
pub use jump::{
    advance_stream, advance_substream, derive_lane_state, dot_modulo, jump, jump_matrices,
    JumpMatrices,
};
pub use state::{SeedError, SeedSpec, StateVector};

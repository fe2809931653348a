//! Fixed constants of the MRG31k3p combined recursive generator.
//!
//! The generator couples two order-3 linear recurrences over distinct
//! 31-bit prime moduli and combines them by subtraction. All constants in
//! this module are part of the generator definition and must never change:
//! the reproducibility contract of every stream derives from them.

use crate::arith::Matrix3;

/// First modulus: `2^31 - 1`.
pub const M1: i64 = 2_147_483_647;

/// Second modulus: `2^31 - 21069`.
pub const M2: i64 = 2_147_462_579;

/// Normaliser mapping the combined integer output into (0, 1).
///
/// The combined output lies in `[1, M1]`, so multiplying by
/// `1 / (M1 + 1) = 2^-31` yields values in `[2^-31, 1 - 2^-31]`, strictly
/// inside the open unit interval for every valid state.
pub const NORM: f64 = 1.0 / (M1 as f64 + 1.0);

/// Lag-2 coefficient of the first recurrence: `2^22`.
pub const A12: i64 = 4_194_304;

/// Lag-3 coefficient of the first recurrence: `2^7 + 1`.
pub const A13: i64 = 129;

/// Lag-1 coefficient of the second recurrence: `2^15`.
pub const A21: i64 = 32_768;

/// Lag-3 coefficient of the second recurrence: `2^15 + 1`.
pub const A23: i64 = 32_769;

/// Companion matrix of the first recurrence (mod [`M1`]).
///
/// One application advances the history window `[x_{n-1}, x_{n-2}, x_{n-3}]`
/// by a single step of `x_n = (2^22 x_{n-2} + 129 x_{n-3}) mod m1`.
pub const A1P0: Matrix3 = [[0, A12, A13], [1, 0, 0], [0, 1, 0]];

/// Companion matrix of the second recurrence (mod [`M2`]).
///
/// Advances `x_n = (2^15 x_{n-1} + (2^15 + 1) x_{n-3}) mod m2`.
pub const A2P0: Matrix3 = [[A21, 0, A23], [1, 0, 0], [0, 1, 0]];

/// Squaring count for the substream jump: one substream advance equals
/// `2^72` raw generator steps.
pub const SUBSTREAM_EXP: u32 = 72;

/// Squaring count for the stream jump: one stream advance equals
/// `2^134` raw generator steps.
pub const STREAM_EXP: u32 = 134;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_is_two_to_minus_31() {
        assert_eq!(NORM, 2.0_f64.powi(-31));
    }

    #[test]
    fn test_moduli_are_31_bit() {
        assert_eq!(M1, (1_i64 << 31) - 1);
        assert_eq!(M2, (1_i64 << 31) - 21_069);
    }

    #[test]
    fn test_companion_rows_encode_coefficients() {
        assert_eq!(A1P0[0], [0, 1 << 22, 129]);
        assert_eq!(A2P0[0], [1 << 15, 0, (1 << 15) + 1]);
    }
}

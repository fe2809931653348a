//! Exact modular arithmetic over 31-bit moduli.
//!
//! Every operation in this module is an exact integer computation: operands
//! are reduced residues below a modulus smaller than `2^31`, so products fit
//! comfortably in `i64` (`< 2^62`) and sums of three reduced terms stay
//! below `2^33`. There is no floating point anywhere in this layer and no
//! silent wraparound: operand bounds are asserted, and a violation is a
//! programming error that panics rather than producing a wrapped result.

/// A 3×3 matrix of reduced residues, row-major.
pub type Matrix3 = [[i64; 3]; 3];

/// A 3-vector of reduced residues.
pub type Vector3 = [i64; 3];

/// The 3×3 identity matrix.
pub const IDENTITY: Matrix3 = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];

#[inline]
fn assert_residue(x: i64, m: i64) {
    assert!(
        (0..m).contains(&x),
        "operand {} is not a reduced residue mod {}",
        x,
        m
    );
}

#[inline]
fn assert_modulus(m: i64) {
    assert!(
        m > 1 && m < (1 << 31),
        "modulus {} outside supported range (1, 2^31)",
        m
    );
}

/// Computes `(a * b) mod m` exactly.
///
/// # Arguments
///
/// * `a`, `b` - Reduced residues in `[0, m)`
/// * `m` - Modulus in `(1, 2^31)`
///
/// # Panics
///
/// Panics if an operand is out of range. With in-range operands the
/// product is below `2^62` and the computation is exact in `i64`.
#[inline]
pub fn mulmod(a: i64, b: i64, m: i64) -> i64 {
    assert_modulus(m);
    assert_residue(a, m);
    assert_residue(b, m);
    (a * b) % m
}

/// Computes `(matrix · vector) mod m` exactly.
///
/// Used both to advance a state by one recurrence step (with a companion
/// matrix) and to jump a state ahead by a large power of the recurrence
/// (with a precomputed matrix power).
///
/// # Panics
///
/// Panics if any entry of `a` or `v` is not a reduced residue mod `m`.
pub fn mat_vec_mod(a: &Matrix3, v: &Vector3, m: i64) -> Vector3 {
    assert_modulus(m);
    let mut out = [0_i64; 3];
    for i in 0..3 {
        // each term is reduced before accumulation; the sum stays < 3m
        let mut acc = 0_i64;
        for j in 0..3 {
            acc += mulmod(a[i][j], v[j], m);
        }
        out[i] = acc % m;
    }
    out
}

/// Computes `(a · b) mod m` for two 3×3 matrices, exactly.
///
/// Only needed when the jump matrices are built; the per-draw hot path
/// never multiplies matrices.
pub fn mat_mul_mod(a: &Matrix3, b: &Matrix3, m: i64) -> Matrix3 {
    assert_modulus(m);
    let mut out = [[0_i64; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let mut acc = 0_i64;
            for k in 0..3 {
                acc += mulmod(a[i][k], b[k][j], m);
            }
            out[i][j] = acc % m;
        }
    }
    out
}

/// Computes `a^(2^exp) mod m` by `exp` successive modular squarings.
///
/// This is how the `2^72` substream and `2^134` stream jump matrices are
/// derived from the single-step companion matrices.
pub fn mat_pow_two_exp(a: &Matrix3, exp: u32, m: i64) -> Matrix3 {
    let mut acc = *a;
    for _ in 0..exp {
        acc = mat_mul_mod(&acc, &acc, m);
    }
    acc
}

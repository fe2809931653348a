//! The combined recurrence step.
//!
//! Advancing a state computes one new iterate of each recurrence, shifts
//! the history windows, and combines the two new iterates by subtraction
//! mod `m1`. The combined integer lies in `[1, m1]` for every valid state:
//! the two recurrences never produce equal residues and never both vanish,
//! so the normalised draw is strictly inside (0, 1).

use crate::constants::{A12, A13, A21, A23, M1, M2, NORM};
use crate::state::StateVector;

impl StateVector {
    /// Advances the state by one step and returns the combined integer
    /// output in `[1, m1]`.
    ///
    /// All intermediate products stay below `2^54`, so the computation is
    /// exact in `i64`; results are reduced residues by construction.
    #[inline]
    pub fn advance(&mut self) -> i64 {
        let s = &mut self.0;
        let y1 = (A12 * i64::from(s[1]) + A13 * i64::from(s[2])) % M1;
        let y2 = (A21 * i64::from(s[3]) + A23 * i64::from(s[5])) % M2;
        debug_assert!((0..M1).contains(&y1));
        debug_assert!((0..M2).contains(&y2));

        s[2] = s[1];
        s[1] = s[0];
        s[0] = y1 as i32;
        s[5] = s[4];
        s[4] = s[3];
        s[3] = y2 as i32;

        if y1 <= y2 {
            y1 - y2 + M1
        } else {
            y1 - y2
        }
    }

    /// Advances the state by one step and returns the normalised draw.
    ///
    /// The result is `advance() * 2^-31`, strictly inside (0, 1).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mrg_core::SeedSpec;
    ///
    /// let mut state = SeedSpec::Scalar(12_345).expand().unwrap();
    /// let u = state.next_f64();
    /// assert!(u > 0.0 && u < 1.0);
    /// ```
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.advance() as f64 * NORM
    }
}

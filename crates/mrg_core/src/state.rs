//! Generator state vectors and seed validation.
//!
//! A state holds the last three iterates of each of the two coupled
//! recurrences. Validity is established once, at seeding time: every state
//! reachable from a valid state (by stepping or by jump-ahead) is itself
//! valid, so the step and jump paths never re-validate.

use crate::constants::{M1, M2};
use thiserror::Error;

/// Rejection reasons for seed material.
///
/// All variants are raised at construction or reseed time, never deferred
/// to the first draw.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    /// A scalar seed outside the expandable range.
    ///
    /// Scalar seeds populate all six components, so they must be valid
    /// residues under both moduli and nonzero: `1 <= seed <= m2 - 1`.
    #[error("scalar seed {value} outside valid range [1, {}]", M2 - 1)]
    ScalarOutOfRange {
        /// The offending seed value.
        value: u64,
    },

    /// A vector seed component outside `[0, modulus)` for its triple.
    #[error("seed component {index} is {value}, outside [0, {modulus})")]
    ComponentOutOfRange {
        /// Position in the 6-component seed vector.
        index: usize,
        /// The offending component value.
        value: i32,
        /// The modulus governing that component.
        modulus: i64,
    },

    /// One recurrence's three components are all zero.
    ///
    /// An all-zero triple makes that recurrence emit zero forever, which
    /// degenerates the combined output.
    #[error("the three {group} seed components are all zero")]
    ZeroTriple {
        /// Which recurrence the degenerate triple belongs to.
        group: &'static str,
    },
}

/// One MRG31k3p state: `[x1_{n-1}, x1_{n-2}, x1_{n-3}, x2_{n-1}, x2_{n-2}, x2_{n-3}]`.
///
/// Components of the first triple are residues mod `m1`, of the second mod
/// `m2`; neither triple is all-zero. Construct via [`StateVector::new`] or
/// by expanding a [`SeedSpec`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateVector(pub(crate) [i32; 6]);

impl StateVector {
    /// Builds a state from six components, validating the invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::ComponentOutOfRange`] if a component is not a
    /// reduced residue for its modulus, or [`SeedError::ZeroTriple`] if
    /// either triple is entirely zero.
    pub fn new(components: [i32; 6]) -> Result<Self, SeedError> {
        for (index, &value) in components.iter().enumerate() {
            let modulus = if index < 3 { M1 } else { M2 };
            if value < 0 || i64::from(value) >= modulus {
                return Err(SeedError::ComponentOutOfRange {
                    index,
                    value,
                    modulus,
                });
            }
        }
        if components[..3] == [0, 0, 0] {
            return Err(SeedError::ZeroTriple { group: "mod-m1" });
        }
        if components[3..] == [0, 0, 0] {
            return Err(SeedError::ZeroTriple { group: "mod-m2" });
        }
        Ok(Self(components))
    }

    /// Returns the six components in order.
    #[inline]
    pub fn components(&self) -> [i32; 6] {
        self.0
    }

    /// Returns the first triple (mod `m1`) widened for modular arithmetic.
    #[inline]
    pub(crate) fn first_triple(&self) -> [i64; 3] {
        [
            i64::from(self.0[0]),
            i64::from(self.0[1]),
            i64::from(self.0[2]),
        ]
    }

    /// Returns the second triple (mod `m2`) widened for modular arithmetic.
    #[inline]
    pub(crate) fn second_triple(&self) -> [i64; 3] {
        [
            i64::from(self.0[3]),
            i64::from(self.0[4]),
            i64::from(self.0[5]),
        ]
    }

    /// Rebuilds a state from two reduced triples.
    ///
    /// Callers must pass reduced residues; this is the reassembly half of
    /// the jump path and is not validated again.
    #[inline]
    pub(crate) fn from_triples(first: [i64; 3], second: [i64; 3]) -> Self {
        Self([
            first[0] as i32,
            first[1] as i32,
            first[2] as i32,
            second[0] as i32,
            second[1] as i32,
            second[2] as i32,
        ])
    }
}

/// Seed material accepted by the engine: a scalar or a full 6-vector.
///
/// # Examples
///
/// ```rust
/// use mrg_core::SeedSpec;
///
/// let scalar: SeedSpec = 12_345_u64.into();
/// assert_eq!(
///     scalar.expand().unwrap().components(),
///     [12_345; 6],
/// );
///
/// let vector: SeedSpec = [1, 2, 3, 4, 5, 6].into();
/// assert!(vector.expand().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeedSpec {
    /// A single integer, replicated across all six components.
    Scalar(u64),
    /// An explicit 6-component state seed.
    Vector([i32; 6]),
}

impl SeedSpec {
    /// Expands the seed into a validated root state.
    ///
    /// A scalar `s` expands to `[s; 6]` and must satisfy `1 <= s <= m2 - 1`
    /// so every component is a nonzero residue under both moduli. A vector
    /// is validated as-is.
    ///
    /// # Errors
    ///
    /// Returns a [`SeedError`] describing the first violated rule.
    pub fn expand(&self) -> Result<StateVector, SeedError> {
        match *self {
            SeedSpec::Scalar(value) => {
                if value == 0 || value >= M2 as u64 {
                    return Err(SeedError::ScalarOutOfRange { value });
                }
                let c = value as i32;
                StateVector::new([c; 6])
            }
            SeedSpec::Vector(components) => StateVector::new(components),
        }
    }
}

impl From<u64> for SeedSpec {
    fn from(value: u64) -> Self {
        SeedSpec::Scalar(value)
    }
}

impl From<[i32; 6]> for SeedSpec {
    fn from(components: [i32; 6]) -> Self {
        SeedSpec::Vector(components)
    }
}

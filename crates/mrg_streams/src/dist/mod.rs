//! Distribution transformers.
//!
//! Every transformer is a pure function over a buffer of unit uniform
//! draws plus fixed parameters; none of them touches generator state.
//! The engine draws the uniforms through the batched sampler and hands
//! them here in output order, so reproducibility reduces to the uniform
//! stream's reproducibility.

use std::fmt;

use thiserror::Error;

pub(crate) mod binomial;
pub(crate) mod choice;
pub(crate) mod multinomial;
pub(crate) mod normal;
pub(crate) mod uniform;

/// Tolerance within which a probability row must sum to one.
pub const PVALS_TOLERANCE: f64 = 1e-6;

/// A distribution parameter, as a gradient target.
///
/// Draws are step functions of their parameters almost everywhere, so no
/// useful gradient exists; requesting one fails with
/// [`NonDifferentiable`](crate::EngineError::NonDifferentiable) naming
/// the parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistParam {
    /// Lower bound of a uniform draw.
    Low,
    /// Upper bound of a uniform draw.
    High,
    /// Success probability of a Bernoulli draw.
    P,
    /// Mean of a normal draw.
    Avg,
    /// Standard deviation of a normal draw.
    Std,
    /// Probability row(s) of a multinomial or choice draw.
    Pvals,
}

impl fmt::Display for DistParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistParam::Low => "low",
            DistParam::High => "high",
            DistParam::P => "p",
            DistParam::Avg => "avg",
            DistParam::Std => "std",
            DistParam::Pvals => "pvals",
        };
        write!(f, "{}", name)
    }
}

/// Sampling-range violations raised by the categorical transformers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    /// A without-replacement request larger than its population.
    #[error(
        "without-replacement request for {requested} items exceeds population of {population}"
    )]
    PopulationExceeded {
        /// Items requested in one call.
        requested: usize,
        /// Distinct items available.
        population: usize,
    },

    /// A probability row that does not sum to one.
    #[error("probability row {row} sums to {sum}; rows must sum to 1 within {tolerance}")]
    PvalsNotNormalised {
        /// Row index in the pvals matrix.
        row: usize,
        /// The row's actual sum.
        sum: f64,
        /// Accepted deviation from 1.
        tolerance: f64,
    },

    /// A negative or non-finite probability entry.
    #[error("probability at row {row}, category {category} is {value}; entries must be finite and nonnegative")]
    InvalidProbability {
        /// Row index in the pvals matrix.
        row: usize,
        /// Category index within the row.
        category: usize,
        /// The offending entry.
        value: f64,
    },

    /// An empty probability row or empty population.
    #[error("probability row {row} has no categories")]
    EmptyRow {
        /// Row index in the pvals matrix.
        row: usize,
    },

    /// A pvals row whose length differs from the first row's.
    #[error("probability row {row} has {actual} categories; expected {expected}")]
    RaggedRows {
        /// Row index in the pvals matrix.
        row: usize,
        /// Category count of the first row.
        expected: usize,
        /// Category count of this row.
        actual: usize,
    },
}

/// Number of categories carrying nonzero mass in a row; the effective
/// population of a without-replacement draw.
pub(crate) fn selectable_categories(row: &[f64]) -> usize {
    row.iter().filter(|&&p| p > 0.0).count()
}

/// Validates a pvals matrix: rectangular rows of finite, nonnegative
/// entries, each summing to one within [`PVALS_TOLERANCE`].
pub(crate) fn validate_pvals(pvals: &[Vec<f64>]) -> Result<(), SamplingError> {
    let expected = pvals.first().map_or(0, Vec::len);
    for (row, values) in pvals.iter().enumerate() {
        if values.is_empty() {
            return Err(SamplingError::EmptyRow { row });
        }
        if values.len() != expected {
            return Err(SamplingError::RaggedRows {
                row,
                expected,
                actual: values.len(),
            });
        }
        let mut sum = 0.0;
        for (category, &value) in values.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(SamplingError::InvalidProbability {
                    row,
                    category,
                    value,
                });
            }
            sum += value;
        }
        if (sum - 1.0).abs() > PVALS_TOLERANCE {
            return Err(SamplingError::PvalsNotNormalised {
                row,
                sum,
                tolerance: PVALS_TOLERANCE,
            });
        }
    }
    Ok(())
}

//! Engine error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::dist::{DistParam, SamplingError};
use crate::shape::ShapeError;
use mrg_core::SeedError;

/// Errors surfaced by the engine's allocation and draw operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected output shape.
    #[error("invalid size: {0}")]
    InvalidSize(#[from] ShapeError),

    /// Rejected seed material.
    #[error("invalid seed: {0}")]
    InvalidSeed(#[from] SeedError),

    /// Rejected distribution parameters or population bounds.
    #[error("sampling error: {0}")]
    SamplingRange(#[from] SamplingError),

    /// Rejected engine or variable configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Gradient requested through a draw.
    ///
    /// Draws are step functions of their parameters almost everywhere,
    /// so the engine refuses rather than returning a silent zero.
    #[error("no gradient defined for parameter `{parameter}` of the {distribution} distribution")]
    NonDifferentiable {
        /// Distribution the variable was allocated with.
        distribution: &'static str,
        /// Parameter the gradient was requested against.
        parameter: DistParam,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wraps_source_messages() {
        let err = EngineError::from(ShapeError::NonPositiveDimension {
            index: 1,
            value: -4,
        });
        let text = err.to_string();
        assert!(text.starts_with("invalid size:"));
        assert!(text.contains("-4"));

        let err = EngineError::from(SamplingError::PopulationExceeded {
            requested: 9,
            population: 5,
        });
        assert!(err.to_string().starts_with("sampling error:"));
    }

    #[test]
    fn test_display_non_differentiable() {
        let err = EngineError::NonDifferentiable {
            distribution: "binomial",
            parameter: DistParam::P,
        };
        assert_eq!(
            err.to_string(),
            "no gradient defined for parameter `p` of the binomial distribution"
        );
    }

    #[test]
    fn test_seed_error_converts() {
        let seed_err = mrg_core::SeedSpec::Scalar(0).expand().unwrap_err();
        let err = EngineError::from(seed_err);
        assert!(err.to_string().starts_with("invalid seed:"));
    }
}

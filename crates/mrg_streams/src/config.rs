//! Engine tuning configuration.
//!
//! Everything in here is policy, not correctness: lane counts and the
//! parallelism threshold change how fast a draw runs, never what it
//! produces. Reproducibility is carried entirely by seeds, lane counts and
//! the draw sequence.

use std::fmt;

/// Ceiling for the automatic lane-count heuristic.
pub const MAX_AUTO_LANES: usize = 7_680;

/// Lane count used when neither an explicit count nor a shape hint exists.
pub const DEFAULT_LANES: usize = 60;

/// Element count from which a draw switches to parallel lane advancement.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4_096;

/// Configuration error for the stream engine.
///
/// These errors occur during construction when invalid parameters are
/// provided.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Lane count outside valid range (at least 1).
    InvalidLaneCount(usize),
    /// Invalid parameter value with name and description.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLaneCount(count) => {
                write!(f, "Invalid lane count {}: must be at least 1", count)
            }
            Self::InvalidParameter { name, value } => {
                write!(f, "Invalid parameter '{}': {}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Stream engine configuration.
///
/// Immutable tuning parameters for lane selection and parallel draws.
/// Use [`EngineConfig::builder`] to construct customised instances; the
/// [`Default`] instance matches the documented constants.
///
/// # Examples
///
/// ```rust
/// use mrg_streams::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .parallel_threshold(1_024)
///     .max_auto_lanes(512)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.parallel_threshold(), 1_024);
/// assert_eq!(config.max_auto_lanes(), 512);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Minimum element count before rayon is engaged for a draw.
    parallel_threshold: usize,
    /// Cap applied to the automatic lane-count heuristic.
    max_auto_lanes: usize,
    /// Lane count when no explicit count and no shape hint is available.
    default_lanes: usize,
}

impl EngineConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Returns the element count from which draws run in parallel.
    #[inline]
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Returns the cap on automatically chosen lane counts.
    #[inline]
    pub fn max_auto_lanes(&self) -> usize {
        self.max_auto_lanes
    }

    /// Returns the fallback lane count.
    #[inline]
    pub fn default_lanes(&self) -> usize {
        self.default_lanes
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either lane bound is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_auto_lanes == 0 {
            return Err(ConfigError::InvalidLaneCount(self.max_auto_lanes));
        }
        if self.default_lanes == 0 {
            return Err(ConfigError::InvalidLaneCount(self.default_lanes));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            max_auto_lanes: MAX_AUTO_LANES,
            default_lanes: DEFAULT_LANES,
        }
    }
}

/// Builder for [`EngineConfig`].
///
/// Unset fields keep their defaults; `build` validates the result.
#[derive(Clone, Debug, Default)]
pub struct EngineConfigBuilder {
    parallel_threshold: Option<usize>,
    max_auto_lanes: Option<usize>,
    default_lanes: Option<usize>,
}

impl EngineConfigBuilder {
    /// Sets the element count from which draws run in parallel.
    ///
    /// `0` makes every draw parallel, `usize::MAX` keeps every draw
    /// serial; both are valid (and bit-identical in output).
    #[inline]
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = Some(threshold);
        self
    }

    /// Sets the cap on automatically chosen lane counts.
    ///
    /// # Arguments
    ///
    /// * `lanes` - Cap in [1, usize::MAX]
    #[inline]
    pub fn max_auto_lanes(mut self, lanes: usize) -> Self {
        self.max_auto_lanes = Some(lanes);
        self
    }

    /// Sets the lane count used when nothing better is known.
    ///
    /// # Arguments
    ///
    /// * `lanes` - Fallback count in [1, usize::MAX]
    #[inline]
    pub fn default_lanes(mut self, lanes: usize) -> Self {
        self.default_lanes = Some(lanes);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a lane bound is zero.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let defaults = EngineConfig::default();
        let config = EngineConfig {
            parallel_threshold: self
                .parallel_threshold
                .unwrap_or(defaults.parallel_threshold),
            max_auto_lanes: self.max_auto_lanes.unwrap_or(defaults.max_auto_lanes),
            default_lanes: self.default_lanes.unwrap_or(defaults.default_lanes),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.parallel_threshold(), DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(config.max_auto_lanes(), MAX_AUTO_LANES);
        assert_eq!(config.default_lanes(), DEFAULT_LANES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = EngineConfig::builder()
            .parallel_threshold(0)
            .max_auto_lanes(128)
            .default_lanes(4)
            .build()
            .unwrap();
        assert_eq!(config.parallel_threshold(), 0);
        assert_eq!(config.max_auto_lanes(), 128);
        assert_eq!(config.default_lanes(), 4);
    }

    #[test]
    fn test_builder_rejects_zero_lane_bounds() {
        let result = EngineConfig::builder().max_auto_lanes(0).build();
        assert_eq!(result, Err(ConfigError::InvalidLaneCount(0)));

        let result = EngineConfig::builder().default_lanes(0).build();
        assert_eq!(result, Err(ConfigError::InvalidLaneCount(0)));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidLaneCount(0);
        assert!(err.to_string().contains("Invalid lane count 0"));

        let err = ConfigError::InvalidParameter {
            name: "p",
            value: "must lie in [0, 1]".to_string(),
        };
        assert!(err.to_string().contains("'p'"));
    }
}

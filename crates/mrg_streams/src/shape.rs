//! Call-time shape validation.
//!
//! Shapes may depend on runtime values, so they are validated at draw time,
//! before any lane is touched. Dimensions are signed so that negative sizes
//! coming from the caller are representable and rejected rather than
//! silently reinterpreted.

use thiserror::Error;

/// Upper bound (exclusive) on the element count of one draw.
///
/// The combined output is a 31-bit quantity and downstream element counts
/// are 32-bit signed, so a single draw must stay below `2^31` elements.
pub const MAX_ELEMENTS: u128 = 1 << 31;

/// Shape rejection reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// A non-scalar dimension was zero or negative.
    #[error("dimension {index} is {value}; dimensions must be positive")]
    NonPositiveDimension {
        /// Position of the offending dimension.
        index: usize,
        /// The offending value.
        value: i64,
    },

    /// The element count reached the 32-bit representable limit.
    #[error("{total} elements requested; a single draw must stay below 2^31 elements")]
    TooManyElements {
        /// The requested element count (saturated if astronomically large).
        total: u128,
    },
}

/// Validates a requested shape and returns its element count.
///
/// The empty shape denotes a scalar draw and yields exactly one element.
/// Any dimension `<= 0` is invalid, as is a total of `2^31` elements or
/// more.
///
/// # Examples
///
/// ```rust
/// use mrg_streams::shape::validate_shape;
///
/// assert_eq!(validate_shape(&[]).unwrap(), 1);
/// assert_eq!(validate_shape(&[12, 7, 5]).unwrap(), 420);
/// assert!(validate_shape(&[0, 100]).is_err());
/// assert!(validate_shape(&[1 << 31]).is_err());
/// ```
///
/// # Errors
///
/// Returns a [`ShapeError`] naming the first violated rule.
pub fn validate_shape(dims: &[i64]) -> Result<usize, ShapeError> {
    let mut total: u128 = 1;
    for (index, &value) in dims.iter().enumerate() {
        if value <= 0 {
            return Err(ShapeError::NonPositiveDimension { index, value });
        }
        total = total.checked_mul(value as u128).unwrap_or(u128::MAX);
    }
    if total >= MAX_ELEMENTS {
        return Err(ShapeError::TooManyElements { total });
    }
    Ok(total as usize)
}

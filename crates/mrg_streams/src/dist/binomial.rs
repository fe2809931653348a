//! Bernoulli thresholding (binomial with n = 1 per element).

use crate::dtype::{DType, SampleData, SampleFloat};

fn threshold<T: SampleFloat>(units: &[f64], p: f64) -> Vec<T> {
    units
        .iter()
        .map(|&u| if u < p { T::one() } else { T::zero() })
        .collect()
}

/// Maps each unit draw to 1 if `u < p`, else 0.
///
/// The comparison happens on the raw f64 draw; only the 0/1 outcome is
/// converted, so the decision boundary is identical across output
/// precisions.
pub(crate) fn transform(units: &[f64], p: f64, dtype: DType) -> SampleData {
    match dtype {
        DType::F16 => SampleData::F16(threshold(units, p)),
        DType::F32 => SampleData::F32(threshold(units, p)),
        DType::F64 => SampleData::F64(threshold(units, p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrg_core::SeedSpec;

    #[test]
    fn test_reference_pattern_seed_999() {
        // first ten draws of seed 999 thresholded at 0.5; the 0/1 pattern
        // was computed independently of the transformer
        let mut state = SeedSpec::Scalar(999).expand().unwrap();
        let units: Vec<f64> = (0..10).map(|_| state.next_f64()).collect();
        let out = transform(&units, 0.5, DType::F64);
        assert_eq!(
            out,
            SampleData::F64(vec![0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0])
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        // u == p counts as failure: the draw interval is open so the
        // boundary itself can only arrive through the parameter
        let out = transform(&[0.5], 0.5, DType::F64);
        assert_eq!(out, SampleData::F64(vec![0.0]));
    }

    #[test]
    fn test_degenerate_probabilities() {
        let units = [0.001, 0.5, 0.999];
        assert_eq!(
            transform(&units, 0.0, DType::F64),
            SampleData::F64(vec![0.0, 0.0, 0.0])
        );
        // p = 1 accepts every draw: u < 1 always holds in the open interval
        assert_eq!(
            transform(&units, 1.0, DType::F64),
            SampleData::F64(vec![1.0, 1.0, 1.0])
        );
    }

    #[test]
    fn test_outcomes_are_exact_in_f16() {
        let units = [0.1, 0.9];
        if let SampleData::F16(values) = transform(&units, 0.5, DType::F16) {
            assert_eq!(values[0].to_f64(), 1.0);
            assert_eq!(values[1].to_f64(), 0.0);
        } else {
            panic!("expected f16 buffer");
        }
    }
}

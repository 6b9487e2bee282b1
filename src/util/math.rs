//! Probability calibration helpers.
//!
//! Raw activations arrive as `f32`, but every transform here accumulates in
//! `f64` so rounding error does not compound across a full grid.

/// Logistic sigmoid, `1 / (1 + e^-v)`.
#[inline]
pub fn sigmoid(value: f32) -> f64 {
    1.0 / (1.0 + (-f64::from(value)).exp())
}

/// Natural exponential of a single-precision activation.
#[inline]
pub(crate) fn exp(value: f32) -> f64 {
    f64::from(value).exp()
}

/// Softmax over a slice of logits.
///
/// The maximum logit is subtracted before exponentiation; the result is the
/// same distribution but large logits cannot overflow to infinity. Returns an
/// empty vector for empty input.
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits
        .iter()
        .copied()
        .map(f64::from)
        .fold(f64::NEG_INFINITY, f64::max);
    let mut out: Vec<f64> = logits
        .iter()
        .map(|&logit| (f64::from(logit) - max).exp())
        .collect();
    let sum: f64 = out.iter().sum();
    for value in out.iter_mut() {
        *value /= sum;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{exp, sigmoid, softmax};

    #[test]
    fn sigmoid_is_half_at_zero() {
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn sigmoid_saturates_inside_open_interval() {
        assert!(sigmoid(30.0) < 1.0);
        assert!(sigmoid(-30.0) > 0.0);
        assert!(sigmoid(1.0) > sigmoid(0.999));
    }

    #[test]
    fn exp_widens_before_evaluating() {
        assert!((exp(1.0) - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn softmax_matches_reference_distribution() {
        let input = [0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let expected = [
            0.0005766127696870058,
            0.0015673960138976283,
            0.004260624102577064,
            0.01158157707592986,
            0.03148199051039798,
            0.08557692272813494,
            0.23262219398733308,
            0.6323326828120425,
        ];
        let output = softmax(&input);
        assert_eq!(output.len(), expected.len());
        for (value, expected) in output.iter().zip(expected.iter()) {
            assert!((value - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn softmax_of_single_logit_is_certain() {
        assert_eq!(softmax(&[-3.5]), vec![1.0]);
        assert!(softmax(&[]).is_empty());
    }
}

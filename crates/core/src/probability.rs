//! Logit-to-probability transforms.

use crate::error::XaiError;

/// Logistic sigmoid, stable for large magnitudes.
#[must_use]
pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// `[negative, positive]` probabilities from a single positive-class logit.
#[must_use]
pub fn binary_probabilities(logit: f32) -> [f32; 2] {
    let positive = sigmoid(logit);
    [1.0 - positive, positive]
}

#[must_use]
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Class probabilities for one model output.
///
/// A single logit is a binary sigmoid output; wider outputs go through softmax.
///
/// # Errors
///
/// Returns `XaiError::EmptyLogits` for an empty output.
pub fn probabilities(logits: &[f32]) -> crate::Result<Vec<f32>> {
    match logits {
        [] => Err(XaiError::EmptyLogits.into()),
        [logit] => Ok(binary_probabilities(*logit).to_vec()),
        _ => Ok(softmax(logits)),
    }
}

/// Number of classes a model output of `width` logits describes.
#[must_use]
pub const fn class_count(width: usize) -> usize {
    if width == 1 { 2 } else { width }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn sigmoid_midpoint() {
        assert!((sigmoid(0.0) - 0.5).abs() < EPS);
    }

    #[test]
    fn sigmoid_saturates_without_nan() {
        assert!((sigmoid(1000.0) - 1.0).abs() < EPS);
        assert!(sigmoid(-1000.0).abs() < EPS);
        assert!(!sigmoid(-1000.0).is_nan());
    }

    #[test]
    fn binary_columns_sum_to_one() {
        for logit in [-7.5, -1.0, 0.0, 0.3, 4.2] {
            let [neg, pos] = binary_probabilities(logit);
            assert!((neg + pos - 1.0).abs() < EPS);
            assert!((0.0..=1.0).contains(&neg));
        }
    }

    #[test]
    fn positive_logit_means_positive_class() {
        let [neg, pos] = binary_probabilities(2.0);
        assert!(pos > neg);
    }

    #[test]
    fn softmax_sums_to_one() {
        let probs = softmax(&[2.0, 1.0, 0.1]);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < EPS);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }

    #[test]
    fn softmax_large_logits() {
        let probs = softmax(&[1000.0, 0.0]);
        assert!((probs[0] - 1.0).abs() < EPS);
    }

    #[test]
    fn probabilities_dispatch() {
        assert_eq!(probabilities(&[0.0]).unwrap().len(), 2);
        assert_eq!(probabilities(&[0.0, 1.0, 2.0]).unwrap().len(), 3);
        assert!(probabilities(&[]).is_err());
    }

    #[test]
    fn class_count_for_widths() {
        assert_eq!(class_count(1), 2);
        assert_eq!(class_count(2), 2);
        assert_eq!(class_count(4), 4);
    }
}

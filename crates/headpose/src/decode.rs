use crate::bins::AxisBinSpec;
use crate::error::DecodeError;

/// Decode one axis's raw bin scores into a continuous angle in degrees.
///
/// Softmax over the scores, then the probability-weighted mean bin index,
/// mapped to degrees through the axis spec. Expectation decoding (rather
/// than arg-max) is what makes the classification head yield a continuous
/// estimate.
pub fn decode(scores: &[f32], spec: &AxisBinSpec) -> Result<f32, DecodeError> {
    if scores.len() != spec.num_classes() {
        return Err(DecodeError::ShapeMismatch {
            expected: spec.num_classes(),
            got: scores.len(),
        });
    }
    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return Err(DecodeError::NumericDomain { index });
    }

    let probs = softmax(scores);
    let expected_index: f32 = probs
        .iter()
        .enumerate()
        .map(|(i, p)| i as f32 * p)
        .sum();

    Ok(expected_index * spec.bin_width() + spec.offset())
}

/// Numerically stable softmax: the max score is subtracted before
/// exponentiating so large logits cannot overflow.
fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

use super::ProcessingError;
use ndarray::ArrayViewD;
use serde::Serialize;

/// One calibrated, image-space detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    pub score: f32,
    pub label: i64,
    pub label_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Full detection response for one image.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub image_size: ImageSize,
    pub detections: Vec<Detection>,
}

pub struct PostProcessor {
    pub score_threshold: f32,
}

impl PostProcessor {
    pub fn new(score_threshold: f32) -> Self {
        Self { score_threshold }
    }

    /// Turn raw detector tensors into calibrated image-space detections.
    ///
    /// `boxes` is `[1, N, 5]` (x1, y1, x2, y2, score) in model-input
    /// pixel coordinates, `labels` is `[1, N]`. Rows below the score
    /// threshold are dropped (strict `<`; boundary-equal scores are
    /// kept). A NaN or infinite score, or a non-finite coordinate in a
    /// kept row, fails with a numeric-domain error rather than saturating
    /// into a fabricated box. Surviving boxes are rescaled per axis by
    /// `original_size / model_input_size` with round-half-away-from-zero,
    /// then clamped so that `0 <= x1 < x2 <= width` and
    /// `0 <= y1 < y2 <= height` hold even for inverted or zero-area raw
    /// boxes.
    ///
    /// `model_input_size` is the full padded canvas fed to the detector,
    /// not the pre-pad content rectangle; the deployed model was
    /// calibrated against the canvas and the letterbox offsets are
    /// intentionally not subtracted. A caller that wants the content
    /// convention can pass the `LetterboxTransform` content dimensions
    /// here instead.
    ///
    /// Detections come back in the detector's native row order. No
    /// non-maximum suppression and no score sort are applied; overlap
    /// handling is the upstream model's responsibility.
    pub fn process(
        &self,
        boxes: &ArrayViewD<f32>,
        labels: &ArrayViewD<i64>,
        original_size: (u32, u32),
        model_input_size: (u32, u32),
        class_names: &[String],
    ) -> Result<Vec<Detection>, ProcessingError> {
        if boxes.ndim() != 3 || boxes.shape()[0] != 1 || boxes.shape()[2] != 5 {
            return Err(ProcessingError::MalformedTensor {
                reason: format!("expected boxes of shape [1, N, 5], got {:?}", boxes.shape()),
            });
        }
        if labels.ndim() != 2 || labels.shape()[0] != 1 {
            return Err(ProcessingError::MalformedTensor {
                reason: format!("expected labels of shape [1, N], got {:?}", labels.shape()),
            });
        }
        if boxes.shape()[1] != labels.shape()[1] {
            return Err(ProcessingError::ShapeMismatch {
                boxes: boxes.shape()[1],
                labels: labels.shape()[1],
            });
        }

        let (orig_w, orig_h) = original_size;
        let (input_w, input_h) = model_input_size;
        let scale_x = orig_w as f32 / input_w as f32;
        let scale_y = orig_h as f32 / input_h as f32;

        let num_rows = boxes.shape()[1];
        let mut detections = Vec::new();

        for i in 0..num_rows {
            let score = boxes[[0, i, 4]];
            if !score.is_finite() {
                return Err(ProcessingError::NumericDomain { row: i });
            }
            if score < self.score_threshold {
                continue;
            }
            if (0..4).any(|c| !boxes[[0, i, c]].is_finite()) {
                return Err(ProcessingError::NumericDomain { row: i });
            }

            let x1 = (boxes[[0, i, 0]] * scale_x).round() as i64;
            let y1 = (boxes[[0, i, 1]] * scale_y).round() as i64;
            let x2 = (boxes[[0, i, 2]] * scale_x).round() as i64;
            let y2 = (boxes[[0, i, 3]] * scale_y).round() as i64;

            // Clamp x1/y1 first, then force x2/y2 strictly past them, so
            // inverted or zero-area raw boxes still come out non-degenerate.
            let x1 = x1.clamp(0, i64::from(orig_w) - 1);
            let y1 = y1.clamp(0, i64::from(orig_h) - 1);
            let x2 = x2.min(i64::from(orig_w)).max(x1 + 1);
            let y2 = y2.min(i64::from(orig_h)).max(y1 + 1);

            let label = labels[[0, i]];
            let label_text = usize::try_from(label)
                .ok()
                .and_then(|idx| class_names.get(idx))
                .cloned()
                .unwrap_or_else(|| format!("unknown_{label}"));

            detections.push(Detection {
                x1: x1 as u32,
                y1: y1 as u32,
                x2: x2 as u32,
                y2: y2 as u32,
                score: (score * 10_000.0).round() / 10_000.0,
                label,
                label_text,
            });
        }

        tracing::debug!(
            raw = num_rows,
            kept = detections.len(),
            "Filtered detector output"
        );

        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    fn class_names() -> Vec<String> {
        vec!["eyes".to_string()]
    }

    /// Build [1, N, 5] boxes and [1, N] labels from row tuples
    fn tensors(rows: &[([f32; 5], i64)]) -> (Array<f32, IxDyn>, Array<i64, IxDyn>) {
        let n = rows.len();
        let mut box_data = Vec::with_capacity(n * 5);
        let mut label_data = Vec::with_capacity(n);
        for (coords, label) in rows {
            box_data.extend_from_slice(coords);
            label_data.push(*label);
        }
        (
            Array::from_shape_vec(IxDyn(&[1, n, 5]), box_data).unwrap(),
            Array::from_shape_vec(IxDyn(&[1, n]), label_data).unwrap(),
        )
    }

    /// Test that scores below the threshold are dropped and
    /// boundary-equal scores are kept
    #[test]
    fn test_threshold_is_boundary_inclusive() {
        let (boxes, labels) = tensors(&[
            ([10.0, 10.0, 20.0, 20.0, 0.5], 0),
            ([30.0, 30.0, 40.0, 40.0, 0.4999], 0),
            ([50.0, 50.0, 60.0, 60.0, 0.9], 0),
        ]);

        let post = PostProcessor::new(0.5);
        let detections = post
            .process(&boxes.view(), &labels.view(), (800, 800), (800, 800), &class_names())
            .unwrap();

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].score, 0.5);
        assert_eq!(detections[1].score, 0.9);
    }

    /// Test the full-canvas rescale from the spec scenario:
    /// 800x800 model space onto a 1000x500 image
    #[test]
    fn test_rescale_to_image_space() {
        let (boxes, labels) = tensors(&[([0.0, 0.0, 800.0, 800.0, 0.9], 0)]);

        let post = PostProcessor::new(0.3);
        let detections = post
            .process(&boxes.view(), &labels.view(), (1000, 500), (800, 800), &class_names())
            .unwrap();

        assert_eq!(detections.len(), 1);
        let d = &detections[0];
        assert_eq!((d.x1, d.y1, d.x2, d.y2), (0, 0, 1000, 500));
        assert!(d.x1 < d.x2 && d.x2 <= 1000);
        assert!(d.y1 < d.y2 && d.y2 <= 500);
    }

    /// Test rounding is half-away-from-zero, not truncation
    #[test]
    fn test_round_half_away_from_zero() {
        // scale_x = scale_y = 0.5: 101 * 0.5 = 50.5 rounds to 51
        let (boxes, labels) = tensors(&[([101.0, 99.0, 201.0, 199.0, 0.9], 0)]);

        let post = PostProcessor::new(0.3);
        let detections = post
            .process(&boxes.view(), &labels.view(), (400, 400), (800, 800), &class_names())
            .unwrap();

        let d = &detections[0];
        assert_eq!((d.x1, d.y1, d.x2, d.y2), (51, 50, 101, 100));
    }

    /// Test that degenerate and inverted raw boxes come out non-degenerate
    #[test]
    fn test_degenerate_boxes_forced_valid() {
        let (boxes, labels) = tensors(&[
            ([300.0, 300.0, 300.0, 300.0, 0.9], 0), // zero area
            ([500.0, 500.0, 400.0, 400.0, 0.9], 0), // inverted
            ([799.0, 799.0, 799.0, 799.0, 0.9], 0), // zero area at the far corner
        ]);

        let post = PostProcessor::new(0.3);
        let detections = post
            .process(&boxes.view(), &labels.view(), (800, 800), (800, 800), &class_names())
            .unwrap();

        for d in &detections {
            assert!(d.x1 < d.x2 && d.x2 <= 800, "{d:?}");
            assert!(d.y1 < d.y2 && d.y2 <= 800, "{d:?}");
        }
        assert_eq!((detections[0].x1, detections[0].x2), (300, 301));
        assert_eq!((detections[2].x1, detections[2].x2), (799, 800));
    }

    /// Test that negative raw coordinates clamp to zero
    #[test]
    fn test_negative_coordinates_clamped() {
        let (boxes, labels) = tensors(&[([-50.0, -20.0, 100.0, 100.0, 0.9], 0)]);

        let post = PostProcessor::new(0.3);
        let detections = post
            .process(&boxes.view(), &labels.view(), (800, 800), (800, 800), &class_names())
            .unwrap();

        let d = &detections[0];
        assert_eq!((d.x1, d.y1), (0, 0));
        assert_eq!((d.x2, d.y2), (100, 100));
    }

    /// Test class-name resolution with the unknown_<idx> fallback
    #[test]
    fn test_label_lookup_with_fallback() {
        let (boxes, labels) = tensors(&[
            ([10.0, 10.0, 20.0, 20.0, 0.9], 0),
            ([10.0, 10.0, 20.0, 20.0, 0.9], 5),
            ([10.0, 10.0, 20.0, 20.0, 0.9], -3),
        ]);

        let post = PostProcessor::new(0.3);
        let detections = post
            .process(&boxes.view(), &labels.view(), (800, 800), (800, 800), &class_names())
            .unwrap();

        assert_eq!(detections[0].label_text, "eyes");
        assert_eq!(detections[1].label_text, "unknown_5");
        assert_eq!(detections[2].label_text, "unknown_-3");
    }

    /// Test that scores are rounded to 4 decimal digits
    #[test]
    fn test_score_rounded_to_four_decimals() {
        let (boxes, labels) = tensors(&[([10.0, 10.0, 20.0, 20.0, 0.912_345_6], 0)]);

        let post = PostProcessor::new(0.3);
        let detections = post
            .process(&boxes.view(), &labels.view(), (800, 800), (800, 800), &class_names())
            .unwrap();

        assert_eq!(detections[0].score, 0.9123);
    }

    /// Test that mismatched box/label row counts fail with ShapeMismatch
    #[test]
    fn test_row_count_mismatch_fails() {
        let boxes =
            Array::from_shape_vec(IxDyn(&[1, 2, 5]), vec![0.0f32; 10]).unwrap();
        let labels = Array::from_shape_vec(IxDyn(&[1, 3]), vec![0i64; 3]).unwrap();

        let post = PostProcessor::new(0.3);
        let result = post.process(
            &boxes.view(),
            &labels.view(),
            (800, 800),
            (800, 800),
            &class_names(),
        );

        assert!(matches!(
            result,
            Err(ProcessingError::ShapeMismatch { boxes: 2, labels: 3 })
        ));
    }

    /// Test that a detector emitting rows of the wrong width is rejected
    #[test]
    fn test_malformed_box_tensor_fails() {
        let boxes = Array::from_shape_vec(IxDyn(&[1, 2, 4]), vec![0.0f32; 8]).unwrap();
        let labels = Array::from_shape_vec(IxDyn(&[1, 2]), vec![0i64; 2]).unwrap();

        let post = PostProcessor::new(0.3);
        let result = post.process(
            &boxes.view(),
            &labels.view(),
            (800, 800),
            (800, 800),
            &class_names(),
        );

        assert!(matches!(result, Err(ProcessingError::MalformedTensor { .. })));
    }

    /// Test that input order survives: no score sort, no NMS
    #[test]
    fn test_native_order_preserved() {
        let (boxes, labels) = tensors(&[
            ([10.0, 10.0, 20.0, 20.0, 0.4], 0),
            ([10.0, 10.0, 20.0, 20.0, 0.99], 0), // overlaps row 0 entirely
            ([10.0, 10.0, 20.0, 20.0, 0.7], 0),
        ]);

        let post = PostProcessor::new(0.3);
        let detections = post
            .process(&boxes.view(), &labels.view(), (800, 800), (800, 800), &class_names())
            .unwrap();

        let scores: Vec<f32> = detections.iter().map(|d| d.score).collect();
        assert_eq!(scores, vec![0.4, 0.99, 0.7]);
    }

    /// Test that a NaN score fails instead of slipping past the
    /// threshold comparison into the output
    #[test]
    fn test_nan_score_fails() {
        let (boxes, labels) = tensors(&[
            ([10.0, 10.0, 20.0, 20.0, 0.9], 0),
            ([30.0, 30.0, 40.0, 40.0, f32::NAN], 0),
        ]);

        let post = PostProcessor::new(0.3);
        let result = post.process(
            &boxes.view(),
            &labels.view(),
            (800, 800),
            (800, 800),
            &class_names(),
        );

        assert!(matches!(
            result,
            Err(ProcessingError::NumericDomain { row: 1 })
        ));
    }

    /// Test that non-finite coordinates in a kept row fail instead of
    /// saturating into a garbage box
    #[test]
    fn test_non_finite_coordinates_fail() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let (boxes, labels) = tensors(&[([10.0, bad, 20.0, 20.0, 0.9], 0)]);

            let post = PostProcessor::new(0.3);
            let result = post.process(
                &boxes.view(),
                &labels.view(),
                (800, 800),
                (800, 800),
                &class_names(),
            );

            assert!(
                matches!(result, Err(ProcessingError::NumericDomain { row: 0 })),
                "coordinate {bad} should be rejected"
            );
        }
    }

    /// Test that non-finite coordinates in a row the threshold drops do
    /// not fail the whole batch
    #[test]
    fn test_dropped_row_coordinates_not_inspected() {
        let (boxes, labels) = tensors(&[
            ([f32::NAN, f32::NAN, f32::NAN, f32::NAN, 0.1], 0),
            ([10.0, 10.0, 20.0, 20.0, 0.9], 0),
        ]);

        let post = PostProcessor::new(0.3);
        let detections = post
            .process(&boxes.view(), &labels.view(), (800, 800), (800, 800), &class_names())
            .unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].score, 0.9);
    }

    /// Test empty detector output
    #[test]
    fn test_empty_input() {
        let boxes = Array::from_shape_vec(IxDyn(&[1, 0, 5]), vec![]).unwrap();
        let labels = Array::from_shape_vec(IxDyn(&[1, 0]), vec![]).unwrap();

        let post = PostProcessor::new(0.3);
        let detections = post
            .process(&boxes.view(), &labels.view(), (800, 800), (800, 800), &class_names())
            .unwrap();
        assert!(detections.is_empty());
    }

    /// Pin the shipped rescale convention: boxes are mapped through the
    /// full padded canvas, letterbox offsets are not subtracted
    #[test]
    fn test_padded_canvas_convention() {
        // A 1000x500 image letterboxed into 800x800 occupies rows
        // 200..600 of the canvas. A box at canvas y=200 (the content top)
        // maps through the canvas scale to image y=125, not to y=0 as the
        // content convention would give.
        let (boxes, labels) = tensors(&[([0.0, 200.0, 800.0, 600.0, 0.9], 0)]);

        let post = PostProcessor::new(0.3);
        let detections = post
            .process(&boxes.view(), &labels.view(), (1000, 500), (800, 800), &class_names())
            .unwrap();

        let d = &detections[0];
        assert_eq!((d.y1, d.y2), (125, 375));
    }
}

use crate::backend::{DetectorBackend, PoseBackend};
use crate::config::InferenceConfig;
use crate::processing::post::{DetectionReport, ImageSize, PostProcessor};
use crate::processing::pre::{ColorFormat, PreProcessor};
use headpose::{PoseAngles, PoseBinSpecs, decode};

/// End-to-end head pose estimation: image in, degrees out.
///
/// Owns the model session for its whole lifetime; construct once and
/// reuse across requests.
pub struct PoseEstimator<B: PoseBackend> {
    backend: B,
    preprocessor: PreProcessor,
    specs: PoseBinSpecs,
}

impl<B: PoseBackend> PoseEstimator<B> {
    pub fn new(backend: B, config: &InferenceConfig) -> Self {
        Self {
            backend,
            preprocessor: PreProcessor::new(config.input_size),
            specs: PoseBinSpecs::default(),
        }
    }

    pub fn with_specs(backend: B, config: &InferenceConfig, specs: PoseBinSpecs) -> Self {
        Self {
            backend,
            preprocessor: PreProcessor::new(config.input_size),
            specs,
        }
    }

    /// Estimate pose from encoded image bytes (JPEG or PNG).
    pub fn estimate(&mut self, image_bytes: &[u8]) -> anyhow::Result<PoseAngles> {
        let image = image::load_from_memory(image_bytes)?.to_rgb8();
        let (width, height) = image.dimensions();
        self.estimate_rgb(image.as_raw(), width, height)
    }

    /// Estimate pose from an interleaved RGB frame already in memory.
    pub fn estimate_rgb(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> anyhow::Result<PoseAngles> {
        let (input, _) = self
            .preprocessor
            .preprocess(pixels, width, height, ColorFormat::Rgb)?;

        let scores = self.backend.infer(&input)?;

        let angles = PoseAngles {
            yaw: decode(axis_slice(&scores.yaw)?, &self.specs.yaw)?,
            pitch: decode(axis_slice(&scores.pitch)?, &self.specs.pitch)?,
            roll: decode(axis_slice(&scores.roll)?, &self.specs.roll)?,
        };

        tracing::debug!(
            yaw = angles.yaw,
            pitch = angles.pitch,
            roll = angles.roll,
            "Decoded head pose"
        );

        Ok(angles)
    }
}

/// End-to-end eye-region detection producing a calibrated report in the
/// original image's pixel frame.
pub struct EyeDetector<B: DetectorBackend> {
    backend: B,
    preprocessor: PreProcessor,
    postprocessor: PostProcessor,
    class_names: Vec<String>,
}

impl<B: DetectorBackend> EyeDetector<B> {
    pub fn new(backend: B, config: &InferenceConfig) -> Self {
        Self {
            backend,
            preprocessor: PreProcessor::new(config.input_size),
            postprocessor: PostProcessor::new(config.score_threshold),
            class_names: config.class_names.clone(),
        }
    }

    /// Detect eye regions in encoded image bytes (JPEG or PNG).
    pub fn detect(&mut self, image_bytes: &[u8]) -> anyhow::Result<DetectionReport> {
        let image = image::load_from_memory(image_bytes)?.to_rgb8();
        let (width, height) = image.dimensions();
        self.detect_rgb(image.as_raw(), width, height)
    }

    /// Detect eye regions in an interleaved RGB frame already in memory.
    pub fn detect_rgb(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> anyhow::Result<DetectionReport> {
        let (input, _) = self
            .preprocessor
            .preprocess(pixels, width, height, ColorFormat::Rgb)?;

        let output = self.backend.infer(&input)?;

        // Boxes are calibrated against the full padded canvas the model
        // saw, so the canvas size is what rescaling divides by.
        let detections = self.postprocessor.process(
            &output.boxes.view(),
            &output.labels.view(),
            (width, height),
            self.preprocessor.input_size,
            &self.class_names,
        )?;

        Ok(DetectionReport {
            image_size: ImageSize { width, height },
            detections,
        })
    }
}

fn axis_slice(scores: &ndarray::ArrayD<f32>) -> anyhow::Result<&[f32]> {
    scores
        .as_slice()
        .ok_or_else(|| anyhow::anyhow!("score tensor is not contiguous"))
}

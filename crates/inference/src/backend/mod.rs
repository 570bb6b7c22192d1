use ndarray::{Array, IxDyn};

#[cfg(feature = "ort-backend")]
pub mod ort;

/// Raw per-axis bin scores from the pose head, each `[1, num_classes]`.
pub struct PoseScores {
    pub yaw: ndarray::ArrayD<f32>,
    pub pitch: ndarray::ArrayD<f32>,
    pub roll: ndarray::ArrayD<f32>,
}

/// Raw detector tensors: boxes `[1, N, 5]` (x1, y1, x2, y2, score) in
/// model-input coordinates and class labels `[1, N]`.
pub struct DetectorOutput {
    pub boxes: ndarray::ArrayD<f32>,
    pub labels: ndarray::ArrayD<i64>,
}

/// Head-pose model session. Loaded once and owned by the caller; the
/// blocking inference call lives behind this seam.
pub trait PoseBackend {
    fn load_model(path: &str) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn infer(&mut self, input: &Array<f32, IxDyn>) -> anyhow::Result<PoseScores>;
}

/// Eye-region detector session.
pub trait DetectorBackend {
    fn load_model(path: &str) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn infer(&mut self, input: &Array<f32, IxDyn>) -> anyhow::Result<DetectorOutput>;
}

pub mod backend;
pub mod config;
pub mod processing;
pub mod service;

// Re-export commonly used types for convenience
pub use backend::{DetectorBackend, DetectorOutput, PoseBackend, PoseScores};
pub use config::InferenceConfig;
pub use processing::post::{Detection, DetectionReport, PostProcessor};
pub use processing::pre::{ColorFormat, LetterboxTransform, PreProcessor};
pub use service::{EyeDetector, PoseEstimator};

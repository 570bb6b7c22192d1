use std::env;

pub use common::Environment;

/// Default eye-detector input canvas. Box rescaling in postprocessing
/// assumes this is the full padded canvas, not the pre-pad content size.
pub const DEFAULT_INPUT_SIZE: (u32, u32) = (800, 800);

pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub environment: Environment,
    pub log_level: String,
    pub pose_model_path: String,
    pub eye_model_path: String,
    pub input_size: (u32, u32),
    pub score_threshold: f32,
    pub class_names: Vec<String>,
}

impl InferenceConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let pose_model_path =
            env::var("POSE_MODEL_PATH").unwrap_or_else(|_| "models/pose.onnx".to_string());

        let eye_model_path =
            env::var("EYE_MODEL_PATH").unwrap_or_else(|_| "models/eye.onnx".to_string());

        let input_width = env::var("INPUT_WIDTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_INPUT_SIZE.0);

        let input_height = env::var("INPUT_HEIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_INPUT_SIZE.1);

        let score_threshold = env::var("SCORE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SCORE_THRESHOLD);

        let class_names = env::var("CLASS_NAMES")
            .map(|s| s.split(',').map(|n| n.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["eyes".to_string()]);

        if input_width == 0 || input_height == 0 {
            anyhow::bail!("input size must be non-zero, got {input_width}x{input_height}");
        }
        if !(0.0..=1.0).contains(&score_threshold) {
            anyhow::bail!("score threshold must be within [0, 1], got {score_threshold}");
        }

        Ok(Self {
            environment,
            log_level,
            pose_model_path,
            eye_model_path,
            input_size: (input_width, input_height),
            score_threshold,
            class_names,
        })
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            log_level: "info".to_string(),
            pose_model_path: "models/pose.onnx".to_string(),
            eye_model_path: "models/eye.onnx".to_string(),
            input_size: DEFAULT_INPUT_SIZE,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            class_names: vec!["eyes".to_string()],
        }
    }
}

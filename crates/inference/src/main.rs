use clap::{Parser, ValueEnum};
use common::setup_logging;
use inference::backend::ort::{OrtEyeDetector, OrtPoseModel};
use inference::backend::{DetectorBackend, PoseBackend};
use inference::{EyeDetector, InferenceConfig, PoseEstimator};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Task {
    /// Head orientation (yaw, pitch, roll) in degrees
    Pose,
    /// Eye-region bounding boxes in image coordinates
    Eyes,
}

/// Run one analysis task on a single image and print the result as JSON.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(long, value_enum)]
    task: Task,

    /// Model path; defaults to POSE_MODEL_PATH / EYE_MODEL_PATH
    #[arg(long)]
    model: Option<PathBuf>,

    /// Score threshold for the eyes task
    #[arg(long)]
    threshold: Option<f32>,

    /// Image file (JPEG or PNG)
    image: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = InferenceConfig::from_env()?;
    if let Some(threshold) = args.threshold {
        config.score_threshold = threshold;
    }

    setup_logging(&config.log_level, config.environment.clone());

    tracing::info!(config = ?config, "Loaded configuration");

    let image_bytes = fs::read(&args.image)?;

    match args.task {
        Task::Pose => {
            let model_path = args
                .model
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| config.pose_model_path.clone());
            let backend = OrtPoseModel::load_model(&model_path)?;
            let mut estimator = PoseEstimator::new(backend, &config);
            let angles = estimator.estimate(&image_bytes)?;
            println!("{}", serde_json::to_string_pretty(&angles)?);
        }
        Task::Eyes => {
            let model_path = args
                .model
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| config.eye_model_path.clone());
            let backend = OrtEyeDetector::load_model(&model_path)?;
            let mut detector = EyeDetector::new(backend, &config);
            let report = detector.detect(&image_bytes)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

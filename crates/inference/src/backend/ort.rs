use super::{DetectorBackend, DetectorOutput, PoseBackend, PoseScores};
use ndarray::{Array, IxDyn};
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};

fn load_session(path: &str) -> anyhow::Result<Session> {
    // Initialize ORT environment (idempotent)
    let _ = ort::init().commit();

    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .commit_from_file(path)?;

    tracing::info!("Model loaded from {}", path);
    Ok(session)
}

/// ONNX Runtime session for the three-headed pose network. Outputs are
/// read by position: yaw, pitch, roll.
pub struct OrtPoseModel {
    session: Session,
}

impl PoseBackend for OrtPoseModel {
    fn load_model(path: &str) -> anyhow::Result<Self> {
        Ok(Self {
            session: load_session(path)?,
        })
    }

    fn infer(&mut self, input: &Array<f32, IxDyn>) -> anyhow::Result<PoseScores> {
        let input_name = self.session.inputs()[0].name().to_string();
        let outputs = self.session.run(ort::inputs![
            input_name.as_str() => TensorRef::from_array_view(input.view())?
        ])?;

        let yaw = outputs[0].try_extract_array::<f32>()?;
        let pitch = outputs[1].try_extract_array::<f32>()?;
        let roll = outputs[2].try_extract_array::<f32>()?;

        Ok(PoseScores {
            yaw: yaw.into_owned(),
            pitch: pitch.into_owned(),
            roll: roll.into_owned(),
        })
    }
}

/// ONNX Runtime session for the eye detector. Outputs by position:
/// boxes-with-scores `[1, N, 5]`, then labels `[1, N]`.
pub struct OrtEyeDetector {
    session: Session,
}

impl DetectorBackend for OrtEyeDetector {
    fn load_model(path: &str) -> anyhow::Result<Self> {
        Ok(Self {
            session: load_session(path)?,
        })
    }

    fn infer(&mut self, input: &Array<f32, IxDyn>) -> anyhow::Result<DetectorOutput> {
        let input_name = self.session.inputs()[0].name().to_string();
        let outputs = self.session.run(ort::inputs![
            input_name.as_str() => TensorRef::from_array_view(input.view())?
        ])?;

        let boxes = outputs[0].try_extract_array::<f32>()?;
        let labels = outputs[1].try_extract_array::<i64>()?;

        Ok(DetectorOutput {
            boxes: boxes.into_owned(),
            labels: labels.into_owned(),
        })
    }
}

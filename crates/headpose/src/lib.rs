//! Joint classification-regression head pose decoding.
//!
//! The pose network emits one raw score vector per axis (yaw, pitch,
//! roll), each scoring a discretized angle bin. [`bins`] owns the bin
//! geometry and the angle↔bin quantizer; [`decode`] turns a score vector
//! back into continuous degrees via softmax expectation.

pub mod bins;
pub mod decode;
pub mod error;

pub use bins::{AxisBinSpec, PoseBinSpecs};
pub use decode::decode;
pub use error::DecodeError;

use serde::Serialize;

/// Decoded head orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoseAngles {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

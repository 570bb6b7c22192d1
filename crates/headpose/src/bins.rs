use crate::error::DecodeError;

/// Bin geometry for one rotation axis.
///
/// Bin `i` covers `[offset + i*width, offset + (i+1)*width)` degrees.
/// Two models trained with different bin layouts must each be decoded
/// with their own spec; nothing here assumes yaw/pitch/roll agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBinSpec {
    num_classes: usize,
    bin_width: f32,
    offset: f32,
}

impl AxisBinSpec {
    pub fn new(num_classes: usize, bin_width: f32, offset: f32) -> Result<Self, DecodeError> {
        if num_classes == 0 {
            return Err(DecodeError::Configuration {
                reason: "num_classes must be positive".to_string(),
            });
        }
        if !bin_width.is_finite() || bin_width <= 0.0 {
            return Err(DecodeError::Configuration {
                reason: format!("bin_width must be a positive finite degree value, got {bin_width}"),
            });
        }
        if !offset.is_finite() {
            return Err(DecodeError::Configuration {
                reason: format!("offset must be finite, got {offset}"),
            });
        }
        Ok(Self {
            num_classes,
            bin_width,
            offset,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn bin_width(&self) -> f32 {
        self.bin_width
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Quantize a continuous angle to its bin index.
    ///
    /// Out-of-range angles saturate to the boundary bin instead of
    /// erroring. Label generation relies on this: extreme ground-truth
    /// angles land in the edge bin.
    pub fn to_bin(&self, angle: f32) -> usize {
        let raw = ((angle - self.offset) / self.bin_width).floor();
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.num_classes - 1)
        }
    }

    /// Center angle of a bin, for diagnostics and tests. Decoding does
    /// not go through here; it uses the softmax expectation directly.
    pub fn bin_center(&self, label: usize) -> f32 {
        self.offset + (label as f32 + 0.5) * self.bin_width
    }
}

/// Per-axis bin layout of a deployed pose model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseBinSpecs {
    pub yaw: AxisBinSpec,
    pub pitch: AxisBinSpec,
    pub roll: AxisBinSpec,
}

impl Default for PoseBinSpecs {
    /// Layout of the shipped ResNet-34 pose head: 19 yaw bins at 10°,
    /// 38 pitch/roll bins at 5°, all starting at −93°.
    fn default() -> Self {
        Self {
            yaw: AxisBinSpec::new(19, 10.0, -93.0).unwrap(),
            pitch: AxisBinSpec::new(38, 5.0, -93.0).unwrap(),
            roll: AxisBinSpec::new(38, 5.0, -93.0).unwrap(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Score vector length does not match the number of bins the axis
    /// spec declares. Never silently truncated or padded.
    #[error("score vector has {got} entries but the axis spec declares {expected} bins")]
    ShapeMismatch { expected: usize, got: usize },

    /// Axis bin spec is not usable (non-positive bin count or width,
    /// non-finite width or offset).
    #[error("invalid axis bin spec: {reason}")]
    Configuration { reason: String },

    /// A raw score is NaN or infinite; the expectation sum would be
    /// meaningless, so this fails instead of propagating NaN.
    #[error("non-finite score at bin {index}")]
    NumericDomain { index: usize },
}

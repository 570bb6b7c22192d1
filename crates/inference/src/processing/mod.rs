pub mod post;
pub mod pre;

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// Pixel buffer length disagrees with the declared frame dimensions.
    #[error("pixel buffer holds {got} bytes but a {width}x{height} frame needs {expected}")]
    PixelBufferMismatch {
        expected: usize,
        got: usize,
        width: u32,
        height: u32,
    },

    /// Detector box and label tensors disagree on the number of rows.
    /// Never reconciled by truncation.
    #[error("detector emitted {boxes} box rows but {labels} class labels")]
    ShapeMismatch { boxes: usize, labels: usize },

    /// Detector tensor does not have the expected [1, N, 5] / [1, N] layout.
    #[error("unexpected detector tensor layout: {reason}")]
    MalformedTensor { reason: String },

    /// A detector row the threshold would keep carries a NaN or infinite
    /// value; failing here keeps a malformed model output from turning
    /// into a fabricated detection.
    #[error("non-finite value in detector row {row}")]
    NumericDomain { row: usize },

    #[error(transparent)]
    ImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error(transparent)]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error(transparent)]
    TensorShape(#[from] ndarray::ShapeError),
}

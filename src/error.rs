use thiserror::Error;

/// Failures while acquiring a frame from the host display.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no display available: {0}")]
    NoDisplay(String),

    #[error("capture failed: {0}")]
    Frame(#[from] std::io::Error),

    #[error("captured buffer is smaller than the display area")]
    ShortBuffer,
}

/// Failures while rescaling or JPEG-encoding a captured frame.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("jpeg encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),

    #[error("frame buffer does not match its dimensions")]
    BadDimensions,
}

//! Error types for the hand pointer library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// `ONNX` Runtime inference failed
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `X11` window system operation failed
    #[error("X11 error: {0}")]
    X11(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model loading or inference error
    #[error("Model error: {0}")]
    ModelError(String),

    /// Model output processing error
    #[error("Model output error: {0}")]
    ModelOutputError(String),

    /// Pointer input injection failed
    #[error("Input injection error: {0}")]
    InputInjection(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Calibration corners span zero distance on one axis
    #[error("Degenerate calibration: {axis} span between Top-Left and Bottom-Right is zero")]
    DegenerateCalibration {
        /// Axis name ("x" or "y")
        axis: &'static str,
    },

    /// Corner mapping requested without a usable calibration record
    #[error("Calibration missing: {0}")]
    CalibrationMissing(String),

    /// Video source could not be opened or stopped producing frames
    #[error("Video source error: {0}")]
    VideoSource(String),
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the mealprint-core library.
//!
//! This module provides granular error variants for different failure modes,
//! enabling precise error handling and user-friendly error messages.

use thiserror::Error;

/// Generic user-facing message for any failed analysis attempt.
///
/// Every network, API, or response-shape failure collapses to this single
/// message before it reaches the presentation layer; the finer-grained
/// variants exist for diagnostics only.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Could not analyze the image. Please try again later.";

/// Guidance shown when the user triggers an analysis with no image selected.
pub const NO_IMAGE_MESSAGE: &str = "Please select an image first.";

/// Errors that can occur within the mealprint-core library.
///
/// Each variant represents a specific failure mode with contextual information
/// to help diagnose and handle errors appropriately.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing API key, invalid values).
    /// Fatal at startup; never recoverable at runtime.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis was triggered with no image selected. Local guard failure,
    /// never reaches the network.
    #[error("No image selected")]
    NoImageSelected,

    /// The selected image could not be read, decoded, or is unsupported.
    #[error("Image input failed: {0}")]
    ImageInput(String),

    /// The inference API call itself failed (transport error, non-success
    /// status, quota).
    #[error("Inference request failed: {0}")]
    InferenceRequest(String),

    /// The inference call succeeded but the returned text was not valid JSON
    /// or did not match the required report shape.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an image input error with the given message.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::ImageInput(msg.into())
    }

    /// Creates an inference request error with the given message.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::InferenceRequest(msg.into())
    }

    /// Creates a malformed response error with the given message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Maps this error to the message shown to the user.
    ///
    /// All analysis failures share one generic message; only the missing-image
    /// guard gets its own guidance text.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoImageSelected => NO_IMAGE_MESSAGE,
            _ => ANALYSIS_FAILED_MESSAGE,
        }
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

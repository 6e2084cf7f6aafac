//! Error types for the slideshow pipelines.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for slideshow operations.
pub type SlideshowResult<T> = Result<T, SlideshowError>;

/// Errors raised while resolving, selecting, fetching or rendering images.
#[derive(Debug, Error)]
pub enum SlideshowError {
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("{0} not found in environment or .env file")]
    CredentialNotFound(String),

    #[error("{0}")]
    EmptyInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from board API: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No valid images could be processed")]
    NoValidFrames,

    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFmpeg command failed: {message}")]
    Ffmpeg {
        message: String,
        stderr: Option<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl SlideshowError {
    /// Create an empty-input error.
    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::EmptyInput(message.into())
    }

    /// Create an invalid-parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Ffmpeg {
            message: message.into(),
            stderr,
        }
    }

    /// Whether this error belongs to the not-found category (missing input or credential).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FolderNotFound(_) | Self::CredentialNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_not_found_message_names_the_path() {
        let err = SlideshowError::FolderNotFound(PathBuf::from("/no/such/dir"));
        assert_eq!(err.to_string(), "Folder not found: /no/such/dir");
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_input_message_is_passed_through() {
        let err = SlideshowError::empty_input("No pins found in board");
        assert_eq!(err.to_string(), "No pins found in board");
        assert!(!err.is_not_found());
    }
}

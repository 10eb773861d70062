//! Error types for Lenslate
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Lenslate operations
///
/// This enum encompasses all possible errors that can occur during a
/// translation run, overlay rendering, history persistence, and
/// configuration loading. Fatal pipeline errors (`ExtractionFailed`,
/// `TranslationFailed`) abort a run; the remaining pipeline variants are
/// degrade conditions that are absorbed at their stage boundary.
#[derive(Error, Debug)]
pub enum LenslateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A translation run was requested without an image present
    #[error("No image selected: upload or capture an image first")]
    NoImage,

    /// Image bytes could not be decoded, or the source has no width
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Text extraction aborted the run (transport or service failure)
    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),

    /// Translation aborted the run (transport or service failure)
    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    /// Contextual annotation was unavailable; callers degrade to a placeholder
    #[error("Contextual information unavailable: {0}")]
    ContextUnavailable(String),

    /// Overlay rendering failed; callers degrade to no overlay, no thumbnail
    #[error("Overlay rendering failed: {0}")]
    RenderFailed(String),

    /// History write or patch failed; reported, never retried
    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    /// No user identity could be established; blocks history functionality
    #[error("Authentication unavailable: {0}")]
    AuthUnavailable(String),

    /// Inference service transport errors (non-2xx responses, bad payloads)
    #[error("Inference service error: {0}")]
    Inference(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl LenslateError {
    /// Whether this error aborts an in-flight translation run
    ///
    /// Fatal errors stop forward progress and clear in-progress partial
    /// fields; everything else is absorbed at the stage it occurred in.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LenslateError::NoImage
                | LenslateError::ExtractionFailed(_)
                | LenslateError::TranslationFailed(_)
        )
    }
}

/// Result type alias for Lenslate operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

//! Error handling module for Clipmill

use std::time::Duration;
use thiserror::Error;

/// Main error type for Clipmill operations
#[derive(Error, Debug)]
pub enum ClipmillError {
    /// Free-form time text could not be parsed
    #[error("Unrecognized time text: {text}. Expected forms like 2:32-3:23, 00H08M10S-00H09M20S, or 152-203")]
    ParseError { text: String },

    /// Invalid or forbidden combination of selection fields
    #[error("Invalid selection: {0}")]
    SelectionConflict(String),

    /// An event arrived with no matching session
    #[error("No active selection for this user")]
    SessionExpired,

    /// Source metadata could not be resolved
    #[error("Failed to resolve source: {0}")]
    SourceResolutionFailure(String),

    /// A single segment failed to extract
    #[error("Extraction failed for segment {index}: {message}")]
    ExtractionFailure { index: usize, message: String },

    /// Hosted upload of one artifact failed
    #[error("Upload failed: {0}")]
    UploadFailure(String),

    /// An external call exceeded its deadline
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Chat transport call failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Clipmill operations
pub type ClipmillResult<T> = std::result::Result<T, ClipmillError>;

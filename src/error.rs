//! Error types and exit codes for trackscan

use std::process::ExitCode;
use thiserror::Error;

/// Main error type for trackscan operations
#[derive(Error, Debug)]
pub enum TrackScanError {
    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Invalid custom function signature: {message}")]
    InvalidSignature { message: String },

    #[error("Invalid ignore pattern: {message}")]
    InvalidIgnorePattern { message: String },

    #[error("Provider registry conflict: {message}")]
    RegistryConflict { message: String },

    #[error("Failed to parse file: {message}")]
    ParseFailure { message: String },

    #[error("Serialization failed: {message}")]
    Serialize { message: String },

    #[error("Git error: {message}")]
    GitError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackScanError {
    /// Convert error to appropriate exit code:
    /// - 0: Success
    /// - 1: Path not found / IO error / parse failure
    /// - 2: Invalid input (custom function signature)
    /// - 3: Provider registry misconfiguration
    /// - 4: Serialization failure
    /// - 5: Git error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::PathNotFound { .. } => ExitCode::from(1),
            Self::NotADirectory { .. } => ExitCode::from(1),
            Self::InvalidSignature { .. } => ExitCode::from(2),
            Self::InvalidIgnorePattern { .. } => ExitCode::from(2),
            Self::RegistryConflict { .. } => ExitCode::from(3),
            Self::ParseFailure { .. } => ExitCode::from(1),
            Self::Serialize { .. } => ExitCode::from(4),
            Self::GitError { .. } => ExitCode::from(5),
            Self::Io(_) => ExitCode::from(1),
        }
    }
}

/// Result type alias for trackscan operations
pub type Result<T> = std::result::Result<T, TrackScanError>;

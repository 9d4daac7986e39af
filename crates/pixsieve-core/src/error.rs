//! Error types for the pixsieve scan engine.
//!
//! Errors are split by blast radius: [`ScanError`] aborts a scan before any file
//! is touched, while [`FileError`] is confined to a single candidate and is
//! reported through the event stream instead of unwinding.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Scan-fatal errors, returned from `Deduplicator::scan` before any file is processed.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The supplied path is missing or is not a directory
    #[error("Invalid input {path}: {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    /// The quarantine folder could not be created or used
    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Broad classification of a per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The file could not be read or decoded as an image
    Decode,
    /// The file could not be moved into quarantine
    Filesystem,
}

/// Per-file errors. The engine turns each of these into an error event and moves on.
#[derive(Error, Debug)]
pub enum FileError {
    /// The file could not be read from disk
    #[error("Cannot read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Decoding or fingerprinting took too long
    #[error("Timeout decoding {path} after {timeout_ms}ms")]
    Timeout { path: PathBuf, timeout_ms: u64 },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// A file with the same name is already in quarantine
    #[error("Cannot move {path}: {existing} already exists")]
    NameCollision { path: PathBuf, existing: PathBuf },

    /// The file disappeared before it could be moved
    #[error("Cannot move {0}: file no longer exists")]
    SourceMissing(PathBuf),

    /// Rename into quarantine failed
    #[error("Cannot move {path} to {destination}: {message}")]
    Move {
        path: PathBuf,
        destination: PathBuf,
        message: String,
    },
}

impl FileError {
    /// Whether this failure happened while decoding or while moving.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NameCollision { .. } | Self::SourceMissing(_) | Self::Move { .. } => {
                ErrorKind::Filesystem
            }
            _ => ErrorKind::Decode,
        }
    }
}

/// Convenience type alias for scan results.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Convenience type alias for per-file results.
pub type FileResult<T> = std::result::Result<T, FileError>;

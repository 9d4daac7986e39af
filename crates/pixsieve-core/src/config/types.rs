//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};

use crate::pipeline::discovery::{ExtensionSet, STANDARD_PATTERNS};

/// Scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Ordered glob-suffix patterns; earlier patterns are enumerated first
    pub extensions: Vec<String>,

    /// Name of the quarantine subfolder created inside the scanned directory
    pub quarantine_dir: String,

    /// Number of files decoded and fingerprinted ahead of the decision loop
    pub parallel_workers: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: STANDARD_PATTERNS.iter().map(|p| p.to_string()).collect(),
            quarantine_dir: "duplicates".to_string(),
            parallel_workers: 1,
        }
    }
}

impl ScanConfig {
    /// Build the extension set described by `extensions`.
    pub fn extension_set(&self) -> Result<ExtensionSet, crate::error::ConfigError> {
        ExtensionSet::new(self.extensions.iter().map(String::as_str))
    }
}

/// Perceptual hash algorithm used for fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// Compare each pixel against the mean (with DCT: the classic pHash)
    Mean,
    /// Horizontal gradient (dHash)
    Gradient,
    /// Vertical gradient
    VertGradient,
    /// Horizontal and vertical gradients combined
    DoubleGradient,
    /// Block mean hash
    Blockhash,
}

/// Fingerprint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    /// Hash algorithm
    pub algorithm: HashAlgorithm,

    /// Hash width and height in bits; 8 gives a 64-bit fingerprint
    pub hash_size: u32,

    /// Apply DCT preprocessing before hashing
    pub dct: bool,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Mean,
            hash_size: 8,
            dct: true,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 200,
            max_image_dimension: 20000,
            decode_timeout_ms: 10000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

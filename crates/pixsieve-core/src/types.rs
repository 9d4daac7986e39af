//! Core data types shared by the scan engine and its consumers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ErrorKind;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A file in the scanned directory that matches the configured extension set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    /// Absolute path to the file
    pub path: PathBuf,

    /// Just the filename portion
    pub file_name: String,
}

impl CandidateFile {
    /// Build a candidate from a path, deriving the file name from its last component.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, file_name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A perceptual fingerprint: an opaque, fixed-width bit pattern.
///
/// Two images are duplicates exactly when their fingerprints are equal.
/// Rendered and serialized as lowercase hex.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(Vec<u8>);

impl Fingerprint {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Width of the fingerprint in bits.
    pub fn bits(&self) -> usize {
        self.0.len() * 8
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

/// Error returned when parsing a fingerprint from hex fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fingerprint hex: {0:?}")]
pub struct ParseFingerprintError(String);

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() % 2 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseFingerprintError(s.to_string()));
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16))
            .collect::<Result<Vec<u8>, _>>()
            .map(Self)
            .map_err(|_| ParseFingerprintError(s.to_string()))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

/// A duplicate that was moved into quarantine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRecord {
    /// Name of the moved file
    pub file_name: String,

    /// Name of the retained file that first produced the fingerprint
    pub kept: String,

    /// Fingerprint shared by both files
    pub fingerprint: Fingerprint,
}

/// A candidate that could not be processed. The file is left in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// 1-based position in enumeration order
    pub index: usize,

    pub file_name: String,

    /// Whether decoding or the move into quarantine failed
    pub kind: ErrorKind,

    /// Human-readable failure reason
    pub message: String,
}

/// Terminal output of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Candidates found by the enumerator
    pub total: usize,

    /// Candidates moved into quarantine
    pub moved: usize,

    /// Candidates an event was emitted for; below `total` only when cancelled
    pub processed: usize,

    /// Whether the scan stopped early on a cancellation request
    pub cancelled: bool,

    /// Every move, in the order it happened
    pub duplicates: Vec<DuplicateRecord>,

    /// Every per-file failure, in the order it happened
    pub errors: Vec<FileFailure>,
}

impl ScanResult {
    /// Number of files left in the scanned directory.
    pub fn retained(&self) -> usize {
        self.processed - self.moved
    }
}

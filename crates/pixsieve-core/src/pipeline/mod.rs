//! Per-file stages of a scan.
//!
//! - **discovery**: List candidate files in a directory
//! - **decode**: Load and decode images with size limits
//! - **fingerprint**: Reduce a decoded image to a perceptual fingerprint

pub mod decode;
pub mod discovery;
pub mod fingerprint;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{ExtensionSet, FileEnumerator, EXTENDED_PATTERNS, STANDARD_PATTERNS};
pub use fingerprint::{FingerprintProvider, PerceptualHasher};

//! Pixsieve Core - near-duplicate image quarantine engine.
//!
//! Pixsieve scans one directory, fingerprints every matching image with a
//! perceptual hash, keeps the first file of each fingerprint and moves every
//! later repeat into a quarantine subfolder. Nothing is ever deleted.
//!
//! # Architecture
//!
//! ```text
//! Enumerate → Decode → Fingerprint → Keep / Quarantine → Event
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixsieve_core::{Config, Deduplicator};
//!
//! #[tokio::main]
//! async fn main() -> pixsieve_core::Result<()> {
//!     let config = Config::load()?;
//!     let dedup = Deduplicator::new(&config)?;
//!
//!     let result = dedup.scan("./photos".as_ref()).await?;
//!     println!("Moved {} of {} files", result.moved, result.total);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod quarantine;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use engine::{CancelFlag, Deduplicator, ScanOptions};
pub use error::{ConfigError, ErrorKind, FileError, FileResult, Result, ScanError};
pub use events::{ChannelSink, NullSink, ProgressSink, ScanEvent};
pub use pipeline::{ExtensionSet, FingerprintProvider, PerceptualHasher};
pub use quarantine::QuarantineFolder;
pub use types::{CandidateFile, DuplicateRecord, FileFailure, Fingerprint, ScanResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

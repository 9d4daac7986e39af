//! Read-only inspection helpers.
//!
//! Nothing here creates the quarantine folder or moves a file.

use futures_util::stream::{self, StreamExt};
use std::path::Path;

use crate::engine::Deduplicator;
use crate::error::{Result, ScanError};
use crate::pipeline::discovery::FileEnumerator;
use crate::types::{CandidateFile, Fingerprint};

/// A candidate and its fingerprint, or the reason it has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintEntry {
    pub file: CandidateFile,
    pub fingerprint: std::result::Result<Fingerprint, String>,
}

/// Fingerprint every candidate in `dir`, in enumeration order.
pub async fn fingerprint_listing(dedup: &Deduplicator, dir: &Path) -> Result<Vec<FingerprintEntry>> {
    let files = dedup.enumerator().enumerate(dir)?;
    let entries = stream::iter(files.into_iter().map(|file| {
        let task = dedup.fingerprint_task(file.path.clone());
        async move {
            let fingerprint = task.await.map_err(|e| e.to_string());
            FingerprintEntry { file, fingerprint }
        }
    }))
    .buffered(dedup.parallel_workers())
    .collect::<Vec<_>>()
    .await;
    Ok(entries)
}

/// Candidates in `dir` whose fingerprint equals that of `reference`.
///
/// The reference itself is never reported, even when it lives in `dir`.
/// Candidates that fail to decode are skipped.
pub async fn find_matches(
    dedup: &Deduplicator,
    reference: &Path,
    dir: &Path,
) -> Result<Vec<CandidateFile>> {
    FileEnumerator::validate_dir(dir)?;
    let target = dedup
        .fingerprint_file(reference)
        .await
        .map_err(|e| ScanError::InvalidInput {
            path: reference.to_path_buf(),
            reason: e.to_string(),
        })?;
    let reference = reference
        .canonicalize()
        .unwrap_or_else(|_| reference.to_path_buf());

    let mut matches = Vec::new();
    for entry in fingerprint_listing(dedup, dir).await? {
        match entry.fingerprint {
            Ok(fp) if fp == target && entry.file.path != reference => matches.push(entry.file),
            Ok(_) => {}
            Err(message) => {
                tracing::debug!("Skipping {}: {}", entry.file.file_name, message);
            }
        }
    }
    tracing::debug!("{} match(es) for {}", matches.len(), target);
    Ok(matches)
}

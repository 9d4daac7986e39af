//! Candidate enumeration for a single directory.

use std::ffi::OsStr;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{ConfigError, ScanError};
use crate::types::CandidateFile;

/// Patterns recognized by default.
pub const STANDARD_PATTERNS: &[&str] = &["*.jpg", "*.jpeg", "*.png"];

/// Default patterns plus TIFF.
pub const EXTENDED_PATTERNS: &[&str] = &["*.jpg", "*.jpeg", "*.png", "*.tiff"];

/// An ordered set of glob-suffix patterns (`*.jpg`, `*.png`, ...).
///
/// Order matters: files matching the first pattern are enumerated before files
/// matching the second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    /// Lower-cased suffixes with the leading `*` stripped, e.g. `.jpg`
    suffixes: Vec<String>,
}

impl ExtensionSet {
    /// Parse patterns of the form `*.ext`.
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
        let mut suffixes: Vec<String> = Vec::new();
        for pattern in patterns {
            let suffix = pattern
                .strip_prefix('*')
                .filter(|s| s.starts_with('.') && s.len() > 1 && !s.contains(['*', '/', '\\']))
                .ok_or_else(|| {
                    ConfigError::ValidationError(format!(
                        "scan.extensions entries must look like \"*.ext\", got {pattern:?}"
                    ))
                })?
                .to_ascii_lowercase();
            if !suffixes.contains(&suffix) {
                suffixes.push(suffix);
            }
        }
        if suffixes.is_empty() {
            return Err(ConfigError::ValidationError(
                "scan.extensions must not be empty".into(),
            ));
        }
        Ok(Self { suffixes })
    }

    /// `*.jpg`, `*.jpeg`, `*.png`.
    pub fn standard() -> Self {
        Self::from_static(STANDARD_PATTERNS)
    }

    /// The standard set plus `*.tiff`.
    pub fn extended() -> Self {
        Self::from_static(EXTENDED_PATTERNS)
    }

    fn from_static(patterns: &[&str]) -> Self {
        Self {
            suffixes: patterns
                .iter()
                .map(|p| p.trim_start_matches('*').to_string())
                .collect(),
        }
    }

    /// The patterns in configured order.
    pub fn patterns(&self) -> Vec<String> {
        self.suffixes.iter().map(|s| format!("*{s}")).collect()
    }

    /// Position of the first pattern matching `file_name`, if any.
    pub fn position(&self, file_name: &str) -> Option<usize> {
        self.position_os(OsStr::new(file_name))
    }

    /// Like [`position`](Self::position), for names that need not be UTF-8.
    pub fn position_os(&self, file_name: &OsStr) -> Option<usize> {
        let name = file_name.as_encoded_bytes();
        self.suffixes.iter().position(|suffix| {
            let suffix = suffix.as_bytes();
            name.len() > suffix.len()
                && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.position(file_name).is_some()
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Lists candidate files directly inside a directory.
pub struct FileEnumerator {
    extensions: ExtensionSet,
    quarantine_name: String,
}

impl FileEnumerator {
    /// Create an enumerator that skips the quarantine folder named `quarantine_name`.
    pub fn new(extensions: ExtensionSet, quarantine_name: impl Into<String>) -> Self {
        Self {
            extensions,
            quarantine_name: quarantine_name.into(),
        }
    }

    /// Fail with `InvalidInput` unless `dir` exists and is a directory.
    pub fn validate_dir(dir: &Path) -> Result<(), ScanError> {
        match std::fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::InvalidInput {
                path: dir.to_path_buf(),
                reason: "not a directory".into(),
            }),
            Err(e) => Err(ScanError::InvalidInput {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    /// Enumerate candidates in pattern order, then by file name within a pattern.
    ///
    /// Non-recursive. The quarantine folder and its contents never appear.
    pub fn enumerate(&self, dir: &Path) -> Result<Vec<CandidateFile>, ScanError> {
        Self::validate_dir(dir)?;
        let root = dir.canonicalize().map_err(|e| ScanError::InvalidInput {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut buckets: Vec<Vec<CandidateFile>> =
            vec![Vec::new(); self.extensions.suffixes.len()];
        let quarantine = OsStr::new(&self.quarantine_name);

        // Symlinked images count as candidates; max_depth keeps this non-recursive
        for entry in WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || e.file_name() != quarantine)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {}", root, e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(slot) = self.extensions.position_os(entry.file_name()) {
                buckets[slot].push(CandidateFile::new(entry.path()));
            }
        }

        let files: Vec<CandidateFile> = buckets.into_iter().flatten().collect();
        tracing::debug!("Enumerated {} candidate(s) in {:?}", files.len(), root);
        Ok(files)
    }
}

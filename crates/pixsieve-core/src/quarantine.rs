//! Quarantine folder lifecycle and duplicate relocation.
//!
//! Duplicates are moved, never deleted. A file already present in quarantine
//! is never overwritten.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{FileError, ScanError};
use crate::types::CandidateFile;

/// Handle to an existing quarantine folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineFolder {
    path: PathBuf,
}

impl QuarantineFolder {
    /// Create `<parent>/<name>` if needed and return a handle to it.
    ///
    /// Idempotent: an existing directory is reused. Fails when `parent` is
    /// missing, when creation is refused, or when `name` is taken by a file.
    pub fn ensure(parent: &Path, name: &str) -> Result<Self, ScanError> {
        let path = parent.join(name);
        match std::fs::create_dir(&path) {
            Ok(()) => {
                tracing::debug!("Created quarantine folder {:?}", path);
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if path.is_dir() {
                    Ok(Self { path })
                } else {
                    Err(ScanError::Filesystem {
                        path,
                        source: std::io::Error::new(
                            ErrorKind::AlreadyExists,
                            "a non-directory entry already uses the quarantine name",
                        ),
                    })
                }
            }
            Err(source) => Err(ScanError::Filesystem { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Destination a candidate would be moved to, under its on-disk name.
    pub fn destination_for(&self, file: &CandidateFile) -> PathBuf {
        match file.path.file_name() {
            Some(name) => self.path.join(name),
            None => self.path.join(&file.file_name),
        }
    }

    /// Move `file` into the folder under its original name.
    ///
    /// Returns the new path on success.
    pub fn admit(&self, file: &CandidateFile) -> Result<PathBuf, FileError> {
        let destination = self.destination_for(file);

        if std::fs::symlink_metadata(&destination).is_ok() {
            return Err(FileError::NameCollision {
                path: file.path.clone(),
                existing: destination,
            });
        }

        match std::fs::rename(&file.path, &destination) {
            Ok(()) => Ok(destination),
            Err(e) if e.kind() == ErrorKind::NotFound && !file.path.exists() => {
                Err(FileError::SourceMissing(file.path.clone()))
            }
            Err(e) => Err(FileError::Move {
                path: file.path.clone(),
                destination,
                message: e.to_string(),
            }),
        }
    }

    /// Names of the files currently in quarantine, sorted.
    pub fn contents(&self) -> std::io::Result<Vec<String>> {
        let mut names = std::fs::read_dir(&self.path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }
}

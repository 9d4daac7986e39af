//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "scan.extensions must not be empty".into(),
            ));
        }
        self.scan.extension_set()?;

        let name = self.scan.quarantine_dir.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError(format!(
                "scan.quarantine_dir must be a plain folder name, got {name:?}"
            )));
        }
        if self.scan.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "scan.parallel_workers must be > 0".into(),
            ));
        }
        if !(2..=64).contains(&self.hash.hash_size) {
            return Err(ConfigError::ValidationError(
                "hash.hash_size must be between 2 and 64".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

//! Image decoding with content-based format detection and size limits.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::FileError;

/// Image decoder with configurable limits.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Read and decode a file. Blocking; call from a blocking context.
    pub fn decode_file(&self, path: &Path) -> Result<DecodedImage, FileError> {
        let metadata = std::fs::metadata(path).map_err(|e| FileError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(FileError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let bytes = std::fs::read(path).map_err(|e| FileError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.decode_bytes(bytes, path)
    }

    /// Decode an in-memory buffer. `path` is used for error context and as a
    /// format hint when the content is not recognized.
    pub fn decode_bytes(&self, bytes: Vec<u8>, path: &Path) -> Result<DecodedImage, FileError> {
        let mut reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| FileError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(|_| FileError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            })?,
        };
        reader.set_format(format);
        let image = reader.decode().map_err(|e| FileError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(FileError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim: self.limits.max_image_dimension,
            });
        }

        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}

//! Perceptual fingerprinting of decoded images.

use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig};

use crate::config::{HashAlgorithm, HashConfig};
use crate::types::Fingerprint;

/// Turns a decoded image into a fixed-width fingerprint.
///
/// Implementations must be pure functions of pixel content: the same pixels
/// always produce the same fingerprint, whatever file they came from.
pub trait FingerprintProvider: Send + Sync {
    fn fingerprint(&self, image: &DynamicImage) -> Fingerprint;
}

/// Default provider backed by `image_hasher`.
///
/// The hasher is built once and reused for every image.
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(&HashConfig::default())
    }
}

impl PerceptualHasher {
    /// Build a hasher for the configured algorithm and size.
    pub fn new(config: &HashConfig) -> Self {
        let alg = match config.algorithm {
            HashAlgorithm::Mean => HashAlg::Mean,
            HashAlgorithm::Gradient => HashAlg::Gradient,
            HashAlgorithm::VertGradient => HashAlg::VertGradient,
            HashAlgorithm::DoubleGradient => HashAlg::DoubleGradient,
            HashAlgorithm::Blockhash => HashAlg::Blockhash,
        };
        let mut hasher_config = HasherConfig::new()
            .hash_alg(alg)
            .hash_size(config.hash_size, config.hash_size);
        if config.dct {
            hasher_config = hasher_config.preproc_dct();
        }
        Self {
            hasher: hasher_config.to_hasher(),
        }
    }
}

impl FingerprintProvider for PerceptualHasher {
    fn fingerprint(&self, image: &DynamicImage) -> Fingerprint {
        Fingerprint::from_bytes(self.hasher.hash_image(image).as_bytes())
    }
}

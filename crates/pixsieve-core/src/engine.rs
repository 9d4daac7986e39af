//! The scan engine: enumerate, fingerprint, decide, report.
//!
//! A scan is one linear pass. Each candidate is fingerprinted once and looked
//! up in a seen-set keyed by fingerprint; the first file to produce a
//! fingerprint stays in place and every later match is moved into quarantine.
//!
//! Decoding and fingerprinting may run ahead of the decision loop on tokio's
//! blocking pool (`scan.parallel_workers > 1`), but results are consumed in
//! enumeration order, so seen-set effects, moves and events are identical to a
//! sequential run.

use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, ScanConfig};
use crate::error::{FileError, FileResult, Result};
use crate::events::{NullSink, ProgressSink, ScanEvent};
use crate::pipeline::decode::ImageDecoder;
use crate::pipeline::discovery::{ExtensionSet, FileEnumerator};
use crate::pipeline::fingerprint::{FingerprintProvider, PerceptualHasher};
use crate::quarantine::QuarantineFolder;
use crate::types::{CandidateFile, DuplicateRecord, FileFailure, Fingerprint, ScanResult};

/// Cooperative cancellation signal, checked between files.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the scan stop before the next file.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-call scan options.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Stops the scan between files when set; moved files stay in quarantine
    pub cancel: CancelFlag,
}

/// Finds near-duplicate images in a directory and quarantines them.
pub struct Deduplicator {
    scan: ScanConfig,
    extensions: ExtensionSet,
    decoder: ImageDecoder,
    provider: Arc<dyn FingerprintProvider>,
}

impl Deduplicator {
    /// Create an engine using the configured perceptual hasher.
    pub fn new(config: &Config) -> Result<Self> {
        let provider = Arc::new(PerceptualHasher::new(&config.hash));
        Self::with_provider(config, provider)
    }

    /// Create an engine with a custom fingerprint provider.
    pub fn with_provider(config: &Config, provider: Arc<dyn FingerprintProvider>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extensions: config.scan.extension_set()?,
            scan: config.scan.clone(),
            decoder: ImageDecoder::new(config.limits.clone()),
            provider,
        })
    }

    /// Replace the extension set from the configuration.
    pub fn with_extensions(mut self, extensions: ExtensionSet) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub fn quarantine_name(&self) -> &str {
        &self.scan.quarantine_dir
    }

    /// Number of files decoded ahead of the decision loop.
    pub fn parallel_workers(&self) -> usize {
        self.scan.parallel_workers.max(1)
    }

    /// Enumerator bound to this engine's extension set and quarantine name.
    pub fn enumerator(&self) -> FileEnumerator {
        FileEnumerator::new(self.extensions.clone(), self.scan.quarantine_dir.clone())
    }

    /// Decode and fingerprint one file.
    pub async fn fingerprint_file(&self, path: &Path) -> FileResult<Fingerprint> {
        self.fingerprint_task(path.to_path_buf()).await
    }

    /// Owned decode+fingerprint job, runnable ahead of the decision loop.
    pub(crate) fn fingerprint_task(
        &self,
        path: PathBuf,
    ) -> impl Future<Output = FileResult<Fingerprint>> + Send + 'static {
        let decoder = self.decoder.clone();
        let provider = Arc::clone(&self.provider);
        let timeout_ms = self.decoder.limits().decode_timeout_ms;

        async move {
            let start = Instant::now();
            let task_path = path.clone();
            let job = tokio::task::spawn_blocking(move || -> FileResult<Fingerprint> {
                let decoded = decoder.decode_file(&task_path)?;
                Ok(provider.fingerprint(&decoded.image))
            });

            let result = match tokio::time::timeout(Duration::from_millis(timeout_ms), job).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => Err(FileError::Decode {
                    path: path.clone(),
                    message: format!("Task join error: {}", e),
                }),
                Err(_) => Err(FileError::Timeout {
                    path: path.clone(),
                    timeout_ms,
                }),
            };
            tracing::trace!("  Fingerprint {:?}: {:?}", path, start.elapsed());
            result
        }
    }

    /// Scan `dir` without progress reporting or cancellation.
    pub async fn scan(&self, dir: &Path) -> Result<ScanResult> {
        self.scan_with(dir, &mut NullSink, &ScanOptions::default())
            .await
    }

    /// Scan `dir`, emitting one event per candidate to `sink`.
    ///
    /// Fails only if `dir` is not a directory or the quarantine folder cannot
    /// be created; both are checked before any file is touched.
    pub async fn scan_with(
        &self,
        dir: &Path,
        sink: &mut dyn ProgressSink,
        options: &ScanOptions,
    ) -> Result<ScanResult> {
        let start = Instant::now();
        FileEnumerator::validate_dir(dir)?;
        let quarantine = QuarantineFolder::ensure(dir, &self.scan.quarantine_dir)?;
        let files = self.enumerator().enumerate(dir)?;

        let total = files.len();
        tracing::info!("Scanning {:?}: {} candidate(s)", dir, total);

        let mut seen: HashMap<Fingerprint, CandidateFile> = HashMap::with_capacity(total);
        let mut result = ScanResult {
            total,
            ..ScanResult::default()
        };

        let mut outcomes = stream::iter(files.into_iter().map(|file| {
            let task = self.fingerprint_task(file.path.clone());
            async move { (file, task.await) }
        }))
        .buffered(self.parallel_workers());

        loop {
            if result.processed < total && options.cancel.is_cancelled() {
                tracing::info!("Scan cancelled after {} of {} file(s)", result.processed, total);
                result.cancelled = true;
                break;
            }
            let Some((file, outcome)) = outcomes.next().await else {
                break;
            };
            let index = result.processed + 1;

            match outcome.and_then(|fingerprint| settle(&mut seen, &quarantine, &file, fingerprint))
            {
                Ok(moved) => {
                    if let Some(record) = moved {
                        tracing::info!(
                            "Moved {} to quarantine (duplicate of {})",
                            record.file_name,
                            record.kept
                        );
                        result.moved += 1;
                        result.duplicates.push(record);
                    }
                    sink.on_event(ScanEvent::Progress {
                        index,
                        total,
                        file_name: file.file_name.clone(),
                        moved_so_far: result.moved,
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipped {}: {}", file.file_name, e);
                    let message = e.to_string();
                    result.errors.push(FileFailure {
                        index,
                        file_name: file.file_name.clone(),
                        kind: e.kind(),
                        message: message.clone(),
                    });
                    sink.on_event(ScanEvent::Error {
                        index,
                        total,
                        file_name: file.file_name.clone(),
                        kind: e.kind(),
                        message,
                        moved_so_far: result.moved,
                    });
                }
            }
            result.processed = index;
        }

        tracing::info!(
            "Scan of {:?} finished in {:?}: {} examined, {} moved, {} error(s)",
            dir,
            start.elapsed(),
            result.processed,
            result.moved,
            result.errors.len()
        );
        Ok(result)
    }
}

/// Record a first sighting, or move a repeat into quarantine.
fn settle(
    seen: &mut HashMap<Fingerprint, CandidateFile>,
    quarantine: &QuarantineFolder,
    file: &CandidateFile,
    fingerprint: Fingerprint,
) -> FileResult<Option<DuplicateRecord>> {
    match seen.get(&fingerprint) {
        Some(kept) => {
            quarantine.admit(file)?;
            Ok(Some(DuplicateRecord {
                file_name: file.file_name.clone(),
                kept: kept.file_name.clone(),
                fingerprint,
            }))
        }
        None => {
            seen.insert(fingerprint, file.clone());
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::collections::BTreeSet;

    /// Exact-pixel provider: equal fingerprints iff equal pixels.
    struct PixelDigest;

    impl FingerprintProvider for PixelDigest {
        fn fingerprint(&self, image: &DynamicImage) -> Fingerprint {
            let rgb = image.to_rgb8();
            let mut hasher = blake3::Hasher::new();
            hasher.update(&rgb.width().to_le_bytes());
            hasher.update(&rgb.height().to_le_bytes());
            hasher.update(rgb.as_raw());
            Fingerprint::from_bytes(hasher.finalize().as_bytes().to_vec())
        }
    }

    fn engine(workers: usize) -> Deduplicator {
        let mut config = Config::default();
        config.scan.parallel_workers = workers;
        Deduplicator::with_provider(&config, Arc::new(PixelDigest)).unwrap()
    }

    fn pattern(seed: u8) -> RgbImage {
        RgbImage::from_fn(24, 24, move |x, y| {
            Rgb([
                (x as u8).wrapping_mul(seed),
                (y as u8).wrapping_mul(seed),
                seed,
            ])
        })
    }

    fn write_image(dir: &Path, name: &str, seed: u8) {
        let format = ImageFormat::from_path(name).unwrap();
        pattern(seed).save_with_format(dir.join(name), format).unwrap();
    }

    fn copy(dir: &Path, from: &str, to: &str) {
        std::fs::copy(dir.join(from), dir.join(to)).unwrap();
    }

    fn file_names(dir: &Path) -> BTreeSet<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect()
    }

    fn collect_events(events: &mut Vec<ScanEvent>) -> impl FnMut(ScanEvent) + '_ {
        move |e| events.push(e)
    }

    #[tokio::test]
    async fn test_keeps_first_and_moves_repeat() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.jpg", 3);
        copy(dir.path(), "a.jpg", "b.jpg");
        write_image(dir.path(), "c.jpg", 7);

        let result = engine(1).scan(dir.path()).await.unwrap();

        assert_eq!(result.total, 3);
        assert_eq!(result.moved, 1);
        assert_eq!(result.processed, 3);
        assert!(!result.cancelled);
        assert_eq!(file_names(dir.path()), BTreeSet::from(["a.jpg".into(), "c.jpg".into()]));
        assert_eq!(
            file_names(&dir.path().join("duplicates")),
            BTreeSet::from(["b.jpg".into()])
        );
        assert_eq!(result.duplicates.len(), 1);
        assert_eq!(result.duplicates[0].file_name, "b.jpg");
        assert_eq!(result.duplicates[0].kept, "a.jpg");
    }

    #[tokio::test]
    async fn test_empty_dir_creates_empty_quarantine() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();

        let result = engine(1).scan(dir.path()).await.unwrap();

        assert_eq!((result.total, result.moved), (0, 0));
        let quarantine = dir.path().join("duplicates");
        assert!(quarantine.is_dir());
        assert_eq!(std::fs::read_dir(&quarantine).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.jpg", 3);
        std::fs::write(dir.path().join("b.jpg"), b"\xff\xd8\xff garbage").unwrap();
        copy(dir.path(), "a.jpg", "c.jpg");

        let mut events = Vec::new();
        let result = engine(1)
            .scan_with(
                dir.path(),
                &mut collect_events(&mut events),
                &ScanOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!((result.total, result.moved), (3, 1));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].file_name, "b.jpg");
        assert_eq!(result.errors[0].index, 2);
        assert_eq!(result.errors[0].kind, crate::error::ErrorKind::Decode);

        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].file_name(), "b.jpg");

        assert_eq!(file_names(dir.path()), BTreeSet::from(["a.jpg".into(), "b.jpg".into()]));
        assert_eq!(
            file_names(&dir.path().join("duplicates")),
            BTreeSet::from(["c.jpg".into()])
        );
    }

    #[tokio::test]
    async fn test_missing_dir_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = engine(1).scan(&missing).await.unwrap_err();

        assert!(matches!(err, ScanError::InvalidInput { .. }));
        assert!(!missing.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_file_path_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 1);

        let err = engine(1).scan(&dir.path().join("a.png")).await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_events_are_gapless_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.jpg", 1);
        copy(dir.path(), "a.jpg", "b.jpg");
        std::fs::write(dir.path().join("c.jpg"), b"broken").unwrap();
        write_image(dir.path(), "d.png", 2);
        copy(dir.path(), "d.png", "e.png");

        let mut events = Vec::new();
        let result = engine(1)
            .scan_with(
                dir.path(),
                &mut collect_events(&mut events),
                &ScanOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(events.len(), result.total);
        let indices: Vec<usize> = events.iter().map(|e| e.index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert!(events.iter().all(|e| e.total() == 5));

        let moved: Vec<usize> = events.iter().map(|e| e.moved_so_far()).collect();
        assert_eq!(moved, vec![0, 1, 1, 1, 2]);

        let names: Vec<&str> = events.iter().map(|e| e.file_name()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg", "d.png", "e.png"]);
    }

    #[tokio::test]
    async fn test_first_match_by_pattern_order_is_kept() {
        // z.tiff sorts last by name but its pattern is listed first
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 5);
        write_image(dir.path(), "b.png", 5);
        write_image(dir.path(), "z.tiff", 5);

        let config = Config::default();
        let dedup = Deduplicator::with_provider(&config, Arc::new(PixelDigest))
            .unwrap()
            .with_extensions(ExtensionSet::new(["*.tiff", "*.png"]).unwrap());
        let result = dedup.scan(dir.path()).await.unwrap();

        assert_eq!((result.total, result.moved), (3, 2));
        assert_eq!(file_names(dir.path()), BTreeSet::from(["z.tiff".into()]));
        assert!(result.duplicates.iter().all(|d| d.kept == "z.tiff"));
    }

    #[tokio::test]
    async fn test_scan_is_deterministic() {
        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let dir = tempfile::tempdir().unwrap();
            write_image(dir.path(), "p.jpg", 9);
            copy(dir.path(), "p.jpg", "q.jpg");
            write_image(dir.path(), "r.png", 9);
            write_image(dir.path(), "s.png", 4);
            copy(dir.path(), "s.png", "t.png");

            let result = engine(1).scan(dir.path()).await.unwrap();
            outcomes.push((
                result.total,
                result.moved,
                file_names(dir.path()),
                file_names(&dir.path().join("duplicates")),
            ));
        }
        assert_eq!(outcomes[0], outcomes[1]);
    }

    #[tokio::test]
    async fn test_no_file_is_lost() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.jpg", 2);
        copy(dir.path(), "a.jpg", "b.jpg");
        copy(dir.path(), "a.jpg", "c.jpeg");
        std::fs::write(dir.path().join("d.png"), b"nope").unwrap();
        write_image(dir.path(), "e.png", 8);
        let before = file_names(dir.path());

        let result = engine(1).scan(dir.path()).await.unwrap();

        let retained = file_names(dir.path());
        let quarantined = file_names(&dir.path().join("duplicates"));
        assert_eq!(retained.len() + quarantined.len(), before.len());
        let union: BTreeSet<String> = retained.union(&quarantined).cloned().collect();
        assert_eq!(union, before);
        assert_eq!(quarantined.len(), result.moved);
        assert!(retained.contains("d.png"));
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let mut runs = Vec::new();
        for workers in [1, 4] {
            let dir = tempfile::tempdir().unwrap();
            for (i, seed) in [1u8, 2, 1, 3, 2, 1, 4].iter().enumerate() {
                write_image(dir.path(), &format!("{i:02}.jpg"), *seed);
            }
            std::fs::write(dir.path().join("07.jpg"), b"corrupt").unwrap();

            let mut events = Vec::new();
            let result = engine(workers)
                .scan_with(
                    dir.path(),
                    &mut collect_events(&mut events),
                    &ScanOptions::default(),
                )
                .await
                .unwrap();
            // Error messages carry the tempdir path
            let mut result = result;
            result.errors.iter_mut().for_each(|e| e.message.clear());
            let events: Vec<(usize, String, usize, bool)> = events
                .iter()
                .map(|e| (e.index(), e.file_name().to_string(), e.moved_so_far(), e.is_error()))
                .collect();
            runs.push((result, events, file_names(&dir.path().join("duplicates"))));
        }
        assert_eq!(runs[0], runs[1]);
        assert_eq!(runs[0].0.moved, 3);
    }

    #[tokio::test]
    async fn test_cancel_between_files_keeps_moves() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.jpg", 1);
        copy(dir.path(), "a.jpg", "b.jpg");
        copy(dir.path(), "a.jpg", "c.jpg");

        let options = ScanOptions::default();
        let cancel = options.cancel.clone();
        let mut sink = |e: ScanEvent| {
            if e.index() == 2 {
                cancel.cancel();
            }
        };
        let result = engine(1)
            .scan_with(dir.path(), &mut sink, &options)
            .await
            .unwrap();

        assert!(result.cancelled);
        assert_eq!((result.total, result.processed, result.moved), (3, 2, 1));
        assert_eq!(
            file_names(&dir.path().join("duplicates")),
            BTreeSet::from(["b.jpg".into()])
        );
        assert!(dir.path().join("c.jpg").exists());
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.jpg", 1);

        let options = ScanOptions::default();
        options.cancel.cancel();
        let result = engine(4)
            .scan_with(dir.path(), &mut NullSink, &options)
            .await
            .unwrap();

        assert!(result.cancelled);
        assert_eq!((result.total, result.processed), (1, 0));
        assert!(dir.path().join("duplicates").is_dir());
    }

    #[tokio::test]
    async fn test_rescan_ignores_quarantine() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.jpg", 6);
        copy(dir.path(), "a.jpg", "b.jpg");

        let dedup = engine(1);
        let first = dedup.scan(dir.path()).await.unwrap();
        let second = dedup.scan(dir.path()).await.unwrap();

        assert_eq!((first.total, first.moved), (2, 1));
        assert_eq!((second.total, second.moved), (1, 0));
    }

    #[tokio::test]
    async fn test_move_collision_is_per_file() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.jpg", 6);
        copy(dir.path(), "a.jpg", "b.jpg");
        std::fs::create_dir(dir.path().join("duplicates")).unwrap();
        std::fs::write(dir.path().join("duplicates").join("b.jpg"), b"older").unwrap();

        let mut events = Vec::new();
        let result = engine(1)
            .scan_with(
                dir.path(),
                &mut collect_events(&mut events),
                &ScanOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!((result.total, result.moved), (2, 0));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("already exists"));
        assert_eq!(result.errors[0].kind, crate::error::ErrorKind::Filesystem);
        assert!(events[1].is_error());
        assert_eq!(events[1].error_kind(), Some(crate::error::ErrorKind::Filesystem));
        assert!(dir.path().join("b.jpg").exists());
    }

    #[tokio::test]
    async fn test_custom_quarantine_name() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 6);
        copy(dir.path(), "a.png", "b.png");

        let mut config = Config::default();
        config.scan.quarantine_dir = "repeats".into();
        let dedup = Deduplicator::with_provider(&config, Arc::new(PixelDigest)).unwrap();
        let result = dedup.scan(dir.path()).await.unwrap();

        assert_eq!(result.moved, 1);
        assert!(dir.path().join("repeats").join("b.png").exists());
        assert!(!dir.path().join("duplicates").exists());
    }

    #[tokio::test]
    async fn test_default_perceptual_hasher_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_fn(64, 64, |x, _| Rgb([(x * 4) as u8; 3]))
            .save_with_format(dir.path().join("a.png"), ImageFormat::Png)
            .unwrap();
        copy(dir.path(), "a.png", "b.png");
        RgbImage::from_fn(64, 64, |x, y| {
            if (x / 16 + y / 16) % 2 == 0 {
                Rgb([255; 3])
            } else {
                Rgb([0; 3])
            }
        })
        .save_with_format(dir.path().join("c.png"), ImageFormat::Png)
        .unwrap();

        let dedup = Deduplicator::new(&Config::default()).unwrap();
        let result = dedup.scan(dir.path()).await.unwrap();

        assert_eq!((result.total, result.moved), (3, 1));
        assert!(dir.path().join("duplicates").join("b.png").exists());
        assert_eq!(result.duplicates[0].fingerprint.bits(), 64);
    }

    #[tokio::test]
    async fn test_fingerprint_file_reports_decode_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"\x89PNG broken").unwrap();

        let err = engine(1).fingerprint_file(&path).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Decode);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.scan.quarantine_dir = "../elsewhere".into();
        let err = Deduplicator::with_provider(&config, Arc::new(PixelDigest))
            .err()
            .unwrap();
        assert!(matches!(err, ScanError::Config(_)));
    }

    /// Sleeps longer than any test timeout before hashing.
    struct SlowDigest;

    impl FingerprintProvider for SlowDigest {
        fn fingerprint(&self, image: &DynamicImage) -> Fingerprint {
            std::thread::sleep(Duration::from_millis(300));
            PixelDigest.fingerprint(image)
        }
    }

    #[tokio::test]
    async fn test_decode_timeout_is_per_file() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 4);
        copy(dir.path(), "a.png", "b.png");

        let mut config = Config::default();
        config.limits.decode_timeout_ms = 20;
        let dedup = Deduplicator::with_provider(&config, Arc::new(SlowDigest)).unwrap();

        let mut events = Vec::new();
        let result = dedup
            .scan_with(
                dir.path(),
                &mut collect_events(&mut events),
                &ScanOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!((result.total, result.processed, result.moved), (2, 2, 0));
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.is_error()));
        assert!(result.errors.iter().all(|e| e.message.contains("after 20ms")));
        assert!(result
            .errors
            .iter()
            .all(|e| e.kind == crate::error::ErrorKind::Decode));
        assert_eq!(file_names(dir.path()), BTreeSet::from(["a.png".into(), "b.png".into()]));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_duplicate_is_moved() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 5);
        let raw = OsStr::from_bytes(b"\xffb.png");
        std::fs::copy(dir.path().join("a.png"), dir.path().join(raw)).unwrap();

        let result = engine(1).scan(dir.path()).await.unwrap();

        assert_eq!((result.total, result.moved), (2, 1));
        assert!(dir.path().join("duplicates").join(raw).exists());
        assert!(!dir.path().join(raw).exists());
        assert!(dir.path().join("a.png").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_duplicate_is_moved() {
        let dir = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 5);
        write_image(elsewhere.path(), "copy.png", 5);
        std::os::unix::fs::symlink(elsewhere.path().join("copy.png"), dir.path().join("b.png"))
            .unwrap();

        let result = engine(1).scan(dir.path()).await.unwrap();

        assert_eq!((result.total, result.moved), (2, 1));
        let moved = dir.path().join("duplicates").join("b.png");
        assert!(moved.symlink_metadata().unwrap().file_type().is_symlink());
        assert!(elsewhere.path().join("copy.png").exists());
    }
}

//! The `pixsieve scan` command.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use pixsieve_core::pipeline::EXTENDED_PATTERNS;
use pixsieve_core::{Config, Deduplicator, ProgressSink, ScanEvent, ScanOptions, ScanResult};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Arguments for the `scan` command.
#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Folder to scan (not recursive)
    #[arg(required = true)]
    pub dir: PathBuf,

    /// Number of images decoded ahead of the decision loop
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Name of the quarantine subfolder
    #[arg(long, value_name = "NAME")]
    pub quarantine_dir: Option<String>,

    /// Extension pattern such as '*.png'; repeat to build an ordered list
    #[arg(long = "ext", value_name = "PATTERN")]
    pub extensions: Vec<String>,

    /// Also scan *.tiff files
    #[arg(long, conflicts_with = "extensions")]
    pub with_tiff: bool,

    /// Print the scan result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Execute the scan command.
pub async fn execute(args: ScanArgs, config: &Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args);
    let dedup = Deduplicator::new(&config)?;
    let dir = PathBuf::from(shellexpand::tilde(&args.dir.to_string_lossy()).into_owned());

    let options = ScanOptions::default();
    let cancel = options.cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current file");
            cancel.cancel();
        }
    });

    let mut sink = ProgressBarSink::new();
    let start = Instant::now();
    let outcome = dedup.scan_with(&dir, &mut sink, &options).await;
    interrupt.abort();
    sink.finish();
    let result = outcome?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result, &dir.join(dedup.quarantine_name()), start.elapsed());
    }
    Ok(())
}

/// Layer the command-line flags over the loaded configuration.
fn apply_overrides(config: &Config, args: &ScanArgs) -> Config {
    let mut config = config.clone();
    if let Some(workers) = args.workers {
        config.scan.parallel_workers = workers;
    }
    if let Some(name) = &args.quarantine_dir {
        config.scan.quarantine_dir = name.clone();
    }
    if !args.extensions.is_empty() {
        config.scan.extensions = args.extensions.clone();
    } else if args.with_tiff {
        config.scan.extensions = EXTENDED_PATTERNS.iter().map(|p| p.to_string()).collect();
    }
    config
}

/// Drives an indicatif bar from scan events.
struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    fn new() -> Self {
        Self::with_bar(create_progress_bar())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for ProgressBarSink {
    fn on_event(&mut self, event: ScanEvent) {
        if self.bar.length() != Some(event.total() as u64) {
            self.bar.set_length(event.total() as u64);
        }
        self.bar.set_position(event.index() as u64);
        if let ScanEvent::Error {
            file_name, message, ..
        } = &event
        {
            self.bar.println(format!("  ✗ {file_name}: {message}"));
        }
        self.bar
            .set_message(format!("{} moved · {}", event.moved_so_far(), event.file_name()));
    }
}

fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after a scan.
fn print_summary(result: &ScanResult, quarantine: &Path, elapsed: Duration) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Examined:     {:>8}", result.processed);
    eprintln!("    Moved:        {:>8}", result.moved);
    eprintln!("    Kept:         {:>8}", result.retained());
    if !result.errors.is_empty() {
        eprintln!("    Errors:       {:>8}", result.errors.len());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Candidates:   {:>8}", result.total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
    if result.cancelled {
        eprintln!(
            "  Cancelled after {} of {} files.",
            result.processed, result.total
        );
    }
    if result.moved > 0 {
        eprintln!("  Duplicates are in {}", quarantine.display());
    }
}

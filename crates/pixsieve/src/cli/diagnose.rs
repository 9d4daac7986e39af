//! The read-only `pixsieve hashes` and `pixsieve matches` commands.

use clap::Args;
use pixsieve_core::diagnostics::{self, FingerprintEntry};
use pixsieve_core::{Config, Deduplicator};
use std::path::PathBuf;

/// Arguments for the `hashes` command.
#[derive(Args, Debug)]
pub struct HashesArgs {
    /// Folder to fingerprint
    pub dir: PathBuf,

    /// Print one JSON object per line
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `matches` command.
#[derive(Args, Debug)]
pub struct MatchesArgs {
    /// Image to compare against
    pub reference: PathBuf,

    /// Folder to search
    pub dir: PathBuf,
}

fn expand(path: &std::path::Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Execute the hashes command.
pub async fn hashes(args: HashesArgs, config: &Config) -> anyhow::Result<()> {
    let dedup = Deduplicator::new(config)?;
    let entries = diagnostics::fingerprint_listing(&dedup, &expand(&args.dir)).await?;

    for entry in &entries {
        if args.json {
            println!("{}", entry_json(entry));
        } else {
            match &entry.fingerprint {
                Ok(fp) => println!("{fp}  {}", entry.file.file_name),
                Err(message) => eprintln!("  ✗ {}: {message}", entry.file.file_name),
            }
        }
    }
    tracing::debug!("Listed {} fingerprint(s)", entries.len());
    Ok(())
}

fn entry_json(entry: &FingerprintEntry) -> serde_json::Value {
    match &entry.fingerprint {
        Ok(fp) => serde_json::json!({
            "file": entry.file.file_name,
            "fingerprint": fp.to_hex(),
        }),
        Err(message) => serde_json::json!({
            "file": entry.file.file_name,
            "error": message,
        }),
    }
}

/// Execute the matches command.
pub async fn matches(args: MatchesArgs, config: &Config) -> anyhow::Result<()> {
    let dedup = Deduplicator::new(config)?;
    let found =
        diagnostics::find_matches(&dedup, &expand(&args.reference), &expand(&args.dir)).await?;

    if found.is_empty() {
        eprintln!("No matching images.");
    }
    for file in &found {
        println!("{}", file.path.display());
    }
    Ok(())
}

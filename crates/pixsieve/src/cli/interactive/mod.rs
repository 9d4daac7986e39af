//! Guided mode for bare `pixsieve` invocation on a TTY.
//!
//! Prompts for a folder, shows what would be scanned, asks for confirmation
//! and delegates to the same handler as `pixsieve scan`.

pub mod theme;

use console::Style;
use dialoguer::{Confirm, Input};
use pixsieve_core::{Config, Deduplicator};
use std::path::PathBuf;

use crate::cli::scan::{self, ScanArgs};

/// Map an interrupted prompt (Ctrl+C / terminal disconnect) to `Ok(None)`.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Entry point for guided mode.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    theme::print_banner();
    let theme = theme::pixsieve_theme();
    let warn = Style::new().for_stderr().yellow();
    let dim = Style::new().for_stderr().dim();
    let dedup = Deduplicator::new(config)?;

    loop {
        let Some(raw_path) = handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Folder to scan")
                .interact_text(),
        )?
        else {
            return Ok(());
        };
        let dir = expand_input(&raw_path);

        if !dir.is_dir() {
            eprintln!(
                "  {}",
                warn.apply_to(format!("Not a folder: {}", dir.display()))
            );
            continue;
        }

        let candidates = dedup.enumerator().enumerate(&dir)?;
        eprintln!(
            "  {}",
            dim.apply_to(format!(
                "Found {} image(s) matching {}",
                candidates.len(),
                dedup.extensions().patterns().join(", ")
            ))
        );

        let confirm = Confirm::with_theme(&theme)
            .with_prompt(format!(
                "Move duplicates into {}?",
                dir.join(dedup.quarantine_name()).display()
            ))
            .default(true)
            .interact_opt()?;

        if matches!(confirm, Some(true)) {
            let args = ScanArgs {
                dir,
                ..ScanArgs::default()
            };
            if let Err(e) = scan::execute(args, config).await {
                let err = Style::new().for_stderr().red();
                eprintln!("  {} {e}", err.apply_to("✗"));
            }
        }

        eprintln!();
        let again = Confirm::with_theme(&theme)
            .with_prompt("Scan another folder?")
            .default(false)
            .interact_opt()?;
        if !matches!(again, Some(true)) {
            break;
        }
    }

    Ok(())
}

/// Trim the typed path and expand a leading `~`.
fn expand_input(raw: &str) -> PathBuf {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    PathBuf::from(shellexpand::tilde(trimmed).into_owned())
}

//! Pixsieve CLI - move near-duplicate images into a quarantine subfolder.
//!
//! Pixsieve fingerprints every image in a folder, keeps the first file of each
//! fingerprint and moves later repeats into `<folder>/duplicates`. Nothing is
//! deleted; review the quarantine folder and empty it yourself.
//!
//! # Usage
//!
//! ```bash
//! # Quarantine duplicates in a folder
//! pixsieve scan ~/Pictures/export
//!
//! # Print fingerprints without moving anything
//! pixsieve hashes ~/Pictures/export
//!
//! # Find copies of one image
//! pixsieve matches ~/Desktop/cat.jpg ~/Pictures/export
//!
//! # Guided mode
//! pixsieve
//! ```

use clap::{CommandFactory, Parser, Subcommand};

mod cli;
mod logging;

/// Pixsieve - move near-duplicate images into a quarantine subfolder.
#[derive(Parser, Debug)]
#[command(name = "pixsieve")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a folder and quarantine duplicate images
    Scan(cli::scan::ScanArgs),

    /// Print the fingerprint of every image in a folder
    Hashes(cli::diagnose::HashesArgs),

    /// List images in a folder that match a reference image
    Matches(cli::diagnose::MatchesArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match pixsieve_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `pixsieve config path`."
            );
            pixsieve_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Pixsieve v{}", pixsieve_core::VERSION);

    match cli.command {
        Some(Commands::Scan(args)) => cli::scan::execute(args, &config).await,
        Some(Commands::Hashes(args)) => cli::diagnose::hashes(args, &config).await,
        Some(Commands::Matches(args)) => cli::diagnose::matches(args, &config).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if console::Term::stderr().is_term() => cli::interactive::run(&config).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

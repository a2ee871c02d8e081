//! RPG character tracker.
//!
//! A line-oriented terminal driver for tracking characters' hit points,
//! armor and mana through combat, with undo and redo.
//!
//! ```bash
//! cargo run -p tracker
//! cargo run -p tracker -- --memory      # don't read or write the storage file
//! ```

mod commands;
mod headless;

use tracker_core::{CharacterTracker, MemoryStore, TrackerConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the protocol on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let mut config = TrackerConfig::from_env()?;
    if let Some(dir) = arg_value(&args, "--data-dir") {
        config = config.with_data_dir(dir);
    }
    if let Some(key) = arg_value(&args, "--key") {
        config = config.with_storage_key(key);
    }

    let mut tracker = if args.iter().any(|a| a == "--memory") {
        tracing::info!("Running without persistent storage");
        CharacterTracker::new(config, Box::new(MemoryStore::new()))
    } else {
        tracing::info!("Using storage file {}", config.storage_file().display());
        CharacterTracker::open(config)
    };

    headless::run_headless(&mut tracker)?;
    Ok(())
}

/// Value following `flag` on the command line.
fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn print_help() {
    println!("RPG Character Tracker");
    println!();
    println!("USAGE:");
    println!("  tracker [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help          Show this help message");
    println!("  --memory            Keep characters in memory only");
    println!("  --data-dir <DIR>    Directory of the storage file");
    println!("  --key <KEY>         Storage slot key (default: rpg-character-manager)");
    println!();
    println!("ENVIRONMENT (also read from .env):");
    println!("  TRACKER_DATA_DIR, TRACKER_STORAGE_KEY, TRACKER_MAX_STAT, TRACKER_MAX_RESISTANCE");
    println!("  RUST_LOG            Log filter (logs go to stderr)");
    println!();
    println!("Type #help once running for the command list.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_value() {
        let args: Vec<String> = ["tracker", "--data-dir", "/tmp/x", "--memory"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(arg_value(&args, "--data-dir"), Some("/tmp/x"));
        assert_eq!(arg_value(&args, "--memory"), None);
        assert_eq!(arg_value(&args, "--key"), None);
    }
}

//! Stockroom CLI - Database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Run inventory database migrations
//! stockroom migrate
//!
//! # Replace all stores and products with the bundled demo dataset
//! stockroom seed
//!
//! # Seed from another file
//! stockroom seed --file path/to/inventory.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Reset the database and load stores/products from YAML

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

/// Dataset shipped with the repository, independent of the working directory.
const DEFAULT_SEED_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/seed/inventory.yaml");

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(author, version, about = "Stockroom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Delete all stores and products, then load demo data
    Seed {
        /// YAML file with stores and their products
        #[arg(short, long, default_value = DEFAULT_SEED_FILE)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => {
            commands::seed::run(&file).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_seed_file_defaults_to_bundled_dataset() {
        let cli = Cli::try_parse_from(["stockroom", "seed"]).ok();
        assert!(matches!(
            cli.map(|c| c.command),
            Some(Commands::Seed { file }) if file == PathBuf::from(DEFAULT_SEED_FILE)
        ));
    }

    #[test]
    fn test_default_seed_file_exists() {
        assert!(PathBuf::from(DEFAULT_SEED_FILE).is_absolute());
        assert!(std::path::Path::new(DEFAULT_SEED_FILE).is_file());
    }
}

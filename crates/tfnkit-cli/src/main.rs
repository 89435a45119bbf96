//! tfnkit CLI
//!
//! Developer tool for trying transform chains against sample values.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// tfnkit - field transformation toolkit
#[derive(Parser)]
#[command(name = "tfnkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = commands::DEFAULT_CONFIG)]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered transforms
    Transforms,

    /// Apply a transform chain to a single value
    Apply {
        /// Input value
        #[arg(long)]
        value: String,

        /// Comma-separated transform chain
        #[arg(long)]
        chain: String,

        /// Field name to store the value under
        #[arg(long, default_value = "value")]
        name: String,
    },

    /// Evaluate every query of a fixture file in one transaction
    Eval {
        /// Fixture file (YAML)
        fixture: String,
    },

    /// Validate configuration without evaluating anything
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs on stderr, command output on stdout
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Transforms => {
            commands::transforms::run(&cli.config)?;
        }
        Commands::Apply { value, chain, name } => {
            commands::apply::run(&cli.config, &name, &value, &chain)?;
        }
        Commands::Eval { fixture } => {
            commands::eval::run(&cli.config, &fixture)?;
        }
        Commands::Validate => {
            commands::validate::run(&cli.config)?;
        }
    }

    Ok(())
}

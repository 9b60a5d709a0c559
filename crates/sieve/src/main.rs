//! sieve CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "sieve")]
#[command(version)]
#[command(about = "Merge themes and purge unused classes", long_about = None)]
struct Cli {
    /// Configuration file (defaults to sieve.yml, sieve.yaml or sieve.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve content globs against DIR instead of the configuration's directory
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merged theme as JSON
    Theme {
        /// Print only this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Scan content and list every class name found
    Scan,

    /// Decide which candidate class names survive the purge
    Purge {
        /// Candidate class names
        names: Vec<String>,

        /// Read candidates from FILE, one per line
        #[arg(long, value_name = "FILE")]
        candidates: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration and its plugins
    Check,

    /// Describe a diagnostic code, or list every code
    Explain {
        /// Code such as S-1-2
        code: Option<String>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sieve=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let context = commands::Context {
        config: cli.config,
        root: cli.root,
    };

    match cli.command {
        Commands::Theme { category } => commands::theme::execute(&context, category.as_deref()),
        Commands::Scan => commands::scan::execute(&context),
        Commands::Purge {
            names,
            candidates,
            json,
        } => commands::purge::execute(
            &context,
            commands::purge::PurgeArgs {
                names,
                candidates,
                json,
            },
        ),
        Commands::Check => commands::check::execute(&context),
        Commands::Explain { code } => commands::explain::execute(code.as_deref()),
    }
}

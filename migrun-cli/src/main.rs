//! CLI entry point for migrun

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use migrun_cli::MigrunConfig;

#[derive(Parser)]
#[command(name = "migrun")]
#[command(about = "Apply numbered SQL migration scripts to a MySQL database")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// MySQL connection URL (overrides config)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Directory of numbered .sql scripts (overrides config)
    #[arg(short, long, global = true)]
    scripts_dir: Option<PathBuf>,

    /// Record each script in the same transaction that runs it
    #[arg(long, global = true)]
    atomic: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending scripts (default)
    Run,
    /// List scripts and whether each has been applied
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create the next numbered script
    New {
        /// Name part of the new file, e.g. `add_users`
        label: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = MigrunConfig::load(cli.config.as_deref())?;

    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    // Apply CLI overrides
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    if let Some(dir) = cli.scripts_dir {
        config.scripts_dir = dir;
    }
    if cli.atomic {
        config.atomic = true;
    }

    config.validate()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let report = migrun_cli::run(&config).await?;
            for script in &report.applied {
                println!("applied {}", script);
            }
            info!(
                applied = report.applied.len(),
                skipped = report.skipped.len(),
                "done"
            );
        }
        Commands::Status { json } => {
            let statuses = migrun_cli::status(&config).await?;
            if json {
                println!("{}", migrun_cli::render_status_json(&statuses)?);
            } else {
                print!("{}", migrun_cli::render_status(&statuses));
            }
        }
        Commands::New { label } => {
            let path = migrun_cli::new_script(&config, label.as_deref()).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

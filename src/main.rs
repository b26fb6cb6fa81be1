// contao-devtools/src/main.rs

//! Developer convenience commands for Contao projects
//!
//! Synchronises files and database from a remote installation, runs the
//! registered database updates and optimizes remote images in place.

mod config;
mod errors;
mod imageoptim;
mod runner;
mod sync;
mod update;
mod utils;

use std::env;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use crate::errors::Result;
use crate::sync::SyncOptions;
use crate::update::{NoPendingSchema, UpdateManager, UpdateOptions};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronise database and files from a remote installation
    Sync(SyncArgs),
    /// Run Contao database updates and the pending schema diff
    DbUpdate(DbUpdateArgs),
    /// Optimize all JPEG & PNG images within the files directory of a remote installation
    ImageOptim(ImageOptimArgs),
}

#[derive(Args)]
struct SyncArgs {
    /// Environment to synchronise from
    environment: String,

    /// Timeout in seconds for the transfer steps
    timeout: Option<u64>,

    /// Skip the filesystem sync and only synchronise the database
    #[arg(long)]
    database_only: bool,
}

#[derive(Args)]
struct DbUpdateArgs {
    /// Also drop database assets not relevant to the current metadata
    #[arg(long)]
    complete: bool,

    /// Dump the generated SQL statements to the screen (does not execute them)
    #[arg(long)]
    dump_sql: bool,

    /// Physically execute the generated SQL statements against the database
    #[arg(short, long)]
    force: bool,
}

#[derive(Args)]
struct ImageOptimArgs {
    /// Environment whose files directory should be optimized
    environment: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_app(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {e:?}");
            ExitCode::from(2)
        }
    }
}

async fn run_app(cli: Cli) -> Result<ExitCode> {
    let project_dir = env::current_dir()?;

    match cli.command {
        Commands::Sync(args) => {
            let options = SyncOptions {
                timeout_secs: args
                    .timeout
                    .filter(|t| *t > 0)
                    .unwrap_or(runner::DEFAULT_TIMEOUT_SECS),
                database_only: args.database_only,
            };

            sync::run_sync_flow(&project_dir, &args.environment, options).await
        }
        Commands::DbUpdate(args) => {
            let options = UpdateOptions {
                complete: args.complete,
                dump_sql: args.dump_sql,
                force: args.force,
            };

            // Project-specific update units get registered here.
            let mut manager = UpdateManager::new();
            let mut installer = NoPendingSchema;

            update::run_db_update_flow(&mut manager, &mut installer, &options)
        }
        Commands::ImageOptim(args) => {
            imageoptim::run_image_optim_flow(&project_dir, &args.environment).await
        }
    }
}

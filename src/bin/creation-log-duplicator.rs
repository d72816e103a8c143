//! # Creation Log Duplicator CLI
//!
//! Command-line front end: list the columns of a collection's sub-records and
//! run a duplication with live progress output.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use creation_log_duplicator::logging::init_structured_logging;
use creation_log_duplicator::{
    CollectionId, ColumnId, CreationLogDuplicator, DuplicatorConfig, GraphqlRecordStore,
    RunNotification, SuccessPolicy,
};

#[derive(Parser, Debug)]
#[command(name = "creation-log-duplicator")]
#[command(about = "Copy creation-log values into another sub-record column")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the sub-record columns that can receive the creation log
    Columns {
        /// Collection (board) id
        #[arg(long)]
        collection: String,
    },
    /// Copy the creation log of every sub-record into the target column
    Run {
        /// Collection (board) id
        #[arg(long)]
        collection: String,
        /// Column id that receives the creation-log value
        #[arg(long)]
        target_column: String,
        /// Report failure if any batch was rejected
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose > 0 && std::env::var_os("RUST_LOG").is_none() {
        let level = if cli.verbose > 1 { "trace" } else { "debug" };
        std::env::set_var("RUST_LOG", level);
    }
    init_structured_logging();

    let mut config =
        DuplicatorConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Columns { collection } => {
            let store = Arc::new(GraphqlRecordStore::new(&config)?);
            let duplicator = CreationLogDuplicator::new(store, config)?;
            let columns = duplicator
                .available_columns(&CollectionId::new(collection))
                .await
                .context("Failed to read columns")?;

            if columns.is_empty() {
                println!("No sub-records found; no columns to choose from.");
            }
            for column in columns {
                println!("{}\t{}", column.id, column.title);
            }
            Ok(())
        }
        Commands::Run {
            collection,
            target_column,
            strict,
        } => {
            if strict {
                config.success_policy = SuccessPolicy::Strict;
            }
            let store = Arc::new(GraphqlRecordStore::new(&config)?);
            let duplicator = CreationLogDuplicator::new(store, config)?;

            let cancellation = duplicator.cancellation();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received; stopping after the current request");
                    cancellation.cancel();
                }
            });

            let mut notifications = duplicator.subscribe();
            let printer = tokio::spawn(async move {
                loop {
                    let published = match notifications.recv().await {
                        Ok(published) => published,
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    };
                    match published.notification {
                        RunNotification::Started {
                            total, batch_count, ..
                        } => println!("Duplicating {total} creation logs in {batch_count} batches"),
                        RunNotification::BatchCompleted {
                            batch_number,
                            processed,
                            total,
                        } => println!("[batch {batch_number}] {processed}/{total}"),
                        RunNotification::BatchFailed {
                            batch_number,
                            error,
                        } => eprintln!("[batch {batch_number}] failed: {error}"),
                        RunNotification::Finished { .. } | RunNotification::Aborted { .. } => break,
                    }
                }
            });

            let result = duplicator
                .run(&CollectionId::new(collection), &ColumnId::new(target_column))
                .await;
            // Finished is always published for a report; errors may end before any notification
            if result.is_ok() {
                let _ = printer.await;
            } else {
                printer.abort();
            }
            let report = result.context("Duplication run failed")?;

            println!(
                "{}: {}/{} processed, {} of {} batches failed, {} items rejected",
                report.final_state(),
                report.progress.processed_count,
                report.progress.total_count,
                report.batches_failed,
                report.batch_count,
                report.items_rejected
            );
            info!(run_id = %report.run_id, duration_ms = report.duration_ms(), "Run finished");

            if !report.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

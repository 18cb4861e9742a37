//! oxide-bulk CLI
//!
//! Compiles bulk requests, rewrites sharded SQL and runs requests against a
//! SQLite database.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_bulk::{BulkExecutor, BulkRequest, ExecutorConfig, parse_shard_route};
use oxide_bulk_core::ShardingRewriter;

/// Bulk UPDATE/DELETE from ORM queries.
#[derive(Parser)]
#[command(name = "oxide-bulk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    database: String,

    /// Tag of sharding pragmas.
    #[arg(long, env = "OXIDE_BULK_SHARD_TAG", default_value = "SHARD")]
    shard_tag: String,

    /// Maximum pool size.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL and parameters a request compiles to.
    Compile {
        /// Request file (JSON).
        request: PathBuf,
    },

    /// Apply sharding pragmas to SQL read from stdin.
    Rewrite,

    /// Compile a request and execute it.
    Run {
        /// Request file (JSON).
        request: PathBuf,

        /// Route a table, as OLD:NEW. Overrides the request's route.
        #[arg(short, long)]
        shard: Option<String>,

        /// Run inside a transaction and roll it back.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Compile { request } => {
            let request = BulkRequest::from_file(&request)?;
            let statement = request.compile(&cli.shard_tag)?;
            println!("{}", serde_json::to_string_pretty(&statement)?);
        }

        Commands::Rewrite => {
            let mut sql = String::new();
            std::io::stdin().read_to_string(&mut sql)?;
            let rewriter = ShardingRewriter::new(&cli.shard_tag);
            print!("{}", rewriter.rewrite(&sql));
        }

        Commands::Run {
            request,
            shard,
            dry_run,
        } => {
            let mut request = BulkRequest::from_file(&request)?;
            if let Some(route) = shard {
                request.shard = Some(parse_shard_route(&route)?);
            }
            let statement = request.compile(&cli.shard_tag)?;

            let config = ExecutorConfig {
                max_connections: cli.max_connections,
                shard_tag: cli.shard_tag,
            };
            let executor = BulkExecutor::connect(&cli.database, &config).await?;

            let mut tx = executor.begin().await?;
            let affected = tx.execute(&statement, &request.bindings).await?;
            if dry_run {
                tx.rollback().await?;
                info!(rows = affected, "Dry run, changes rolled back");
            } else {
                tx.commit().await?;
                info!(rows = affected, "Statement applied");
            }

            println!("{}", serde_json::to_string_pretty(&executor.stats())?);
            executor.close().await;
        }
    }

    Ok(())
}

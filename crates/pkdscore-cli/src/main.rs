mod analyze;
mod collect;
mod db;
mod report;
mod scores;
mod sentiment;

use clap::{Parser, Subcommand};
use rust_decimal::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::analyze::AnalyzeCommands;
use crate::collect::CollectCommands;
use crate::db::DbCommands;
use crate::report::ImportCommands;
use crate::sentiment::SentimentCommands;

#[derive(Debug, Parser)]
#[command(name = "pkdscore")]
#[command(about = "Collect, score and blend PKD sector indicators")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Fetch raw data from an external source
    Collect {
        #[command(subcommand)]
        command: CollectCommands,
    },
    /// Turn collected artifacts into sector scores
    Analyze {
        #[command(subcommand)]
        command: AnalyzeCommands,
    },
    /// Load a previously written artifact into the database
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Emotion scoring of stored social posts
    Sentiment {
        #[command(subcommand)]
        command: SentimentCommands,
    },
    /// Print the blended sector scores
    Scores {
        /// Show a single sector (PKD section letter)
        #[arg(long)]
        sector: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("no command given; run `pkdscore --help`");
        return Ok(());
    };

    let config = pkdscore_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = pkdscore_db::PoolConfig::from_app_config(&config);
    let pool = pkdscore_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => db::run(&pool, &config, command).await,
        Commands::Collect { command } => collect::run(&pool, &config, command).await,
        Commands::Analyze { command } => analyze::run(&pool, &config, command).await,
        Commands::Import { command } => report::run(&pool, command).await,
        Commands::Sentiment { command } => sentiment::run(&pool, command).await,
        Commands::Scores { sector } => scores::run_scores(&pool, sector.as_deref()).await,
    }
}

/// Convert a score to a two-decimal `Decimal`; `None` for NaN or infinity.
pub(crate) fn decimal2(value: f64) -> Option<Decimal> {
    Decimal::from_f64(pkdscore_core::scoring::round2(value)).map(|d| d.round_dp(2))
}

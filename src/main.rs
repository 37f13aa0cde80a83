mod analytics;
mod api;
mod chat;
mod classifier;
mod config;
mod currency;
mod db;
mod error;
mod extractor;
mod ingest;
mod rules;
mod types;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::analytics::MarketAnalytics;
use crate::api::health::HealthState;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::db::CatalogWriter;
use crate::error::Result;
use crate::extractor::Extractor;
use crate::ingest::ScrapedListing;
use crate::types::ExtractMode;

#[derive(Parser)]
#[command(name = "watchmarket")]
#[command(about = "Watch listing aggregator: chat/listing extraction, catalog and price API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations, the analytics task and the HTTP API (default)
    Serve,

    /// Import a WhatsApp chat export into the catalog
    ImportChat {
        path: PathBuf,
        /// Dealer group label (defaults to DEALER_GROUP)
        #[arg(long)]
        group: Option<String>,
    },

    /// Import a JSON array of scraped retail listings into the catalog
    ImportListings { path: PathBuf },

    /// Extract candidates from one message and print them as JSON
    Extract {
        message: String,
        #[arg(long, value_enum, default_value_t = ModeArg::Chat)]
        mode: ModeArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Chat,
    Listing,
}

impl From<ModeArg> for ExtractMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Chat => ExtractMode::Chat,
            ModeArg::Listing => ExtractMode::Listing,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cli.command.unwrap_or(Commands::Serve), cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, cfg: Config) -> Result<()> {
    match command {
        Commands::Serve => serve(cfg).await,
        Commands::ImportChat { path, group } => {
            let pool = db::connect(&cfg.db_path).await?;
            let messages = chat::read_export(&path).await?;
            let group = group.unwrap_or(cfg.dealer_group);
            let summary = ingest::ingest_chat(&CatalogWriter::new(pool), &messages, &group).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Commands::ImportListings { path } => {
            let pool = db::connect(&cfg.db_path).await?;
            let content = tokio::fs::read_to_string(&path).await?;
            let listings: Vec<ScrapedListing> = serde_json::from_str(&content)?;
            let summary =
                ingest::ingest_scraped(&CatalogWriter::new(pool), &listings, now_ns()).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Commands::Extract { message, mode } => {
            let candidates = Extractor::new(mode.into()).extract(&message);
            println!("{}", serde_json::to_string_pretty(&candidates)?);
            Ok(())
        }
    }
}

async fn serve(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let pool = db::connect(&cfg.db_path).await?;
    info!("Database ready at {}", cfg.db_path);

    let health = Arc::new(HealthState::new(now_ns()));

    // Market analytics (background, every ANALYTICS_INTERVAL_SECS)
    let analytics = MarketAnalytics::new(pool.clone(), Arc::clone(&health));
    tokio::spawn(async move { analytics.run().await });

    // HTTP API server
    let api_state = ApiState {
        pool: pool.clone(),
        health,
        arbitrage_min_spread_usd: cfg.arbitrage_min_spread_usd,
        deal_discount_ratio: cfg.deal_discount_ratio,
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

pub(crate) fn now_ns() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as i64
}

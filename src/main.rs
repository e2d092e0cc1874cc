//! Engagement intake - teacher engagement questionnaire service

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engagement_intake::{
    config::{Args, LogFormat},
    db::{redact_uri, MongoClient},
    server::{self, AppState},
    store::{EngagementStore, MemoryStore, MongoEngagementStore, SeedData},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| args.default_log_filter().into());
    let registry = tracing_subscriber::registry().with(filter);
    match args.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Engagement Intake");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("Token mode: {}", args.token_mode.as_str());
    info!("MongoDB: {} (db: {})", redact_uri(&args.mongodb_uri), args.mongodb_db);
    info!("Request timeout: {} ms", args.request_timeout_ms);
    info!("======================================");

    let store: Arc<dyn EngagementStore> =
        match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => {
                info!("MongoDB connected successfully");
                Arc::new(MongoEngagementStore::new(&client).await?)
            }
            Err(e) => {
                if args.dev_mode {
                    warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                    Arc::new(memory_store(&args).await?)
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        };

    let state = Arc::new(AppState::new(args, store));
    server::run(state).await?;

    Ok(())
}

/// In-memory store for dev mode, seeded from SEED_FILE when given
async fn memory_store(args: &Args) -> anyhow::Result<MemoryStore> {
    let Some(path) = &args.seed_file else {
        return Ok(MemoryStore::new());
    };

    let seed = SeedData::from_file(path).await?;
    info!(
        "Seeded in-memory store from {} ({} schools, {} teachers)",
        path.display(),
        seed.schools.len(),
        seed.teachers.len()
    );
    Ok(MemoryStore::with_seed(seed).await?)
}

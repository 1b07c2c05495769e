mod awareness;
mod config;
mod errors;
mod llm_client;
mod models;
mod planning;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, GeneratorBackend, StoreBackend};
use crate::llm_client::LlmClient;
use crate::planning::generator::{LlmPlanGenerator, MockPlanGenerator, PlanGenerator};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::nocodb::NocoStore;
use crate::store::pocketbase::PocketBaseStore;
use crate::store::postgres::PostgresStore;
use crate::store::PlanStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pauta API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the plan store for the configured backend
    let store = build_store(&config).await?;
    info!("Plan store initialized ({:?} backend)", config.store_backend);

    // Initialize LLM client (awareness extraction uses it directly)
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize the plan generator
    let generator: Arc<dyn PlanGenerator> = match config.generator_backend {
        GeneratorBackend::Llm => Arc::new(LlmPlanGenerator::new(llm.clone())),
        GeneratorBackend::Mock => Arc::new(MockPlanGenerator),
    };
    info!("Plan generator initialized ({})", generator.name());

    // Plain HTTP client for the calendar scraper
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    // Build app state
    let state = AppState {
        store,
        generator,
        llm,
        http,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the plan store selected by STORE_BACKEND.
async fn build_store(config: &Config) -> Result<Arc<dyn PlanStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config.database_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL is required for the postgres backend")
            })?;
            Ok(Arc::new(PostgresStore::connect(database_url).await?))
        }
        StoreBackend::NocoDb => {
            let settings = config.nocodb.clone().ok_or_else(|| {
                anyhow::anyhow!("NocoDB settings are required for the nocodb backend")
            })?;
            Ok(Arc::new(NocoStore::new(settings)))
        }
        StoreBackend::PocketBase => {
            let settings = config.pocketbase.clone().ok_or_else(|| {
                anyhow::anyhow!("PocketBase settings are required for the pocketbase backend")
            })?;
            Ok(Arc::new(PocketBaseStore::new(settings)))
        }
    }
}

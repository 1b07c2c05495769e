use anyhow::{bail, Context, Result};

/// Which storage backend the service runs against. Selected at startup via
/// `STORE_BACKEND`; only that backend's connection variables are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    NocoDb,
    PocketBase,
}

/// Which generation backend produces plan items. `GENERATOR_BACKEND=mock`
/// runs fully offline; the default calls the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorBackend {
    Llm,
    Mock,
}

#[derive(Debug, Clone)]
pub struct NocoConfig {
    pub base_url: String,
    pub token: String,
    pub plans_table: String,
    pub items_table: String,
    pub events_table: String,
}

#[derive(Debug, Clone)]
pub struct PocketBaseConfig {
    pub base_url: String,
    pub token: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable required by the selected backends is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub generator_backend: GeneratorBackend,
    pub database_url: Option<String>,
    pub nocodb: Option<NocoConfig>,
    pub pocketbase: Option<PocketBaseConfig>,
    /// Required under the LLM generator backend; the awareness sync endpoint
    /// also needs it regardless of backend.
    pub anthropic_api_key: String,
    /// Page the awareness calendar sync scrapes.
    pub awareness_calendar_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let store_backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "nocodb" => StoreBackend::NocoDb,
            "pocketbase" => StoreBackend::PocketBase,
            other => bail!("STORE_BACKEND must be postgres, nocodb or pocketbase (got '{other}')"),
        };

        let generator_backend = match std::env::var("GENERATOR_BACKEND")
            .unwrap_or_else(|_| "llm".to_string())
            .to_lowercase()
            .as_str()
        {
            "llm" => GeneratorBackend::Llm,
            "mock" => GeneratorBackend::Mock,
            other => bail!("GENERATOR_BACKEND must be llm or mock (got '{other}')"),
        };

        let database_url = match store_backend {
            StoreBackend::Postgres => Some(require_env("DATABASE_URL")?),
            _ => None,
        };

        let nocodb = match store_backend {
            StoreBackend::NocoDb => Some(NocoConfig {
                base_url: require_env("NOCODB_URL")?,
                token: require_env("NOCODB_TOKEN")?,
                plans_table: require_env("NOCODB_PLANS_TABLE")?,
                items_table: require_env("NOCODB_ITEMS_TABLE")?,
                events_table: require_env("NOCODB_EVENTS_TABLE")?,
            }),
            _ => None,
        };

        let pocketbase = match store_backend {
            StoreBackend::PocketBase => Some(PocketBaseConfig {
                base_url: require_env("POCKETBASE_URL")?,
                token: require_env("POCKETBASE_TOKEN")?,
            }),
            _ => None,
        };

        // The mock generator runs without a key; awareness sync will then
        // fail at call time rather than blocking startup.
        let anthropic_api_key = match generator_backend {
            GeneratorBackend::Llm => require_env("ANTHROPIC_API_KEY")?,
            GeneratorBackend::Mock => std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
        };

        Ok(Config {
            store_backend,
            generator_backend,
            database_url,
            nocodb,
            pocketbase,
            anthropic_api_key,
            awareness_calendar_url: std::env::var("AWARENESS_CALENDAR_URL").unwrap_or_else(|_| {
                "https://www.gov.br/saude/pt-br/assuntos/saude-de-a-a-z/c/calendario-de-datas-comemorativas".to_string()
            }),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

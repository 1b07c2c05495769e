use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::planning::generator::PlanGenerator;
use crate::store::PlanStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable plan storage. Selected via STORE_BACKEND env.
    pub store: Arc<dyn PlanStore>,
    /// Pluggable plan generator. Selected via GENERATOR_BACKEND env.
    pub generator: Arc<dyn PlanGenerator>,
    /// LLM client used directly by the awareness calendar extraction.
    pub llm: LlmClient,
    /// Plain HTTP client for fetching the awareness calendar page.
    pub http: reqwest::Client,
    pub config: Config,
}

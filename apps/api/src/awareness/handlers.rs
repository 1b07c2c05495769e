//! Axum route handlers for the awareness calendar API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::awareness::normalizer::normalize_calendar_text;
use crate::awareness::scraper::fetch_calendar_page;
use crate::errors::AppError;
use crate::models::awareness::AwarenessEventRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AwarenessQuery {
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub synced: u64,
}

#[derive(Debug, Serialize)]
pub struct ListAwarenessResponse {
    pub events: Vec<AwarenessEventRow>,
}

/// POST /api/v1/awareness/sync
///
/// Refreshes the stored awareness calendar: scrape → LLM extraction →
/// full replace. The previous set is gone once this succeeds.
pub async fn handle_awareness_sync(
    State(state): State<AppState>,
) -> Result<Json<SyncResponse>, AppError> {
    let url = &state.config.awareness_calendar_url;
    let text = fetch_calendar_page(&state.http, url).await?;
    info!("Scraped {} chars of calendar text from {url}", text.len());

    let events = normalize_calendar_text(&state.llm, &text).await?;
    let synced = state.store.replace_awareness_events(events).await?;
    info!("Awareness calendar synced: {synced} events stored");

    Ok(Json(SyncResponse { synced }))
}

/// GET /api/v1/awareness?month=7
///
/// Lists stored awareness events, optionally for a single month.
pub async fn handle_list_awareness(
    State(state): State<AppState>,
    Query(query): Query<AwarenessQuery>,
) -> Result<Json<ListAwarenessResponse>, AppError> {
    if let Some(month) = query.month {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
    }

    let events = state.store.list_awareness_events(query.month).await?;
    Ok(Json(ListAwarenessResponse { events }))
}

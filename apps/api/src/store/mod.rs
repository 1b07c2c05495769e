//! Plan storage: pluggable, trait-based persistence behind one CRUD contract.
//!
//! Backends: `PostgresStore` (direct sqlx), `NocoStore` (NocoDB v2 REST) and
//! `PocketBaseStore` (PocketBase REST). `AppState` holds an
//! `Arc<dyn PlanStore>`, selected at startup via `STORE_BACKEND`.

pub mod nocodb;
pub mod pocketbase;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::models::awareness::{AwarenessEventRow, NewAwarenessEvent};
use crate::models::plan::{ItemStatus, NewPlan, NewPlanItem, PlanItemRow, PlanItemUpdate, PlanRow};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Record shape error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// The storage trait. Implement this to add a backend without touching the
/// handlers or the generation pipeline.
///
/// Carried in `AppState` as `Arc<dyn PlanStore>`.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn create_plan(&self, plan: NewPlan) -> Result<PlanRow, StoreError>;
    async fn list_plans(&self) -> Result<Vec<PlanRow>, StoreError>;
    async fn get_plan(&self, id: &str) -> Result<PlanRow, StoreError>;

    async fn insert_items(
        &self,
        plan_id: &str,
        items: Vec<NewPlanItem>,
    ) -> Result<Vec<PlanItemRow>, StoreError>;
    async fn list_items(&self, plan_id: &str) -> Result<Vec<PlanItemRow>, StoreError>;
    async fn get_item(&self, id: &str) -> Result<PlanItemRow, StoreError>;
    async fn update_item(
        &self,
        id: &str,
        update: PlanItemUpdate,
    ) -> Result<PlanItemRow, StoreError>;
    async fn set_item_status(
        &self,
        id: &str,
        status: ItemStatus,
    ) -> Result<PlanItemRow, StoreError>;
    async fn delete_item(&self, id: &str) -> Result<(), StoreError>;

    /// Replaces the whole awareness calendar (events recur yearly, so sync
    /// is a full refresh). Returns the number of stored events.
    async fn replace_awareness_events(
        &self,
        events: Vec<NewAwarenessEvent>,
    ) -> Result<u64, StoreError>;
    async fn list_awareness_events(
        &self,
        month: Option<u32>,
    ) -> Result<Vec<AwarenessEventRow>, StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Shared wire parsing for the REST backends
// ────────────────────────────────────────────────────────────────────────────

/// Parses the timestamp shapes the REST backends emit: RFC 3339, the
/// space-separated variant NocoDB uses, and PocketBase's
/// "YYYY-MM-DD HH:MM:SS.mmmZ".
pub(crate) fn parse_flexible_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%:z"] {
        if let Ok(ts) = DateTime::parse_from_str(raw, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.fZ") {
        return Some(naive.and_utc());
    }
    None
}

/// Parses a date column that REST backends may return as null, an empty
/// string, a plain date, or a date with a trailing time part.
pub(crate) fn parse_optional_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let date_part = raw
        .split(|c| c == ' ' || c == 'T')
        .next()
        .unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flexible_timestamp_rfc3339() {
        let ts = parse_flexible_timestamp("2026-07-01T08:30:00+00:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-07-01T08:30:00+00:00");
    }

    #[test]
    fn test_parse_flexible_timestamp_nocodb_space_separator() {
        let ts = parse_flexible_timestamp("2026-07-01 08:30:00+00:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-07-01T08:30:00+00:00");
    }

    #[test]
    fn test_parse_flexible_timestamp_pocketbase_millis_z() {
        let ts = parse_flexible_timestamp("2026-07-01 08:30:00.123Z").unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_parse_flexible_timestamp_rejects_garbage() {
        assert!(parse_flexible_timestamp("yesterday").is_none());
        assert!(parse_flexible_timestamp("").is_none());
    }

    #[test]
    fn test_parse_optional_date_handles_backend_variants() {
        assert_eq!(
            parse_optional_date(Some("2026-07-12")),
            NaiveDate::from_ymd_opt(2026, 7, 12)
        );
        assert_eq!(
            parse_optional_date(Some("2026-07-12 00:00:00.000Z")),
            NaiveDate::from_ymd_opt(2026, 7, 12)
        );
        assert_eq!(parse_optional_date(Some("")), None);
        assert_eq!(parse_optional_date(None), None);
        assert_eq!(parse_optional_date(Some("next tuesday")), None);
    }
}

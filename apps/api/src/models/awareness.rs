use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A recurring health-awareness calendar event. Events repeat yearly, so
/// only month and (optionally) day are stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AwarenessEventRow {
    pub id: String,
    /// 1-12.
    pub month: i32,
    /// Day of month when the event is a single date; None for month-long
    /// campaigns ("Pink October" style).
    pub day: Option<i32>,
    pub title: String,
    pub theme: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated event ready to be persisted by a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAwarenessEvent {
    pub month: i32,
    pub day: Option<i32>,
    pub title: String,
    pub theme: Option<String>,
}

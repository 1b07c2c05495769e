use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::planning::formats::ContentFormat;

/// A persisted content plan. Ids are strings end-to-end so the same shape
/// works across all storage backends (uuid strings on Postgres, native ids
/// on NocoDB and PocketBase).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlanRow {
    pub id: String,
    pub specialization: String,
    /// Target month as "YYYY-MM".
    pub month: String,
    pub goals: Vec<String>,
    pub target_total: i32,
    /// The format mix the plan was generated with, as a counts object.
    pub formats: Value,
    pub notes: Option<String>,
    /// Which generation backend produced the items ("llm" or "mock").
    pub generator: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a plan about to be persisted. The backend assigns the id and
/// the creation timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct NewPlan {
    pub specialization: String,
    pub month: String,
    pub goals: Vec<String>,
    pub target_total: i32,
    pub formats: Value,
    pub notes: Option<String>,
    pub generator: String,
}

/// A single content plan item: one proposed post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlanItemRow {
    pub id: String,
    pub plan_id: String,
    pub title: String,
    /// Wire identifier of the content format ("reels", "staticPost", ...).
    pub format: String,
    pub central_message: String,
    pub caption: String,
    pub cta: String,
    pub scheduled_date: Option<NaiveDate>,
    pub status: String,
    /// Stable ordering within the plan, as generated.
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for an item about to be persisted under a plan.
#[derive(Debug, Clone, Serialize)]
pub struct NewPlanItem {
    pub title: String,
    pub format: ContentFormat,
    pub central_message: String,
    pub caption: String,
    pub cta: String,
    pub scheduled_date: Option<NaiveDate>,
    pub position: i32,
}

/// Partial update applied to an existing item. `None` leaves a field
/// unchanged; `clear_scheduled_date` removes the date explicitly instead of
/// overloading an absent field.
#[derive(Debug, Clone, Default)]
pub struct PlanItemUpdate {
    pub title: Option<String>,
    pub format: Option<ContentFormat>,
    pub central_message: Option<String>,
    pub caption: Option<String>,
    pub cta: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub clear_scheduled_date: bool,
}

impl PlanItemUpdate {
    /// True when the update would touch nothing. The clear flag counts as a
    /// change even with every field absent.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.format.is_none()
            && self.central_message.is_none()
            && self.caption.is_none()
            && self.cta.is_none()
            && self.scheduled_date.is_none()
            && !self.clear_scheduled_date
    }
}

/// Lifecycle of a plan item. Items start as suggestions, get approved, and
/// are finally scheduled; anything rejected is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Suggested,
    Approved,
    Scheduled,
    Discarded,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Suggested => "suggested",
            ItemStatus::Approved => "approved",
            ItemStatus::Scheduled => "scheduled",
            ItemStatus::Discarded => "discarded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_status_wire_names() {
        let all = [
            ItemStatus::Suggested,
            ItemStatus::Approved,
            ItemStatus::Scheduled,
            ItemStatus::Discarded,
        ];
        for status in all {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json.as_str().unwrap(), status.as_str());
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: Result<ItemStatus, _> = serde_json::from_str("\"published\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_plan_item_row_serializes_scheduled_date_as_iso() {
        let row = PlanItemRow {
            id: "a1".to_string(),
            plan_id: "p1".to_string(),
            title: "Myths about sunscreen".to_string(),
            format: "carousel".to_string(),
            central_message: String::new(),
            caption: String::new(),
            cta: String::new(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 7, 12),
            status: "suggested".to_string(),
            position: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["scheduledDate"], "2026-07-12");
        assert_eq!(json["planId"], "p1");
    }

    #[test]
    fn test_item_update_is_empty_only_without_changes() {
        assert!(PlanItemUpdate::default().is_empty());

        let with_title = PlanItemUpdate {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        assert!(!with_title.is_empty());

        let clear_only = PlanItemUpdate {
            clear_scheduled_date: true,
            ..Default::default()
        };
        assert!(!clear_only.is_empty(), "clearing the date is a change");
    }
}

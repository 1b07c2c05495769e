//! Axum route handlers for the planning API.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::plan::{ItemStatus, PlanItemRow, PlanItemUpdate, PlanRow};
use crate::planning::distribution::{auto_distribute, total_publications};
use crate::planning::formats::{ContentFormat, FormatCounts, FORMAT_ORDER};
use crate::planning::generator::{
    create_plan, CreatePlanRequest, PlanResponse, MAX_PLAN_TOTAL, MIN_PLAN_TOTAL,
};
use crate::planning::rules::ContentGoal;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributePreviewRequest {
    #[serde(default)]
    pub goals: Vec<ContentGoal>,
    pub target_total: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatBreakdownEntry {
    pub format: ContentFormat,
    pub label: &'static str,
    pub count: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributePreviewResponse {
    pub formats: FormatCounts,
    pub breakdown: Vec<FormatBreakdownEntry>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct ListPlansResponse {
    pub plans: Vec<PlanRow>,
}

#[derive(Debug, Serialize)]
pub struct PlanDetailResponse {
    pub plan: PlanRow,
    pub items: Vec<PlanItemRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub items: Vec<PlanItemRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub month: String,
    pub days: Vec<CalendarDay>,
    pub unscheduled: Vec<PlanItemRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub format: Option<ContentFormat>,
    pub central_message: Option<String>,
    pub caption: Option<String>,
    pub cta: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub clear_scheduled_date: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ItemStatus,
}

// ────────────────────────────────────────────────────────────────────────────
// Plan handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/plans
///
/// Full plan creation pipeline: validate → distribute formats → generate →
/// normalize → persist. Returns the plan with all generated items.
pub async fn handle_create_plan(
    State(state): State<AppState>,
    Json(request): Json<CreatePlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let response = create_plan(state.store.as_ref(), state.generator.as_ref(), request).await?;
    Ok(Json(response))
}

/// GET /api/v1/plans
///
/// Lists all plans, newest first.
pub async fn handle_list_plans(
    State(state): State<AppState>,
) -> Result<Json<ListPlansResponse>, AppError> {
    let plans = state.store.list_plans().await?;
    Ok(Json(ListPlansResponse { plans }))
}

/// GET /api/v1/plans/:id
///
/// Returns the plan row and all of its items in generation order.
pub async fn handle_get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<PlanDetailResponse>, AppError> {
    let plan = state.store.get_plan(&plan_id).await?;
    let items = state.store.list_items(&plan_id).await?;
    Ok(Json(PlanDetailResponse { plan, items }))
}

/// GET /api/v1/plans/:id/calendar
///
/// Returns the plan's items grouped by scheduled day, plus the ones that
/// still have no date. Discarded items are excluded.
pub async fn handle_plan_calendar(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<CalendarResponse>, AppError> {
    let plan = state.store.get_plan(&plan_id).await?;
    let items = state.store.list_items(&plan_id).await?;
    let (days, unscheduled) = group_items_by_day(items);

    Ok(Json(CalendarResponse {
        month: plan.month,
        days,
        unscheduled,
    }))
}

/// POST /api/v1/plans/distribute
///
/// Pure preview of the goal-weighted format distribution, for the UI to show
/// before a plan is actually generated. Nothing is persisted.
pub async fn handle_distribute_preview(
    Json(request): Json<DistributePreviewRequest>,
) -> Result<Json<DistributePreviewResponse>, AppError> {
    if !(MIN_PLAN_TOTAL..=MAX_PLAN_TOTAL).contains(&request.target_total) {
        return Err(AppError::Validation(format!(
            "targetTotal must be between {MIN_PLAN_TOTAL} and {MAX_PLAN_TOTAL}, got {}",
            request.target_total
        )));
    }
    let target = std::num::NonZeroU32::new(request.target_total as u32)
        .ok_or_else(|| AppError::Validation("targetTotal must be at least 1".to_string()))?;

    let mut goals: Vec<ContentGoal> = Vec::new();
    for goal in request.goals {
        if !goals.contains(&goal) {
            goals.push(goal);
        }
    }

    let formats = auto_distribute(&goals, target);
    let breakdown = FORMAT_ORDER
        .into_iter()
        .map(|format| FormatBreakdownEntry {
            format,
            label: format.label(),
            count: formats.get(format),
        })
        .collect();

    Ok(Json(DistributePreviewResponse {
        formats,
        breakdown,
        total: total_publications(&formats),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Item handlers
// ────────────────────────────────────────────────────────────────────────────

/// PATCH /api/v1/items/:id
///
/// Partial edit of a plan item. `clearScheduledDate: true` removes the date
/// and wins over a `scheduledDate` sent in the same request.
pub async fn handle_update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<PlanItemRow>, AppError> {
    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
    }

    let update = PlanItemUpdate {
        title: request.title.map(|t| t.trim().to_string()),
        format: request.format,
        central_message: request.central_message,
        caption: request.caption,
        cta: request.cta,
        scheduled_date: request.scheduled_date,
        clear_scheduled_date: request.clear_scheduled_date,
    };

    if update.is_empty() {
        return Err(AppError::Validation(
            "update contains no fields to change".to_string(),
        ));
    }

    let item = state.store.update_item(&item_id, update).await?;
    Ok(Json(item))
}

/// POST /api/v1/items/:id/status
///
/// Moves an item through its lifecycle (suggested, approved, scheduled,
/// discarded). Unknown statuses are rejected at deserialization.
pub async fn handle_item_status(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<PlanItemRow>, AppError> {
    let item = state.store.set_item_status(&item_id, request.status).await?;
    Ok(Json(item))
}

/// DELETE /api/v1/items/:id
pub async fn handle_delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete_item(&item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Calendar grouping
// ────────────────────────────────────────────────────────────────────────────

/// Splits items into per-day buckets (sorted by date, then by position) and
/// an unscheduled remainder. Discarded items are dropped entirely.
fn group_items_by_day(items: Vec<PlanItemRow>) -> (Vec<CalendarDay>, Vec<PlanItemRow>) {
    let mut by_day: BTreeMap<NaiveDate, Vec<PlanItemRow>> = BTreeMap::new();
    let mut unscheduled = Vec::new();

    for item in items {
        if item.status == ItemStatus::Discarded.as_str() {
            continue;
        }
        match item.scheduled_date {
            Some(date) => by_day.entry(date).or_default().push(item),
            None => unscheduled.push(item),
        }
    }

    let days = by_day
        .into_iter()
        .map(|(date, mut items)| {
            items.sort_by_key(|item| item.position);
            CalendarDay { date, items }
        })
        .collect();

    (days, unscheduled)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_item(id: &str, date: Option<(i32, u32, u32)>, status: &str, position: i32) -> PlanItemRow {
        PlanItemRow {
            id: id.to_string(),
            plan_id: "plan-1".to_string(),
            title: format!("Item {id}"),
            format: "reels".to_string(),
            central_message: String::new(),
            caption: String::new(),
            cta: String::new(),
            scheduled_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            status: status.to_string(),
            position,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_items_by_day_sorts_days_and_positions() {
        let items = vec![
            make_item("c", Some((2026, 7, 20)), "suggested", 2),
            make_item("b", Some((2026, 7, 5)), "approved", 1),
            make_item("a", Some((2026, 7, 5)), "approved", 0),
        ];
        let (days, unscheduled) = group_items_by_day(items);

        assert!(unscheduled.is_empty());
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 7, 5).unwrap());
        assert_eq!(days[0].items[0].id, "a");
        assert_eq!(days[0].items[1].id, "b");
        assert_eq!(days[1].items[0].id, "c");
    }

    #[test]
    fn test_group_items_by_day_separates_unscheduled() {
        let items = vec![
            make_item("a", None, "suggested", 0),
            make_item("b", Some((2026, 7, 1)), "suggested", 1),
        ];
        let (days, unscheduled) = group_items_by_day(items);
        assert_eq!(days.len(), 1);
        assert_eq!(unscheduled.len(), 1);
        assert_eq!(unscheduled[0].id, "a");
    }

    #[test]
    fn test_group_items_by_day_drops_discarded() {
        let items = vec![
            make_item("a", Some((2026, 7, 1)), "discarded", 0),
            make_item("b", None, "discarded", 1),
        ];
        let (days, unscheduled) = group_items_by_day(items);
        assert!(days.is_empty());
        assert!(unscheduled.is_empty());
    }

    #[test]
    fn test_update_request_accepts_camel_case_and_defaults_clear_flag() {
        let json = serde_json::json!({
            "title": "Novo título",
            "scheduledDate": "2026-07-09"
        });
        let request: UpdateItemRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.title.as_deref(), Some("Novo título"));
        assert_eq!(
            request.scheduled_date,
            NaiveDate::from_ymd_opt(2026, 7, 9)
        );
        assert!(!request.clear_scheduled_date);
    }

    #[test]
    fn test_update_request_parses_clear_flag() {
        let json = serde_json::json!({ "clearScheduledDate": true });
        let request: UpdateItemRequest = serde_json::from_value(json).unwrap();
        assert!(request.clear_scheduled_date);
    }

    #[test]
    fn test_status_request_rejects_unknown_status() {
        let json = serde_json::json!({ "status": "archived" });
        let result: Result<UpdateStatusRequest, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }
}

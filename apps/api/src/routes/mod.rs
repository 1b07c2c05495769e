pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::awareness::handlers as awareness;
use crate::planning::handlers as planning;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Plans
        .route(
            "/api/v1/plans",
            post(planning::handle_create_plan).get(planning::handle_list_plans),
        )
        .route(
            "/api/v1/plans/distribute",
            post(planning::handle_distribute_preview),
        )
        .route("/api/v1/plans/:id", get(planning::handle_get_plan))
        .route(
            "/api/v1/plans/:id/calendar",
            get(planning::handle_plan_calendar),
        )
        // Plan items
        .route(
            "/api/v1/items/:id",
            patch(planning::handle_update_item).delete(planning::handle_delete_item),
        )
        .route(
            "/api/v1/items/:id/status",
            post(planning::handle_item_status),
        )
        // Awareness calendar
        .route("/api/v1/awareness", get(awareness::handle_list_awareness))
        .route(
            "/api/v1/awareness/sync",
            post(awareness::handle_awareness_sync),
        )
        .with_state(state)
}

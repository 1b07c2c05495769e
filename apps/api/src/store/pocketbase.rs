//! PocketBase backend. Talks to `/api/collections/{collection}/records` with
//! a superuser token in the `Authorization` header.
//!
//! Collections are addressed by fixed names (`plans`, `plan_items`,
//! `awareness_events`); `goals` and `formats` are PocketBase json fields and
//! come back as structured values, not strings.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::config::PocketBaseConfig;
use crate::models::awareness::{AwarenessEventRow, NewAwarenessEvent};
use crate::models::plan::{ItemStatus, NewPlan, NewPlanItem, PlanItemRow, PlanItemUpdate, PlanRow};
use crate::store::{parse_flexible_timestamp, parse_optional_date, PlanStore, StoreError};

const PLANS_COLLECTION: &str = "plans";
const ITEMS_COLLECTION: &str = "plan_items";
const EVENTS_COLLECTION: &str = "awareness_events";

pub struct PocketBaseStore {
    client: Client,
    base_url: String,
    token: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PbListResponse<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct PbPlanRecord {
    id: String,
    specialization: String,
    month: String,
    goals: Option<Value>,
    target_total: i32,
    formats: Option<Value>,
    notes: Option<String>,
    generator: String,
    created: String,
}

#[derive(Debug, Deserialize)]
struct PbItemRecord {
    id: String,
    plan_id: String,
    title: String,
    format: String,
    central_message: Option<String>,
    caption: Option<String>,
    cta: Option<String>,
    scheduled_date: Option<String>,
    status: String,
    position: i32,
    created: String,
    updated: String,
}

#[derive(Debug, Deserialize)]
struct PbEventRecord {
    id: String,
    month: i32,
    day: Option<i32>,
    title: String,
    theme: Option<String>,
    created: String,
}

fn map_plan(record: PbPlanRecord) -> Result<PlanRow, StoreError> {
    let goals: Vec<String> = match record.goals {
        Some(Value::Null) | None => Vec::new(),
        Some(value) => serde_json::from_value(value)?,
    };
    let created_at = parse_flexible_timestamp(&record.created).ok_or_else(|| {
        StoreError::Serialization(format!("Unreadable created timestamp: {}", record.created))
    })?;
    Ok(PlanRow {
        id: record.id,
        specialization: record.specialization,
        month: record.month,
        goals,
        target_total: record.target_total,
        formats: record.formats.unwrap_or(Value::Null),
        notes: record.notes,
        generator: record.generator,
        created_at,
    })
}

fn map_item(record: PbItemRecord) -> Result<PlanItemRow, StoreError> {
    let created_at = parse_flexible_timestamp(&record.created).ok_or_else(|| {
        StoreError::Serialization(format!("Unreadable created timestamp: {}", record.created))
    })?;
    let updated_at = parse_flexible_timestamp(&record.updated).unwrap_or(created_at);
    Ok(PlanItemRow {
        id: record.id,
        plan_id: record.plan_id,
        title: record.title,
        format: record.format,
        central_message: record.central_message.unwrap_or_default(),
        caption: record.caption.unwrap_or_default(),
        cta: record.cta.unwrap_or_default(),
        scheduled_date: parse_optional_date(record.scheduled_date.as_deref()),
        status: record.status,
        position: record.position,
        created_at,
        updated_at,
    })
}

fn map_event(record: PbEventRecord) -> Result<AwarenessEventRow, StoreError> {
    let created_at = parse_flexible_timestamp(&record.created).ok_or_else(|| {
        StoreError::Serialization(format!("Unreadable created timestamp: {}", record.created))
    })?;
    Ok(AwarenessEventRow {
        id: record.id,
        month: record.month,
        day: record.day,
        title: record.title,
        theme: record.theme,
        created_at,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Store implementation
// ────────────────────────────────────────────────────────────────────────────

impl PocketBaseStore {
    pub fn new(config: PocketBaseConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        }
    }

    fn records_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{}/records", self.base_url, collection)
    }

    fn record_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/api/collections/{}/records/{}",
            self.base_url, collection, id
        )
    }

    async fn expect_success(
        &self,
        response: reqwest::Response,
        not_found: Option<String>,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.as_u16() == 404 {
            if let Some(msg) = not_found {
                return Err(StoreError::NotFound(msg));
            }
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Backend(format!("PocketBase {status}: {body}")))
    }

    async fn create_item(
        &self,
        plan_id: &str,
        item: &NewPlanItem,
    ) -> Result<PlanItemRow, StoreError> {
        let body = json!({
            "plan_id": plan_id,
            "title": item.title,
            "format": item.format.as_str(),
            "central_message": item.central_message,
            "caption": item.caption,
            "cta": item.cta,
            "scheduled_date": item.scheduled_date.map(|d| d.to_string()),
            "status": "suggested",
            "position": item.position,
        });
        let response = self
            .client
            .post(self.records_url(ITEMS_COLLECTION))
            .header("Authorization", &self.token)
            .json(&body)
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;
        map_item(response.json::<PbItemRecord>().await?)
    }
}

#[async_trait]
impl PlanStore for PocketBaseStore {
    async fn create_plan(&self, plan: NewPlan) -> Result<PlanRow, StoreError> {
        let body = json!({
            "specialization": plan.specialization,
            "month": plan.month,
            "goals": plan.goals,
            "target_total": plan.target_total,
            "formats": plan.formats,
            "notes": plan.notes,
            "generator": plan.generator,
        });
        let response = self
            .client
            .post(self.records_url(PLANS_COLLECTION))
            .header("Authorization", &self.token)
            .json(&body)
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;
        map_plan(response.json::<PbPlanRecord>().await?)
    }

    async fn list_plans(&self) -> Result<Vec<PlanRow>, StoreError> {
        let response = self
            .client
            .get(self.records_url(PLANS_COLLECTION))
            .header("Authorization", &self.token)
            .query(&[("sort", "-created"), ("perPage", "200")])
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;
        let listing: PbListResponse<PbPlanRecord> = response.json().await?;
        listing.items.into_iter().map(map_plan).collect()
    }

    async fn get_plan(&self, id: &str) -> Result<PlanRow, StoreError> {
        let response = self
            .client
            .get(self.record_url(PLANS_COLLECTION, id))
            .header("Authorization", &self.token)
            .send()
            .await?;
        let response = self
            .expect_success(response, Some(format!("Plan {id} not found")))
            .await?;
        map_plan(response.json::<PbPlanRecord>().await?)
    }

    async fn insert_items(
        &self,
        plan_id: &str,
        items: Vec<NewPlanItem>,
    ) -> Result<Vec<PlanItemRow>, StoreError> {
        // PocketBase has no bulk insert; create records one by one.
        let mut rows = Vec::with_capacity(items.len());
        for item in &items {
            rows.push(self.create_item(plan_id, item).await?);
        }
        Ok(rows)
    }

    async fn list_items(&self, plan_id: &str) -> Result<Vec<PlanItemRow>, StoreError> {
        let response = self
            .client
            .get(self.records_url(ITEMS_COLLECTION))
            .header("Authorization", &self.token)
            .query(&[
                ("filter", format!("(plan_id='{plan_id}')")),
                ("sort", "position".to_string()),
                ("perPage", "500".to_string()),
            ])
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;
        let listing: PbListResponse<PbItemRecord> = response.json().await?;
        listing.items.into_iter().map(map_item).collect()
    }

    async fn get_item(&self, id: &str) -> Result<PlanItemRow, StoreError> {
        let response = self
            .client
            .get(self.record_url(ITEMS_COLLECTION, id))
            .header("Authorization", &self.token)
            .send()
            .await?;
        let response = self
            .expect_success(response, Some(format!("Plan item {id} not found")))
            .await?;
        map_item(response.json::<PbItemRecord>().await?)
    }

    async fn update_item(
        &self,
        id: &str,
        update: PlanItemUpdate,
    ) -> Result<PlanItemRow, StoreError> {
        let mut fields = Map::new();
        if let Some(title) = update.title {
            fields.insert("title".to_string(), json!(title));
        }
        if let Some(format) = update.format {
            fields.insert("format".to_string(), json!(format.as_str()));
        }
        if let Some(message) = update.central_message {
            fields.insert("central_message".to_string(), json!(message));
        }
        if let Some(caption) = update.caption {
            fields.insert("caption".to_string(), json!(caption));
        }
        if let Some(cta) = update.cta {
            fields.insert("cta".to_string(), json!(cta));
        }
        if update.clear_scheduled_date {
            fields.insert("scheduled_date".to_string(), Value::Null);
        } else if let Some(date) = update.scheduled_date {
            fields.insert("scheduled_date".to_string(), json!(date.to_string()));
        }

        if fields.is_empty() {
            return self.get_item(id).await;
        }

        let response = self
            .client
            .patch(self.record_url(ITEMS_COLLECTION, id))
            .header("Authorization", &self.token)
            .json(&Value::Object(fields))
            .send()
            .await?;
        let response = self
            .expect_success(response, Some(format!("Plan item {id} not found")))
            .await?;
        map_item(response.json::<PbItemRecord>().await?)
    }

    async fn set_item_status(
        &self,
        id: &str,
        status: ItemStatus,
    ) -> Result<PlanItemRow, StoreError> {
        let response = self
            .client
            .patch(self.record_url(ITEMS_COLLECTION, id))
            .header("Authorization", &self.token)
            .json(&json!({ "status": status.as_str() }))
            .send()
            .await?;
        let response = self
            .expect_success(response, Some(format!("Plan item {id} not found")))
            .await?;
        map_item(response.json::<PbItemRecord>().await?)
    }

    async fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.record_url(ITEMS_COLLECTION, id))
            .header("Authorization", &self.token)
            .send()
            .await?;
        self.expect_success(response, Some(format!("Plan item {id} not found")))
            .await?;
        Ok(())
    }

    async fn replace_awareness_events(
        &self,
        events: Vec<NewAwarenessEvent>,
    ) -> Result<u64, StoreError> {
        // No transactions over REST: list everything, delete, then recreate.
        let response = self
            .client
            .get(self.records_url(EVENTS_COLLECTION))
            .header("Authorization", &self.token)
            .query(&[("fields", "id"), ("perPage", "500")])
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;

        #[derive(Deserialize)]
        struct PbId {
            id: String,
        }
        let existing: PbListResponse<PbId> = response.json().await?;

        for record in &existing.items {
            let response = self
                .client
                .delete(self.record_url(EVENTS_COLLECTION, &record.id))
                .header("Authorization", &self.token)
                .send()
                .await?;
            self.expect_success(response, None).await?;
        }

        let mut stored = 0u64;
        for event in &events {
            let body = json!({
                "month": event.month,
                "day": event.day,
                "title": event.title,
                "theme": event.theme,
            });
            let response = self
                .client
                .post(self.records_url(EVENTS_COLLECTION))
                .header("Authorization", &self.token)
                .json(&body)
                .send()
                .await?;
            self.expect_success(response, None).await?;
            stored += 1;
        }

        info!("Replaced awareness calendar with {stored} events");
        Ok(stored)
    }

    async fn list_awareness_events(
        &self,
        month: Option<u32>,
    ) -> Result<Vec<AwarenessEventRow>, StoreError> {
        let mut query: Vec<(String, String)> = vec![
            ("sort".to_string(), "month,day".to_string()),
            ("perPage".to_string(), "500".to_string()),
        ];
        if let Some(m) = month {
            query.push(("filter".to_string(), format!("(month={m})")));
        }

        let response = self
            .client
            .get(self.records_url(EVENTS_COLLECTION))
            .header("Authorization", &self.token)
            .query(&query)
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;
        let listing: PbListResponse<PbEventRecord> = response.json().await?;
        listing.items.into_iter().map(map_event).collect()
    }
}

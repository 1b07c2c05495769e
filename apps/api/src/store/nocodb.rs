//! NocoDB backend. Talks to the v2 REST API (`/api/v2/tables/{table}/records`)
//! with an `xc-token` header.
//!
//! Contract with the NocoDB base: tables use the same snake_case column
//! names as the Postgres schema; `goals` and `formats` are LongText columns
//! holding JSON, parsed here on the way in and out.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::config::NocoConfig;
use crate::models::awareness::{AwarenessEventRow, NewAwarenessEvent};
use crate::models::plan::{ItemStatus, NewPlan, NewPlanItem, PlanItemRow, PlanItemUpdate, PlanRow};
use crate::store::{parse_flexible_timestamp, parse_optional_date, PlanStore, StoreError};

pub struct NocoStore {
    client: Client,
    base_url: String,
    token: String,
    plans_table: String,
    items_table: String,
    events_table: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct NocoListResponse<T> {
    list: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct NocoId {
    #[serde(rename = "Id")]
    id: i64,
}

#[derive(Debug, Deserialize)]
struct NocoPlanRecord {
    #[serde(rename = "Id")]
    id: i64,
    specialization: String,
    month: String,
    goals: Option<String>,
    target_total: i32,
    formats: Option<String>,
    notes: Option<String>,
    generator: String,
    #[serde(rename = "CreatedAt")]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NocoItemRecord {
    #[serde(rename = "Id")]
    id: i64,
    plan_id: String,
    title: String,
    format: String,
    central_message: Option<String>,
    caption: Option<String>,
    cta: Option<String>,
    scheduled_date: Option<String>,
    status: String,
    position: i32,
    #[serde(rename = "CreatedAt")]
    created_at: Option<String>,
    #[serde(rename = "UpdatedAt")]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NocoEventRecord {
    #[serde(rename = "Id")]
    id: i64,
    month: i32,
    day: Option<i32>,
    title: String,
    theme: Option<String>,
    #[serde(rename = "CreatedAt")]
    created_at: Option<String>,
}

fn map_plan(record: NocoPlanRecord) -> Result<PlanRow, StoreError> {
    let goals: Vec<String> = match record.goals.as_deref() {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw)?,
        _ => Vec::new(),
    };
    let formats: Value = match record.formats.as_deref() {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw)?,
        _ => Value::Null,
    };
    Ok(PlanRow {
        id: record.id.to_string(),
        specialization: record.specialization,
        month: record.month,
        goals,
        target_total: record.target_total,
        formats,
        notes: record.notes,
        generator: record.generator,
        created_at: record
            .created_at
            .as_deref()
            .and_then(parse_flexible_timestamp)
            .unwrap_or_else(Utc::now),
    })
}

fn map_item(record: NocoItemRecord) -> PlanItemRow {
    PlanItemRow {
        id: record.id.to_string(),
        plan_id: record.plan_id,
        title: record.title,
        format: record.format,
        central_message: record.central_message.unwrap_or_default(),
        caption: record.caption.unwrap_or_default(),
        cta: record.cta.unwrap_or_default(),
        scheduled_date: parse_optional_date(record.scheduled_date.as_deref()),
        status: record.status,
        position: record.position,
        created_at: record
            .created_at
            .as_deref()
            .and_then(parse_flexible_timestamp)
            .unwrap_or_else(Utc::now),
        updated_at: record
            .updated_at
            .as_deref()
            .and_then(parse_flexible_timestamp)
            .unwrap_or_else(Utc::now),
    }
}

fn map_event(record: NocoEventRecord) -> AwarenessEventRow {
    AwarenessEventRow {
        id: record.id.to_string(),
        month: record.month,
        day: record.day,
        title: record.title,
        theme: record.theme,
        created_at: record
            .created_at
            .as_deref()
            .and_then(parse_flexible_timestamp)
            .unwrap_or_else(Utc::now),
    }
}

/// Parses a record id that must be a NocoDB numeric id. A non-numeric id
/// cannot exist in the base, so the lookup is reported as a miss.
fn numeric_id(id: &str, what: &str) -> Result<i64, StoreError> {
    id.parse::<i64>()
        .map_err(|_| StoreError::NotFound(format!("{what} {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Store implementation
// ────────────────────────────────────────────────────────────────────────────

impl NocoStore {
    pub fn new(config: NocoConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
            plans_table: config.plans_table,
            items_table: config.items_table,
            events_table: config.events_table,
        }
    }

    fn records_url(&self, table: &str) -> String {
        format!("{}/api/v2/tables/{}/records", self.base_url, table)
    }

    fn record_url(&self, table: &str, id: i64) -> String {
        format!("{}/api/v2/tables/{}/records/{}", self.base_url, table, id)
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
        Err(StoreError::Backend(format!("NocoDB {status}: {body}")))
    }

    async fn fetch_item(&self, id: i64) -> Result<PlanItemRow, StoreError> {
        let response = self
            .client
            .get(self.record_url(&self.items_table, id))
            .header("xc-token", &self.token)
            .send()
            .await?;
        let response = self
            .expect_success(response, Some(format!("Plan item {id} not found")))
            .await?;
        Ok(map_item(response.json::<NocoItemRecord>().await?))
    }

    /// NocoDB PATCH/DELETE take the record id inside the body, not the path.
    async fn patch_item(&self, id: i64, mut fields: Map<String, Value>) -> Result<(), StoreError> {
        fields.insert("Id".to_string(), json!(id));
        let response = self
            .client
            .patch(self.records_url(&self.items_table))
            .header("xc-token", &self.token)
            .json(&Value::Object(fields))
            .send()
            .await?;
        self.expect_success(response, Some(format!("Plan item {id} not found")))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PlanStore for NocoStore {
    async fn create_plan(&self, plan: NewPlan) -> Result<PlanRow, StoreError> {
        let body = json!({
            "specialization": plan.specialization,
            "month": plan.month,
            "goals": serde_json::to_string(&plan.goals)?,
            "target_total": plan.target_total,
            "formats": plan.formats.to_string(),
            "notes": plan.notes,
            "generator": plan.generator,
        });

        let response = self
            .client
            .post(self.records_url(&self.plans_table))
            .header("xc-token", &self.token)
            .json(&body)
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;
        let created: NocoId = response.json().await?;

        Ok(PlanRow {
            id: created.id.to_string(),
            specialization: plan.specialization,
            month: plan.month,
            goals: plan.goals,
            target_total: plan.target_total,
            formats: plan.formats,
            notes: plan.notes,
            generator: plan.generator,
            created_at: Utc::now(),
        })
    }

    async fn list_plans(&self) -> Result<Vec<PlanRow>, StoreError> {
        let response = self
            .client
            .get(self.records_url(&self.plans_table))
            .header("xc-token", &self.token)
            .query(&[("sort", "-CreatedAt"), ("limit", "200")])
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;
        let listing: NocoListResponse<NocoPlanRecord> = response.json().await?;
        listing.list.into_iter().map(map_plan).collect()
    }

    async fn get_plan(&self, id: &str) -> Result<PlanRow, StoreError> {
        let record_id = numeric_id(id, "Plan")?;
        let response = self
            .client
            .get(self.record_url(&self.plans_table, record_id))
            .header("xc-token", &self.token)
            .send()
            .await?;
        let response = self
            .expect_success(response, Some(format!("Plan {id} not found")))
            .await?;
        map_plan(response.json::<NocoPlanRecord>().await?)
    }

    async fn insert_items(
        &self,
        plan_id: &str,
        items: Vec<NewPlanItem>,
    ) -> Result<Vec<PlanItemRow>, StoreError> {
        let body: Vec<Value> = items
            .iter()
            .map(|item| {
                json!({
                    "plan_id": plan_id,
                    "title": item.title,
                    "format": item.format.as_str(),
                    "central_message": item.central_message,
                    "caption": item.caption,
                    "cta": item.cta,
                    "scheduled_date": item.scheduled_date.map(|d| d.to_string()),
                    "status": "suggested",
                    "position": item.position,
                })
            })
            .collect();

        let response = self
            .client
            .post(self.records_url(&self.items_table))
            .header("xc-token", &self.token)
            .json(&body)
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;
        let created: Vec<NocoId> = response.json().await?;

        if created.len() != items.len() {
            return Err(StoreError::Backend(format!(
                "NocoDB created {} of {} items",
                created.len(),
                items.len()
            )));
        }

        let now = Utc::now();
        Ok(items
            .into_iter()
            .zip(created)
            .map(|(item, id)| PlanItemRow {
                id: id.id.to_string(),
                plan_id: plan_id.to_string(),
                title: item.title,
                format: item.format.as_str().to_string(),
                central_message: item.central_message,
                caption: item.caption,
                cta: item.cta,
                scheduled_date: item.scheduled_date,
                status: "suggested".to_string(),
                position: item.position,
                created_at: now,
                updated_at: now,
            })
            .collect())
    }

    async fn list_items(&self, plan_id: &str) -> Result<Vec<PlanItemRow>, StoreError> {
        let response = self
            .client
            .get(self.records_url(&self.items_table))
            .header("xc-token", &self.token)
            .query(&[
                ("where", format!("(plan_id,eq,{plan_id})")),
                ("sort", "position".to_string()),
                ("limit", "1000".to_string()),
            ])
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;
        let listing: NocoListResponse<NocoItemRecord> = response.json().await?;
        Ok(listing.list.into_iter().map(map_item).collect())
    }

    async fn get_item(&self, id: &str) -> Result<PlanItemRow, StoreError> {
        let record_id = numeric_id(id, "Plan item")?;
        self.fetch_item(record_id).await
    }

    async fn update_item(
        &self,
        id: &str,
        update: PlanItemUpdate,
    ) -> Result<PlanItemRow, StoreError> {
        let record_id = numeric_id(id, "Plan item")?;

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

        if !fields.is_empty() {
            self.patch_item(record_id, fields).await?;
        }
        self.fetch_item(record_id).await
    }

    async fn set_item_status(
        &self,
        id: &str,
        status: ItemStatus,
    ) -> Result<PlanItemRow, StoreError> {
        let record_id = numeric_id(id, "Plan item")?;
        let mut fields = Map::new();
        fields.insert("status".to_string(), json!(status.as_str()));
        self.patch_item(record_id, fields).await?;
        self.fetch_item(record_id).await
    }

    async fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        let record_id = numeric_id(id, "Plan item")?;
        let response = self
            .client
            .delete(self.records_url(&self.items_table))
            .header("xc-token", &self.token)
            .json(&json!({ "Id": record_id }))
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
        // No transactions over REST: list everything, bulk-delete, bulk-insert.
        let response = self
            .client
            .get(self.records_url(&self.events_table))
            .header("xc-token", &self.token)
            .query(&[("fields", "Id"), ("limit", "1000")])
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;
        let existing: NocoListResponse<NocoId> = response.json().await?;

        if !existing.list.is_empty() {
            let ids: Vec<Value> = existing
                .list
                .iter()
                .map(|record| json!({ "Id": record.id }))
                .collect();
            let response = self
                .client
                .delete(self.records_url(&self.events_table))
                .header("xc-token", &self.token)
                .json(&ids)
                .send()
                .await?;
            self.expect_success(response, None).await?;
        }

        if events.is_empty() {
            return Ok(0);
        }

        let body: Vec<Value> = events
            .iter()
            .map(|event| {
                json!({
                    "month": event.month,
                    "day": event.day,
                    "title": event.title,
                    "theme": event.theme,
                })
            })
            .collect();
        let response = self
            .client
            .post(self.records_url(&self.events_table))
            .header("xc-token", &self.token)
            .json(&body)
            .send()
            .await?;
        self.expect_success(response, None).await?;

        info!("Replaced awareness calendar with {} events", events.len());
        Ok(events.len() as u64)
    }

    async fn list_awareness_events(
        &self,
        month: Option<u32>,
    ) -> Result<Vec<AwarenessEventRow>, StoreError> {
        let mut query: Vec<(String, String)> = vec![
            ("sort".to_string(), "month,day".to_string()),
            ("limit".to_string(), "1000".to_string()),
        ];
        if let Some(m) = month {
            query.push(("where".to_string(), format!("(month,eq,{m})")));
        }

        let response = self
            .client
            .get(self.records_url(&self.events_table))
            .header("xc-token", &self.token)
            .query(&query)
            .send()
            .await?;
        let response = self.expect_success(response, None).await?;
        let listing: NocoListResponse<NocoEventRecord> = response.json().await?;
        Ok(listing.list.into_iter().map(map_event).collect())
    }
}

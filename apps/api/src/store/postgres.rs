//! Direct-Postgres backend. The default, and the only backend that talks to
//! the database without going through an HTTP gateway.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::awareness::{AwarenessEventRow, NewAwarenessEvent};
use crate::models::plan::{ItemStatus, NewPlan, NewPlanItem, PlanItemRow, PlanItemUpdate, PlanRow};
use crate::store::{PlanStore, StoreError};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects and returns a ready store. Expects the plans, plan_items and
    /// awareness_events tables to exist; schema is applied out of band.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }
}

#[async_trait]
impl PlanStore for PostgresStore {
    async fn create_plan(&self, plan: NewPlan) -> Result<PlanRow, StoreError> {
        let id = Uuid::new_v4().to_string();
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            INSERT INTO plans (id, specialization, month, goals, target_total, formats, notes, generator)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&plan.specialization)
        .bind(&plan.month)
        .bind(&plan.goals)
        .bind(plan.target_total)
        .bind(&plan.formats)
        .bind(&plan.notes)
        .bind(&plan.generator)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_plans(&self) -> Result<Vec<PlanRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, PlanRow>("SELECT * FROM plans ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_plan(&self, id: &str) -> Result<PlanRow, StoreError> {
        sqlx::query_as::<_, PlanRow>("SELECT * FROM plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Plan {id} not found")))
    }

    async fn insert_items(
        &self,
        plan_id: &str,
        items: Vec<NewPlanItem>,
    ) -> Result<Vec<PlanItemRow>, StoreError> {
        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let id = Uuid::new_v4().to_string();
            let row = sqlx::query_as::<_, PlanItemRow>(
                r#"
                INSERT INTO plan_items
                    (id, plan_id, title, format, central_message, caption, cta,
                     scheduled_date, status, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'suggested', $9)
                RETURNING *
                "#,
            )
            .bind(&id)
            .bind(plan_id)
            .bind(&item.title)
            .bind(item.format.as_str())
            .bind(&item.central_message)
            .bind(&item.caption)
            .bind(&item.cta)
            .bind(item.scheduled_date)
            .bind(item.position)
            .fetch_one(&self.pool)
            .await?;
            rows.push(row);
        }
        Ok(rows)
    }

    async fn list_items(&self, plan_id: &str) -> Result<Vec<PlanItemRow>, StoreError> {
        Ok(sqlx::query_as::<_, PlanItemRow>(
            "SELECT * FROM plan_items WHERE plan_id = $1 ORDER BY position, id",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_item(&self, id: &str) -> Result<PlanItemRow, StoreError> {
        sqlx::query_as::<_, PlanItemRow>("SELECT * FROM plan_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Plan item {id} not found")))
    }

    async fn update_item(
        &self,
        id: &str,
        update: PlanItemUpdate,
    ) -> Result<PlanItemRow, StoreError> {
        sqlx::query_as::<_, PlanItemRow>(
            r#"
            UPDATE plan_items
            SET title = COALESCE($2, title),
                format = COALESCE($3, format),
                central_message = COALESCE($4, central_message),
                caption = COALESCE($5, caption),
                cta = COALESCE($6, cta),
                scheduled_date = CASE WHEN $8 THEN NULL
                                      ELSE COALESCE($7, scheduled_date) END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(update.format.map(|f| f.as_str()))
        .bind(&update.central_message)
        .bind(&update.caption)
        .bind(&update.cta)
        .bind(update.scheduled_date)
        .bind(update.clear_scheduled_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Plan item {id} not found")))
    }

    async fn set_item_status(
        &self,
        id: &str,
        status: ItemStatus,
    ) -> Result<PlanItemRow, StoreError> {
        sqlx::query_as::<_, PlanItemRow>(
            "UPDATE plan_items SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Plan item {id} not found")))
    }

    async fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM plan_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Plan item {id} not found")));
        }
        Ok(())
    }

    async fn replace_awareness_events(
        &self,
        events: Vec<NewAwarenessEvent>,
    ) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM awareness_events")
            .execute(&mut *tx)
            .await?;

        let mut stored = 0u64;
        for event in &events {
            sqlx::query(
                r#"
                INSERT INTO awareness_events (id, month, day, title, theme)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(event.month)
            .bind(event.day)
            .bind(&event.title)
            .bind(&event.theme)
            .execute(&mut *tx)
            .await?;
            stored += 1;
        }

        tx.commit().await?;
        info!("Replaced awareness calendar with {stored} events");
        Ok(stored)
    }

    async fn list_awareness_events(
        &self,
        month: Option<u32>,
    ) -> Result<Vec<AwarenessEventRow>, StoreError> {
        let rows = match month {
            Some(m) => {
                sqlx::query_as::<_, AwarenessEventRow>(
                    "SELECT * FROM awareness_events WHERE month = $1 ORDER BY day NULLS FIRST, title",
                )
                .bind(m as i32)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AwarenessEventRow>(
                    "SELECT * FROM awareness_events ORDER BY month, day NULLS FIRST, title",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }
}

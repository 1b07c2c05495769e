//! Plan generation — orchestrates the full planning pipeline.
//!
//! Flow: validate request → resolve format mix (manual override or
//! goal-weighted auto distribution) → load awareness dates → generate drafts
//! (LLM or mock) → normalize → persist plan + items → return response.

use std::num::NonZeroU32;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::awareness::AwarenessEventRow;
use crate::models::plan::{NewPlan, NewPlanItem, PlanItemRow, PlanRow};
use crate::planning::distribution::{auto_distribute, total_publications};
use crate::planning::formats::{FormatCounts, FORMAT_ORDER};
use crate::planning::normalize::{days_in_month, normalize_items, parse_month};
use crate::planning::prompts::{PLAN_PROMPT_TEMPLATE, PLAN_SYSTEM};
use crate::planning::rules::ContentGoal;
use crate::store::PlanStore;

/// Max LLM retries when the model returns an empty plan.
const MAX_GENERATION_RETRIES: u32 = 2;

/// Plans are bounded to what a single professional can realistically produce;
/// the UI offers the same range.
pub const MIN_PLAN_TOTAL: i32 = 1;
pub const MAX_PLAN_TOTAL: i32 = 90;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A single draft post produced by a generator, before normalization.
///
/// Every field defaults so one malformed object degrades instead of sinking
/// the whole array; normalization drops drafts without a usable title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DraftItem {
    pub title: String,
    pub format: String,
    pub central_message: String,
    pub caption: String,
    pub cta: String,
    pub suggested_date: Option<String>,
}

/// Everything a generator needs to draft one month of content.
#[derive(Debug, Clone)]
pub struct PlanBrief {
    pub specialization: String,
    pub year: i32,
    pub month: u32,
    pub goals: Vec<ContentGoal>,
    pub mix: FormatCounts,
    pub notes: Option<String>,
    pub awareness: Vec<AwarenessEventRow>,
}

/// Request body for plan creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub specialization: String,
    /// Target month as "YYYY-MM".
    pub month: String,
    #[serde(default)]
    pub goals: Vec<ContentGoal>,
    /// Required unless `formats` is given; ignored when it is.
    pub target_total: Option<i32>,
    /// Manual per-format override. When present it wins over auto distribution.
    pub formats: Option<FormatCounts>,
    pub notes: Option<String>,
}

/// Response from the plan creation pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub plan: PlanRow,
    pub items: Vec<PlanItemRow>,
    pub formats: FormatCounts,
}

// ────────────────────────────────────────────────────────────────────────────
// Generator trait + implementations
// ────────────────────────────────────────────────────────────────────────────

/// Drafts a month of posts from a brief. Implemented by the LLM-backed
/// generator and a deterministic mock for offline development.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, brief: &PlanBrief) -> Result<Vec<DraftItem>, AppError>;

    /// Stable identifier persisted on the plan row ("llm", "mock").
    fn name(&self) -> &'static str;
}

/// LLM-backed generator.
pub struct LlmPlanGenerator {
    llm: LlmClient,
}

impl LlmPlanGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl PlanGenerator for LlmPlanGenerator {
    async fn generate(&self, brief: &PlanBrief) -> Result<Vec<DraftItem>, AppError> {
        let prompt = build_plan_prompt(brief);

        for attempt in 0..=MAX_GENERATION_RETRIES {
            let items: Vec<DraftItem> = self
                .llm
                .call_json(&prompt, PLAN_SYSTEM)
                .await
                .map_err(|e| AppError::Llm(format!("Plan generation LLM call failed: {e}")))?;

            if !items.is_empty() {
                return Ok(items);
            }

            warn!(
                "Generation attempt {}/{}: LLM returned an empty plan — retrying",
                attempt + 1,
                MAX_GENERATION_RETRIES + 1
            );
        }

        Err(AppError::Llm(format!(
            "Plan generation failed after {} attempts: the model kept returning an empty array",
            MAX_GENERATION_RETRIES + 1
        )))
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// Deterministic generator for development and tests. Emits exactly the
/// requested mix with placeholder copy and dates spread across the month.
pub struct MockPlanGenerator;

#[async_trait]
impl PlanGenerator for MockPlanGenerator {
    async fn generate(&self, brief: &PlanBrief) -> Result<Vec<DraftItem>, AppError> {
        let total = total_publications(&brief.mix).max(1);
        let days = days_in_month(brief.year, brief.month);
        let mut items = Vec::new();

        for format in FORMAT_ORDER {
            let count = brief.mix.get(format).max(0);
            for slot in 0..count {
                let position = items.len() as i64;
                let day = (position as u32 * days) / total as u32 + 1;
                items.push(DraftItem {
                    title: format!(
                        "{} #{} para {}",
                        format.label(),
                        slot + 1,
                        brief.specialization
                    ),
                    format: format.as_str().to_string(),
                    central_message: format!(
                        "Conteúdo educativo de {} em formato {}",
                        brief.specialization,
                        format.label()
                    ),
                    caption: format!(
                        "Post planejado para {} com foco em {}.",
                        brief.specialization,
                        format.label()
                    ),
                    cta: "Agende sua consulta.".to_string(),
                    suggested_date: Some(format!(
                        "{:04}-{:02}-{:02}",
                        brief.year, brief.month, day
                    )),
                });
            }
        }

        Ok(items)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Plan creation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full plan creation pipeline and persists the result.
///
/// Steps:
/// 1. Validate specialization, month and totals
/// 2. Resolve the format mix — manual override or goal-weighted distribution
/// 3. Load awareness dates for the month (best effort)
/// 4. Generate drafts, normalize them into the target month and mix
/// 5. Persist the plan row and its items, position-ordered
pub async fn create_plan(
    store: &dyn PlanStore,
    generator: &dyn PlanGenerator,
    request: CreatePlanRequest,
) -> Result<PlanResponse, AppError> {
    let specialization = request.specialization.trim().to_string();
    if specialization.is_empty() {
        return Err(AppError::Validation(
            "specialization must not be empty".to_string(),
        ));
    }

    let month_key = request.month.trim().to_string();
    let (year, month) = parse_month(&month_key).ok_or_else(|| {
        AppError::Validation("month must be in YYYY-MM format, e.g. 2026-07".to_string())
    })?;

    // Duplicate goals would double their weight in the blend.
    let mut goals: Vec<ContentGoal> = Vec::new();
    for goal in request.goals {
        if !goals.contains(&goal) {
            goals.push(goal);
        }
    }

    let (mix, total) = match request.formats {
        Some(manual) => {
            let mix = manual.clamped_non_negative();
            let total = total_publications(&mix);
            if !(MIN_PLAN_TOTAL as i64..=MAX_PLAN_TOTAL as i64).contains(&total) {
                return Err(AppError::Validation(format!(
                    "formats must total between {MIN_PLAN_TOTAL} and {MAX_PLAN_TOTAL} posts, got {total}"
                )));
            }
            (mix, total as i32)
        }
        None => {
            let total = request.target_total.ok_or_else(|| {
                AppError::Validation(
                    "targetTotal is required when no explicit formats are given".to_string(),
                )
            })?;
            if !(MIN_PLAN_TOTAL..=MAX_PLAN_TOTAL).contains(&total) {
                return Err(AppError::Validation(format!(
                    "targetTotal must be between {MIN_PLAN_TOTAL} and {MAX_PLAN_TOTAL}, got {total}"
                )));
            }
            let target = NonZeroU32::new(total as u32).ok_or_else(|| {
                AppError::Validation("targetTotal must be at least 1".to_string())
            })?;
            (auto_distribute(&goals, target), total)
        }
    };

    // Awareness dates enrich the brief but never block plan creation.
    let awareness = match store.list_awareness_events(Some(month)).await {
        Ok(events) => events,
        Err(e) => {
            warn!("Could not load awareness dates for month {month}: {e}");
            Vec::new()
        }
    };

    info!(
        "Generating {total}-post plan for '{specialization}' ({month_key}), goals={:?}",
        goals
    );

    let brief = PlanBrief {
        specialization: specialization.clone(),
        year,
        month,
        goals: goals.clone(),
        mix,
        notes: request.notes.clone(),
        awareness,
    };

    let drafts = generator.generate(&brief).await?;
    let normalized = normalize_items(drafts, year, month, &mix);

    if normalized.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Generation produced no usable items after normalization".to_string(),
        ));
    }

    let formats_value = serde_json::to_value(mix)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize format mix: {e}")))?;

    let plan = store
        .create_plan(NewPlan {
            specialization,
            month: month_key,
            goals: goals.iter().map(|g| g.as_str().to_string()).collect(),
            target_total: total,
            formats: formats_value,
            notes: request.notes,
            generator: generator.name().to_string(),
        })
        .await?;

    let new_items = normalized
        .into_iter()
        .enumerate()
        .map(|(position, item)| NewPlanItem {
            title: item.title,
            format: item.format,
            central_message: item.central_message,
            caption: item.caption,
            cta: item.cta,
            scheduled_date: item.scheduled_date,
            position: position as i32,
        })
        .collect();

    let items = store.insert_items(&plan.id, new_items).await?;

    info!(
        "Created plan {} with {} items via {} generator",
        plan.id,
        items.len(),
        generator.name()
    );

    Ok(PlanResponse {
        plan,
        items,
        formats: mix,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt assembly
// ────────────────────────────────────────────────────────────────────────────

/// Builds the generation prompt by filling the template with the brief.
fn build_plan_prompt(brief: &PlanBrief) -> String {
    let mix_lines = FORMAT_ORDER
        .into_iter()
        .filter(|format| brief.mix.get(*format) > 0)
        .map(|format| {
            format!(
                "- {}: {} ({})",
                format.as_str(),
                brief.mix.get(format),
                format.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let goals = if brief.goals.is_empty() {
        "balanced editorial mix (no single strategic goal)".to_string()
    } else {
        brief
            .goals
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let awareness_block = if brief.awareness.is_empty() {
        String::new()
    } else {
        let lines = brief
            .awareness
            .iter()
            .map(|event| {
                let theme = event
                    .theme
                    .as_deref()
                    .map(|t| format!(" ({t})"))
                    .unwrap_or_default();
                match event.day {
                    Some(day) => format!("- day {}: {}{}", day, event.title, theme),
                    None => format!("- all month: {}{}", event.title, theme),
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "\nCOMMEMORATIVE HEALTH DATES in {} {}:\n{}\n",
            month_name(brief.month),
            brief.year,
            lines
        )
    };

    let notes_block = match brief.notes.as_deref().map(str::trim) {
        Some(notes) if !notes.is_empty() => {
            format!("\nADDITIONAL BRIEF FROM THE PROFESSIONAL:\n{notes}\n")
        }
        _ => String::new(),
    };

    PLAN_PROMPT_TEMPLATE
        .replace("{specialization}", &brief.specialization)
        .replace("{month_name}", month_name(brief.month))
        .replace("{year}", &brief.year.to_string())
        .replace(
            "{target_total}",
            &total_publications(&brief.mix).to_string(),
        )
        .replace("{mix_lines}", &mix_lines)
        .replace("{goals}", &goals)
        .replace("{awareness_block}", &awareness_block)
        .replace("{notes_block}", &notes_block)
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

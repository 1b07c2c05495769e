//! Validation of LLM-extracted calendar events.

use serde::Deserialize;
use tracing::warn;

use crate::awareness::prompts::{AWARENESS_PROMPT_TEMPLATE, AWARENESS_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::awareness::NewAwarenessEvent;

/// An event as the extraction LLM reports it, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub month: i32,
    #[serde(default)]
    pub day: Option<i32>,
    pub title: String,
    #[serde(default)]
    pub theme: Option<String>,
}

/// Structures calendar page text into validated events via the LLM.
pub async fn normalize_calendar_text(
    llm: &LlmClient,
    text: &str,
) -> Result<Vec<NewAwarenessEvent>, AppError> {
    let prompt = AWARENESS_PROMPT_TEMPLATE.replace("{calendar_text}", text);

    let raw: Vec<RawEvent> = llm
        .call_json(&prompt, AWARENESS_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Calendar extraction LLM call failed: {e}")))?;

    let events = validate_events(raw);
    if events.is_empty() {
        return Err(AppError::Llm(
            "Calendar extraction produced no valid events".to_string(),
        ));
    }

    Ok(events)
}

/// Drops events with an impossible month or an empty title; a day outside
/// 1-31 is nulled rather than dropping the whole event.
pub fn validate_events(raw: Vec<RawEvent>) -> Vec<NewAwarenessEvent> {
    let mut events = Vec::new();

    for event in raw {
        if !(1..=12).contains(&event.month) {
            warn!(
                "Dropping extracted event '{}' with month {}",
                event.title, event.month
            );
            continue;
        }

        let title = event.title.trim().to_string();
        if title.is_empty() {
            warn!("Dropping extracted event with an empty title");
            continue;
        }

        let day = match event.day {
            Some(day) if (1..=31).contains(&day) => Some(day),
            Some(day) => {
                warn!("Event '{title}' has day {day}, treating as month-wide");
                None
            }
            None => None,
        };

        let theme = event
            .theme
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        events.push(NewAwarenessEvent {
            month: event.month,
            day,
            title,
            theme,
        });
    }

    events
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_raw(month: i32, day: Option<i32>, title: &str) -> RawEvent {
        RawEvent {
            month,
            day,
            title: title.to_string(),
            theme: None,
        }
    }

    #[test]
    fn test_validate_keeps_well_formed_events() {
        let events = validate_events(vec![
            make_raw(7, Some(28), "Dia Mundial de Combate às Hepatites"),
            make_raw(10, None, "Outubro Rosa"),
        ]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].day, Some(28));
        assert_eq!(events[1].day, None);
    }

    #[test]
    fn test_validate_drops_impossible_months() {
        let events = validate_events(vec![
            make_raw(0, None, "A"),
            make_raw(13, None, "B"),
            make_raw(12, None, "Dezembro Vermelho"),
        ]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Dezembro Vermelho");
    }

    #[test]
    fn test_validate_drops_empty_titles() {
        let events = validate_events(vec![make_raw(5, None, "   ")]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_validate_nulls_out_of_range_days() {
        let events = validate_events(vec![
            make_raw(2, Some(0), "A"),
            make_raw(2, Some(32), "B"),
        ]);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.day.is_none()));
    }

    #[test]
    fn test_validate_trims_blank_themes_to_none() {
        let mut raw = make_raw(3, None, "Março Azul");
        raw.theme = Some("  ".to_string());
        let events = validate_events(vec![raw]);
        assert_eq!(events[0].theme, None);
    }

    #[test]
    fn test_raw_event_tolerates_missing_day_and_theme() {
        let json = r#"{"month": 9, "title": "Setembro Amarelo"}"#;
        let event: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.month, 9);
        assert!(event.day.is_none());
        assert!(event.theme.is_none());
    }
}

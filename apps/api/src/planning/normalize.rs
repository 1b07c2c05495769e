//! Normalization of generated plan items.
//!
//! LLM output is close to the requested schema but not reliable: format
//! names drift (English/Portuguese variants, singular/plural), dates come in
//! several shapes or point outside the target month, and counts can miss the
//! requested total. Everything here is a pure, single-pass repair step
//! between generation and persistence.

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::planning::distribution::total_publications;
use crate::planning::formats::{ContentFormat, FormatCounts, FORMAT_ORDER};
use crate::planning::generator::DraftItem;

/// A generated item after normalization, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedItem {
    pub title: String,
    pub format: ContentFormat,
    pub central_message: String,
    pub caption: String,
    pub cta: String,
    pub scheduled_date: Option<NaiveDate>,
}

/// Parses a "YYYY-MM" month string. Years outside 2000-2100 are rejected as
/// junk input rather than clamped.
pub fn parse_month(raw: &str) -> Option<(i32, u32)> {
    let (year_part, month_part) = raw.trim().split_once('-')?;
    let year = year_part.parse::<i32>().ok()?;
    let month = month_part.parse::<u32>().ok()?;
    if !(1..=12).contains(&month) || !(2000..=2100).contains(&year) {
        return None;
    }
    Some((year, month))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(30)
}

/// Maps a free-form format string onto the closed format set. Accepts the
/// wire identifiers plus the common variants the LLM produces, including
/// the Portuguese names used in medical content briefs.
pub fn coerce_format(raw: &str) -> Option<ContentFormat> {
    let s = raw.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }
    if s.contains("reel") {
        return Some(ContentFormat::Reels);
    }
    if s.contains("carous") || s.contains("carro") {
        return Some(ContentFormat::Carousel);
    }
    if s.contains("stor") {
        return Some(ContentFormat::Stories);
    }
    if s.contains("live") || s.contains("collab") {
        return Some(ContentFormat::LiveCollab);
    }
    if s.contains("static") || s.contains("estátic") || s.contains("estatic") || s.contains("feed")
    {
        return Some(ContentFormat::StaticPost);
    }
    None
}

/// Pulls a day-of-month out of a generated date string. Understands
/// "YYYY-MM-DD" (optionally with a time part), "DD/MM/YYYY", "DD/MM", a bare
/// day number, and as a last resort a single number embedded in prose.
fn extract_day(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let date_part = raw.split(|c| c == 'T' || c == ' ').next().unwrap_or(raw);
    if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return Some(date.day());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Some(date.day());
    }
    if let Some((day_part, month_part)) = raw.split_once('/') {
        if let (Ok(day), Ok(_)) = (
            day_part.trim().parse::<u32>(),
            month_part.trim().parse::<u32>(),
        ) {
            return Some(day);
        }
    }
    if let Ok(day) = raw.parse::<u32>() {
        return Some(day);
    }

    let mut numbers: Vec<u32> = Vec::new();
    let mut current = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            if let Ok(n) = current.parse() {
                numbers.push(n);
            }
            current.clear();
        }
    }
    if !current.is_empty() {
        if let Ok(n) = current.parse() {
            numbers.push(n);
        }
    }
    // Exactly one number reads as a day ("day 12"); more is ambiguous.
    if numbers.len() == 1 {
        return Some(numbers[0]);
    }
    None
}

/// Repairs a generated date into the plan's target month. Whatever month or
/// year the string claimed, only the day survives, clamped to the month's
/// real length. Unreadable input yields no date rather than a guess.
pub fn repair_date(raw: &str, year: i32, month: u32) -> Option<NaiveDate> {
    let day = extract_day(raw)?;
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The format with the biggest gap between the requested mix and what has
/// been assigned so far; StaticPost when nothing is under-filled. Used to
/// place items whose format string could not be coerced.
fn most_underfilled(mix: &FormatCounts, assigned: &FormatCounts) -> ContentFormat {
    let mut best = ContentFormat::StaticPost;
    let mut best_deficit = 0;
    for format in FORMAT_ORDER {
        let deficit = mix.get(format) - assigned.get(format);
        if deficit > best_deficit {
            best = format;
            best_deficit = deficit;
        }
    }
    best
}

/// Runs the full repair pass over raw generated items.
///
/// Drops items with empty titles, coerces formats (unknowns go to the most
/// under-filled format of the requested mix), forces dates into the target
/// month, trims every text field, and truncates overshoot past the mix's
/// total. A shortfall is kept as-is; items are never fabricated here.
pub fn normalize_items(
    items: Vec<DraftItem>,
    year: i32,
    month: u32,
    mix: &FormatCounts,
) -> Vec<NormalizedItem> {
    let target_total = total_publications(mix).max(0) as usize;
    let mut assigned = FormatCounts::zero();
    let mut normalized = Vec::new();

    for item in items {
        let title = item.title.trim().to_string();
        if title.is_empty() {
            warn!("Dropping generated item with an empty title");
            continue;
        }

        let format = match coerce_format(&item.format) {
            Some(format) => format,
            None => {
                let fallback = most_underfilled(mix, &assigned);
                warn!(
                    "Unknown format '{}' on '{}', assigning {}",
                    item.format,
                    title,
                    fallback.as_str()
                );
                fallback
            }
        };
        *assigned.get_mut(format) += 1;

        normalized.push(NormalizedItem {
            title,
            format,
            central_message: item.central_message.trim().to_string(),
            caption: item.caption.trim().to_string(),
            cta: item.cta.trim().to_string(),
            scheduled_date: item
                .suggested_date
                .as_deref()
                .and_then(|raw| repair_date(raw, year, month)),
        });
    }

    if normalized.len() > target_total {
        warn!(
            "Generator returned {} items for a {target_total}-post plan, truncating",
            normalized.len()
        );
        normalized.truncate(target_total);
    } else if normalized.len() < target_total {
        warn!(
            "Generator returned {} of {target_total} requested items",
            normalized.len()
        );
    }

    normalized
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_draft(title: &str, format: &str, date: Option<&str>) -> DraftItem {
        DraftItem {
            title: title.to_string(),
            format: format.to_string(),
            central_message: "  message  ".to_string(),
            caption: "caption".to_string(),
            cta: "Book a consult".to_string(),
            suggested_date: date.map(|d| d.to_string()),
        }
    }

    #[test]
    fn test_parse_month_accepts_iso_year_month() {
        assert_eq!(parse_month("2026-07"), Some((2026, 7)));
        assert_eq!(parse_month(" 2026-7 "), Some((2026, 7)));
    }

    #[test]
    fn test_parse_month_rejects_junk() {
        assert_eq!(parse_month("2026"), None);
        assert_eq!(parse_month("2026-13"), None);
        assert_eq!(parse_month("1926-05"), None);
        assert_eq!(parse_month("july 2026"), None);
    }

    #[test]
    fn test_days_in_month_handles_february_and_leap_years() {
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2028, 2), 29);
        assert_eq!(days_in_month(2026, 7), 31);
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2026, 4), 30);
    }

    #[test]
    fn test_coerce_format_accepts_wire_names() {
        assert_eq!(coerce_format("reels"), Some(ContentFormat::Reels));
        assert_eq!(coerce_format("carousel"), Some(ContentFormat::Carousel));
        assert_eq!(coerce_format("staticPost"), Some(ContentFormat::StaticPost));
        assert_eq!(coerce_format("stories"), Some(ContentFormat::Stories));
        assert_eq!(coerce_format("liveCollab"), Some(ContentFormat::LiveCollab));
    }

    #[test]
    fn test_coerce_format_accepts_common_variants() {
        assert_eq!(coerce_format("Reel"), Some(ContentFormat::Reels));
        assert_eq!(coerce_format("CARROSSEL"), Some(ContentFormat::Carousel));
        assert_eq!(coerce_format("post estático"), Some(ContentFormat::StaticPost));
        assert_eq!(coerce_format("post estatico"), Some(ContentFormat::StaticPost));
        assert_eq!(coerce_format("feed post"), Some(ContentFormat::StaticPost));
        assert_eq!(coerce_format("story"), Some(ContentFormat::Stories));
        assert_eq!(coerce_format("Live"), Some(ContentFormat::LiveCollab));
        assert_eq!(coerce_format("collab video"), Some(ContentFormat::LiveCollab));
    }

    #[test]
    fn test_coerce_format_rejects_unknowns() {
        assert_eq!(coerce_format(""), None);
        assert_eq!(coerce_format("newsletter"), None);
        assert_eq!(coerce_format("podcast"), None);
    }

    #[test]
    fn test_repair_date_accepts_the_documented_shapes() {
        let expect = NaiveDate::from_ymd_opt(2026, 7, 12);
        assert_eq!(repair_date("2026-07-12", 2026, 7), expect);
        assert_eq!(repair_date("12/07/2026", 2026, 7), expect);
        assert_eq!(repair_date("12/07", 2026, 7), expect);
        assert_eq!(repair_date("12", 2026, 7), expect);
        assert_eq!(repair_date("day 12", 2026, 7), expect);
        assert_eq!(repair_date("2026-07-12T00:00:00", 2026, 7), expect);
    }

    #[test]
    fn test_repair_date_forces_foreign_months_into_target() {
        // The generated month/year is discarded; only the day survives.
        assert_eq!(
            repair_date("2025-03-09", 2026, 7),
            NaiveDate::from_ymd_opt(2026, 7, 9)
        );
    }

    #[test]
    fn test_repair_date_clamps_day_to_month_length() {
        assert_eq!(
            repair_date("31", 2026, 2),
            NaiveDate::from_ymd_opt(2026, 2, 28)
        );
        assert_eq!(
            repair_date("0", 2026, 2),
            NaiveDate::from_ymd_opt(2026, 2, 1)
        );
    }

    #[test]
    fn test_repair_date_gives_up_on_unreadable_input() {
        assert_eq!(repair_date("soon", 2026, 7), None);
        assert_eq!(repair_date("", 2026, 7), None);
        assert_eq!(repair_date("12 or 14", 2026, 7), None);
    }

    #[test]
    fn test_normalize_drops_empty_titles_and_trims_fields() {
        let mix = FormatCounts::new(1, 1, 1, 1, 1);
        let items = vec![
            make_draft("   ", "reels", None),
            make_draft("  Hydration myths  ", "reels", None),
        ];
        let normalized = normalize_items(items, 2026, 7, &mix);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].title, "Hydration myths");
        assert_eq!(normalized[0].central_message, "message");
    }

    #[test]
    fn test_normalize_assigns_unknown_formats_to_underfilled_slot() {
        let mix = FormatCounts::new(0, 2, 0, 0, 0);
        let items = vec![
            make_draft("A", "carousel", None),
            make_draft("B", "newsletter", None),
        ];
        let normalized = normalize_items(items, 2026, 7, &mix);
        assert_eq!(normalized[1].format, ContentFormat::Carousel);
    }

    #[test]
    fn test_normalize_defaults_unknown_format_to_static_post_when_filled() {
        let mix = FormatCounts::new(0, 1, 0, 0, 0);
        let items = vec![
            make_draft("A", "carousel", None),
            make_draft("B", "newsletter", None),
        ];
        let normalized = normalize_items(items, 2026, 7, &mix);
        assert_eq!(normalized[1].format, ContentFormat::StaticPost);
    }

    #[test]
    fn test_normalize_truncates_overshoot_to_mix_total() {
        let mix = FormatCounts::new(1, 1, 0, 0, 0);
        let items = vec![
            make_draft("A", "reels", None),
            make_draft("B", "carousel", None),
            make_draft("C", "stories", None),
        ];
        let normalized = normalize_items(items, 2026, 7, &mix);
        assert_eq!(normalized.len(), 2, "overshoot past the mix total is cut");
    }

    #[test]
    fn test_normalize_keeps_shortfall_without_fabricating() {
        let mix = FormatCounts::new(2, 2, 2, 2, 2);
        let items = vec![make_draft("A", "reels", None)];
        let normalized = normalize_items(items, 2026, 7, &mix);
        assert_eq!(normalized.len(), 1);
    }

    #[test]
    fn test_normalize_repairs_dates_into_the_plan_month() {
        let mix = FormatCounts::new(2, 0, 0, 0, 0);
        let items = vec![
            make_draft("A", "reels", Some("2025-01-15")),
            make_draft("B", "reels", Some("someday")),
        ];
        let normalized = normalize_items(items, 2026, 7, &mix);
        assert_eq!(
            normalized[0].scheduled_date,
            NaiveDate::from_ymd_opt(2026, 7, 15)
        );
        assert_eq!(normalized[1].scheduled_date, None);
    }
}

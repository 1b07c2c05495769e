// LLM prompt constants for awareness calendar extraction.

/// System prompt for calendar extraction — enforces JSON-only output.
pub const AWARENESS_SYSTEM: &str =
    "You are a data extraction assistant for health awareness calendars. \
    You turn messy page text into structured calendar events. \
    You MUST respond with valid JSON only — a JSON array of event objects. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Calendar extraction prompt template. Replace `{calendar_text}` before sending.
pub const AWARENESS_PROMPT_TEMPLATE: &str = r#"The text below was extracted from an official health awareness calendar page. Identify every commemorative health date or month-long campaign it mentions.

Return a JSON ARRAY with one object per event:
[
  {
    "month": 7,
    "day": 28,
    "title": "Dia Mundial de Combate às Hepatites Virais",
    "theme": "hepatites virais"
  },
  {
    "month": 10,
    "day": null,
    "title": "Outubro Rosa",
    "theme": "câncer de mama"
  }
]

HARD RULES:
1. `month` is the number 1-12; skip any entry whose month you cannot determine
2. `day` is the day of month, or null for week-long or month-long campaigns
3. Keep `title` exactly as the page names the event, in its original language
4. `theme` is a short lowercase topic hint, or null when unclear
5. Ignore navigation, menus, footers and anything that is not a health date

PAGE TEXT:
{calendar_text}"#;

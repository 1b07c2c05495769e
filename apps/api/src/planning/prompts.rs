// LLM prompt constants for plan generation.

/// System prompt for plan generation — enforces JSON-only output.
pub const PLAN_SYSTEM: &str =
    "You are a senior social media strategist for medical and health professionals. \
    You plan Instagram editorial calendars that respect medical advertising ethics: \
    no sensationalism, no guaranteed results, no before/after promises. \
    You MUST respond with valid JSON only — a JSON array of post objects. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Plan generation prompt template.
/// Replace: {specialization}, {month_name}, {year}, {target_total},
///          {mix_lines}, {goals}, {awareness_block}, {notes_block}
pub const PLAN_PROMPT_TEMPLATE: &str = r#"Create a monthly Instagram content plan for a professional in: {specialization}.

Month: {month_name} {year}
Total posts: exactly {target_total}
Strategic goals: {goals}

FORMAT MIX (produce exactly this many items per format):
{mix_lines}
{awareness_block}{notes_block}
Return a JSON ARRAY with one object per post:
[
  {
    "title": "Mitos sobre hidratação no verão",
    "format": "reels",
    "centralMessage": "Hidratação adequada muda com idade, clima e atividade física.",
    "caption": "Você sabia que a sede já é sinal de desidratação? ...",
    "cta": "Salve este post e compartilhe com quem precisa.",
    "suggestedDate": "{year}-07-12"
  }
]

HARD RULES:
1. `format` MUST be one of: reels, carousel, staticPost, stories, liveCollab
2. Produce EXACTLY the per-format counts listed in the format mix — no more, no fewer
3. `suggestedDate` MUST be an ISO date (YYYY-MM-DD) inside {month_name} {year}; spread posts across the whole month
4. Write `title`, `centralMessage`, `caption` and `cta` in Brazilian Portuguese
5. Content must be educational and ethical — no miracle claims, no fear-mongering, no patient data
6. When commemorative health dates are listed above, anchor posts to them on or near their day
7. Every post needs a distinct angle — no repeated titles or recycled captions"#;

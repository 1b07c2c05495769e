//! Calendar page fetching and HTML-to-text reduction.
//!
//! The official calendar is a plain content page, so basic HTTP plus regex
//! tag stripping is enough; no headless browser involved.

use regex::Regex;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Upper bound on the text handed to the LLM. Calendar pages carry a lot of
/// portal boilerplate; the event listing sits well within this window.
const MAX_CALENDAR_TEXT_CHARS: usize = 30_000;

/// Fetches the calendar page and reduces it to plain text.
pub async fn fetch_calendar_page(
    client: &reqwest::Client,
    url: &str,
) -> Result<String, AppError> {
    debug!("Fetching awareness calendar from {url}");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Scrape(format!("Calendar request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Scrape(format!(
            "Calendar page returned HTTP {status}"
        )));
    }

    let html = response
        .text()
        .await
        .map_err(|e| AppError::Scrape(format!("Could not read calendar body: {e}")))?;

    let text = clean_html(&html);
    if text.is_empty() {
        warn!("Calendar page at {url} yielded no readable text");
        return Err(AppError::Scrape(
            "Calendar page yielded no readable text".to_string(),
        ));
    }

    Ok(text)
}

/// Strips an HTML document down to its visible text: scripts, styles and
/// comments go first, then tags, then entities, then whitespace runs.
pub(crate) fn clean_html(html: &str) -> String {
    let mut text = strip_pattern(html, r"(?is)<script[^>]*>.*?</script>", " ");
    text = strip_pattern(&text, r"(?is)<style[^>]*>.*?</style>", " ");
    text = strip_pattern(&text, r"(?s)<!--.*?-->", " ");
    text = strip_pattern(&text, r"(?s)<[^>]+>", " ");

    // Decode common HTML entities
    text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");

    text = strip_pattern(&text, r"\s+", " ");
    let text = text.trim();

    if text.chars().count() > MAX_CALENDAR_TEXT_CHARS {
        text.chars().take(MAX_CALENDAR_TEXT_CHARS).collect()
    } else {
        text.to_string()
    }
}

/// Regex replace that leaves the text untouched if the pattern will not
/// compile. All call sites use literal patterns, so the fallback never fires.
fn strip_pattern(text: &str, pattern: &str, replacement: &str) -> String {
    match Regex::new(pattern) {
        Ok(re) => re.replace_all(text, replacement).into_owned(),
        Err(_) => text.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

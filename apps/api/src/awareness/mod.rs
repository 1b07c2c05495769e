// Awareness dates — the commemorative health-date calendar.
//
// A sync run fetches the official calendar page, reduces it to plain text,
// has the LLM structure it into events, and replaces the stored set. Plans
// read the stored events to anchor posts to relevant dates.

pub mod handlers;
pub mod normalizer;
pub mod prompts;
pub mod scraper;

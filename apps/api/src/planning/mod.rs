// Content planning engine.
// Implements: format auto-distribution, plan generation (LLM or mock),
// response normalization, and the plan/item HTTP handlers.
// All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod distribution;
pub mod formats;
pub mod generator;
pub mod handlers;
pub mod normalize;
pub mod prompts;
pub mod rules;

//! Content formats and the per-format counts record every plan is built from.
//!
//! `FormatCounts` always carries all five fields; no partial records exist
//! anywhere in the pipeline. Counts are signed because the scaler's remainder
//! correction may push a field below zero (see `planning::distribution`).

use serde::{Deserialize, Serialize};

/// One of the five supported Instagram-style content formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentFormat {
    Reels,
    Carousel,
    StaticPost,
    Stories,
    LiveCollab,
}

/// Canonical iteration order. Every per-field loop and every tie-break uses
/// this order, so results are deterministic.
pub const FORMAT_ORDER: [ContentFormat; 5] = [
    ContentFormat::Reels,
    ContentFormat::Carousel,
    ContentFormat::StaticPost,
    ContentFormat::Stories,
    ContentFormat::LiveCollab,
];

impl ContentFormat {
    /// Wire identifier, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFormat::Reels => "reels",
            ContentFormat::Carousel => "carousel",
            ContentFormat::StaticPost => "staticPost",
            ContentFormat::Stories => "stories",
            ContentFormat::LiveCollab => "liveCollab",
        }
    }

    /// Display label shown in the table and calendar views.
    pub fn label(&self) -> &'static str {
        match self {
            ContentFormat::Reels => "Reels",
            ContentFormat::Carousel => "Carousel",
            ContentFormat::StaticPost => "Static Post",
            ContentFormat::Stories => "Stories",
            ContentFormat::LiveCollab => "Live / Collab",
        }
    }

    /// One-sentence description used in the planning form and in prompts.
    pub fn description(&self) -> &'static str {
        match self {
            ContentFormat::Reels => "Short vertical videos for reach and discovery",
            ContentFormat::Carousel => "Multi-slide posts that teach one topic step by step",
            ContentFormat::StaticPost => "Single-image feed posts for quick, direct messages",
            ContentFormat::Stories => "Daily ephemeral touchpoints for closeness, polls and Q&A",
            ContentFormat::LiveCollab => "Live sessions or collaborations with peer professionals",
        }
    }
}

/// Publication counts per format. All five fields are always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCounts {
    pub reels: i32,
    pub carousel: i32,
    pub static_post: i32,
    pub stories: i32,
    pub live_collab: i32,
}

impl FormatCounts {
    pub const fn new(
        reels: i32,
        carousel: i32,
        static_post: i32,
        stories: i32,
        live_collab: i32,
    ) -> Self {
        Self {
            reels,
            carousel,
            static_post,
            stories,
            live_collab,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, 0, 0, 0)
    }

    pub fn get(&self, format: ContentFormat) -> i32 {
        match format {
            ContentFormat::Reels => self.reels,
            ContentFormat::Carousel => self.carousel,
            ContentFormat::StaticPost => self.static_post,
            ContentFormat::Stories => self.stories,
            ContentFormat::LiveCollab => self.live_collab,
        }
    }

    pub fn get_mut(&mut self, format: ContentFormat) -> &mut i32 {
        match format {
            ContentFormat::Reels => &mut self.reels,
            ContentFormat::Carousel => &mut self.carousel,
            ContentFormat::StaticPost => &mut self.static_post,
            ContentFormat::Stories => &mut self.stories,
            ContentFormat::LiveCollab => &mut self.live_collab,
        }
    }

    /// Clamps every field to zero or above, each independently, with no
    /// cross-field rebalancing. Applied to manual mixes coming from the
    /// form; never applied to scaler output.
    pub fn clamped_non_negative(&self) -> Self {
        let mut clamped = *self;
        for format in FORMAT_ORDER {
            let value = clamped.get_mut(format);
            if *value < 0 {
                *value = 0;
            }
        }
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_camel_case_wire_names() {
        let counts = FormatCounts::new(1, 2, 3, 4, 5);
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["reels"], 1);
        assert_eq!(json["carousel"], 2);
        assert_eq!(json["staticPost"], 3);
        assert_eq!(json["stories"], 4);
        assert_eq!(json["liveCollab"], 5);
    }

    #[test]
    fn test_format_serde_matches_as_str() {
        for format in FORMAT_ORDER {
            let json = serde_json::to_value(format).unwrap();
            assert_eq!(
                json.as_str().unwrap(),
                format.as_str(),
                "wire name and as_str must agree for {format:?}"
            );
        }
    }

    #[test]
    fn test_labels_and_descriptions_are_total() {
        for format in FORMAT_ORDER {
            assert!(!format.label().is_empty(), "{format:?} must have a label");
            assert!(
                !format.description().is_empty(),
                "{format:?} must have a description"
            );
        }
    }

    #[test]
    fn test_get_covers_every_field() {
        let counts = FormatCounts::new(10, 20, 30, 40, 50);
        let via_get: Vec<i32> = FORMAT_ORDER.iter().map(|&f| counts.get(f)).collect();
        assert_eq!(via_get, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_get_mut_writes_the_same_field_get_reads() {
        let mut counts = FormatCounts::zero();
        for (i, format) in FORMAT_ORDER.iter().enumerate() {
            *counts.get_mut(*format) = i as i32 + 1;
        }
        assert_eq!(counts, FormatCounts::new(1, 2, 3, 4, 5));
    }

    #[test]
    fn test_clamp_zeroes_negative_fields_only() {
        let counts = FormatCounts::new(-3, 5, 0, -1, 2);
        assert_eq!(
            counts.clamped_non_negative(),
            FormatCounts::new(0, 5, 0, 0, 2)
        );
    }

    #[test]
    fn test_missing_field_fails_deserialization() {
        let json = r#"{"reels":1,"carousel":2,"staticPost":3,"stories":4}"#;
        let result: Result<FormatCounts, _> = serde_json::from_str(json);
        assert!(result.is_err(), "partial counts records must be rejected");
    }
}

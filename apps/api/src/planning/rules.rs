//! Base distribution rules: fixed reference tables mapping each goal to a
//! nominal 30-post month, plus the fallback mix used when no goal is set.

use serde::{Deserialize, Serialize};

use crate::planning::formats::FormatCounts;

/// A prioritized content objective. Requests carry an ordered list where
/// index 0 is the primary goal and the rest are secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentGoal {
    Conversion,
    Authority,
    Growth,
    Education,
    Engagement,
}

/// All goals, in the order the planning form lists them.
pub const GOAL_ORDER: [ContentGoal; 5] = [
    ContentGoal::Conversion,
    ContentGoal::Authority,
    ContentGoal::Growth,
    ContentGoal::Education,
    ContentGoal::Engagement,
];

impl ContentGoal {
    /// Wire identifier, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentGoal::Conversion => "conversion",
            ContentGoal::Authority => "authority",
            ContentGoal::Growth => "growth",
            ContentGoal::Education => "education",
            ContentGoal::Engagement => "engagement",
        }
    }
}

/// Base counts for a single goal, tuned for a 30-item month.
///
/// Every table sums to 30, so a 30-post request reproduces its rule exactly.
/// These are fixed reference data, never derived and never mutated.
pub fn base_rule(goal: ContentGoal) -> FormatCounts {
    match goal {
        // Conversion leans on stories: close-of-sale content lives there.
        ContentGoal::Conversion => FormatCounts::new(6, 4, 3, 15, 2),
        // Authority favors carousels: long-form proof of expertise.
        ContentGoal::Authority => FormatCounts::new(5, 10, 6, 6, 3),
        // Growth is reach-heavy, so reels dominate.
        ContentGoal::Growth => FormatCounts::new(12, 6, 3, 7, 2),
        // Education splits between carousels and stories walkthroughs.
        ContentGoal::Education => FormatCounts::new(5, 12, 4, 7, 2),
        // Engagement pushes stories and live interaction.
        ContentGoal::Engagement => FormatCounts::new(6, 4, 3, 13, 4),
    }
}

/// Mix returned when the request carries no goals at all.
///
/// Deliberately not rescaled to the requested total: callers get this exact
/// record (sum 30) regardless of what total they asked for.
pub fn fallback_mix() -> FormatCounts {
    FormatCounts::new(6, 6, 6, 10, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::formats::FORMAT_ORDER;

    fn sum(counts: &FormatCounts) -> i64 {
        FORMAT_ORDER.iter().map(|&f| counts.get(f) as i64).sum()
    }

    #[test]
    fn test_every_base_rule_sums_to_30() {
        for goal in GOAL_ORDER {
            assert_eq!(
                sum(&base_rule(goal)),
                30,
                "base rule for {goal:?} must sum to 30"
            );
        }
    }

    #[test]
    fn test_base_rules_have_no_empty_format() {
        for goal in GOAL_ORDER {
            let rule = base_rule(goal);
            for format in FORMAT_ORDER {
                assert!(
                    rule.get(format) > 0,
                    "{goal:?} must allocate at least one {format:?}"
                );
            }
        }
    }

    #[test]
    fn test_fallback_mix_is_fixed() {
        assert_eq!(fallback_mix(), FormatCounts::new(6, 6, 6, 10, 2));
        assert_eq!(sum(&fallback_mix()), 30);
    }

    #[test]
    fn test_goal_serde_uses_lowercase_names() {
        for goal in GOAL_ORDER {
            let json = serde_json::to_value(goal).unwrap();
            assert_eq!(json.as_str().unwrap(), goal.as_str());
        }
        let parsed: ContentGoal = serde_json::from_str("\"education\"").unwrap();
        assert_eq!(parsed, ContentGoal::Education);
    }

    #[test]
    fn test_unknown_goal_fails_deserialization() {
        let result: Result<ContentGoal, _> = serde_json::from_str("\"virality\"");
        assert!(result.is_err(), "goals outside the closed set must be rejected");
    }
}

//! Format auto-distribution: turns an ordered goal list and a target
//! publication total into exact per-format counts.
//!
//! Three steps: pick or blend base rules (primary goal 70%, secondaries
//! split the remaining 30% equally), rescale proportionally to the target,
//! then move the rounding remainder onto the largest field so the final
//! counts sum to exactly the requested total.

use std::num::NonZeroU32;

use crate::planning::formats::{FormatCounts, FORMAT_ORDER};
use crate::planning::rules::{base_rule, fallback_mix, ContentGoal};

/// Weight of the primary goal when blending multiple goals.
const PRIMARY_WEIGHT: f64 = 0.7;
/// Weight pool split equally across all secondary goals.
const SECONDARY_WEIGHT: f64 = 0.3;

/// Sums a counts record into the total publication count.
///
/// Used by the scaler below and independently by the API layer to recompute
/// a displayed total after manual field edits.
pub fn total_publications(counts: &FormatCounts) -> i64 {
    FORMAT_ORDER.iter().map(|&f| counts.get(f) as i64).sum()
}

/// Rounds half away from zero. All inputs on this path are non-negative, so
/// this is plain round-half-up. Spelled out rather than taken from a float
/// default because some defaults round ties to even.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Rescales `counts` so the five fields sum to exactly `target_total`.
///
/// Each field is scaled and rounded independently, then the leftover
/// difference (a few units either way) is added to the largest rounded
/// field, ties going to the first field in canonical order. No clamp is
/// applied after the correction: exact-sum wins over non-negativity, so a
/// pathological input can leave a field below zero.
pub fn scale(counts: &FormatCounts, target_total: NonZeroU32) -> FormatCounts {
    let current_total = total_publications(counts);
    debug_assert!(
        current_total > 0,
        "scale() requires a distribution with a positive sum"
    );

    let factor = target_total.get() as f64 / current_total as f64;

    let mut scaled = FormatCounts::zero();
    for format in FORMAT_ORDER {
        *scaled.get_mut(format) = round_half_up(counts.get(format) as f64 * factor);
    }

    let difference = target_total.get() as i64 - total_publications(&scaled);
    if difference != 0 {
        let mut largest = FORMAT_ORDER[0];
        for format in FORMAT_ORDER {
            if scaled.get(format) > scaled.get(largest) {
                largest = format;
            }
        }
        *scaled.get_mut(largest) += difference as i32;
    }

    scaled
}

/// Blends the base rules of an ordered goal list into a single record.
///
/// The first goal contributes 70% per field; the remaining goals split the
/// other 30% equally. A single-goal list returns its base rule untouched.
fn blend_goals(goals: &[ContentGoal]) -> FormatCounts {
    let primary = base_rule(goals[0]);
    let secondaries = &goals[1..];
    if secondaries.is_empty() {
        return primary;
    }

    let share = SECONDARY_WEIGHT / secondaries.len() as f64;
    let mut blended = FormatCounts::zero();
    for format in FORMAT_ORDER {
        let mut value = primary.get(format) as f64 * PRIMARY_WEIGHT;
        for goal in secondaries {
            value += base_rule(*goal).get(format) as f64 * share;
        }
        *blended.get_mut(format) = round_half_up(value);
    }
    blended
}

/// Computes the per-format mix for an ordered goal list and a target total.
///
/// An empty goal list returns the fixed fallback mix as-is; `target_total`
/// is ignored on that path and the result sums to 30 regardless. Non-empty
/// lists always produce counts summing to exactly `target_total`.
pub fn auto_distribute(goals: &[ContentGoal], target_total: NonZeroU32) -> FormatCounts {
    if goals.is_empty() {
        return fallback_mix();
    }
    scale(&blend_goals(goals), target_total)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::rules::GOAL_ORDER;

    fn target(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).expect("test target must be positive")
    }

    #[test]
    fn test_total_publications_sums_all_five_fields() {
        let counts = FormatCounts::new(1, 2, 3, 4, 5);
        assert_eq!(total_publications(&counts), 15);
    }

    #[test]
    fn test_total_publications_with_single_populated_field() {
        let counts = FormatCounts::new(3, 0, 0, 0, 0);
        assert_eq!(total_publications(&counts), 3);
    }

    #[test]
    fn test_round_half_up_rounds_ties_away_from_zero() {
        assert_eq!(round_half_up(0.5), 1);
        assert_eq!(round_half_up(2.5), 3, "2.5 must round up, not to even");
        assert_eq!(round_half_up(3.5), 4);
        assert_eq!(round_half_up(1.4999), 1);
        assert_eq!(round_half_up(1.5001), 2);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn test_scale_is_identity_at_the_native_total() {
        let base = base_rule(ContentGoal::Conversion);
        assert_eq!(scale(&base, target(30)), base);
    }

    #[test]
    fn test_scale_education_down_to_10() {
        let scaled = scale(&base_rule(ContentGoal::Education), target(10));
        assert_eq!(scaled, FormatCounts::new(2, 4, 1, 2, 1));
        assert_eq!(total_publications(&scaled), 10);
    }

    #[test]
    fn test_scale_education_to_15_pins_tie_rounding() {
        // Halving {5, 12, 4, 7, 2} produces true .5 ties on reels (2.5) and
        // stories (3.5). Half-up rounds both up (sum 16), then the remainder
        // correction takes one from the largest field, carousel. Ties-to-even
        // rounding would have produced {2, 6, 2, 4, 1} instead.
        let scaled = scale(&base_rule(ContentGoal::Education), target(15));
        assert_eq!(scaled, FormatCounts::new(3, 5, 2, 4, 1));
        assert_eq!(total_publications(&scaled), 15);
    }

    #[test]
    fn test_scale_to_one_keeps_the_dominant_field() {
        let scaled = scale(&base_rule(ContentGoal::Conversion), target(1));
        assert_eq!(scaled, FormatCounts::new(0, 0, 0, 1, 0));
    }

    #[test]
    fn test_scale_remainder_tie_goes_to_first_field_in_order() {
        // reels and carousel tie for largest after rounding; the extra unit
        // must land on reels, the first of the two in canonical order.
        let counts = FormatCounts::new(10, 10, 5, 5, 0);
        let scaled = scale(&counts, target(31));
        assert_eq!(scaled, FormatCounts::new(11, 10, 5, 5, 0));
    }

    #[test]
    fn test_scale_correction_is_not_clamped_at_zero() {
        // Five equal fields squeezed from 5 down to 3: every field rounds to
        // 1 (0.6 each), and the -2 correction drives the first field to -1.
        // The exact-sum invariant holds; clamping at zero would have produced
        // a sum of 4 instead of the requested 3.
        let counts = FormatCounts::new(1, 1, 1, 1, 1);
        let scaled = scale(&counts, target(3));
        assert_eq!(scaled, FormatCounts::new(-1, 1, 1, 1, 1));
        assert_eq!(total_publications(&scaled), 3);
    }

    #[test]
    fn test_scale_sum_invariant_across_goals_and_totals() {
        let totals = [1, 2, 3, 5, 7, 10, 13, 29, 30, 31, 45, 60, 90, 365, 1000];
        for goal in GOAL_ORDER {
            let base = base_rule(goal);
            for t in totals {
                let scaled = scale(&base, target(t));
                assert_eq!(
                    total_publications(&scaled),
                    t as i64,
                    "sum must equal {t} for {goal:?}"
                );
            }
        }
    }

    #[test]
    fn test_scale_is_softly_monotonic_in_the_target() {
        // Growing the target never drops a field by more than rounding noise.
        let base = base_rule(ContentGoal::Education);
        let small = scale(&base, target(10));
        let large = scale(&base, target(20));
        for format in FORMAT_ORDER {
            assert!(
                large.get(format) >= small.get(format) - 1,
                "{format:?} dropped more than rounding noise between targets"
            );
        }
    }

    #[test]
    fn test_auto_distribute_single_goal_reproduces_base_rule_at_30() {
        for goal in GOAL_ORDER {
            assert_eq!(
                auto_distribute(&[goal], target(30)),
                base_rule(goal),
                "{goal:?} must come back undistorted at its native total"
            );
        }
    }

    #[test]
    fn test_auto_distribute_conversion_at_30() {
        let counts = auto_distribute(&[ContentGoal::Conversion], target(30));
        assert_eq!(counts, FormatCounts::new(6, 4, 3, 15, 2));
    }

    #[test]
    fn test_auto_distribute_education_at_10() {
        let counts = auto_distribute(&[ContentGoal::Education], target(10));
        assert_eq!(counts, FormatCounts::new(2, 4, 1, 2, 1));
    }

    #[test]
    fn test_auto_distribute_blends_primary_70_secondary_30() {
        // conversion {6,4,3,15,2} * 0.7 + authority {5,10,6,6,3} * 0.3,
        // rounded per field: {5.7, 5.8, 3.9, 12.3, 2.3} -> {6, 6, 4, 12, 2}.
        // The blend already sums to 30, so rescaling leaves it unchanged.
        let counts = auto_distribute(
            &[ContentGoal::Conversion, ContentGoal::Authority],
            target(30),
        );
        assert_eq!(counts, FormatCounts::new(6, 6, 4, 12, 2));
    }

    #[test]
    fn test_auto_distribute_splits_secondary_pool_equally() {
        // Two secondaries get 15% each alongside the 70% primary.
        let counts = auto_distribute(
            &[
                ContentGoal::Conversion,
                ContentGoal::Authority,
                ContentGoal::Education,
            ],
            target(30),
        );
        assert_eq!(counts, FormatCounts::new(6, 6, 4, 12, 2));
        assert_eq!(total_publications(&counts), 30);
    }

    #[test]
    fn test_auto_distribute_goal_order_changes_the_result() {
        let a = auto_distribute(
            &[ContentGoal::Conversion, ContentGoal::Authority],
            target(30),
        );
        let b = auto_distribute(
            &[ContentGoal::Authority, ContentGoal::Conversion],
            target(30),
        );
        assert_ne!(a, b, "primary position must dominate the blend");
        assert_eq!(b, FormatCounts::new(5, 8, 5, 9, 3));
    }

    #[test]
    fn test_auto_distribute_empty_goals_returns_fallback_unscaled() {
        // The fallback path ignores the requested total on purpose; the
        // result always sums to 30.
        for t in [1, 10, 30, 90] {
            let counts = auto_distribute(&[], target(t));
            assert_eq!(counts, FormatCounts::new(6, 6, 6, 10, 2));
            assert_eq!(total_publications(&counts), 30);
        }
    }

    #[test]
    fn test_auto_distribute_sum_invariant_for_goal_combinations() {
        let combos: Vec<Vec<ContentGoal>> = vec![
            vec![ContentGoal::Growth],
            vec![ContentGoal::Engagement, ContentGoal::Education],
            vec![
                ContentGoal::Authority,
                ContentGoal::Growth,
                ContentGoal::Conversion,
            ],
            GOAL_ORDER.to_vec(),
        ];
        for goals in &combos {
            for t in [1, 4, 9, 17, 30, 42, 90, 250, 1000] {
                let counts = auto_distribute(goals, target(t));
                assert_eq!(
                    total_publications(&counts),
                    t as i64,
                    "sum must equal {t} for goals {goals:?}"
                );
            }
        }
    }

    #[test]
    fn test_auto_distribute_is_deterministic() {
        let goals = [ContentGoal::Engagement, ContentGoal::Conversion];
        let first = auto_distribute(&goals, target(45));
        let second = auto_distribute(&goals, target(45));
        assert_eq!(first, second);
    }
}

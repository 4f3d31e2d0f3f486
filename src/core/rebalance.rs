use std::cmp::Ordering;

use crate::models::{AcademicTier, MatchResult, TierDistribution};

/// Share of the batch that reach and safety should each hold
const TIER_SHARE: f64 = 0.25;

/// Expected reach (and safety) count for a batch of `total`
#[inline]
pub fn expected_tier_count(total: usize) -> usize {
    ((total as f64 * TIER_SHARE).floor() as usize).max(1)
}

/// Whether a batch lacks reach or safety schools, or holds too few of either
pub fn needs_rebalancing(distribution: &TierDistribution) -> bool {
    let total = distribution.total();
    if total == 0 {
        return false;
    }

    let expected = expected_tier_count(total) as f64;
    distribution.reach == 0
        || distribution.safety == 0
        || (distribution.reach as f64) < expected * 0.5
        || (distribution.safety as f64) < expected * 0.5
}

/// Reach and safety counts to assign when a batch is rebalanced
fn target_counts(total: usize) -> (usize, usize) {
    let expected = expected_tier_count(total);
    if total >= 3 && expected * 2 >= total {
        let third = (total / 3).max(1);
        return (third, third);
    }
    (expected, expected)
}

/// Compare admission rates, most selective first, unknown rates last
fn by_selectivity(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Reassign tiers across a ranked batch so every tier is represented
///
/// Runs only when [`needs_rebalancing`] says so. The most selective schools
/// by admission rate become reach, the least selective become safety and the
/// rest are target. Output keeps the input order and length.
pub fn rebalance_tiers(matches: Vec<MatchResult>) -> Vec<MatchResult> {
    let before = TierDistribution::from_matches(&matches);
    if !needs_rebalancing(&before) {
        return matches;
    }

    let total = matches.len();
    let (reach_count, safety_count) = target_counts(total);
    tracing::warn!(
        "Rebalancing tiers {:?}: {} schools, assigning {} reach and {} safety",
        before,
        total,
        reach_count,
        safety_count
    );

    let mut order: Vec<usize> = (0..total).collect();
    order.sort_by(|&a, &b| by_selectivity(matches[a].college.admit_rate(), matches[b].college.admit_rate()));

    let mut tiers = vec![AcademicTier::Target; total];
    for &index in order.iter().take(reach_count) {
        tiers[index] = AcademicTier::Reach;
    }

    let available = &order[reach_count.min(total)..];
    let (with_rate, without_rate): (Vec<usize>, Vec<usize>) = available
        .iter()
        .partition(|&&index| matches[index].college.admit_rate().is_some());

    let from_rates = safety_count.min(with_rate.len());
    let from_unknown = (safety_count - from_rates).min(without_rate.len());
    for &index in with_rate.iter().rev().take(from_rates) {
        tiers[index] = AcademicTier::Safety;
    }
    for &index in without_rate.iter().rev().take(from_unknown) {
        tiers[index] = AcademicTier::Safety;
    }

    let rebalanced: Vec<MatchResult> = matches
        .iter()
        .zip(tiers)
        .map(|(result, tier)| result.with_tier(tier))
        .collect();

    tracing::debug!(
        "After rebalancing: {:?}",
        TierDistribution::from_matches(&rebalanced)
    );

    rebalanced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstitutionRecord;

    fn create_match(id: i64, rate: Option<f64>, tier: AcademicTier) -> MatchResult {
        MatchResult {
            college: InstitutionRecord {
                id,
                admission_rate: rate,
                ..Default::default()
            },
            academic_tier: tier,
            fit_score: 70,
        }
    }

    fn tier_of(matches: &[MatchResult], id: i64) -> AcademicTier {
        matches
            .iter()
            .find(|m| m.college.id == id)
            .map(|m| m.academic_tier)
            .unwrap()
    }

    #[test]
    fn test_needs_rebalancing() {
        assert!(!needs_rebalancing(&TierDistribution::default()));
        assert!(needs_rebalancing(&TierDistribution { reach: 0, target: 3, safety: 1 }));
        assert!(needs_rebalancing(&TierDistribution { reach: 1, target: 18, safety: 1 }));
        assert!(!needs_rebalancing(&TierDistribution { reach: 3, target: 4, safety: 3 }));
    }

    #[test]
    fn test_all_target_batch_of_ten() {
        let rates = [0.2, 0.3, 0.5, 0.55, 0.6, 0.7, 0.8, 0.9, 0.95, 0.45];
        let matches: Vec<MatchResult> = rates
            .iter()
            .enumerate()
            .map(|(i, rate)| create_match(i as i64, Some(*rate), AcademicTier::Target))
            .collect();

        let rebalanced = rebalance_tiers(matches);
        let dist = TierDistribution::from_matches(&rebalanced);

        assert_eq!(dist, TierDistribution { reach: 2, target: 6, safety: 2 });
        assert_eq!(tier_of(&rebalanced, 0), AcademicTier::Reach);
        assert_eq!(tier_of(&rebalanced, 1), AcademicTier::Reach);
        assert_eq!(tier_of(&rebalanced, 7), AcademicTier::Safety);
        assert_eq!(tier_of(&rebalanced, 8), AcademicTier::Safety);
    }

    #[test]
    fn test_small_batch_gets_every_tier() {
        let matches = vec![
            create_match(1, Some(0.5), AcademicTier::Target),
            create_match(2, Some(0.3), AcademicTier::Target),
            create_match(3, Some(0.8), AcademicTier::Target),
        ];

        let rebalanced = rebalance_tiers(matches);

        assert_eq!(tier_of(&rebalanced, 2), AcademicTier::Reach);
        assert_eq!(tier_of(&rebalanced, 1), AcademicTier::Target);
        assert_eq!(tier_of(&rebalanced, 3), AcademicTier::Safety);
    }

    #[test]
    fn test_unknown_rates_fill_safety_last() {
        let matches = vec![
            create_match(1, None, AcademicTier::Target),
            create_match(2, Some(0.2), AcademicTier::Target),
            create_match(3, None, AcademicTier::Target),
            create_match(4, None, AcademicTier::Target),
        ];

        let rebalanced = rebalance_tiers(matches);

        assert_eq!(tier_of(&rebalanced, 2), AcademicTier::Reach);
        assert_eq!(tier_of(&rebalanced, 4), AcademicTier::Safety);
        assert_eq!(TierDistribution::from_matches(&rebalanced).safety, 1);
    }

    #[test]
    fn test_preserves_order_and_length() {
        let matches: Vec<MatchResult> = (0..7)
            .map(|i| create_match(i, Some(0.5), AcademicTier::Target))
            .collect();
        let ids: Vec<i64> = matches.iter().map(|m| m.college.id).collect();

        let rebalanced = rebalance_tiers(matches);

        assert_eq!(rebalanced.iter().map(|m| m.college.id).collect::<Vec<_>>(), ids);
        let dist = TierDistribution::from_matches(&rebalanced);
        assert!(dist.reach >= 1 && dist.safety >= 1);
    }

    #[test]
    fn test_balanced_batch_untouched() {
        let matches = vec![
            create_match(1, Some(0.1), AcademicTier::Reach),
            create_match(2, Some(0.5), AcademicTier::Target),
            create_match(3, Some(0.9), AcademicTier::Safety),
            create_match(4, Some(0.5), AcademicTier::Target),
        ];

        let rebalanced = rebalance_tiers(matches.clone());
        assert_eq!(rebalanced, matches);
    }
}

use thiserror::Error;

use crate::core::{
    classifier::classify,
    filters::{apply_client_filters, FilterSet},
    rebalance::rebalance_tiers,
    scoring::score_components,
};
use crate::models::{InstitutionRecord, MatchResult, StudentProfile, TierDistribution};

/// Warning returned when the client-side filters leave nothing to rank
pub const NO_MATCHES_WARNING: &str = "No schools matched all your criteria. Try relaxing some filters.";

/// Failures inside a matching run. The engine turns these into warnings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("all {partitions} candidate partitions failed")]
    AllPartitionsFailed { partitions: usize },

    #[error("fit score for institution {id} is not a finite number")]
    NonFiniteScore { id: i64 },
}

/// Ranked output of the matching pipeline
#[derive(Debug, Clone, Default)]
pub struct RankedMatches {
    pub matches: Vec<MatchResult>,
    pub warnings: Vec<String>,
    pub total_candidates: usize,
}

/// Ranking pipeline over an already fetched candidate list
///
/// # Pipeline Stages
/// 1. Client-side filtering (size, setting, deal-breakers, budget)
/// 2. Tier classification and fit scoring
/// 3. Ranking by fit score, then institution id
/// 4. Truncation to the requested limit
/// 5. Tier rebalancing of the returned batch
#[derive(Debug, Clone)]
pub struct Matcher {
    max_limit: usize,
}

impl Matcher {
    pub fn new(max_limit: usize) -> Self {
        Self {
            max_limit: max_limit.max(1),
        }
    }

    /// Rank candidates for a student
    ///
    /// `limit` is clamped to `1..=max_limit`.
    pub fn find_matches(
        &self,
        profile: &StudentProfile,
        filters: &FilterSet,
        candidates: Vec<InstitutionRecord>,
        limit: usize,
    ) -> Result<RankedMatches, MatchError> {
        let total_candidates = candidates.len();
        let filtered = apply_client_filters(candidates, &filters.client);

        if filtered.is_empty() {
            tracing::info!("No candidates left after filtering {} schools", total_candidates);
            return Ok(RankedMatches {
                matches: Vec::new(),
                warnings: vec![NO_MATCHES_WARNING.to_string()],
                total_candidates,
            });
        }

        let mut scored = filtered
            .into_iter()
            .map(|college| {
                let components = score_components(&college, profile, filters);
                if !components.total().is_finite() {
                    return Err(MatchError::NonFiniteScore { id: college.id });
                }
                Ok(MatchResult {
                    academic_tier: classify(&college, profile),
                    fit_score: components.score(),
                    college,
                })
            })
            .collect::<Result<Vec<MatchResult>, MatchError>>()?;

        scored.sort_by(|a, b| {
            b.fit_score
                .cmp(&a.fit_score)
                .then_with(|| a.college.id.cmp(&b.college.id))
        });

        tracing::debug!("Tier distribution: {:?}", TierDistribution::from_matches(&scored));

        scored.truncate(limit.clamp(1, self.max_limit));
        let matches = rebalance_tiers(scored);

        Ok(RankedMatches {
            matches,
            warnings: Vec::new(),
            total_candidates,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(200)
    }
}

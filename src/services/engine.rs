use crate::core::{FilterSet, MatchError, Matcher};
use crate::models::{InstitutionRecord, MatchResponse, ProfileCompleteness, StudentProfile};
use crate::services::cache::CacheStats;
use crate::services::fetcher::CandidateFetcher;
use crate::services::scorecard::ScorecardError;

/// Per-request matching options
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    /// Number of matches to return; the engine default when absent
    pub limit: Option<usize>,
}

/// Ties candidate retrieval to the ranking pipeline
#[derive(Clone)]
pub struct MatchEngine {
    fetcher: CandidateFetcher,
    matcher: Matcher,
    default_limit: usize,
}

impl MatchEngine {
    pub fn new(fetcher: CandidateFetcher, matcher: Matcher, default_limit: usize) -> Self {
        Self {
            fetcher,
            matcher,
            default_limit: default_limit.max(1),
        }
    }

    /// Generate ranked matches for a student
    ///
    /// Never fails: incomplete profiles yield an empty response without a
    /// network call, and internal failures are reported as warnings.
    pub async fn generate_matches(&self, profile: &StudentProfile, options: MatchOptions) -> MatchResponse {
        match self.try_generate(profile, options).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error generating matches: {}", e);
                MatchResponse::warning(format!(
                    "Error generating matches: {}. Please try again or contact support.",
                    e
                ))
            }
        }
    }

    async fn try_generate(&self, profile: &StudentProfile, options: MatchOptions) -> Result<MatchResponse, MatchError> {
        if !ProfileCompleteness::assess(profile).can_generate_matches {
            tracing::info!("Profile has no core answers, skipping match generation");
            return Ok(MatchResponse::empty());
        }

        let filters = FilterSet::from_profile(profile);
        let outcome = self.fetcher.fetch_candidates(&filters.api).await;
        if outcome.all_failed() {
            return Err(MatchError::AllPartitionsFailed {
                partitions: outcome.partitions,
            });
        }

        let limit = options.limit.unwrap_or(self.default_limit);
        let ranked = self
            .matcher
            .find_matches(profile, &filters, outcome.candidates, limit)?;

        tracing::info!(
            "Generated {} matches from {} candidates",
            ranked.matches.len(),
            ranked.total_candidates
        );

        Ok(MatchResponse {
            matches: ranked.matches,
            warnings: ranked.warnings,
        })
    }

    /// Provider page cache statistics, when caching is enabled
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.fetcher.cache_stats()
    }

    /// Fetch one institution by id
    pub async fn lookup(&self, id: i64) -> Result<Option<InstitutionRecord>, ScorecardError> {
        self.fetcher.lookup(id).await
    }
}

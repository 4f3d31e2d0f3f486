// Service exports
pub mod cache;
pub mod engine;
pub mod fetcher;
pub mod scorecard;

pub use cache::{CacheKey, CacheStats, ResponseCache};
pub use engine::{MatchEngine, MatchOptions};
pub use fetcher::{CandidateFetcher, FetchError, FetchOutcome, FetchSettings};
pub use scorecard::{InstitutionPage, InstitutionSource, ScorecardClient, ScorecardError, ScorecardQuery};

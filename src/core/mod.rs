// Core algorithm exports
pub mod classifier;
pub mod completeness;
pub mod explainer;
pub mod filters;
pub mod matcher;
pub mod rebalance;
pub mod regions;
pub mod scoring;

pub use classifier::classify;
pub use explainer::{calculate_detailed_fit_scores, fit_summary};
pub use filters::{apply_client_filters, ApiFilters, ClientFilters, FilterSet};
pub use matcher::{MatchError, Matcher, RankedMatches, NO_MATCHES_WARNING};
pub use rebalance::{needs_rebalancing, rebalance_tiers};
pub use regions::{expand_regions, is_in_regions};
pub use scoring::{calculate_fit_score, score_components, FitComponents};

//! College Match - matching and fit-scoring service for college search
//!
//! This library ranks colleges for a student's questionnaire answers using
//! College Scorecard data. It fetches candidates per state, filters them,
//! classifies each as reach, target or safety, scores the fit and rebalances
//! the tiers of the returned batch.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_detailed_fit_scores, calculate_fit_score, FilterSet, Matcher};
pub use models::{
    AcademicTier, DetailedFit, InstitutionRecord, MatchResponse, MatchResult, ProfileCompleteness,
    StudentProfile,
};
pub use services::{MatchEngine, MatchOptions};

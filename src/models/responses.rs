use serde::{Deserialize, Serialize};
use crate::models::domain::{AcademicTier, MatchResult};
use crate::services::cache::CacheStats;

/// Response for the generate matches endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchResponse {
    pub matches: Vec<MatchResult>,
    pub warnings: Vec<String>,
}

impl MatchResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            matches: Vec::new(),
            warnings: vec![message.into()],
        }
    }
}

/// One scored dimension of the detailed breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub score: f64,
    pub max: f64,
    pub reasons: Vec<String>,
}

impl DimensionScore {
    pub fn new(max: f64) -> Self {
        Self {
            score: 0.0,
            max,
            reasons: Vec::new(),
        }
    }

    /// Score as a rounded percentage of the dimension maximum
    pub fn percent(&self) -> u8 {
        ((self.score / self.max) * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Raw per-dimension points with reasons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitBreakdown {
    pub academic: DimensionScore,
    pub financial: DimensionScore,
    pub environmental: DimensionScore,
    pub outcomes: DimensionScore,
    pub overall: u8,
}

/// Normalised per-dimension percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitPercentages {
    pub academic: u8,
    pub financial: u8,
    pub environmental: u8,
    pub outcomes: u8,
    pub overall: u8,
}

/// Detailed explanation of one institution's fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedFit {
    #[serde(rename = "academicTier")]
    pub academic_tier: AcademicTier,
    pub summary: String,
    pub scores: FitPercentages,
    pub details: FitBreakdown,
}

/// Answer coverage of a profile, per questionnaire tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCompleteness {
    pub overall: u8,
    pub tier1: u8,
    pub tier2: u8,
    pub tier3: u8,
    #[serde(rename = "canGenerateMatches")]
    pub can_generate_matches: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::InstitutionRecord;
use crate::models::profile::StudentProfile;

/// Request to generate matches for a profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateMatchesRequest {
    #[serde(default)]
    #[validate(nested)]
    pub profile: StudentProfile,
    #[serde(default)]
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<u16>,
}

/// Request to score a single institution the caller already holds
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FitScoreRequest {
    #[serde(alias = "school")]
    pub college: InstitutionRecord,
    #[serde(default)]
    #[validate(nested)]
    pub profile: StudentProfile,
}

/// Request carrying only a profile (completeness, detail by id)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileRequest {
    #[serde(default)]
    #[validate(nested)]
    pub profile: StudentProfile,
}

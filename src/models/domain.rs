use serde::{Deserialize, Serialize};
use std::fmt;

/// Institution record as returned by the College Scorecard `schools` endpoint
///
/// Field names follow the provider's dotted paths. Every attribute except `id`
/// may be missing from a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstitutionRecord {
    pub id: i64,
    #[serde(rename = "school.name", default)]
    pub name: Option<String>,
    #[serde(rename = "school.city", default)]
    pub city: Option<String>,
    #[serde(rename = "school.state", default)]
    pub state: Option<String>,
    #[serde(rename = "school.school_url", default)]
    pub url: Option<String>,
    #[serde(rename = "location.lat", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "location.lon", default)]
    pub longitude: Option<f64>,
    #[serde(rename = "latest.student.size", default)]
    pub size: Option<u32>,
    #[serde(rename = "latest.school.ownership", default)]
    pub ownership: Option<u8>,
    #[serde(rename = "latest.school.locale", default)]
    pub locale: Option<u8>,
    #[serde(rename = "latest.admissions.admission_rate.overall", default)]
    pub admission_rate: Option<f64>,
    #[serde(rename = "latest.admissions.sat_scores.midpoint.math", default)]
    pub sat_math_midpoint: Option<f64>,
    #[serde(rename = "latest.admissions.sat_scores.midpoint.critical_reading", default)]
    pub sat_reading_midpoint: Option<f64>,
    #[serde(rename = "latest.admissions.act_scores.midpoint.cumulative", default)]
    pub act_midpoint: Option<f64>,
    #[serde(rename = "latest.cost.attendance.academic_year", default)]
    pub cost_of_attendance: Option<f64>,
    #[serde(rename = "latest.cost.avg_net_price.overall", default)]
    pub avg_net_price: Option<f64>,
    #[serde(rename = "latest.cost.tuition.in_state", default)]
    pub tuition_in_state: Option<f64>,
    #[serde(rename = "latest.cost.tuition.out_of_state", default)]
    pub tuition_out_of_state: Option<f64>,
    #[serde(rename = "latest.cost.net_price.private_by_income_level.0_30000", default)]
    pub net_price_0_30k: Option<f64>,
    #[serde(rename = "latest.cost.net_price.private_by_income_level.30001_48000", default)]
    pub net_price_30_48k: Option<f64>,
    #[serde(rename = "latest.cost.net_price.private_by_income_level.48001_75000", default)]
    pub net_price_48_75k: Option<f64>,
    #[serde(rename = "latest.cost.net_price.private_by_income_level.75001_110000", default)]
    pub net_price_75_110k: Option<f64>,
    #[serde(rename = "latest.cost.net_price.private_by_income_level.110001_plus", default)]
    pub net_price_110k_plus: Option<f64>,
    #[serde(rename = "latest.student.retention_rate.four_year.full_time", default)]
    pub retention_rate: Option<f64>,
    #[serde(rename = "latest.completion.completion_rate_4yr_150nt", default)]
    pub completion_rate_4yr: Option<f64>,
    #[serde(rename = "latest.completion.completion_rate_6yr_150nt", default)]
    pub completion_rate_6yr: Option<f64>,
    #[serde(rename = "latest.earnings.6_yrs_after_entry.median", default)]
    pub earnings_6yr: Option<f64>,
    #[serde(rename = "latest.earnings.10_yrs_after_entry.median", default)]
    pub earnings_10yr: Option<f64>,
    #[serde(rename = "latest.aid.median_debt.completers.overall", default)]
    pub median_debt: Option<f64>,
}

/// Provider values of zero mean "not reported" for costs and rates.
#[inline]
fn reported(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

impl InstitutionRecord {
    /// Combined SAT midpoint, only when both sections are reported
    pub fn sat_total(&self) -> Option<f64> {
        match (reported(self.sat_math_midpoint), reported(self.sat_reading_midpoint)) {
            (Some(math), Some(reading)) => Some(math + reading),
            _ => None,
        }
    }

    pub fn act_composite(&self) -> Option<f64> {
        reported(self.act_midpoint)
    }

    pub fn admit_rate(&self) -> Option<f64> {
        self.admission_rate.filter(|r| r.is_finite())
    }

    /// Annual cost used for budget checks: sticker price, then average net
    /// price, then in-state tuition, then out-of-state tuition.
    pub fn cost(&self) -> Option<f64> {
        reported(self.cost_of_attendance)
            .or_else(|| reported(self.avg_net_price))
            .or_else(|| reported(self.tuition_in_state))
            .or_else(|| reported(self.tuition_out_of_state))
    }

    /// 4-year completion rate, falling back to the 6-year rate
    pub fn graduation_rate(&self) -> Option<f64> {
        reported(self.completion_rate_4yr).or_else(|| reported(self.completion_rate_6yr))
    }

    /// Enrollment, with zero read as not reported
    pub fn enrollment(&self) -> Option<u32> {
        self.size.filter(|size| *size > 0)
    }

    pub fn retention(&self) -> Option<f64> {
        reported(self.retention_rate)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown institution")
    }
}

/// Selectivity of an institution relative to a specific student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcademicTier {
    Reach,
    Target,
    Safety,
}

impl fmt::Display for AcademicTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AcademicTier::Reach => "reach",
            AcademicTier::Target => "target",
            AcademicTier::Safety => "safety",
        };
        f.write_str(label)
    }
}

/// Institution record annotated with its tier and fit score for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub college: InstitutionRecord,
    #[serde(rename = "academicTier")]
    pub academic_tier: AcademicTier,
    #[serde(rename = "fitScore")]
    pub fit_score: u8,
}

impl MatchResult {
    /// Copy of this result carrying a different tier
    pub fn with_tier(&self, academic_tier: AcademicTier) -> Self {
        Self {
            college: self.college.clone(),
            academic_tier,
            fit_score: self.fit_score,
        }
    }
}

/// Count of results per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub reach: usize,
    pub target: usize,
    pub safety: usize,
}

impl TierDistribution {
    pub fn from_matches(matches: &[MatchResult]) -> Self {
        matches.iter().fold(Self::default(), |mut dist, m| {
            match m.academic_tier {
                AcademicTier::Reach => dist.reach += 1,
                AcademicTier::Target => dist.target += 1,
                AcademicTier::Safety => dist.safety += 1,
            }
            dist
        })
    }

    pub fn total(&self) -> usize {
        self.reach + self.target + self.safety
    }
}

use crate::core::classifier::{act_gap, classify, sat_gap};
use crate::core::filters::FilterSet;
use crate::models::{InstitutionRecord, MatchResult, Setting, SizeBucket, StudentProfile};

/// Starting point for every institution
pub const BASE_SCORE: f64 = 35.0;
pub const ACADEMIC_MAX: f64 = 25.0;
pub const FINANCIAL_MAX: f64 = 20.0;
pub const OUTCOMES_MAX: f64 = 15.0;
pub const GEOGRAPHIC_MAX: f64 = 8.0;
pub const SIZE_MAX: f64 = 7.0;
pub const SETTING_MAX: f64 = 5.0;
/// Awarded when the student filled in any tier-3 preference list
pub const ENGAGEMENT_BONUS: f64 = 2.0;

/// Points earned on one scoring rule, with the sentence that explains them
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub points: f64,
    pub reason: Option<String>,
}

impl Contribution {
    fn new(points: f64) -> Self {
        Self { points, reason: None }
    }

    fn because(points: f64, reason: impl Into<String>) -> Self {
        Self {
            points,
            reason: Some(reason.into()),
        }
    }
}

#[inline]
fn percent(rate: f64) -> i64 {
    (rate * 100.0).round() as i64
}

/// Academic fit (0-25)
///
/// Peaks for admission rates near 50%. Without an admission rate the gap
/// between the school's test-score midpoint and the student's score is used.
pub fn academic_points(college: &InstitutionRecord, profile: &StudentProfile) -> Contribution {
    let contribution = if let Some(rate) = college.admit_rate() {
        let pct = percent(rate);
        if (0.30..=0.65).contains(&rate) {
            let points = (25.0 - (rate - 0.5).abs() * 30.0).max(10.0);
            Contribution::because(points, format!("Admission rate of {}% aligns with your academic profile", pct))
        } else if rate > 0.65 {
            Contribution::because(12.0 + (rate - 0.65) * 15.0, format!("High acceptance rate of {}%", pct))
        } else {
            Contribution::because(8.0 + (0.30 - rate) * 8.0, format!("Selective school with {}% admission rate", pct))
        }
    } else if let Some(gap) = sat_gap(college, profile) {
        let diff = gap.abs();
        let points = if diff <= 50.0 {
            22.0
        } else if diff <= 100.0 {
            18.0
        } else if diff <= 150.0 {
            14.0
        } else {
            10.0
        };
        Contribution::because(points, "SAT scores align with school's typical range")
    } else if let Some(gap) = act_gap(college, profile) {
        let diff = gap.abs();
        let points = if diff <= 2.0 {
            22.0
        } else if diff <= 4.0 {
            18.0
        } else {
            14.0
        };
        Contribution::because(points, "ACT scores align with school's typical range")
    } else {
        Contribution::because(15.0, "Academic match based on profile")
    };

    Contribution {
        points: contribution.points.min(ACADEMIC_MAX),
        ..contribution
    }
}

/// Financial fit (0-20) from the cost-to-budget ratio, or absolute cost bands
pub fn financial_points(cost: Option<f64>, budget: Option<f64>) -> Contribution {
    match (cost, budget) {
        (Some(cost), Some(budget)) => {
            let ratio = cost / budget;
            if ratio <= 0.6 {
                Contribution::because(20.0, format!("Well within your budget ({}% under)", percent(1.0 - ratio)))
            } else if ratio <= 0.8 {
                Contribution::because(17.0, "Comfortably within your budget")
            } else if ratio <= 1.0 {
                Contribution::because(14.0, "Fits your budget")
            } else if ratio <= 1.1 {
                Contribution::because(8.0, format!("Slightly over budget ({}% over)", percent(ratio - 1.0)))
            } else if ratio <= 1.2 {
                Contribution::because(4.0, "Moderately over budget")
            } else {
                Contribution::because(0.0, "Significantly over budget")
            }
        }
        (Some(cost), None) => {
            if cost <= 20_000.0 {
                Contribution::because(15.0, "Affordable option")
            } else if cost <= 30_000.0 {
                Contribution::because(12.0, "Moderate cost")
            } else if cost <= 40_000.0 {
                Contribution::because(9.0, "Higher cost")
            } else {
                Contribution::because(6.0, "Expensive option")
            }
        }
        (None, _) => Contribution::because(10.0, "Cost information not available"),
    }
}

/// Graduation-rate share of the outcomes dimension (0-9)
pub fn graduation_points(rate: Option<f64>) -> Contribution {
    let Some(rate) = rate else {
        return Contribution::new(0.0);
    };
    let pct = percent(rate);
    if rate >= 0.85 {
        Contribution::because(9.0, format!("Excellent graduation rate of {}%", pct))
    } else if rate >= 0.75 {
        Contribution::because(7.0, format!("Strong graduation rate of {}%", pct))
    } else if rate >= 0.65 {
        Contribution::because(5.0, format!("Good graduation rate of {}%", pct))
    } else if rate >= 0.55 {
        Contribution::because(3.0, format!("Moderate graduation rate of {}%", pct))
    } else {
        Contribution::new(1.0)
    }
}

/// Retention-rate share of the outcomes dimension (0-6)
pub fn retention_points(rate: Option<f64>) -> Contribution {
    let Some(rate) = rate else {
        return Contribution::new(0.0);
    };
    let pct = percent(rate);
    if rate >= 0.90 {
        Contribution::because(6.0, format!("Excellent retention rate of {}%", pct))
    } else if rate >= 0.85 {
        Contribution::because(5.0, format!("Strong retention rate of {}%", pct))
    } else if rate >= 0.80 {
        Contribution::new(4.0)
    } else if rate >= 0.75 {
        Contribution::new(2.0)
    } else {
        Contribution::new(1.0)
    }
}

/// Geographic fit (4 or 8)
pub fn geographic_points(college: &InstitutionRecord, preferred_states: &[String]) -> Contribution {
    match college.state.as_deref() {
        Some(state) if preferred_states.iter().any(|s| s == state) => {
            Contribution::because(GEOGRAPHIC_MAX, "Located in your preferred region")
        }
        _ => Contribution::new(4.0),
    }
}

/// Size fit (0-7)
pub fn size_points(college: &InstitutionRecord, preferred: &[SizeBucket]) -> Contribution {
    match college.enrollment() {
        Some(size) if !preferred.is_empty() => {
            if preferred.iter().any(|bucket| bucket.contains(size)) {
                Contribution::because(SIZE_MAX, "Matches your preferred school size")
            } else {
                Contribution::new(3.0)
            }
        }
        Some(_) => Contribution::new(4.0),
        None => Contribution::new(0.0),
    }
}

/// Campus setting fit (0-5)
pub fn setting_points(college: &InstitutionRecord, preferred: &[Setting]) -> Contribution {
    match college.locale {
        Some(locale) if !preferred.is_empty() => {
            if preferred.iter().any(|setting| setting.contains(locale)) {
                Contribution::because(SETTING_MAX, "Matches your preferred campus setting")
            } else {
                Contribution::new(2.0)
            }
        }
        Some(_) => Contribution::new(3.0),
        None => Contribution::new(0.0),
    }
}

/// Points earned on each dimension of the bulk fit score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitComponents {
    pub academic: f64,
    pub financial: f64,
    pub outcomes: f64,
    pub geographic: f64,
    pub size: f64,
    pub setting: f64,
    pub engagement: f64,
}

impl FitComponents {
    /// Unclamped sum including the base score
    pub fn total(&self) -> f64 {
        BASE_SCORE
            + self.academic
            + self.financial
            + self.outcomes
            + self.geographic
            + self.size
            + self.setting
            + self.engagement
    }

    /// Final 0-100 score
    pub fn score(&self) -> u8 {
        self.total().clamp(0.0, 100.0).round() as u8
    }
}

/// Score every dimension of one institution for one student
pub fn score_components(
    college: &InstitutionRecord,
    profile: &StudentProfile,
    filters: &FilterSet,
) -> FitComponents {
    let budget = filters.client.max_budget.or_else(|| profile.budget());
    let outcomes = graduation_points(college.graduation_rate()).points
        + retention_points(college.retention()).points;

    FitComponents {
        academic: academic_points(college, profile).points,
        financial: financial_points(college.cost(), budget).points,
        outcomes: outcomes.min(OUTCOMES_MAX),
        geographic: geographic_points(college, &filters.api.states).points,
        size: size_points(college, &filters.client.size_buckets).points,
        setting: setting_points(college, &filters.client.settings).points,
        engagement: if profile.has_engagement_preferences() { ENGAGEMENT_BONUS } else { 0.0 },
    }
}

/// Classify and score a single institution
///
/// Without explicit filters, the ones implied by the profile are used.
pub fn calculate_fit_score(
    college: &InstitutionRecord,
    profile: &StudentProfile,
    filters: Option<&FilterSet>,
) -> MatchResult {
    let derived;
    let filters = match filters {
        Some(filters) => filters,
        None => {
            derived = FilterSet::from_profile(profile);
            &derived
        }
    };

    MatchResult {
        college: college.clone(),
        academic_tier: classify(college, profile),
        fit_score: score_components(college, profile, filters).score(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AcademicTier, Region};

    fn create_college() -> InstitutionRecord {
        InstitutionRecord {
            id: 100,
            name: Some("Evergreen State".to_string()),
            state: Some("WA".to_string()),
            size: Some(4_000),
            locale: Some(31),
            admission_rate: Some(0.5),
            cost_of_attendance: Some(12_000.0),
            completion_rate_4yr: Some(0.9),
            retention_rate: Some(0.92),
            ..Default::default()
        }
    }

    #[test]
    fn test_academic_peak_at_fifty_percent() {
        let profile = StudentProfile::default();
        let college = create_college();
        assert_eq!(academic_points(&college, &profile).points, 25.0);

        let mut selective = create_college();
        selective.admission_rate = Some(0.10);
        let points = academic_points(&selective, &profile).points;
        assert!((points - 9.6).abs() < 1e-9);

        let mut open = create_college();
        open.admission_rate = Some(0.95);
        let points = academic_points(&open, &profile).points;
        assert!((points - 16.5).abs() < 1e-9);
    }

    #[test]
    fn test_academic_test_score_bands() {
        let profile = StudentProfile {
            sat_score: Some(1300.0),
            ..Default::default()
        };
        let mut college = create_college();
        college.admission_rate = None;
        college.sat_math_midpoint = Some(700.0);
        college.sat_reading_midpoint = Some(690.0);
        assert_eq!(academic_points(&college, &profile).points, 18.0);

        college.sat_math_midpoint = None;
        assert_eq!(academic_points(&college, &profile).points, 15.0);
    }

    #[test]
    fn test_financial_bands() {
        assert_eq!(financial_points(Some(12_000.0), Some(20_000.0)).points, 20.0);
        assert_eq!(financial_points(Some(16_000.0), Some(20_000.0)).points, 17.0);
        assert_eq!(financial_points(Some(20_000.0), Some(20_000.0)).points, 14.0);
        assert_eq!(financial_points(Some(21_000.0), Some(20_000.0)).points, 8.0);
        assert_eq!(financial_points(Some(24_000.0), Some(20_000.0)).points, 4.0);
        assert_eq!(financial_points(Some(40_000.0), Some(20_000.0)).points, 0.0);
        assert_eq!(financial_points(Some(35_000.0), None).points, 9.0);
        assert_eq!(financial_points(None, Some(20_000.0)).points, 10.0);
    }

    #[test]
    fn test_well_within_budget_reason() {
        let contribution = financial_points(Some(12_000.0), Some(20_000.0));
        assert_eq!(contribution.reason.as_deref(), Some("Well within your budget (40% under)"));
    }

    #[test]
    fn test_outcome_bands() {
        assert_eq!(graduation_points(Some(0.86)).points, 9.0);
        assert_eq!(graduation_points(Some(0.40)).points, 1.0);
        assert_eq!(graduation_points(None).points, 0.0);
        assert_eq!(retention_points(Some(0.82)).points, 4.0);
        assert_eq!(retention_points(None).points, 0.0);
    }

    #[test]
    fn test_size_and_setting_partial_credit() {
        let college = create_college();
        assert_eq!(size_points(&college, &[SizeBucket::Small]).points, 7.0);
        assert_eq!(size_points(&college, &[SizeBucket::Large]).points, 3.0);
        assert_eq!(size_points(&college, &[]).points, 4.0);
        assert_eq!(setting_points(&college, &[Setting::Town]).points, 5.0);
        assert_eq!(setting_points(&college, &[Setting::City]).points, 2.0);
        assert_eq!(setting_points(&college, &[]).points, 3.0);

        let unknown = InstitutionRecord::default();
        assert_eq!(size_points(&unknown, &[SizeBucket::Small]).points, 0.0);
        assert_eq!(setting_points(&unknown, &[Setting::Town]).points, 0.0);
    }

    #[test]
    fn test_full_score_is_clamped() {
        let profile = StudentProfile {
            preferred_regions: vec![Region::PacificNorthwest],
            preferred_size: vec![SizeBucket::Small],
            preferred_setting: vec![Setting::Town],
            max_annual_budget: Some(20_000.0),
            campus_culture: vec!["collaborative".to_string()],
            ..Default::default()
        };

        let result = calculate_fit_score(&create_college(), &profile, None);

        // 35 + 25 + 20 + 15 + 8 + 7 + 5 + 2 = 117
        assert_eq!(result.fit_score, 100);
        assert_eq!(result.academic_tier, AcademicTier::Target);
    }

    #[test]
    fn test_sparse_record_scores_neutral() {
        let college = InstitutionRecord { id: 5, ..Default::default() };
        let result = calculate_fit_score(&college, &StudentProfile::default(), None);

        // 35 base + 15 academic + 10 financial + 4 geographic
        assert_eq!(result.fit_score, 64);
    }

    #[test]
    fn test_calculate_fit_score_is_deterministic() {
        let profile = StudentProfile {
            sat_score: Some(1350.0),
            max_annual_budget: Some(30_000.0),
            ..Default::default()
        };
        let college = create_college();

        let first = calculate_fit_score(&college, &profile, None);
        let second = calculate_fit_score(&college, &profile, None);
        assert_eq!(first, second);
    }
}

use crate::core::classifier::classify;
use crate::core::regions::{expand_regions, is_in_regions};
use crate::core::scoring::{
    academic_points, financial_points, geographic_points, graduation_points, retention_points,
    setting_points, size_points, Contribution, ACADEMIC_MAX, FINANCIAL_MAX, OUTCOMES_MAX,
};
use crate::models::{
    AcademicTier, AidNeed, CourseRigor, DetailedFit, DimensionScore, FitBreakdown, FitPercentages,
    IncomeBracket, InstitutionRecord, StudentProfile,
};

pub const ENVIRONMENTAL_MAX: f64 = 20.0;
/// Bonus for schools in the student's home state
pub const IN_STATE_BONUS: f64 = 2.0;
/// Financial bonus when aid is critical and completers graduate with little debt
pub const LOW_DEBT_AID_BONUS: f64 = 3.0;
/// Median completer debt below which a school is treated as meeting need
pub const LOW_DEBT_THRESHOLD: f64 = 10_000.0;

const SUMMARY_REASON_LIMIT: usize = 3;
const STRONG_GRADUATION_RATE: f64 = 0.80;
const DEFAULT_SUMMARY: &str = "A solid match based on your profile";

fn push_reason(dimension: &mut DimensionScore, contribution: Contribution) {
    if let Some(reason) = contribution.reason {
        dimension.reasons.push(reason);
    }
}

/// Explain how one institution fits a student, dimension by dimension
///
/// Unlike the bulk score, this view reads the student's tier-2 answers: class
/// rank, course rigor and advanced coursework scale the academic points;
/// household income, residency and aid need refine the financial points.
pub fn calculate_detailed_fit_scores(
    college: &InstitutionRecord,
    profile: &StudentProfile,
) -> DetailedFit {
    let academic = academic_fit(college, profile);
    let financial = financial_fit(college, profile);
    let environmental = environmental_fit(college, profile);
    let outcomes = outcomes_fit(college);

    let total_max = academic.max + financial.max + environmental.max + outcomes.max;
    let total_score = academic.score + financial.score + environmental.score + outcomes.score;
    let overall = ((total_score / total_max) * 100.0).round().clamp(0.0, 100.0) as u8;

    let academic_tier = classify(college, profile);
    let scores = FitPercentages {
        academic: academic.percent(),
        financial: financial.percent(),
        environmental: environmental.percent(),
        outcomes: outcomes.percent(),
        overall,
    };

    DetailedFit {
        academic_tier,
        summary: fit_summary(college, academic_tier, profile),
        scores,
        details: FitBreakdown {
            academic,
            financial,
            environmental,
            outcomes,
            overall,
        },
    }
}

fn class_rank_multiplier(percentile: f64) -> (f64, Option<String>) {
    let (multiplier, template) = if percentile >= 99.0 {
        (1.15, Some(("Top 1%", "significantly strengthens your application")))
    } else if percentile >= 95.0 {
        (1.10, Some(("Top 5%", "strengthens your application")))
    } else if percentile >= 90.0 {
        (1.05, Some(("Top 10%", "supports your application")))
    } else if percentile >= 75.0 {
        (1.02, Some(("Top 25%", "is a positive factor")))
    } else {
        (1.0, None)
    };

    let reason = match template {
        Some((band, effect)) => Some(format!(
            "Your {} class rank ({}th percentile) {}",
            band, percentile, effect
        )),
        None if percentile >= 50.0 => Some(format!(
            "Your class rank ({}th percentile) is considered",
            percentile
        )),
        None => None,
    };
    (multiplier, reason)
}

fn rigor_multiplier(rigor: CourseRigor) -> f64 {
    match rigor {
        CourseRigor::MostRigorous => 1.15,
        CourseRigor::VeryRigorous => 1.10,
        CourseRigor::Rigorous => 1.05,
        CourseRigor::Average => 1.0,
        CourseRigor::LessRigorous => 0.95,
    }
}

fn coursework_breakdown(profile: &StudentProfile) -> String {
    [
        (profile.ap_courses, "AP"),
        (profile.ib_courses, "IB"),
        (profile.dual_enrollment, "dual enrollment"),
        (profile.honors_courses, "honors"),
    ]
    .iter()
    .filter_map(|(count, label)| match count {
        Some(n) if *n > 0 => Some(format!("{} {}", n, label)),
        _ => None,
    })
    .collect::<Vec<_>>()
    .join(", ")
}

fn academic_fit(college: &InstitutionRecord, profile: &StudentProfile) -> DimensionScore {
    let mut dimension = DimensionScore::new(ACADEMIC_MAX);
    let base = academic_points(college, profile);
    let base_points = base.points;
    push_reason(&mut dimension, base);

    let mut multiplier = 1.0;

    if let Some(percentile) = profile.class_rank_percentile {
        let (boost, reason) = class_rank_multiplier(percentile);
        multiplier *= boost;
        dimension.reasons.extend(reason);
    }

    if let Some(rigor) = profile.course_rigor {
        multiplier *= rigor_multiplier(rigor);
        let preparation = match rigor {
            CourseRigor::MostRigorous | CourseRigor::VeryRigorous => "strong",
            CourseRigor::Rigorous => "solid",
            CourseRigor::Average | CourseRigor::LessRigorous => "adequate",
        };
        dimension.reasons.push(format!(
            "Your {} course load (compared to peers) demonstrates {} academic preparation",
            rigor.label(),
            preparation
        ));
    }

    let total = profile.advanced_course_total();
    if total > 0 {
        let breakdown = coursework_breakdown(profile);
        let (boost, reason) = if total >= 10 {
            (1.08, format!("Strong advanced coursework: {} courses ({} total) enhance your profile", breakdown, total))
        } else if total >= 6 {
            (1.05, format!("Good advanced coursework: {} courses ({} total) strengthen your application", breakdown, total))
        } else if total >= 3 {
            (1.02, format!("Your advanced coursework: {} courses ({} total) is considered", breakdown, total))
        } else {
            (1.0, format!("Your advanced coursework: {} courses", breakdown))
        };
        multiplier *= boost;
        dimension.reasons.push(reason);
    }

    dimension.score = (base_points * multiplier).min(ACADEMIC_MAX);
    dimension
}

/// Net price published for the student's income bracket, if any
fn income_net_price(college: &InstitutionRecord, bracket: IncomeBracket) -> Option<f64> {
    let price = match bracket {
        IncomeBracket::Under30k => college.net_price_0_30k,
        IncomeBracket::From30kTo48k => college.net_price_30_48k,
        IncomeBracket::From48kTo75k => college.net_price_48_75k,
        IncomeBracket::From75kTo110k => college.net_price_75_110k,
        IncomeBracket::Over150k => college.net_price_110k_plus,
        IncomeBracket::From110kTo150k | IncomeBracket::PreferNotSay => None,
    };
    price.filter(|p| p.is_finite() && *p > 0.0)
}

fn financial_fit(college: &InstitutionRecord, profile: &StudentProfile) -> DimensionScore {
    let mut dimension = DimensionScore::new(FINANCIAL_MAX);
    let school_state = college.state.as_deref();
    let residence = profile.state_residence.as_deref().filter(|s| !s.is_empty());

    let mut cost = None;
    if let Some(bracket) = profile.household_income.filter(|b| *b != IncomeBracket::PreferNotSay) {
        cost = income_net_price(college, bracket);
        if cost.is_some() {
            dimension.reasons.push(format!(
                "Using net price for your household income ({}) - more accurate than sticker price",
                bracket.label()
            ));
        } else {
            dimension.reasons.push(format!(
                "Your household income ({}) is considered for financial aid eligibility",
                bracket.label()
            ));
        }
    }

    match (residence, school_state) {
        (Some(home), Some(state)) if home == state => {
            if cost.is_none() {
                let reported = |value: Option<f64>| value.filter(|c| c.is_finite() && *c > 0.0);
                cost = reported(college.tuition_in_state).or_else(|| reported(college.cost_of_attendance));
                if cost.is_some() {
                    dimension.reasons.push(format!("In-state tuition applies (you're a {} resident)", home));
                }
            }
        }
        (Some(home), Some(_)) => {
            dimension
                .reasons
                .push(format!("Out-of-state tuition applies (you're a {} resident)", home));
        }
        _ => {}
    }

    let cost = cost.or_else(|| college.cost());
    let budget = profile.budget();
    let banded = financial_points(cost, budget);
    dimension.score = banded.points;
    push_reason(&mut dimension, banded);

    if cost.is_some() && budget.is_some() {
        if let Some(need) = profile.financial_aid_need.filter(|n| *n != AidNeed::NotImportant) {
            dimension.reasons.push(format!("Financial aid is {} to you", need.label()));

            let low_debt = college
                .median_debt
                .is_some_and(|debt| debt < LOW_DEBT_THRESHOLD);
            if need == AidNeed::Critical && low_debt {
                dimension.score = (dimension.score + LOW_DEBT_AID_BONUS).min(FINANCIAL_MAX);
                dimension
                    .reasons
                    .push("Strong financial aid program (critical for your needs)".to_string());
            }
        }
    }

    dimension
}

fn environmental_fit(college: &InstitutionRecord, profile: &StudentProfile) -> DimensionScore {
    let mut dimension = DimensionScore::new(ENVIRONMENTAL_MAX);
    let preferred_states = expand_regions(&profile.preferred_regions);

    let geographic = geographic_points(college, &preferred_states);
    let size = size_points(college, &profile.preferred_size);
    let setting = setting_points(college, &profile.preferred_setting);

    let in_state = match (profile.state_residence.as_deref(), college.state.as_deref()) {
        (Some(home), Some(state)) => !home.is_empty() && home == state,
        _ => false,
    };

    let mut points = geographic.points + size.points + setting.points;
    push_reason(&mut dimension, geographic);
    if in_state {
        points += IN_STATE_BONUS;
        dimension
            .reasons
            .push("In-state school (reduces costs and travel)".to_string());
    }
    push_reason(&mut dimension, size);
    push_reason(&mut dimension, setting);

    if dimension.reasons.is_empty() {
        dimension
            .reasons
            .push("Environmental fit based on preferences".to_string());
    }

    dimension.score = points.min(ENVIRONMENTAL_MAX);
    dimension
}

fn outcomes_fit(college: &InstitutionRecord) -> DimensionScore {
    let mut dimension = DimensionScore::new(OUTCOMES_MAX);

    let graduation = graduation_points(college.graduation_rate());
    let retention = retention_points(college.retention());
    dimension.score = (graduation.points + retention.points).min(OUTCOMES_MAX);
    push_reason(&mut dimension, graduation);
    push_reason(&mut dimension, retention);

    if dimension.reasons.is_empty() {
        dimension.reasons.push("Outcomes data not available".to_string());
    }
    dimension
}

/// One-line summary of why a school fits, built from at most three reasons
pub fn fit_summary(college: &InstitutionRecord, tier: AcademicTier, profile: &StudentProfile) -> String {
    let mut reasons: Vec<String> = Vec::new();

    match (tier, college.admit_rate()) {
        (AcademicTier::Target, Some(rate)) => reasons.push(format!(
            "Strong academic match with {}% admission rate",
            (rate * 100.0).round() as i64
        )),
        (AcademicTier::Safety, _) => {
            reasons.push("Excellent safety school with high acceptance probability".to_string())
        }
        (AcademicTier::Reach, _) => reasons.push("Competitive reach school worth considering".to_string()),
        (AcademicTier::Target, None) => {}
    }

    match (college.cost(), profile.budget()) {
        (Some(cost), Some(budget)) => {
            let ratio = cost / budget;
            if ratio <= 0.8 {
                reasons.push("Well within your budget".to_string());
            } else if ratio <= 1.0 {
                reasons.push("Fits your budget".to_string());
            }
        }
        (Some(cost), None) if cost <= 20_000.0 => reasons.push("Affordable option".to_string()),
        _ => {}
    }

    if college
        .state
        .as_deref()
        .is_some_and(|state| is_in_regions(state, &profile.preferred_regions))
    {
        reasons.push("Located in your preferred region".to_string());
    }

    if let Some(size) = college.enrollment() {
        if profile.preferred_size.iter().any(|bucket| bucket.contains(size)) {
            reasons.push("Matches your preferred school size".to_string());
        }
    }

    if let Some(locale) = college.locale {
        if profile.preferred_setting.iter().any(|setting| setting.contains(locale)) {
            reasons.push("Matches your preferred campus setting".to_string());
        }
    }

    if college
        .graduation_rate()
        .is_some_and(|rate| rate >= STRONG_GRADUATION_RATE)
    {
        reasons.push("Strong graduation rate".to_string());
    }

    if reasons.is_empty() {
        return DEFAULT_SUMMARY.to_string();
    }

    reasons.truncate(SUMMARY_REASON_LIMIT);
    format!("{}.", reasons.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Region, Setting, SizeBucket};

    fn create_college() -> InstitutionRecord {
        InstitutionRecord {
            id: 42,
            name: Some("Lakeside University".to_string()),
            state: Some("OR".to_string()),
            size: Some(3_500),
            locale: Some(21),
            admission_rate: Some(0.5),
            cost_of_attendance: Some(40_000.0),
            tuition_in_state: Some(12_000.0),
            net_price_0_30k: Some(8_000.0),
            median_debt: Some(9_000.0),
            completion_rate_4yr: Some(0.78),
            retention_rate: Some(0.86),
            ..Default::default()
        }
    }

    #[test]
    fn test_academic_multipliers_are_capped() {
        let profile = StudentProfile {
            class_rank_percentile: Some(99.0),
            course_rigor: Some(CourseRigor::MostRigorous),
            ap_courses: Some(8),
            ib_courses: Some(4),
            ..Default::default()
        };

        let fit = calculate_detailed_fit_scores(&create_college(), &profile);

        assert_eq!(fit.details.academic.score, ACADEMIC_MAX);
        assert_eq!(fit.scores.academic, 100);
        assert!(fit
            .details
            .academic
            .reasons
            .iter()
            .any(|r| r.contains("8 AP, 4 IB courses (12 total)")));
    }

    #[test]
    fn test_less_rigorous_course_load_reduces_academic_points() {
        let mut college = create_college();
        college.admission_rate = Some(0.8);
        let profile = StudentProfile {
            course_rigor: Some(CourseRigor::LessRigorous),
            ..Default::default()
        };

        let fit = calculate_detailed_fit_scores(&college, &profile);

        // (12 + 15 * 0.15) * 0.95
        assert!((fit.details.academic.score - 13.5375).abs() < 1e-9);
    }

    #[test]
    fn test_income_net_price_preferred() {
        let profile = StudentProfile {
            household_income: Some(IncomeBracket::Under30k),
            max_annual_budget: Some(20_000.0),
            ..Default::default()
        };

        let fit = calculate_detailed_fit_scores(&create_college(), &profile);

        // 8000 / 20000 = 0.4 of budget
        assert_eq!(fit.details.financial.score, 20.0);
        assert!(fit.details.financial.reasons[0].starts_with("Using net price"));
    }

    #[test]
    fn test_in_state_tuition_and_environment_bonus() {
        let profile = StudentProfile {
            state_residence: Some("OR".to_string()),
            max_annual_budget: Some(13_000.0),
            ..Default::default()
        };

        let fit = calculate_detailed_fit_scores(&create_college(), &profile);

        // 12000 / 13000 is within budget
        assert_eq!(fit.details.financial.score, 14.0);
        // geographic 4 + in-state 2 + size 4 + setting 3
        assert_eq!(fit.details.environmental.score, 13.0);
        assert!(fit
            .details
            .environmental
            .reasons
            .contains(&"In-state school (reduces costs and travel)".to_string()));
    }

    #[test]
    fn test_zero_in_state_tuition_falls_back_to_attendance_cost() {
        let mut college = create_college();
        college.tuition_in_state = Some(0.0);
        let profile = StudentProfile {
            state_residence: Some("OR".to_string()),
            max_annual_budget: Some(50_000.0),
            ..Default::default()
        };

        let fit = calculate_detailed_fit_scores(&college, &profile);

        // 40000 / 50000 is comfortably within budget
        assert_eq!(fit.details.financial.score, 17.0);
        assert_eq!(
            fit.details.financial.reasons[0],
            "In-state tuition applies (you're a OR resident)"
        );
    }

    #[test]
    fn test_critical_aid_low_debt_bonus() {
        let profile = StudentProfile {
            financial_aid_need: Some(AidNeed::Critical),
            max_annual_budget: Some(40_000.0),
            ..Default::default()
        };

        let fit = calculate_detailed_fit_scores(&create_college(), &profile);

        assert_eq!(fit.details.financial.score, 17.0);
        assert!(fit
            .details
            .financial
            .reasons
            .contains(&"Strong financial aid program (critical for your needs)".to_string()));
    }

    #[test]
    fn test_environment_capped_at_twenty() {
        let profile = StudentProfile {
            state_residence: Some("OR".to_string()),
            preferred_regions: vec![Region::PacificNorthwest],
            preferred_size: vec![SizeBucket::Small],
            preferred_setting: vec![Setting::Suburb],
            ..Default::default()
        };

        let fit = calculate_detailed_fit_scores(&create_college(), &profile);
        assert_eq!(fit.details.environmental.score, ENVIRONMENTAL_MAX);
    }

    #[test]
    fn test_missing_outcomes() {
        let college = InstitutionRecord { id: 1, ..Default::default() };
        let fit = calculate_detailed_fit_scores(&college, &StudentProfile::default());

        assert_eq!(fit.details.outcomes.score, 0.0);
        assert_eq!(fit.details.outcomes.reasons, vec!["Outcomes data not available".to_string()]);
        assert_eq!(
            fit.details.environmental.reasons,
            vec!["Environmental fit based on preferences".to_string()]
        );
    }

    #[test]
    fn test_overall_is_share_of_total_points() {
        let fit = calculate_detailed_fit_scores(&create_college(), &StudentProfile::default());
        let details = &fit.details;
        let expected = ((details.academic.score
            + details.financial.score
            + details.environmental.score
            + details.outcomes.score)
            / 80.0
            * 100.0)
            .round() as u8;
        assert_eq!(fit.scores.overall, expected);
        assert_eq!(details.overall, expected);
    }

    #[test]
    fn test_fit_summary_limits_reasons() {
        let profile = StudentProfile {
            preferred_regions: vec![Region::WestCoast],
            preferred_size: vec![SizeBucket::Small],
            max_annual_budget: Some(60_000.0),
            ..Default::default()
        };

        let summary = fit_summary(&create_college(), AcademicTier::Target, &profile);

        assert_eq!(
            summary,
            "Strong academic match with 50% admission rate, Well within your budget, Located in your preferred region."
        );
    }

    #[test]
    fn test_fit_summary_default() {
        let college = InstitutionRecord { id: 9, ..Default::default() };
        let summary = fit_summary(&college, AcademicTier::Target, &StudentProfile::default());
        assert_eq!(summary, DEFAULT_SUMMARY);
    }
}

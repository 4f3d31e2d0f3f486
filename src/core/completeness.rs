use crate::models::{ProfileCompleteness, StudentProfile};

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Core questions: academics, budget, location and size preferences
fn tier1_answers(profile: &StudentProfile) -> [bool; 9] {
    [
        profile.gpa.is_some(),
        profile.sat_score.is_some(),
        profile.act_score.is_some(),
        profile.max_annual_budget.is_some(),
        !profile.preferred_regions.is_empty(),
        !profile.preferred_size.is_empty(),
        !profile.preferred_setting.is_empty(),
        !profile.major_interests.is_empty(),
        has_text(&profile.state_residence),
    ]
}

/// Academic detail and family finances
fn tier2_answers(profile: &StudentProfile) -> [bool; 8] {
    [
        profile.class_rank_percentile.is_some(),
        profile.course_rigor.is_some(),
        profile.ap_courses.is_some(),
        profile.ib_courses.is_some(),
        profile.dual_enrollment.is_some(),
        profile.honors_courses.is_some(),
        profile.household_income.is_some(),
        profile.financial_aid_need.is_some(),
    ]
}

/// Campus life preferences
fn tier3_answers(profile: &StudentProfile) -> [bool; 5] {
    [
        !profile.extracurricular_priorities.is_empty(),
        !profile.special_programs.is_empty(),
        !profile.campus_culture.is_empty(),
        !profile.deal_breakers.is_empty(),
        has_text(&profile.weather_preference),
    ]
}

#[inline]
fn percentage(answered: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((answered as f64 / total as f64) * 100.0).round() as u8
}

fn count(answers: &[bool]) -> usize {
    answers.iter().filter(|answered| **answered).count()
}

impl ProfileCompleteness {
    /// Measure how much of the questionnaire a profile covers
    pub fn assess(profile: &StudentProfile) -> Self {
        let tier1 = tier1_answers(profile);
        let tier2 = tier2_answers(profile);
        let tier3 = tier3_answers(profile);

        let answered = count(&tier1) + count(&tier2) + count(&tier3);
        let total = tier1.len() + tier2.len() + tier3.len();

        Self {
            overall: percentage(answered, total),
            tier1: percentage(count(&tier1), tier1.len()),
            tier2: percentage(count(&tier2), tier2.len()),
            tier3: percentage(count(&tier3), tier3.len()),
            can_generate_matches: count(&tier1) > 0,
        }
    }
}

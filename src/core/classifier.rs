use crate::models::{AcademicTier, InstitutionRecord, StudentProfile};

/// Admission rate below which a school is a reach
pub const REACH_ADMIT_RATE: f64 = 0.40;
/// Admission rate above which a school is a safety
pub const SAFETY_ADMIT_RATE: f64 = 0.65;
/// SAT midpoint gap (school minus student) that decides reach/safety
pub const SAT_TIER_GAP: f64 = 50.0;
/// SAT gap that overrides a target classification to reach
pub const SAT_REACH_OVERRIDE_GAP: f64 = 40.0;
/// ACT composite gap that decides reach/safety and the reach override
pub const ACT_TIER_GAP: f64 = 2.0;
/// GPA below which a school with no selectivity data is a reach
pub const LOW_GPA: f64 = 3.0;

/// Classify an institution as reach, target, or safety for this student
///
/// Signals are tried in order: admission rate, SAT midpoint gap, ACT midpoint
/// gap, then GPA alone. A target result is pushed to reach when the school's
/// test scores sit well above the student's, even if the admission rate said
/// target. The override never pushes toward safety.
pub fn classify(college: &InstitutionRecord, profile: &StudentProfile) -> AcademicTier {
    let sat_gap = sat_gap(college, profile);
    let act_gap = act_gap(college, profile);

    let tier = if let Some(rate) = college.admit_rate() {
        tier_from_admit_rate(rate)
    } else if let Some(gap) = sat_gap {
        tier_from_gap(gap, SAT_TIER_GAP)
    } else if let Some(gap) = act_gap {
        tier_from_gap(gap, ACT_TIER_GAP)
    } else if profile.gpa_or_default() < LOW_GPA {
        AcademicTier::Reach
    } else {
        AcademicTier::Target
    };

    if tier == AcademicTier::Target
        && (sat_gap.is_some_and(|gap| gap > SAT_REACH_OVERRIDE_GAP)
            || act_gap.is_some_and(|gap| gap > ACT_TIER_GAP))
    {
        return AcademicTier::Reach;
    }

    tier
}

#[inline]
fn tier_from_admit_rate(rate: f64) -> AcademicTier {
    if rate < REACH_ADMIT_RATE {
        AcademicTier::Reach
    } else if rate > SAFETY_ADMIT_RATE {
        AcademicTier::Safety
    } else {
        AcademicTier::Target
    }
}

#[inline]
fn tier_from_gap(gap: f64, threshold: f64) -> AcademicTier {
    if gap > threshold {
        AcademicTier::Reach
    } else if gap < -threshold {
        AcademicTier::Safety
    } else {
        AcademicTier::Target
    }
}

/// School SAT midpoint total minus the student's SAT, when both are known
#[inline]
pub fn sat_gap(college: &InstitutionRecord, profile: &StudentProfile) -> Option<f64> {
    let student = profile.sat_score.filter(|s| *s > 0.0)?;
    college.sat_total().map(|school| school - student)
}

/// School ACT composite midpoint minus the student's ACT, when both are known
#[inline]
pub fn act_gap(college: &InstitutionRecord, profile: &StudentProfile) -> Option<f64> {
    let student = profile.act_score.filter(|s| *s > 0.0)?;
    college.act_composite().map(|school| school - student)
}

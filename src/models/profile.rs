use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// GPA assumed when the student has not reported one
pub const DEFAULT_GPA: f64 = 3.5;

/// Raised when a questionnaire answer is not one of the known option keys
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown answer option: {0}")]
pub struct UnknownAnswer(pub String);

/// Declares a questionnaire option set that round-trips through its answer key.
macro_rules! answer_options {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_key(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownAnswer;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok($name::$variant),)+
                    other => Err(UnknownAnswer(other.to_string())),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_key())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let key = String::deserialize(deserializer)?;
                key.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

answer_options! {
    /// Geographic region offered by the questionnaire
    Region {
        PacificNorthwest => "pacific-northwest",
        WestCoast => "west-coast",
        Southwest => "southwest",
        MountainWest => "mountain-west",
        Midwest => "midwest",
        South => "south",
        Southeast => "southeast",
        MidAtlantic => "mid-atlantic",
        Northeast => "northeast",
        NewEngland => "new-england",
    }
}

answer_options! {
    /// Enrollment size bucket
    SizeBucket {
        VerySmall => "very_small",
        Small => "small",
        Medium => "medium",
        Large => "large",
        VeryLarge => "very_large",
    }
}

answer_options! {
    /// Campus setting, backed by the provider's locale codes
    Setting {
        City => "city",
        Suburb => "suburb",
        Town => "town",
        Rural => "rural",
    }
}

answer_options! {
    DealBreaker {
        NoRural => "no_rural",
        NoUrban => "no_urban",
        NoLarge => "no_large",
        NoSmall => "no_small",
        None => "none",
    }
}

answer_options! {
    /// Course load relative to peers
    CourseRigor {
        MostRigorous => "most_rigorous",
        VeryRigorous => "very_rigorous",
        Rigorous => "rigorous",
        Average => "average",
        LessRigorous => "less_rigorous",
    }
}

answer_options! {
    IncomeBracket {
        Under30k => "under_30k",
        From30kTo48k => "30_48k",
        From48kTo75k => "48_75k",
        From75kTo110k => "75_110k",
        From110kTo150k => "110_150k",
        Over150k => "over_150k",
        PreferNotSay => "prefer_not_say",
    }
}

answer_options! {
    AidNeed {
        Critical => "critical",
        VeryImportant => "very_important",
        Important => "important",
        Somewhat => "somewhat",
        NotImportant => "not_important",
    }
}

impl SizeBucket {
    /// Half-open enrollment range `[min, max)`; the largest bucket is unbounded.
    pub fn range(self) -> (u32, Option<u32>) {
        match self {
            SizeBucket::VerySmall => (0, Some(1_000)),
            SizeBucket::Small => (1_000, Some(5_000)),
            SizeBucket::Medium => (5_000, Some(15_000)),
            SizeBucket::Large => (15_000, Some(25_000)),
            SizeBucket::VeryLarge => (25_000, None),
        }
    }

    #[inline]
    pub fn contains(self, size: u32) -> bool {
        let (min, max) = self.range();
        size >= min && max.map_or(true, |max| size < max)
    }
}

impl Setting {
    pub fn locales(self) -> &'static [u8] {
        match self {
            Setting::City => &[11, 12, 13],
            Setting::Suburb => &[21, 22, 23],
            Setting::Town => &[31, 32, 33],
            Setting::Rural => &[41, 42, 43],
        }
    }

    #[inline]
    pub fn contains(self, locale: u8) -> bool {
        self.locales().contains(&locale)
    }
}

impl CourseRigor {
    pub fn label(self) -> &'static str {
        match self {
            CourseRigor::MostRigorous => "most rigorous",
            CourseRigor::VeryRigorous => "very rigorous",
            CourseRigor::Rigorous => "rigorous",
            CourseRigor::Average => "average",
            CourseRigor::LessRigorous => "less rigorous",
        }
    }
}

impl IncomeBracket {
    pub fn label(self) -> &'static str {
        match self {
            IncomeBracket::Under30k => "under $30,000",
            IncomeBracket::From30kTo48k => "$30,000-$48,000",
            IncomeBracket::From48kTo75k => "$48,000-$75,000",
            IncomeBracket::From75kTo110k => "$75,000-$110,000",
            IncomeBracket::From110kTo150k => "$110,000-$150,000",
            IncomeBracket::Over150k => "over $150,000",
            IncomeBracket::PreferNotSay => "not disclosed",
        }
    }
}

impl AidNeed {
    pub fn label(self) -> &'static str {
        match self {
            AidNeed::Critical => "critical",
            AidNeed::VeryImportant => "very important",
            AidNeed::Important => "important",
            AidNeed::Somewhat => "somewhat important",
            AidNeed::NotImportant => "not important",
        }
    }
}

/// Questionnaire answers for one student
///
/// Every key is optional. A missing answer means "unknown" and is never read
/// as zero or false. List answers silently drop options this service does not
/// recognise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct StudentProfile {
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0))]
    pub gpa: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 400.0, max = 1600.0))]
    pub sat_score: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 1.0, max = 36.0))]
    pub act_score: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub class_rank_percentile: Option<f64>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub course_rigor: Option<CourseRigor>,
    #[serde(default)]
    pub ap_courses: Option<u32>,
    #[serde(default)]
    pub ib_courses: Option<u32>,
    #[serde(default)]
    pub dual_enrollment: Option<u32>,
    #[serde(default)]
    pub honors_courses: Option<u32>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub household_income: Option<IncomeBracket>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub financial_aid_need: Option<AidNeed>,
    #[serde(default)]
    pub state_residence: Option<String>,
    #[serde(default, deserialize_with = "budget_answer")]
    #[validate(range(min = 0.0))]
    pub max_annual_budget: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub preferred_regions: Vec<Region>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub preferred_size: Vec<SizeBucket>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub preferred_setting: Vec<Setting>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub deal_breakers: Vec<DealBreaker>,
    #[serde(default)]
    pub major_interests: Vec<String>,
    #[serde(default)]
    pub extracurricular_priorities: Vec<String>,
    #[serde(default)]
    pub special_programs: Vec<String>,
    #[serde(default)]
    pub campus_culture: Vec<String>,
    #[serde(default)]
    pub weather_preference: Option<String>,
}

impl StudentProfile {
    /// GPA with the neutral default applied
    pub fn gpa_or_default(&self) -> f64 {
        self.gpa.unwrap_or(DEFAULT_GPA)
    }

    /// Total AP, IB, dual-enrollment and honors courses
    pub fn advanced_course_total(&self) -> u32 {
        [self.ap_courses, self.ib_courses, self.dual_enrollment, self.honors_courses]
            .iter()
            .map(|count| count.unwrap_or(0))
            .sum()
    }

    /// Whether the student filled in any tier-3 preference list
    pub fn has_engagement_preferences(&self) -> bool {
        !self.extracurricular_priorities.is_empty()
            || !self.special_programs.is_empty()
            || !self.campus_culture.is_empty()
    }

    /// Deal-breakers in force, empty when the student chose "none"
    pub fn active_deal_breakers(&self) -> Vec<DealBreaker> {
        if self.deal_breakers.contains(&DealBreaker::None) {
            return Vec::new();
        }
        self.deal_breakers.clone()
    }

    /// Budget ceiling, ignoring non-positive or non-finite answers
    pub fn budget(&self) -> Option<f64> {
        self.max_annual_budget.filter(|b| b.is_finite() && *b > 0.0)
    }
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|key| key.parse().ok()))
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + PartialEq,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    let mut parsed: Vec<T> = Vec::new();
    for key in raw.unwrap_or_default() {
        if let Ok(option) = key.parse::<T>() {
            if !parsed.contains(&option) {
                parsed.push(option);
            }
        }
    }
    Ok(parsed)
}

/// Budget answers are a single ceiling; older clients sent a list of ceilings.
#[derive(Deserialize)]
#[serde(untagged)]
enum BudgetAnswer {
    Single(f64),
    Legacy(Vec<f64>),
}

fn budget_answer<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BudgetAnswer> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(BudgetAnswer::Single(value)) => Some(value),
        Some(BudgetAnswer::Legacy(values)) => values.into_iter().reduce(f64::max),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map_is_all_absent() {
        let profile: StudentProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile, StudentProfile::default());
        assert_eq!(profile.gpa_or_default(), DEFAULT_GPA);
    }

    #[test]
    fn test_lists_drop_unknown_options() {
        let profile: StudentProfile = serde_json::from_value(serde_json::json!({
            "preferred_regions": ["pacific-northwest", "atlantis", "pacific-northwest"],
            "preferred_size": ["small", "huge"],
            "deal_breakers": ["no_rural", "no_greek_life"]
        }))
        .unwrap();

        assert_eq!(profile.preferred_regions, vec![Region::PacificNorthwest]);
        assert_eq!(profile.preferred_size, vec![SizeBucket::Small]);
        assert_eq!(profile.deal_breakers, vec![DealBreaker::NoRural]);
    }

    #[test]
    fn test_legacy_budget_list_uses_maximum() {
        let profile: StudentProfile = serde_json::from_value(serde_json::json!({
            "max_annual_budget": [15000, 30000, 25000]
        }))
        .unwrap();
        assert_eq!(profile.max_annual_budget, Some(30000.0));

        let single: StudentProfile = serde_json::from_value(serde_json::json!({
            "max_annual_budget": 42000
        }))
        .unwrap();
        assert_eq!(single.budget(), Some(42000.0));
    }

    #[test]
    fn test_none_deal_breaker_disables_all() {
        let profile = StudentProfile {
            deal_breakers: vec![DealBreaker::NoLarge, DealBreaker::None],
            ..Default::default()
        };
        assert!(profile.active_deal_breakers().is_empty());
    }

    #[test]
    fn test_size_bucket_boundaries() {
        assert!(SizeBucket::VerySmall.contains(999));
        assert!(!SizeBucket::VerySmall.contains(1_000));
        assert!(SizeBucket::Small.contains(1_000));
        assert!(SizeBucket::VeryLarge.contains(80_000));
    }

    #[test]
    fn test_validation_rejects_out_of_range_scores() {
        let profile = StudentProfile {
            sat_score: Some(1700.0),
            ..Default::default()
        };
        assert!(profile.validate().is_err());

        let ok = StudentProfile {
            gpa: Some(3.7),
            act_score: Some(31.0),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_advanced_course_total() {
        let profile = StudentProfile {
            ap_courses: Some(5),
            honors_courses: Some(4),
            ..Default::default()
        };
        assert_eq!(profile.advanced_course_total(), 9);
    }
}

use crate::core::regions::expand_regions;
use crate::models::{DealBreaker, InstitutionRecord, Setting, SizeBucket, StudentProfile};

/// Enrollment above which `no_large` rejects an institution
const LARGE_SCHOOL_SIZE: u32 = 15_000;
/// Enrollment below which `no_small` rejects an institution
const SMALL_SCHOOL_SIZE: u32 = 3_000;

/// Filters sent to the data provider
///
/// Geography always partitions the fetch. The ranges mirror [`ClientFilters`]
/// and are only sent when the fetcher narrows server side, because the
/// provider drops institutions that lack a ranged field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiFilters {
    /// One retrieval partition per state; empty means a single broad fetch
    pub states: Vec<String>,
    /// Inclusive enrollment span of the selected size buckets, open above
    /// when the largest bucket is selected
    pub size_range: Option<(u32, Option<u32>)>,
    /// Locale-code span of the selected settings
    pub locale_range: Option<(u8, u8)>,
    /// Budget ceiling in whole dollars
    pub max_cost: Option<u32>,
}

/// Predicates applied to the merged candidate list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientFilters {
    pub size_buckets: Vec<SizeBucket>,
    pub settings: Vec<Setting>,
    pub deal_breakers: Vec<DealBreaker>,
    pub max_budget: Option<f64>,
}

/// Filters derived from one student profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub api: ApiFilters,
    pub client: ClientFilters,
}

impl FilterSet {
    /// Translate a profile into provider and client-side filters
    pub fn from_profile(profile: &StudentProfile) -> Self {
        let states = expand_regions(&profile.preferred_regions);
        if !states.is_empty() {
            tracing::debug!(
                "Regions {:?} expanded to {} states",
                profile.preferred_regions,
                states.len()
            );
        }

        Self {
            api: ApiFilters {
                states,
                size_range: size_span(&profile.preferred_size),
                locale_range: locale_span(&profile.preferred_setting),
                max_cost: profile.budget().map(|budget| budget.floor() as u32),
            },
            client: ClientFilters {
                size_buckets: profile.preferred_size.clone(),
                settings: profile.preferred_setting.clone(),
                deal_breakers: profile.active_deal_breakers(),
                max_budget: profile.budget(),
            },
        }
    }
}

fn size_span(buckets: &[SizeBucket]) -> Option<(u32, Option<u32>)> {
    let min = buckets.iter().map(|bucket| bucket.range().0).min()?;
    let max = buckets
        .iter()
        .map(|bucket| bucket.range().1.map(|upper| upper - 1))
        .try_fold(0, |acc, upper| upper.map(|u| acc.max(u)));
    Some((min, max))
}

fn locale_span(settings: &[Setting]) -> Option<(u8, u8)> {
    let locales = settings.iter().flat_map(|setting| setting.locales().iter().copied());
    let min = locales.clone().min()?;
    let max = locales.max()?;
    Some((min, max))
}

/// Size bucket filter. Missing or zero size passes.
#[inline]
pub fn passes_size(college: &InstitutionRecord, buckets: &[SizeBucket]) -> bool {
    if buckets.is_empty() {
        return true;
    }
    match college.enrollment() {
        Some(size) => buckets.iter().any(|bucket| bucket.contains(size)),
        None => true,
    }
}

/// Campus setting filter. Missing locale passes.
#[inline]
pub fn passes_setting(college: &InstitutionRecord, settings: &[Setting]) -> bool {
    if settings.is_empty() {
        return true;
    }
    match college.locale {
        Some(locale) => settings.iter().any(|setting| setting.contains(locale)),
        None => true,
    }
}

/// Hard exclusions. Each check only fires when the attribute it reads is known.
#[inline]
pub fn passes_deal_breakers(college: &InstitutionRecord, deal_breakers: &[DealBreaker]) -> bool {
    if deal_breakers.contains(&DealBreaker::None) {
        return true;
    }

    deal_breakers.iter().all(|deal_breaker| match deal_breaker {
        DealBreaker::NoRural => !college.locale.is_some_and(|l| Setting::Rural.contains(l)),
        DealBreaker::NoUrban => !college.locale.is_some_and(|l| Setting::City.contains(l)),
        DealBreaker::NoLarge => !college.enrollment().is_some_and(|s| s > LARGE_SCHOOL_SIZE),
        DealBreaker::NoSmall => !college.enrollment().is_some_and(|s| s < SMALL_SCHOOL_SIZE),
        DealBreaker::None => true,
    })
}

/// Budget ceiling filter (inclusive). Missing cost passes.
#[inline]
pub fn passes_budget(college: &InstitutionRecord, max_budget: Option<f64>) -> bool {
    match (max_budget, college.cost()) {
        (Some(budget), Some(cost)) => cost <= budget,
        _ => true,
    }
}

/// Apply every client-side filter in order: size, setting, deal-breakers, budget
pub fn apply_client_filters(
    candidates: Vec<InstitutionRecord>,
    filters: &ClientFilters,
) -> Vec<InstitutionRecord> {
    let before = candidates.len();

    let mut remaining: Vec<InstitutionRecord> = candidates
        .into_iter()
        .filter(|college| passes_size(college, &filters.size_buckets))
        .collect();
    if !filters.size_buckets.is_empty() {
        tracing::debug!("Size filter {:?}: {} -> {}", filters.size_buckets, before, remaining.len());
    }

    let before_setting = remaining.len();
    remaining.retain(|college| passes_setting(college, &filters.settings));
    if !filters.settings.is_empty() {
        tracing::debug!("Setting filter {:?}: {} -> {}", filters.settings, before_setting, remaining.len());
    }

    let before_deal_breakers = remaining.len();
    remaining.retain(|college| passes_deal_breakers(college, &filters.deal_breakers));
    if !filters.deal_breakers.is_empty() {
        tracing::debug!(
            "Deal-breaker filter {:?}: {} -> {}",
            filters.deal_breakers,
            before_deal_breakers,
            remaining.len()
        );
    }

    let before_budget = remaining.len();
    remaining.retain(|college| passes_budget(college, filters.max_budget));
    if let Some(budget) = filters.max_budget {
        tracing::debug!("Budget filter (max ${}): {} -> {}", budget, before_budget, remaining.len());
    }

    remaining
}

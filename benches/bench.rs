// Criterion benchmarks for the college matching pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use college_match::core::{
    apply_client_filters, calculate_detailed_fit_scores, calculate_fit_score, rebalance_tiers,
    FilterSet, Matcher,
};
use college_match::models::{
    AidNeed, CourseRigor, IncomeBracket, InstitutionRecord, MatchResult, Region, Setting,
    SizeBucket, StudentProfile,
};

const STATES: [&str; 8] = ["WA", "OR", "CA", "TX", "NY", "MA", "IL", "GA"];

fn create_college(id: usize) -> InstitutionRecord {
    InstitutionRecord {
        id: id as i64,
        name: Some(format!("College {}", id)),
        state: Some(STATES[id % STATES.len()].to_string()),
        size: Some(800 + (id as u32 * 337) % 40_000),
        locale: Some([11, 21, 31, 41][id % 4]),
        admission_rate: if id % 7 == 0 { None } else { Some(((id * 13) % 95 + 5) as f64 / 100.0) },
        sat_math_midpoint: Some(500.0 + (id % 20) as f64 * 12.0),
        sat_reading_midpoint: Some(500.0 + (id % 17) as f64 * 12.0),
        cost_of_attendance: Some(12_000.0 + (id % 50) as f64 * 1_000.0),
        net_price_48_75k: Some(9_000.0 + (id % 30) as f64 * 800.0),
        completion_rate_4yr: Some(((id * 7) % 90 + 10) as f64 / 100.0),
        retention_rate: Some(((id * 11) % 40 + 60) as f64 / 100.0),
        median_debt: Some(8_000.0 + (id % 12) as f64 * 1_500.0),
        ..Default::default()
    }
}

fn create_profile() -> StudentProfile {
    StudentProfile {
        gpa: Some(3.7),
        sat_score: Some(1340.0),
        class_rank_percentile: Some(88.0),
        course_rigor: Some(CourseRigor::VeryRigorous),
        ap_courses: Some(6),
        household_income: Some(IncomeBracket::From48kTo75k),
        financial_aid_need: Some(AidNeed::Critical),
        state_residence: Some("WA".to_string()),
        max_annual_budget: Some(40_000.0),
        preferred_regions: vec![Region::PacificNorthwest, Region::WestCoast],
        preferred_size: vec![SizeBucket::Small, SizeBucket::Medium],
        preferred_setting: vec![Setting::Suburb, Setting::Town],
        ..Default::default()
    }
}

fn bench_fit_score(c: &mut Criterion) {
    let college = create_college(42);
    let profile = create_profile();
    let filters = FilterSet::from_profile(&profile);

    c.bench_function("calculate_fit_score", |b| {
        b.iter(|| calculate_fit_score(black_box(&college), black_box(&profile), Some(&filters)));
    });
}

fn bench_detailed_fit(c: &mut Criterion) {
    let college = create_college(42);
    let profile = create_profile();

    c.bench_function("calculate_detailed_fit_scores", |b| {
        b.iter(|| calculate_detailed_fit_scores(black_box(&college), black_box(&profile)));
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::default();
    let profile = create_profile();
    let filters = FilterSet::from_profile(&profile);

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 100, 500, 1000].iter() {
        let candidates: Vec<InstitutionRecord> = (0..*candidate_count).map(create_college).collect();

        group.bench_with_input(
            BenchmarkId::new("find_matches", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    matcher.find_matches(
                        black_box(&profile),
                        black_box(&filters),
                        black_box(candidates.clone()),
                        black_box(50),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_filtering(c: &mut Criterion) {
    let profile = create_profile();
    let filters = FilterSet::from_profile(&profile);
    let candidates: Vec<InstitutionRecord> = (0..500).map(create_college).collect();

    c.bench_function("client_filters_500_candidates", |b| {
        b.iter(|| apply_client_filters(black_box(candidates.clone()), black_box(&filters.client)));
    });
}

fn bench_rebalance(c: &mut Criterion) {
    // GPA-only profile with no admission data: every result starts as target
    let profile = StudentProfile {
        gpa: Some(3.9),
        ..Default::default()
    };
    let results: Vec<MatchResult> = (0..200)
        .map(|id| {
            let college = InstitutionRecord {
                admission_rate: None,
                sat_math_midpoint: None,
                sat_reading_midpoint: None,
                ..create_college(id)
            };
            calculate_fit_score(&college, &profile, None)
        })
        .collect();

    c.bench_function("rebalance_tiers_200_targets", |b| {
        b.iter(|| rebalance_tiers(black_box(results.clone())));
    });
}

criterion_group!(
    benches,
    bench_fit_score,
    bench_detailed_fit,
    bench_matching,
    bench_filtering,
    bench_rebalance
);

criterion_main!(benches);

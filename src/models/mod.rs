// Model exports
pub mod domain;
pub mod profile;
pub mod requests;
pub mod responses;

pub use domain::{AcademicTier, InstitutionRecord, MatchResult, TierDistribution};
pub use profile::{AidNeed, CourseRigor, DealBreaker, IncomeBracket, Region, Setting, SizeBucket, StudentProfile};
pub use requests::{FitScoreRequest, GenerateMatchesRequest, ProfileRequest};
pub use responses::{
    DetailedFit, DimensionScore, ErrorResponse, FitBreakdown, FitPercentages, HealthResponse,
    MatchResponse, ProfileCompleteness,
};

use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::models::{ErrorResponse, GenerateMatchesRequest, HealthResponse};
use crate::services::{MatchEngine, MatchOptions};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchEngine>,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/generate", web::post().to(generate_matches));
}

/// 400 response for a request that failed validation
pub(crate) fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        cache: state.engine.cache_stats(),
    })
}

/// Generate matches endpoint
///
/// POST /api/v1/matches/generate
///
/// Request body:
/// ```json
/// {
///   "profile": { "gpa": 3.7, "preferred_regions": ["pacific-northwest"] },
///   "limit": 50
/// }
/// ```
async fn generate_matches(
    state: web::Data<AppState>,
    req: web::Json<GenerateMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for generate_matches request: {:?}", errors);
        return validation_error(errors);
    }

    let options = MatchOptions {
        limit: req.limit.map(usize::from),
    };

    let response = state.engine.generate_matches(&req.profile, options).await;

    tracing::info!(
        "Returning {} matches ({} warnings)",
        response.matches.len(),
        response.warnings.len()
    );

    HttpResponse::Ok().json(response)
}

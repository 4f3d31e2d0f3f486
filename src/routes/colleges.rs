use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{calculate_detailed_fit_scores, calculate_fit_score};
use crate::models::{ErrorResponse, FitScoreRequest, ProfileCompleteness, ProfileRequest};
use crate::routes::matches::{validation_error, AppState};
use crate::services::ScorecardError;

/// Configure single-institution and profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/colleges/fit", web::post().to(fit_score))
        .route("/colleges/fit/details", web::post().to(fit_details))
        .route("/colleges/{id}/details", web::post().to(college_details))
        .route("/profile/completeness", web::post().to(profile_completeness));
}

/// Score a college supplied in the request body
///
/// POST /api/v1/colleges/fit
async fn fit_score(req: web::Json<FitScoreRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    HttpResponse::Ok().json(calculate_fit_score(&req.college, &req.profile, None))
}

/// Detailed breakdown for a college supplied in the request body
///
/// POST /api/v1/colleges/fit/details
async fn fit_details(req: web::Json<FitScoreRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    HttpResponse::Ok().json(calculate_detailed_fit_scores(&req.college, &req.profile))
}

/// Detailed breakdown for a college looked up by id
///
/// POST /api/v1/colleges/{id}/details
async fn college_details(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<ProfileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let id = path.into_inner();
    match state.engine.lookup(id).await {
        Ok(Some(college)) => HttpResponse::Ok().json(calculate_detailed_fit_scores(&college, &req.profile)),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "College not found".to_string(),
            message: format!("No operating institution with id {}", id),
            status_code: 404,
        }),
        Err(ScorecardError::RateLimited) => {
            tracing::warn!("Rate limited while looking up institution {}", id);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "Rate limited".to_string(),
                message: ScorecardError::RateLimited.to_string(),
                status_code: 503,
            })
        }
        Err(e) => {
            tracing::error!("Failed to look up institution {}: {}", id, e);
            HttpResponse::BadGateway().json(ErrorResponse {
                error: "Failed to fetch college".to_string(),
                message: e.to_string(),
                status_code: 502,
            })
        }
    }
}

/// Questionnaire coverage for a profile
///
/// POST /api/v1/profile/completeness
async fn profile_completeness(req: web::Json<ProfileRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    HttpResponse::Ok().json(ProfileCompleteness::assess(&req.profile))
}

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use college_match::config::Settings;
use college_match::core::Matcher;
use college_match::routes::{self, AppState};
use college_match::services::{CandidateFetcher, FetchSettings, MatchEngine, ResponseCache, ScorecardClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors, e.g. a non-numeric college id
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match format {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

fn to_io_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // COLLEGE_MATCH_CONFIG points at an explicit settings file
    let settings = match std::env::var("COLLEGE_MATCH_CONFIG") {
        Ok(path) => Settings::load_from(path),
        Err(_) => Settings::load(),
    };

    // LOG_LEVEL / LOG_FORMAT win over the config file
    let (config_level, config_format) = match &settings {
        Ok(s) => (s.logging.level.clone(), s.logging.format.clone()),
        Err(_) => ("info".to_string(), "json".to_string()),
    };
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(config_level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(config_format);
    init_logging(&log_level, &log_format);

    info!("Starting college matching service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        to_io_error(e)
    })?;

    info!("Configuration loaded successfully");

    if settings.scorecard.api_key.is_empty() {
        warn!("No Scorecard API key configured; set SCORECARD_API_KEY");
    }

    let client = ScorecardClient::new(
        settings.scorecard.base_url.clone(),
        settings.scorecard.api_key.clone(),
        settings.scorecard.per_page,
        settings.scorecard.timeout(),
    )
    .map_err(|e| {
        error!("Failed to create Scorecard client: {}", e);
        to_io_error(e)
    })?;

    info!("Scorecard client initialized ({})", settings.scorecard.base_url);

    let cache = if settings.cache.enabled {
        info!(
            "Response cache initialized ({} entries, TTL: {}s)",
            settings.cache.capacity, settings.cache.ttl_secs
        );
        Some(ResponseCache::new(
            settings.cache.capacity,
            Duration::from_secs(settings.cache.ttl_secs),
        ))
    } else {
        info!("Response cache disabled");
        None
    };

    let fetch_settings = FetchSettings::from(&settings.fetch);
    info!("Fetch settings: {:?}", fetch_settings);

    let fetcher = CandidateFetcher::new(Arc::new(client), cache, fetch_settings);
    let matcher = Matcher::new(settings.matching.max_limit);
    let engine = MatchEngine::new(fetcher, matcher, settings.matching.default_limit);

    let app_state = AppState {
        engine: Arc::new(engine),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

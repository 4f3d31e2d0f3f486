use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::InstitutionRecord;

/// Public College Scorecard endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.data.gov/ed/collegescorecard/v1/schools";

/// Largest page the provider serves
pub const MAX_PER_PAGE: u32 = 100;

/// Fields requested for every institution
pub const FIELDS: &[&str] = &[
    "id",
    "school.name",
    "school.city",
    "school.state",
    "school.school_url",
    "location.lat",
    "location.lon",
    "latest.student.size",
    "latest.school.ownership",
    "latest.school.locale",
    "latest.admissions.admission_rate.overall",
    "latest.admissions.sat_scores.midpoint.math",
    "latest.admissions.sat_scores.midpoint.critical_reading",
    "latest.admissions.act_scores.midpoint.cumulative",
    "latest.cost.attendance.academic_year",
    "latest.cost.tuition.in_state",
    "latest.cost.tuition.out_of_state",
    "latest.cost.avg_net_price.overall",
    "latest.cost.net_price.private_by_income_level.0_30000",
    "latest.cost.net_price.private_by_income_level.30001_48000",
    "latest.cost.net_price.private_by_income_level.48001_75000",
    "latest.cost.net_price.private_by_income_level.75001_110000",
    "latest.cost.net_price.private_by_income_level.110001_plus",
    "latest.student.retention_rate.four_year.full_time",
    "latest.completion.completion_rate_4yr_150nt",
    "latest.completion.completion_rate_6yr_150nt",
    "latest.earnings.6_yrs_after_entry.median",
    "latest.earnings.10_yrs_after_entry.median",
    "latest.aid.median_debt.completers.overall",
];

/// Errors that can occur when talking to the College Scorecard API
#[derive(Debug, Error)]
pub enum ScorecardError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Rate limit exceeded. Please try again in a few minutes.")]
    RateLimited,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Server-side filters for one search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScorecardQuery {
    pub state: Option<String>,
    pub id: Option<i64>,
    /// Inclusive enrollment bounds; no upper bound when `None`
    pub size_range: Option<(u32, Option<u32>)>,
    pub locale_range: Option<(u8, u8)>,
    pub max_cost: Option<u32>,
}

impl ScorecardQuery {
    /// Every operating institution
    pub fn broad() -> Self {
        Self::default()
    }

    pub fn for_state(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            ..Default::default()
        }
    }

    pub fn for_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Filter parameters in provider syntax, without paging or credentials
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.id {
            params.push(("id", id.to_string()));
        }
        if let Some(state) = &self.state {
            params.push(("school.state", state.clone()));
        }
        if let Some((min, max)) = self.size_range {
            let max = max.map(|max| max.to_string()).unwrap_or_default();
            params.push(("latest.student.size__range", format!("{}..{}", min, max)));
        }
        if let Some((min, max)) = self.locale_range {
            params.push(("latest.school.locale__range", format!("{}..{}", min, max)));
        }
        if let Some(max_cost) = self.max_cost {
            params.push(("latest.cost.attendance.academic_year__range", format!("0..{}", max_cost)));
        }
        params
    }

    /// Stable textual form used in cache keys
    pub fn cache_fragment(&self) -> String {
        let params = self.params();
        if params.is_empty() {
            return "all".to_string();
        }
        params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstitutionPage {
    pub results: Vec<InstitutionRecord>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub has_more: bool,
}

/// Source of institution pages
///
/// Implemented by [`ScorecardClient`]; tests substitute in-memory sources.
#[async_trait]
pub trait InstitutionSource: Send + Sync {
    /// Fetch a zero-based page of institutions matching `query`
    async fn fetch_page(&self, query: &ScorecardQuery, page: u32) -> Result<InstitutionPage, ScorecardError>;
}

/// College Scorecard API client
pub struct ScorecardClient {
    base_url: String,
    api_key: String,
    per_page: u32,
    client: Client,
}

impl ScorecardClient {
    /// Create a new client. `per_page` is capped at the provider maximum.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        per_page: u32,
        timeout: Duration,
    ) -> Result<Self, ScorecardError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            client,
        })
    }

    /// Parse a search response body into a page
    fn parse_page(&self, json: Value, page: u32) -> Result<InstitutionPage, ScorecardError> {
        if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ScorecardError::ApiError(message));
        }

        let raw = json
            .get("results")
            .and_then(|r| r.as_array())
            .ok_or_else(|| ScorecardError::InvalidResponse("Missing results array".into()))?;

        let results: Vec<InstitutionRecord> = raw
            .iter()
            .filter_map(|record| match serde_json::from_value(record.clone()) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::debug!("Skipping unparseable institution record: {}", e);
                    None
                }
            })
            .collect();

        let total = json
            .get("metadata")
            .and_then(|m| m.get("total"))
            .and_then(|t| t.as_u64())
            .unwrap_or(raw.len() as u64);

        let per_page = self.per_page;
        let has_more = raw.len() as u32 == per_page && (page as u64 + 1) * (per_page as u64) < total;

        Ok(InstitutionPage {
            results,
            total,
            page,
            per_page,
            has_more,
        })
    }
}

#[async_trait]
impl InstitutionSource for ScorecardClient {
    async fn fetch_page(&self, query: &ScorecardQuery, page: u32) -> Result<InstitutionPage, ScorecardError> {
        let mut params: Vec<(&str, String)> = vec![
            ("api_key", self.api_key.clone()),
            ("school.operating", "1".to_string()),
            ("per_page", self.per_page.to_string()),
            ("page", page.to_string()),
            ("fields", FIELDS.join(",")),
        ];
        params.extend(query.params());

        tracing::debug!("Fetching Scorecard page {} for {}", page, query.cache_fragment());

        let response = self.client.get(&self.base_url).query(&params).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ScorecardError::RateLimited);
        }
        if !status.is_success() {
            return Err(ScorecardError::ApiError(format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ScorecardError::InvalidResponse(e.to_string()))?;

        let parsed = self.parse_page(json, page)?;
        tracing::debug!(
            "Scorecard returned {} schools (total available: {})",
            parsed.results.len(),
            parsed.total
        );
        Ok(parsed)
    }
}

//! HTTP API over the snapshot store.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use idr_rates_common::{parse_date, Currency, ValidationError};
use idr_rates_fx::{FetchError, ResourceKey, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, instrument, warn};

use crate::state::AppState;

/// Base path of every data route.
pub const BASE_PATH: &str = "/api/finance/data";

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Startup load has not finished.
    #[error("Data initialization in progress")]
    NotReady,

    /// Path names no known resource.
    #[error("Valid resource types are: latest_idr_rates, supported_currencies")]
    InvalidResourceType { provided: String },

    /// Resource is known but was not loaded.
    #[error("Resource type not found: {0}")]
    ResourceNotFound(ResourceKey),

    #[error("Dates must be in YYYY-MM-DD format")]
    InvalidDateFormat,

    #[error("Currency codes must be 3-letter ISO 4217 codes")]
    InvalidCurrencyCode,

    /// Provider lookup failed.
    #[error("Failed to fetch historical data: {0}")]
    Upstream(#[from] FetchError),

    #[error("An unexpected error occurred while processing your request")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidResourceType { .. }
            | ApiError::InvalidDateFormat
            | ApiError::InvalidCurrencyCode => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotReady => "NOT_READY",
            ApiError::InvalidResourceType { .. } => "INVALID_RESOURCE_TYPE",
            ApiError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            ApiError::InvalidDateFormat => "INVALID_DATE_FORMAT",
            ApiError::InvalidCurrencyCode => "INVALID_CURRENCY_CODE",
            ApiError::Upstream(e) => e.error_code(),
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }

    /// Short title used in the `error` field.
    pub fn title(&self) -> &'static str {
        match self {
            ApiError::NotReady => "Service Unavailable",
            ApiError::InvalidResourceType { .. } => "Invalid Resource Type",
            ApiError::ResourceNotFound(_) => "Resource Not Found",
            ApiError::InvalidDateFormat => "Invalid Date Format",
            ApiError::InvalidCurrencyCode => "Invalid Currency Code",
            ApiError::Upstream(_) | ApiError::Internal => "Internal Server Error",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotReady => ApiError::NotReady,
            StoreError::NotFound(key) => ApiError::ResourceNotFound(key),
            StoreError::TypeMismatch { key, expected } => {
                error!(resource = %key, expected, "Stored payload has unexpected type");
                ApiError::Internal
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::InvalidDate(_) => ApiError::InvalidDateFormat,
            ValidationError::InvalidCurrencyCode(_) => ApiError::InvalidCurrencyCode,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            error!(code = self.error_code(), error = %self, "Request failed");
        }

        let mut body = json!({
            "error": self.title(),
            "message": self.to_string(),
        });
        if let ApiError::InvalidResourceType { provided } = &self {
            body["provided"] = json!(provided);
        }
        (self.status(), Json(body)).into_response()
    }
}

/// Health endpoint body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub initialized: bool,
    pub degraded: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResourceQuery {
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoricalQuery {
    pub start: String,
    pub end: String,
    pub from: String,
    pub to: String,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(&format!("{}/health", BASE_PATH), get(health))
        .route(&format!("{}/historical/custom", BASE_PATH), get(historical))
        .route(&format!("{}/:resource_type", BASE_PATH), get(resource))
        .with_state(state)
}

fn ensure_ready(state: &AppState) -> Result<(), ApiError> {
    if state.status().accepts_requests() {
        Ok(())
    } else {
        Err(ApiError::NotReady)
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.status();
    Json(HealthResponse {
        status: status.as_str(),
        initialized: status.accepts_requests(),
        degraded: state.store.is_degraded(),
    })
}

#[instrument(skip(state, query))]
async fn resource(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
    Query(query): Query<ResourceQuery>,
) -> Result<Response, ApiError> {
    ensure_ready(&state)?;

    let key: ResourceKey = resource_type
        .parse()
        .map_err(|_| ApiError::InvalidResourceType {
            provided: resource_type.clone(),
        })?;

    match key {
        ResourceKey::LatestIdrRates => {
            let rates = state.store.latest_rates()?;
            Ok(Json(rates.as_ref()).into_response())
        }
        ResourceKey::SupportedCurrencies => {
            let currencies = state.store.supported_currencies()?;
            if query.format.as_deref() == Some("simple") {
                Ok(Json(currencies.as_ref()).into_response())
            } else {
                Ok(Json(currencies.enrich()).into_response())
            }
        }
    }
}

#[instrument(skip(state))]
async fn historical(
    State(state): State<AppState>,
    Query(query): Query<HistoricalQuery>,
) -> Result<Response, ApiError> {
    ensure_ready(&state)?;

    let start = parse_date(&query.start)?;
    let end = parse_date(&query.end)?;
    let from = Currency::parse(&query.from)?;
    let to = Currency::parse(&query.to)?;

    let rates = state
        .historical
        .historical(start, end, &from, &to)
        .await
        .map_err(|e| {
            warn!(error = %e, code = e.error_code(), "Historical lookup failed");
            ApiError::Upstream(e)
        })?;

    Ok(Json(rates).into_response())
}

//! Insight routes.
//!
//! - `POST /jobs/daily-insights`                   run the batch for the current slot
//! - `GET  /users/{user_id}/insights?date=`        dashboard insights for a day
//! - `POST /users/{user_id}/insights/regenerate`   recompute and overwrite a day's set

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use storepulse_core::domain::insight::Insight;
use storepulse_core::domain::sales::UserId;
use storepulse_core::errors::{ApplicationError, InterfaceError};
use storepulse_core::scheduler::{BatchReport, DailyInsights, GenerationService};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const TRIGGER_TOKEN_HEADER: &str = "x-trigger-token";

#[derive(Clone)]
pub struct InsightsState {
    service: Arc<GenerationService>,
    trigger_token: Option<Arc<SecretString>>,
}

impl InsightsState {
    pub fn new(service: Arc<GenerationService>, trigger_token: Option<SecretString>) -> Self {
        Self { service, trigger_token: trigger_token.map(Arc::new) }
    }
}

pub fn router(state: InsightsState) -> Router {
    Router::new()
        .route("/jobs/daily-insights", post(trigger_daily_batch))
        .route("/users/{user_id}/insights", get(daily_insights))
        .route("/users/{user_id}/insights/regenerate", post(regenerate_insights))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyInsightsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegenerateRequest {
    pub reference_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DailyInsightsResponse {
    pub user_id: String,
    pub reference_date: NaiveDate,
    pub status: &'static str,
    pub generated_at: DateTime<Utc>,
    pub insights: Vec<Insight>,
}

impl DailyInsightsResponse {
    fn new(user_id: &UserId, reference_date: NaiveDate, outcome: DailyInsights) -> Self {
        let status = outcome.status();
        let (generated_at, insights) = match outcome {
            DailyInsights::Ready(set) => (set.generated_at, set.insights),
            DailyInsights::InsufficientData { generated_at } => (generated_at, Vec::new()),
        };
        Self { user_id: user_id.0.clone(), reference_date, status, generated_at, insights }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    error_class: &'static str,
    correlation_id: String,
}

/// HTTP rendering of [`InterfaceError`].
#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_class) = match &self.0 {
            InterfaceError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
            InterfaceError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
            InterfaceError::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            InterfaceError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        let body = ErrorBody {
            error: self.0.user_message(),
            error_class,
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn trigger_daily_batch(
    State(state): State<InsightsState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<BatchReport>), ApiError> {
    let correlation_id = correlation_id();

    if let Some(expected) = state.trigger_token.as_deref() {
        let presented = headers.get(TRIGGER_TOKEN_HEADER).and_then(|value| value.to_str().ok());
        if presented != Some(expected.expose_secret()) {
            warn!(
                event_name = "insights.batch.trigger_rejected",
                correlation_id = %correlation_id,
                "batch trigger rejected: missing or invalid trigger token"
            );
            return Err(InterfaceError::Unauthorized {
                message: "missing or invalid trigger token".to_string(),
                correlation_id,
            }
            .into());
        }
    }

    let report = state
        .service
        .run_daily_batch(Utc::now())
        .await
        .map_err(|error| application_failure(error, &correlation_id))?;

    let status =
        if report.is_success() { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR };
    info!(
        event_name = "insights.batch.triggered",
        correlation_id = %correlation_id,
        status = status.as_u16(),
        "batch trigger handled"
    );
    Ok((status, Json(report)))
}

async fn daily_insights(
    State(state): State<InsightsState>,
    Path(user_id): Path<String>,
    Query(query): Query<DailyInsightsQuery>,
) -> Result<Json<DailyInsightsResponse>, ApiError> {
    let correlation_id = correlation_id();
    let user_id = UserId(user_id);
    let now = Utc::now();
    let date = resolve_date(&state, query.date.as_deref(), now, &correlation_id)?;

    let outcome = state
        .service
        .daily_insights(&user_id, date, now)
        .await
        .map_err(|error| application_failure(error, &correlation_id))?;

    Ok(Json(DailyInsightsResponse::new(&user_id, date, outcome)))
}

async fn regenerate_insights(
    State(state): State<InsightsState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Json<DailyInsightsResponse>, ApiError> {
    let correlation_id = correlation_id();
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RegenerateRequest::default()
    } else {
        serde_json::from_slice::<RegenerateRequest>(&body).map_err(|error| {
            InterfaceError::BadRequest {
                message: format!("invalid regenerate body: {error}"),
                correlation_id: correlation_id.clone(),
            }
        })?
    };

    let user_id = UserId(user_id);
    let now = Utc::now();
    let date = resolve_date(&state, request.reference_date.as_deref(), now, &correlation_id)?;

    let outcome = state
        .service
        .regenerate(&user_id, date, now)
        .await
        .map_err(|error| application_failure(error, &correlation_id))?;

    Ok(Json(DailyInsightsResponse::new(&user_id, date, outcome)))
}

/// Explicit `YYYY-MM-DD`, or the business-local date of `now`.
fn resolve_date(
    state: &InsightsState,
    raw: Option<&str>,
    now: DateTime<Utc>,
    correlation_id: &str,
) -> Result<NaiveDate, ApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(state.service.clock().local_date(now)),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            InterfaceError::BadRequest {
                message: format!("`{value}` is not a YYYY-MM-DD date"),
                correlation_id: correlation_id.to_string(),
            }
            .into()
        }),
    }
}

fn application_failure(error: ApplicationError, correlation_id: &str) -> ApiError {
    error!(
        event_name = "insights.request.failed",
        correlation_id = %correlation_id,
        error = %error,
        "insight request failed"
    );
    error.into_interface(correlation_id).into()
}

fn correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}

//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::protocol::{ProtocolError, QueryError, TripOutcome, TripQuery};
use crate::station::{StationError, StationInfo};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(station_page))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Check if the client prefers HTML (browser) over JSON (API).
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Station page, planning a trip when `to` is given.
async fn station_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<TripQueryParams>,
) -> Response {
    let html = accepts_html(&headers);
    match plan(&state, &params).await {
        Ok((info, outcome)) if html => render_page(&info, &params, outcome.as_ref()),
        Ok((info, outcome)) => match outcome {
            Some(outcome) => Json(TripResponse::from_outcome(&outcome)).into_response(),
            None => Json(StationResponse::from_info(&info)).into_response(),
        },
        Err(e) if html => e.into_html_response(),
        Err(e) => e.into_response(),
    }
}

async fn plan(
    state: &AppState,
    params: &TripQueryParams,
) -> Result<(StationInfo, Option<TripOutcome>), AppError> {
    let info = state.station.describe().await?;

    let Some(to) = params.destination() else {
        return Ok((info, None));
    };
    let query = TripQuery::from_params(to, params.time.as_deref(), params.trip_type.as_deref())?;
    let outcome = state.station.plan(query).await?;
    Ok((info, Some(outcome)))
}

fn render_page(info: &StationInfo, params: &TripQueryParams, outcome: Option<&TripOutcome>) -> Response {
    let template = StationTemplate {
        station: StationView::from_info(info),
        form: FormView {
            to: params.to.clone().unwrap_or_default(),
            time: params.time.clone().unwrap_or_default(),
            trip_type: params.trip_type.clone().unwrap_or_default(),
        },
        result: outcome.map(TripView::from_outcome),
    };

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => AppError::Internal {
            message: format!("Template error: {e}"),
        }
        .into_response(),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message } | AppError::Internal { message } => message,
        }
    }

    fn log(&self) {
        match self {
            AppError::BadRequest { message } => warn!(%message, "bad request"),
            AppError::Internal { message } => error!(%message, "request failed"),
        }
    }

    fn into_html_response(self) -> Response {
        self.log();
        let status = self.status();
        let title = status.canonical_reason().unwrap_or("Error").to_string();
        let page = ErrorTemplate {
            title,
            message: self.message().to_string(),
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(_) => (status, self.message().to_string()).into_response(),
        }
    }
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<StationError> for AppError {
    fn from(e: StationError) -> Self {
        match e {
            StationError::Protocol(ProtocolError::InvalidQuery(message)) => {
                AppError::BadRequest { message }
            }
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.message().to_string(),
        });
        (status, body).into_response()
    }
}

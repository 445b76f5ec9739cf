use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::service::{AssessmentService, AssessmentServiceError, OutcomePublisher};
use super::state::AssessmentEvent;

#[derive(Debug, Deserialize)]
pub struct ReplayRequest {
    pub events: Vec<AssessmentEvent>,
    #[serde(default)]
    pub assessed_on: Option<NaiveDate>,
}

/// Router builder exposing the catalog and event replay endpoints.
pub fn assessment_router<P>(service: Arc<AssessmentService<P>>) -> Router
where
    P: OutcomePublisher + 'static,
{
    Router::new()
        .route("/api/v1/assessment/catalog", get(catalog_handler::<P>))
        .route("/api/v1/assessment/replay", post(replay_handler::<P>))
        .with_state(service)
}

pub(crate) async fn catalog_handler<P>(State(service): State<Arc<AssessmentService<P>>>) -> Response
where
    P: OutcomePublisher + 'static,
{
    let payload = json!({ "regions": service.catalog().regions() });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn replay_handler<P>(
    State(service): State<Arc<AssessmentService<P>>>,
    Json(request): Json<ReplayRequest>,
) -> Response
where
    P: OutcomePublisher + 'static,
{
    let assessed_on = request
        .assessed_on
        .unwrap_or_else(|| Local::now().date_naive());

    match service.replay(request.events, assessed_on) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(AssessmentServiceError::Replay(error)) => {
            let payload = json!({
                "error": error.source.to_string(),
                "step": error.step,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::domain::PropertyId;
use super::repository::SignalRepository;
use super::service::{OrchestrationService, OrchestrationServiceError};
use crate::workflows::storage::RepositoryError;

pub fn orchestration_router<S>(service: Arc<OrchestrationService<S>>) -> Router
where
    S: SignalRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties/:property_id/orchestration",
            get(summary_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn summary_handler<S>(
    State(service): State<Arc<OrchestrationService<S>>>,
    Path(property_id): Path<String>,
) -> Response
where
    S: SignalRepository + 'static,
{
    let property_id = PropertyId(property_id);
    match service.compute_orchestration_summary(&property_id) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(OrchestrationServiceError::Signal(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(OrchestrationServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": format!("property {property_id} not found") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

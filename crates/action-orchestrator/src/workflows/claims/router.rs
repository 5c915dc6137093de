use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ClaimId, ClaimStatus, ClaimType};
use super::gating::SubmissionOutcome;
use super::repository::ClaimRepository;
use super::service::{ClaimService, ClaimServiceError, ClaimUpdate};
use crate::workflows::completion::lifecycle::ChecklistItemStatus;
use crate::workflows::orchestration::PropertyId;
use crate::workflows::storage::RepositoryError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct OpenClaimRequest {
    property_id: String,
    claim_type: ClaimType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ChangeTypeRequest {
    claim_type: ClaimType,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ItemStatusRequest {
    status: ChecklistItemStatus,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ClaimStatusRequest {
    status: ClaimStatus,
}

pub fn claim_router<R>(service: Arc<ClaimService<R>>) -> Router
where
    R: ClaimRepository + 'static,
{
    Router::new()
        .route("/api/v1/claims", post(open_handler::<R>))
        .route("/api/v1/claims/:claim_id", get(claim_handler::<R>))
        .route("/api/v1/claims/:claim_id/submit", post(submit_handler::<R>))
        .route("/api/v1/claims/:claim_id/type", put(change_type_handler::<R>))
        .route("/api/v1/claims/:claim_id/status", put(status_handler::<R>))
        .route(
            "/api/v1/claims/:claim_id/checklist/:item_id",
            put(item_status_handler::<R>),
        )
        .route(
            "/api/v1/claims/:claim_id/checklist/:item_id/documents",
            post(document_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn open_handler<R>(
    State(service): State<Arc<ClaimService<R>>>,
    axum::Json(request): axum::Json<OpenClaimRequest>,
) -> Response
where
    R: ClaimRepository + 'static,
{
    match service.open_claim(PropertyId(request.property_id), request.claim_type) {
        Ok(update) => update_response(StatusCode::CREATED, update),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn claim_handler<R>(
    State(service): State<Arc<ClaimService<R>>>,
    Path(claim_id): Path<String>,
) -> Response
where
    R: ClaimRepository + 'static,
{
    match service.get_claim(&ClaimId(claim_id)) {
        Ok(claim) => (StatusCode::OK, axum::Json(claim)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<ClaimService<R>>>,
    Path(claim_id): Path<String>,
) -> Response
where
    R: ClaimRepository + 'static,
{
    match service.attempt_claim_submission(&ClaimId(claim_id)) {
        Ok(result) => {
            let status = if result.outcome.is_blocked() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::OK
            };
            let payload = match result.outcome {
                SubmissionOutcome::Submitted(claim) => json!({
                    "claim": claim,
                    "notice": result.notice,
                }),
                SubmissionOutcome::Blocked { blocked, blocking } => json!({
                    "blocked": blocked,
                    "blocking": blocking,
                    "notice": result.notice,
                }),
            };
            (status, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn change_type_handler<R>(
    State(service): State<Arc<ClaimService<R>>>,
    Path(claim_id): Path<String>,
    axum::Json(request): axum::Json<ChangeTypeRequest>,
) -> Response
where
    R: ClaimRepository + 'static,
{
    match service.change_claim_type(&ClaimId(claim_id), request.claim_type) {
        Ok(update) => update_response(StatusCode::OK, update),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<ClaimService<R>>>,
    Path(claim_id): Path<String>,
    axum::Json(request): axum::Json<ClaimStatusRequest>,
) -> Response
where
    R: ClaimRepository + 'static,
{
    match service.advance_status(&ClaimId(claim_id), request.status) {
        Ok(update) => update_response(StatusCode::OK, update),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn item_status_handler<R>(
    State(service): State<Arc<ClaimService<R>>>,
    Path((claim_id, item_id)): Path<(String, String)>,
    axum::Json(request): axum::Json<ItemStatusRequest>,
) -> Response
where
    R: ClaimRepository + 'static,
{
    match service.set_item_status(&ClaimId(claim_id), &item_id, request.status) {
        Ok(update) => update_response(StatusCode::OK, update),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn document_handler<R>(
    State(service): State<Arc<ClaimService<R>>>,
    Path((claim_id, item_id)): Path<(String, String)>,
) -> Response
where
    R: ClaimRepository + 'static,
{
    match service.record_document(&ClaimId(claim_id), &item_id) {
        Ok(update) => update_response(StatusCode::OK, update),
        Err(error) => error_response(error),
    }
}

fn update_response(status: StatusCode, update: ClaimUpdate) -> Response {
    let payload = json!({
        "claim": update.claim,
        "changed": update.changed,
        "notice": update.notice,
    });
    (status, axum::Json(payload)).into_response()
}

fn error_response(error: ClaimServiceError) -> Response {
    let status = match &error {
        ClaimServiceError::Transition(_)
        | ClaimServiceError::Locked { .. }
        | ClaimServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ClaimServiceError::GatedTransition => StatusCode::UNPROCESSABLE_ENTITY,
        ClaimServiceError::ItemNotFound(_)
        | ClaimServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ClaimServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

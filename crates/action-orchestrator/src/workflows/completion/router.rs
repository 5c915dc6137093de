use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::MicroAction;
use super::record::CompletionDraft;
use super::repository::MicroActionRepository;
use super::service::{ActionTransition, CompletionService, CompletionServiceError};
use crate::workflows::notice::Notice;
use crate::workflows::orchestration::ActionId;
use crate::workflows::storage::RepositoryError;

#[derive(Debug, Serialize)]
pub(crate) struct TransitionView {
    action: MicroAction,
    changed: bool,
    notice: Notice,
}

impl From<ActionTransition> for TransitionView {
    fn from(value: ActionTransition) -> Self {
        Self {
            action: value.action,
            changed: value.changed,
            notice: value.notice,
        }
    }
}

pub fn completion_router<R>(service: Arc<CompletionService<R>>) -> Router
where
    R: MicroActionRepository + 'static,
{
    Router::new()
        .route("/api/v1/actions/:action_id", get(action_handler::<R>))
        .route(
            "/api/v1/actions/:action_id/complete",
            post(complete_handler::<R>),
        )
        .route(
            "/api/v1/actions/:action_id/dismiss",
            post(dismiss_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn action_handler<R>(
    State(service): State<Arc<CompletionService<R>>>,
    Path(action_id): Path<String>,
) -> Response
where
    R: MicroActionRepository + 'static,
{
    match service.get(&ActionId(action_id)) {
        Ok(action) => (StatusCode::OK, axum::Json(action)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_handler<R>(
    State(service): State<Arc<CompletionService<R>>>,
    Path(action_id): Path<String>,
    axum::Json(draft): axum::Json<CompletionDraft>,
) -> Response
where
    R: MicroActionRepository + 'static,
{
    match service.complete_action(&ActionId(action_id), draft) {
        Ok(transition) => {
            (StatusCode::OK, axum::Json(TransitionView::from(transition))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn dismiss_handler<R>(
    State(service): State<Arc<CompletionService<R>>>,
    Path(action_id): Path<String>,
) -> Response
where
    R: MicroActionRepository + 'static,
{
    match service.dismiss_action(&ActionId(action_id)) {
        Ok(transition) => {
            (StatusCode::OK, axum::Json(TransitionView::from(transition))).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: CompletionServiceError) -> Response {
    let status = match &error {
        CompletionServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CompletionServiceError::Transition(_)
        | CompletionServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CompletionServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CompletionServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

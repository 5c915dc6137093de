use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{PhotoFile, PhotoRejection, UploadError};
use super::service::EvidenceService;
use super::uploader::PhotoUploader;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadParams {
    order_index: usize,
    #[serde(default)]
    file_name: Option<String>,
}

pub fn evidence_router<U>(service: Arc<EvidenceService<U>>) -> Router
where
    U: PhotoUploader + 'static,
{
    let body_limit = usize::try_from(service.policy().max_photo_bytes).unwrap_or(usize::MAX);
    Router::new()
        .route("/api/v1/evidence/photos", post(upload_handler::<U>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

pub(crate) async fn upload_handler<U>(
    State(service): State<Arc<EvidenceService<U>>>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    U: PhotoUploader + 'static,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let file_name = params
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("photo-{}", params.order_index.saturating_add(1)));
    let file = PhotoFile::new(file_name, content_type, body.to_vec());

    match service.upload_evidence_photo(file, params.order_index).await {
        Ok(photo) => (StatusCode::CREATED, axum::Json(photo)).into_response(),
        Err(error) => {
            let status = match &error {
                UploadError::Rejected(PhotoRejection::TooLarge { .. }) => {
                    StatusCode::PAYLOAD_TOO_LARGE
                }
                UploadError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
                UploadError::Storage(_) => StatusCode::BAD_GATEWAY,
            };
            let payload = json!({ "error": error.to_string() });
            (status, axum::Json(payload)).into_response()
        }
    }
}

use std::sync::Arc;

use action_orchestrator::workflows::claims::{claim_router, ClaimRepository, ClaimService};
use action_orchestrator::workflows::completion::{
    completion_router, CompletionService, MicroActionRepository,
};
use action_orchestrator::workflows::evidence::{evidence_router, EvidenceService, PhotoUploader};
use action_orchestrator::workflows::orchestration::{
    normalize_signals, orchestration_router, CandidateSignals, OrchestrationService,
    OrchestrationServiceError, PropertyId,
};
use action_orchestrator::workflows::RepositoryError;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::infra::{AppState, InMemorySignalRepository};

const DEFAULT_SEED_LIMIT: usize = 3;

/// Services backing the HTTP surface.
pub(crate) struct Services<M, U, C>
where
    M: MicroActionRepository + 'static,
    U: PhotoUploader + 'static,
    C: ClaimRepository + 'static,
{
    pub(crate) signals: Arc<InMemorySignalRepository>,
    pub(crate) orchestration: Arc<OrchestrationService<InMemorySignalRepository>>,
    pub(crate) completion: Arc<CompletionService<M>>,
    pub(crate) evidence: Arc<EvidenceService<U>>,
    pub(crate) claims: Arc<ClaimService<C>>,
}

struct IngestState<M>
where
    M: MicroActionRepository + 'static,
{
    signals: Arc<InMemorySignalRepository>,
    orchestration: Arc<OrchestrationService<InMemorySignalRepository>>,
    completion: Arc<CompletionService<M>>,
}

impl<M> Clone for IngestState<M>
where
    M: MicroActionRepository + 'static,
{
    fn clone(&self) -> Self {
        Self {
            signals: Arc::clone(&self.signals),
            orchestration: Arc::clone(&self.orchestration),
            completion: Arc::clone(&self.completion),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SeedParams {
    #[serde(default)]
    limit: Option<usize>,
}

/// Every workflow router plus the ingestion endpoints and health routes.
pub(crate) fn api_router<M, U, C>(services: Services<M, U, C>) -> Router
where
    M: MicroActionRepository + 'static,
    U: PhotoUploader + 'static,
    C: ClaimRepository + 'static,
{
    let ingest = IngestState {
        signals: services.signals,
        orchestration: Arc::clone(&services.orchestration),
        completion: Arc::clone(&services.completion),
    };

    Router::new()
        .route(
            "/api/v1/properties/:property_id/signals",
            put(replace_signals::<M>),
        )
        .route(
            "/api/v1/properties/:property_id/micro-actions",
            post(seed_micro_actions::<M>),
        )
        .with_state(ingest)
        .merge(orchestration_router(services.orchestration))
        .merge(completion_router(services.completion))
        .merge(evidence_router(services.evidence))
        .merge(claim_router(services.claims))
        .route("/health", get(healthcheck))
}

/// Adds the routes that need the shared application state.
pub(crate) fn with_operational_routes(router: Router) -> Router {
    router
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn replace_signals<M>(
    State(state): State<IngestState<M>>,
    Path(property_id): Path<String>,
    Json(candidates): Json<CandidateSignals>,
) -> Response
where
    M: MicroActionRepository + 'static,
{
    let property_id = PropertyId(property_id);
    if let Err(error) = normalize_signals(&property_id, candidates.signals.clone()) {
        let payload = json!({ "error": error.to_string() });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    }

    let accepted = candidates.signals.len();
    match state.signals.replace(property_id.clone(), candidates) {
        Ok(()) => {
            info!(%property_id, accepted, "candidate signals replaced");
            (
                StatusCode::ACCEPTED,
                Json(json!({ "propertyId": property_id, "accepted": accepted })),
            )
                .into_response()
        }
        Err(error) => repository_error(error),
    }
}

async fn seed_micro_actions<M>(
    State(state): State<IngestState<M>>,
    Path(property_id): Path<String>,
    Query(params): Query<SeedParams>,
) -> Response
where
    M: MicroActionRepository + 'static,
{
    let property_id = PropertyId(property_id);
    let summary = match state.orchestration.compute_orchestration_summary(&property_id) {
        Ok(summary) => summary,
        Err(OrchestrationServiceError::Signal(error)) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
        Err(OrchestrationServiceError::Repository(error)) => return repository_error(error),
    };

    let limit = params.limit.unwrap_or(DEFAULT_SEED_LIMIT);
    match state.completion.seed_from_summary(&summary, limit) {
        Ok(actions) => (StatusCode::OK, Json(actions)).into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn repository_error(error: RepositoryError) -> Response {
    let status = match error {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{DemoPhotoUploader, InMemoryClaimRepository, InMemoryMicroActionRepository};
    use action_orchestrator::clock::FixedClock;
    use action_orchestrator::workflows::evidence::EvidencePolicy;
    use action_orchestrator::workflows::orchestration::OrchestrationEngine;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> Router {
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap(),
        ));
        let signals = Arc::new(InMemorySignalRepository::default());
        api_router(Services {
            signals: signals.clone(),
            orchestration: Arc::new(OrchestrationService::new(
                signals,
                OrchestrationEngine::default(),
                clock.clone(),
            )),
            completion: Arc::new(CompletionService::new(
                Arc::new(InMemoryMicroActionRepository::default()),
                EvidencePolicy::default(),
                clock.clone(),
            )),
            evidence: Arc::new(EvidenceService::new(
                Arc::new(DemoPhotoUploader::default()),
                EvidencePolicy::default(),
            )),
            claims: Arc::new(ClaimService::new(
                Arc::new(InMemoryClaimRepository::default()),
                clock,
            )),
        })
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router responds");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).expect("json payload"))
    }

    fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn ingested_signals_flow_into_summary_and_micro_actions() {
        let router = router();
        let (status, body) = send(
            &router,
            json_request(
                "PUT",
                "/api/v1/properties/prop-7/signals",
                json!({
                    "signals": [
                        {
                            "id": "sump",
                            "title": "Replace sump pump",
                            "riskLevel": "high",
                            "exposure": "$6,000",
                            "observedAt": "2025-09-30T12:00:00Z"
                        },
                        {
                            "id": "filter",
                            "title": "Change HVAC filter",
                            "riskLevel": "low",
                            "observedAt": "2025-09-30T12:00:00Z"
                        }
                    ],
                    "derivedFrom": {
                        "riskAssessment": true,
                        "financialExposure": true,
                        "maintenance": false,
                        "checklist": false
                    }
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["accepted"], 2);

        let (status, body) = send(
            &router,
            Request::get("/api/v1/properties/prop-7/orchestration")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["actions"][0]["id"], "sump");
        assert_eq!(body["actions"][0]["confidence"]["score"], 100);
        assert_eq!(body["derivedFrom"]["riskAssessment"], true);

        let (status, body) = send(
            &router,
            Request::post("/api/v1/properties/prop-7/micro-actions?limit=1")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().expect("array").len(), 1);
        assert_eq!(body[0]["status"], "PENDING");

        let (status, body) = send(
            &router,
            Request::post("/api/v1/actions/sump/dismiss")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"]["status"], "DISMISSED");
    }

    #[tokio::test]
    async fn malformed_signals_are_rejected_at_ingestion() {
        let (status, body) = send(
            &router(),
            json_request(
                "PUT",
                "/api/v1/properties/prop-7/signals",
                json!({
                    "signals": [{
                        "id": "sump",
                        "title": "Replace sump pump",
                        "riskLevel": "apocalyptic",
                        "observedAt": "2025-09-30T12:00:00Z"
                    }]
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("apocalyptic"));
    }

    #[tokio::test]
    async fn unknown_property_is_not_found() {
        let (status, _) = send(
            &router(),
            Request::post("/api/v1/properties/ghost/micro-actions")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

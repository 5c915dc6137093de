use crate::cli::ServeArgs;
use crate::infra::{
    AppState, DemoPhotoUploader, InMemoryClaimRepository, InMemoryMicroActionRepository,
    InMemorySignalRepository,
};
use crate::routes::{api_router, with_operational_routes, Services};
use action_orchestrator::clock::{Clock, SystemClock};
use action_orchestrator::config::AppConfig;
use action_orchestrator::error::AppError;
use action_orchestrator::telemetry;
use action_orchestrator::workflows::claims::ClaimService;
use action_orchestrator::workflows::completion::CompletionService;
use action_orchestrator::workflows::evidence::EvidenceService;
use action_orchestrator::workflows::orchestration::{OrchestrationEngine, OrchestrationService};
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_operational_routes(build_router(&config))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_photos = config.evidence.max_photos,
        stale_after_days = config.suppression.stale_after_days,
        "action orchestrator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Wire the in-memory repositories into every workflow service.
fn build_router(config: &AppConfig) -> Router {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let signals = Arc::new(InMemorySignalRepository::default());

    api_router(Services {
        signals: signals.clone(),
        orchestration: Arc::new(OrchestrationService::new(
            signals,
            OrchestrationEngine::new(config.suppression),
            clock.clone(),
        )),
        completion: Arc::new(CompletionService::new(
            Arc::new(InMemoryMicroActionRepository::default()),
            config.evidence,
            clock.clone(),
        )),
        evidence: Arc::new(EvidenceService::new(
            Arc::new(DemoPhotoUploader::default()),
            config.evidence,
        )),
        claims: Arc::new(ClaimService::new(
            Arc::new(InMemoryClaimRepository::default()),
            clock,
        )),
    })
}

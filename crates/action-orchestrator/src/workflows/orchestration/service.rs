use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{OrchestrationSummary, PropertyId};
use super::engine::OrchestrationEngine;
use super::normalizer::{normalize_signals, SignalError};
use super::repository::SignalRepository;
use crate::clock::Clock;
use crate::workflows::storage::RepositoryError;

/// Loads signals and recomputes the summary on every call; nothing is cached between requests.
pub struct OrchestrationService<S> {
    repository: Arc<S>,
    engine: OrchestrationEngine,
    clock: Arc<dyn Clock>,
}

impl<S> OrchestrationService<S>
where
    S: SignalRepository + 'static,
{
    pub fn new(repository: Arc<S>, engine: OrchestrationEngine, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            engine,
            clock,
        }
    }

    pub fn compute_orchestration_summary(
        &self,
        property_id: &PropertyId,
    ) -> Result<OrchestrationSummary, OrchestrationServiceError> {
        let loaded = self.repository.load_candidate_signals(property_id)?;
        debug!(%property_id, signals = loaded.signals.len(), "loaded candidate signals");

        let candidates = normalize_signals(property_id, loaded.signals)?;
        let summary = self.engine.summarize(
            property_id.clone(),
            candidates,
            loaded.counts,
            loaded.derived_from,
            self.clock.now(),
        );

        info!(
            %property_id,
            actions = summary.actions.len(),
            suppressed = summary.suppressed_actions.len(),
            snoozed = summary.snoozed_actions.len(),
            "orchestration summary computed"
        );
        Ok(summary)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestrationServiceError {
    #[error(transparent)]
    Signal(#[from] SignalError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

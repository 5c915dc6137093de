use serde::{Deserialize, Serialize};

use super::domain::{DerivedFrom, PropertyId, SignalCounts};
use super::normalizer::RawSignal;
use crate::workflows::storage::RepositoryError;

/// Candidate signals for one property plus the provenance metadata passed through to summaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSignals {
    pub signals: Vec<RawSignal>,
    #[serde(default)]
    pub counts: SignalCounts,
    #[serde(default)]
    pub derived_from: DerivedFrom,
}

/// Storage seam for upstream signal ingestion.
pub trait SignalRepository: Send + Sync {
    fn load_candidate_signals(
        &self,
        property_id: &PropertyId,
    ) -> Result<CandidateSignals, RepositoryError>;
}

//! Orchestration summary: signal normalization, suppression, confidence scoring, and ranking.
//!
//! Every summary is recomputed from freshly loaded signals. The components hold no shared mutable
//! state, so summaries for different properties can be computed in parallel.

mod confidence;
pub mod domain;
mod engine;
mod import;
pub mod normalizer;
mod ranking;
pub mod repository;
pub mod router;
pub mod service;
mod suppression;


pub use confidence::{score_confidence, upstream_confidence};
pub use domain::{
    ActionId, CandidateAction, Confidence, ConfidenceLevel, DerivedFrom, OrchestratedAction,
    OrchestrationSummary, PropertyId, RiskLevel, SignalCounts, Suppression, SuppressionCode,
    SuppressionReason,
};
pub use engine::OrchestrationEngine;
pub use import::{SignalCsvImporter, SignalImportError};
pub use normalizer::{
    normalize_confidence_score, normalize_signal, normalize_signals, RawAmount, RawSignal,
    SignalError,
};
pub use ranking::{partition_actions, rank, PartitionedActions};
pub use repository::{CandidateSignals, SignalRepository};
pub use router::orchestration_router;
pub use service::{OrchestrationService, OrchestrationServiceError};
pub use suppression::{evaluate_suppression, SuppressionContext, SuppressionPolicy};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a recommended action; stable across summary recomputations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub String);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity of the underlying property risk. Ordering follows severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// Case-insensitive label parsing with the aliases upstream feeds emit.
    pub fn parse_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "minor" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" | "elevated" => Some(Self::High),
            "critical" | "severe" | "urgent" => Some(Self::Critical),
            _ => None,
        }
    }

    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized candidate produced by the signal normalizer; input to suppression and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateAction {
    pub id: ActionId,
    pub property_id: PropertyId,
    pub title: String,
    pub category: String,
    pub risk_level: RiskLevel,
    pub exposure: Option<f64>,
    pub upstream_confidence: Option<u8>,
    pub observed_at: DateTime<Utc>,
    pub duplicate_of: Option<ActionId>,
    pub snoozed_until: Option<DateTime<Utc>>,
}

/// Machine-readable suppression reason codes. Declaration order is rule priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuppressionCode {
    StaleData,
    DuplicateOpenAction,
    Snoozed,
    BelowSeverityThreshold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuppressionReason {
    pub code: SuppressionCode,
    pub message: String,
}

/// Suppression verdict. `suppressed` is true exactly when `reasons` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Suppression {
    suppressed: bool,
    reasons: Vec<SuppressionReason>,
}

impl Suppression {
    pub fn surfaced() -> Self {
        Self::default()
    }

    pub fn from_reasons(mut reasons: Vec<SuppressionReason>) -> Self {
        reasons.sort_by_key(|reason| reason.code);
        Self {
            suppressed: !reasons.is_empty(),
            reasons,
        }
    }

    pub fn suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn reasons(&self) -> &[SuppressionReason] {
        &self.reasons
    }

    pub fn is_snoozed(&self) -> bool {
        self.reasons
            .iter()
            .any(|reason| reason.code == SuppressionCode::Snoozed)
    }

    /// Display text, e.g. "reason A • reason B".
    pub fn summary(&self) -> String {
        self.reasons
            .iter()
            .map(|reason| reason.message.as_str())
            .collect::<Vec<_>>()
            .join(" • ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub const fn from_score(score: u8) -> Self {
        if score >= 80 {
            Self::High
        } else if score >= 60 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Integer confidence in `0..=100` with the ordered explanation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confidence {
    pub score: u8,
    pub level: ConfidenceLevel,
    pub explanation: Vec<String>,
}

/// Recommended action annotated with its suppression verdict and confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratedAction {
    pub id: ActionId,
    pub property_id: PropertyId,
    pub title: String,
    pub risk_level: RiskLevel,
    pub exposure: Option<f64>,
    pub category: String,
    pub suppression: Suppression,
    pub confidence: Option<Confidence>,
}

impl OrchestratedAction {
    pub fn score(&self) -> u8 {
        self.confidence
            .as_ref()
            .map(|confidence| confidence.score)
            .unwrap_or(0)
    }
}

/// Per-source signal counts passed through from ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalCounts {
    pub risk_signals: u32,
    pub financial_signals: u32,
    pub maintenance_signals: u32,
    pub checklist_signals: u32,
}

/// Which upstream reports contributed to the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFrom {
    pub risk_assessment: bool,
    pub financial_exposure: bool,
    pub maintenance: bool,
    pub checklist: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationSummary {
    pub property_id: PropertyId,
    pub pending_action_count: usize,
    pub actions: Vec<OrchestratedAction>,
    pub suppressed_actions: Vec<OrchestratedAction>,
    pub snoozed_actions: Vec<OrchestratedAction>,
    pub counts: SignalCounts,
    pub derived_from: DerivedFrom,
}

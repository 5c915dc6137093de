use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ActionId, CandidateAction, PropertyId, RiskLevel};

const DEFAULT_CATEGORY: &str = "general";

/// Upstream signal as delivered by ingestion. Unknown fields are rejected at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawSignal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    pub risk_level: String,
    #[serde(default)]
    pub exposure: Option<RawAmount>,
    #[serde(default)]
    pub confidence: Option<f64>,
    pub observed_at: DateTime<Utc>,
    #[serde(default)]
    pub duplicate_of: Option<String>,
    #[serde(default)]
    pub snoozed_until: Option<DateTime<Utc>>,
}

/// Monetary amount as either a JSON number or a formatted currency string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    #[error("signal is missing an id")]
    MissingId,
    #[error("signal {id}: unknown risk level '{value}'")]
    UnknownRiskLevel { id: String, value: String },
    #[error("signal {id}: exposure '{value}' is not a non-negative amount")]
    InvalidExposure { id: String, value: String },
    #[error("signal {id}: confidence {value} is not a finite number")]
    InvalidConfidence { id: String, value: f64 },
}

/// Coerce a raw signal into the canonical candidate representation.
pub fn normalize_signal(
    property_id: &PropertyId,
    signal: RawSignal,
) -> Result<CandidateAction, SignalError> {
    let id = signal.id.trim().to_string();
    if id.is_empty() {
        return Err(SignalError::MissingId);
    }

    let risk_level =
        RiskLevel::parse_label(&signal.risk_level).ok_or_else(|| SignalError::UnknownRiskLevel {
            id: id.clone(),
            value: signal.risk_level.clone(),
        })?;

    let exposure = match signal.exposure {
        Some(raw) => normalize_exposure(&raw).map_err(|value| SignalError::InvalidExposure {
            id: id.clone(),
            value,
        })?,
        None => None,
    };

    let upstream_confidence = match signal.confidence {
        Some(value) if !value.is_finite() => {
            return Err(SignalError::InvalidConfidence {
                id: id.clone(),
                value,
            })
        }
        Some(value) => Some(normalize_confidence_score(value)),
        None => None,
    };

    let category = signal
        .category
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let duplicate_of = signal
        .duplicate_of
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(ActionId);

    Ok(CandidateAction {
        id: ActionId(id),
        property_id: property_id.clone(),
        title: signal.title.trim().to_string(),
        category,
        risk_level,
        exposure,
        upstream_confidence,
        observed_at: signal.observed_at,
        duplicate_of,
        snoozed_until: signal.snoozed_until,
    })
}

pub fn normalize_signals(
    property_id: &PropertyId,
    signals: Vec<RawSignal>,
) -> Result<Vec<CandidateAction>, SignalError> {
    signals
        .into_iter()
        .map(|signal| normalize_signal(property_id, signal))
        .collect()
}

/// Returns `Ok(None)` for blank text, the rejected raw value otherwise.
fn normalize_exposure(raw: &RawAmount) -> Result<Option<f64>, String> {
    let amount = match raw {
        RawAmount::Number(value) => *value,
        RawAmount::Text(text) => {
            let cleaned: String = text
                .trim()
                .chars()
                .filter(|ch| !matches!(ch, '$' | ',' | '_') && !ch.is_whitespace())
                .collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned.parse::<f64>().map_err(|_| text.clone())?
        }
    };

    if !amount.is_finite() || amount < 0.0 {
        return Err(match raw {
            RawAmount::Number(value) => value.to_string(),
            RawAmount::Text(text) => text.clone(),
        });
    }

    Ok(Some(amount))
}

/// Bring a confidence value onto the integer 0..=100 scale.
///
/// Anything `<= 1` is read as a 0..1 fraction, so a genuine integer score of `1` becomes `100`.
pub fn normalize_confidence_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }

    let scaled = if raw <= 1.0 { raw * 100.0 } else { raw };
    scaled.clamp(0.0, 100.0).round() as u8
}

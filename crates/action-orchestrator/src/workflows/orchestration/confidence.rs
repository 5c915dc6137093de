use super::domain::{Confidence, ConfidenceLevel, RiskLevel};

const BASE_SCORE: u8 = 50;
const ELEVATED_RISK_POINTS: u8 = 25;
const HIGH_EXPOSURE_POINTS: u8 = 15;
const UNBLOCKED_POINTS: u8 = 10;
const HIGH_EXPOSURE_THRESHOLD: f64 = 5000.0;
const MAX_SCORE: u8 = 100;

/// Additive, capped confidence score. The explanation lists contributions in rule order.
pub fn score_confidence(
    risk_level: RiskLevel,
    exposure: Option<f64>,
    suppressed: bool,
) -> Confidence {
    let mut score = BASE_SCORE;
    let mut explanation = Vec::new();

    if risk_level.is_elevated() {
        score += ELEVATED_RISK_POINTS;
        explanation.push("High risk severity".to_string());
    }

    if exposure.is_some_and(|amount| amount > HIGH_EXPOSURE_THRESHOLD) {
        score += HIGH_EXPOSURE_POINTS;
        explanation.push("High financial exposure".to_string());
    }

    if !suppressed {
        score += UNBLOCKED_POINTS;
        explanation.push("No blocking conditions detected".to_string());
    }

    let score = score.min(MAX_SCORE);
    Confidence {
        score,
        level: ConfidenceLevel::from_score(score),
        explanation,
    }
}

/// Wrap an already-normalized upstream score.
pub fn upstream_confidence(score: u8) -> Confidence {
    let score = score.min(MAX_SCORE);
    Confidence {
        score,
        level: ConfidenceLevel::from_score(score),
        explanation: vec!["Confidence supplied by upstream signal".to_string()],
    }
}

use super::domain::MicroAction;
use crate::workflows::orchestration::{OrchestrationSummary, RiskLevel};

/// Turn the top surfaced actions into pending micro-actions, keeping the action ids.
pub fn plan_micro_actions(summary: &OrchestrationSummary, limit: usize) -> Vec<MicroAction> {
    summary
        .actions
        .iter()
        .take(limit)
        .map(|action| {
            let detail = match &action.confidence {
                Some(confidence) if !confidence.explanation.is_empty() => {
                    confidence.explanation.join("; ")
                }
                _ => format!("{} risk in {}", action.risk_level, action.category),
            };
            MicroAction::pending(
                action.id.clone(),
                action.property_id.clone(),
                action.title.clone(),
                detail,
                eta_minutes(action.risk_level),
            )
        })
        .collect()
}

pub(crate) const fn eta_minutes(risk_level: RiskLevel) -> u32 {
    match risk_level {
        RiskLevel::Low => 15,
        RiskLevel::Medium => 30,
        RiskLevel::High => 60,
        RiskLevel::Critical => 90,
    }
}

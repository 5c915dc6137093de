use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::confidence::{score_confidence, upstream_confidence};
use super::domain::{
    ActionId, CandidateAction, DerivedFrom, OrchestratedAction, OrchestrationSummary, PropertyId,
    SignalCounts, Suppression,
};
use super::ranking::partition_actions;
use super::suppression::{evaluate_suppression, SuppressionContext, SuppressionPolicy};

/// Stateless summary builder. Holds only its policy, so one engine can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct OrchestrationEngine {
    policy: SuppressionPolicy,
}

impl OrchestrationEngine {
    pub fn new(policy: SuppressionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SuppressionPolicy {
        &self.policy
    }

    /// Annotate every candidate, partition, and rank. Never fails on normalized input.
    pub fn summarize(
        &self,
        property_id: PropertyId,
        candidates: Vec<CandidateAction>,
        counts: SignalCounts,
        derived_from: DerivedFrom,
        now: DateTime<Utc>,
    ) -> OrchestrationSummary {
        let annotated = self.annotate(candidates, now);
        let partitioned = partition_actions(annotated);

        OrchestrationSummary {
            property_id,
            pending_action_count: partitioned.actions.len(),
            actions: partitioned.actions,
            suppressed_actions: partitioned.suppressed,
            snoozed_actions: partitioned.snoozed,
            counts,
            derived_from,
        }
    }

    pub fn annotate(
        &self,
        candidates: Vec<CandidateAction>,
        now: DateTime<Utc>,
    ) -> Vec<OrchestratedAction> {
        // A duplicate only counts against an original that is itself still a candidate.
        let open_actions: HashSet<ActionId> = candidates
            .iter()
            .filter(|candidate| candidate.duplicate_of.is_none())
            .map(|candidate| candidate.id.clone())
            .collect();
        let context = SuppressionContext {
            policy: &self.policy,
            now,
            open_actions: &open_actions,
        };

        candidates
            .into_iter()
            .map(|candidate| {
                let suppression = evaluate_suppression(&candidate, &context);
                annotate_candidate(candidate, suppression)
            })
            .collect()
    }
}

fn annotate_candidate(candidate: CandidateAction, suppression: Suppression) -> OrchestratedAction {
    let confidence = match candidate.upstream_confidence {
        Some(score) => upstream_confidence(score),
        None => score_confidence(
            candidate.risk_level,
            candidate.exposure,
            suppression.suppressed(),
        ),
    };

    OrchestratedAction {
        id: candidate.id,
        property_id: candidate.property_id,
        title: candidate.title,
        risk_level: candidate.risk_level,
        exposure: candidate.exposure,
        category: candidate.category,
        suppression,
        confidence: Some(confidence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::orchestration::domain::{ConfidenceLevel, RiskLevel, SuppressionCode};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap()
    }

    fn candidate(id: &str, risk_level: RiskLevel, exposure: Option<f64>) -> CandidateAction {
        CandidateAction {
            id: ActionId(id.to_string()),
            property_id: PropertyId("prop-7".to_string()),
            title: format!("Action {id}"),
            category: "plumbing".to_string(),
            risk_level,
            exposure,
            upstream_confidence: None,
            observed_at: now() - Duration::days(1),
            duplicate_of: None,
            snoozed_until: None,
        }
    }

    #[test]
    fn summary_partitions_and_counts_pending_actions() {
        let mut snoozed = candidate("snoozed", RiskLevel::High, None);
        snoozed.snoozed_until = Some(now() + Duration::days(7));
        let mut duplicate = candidate("dup", RiskLevel::Low, None);
        duplicate.duplicate_of = Some(ActionId("leak".to_string()));

        let counts = SignalCounts {
            risk_signals: 3,
            financial_signals: 1,
            maintenance_signals: 0,
            checklist_signals: 0,
        };
        let derived_from = DerivedFrom {
            risk_assessment: true,
            financial_exposure: true,
            ..DerivedFrom::default()
        };

        let summary = OrchestrationEngine::default().summarize(
            PropertyId("prop-7".to_string()),
            vec![
                candidate("gutter", RiskLevel::Low, None),
                candidate("leak", RiskLevel::Critical, Some(12_000.0)),
                snoozed,
                duplicate,
            ],
            counts,
            derived_from,
            now(),
        );

        assert_eq!(summary.pending_action_count, 2);
        assert_eq!(summary.actions[0].id.0, "leak");
        assert_eq!(summary.actions[0].score(), 100);
        assert_eq!(summary.actions[1].id.0, "gutter");
        assert_eq!(summary.snoozed_actions.len(), 1);
        assert_eq!(summary.suppressed_actions.len(), 1);
        assert_eq!(
            summary.suppressed_actions[0].suppression.reasons()[0].code,
            SuppressionCode::DuplicateOpenAction
        );
        assert_eq!(summary.counts, counts);
        assert_eq!(summary.derived_from, derived_from);
    }

    #[test]
    fn suppressed_actions_lose_the_unblocked_bonus() {
        let mut stale = candidate("stale", RiskLevel::High, Some(6000.0));
        stale.observed_at = now() - Duration::days(400);

        let annotated = OrchestrationEngine::default().annotate(vec![stale], now());
        let confidence = annotated[0].confidence.as_ref().expect("scored");
        assert_eq!(confidence.score, 90);
        assert_eq!(confidence.level, ConfidenceLevel::High);
        assert_eq!(confidence.explanation.len(), 2);
    }

    #[test]
    fn upstream_confidence_replaces_the_computed_score() {
        let mut item = candidate("remote", RiskLevel::Low, None);
        item.upstream_confidence = Some(42);

        let annotated = OrchestrationEngine::default().annotate(vec![item], now());
        let confidence = annotated[0].confidence.as_ref().expect("scored");
        assert_eq!(confidence.score, 42);
        assert_eq!(confidence.level, ConfidenceLevel::Low);
    }

    #[test]
    fn suppression_invariant_holds_for_every_action() {
        let policy = SuppressionPolicy {
            stale_after_days: 30,
            minimum_risk: RiskLevel::Medium,
        };
        let mut old = candidate("old", RiskLevel::High, None);
        old.observed_at = now() - Duration::days(31);

        let annotated = OrchestrationEngine::new(policy).annotate(
            vec![
                old,
                candidate("minor", RiskLevel::Low, None),
                candidate("ok", RiskLevel::Medium, None),
            ],
            now(),
        );

        for action in annotated {
            assert_eq!(
                action.suppression.suppressed(),
                !action.suppression.reasons().is_empty()
            );
        }
    }
}

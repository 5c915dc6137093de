use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use super::domain::{
    ActionId, CandidateAction, RiskLevel, Suppression, SuppressionCode, SuppressionReason,
};

const DEFAULT_STALE_AFTER_DAYS: i64 = 90;

/// Thresholds for the gating rules. Rule order itself is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressionPolicy {
    pub stale_after_days: i64,
    pub minimum_risk: RiskLevel,
}

impl SuppressionPolicy {
    /// Age after which a signal counts as stale. `None` for a negative or unrepresentable window.
    pub fn stale_window(&self) -> Option<Duration> {
        if self.stale_after_days < 0 {
            return None;
        }
        Duration::try_days(self.stale_after_days)
    }
}

impl Default for SuppressionPolicy {
    fn default() -> Self {
        Self {
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
            minimum_risk: RiskLevel::Low,
        }
    }
}

/// Everything the rules read besides the candidate itself.
#[derive(Debug, Clone, Copy)]
pub struct SuppressionContext<'a> {
    pub policy: &'a SuppressionPolicy,
    pub now: DateTime<Utc>,
    pub open_actions: &'a HashSet<ActionId>,
}

/// Apply every rule and collect all matching reasons in rule-priority order.
pub fn evaluate_suppression(
    candidate: &CandidateAction,
    context: &SuppressionContext<'_>,
) -> Suppression {
    let mut reasons = Vec::new();

    // A window reaching past the representable range never marks anything stale.
    let stale_cutoff = context
        .policy
        .stale_window()
        .and_then(|window| context.now.checked_sub_signed(window));
    if stale_cutoff.is_some_and(|cutoff| candidate.observed_at < cutoff) {
        reasons.push(SuppressionReason {
            code: SuppressionCode::StaleData,
            message: format!(
                "Signal data is older than {} days",
                context.policy.stale_after_days
            ),
        });
    }

    if let Some(original) = &candidate.duplicate_of {
        if original != &candidate.id && context.open_actions.contains(original) {
            reasons.push(SuppressionReason {
                code: SuppressionCode::DuplicateOpenAction,
                message: format!("Duplicates open action {original}"),
            });
        }
    }

    if let Some(until) = candidate.snoozed_until {
        if until > context.now {
            reasons.push(SuppressionReason {
                code: SuppressionCode::Snoozed,
                message: format!("Snoozed until {}", until.format("%Y-%m-%d")),
            });
        }
    }

    if candidate.risk_level < context.policy.minimum_risk {
        reasons.push(SuppressionReason {
            code: SuppressionCode::BelowSeverityThreshold,
            message: format!(
                "Risk level {} is below the {} threshold",
                candidate.risk_level, context.policy.minimum_risk
            ),
        });
    }

    Suppression::from_reasons(reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::orchestration::domain::PropertyId;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap()
    }

    fn candidate(id: &str) -> CandidateAction {
        CandidateAction {
            id: ActionId(id.to_string()),
            property_id: PropertyId("prop-1".to_string()),
            title: "Inspect roof flashing".to_string(),
            category: "roof".to_string(),
            risk_level: RiskLevel::Medium,
            exposure: None,
            upstream_confidence: None,
            observed_at: now() - Duration::days(3),
            duplicate_of: None,
            snoozed_until: None,
        }
    }

    #[test]
    fn fresh_unique_candidate_is_surfaced() {
        let policy = SuppressionPolicy::default();
        let open = HashSet::new();
        let context = SuppressionContext {
            policy: &policy,
            now: now(),
            open_actions: &open,
        };

        let verdict = evaluate_suppression(&candidate("a"), &context);
        assert!(!verdict.suppressed());
        assert!(verdict.reasons().is_empty());
    }

    #[test]
    fn collects_every_reason_in_priority_order() {
        let policy = SuppressionPolicy {
            stale_after_days: 30,
            minimum_risk: RiskLevel::High,
        };
        let open: HashSet<ActionId> = [ActionId("a".to_string())].into_iter().collect();
        let context = SuppressionContext {
            policy: &policy,
            now: now(),
            open_actions: &open,
        };

        let mut dup = candidate("b");
        dup.observed_at = now() - Duration::days(45);
        dup.duplicate_of = Some(ActionId("a".to_string()));
        dup.snoozed_until = Some(now() + Duration::days(2));

        let verdict = evaluate_suppression(&dup, &context);
        assert!(verdict.suppressed());
        let codes: Vec<_> = verdict.reasons().iter().map(|reason| reason.code).collect();
        assert_eq!(
            codes,
            vec![
                SuppressionCode::StaleData,
                SuppressionCode::DuplicateOpenAction,
                SuppressionCode::Snoozed,
                SuppressionCode::BelowSeverityThreshold,
            ]
        );
        assert!(verdict.is_snoozed());
        assert_eq!(
            verdict.summary(),
            "Signal data is older than 30 days • Duplicates open action a • Snoozed until 2025-10-03 • Risk level MEDIUM is below the HIGH threshold"
        );
    }

    #[test]
    fn expired_snooze_and_closed_duplicate_do_not_suppress() {
        let policy = SuppressionPolicy::default();
        let open = HashSet::new();
        let context = SuppressionContext {
            policy: &policy,
            now: now(),
            open_actions: &open,
        };

        let mut item = candidate("c");
        item.snoozed_until = Some(now() - Duration::hours(1));
        item.duplicate_of = Some(ActionId("closed".to_string()));

        let verdict = evaluate_suppression(&item, &context);
        assert!(!verdict.suppressed());
    }

    #[test]
    fn evaluation_is_deterministic() {
        let policy = SuppressionPolicy {
            stale_after_days: 1,
            minimum_risk: RiskLevel::Critical,
        };
        let open = HashSet::new();
        let context = SuppressionContext {
            policy: &policy,
            now: now(),
            open_actions: &open,
        };
        let item = candidate("d");

        assert_eq!(
            evaluate_suppression(&item, &context),
            evaluate_suppression(&item, &context)
        );
    }

    #[test]
    fn oversized_or_negative_window_never_marks_stale() {
        let open = HashSet::new();
        let mut ancient = candidate("e");
        ancient.observed_at = now() - Duration::days(3650);

        for stale_after_days in [i64::MAX / 1000, i64::MAX, -5] {
            let policy = SuppressionPolicy {
                stale_after_days,
                ..SuppressionPolicy::default()
            };
            assert!(policy.stale_window().is_none());
            let context = SuppressionContext {
                policy: &policy,
                now: now(),
                open_actions: &open,
            };

            let verdict = evaluate_suppression(&ancient, &context);
            assert!(!verdict.suppressed(), "window {stale_after_days}");
        }
    }
}

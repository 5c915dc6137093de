use std::cmp::Ordering;

use super::domain::OrchestratedAction;

/// Disjoint display lists produced from one annotated candidate set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionedActions {
    pub actions: Vec<OrchestratedAction>,
    pub suppressed: Vec<OrchestratedAction>,
    pub snoozed: Vec<OrchestratedAction>,
}

/// Split by suppression verdict, then order each list for display.
///
/// A snoozed action lands only in `snoozed`, even when other reasons also apply.
pub fn partition_actions(annotated: Vec<OrchestratedAction>) -> PartitionedActions {
    let mut partitioned = PartitionedActions::default();

    for action in annotated {
        if !action.suppression.suppressed() {
            partitioned.actions.push(action);
        } else if action.suppression.is_snoozed() {
            partitioned.snoozed.push(action);
        } else {
            partitioned.suppressed.push(action);
        }
    }

    rank(&mut partitioned.actions);
    rank(&mut partitioned.suppressed);
    rank(&mut partitioned.snoozed);
    partitioned
}

/// Descending score, then descending risk severity; `sort_by` keeps input order for ties.
pub fn rank(actions: &mut [OrchestratedAction]) {
    actions.sort_by(display_order);
}

fn display_order(left: &OrchestratedAction, right: &OrchestratedAction) -> Ordering {
    right
        .score()
        .cmp(&left.score())
        .then_with(|| right.risk_level.cmp(&left.risk_level))
}

//! Completion lifecycles.
//!
//! Micro-actions complete one way: `Pending -> Completed | Dismissed`, with no way back.
//! Checklist items toggle: `Open <-> Done`. Both answer the same question for a requested move:
//! apply it, treat it as an already-applied retry, or refuse it.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCheck {
    Apply,
    AlreadyApplied,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid state transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: &'static str,
    pub to: &'static str,
}

pub trait LifecycleState: Copy + Eq + fmt::Display {
    fn label(self) -> &'static str;

    fn check(self, target: Self) -> Result<TransitionCheck, TransitionError>;

    fn refuse(self, target: Self) -> TransitionError {
        TransitionError {
            from: self.label(),
            to: target.label(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MicroActionStatus {
    Pending,
    Completed,
    Dismissed,
}

impl MicroActionStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Dismissed)
    }
}

impl LifecycleState for MicroActionStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Dismissed => "DISMISSED",
        }
    }

    fn check(self, target: Self) -> Result<TransitionCheck, TransitionError> {
        match (self, target) {
            (Self::Pending, Self::Completed) | (Self::Pending, Self::Dismissed) => {
                Ok(TransitionCheck::Apply)
            }
            (from, to) if from == to && from.is_terminal() => Ok(TransitionCheck::AlreadyApplied),
            (from, to) => Err(from.refuse(to)),
        }
    }
}

impl fmt::Display for MicroActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChecklistItemStatus {
    Open,
    Done,
}

impl LifecycleState for ChecklistItemStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Done => "DONE",
        }
    }

    fn check(self, target: Self) -> Result<TransitionCheck, TransitionError> {
        if self == target {
            Ok(TransitionCheck::AlreadyApplied)
        } else {
            Ok(TransitionCheck::Apply)
        }
    }
}

impl fmt::Display for ChecklistItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

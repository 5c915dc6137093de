//! Action orchestration and confidence engine for property maintenance.
//!
//! Raw property signals are normalized, gated by suppression rules, scored, and ranked into an
//! orchestration summary. Micro-actions and claim checklists move through explicit completion
//! and gating state machines, with photo evidence captured through a concurrent upload pipeline.

pub mod clock;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

//! Saga step log and terminal saga events (§4.4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of one [`SagaStep`] within a [`SagaLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    /// The step is in flight.
    Executing,
    /// The step finished successfully.
    Completed,
    /// The step failed; `error` on the [`SagaStep`] carries why.
    Failed,
}

/// One entry in the append-only saga log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaStep {
    /// 1-based position in the saga (1..=3).
    pub step: u8,
    /// What this step did, e.g. `"CreateOrder"` or `"CancelOrder (compensation)"`.
    pub action: String,
    /// Outcome of the step.
    pub status: StepStatus,
    /// When the step was recorded.
    pub timestamp: DateTime<Utc>,
    /// Present only when `status == Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SagaStep {
    /// Records a completed step.
    #[must_use]
    pub fn completed(step: u8, action: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            step,
            action: action.into(),
            status: StepStatus::Completed,
            timestamp: now,
            error: None,
        }
    }

    /// Records a failed step.
    #[must_use]
    pub fn failed(step: u8, action: impl Into<String>, now: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            step,
            action: action.into(),
            status: StepStatus::Failed,
            timestamp: now,
            error: Some(error.into()),
        }
    }
}

/// Result of one full `execute` call (§4.4's contract).
#[derive(Debug, Clone, Serialize)]
pub struct SagaOutcome {
    /// `true` only when all three forward steps completed.
    pub success: bool,
    /// The append-only step log, always returned regardless of outcome.
    pub saga_log: Vec<SagaStep>,
}

/// How the forward path terminated, used to pick the one terminal bus event
/// (`SagaFailed` / `SagaCompensated` / `SagaCompleted`) published per execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    /// Step 1 (`CreateOrder`) failed outright; nothing to compensate.
    SagaFailed,
    /// Step 2 failed and step 3' (`CancelOrder`) ran as compensation.
    SagaCompensated,
    /// The saga reached its end, whether or not step 3 itself succeeded
    /// (§9: a failed `ConfirmOrder` still reports `success:true`).
    SagaCompleted,
}

impl TerminalEvent {
    /// The `event_type` string published to the `saga_events` bus channel.
    #[must_use]
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::SagaFailed => "SagaFailed",
            Self::SagaCompensated => "SagaCompensated",
            Self::SagaCompleted => "SagaCompleted",
        }
    }
}

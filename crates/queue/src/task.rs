//! Task kinds and payloads for deferred workflow execution.

use {
    apiary_common::{AccountId, ChatId, UserId, WorkflowId},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    std::time::Duration,
};

use crate::{error::Result, schedule};

/// One-shot workflow execution after a fixed delay.
pub const KIND_WORKFLOW_DELAY: &str = "workflow:delay";
/// Recurring workflow execution on a cron schedule.
pub const KIND_WORKFLOW_SCHEDULE: &str = "workflow:schedule";

/// Payload of a [`KIND_WORKFLOW_DELAY`] task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayedWorkflowPayload {
    pub workflow_id: WorkflowId,
    pub account_id: AccountId,
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub delay_seconds: u64,
}

/// Payload of a [`KIND_WORKFLOW_SCHEDULE`] task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledWorkflowPayload {
    pub workflow_id: WorkflowId,
    pub account_id: AccountId,
    /// 5-field cron expression, validated at enqueue time.
    pub cron: String,
}

/// One unit of deferred work, as handed to the queue backend.
#[derive(Debug, Clone)]
pub struct QueuedTask {
    pub kind: &'static str,
    pub payload: Value,
    /// Deliver no earlier than this far in the future.
    pub run_after: Option<Duration>,
}

impl QueuedTask {
    /// Build a delayed-workflow task. Delivery is deferred by the payload's
    /// own delay.
    pub fn delayed_workflow(payload: &DelayedWorkflowPayload) -> Result<Self> {
        Ok(Self {
            kind: KIND_WORKFLOW_DELAY,
            payload: serde_json::to_value(payload)?,
            run_after: Some(Duration::from_secs(payload.delay_seconds)),
        })
    }

    /// Build a scheduled-workflow task. The cron expression is validated
    /// here so a broken schedule fails the enqueue instead of producing a
    /// job that never fires.
    pub fn scheduled_workflow(payload: &ScheduledWorkflowPayload) -> Result<Self> {
        schedule::parse(&payload.cron)?;
        Ok(Self {
            kind: KIND_WORKFLOW_SCHEDULE,
            payload: serde_json::to_value(payload)?,
            run_after: None,
        })
    }
}

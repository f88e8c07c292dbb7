//! Terminal handlers for delivered tasks.
//!
//! No workflow execution engine is attached yet, so both kinds decode
//! their payload, log it, and return. Queue consumers can already drain
//! deliveries; the engine slots in here when it lands.

use tracing::info;

use crate::{
    error::{Error, Result},
    task::{
        DelayedWorkflowPayload, KIND_WORKFLOW_DELAY, KIND_WORKFLOW_SCHEDULE, QueuedTask,
        ScheduledWorkflowPayload,
    },
};

/// Dispatch one delivered task to its handler.
pub async fn handle_task(task: &QueuedTask) -> Result<()> {
    match task.kind {
        KIND_WORKFLOW_DELAY => {
            let payload: DelayedWorkflowPayload = serde_json::from_value(task.payload.clone())?;
            info!(
                workflow_id = %payload.workflow_id,
                account_id = %payload.account_id,
                chat_id = payload.chat_id,
                delay_seconds = payload.delay_seconds,
                "delayed workflow due, no execution engine attached"
            );
            Ok(())
        },
        KIND_WORKFLOW_SCHEDULE => {
            let payload: ScheduledWorkflowPayload = serde_json::from_value(task.payload.clone())?;
            info!(
                workflow_id = %payload.workflow_id,
                account_id = %payload.account_id,
                cron = %payload.cron,
                "scheduled workflow due, no execution engine attached"
            );
            Ok(())
        },
        other => Err(Error::unknown_kind(other)),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json, uuid::Uuid};

    #[tokio::test]
    async fn test_both_kinds_terminate_cleanly() {
        let delayed = QueuedTask::delayed_workflow(&DelayedWorkflowPayload {
            workflow_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            chat_id: 5,
            user_id: 42,
            delay_seconds: 10,
        })
        .unwrap();
        handle_task(&delayed).await.unwrap();

        let scheduled = QueuedTask::scheduled_workflow(&ScheduledWorkflowPayload {
            workflow_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            cron: "0 9 * * *".into(),
        })
        .unwrap();
        handle_task(&scheduled).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_kind_is_rejected() {
        let task = QueuedTask { kind: "workflow:unknown", payload: json!({}), run_after: None };
        assert!(matches!(handle_task(&task).await, Err(Error::UnknownKind { .. })));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_rejected() {
        let task =
            QueuedTask { kind: KIND_WORKFLOW_DELAY, payload: json!({"nope": true}), run_after: None };
        assert!(matches!(handle_task(&task).await, Err(Error::Json(_))));
    }
}

//! Deferred-work capability: task shapes, cron validation, and the queue
//! seam.
//!
//! Sessions hand tasks to a [`JobQueue`] and move on; delivery timing and
//! retries belong to the backend. Delivered tasks are dispatched through
//! [`handler::handle_task`], which currently terminates both kinds without
//! side effects because no workflow execution engine is attached yet.

pub mod error;
pub mod handler;
pub mod memory;
pub mod schedule;
pub mod task;

pub use {
    error::{Error, Result},
    memory::MemoryJobQueue,
    task::{
        DelayedWorkflowPayload, KIND_WORKFLOW_DELAY, KIND_WORKFLOW_SCHEDULE, QueuedTask,
        ScheduledWorkflowPayload,
    },
};

use async_trait::async_trait;

/// The queue backend seam. Enqueue-only on this side.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, task: QueuedTask) -> Result<()>;
}

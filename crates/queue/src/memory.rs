//! In-memory queue backend for tests and local runs. Records tasks; never
//! delivers them on its own.

use {
    async_trait::async_trait,
    std::sync::{Mutex, MutexGuard},
};

use crate::{JobQueue, error::Result, task::QueuedTask};

#[derive(Default)]
pub struct MemoryJobQueue {
    tasks: Mutex<Vec<QueuedTask>>,
}

impl MemoryJobQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything enqueued so far, in order.
    #[must_use]
    pub fn pending(&self) -> Vec<QueuedTask> {
        lock(&self.tasks).clone()
    }

    /// Take every recorded task, leaving the queue empty.
    #[must_use]
    pub fn drain(&self) -> Vec<QueuedTask> {
        lock(&self.tasks).drain(..).collect()
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn enqueue(&self, task: QueuedTask) -> Result<()> {
        lock(&self.tasks).push(task);
        Ok(())
    }
}

fn lock(mutex: &Mutex<Vec<QueuedTask>>) -> MutexGuard<'_, Vec<QueuedTask>> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

//! Scheduled-task registry: delayed background actions registered at
//! confirmation time (fee release, reminder) and cancellable by name
//! before they fire.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use crate::domain::{GigId, SchedulerError};

/// What a scheduled task does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Release the held performer fee after the gig.
    FeeRelease,
    /// Send the automatic reminder message before the gig.
    Reminder,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FeeRelease => write!(f, "fee_release"),
            Self::Reminder => write!(f, "reminder"),
        }
    }
}

/// A delayed task held by the registry, addressable by its opaque name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub name: String,
    pub gig_id: GigId,
    pub kind: TaskKind,
    /// RFC3339 fire time.
    pub fire_at: String,
}

/// Registry of per-booking delayed tasks.
#[async_trait]
pub trait ScheduledTaskRegistry: Send + Sync {
    async fn schedule(&self, task: ScheduledTask) -> Result<(), SchedulerError>;

    /// Cancel a task before it fires. Errors if no task of that name is
    /// held — callers that treat cancellation as best-effort must handle
    /// this themselves.
    async fn cancel(&self, task_name: &str) -> Result<(), SchedulerError>;
}

/// Registry keeping tasks in process memory.
#[derive(Default)]
pub struct InMemoryTaskRegistry {
    tasks: Mutex<HashMap<String, ScheduledTask>>,
}

impl InMemoryTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the tasks currently held.
    pub fn pending(&self) -> Vec<String> {
        let tasks = self.tasks.lock().unwrap();
        let mut names: Vec<String> = tasks.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ScheduledTaskRegistry for InMemoryTaskRegistry {
    async fn schedule(&self, task: ScheduledTask) -> Result<(), SchedulerError> {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.insert(task.name.clone(), task);
        Ok(())
    }

    async fn cancel(&self, task_name: &str) -> Result<(), SchedulerError> {
        let mut tasks = self.tasks.lock().unwrap();
        tasks
            .remove(task_name)
            .map(|_| ())
            .ok_or_else(|| SchedulerError::TaskNotFound(task_name.to_string()))
    }
}

// Task entity models
// Status is one-way progressing; priority is an ordinal code on the wire

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a task
///
/// Progresses one way; there is no transition back to an earlier status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Queued, not yet picked up by an agent
    Pending,
    /// Currently executing
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
    /// Cancelled before completion
    Cancelled,
}

impl TaskStatus {
    /// Whether the server will accept a cancel for a task in this status
    ///
    /// The backend rejects cancellation of tasks that have already reached a
    /// terminal status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }

    /// Whether the task has reached a terminal status
    pub fn is_terminal(&self) -> bool {
        !self.can_cancel()
    }
}

/// Priority level of a task, serialized as its ordinal code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskPriority {
    /// Code 0
    Low,
    /// Code 1
    Medium,
    /// Code 2
    High,
    /// Code 3
    Critical,
}

impl TryFrom<u8> for TaskPriority {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TaskPriority::Low),
            1 => Ok(TaskPriority::Medium),
            2 => Ok(TaskPriority::High),
            3 => Ok(TaskPriority::Critical),
            other => Err(format!("Unknown task priority code: {}", other)),
        }
    }
}

impl From<TaskPriority> for u8 {
    fn from(priority: TaskPriority) -> u8 {
        match priority {
            TaskPriority::Low => 0,
            TaskPriority::Medium => 1,
            TaskPriority::High => 2,
            TaskPriority::Critical => 3,
        }
    }
}

/// Task record as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Short title
    pub title: String,
    /// Longer description of the work
    pub description: String,
    /// Id of the agent assigned to the task (lookup only, no ownership)
    pub agent_id: String,
    /// Current lifecycle status
    pub status: TaskStatus,
    /// Priority level
    pub priority: TaskPriority,
    /// When the task was created
    pub created_at: DateTime<Utc>,
    /// When execution started, if it has
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When execution finished, if it has
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Validate a task decoded from a server payload
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Task id cannot be empty".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("Task title cannot be empty".to_string());
        }
        if self.status == TaskStatus::Pending && self.completed_at.is_some() {
            return Err("Pending task cannot have a completion time".to_string());
        }
        Ok(())
    }
}

/// Payload for creating a new task
#[derive(Debug, Clone, Serialize)]
pub struct TaskCreate {
    /// Short title
    pub title: String,
    /// Longer description of the work
    pub description: String,
    /// Id of the agent to run the task
    pub agent_id: String,
    /// Priority level
    pub priority: TaskPriority,
}

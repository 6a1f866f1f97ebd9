// Resource bindings for the three entity kinds

use crate::models::{
    Agent, AgentCreate, Task, TaskCreate, Tool, ToolCreate,
};
use crate::store::{Action, Resource, ResourceStore};

/// Store over [`Agent`] entities
pub type AgentStore = ResourceStore<Agent>;
/// Store over [`Task`] entities
pub type TaskStore = ResourceStore<Task>;
/// Store over [`Tool`] entities
pub type ToolStore = ResourceStore<Tool>;

impl Resource for Agent {
    const COLLECTION: &'static str = "agents";
    const LABEL: &'static str = "agent";
    type CreateInput = AgentCreate;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        Agent::validate(self)
    }
}

impl Resource for Task {
    const COLLECTION: &'static str = "tasks";
    const LABEL: &'static str = "task";
    type CreateInput = TaskCreate;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        Task::validate(self)
    }
}

impl Resource for Tool {
    const COLLECTION: &'static str = "tools";
    const LABEL: &'static str = "tool";
    type CreateInput = ToolCreate;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        Tool::validate(self)
    }
}

impl TaskStore {
    /// Cancel a task
    ///
    /// Expressed as the DELETE verb on the task; the server returns the
    /// updated (cancelled) task rather than removing it, and the cached
    /// entry is replaced in place.
    pub async fn cancel(&self, id: &str) -> Result<Task, crate::error::OperationError> {
        self.update_by_action(id, Action::cancel()).await
    }
}

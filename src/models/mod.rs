//! Typed entity models for the Omnia API
//!
//! Server payloads are decoded into tagged records and validated before they
//! enter any cache, never passed through untyped. Unknown enum values and
//! out-of-range priority codes fail decode outright.

mod agent;
mod task;
mod tool;
mod user;

pub use agent::{Agent, AgentCapability, AgentCreate, AgentType};
pub use task::{Task, TaskCreate, TaskPriority, TaskStatus};
pub use tool::{Tool, ToolCreate, ToolExecutionEnvironment, ToolInput, ToolType};
pub use user::{Identity, Token, UserCreate, UserResponse};

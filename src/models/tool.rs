// Tool entity models

use serde::{Deserialize, Serialize};

/// Type of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    /// Drives a web browser
    Browser,
    /// Drives a local application
    LocalApp,
    /// Calls an external API
    Api,
    /// Runs system commands
    System,
    /// User-defined tool
    Custom,
}

/// Where a tool executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolExecutionEnvironment {
    /// Backend cloud infrastructure
    Cloud,
    /// The user's machine
    Local,
    /// Isolated sandbox
    Sandbox,
}

/// Declared input parameter of a tool
///
/// Order matters; the server returns parameters in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInput {
    /// Parameter name
    pub name: String,
    /// Whether the parameter must be supplied
    #[serde(default)]
    pub required: bool,
    /// Optional human-readable description
    #[serde(default)]
    pub description: Option<String>,
}

/// Tool record as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// Kind of tool
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    /// Where the tool executes
    pub execution_environment: ToolExecutionEnvironment,
    /// Declared input parameters, in declaration order
    #[serde(default)]
    pub inputs: Vec<ToolInput>,
}

impl Tool {
    /// Validate a tool decoded from a server payload
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Tool id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Tool name cannot be empty".to_string());
        }
        for input in &self.inputs {
            if input.name.trim().is_empty() {
                return Err("Tool input name cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

/// Payload for creating a new tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolCreate {
    /// Display name
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// Kind of tool
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    /// Where the tool executes
    pub execution_environment: ToolExecutionEnvironment,
    /// Declared input parameters
    pub inputs: Vec<ToolInput>,
}

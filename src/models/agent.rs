// Agent entity models
// Mirrors the server's agent representation with typed enums

use serde::{Deserialize, Serialize};

/// Type of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    /// Runs entirely on the backend's cloud infrastructure
    Cloud,
    /// Runs on the user's local machine
    Local,
    /// Mixed cloud/local execution
    Hybrid,
}

/// Capability tag an agent can advertise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCapability {
    /// Generate free-form text
    TextGeneration,
    /// Generate source code
    CodeGeneration,
    /// Understand image inputs
    ImageUnderstanding,
    /// Execute commands on the local machine
    LocalExecution,
    /// Browse the web
    WebBrowsing,
    /// Read and write local files
    FileManagement,
    /// Control local applications
    AppControl,
    /// Analyze structured data
    DataAnalysis,
}

/// Agent record as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Where the agent executes
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    /// Capability tags advertised by the agent
    #[serde(default)]
    pub capabilities: Vec<AgentCapability>,
    /// Id of the owning user
    pub owner_id: String,
    /// Whether the agent is active
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Agent {
    /// Validate an agent decoded from a server payload
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Agent id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Agent name cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Payload for creating a new agent
#[derive(Debug, Clone, Serialize)]
pub struct AgentCreate {
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Where the agent executes
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    /// Capability tags the agent should advertise
    pub capabilities: Vec<AgentCapability>,
    /// Id of the owning user
    pub owner_id: String,
}

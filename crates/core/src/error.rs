//! Error types for MirrorBrain.

use thiserror::Error;

/// Result type alias using MirrorBrain's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for MirrorBrain.
///
/// Low classifier confidence and executor deferral are routing signals, not
/// errors, and never appear here. Tool failures inside a reasoning-loop
/// iteration are converted to observations by the loop itself; the variants
/// below are the conditions that surface to a caller.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Tool Registry & Execution
    // =========================================================================
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // =========================================================================
    // Generation Capability
    // =========================================================================
    #[error("No language-generation capability is ready")]
    ModelUnavailable,

    #[error("Generation failed: {0}")]
    ModelGeneration(String),

    // =========================================================================
    // Mesh Relay
    // =========================================================================
    #[error("Mesh relay is not connected")]
    MeshNotConnected,

    #[error("Mesh send failed: {0}")]
    MeshSend(String),

    // =========================================================================
    // Session Control
    // =========================================================================
    #[error("A reasoning or relay operation is already in flight for this session")]
    SessionBusy,

    #[error("Operation cancelled")]
    Cancelled,

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound(name.into())
    }

    /// Create a tool execution error.
    pub fn tool_execution(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a generation failure error.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::ModelGeneration(msg.into())
    }

    /// Create a mesh send error.
    pub fn mesh_send(msg: impl Into<String>) -> Self {
        Self::MeshSend(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

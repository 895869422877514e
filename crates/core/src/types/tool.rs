use serde::{Deserialize, Serialize};

// =============================================================================
// Tool Types
// =============================================================================

/// Output of a tool invocation.
///
/// `deferred` is a first-class outcome: it means the tool could not resolve
/// the request autonomously (an ambiguous argument, a judgment call) and the
/// caller must fall through to the reasoning loop. It is never smuggled
/// through `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Whether the invocation succeeded.
    pub ok: bool,

    /// Human-readable result or diagnostic.
    pub message: String,

    /// The tool declined to handle the request; route to the slow path.
    #[serde(default)]
    pub deferred: bool,

    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolOutput {
    /// Create a successful text output.
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            deferred: false,
            data: None,
        }
    }

    /// Create a failed output.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            deferred: false,
            data: None,
        }
    }

    /// Create a deferred output: the fast path cannot resolve this request.
    pub fn deferred(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: reason.into(),
            deferred: true,
            data: None,
        }
    }

    /// Attach structured data.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Static description of a registered tool, used for prompt building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// JSON Schema for tool arguments.
    pub parameters: serde_json::Value,

    /// Whether the tool needs connectivity (gated while offline).
    #[serde(default)]
    pub requires_network: bool,
}

// =============================================================================
// Executor Outcome
// =============================================================================

/// Tagged result of the action executor.
///
/// Callers must branch on this; there is no flag to forget. `Deferred`
/// always means "route to the slow path without reclassifying".
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// The fast path resolved the intent.
    Handled(ToolOutput),

    /// The fast path could not resolve it; the reason is a diagnostic, not
    /// a user-facing message.
    Deferred { reason: String },
}

impl ActionOutcome {
    /// Convenience accessor for tests.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

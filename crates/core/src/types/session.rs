use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Session & Transcript Types
// =============================================================================

/// Who produced a session message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Where the slow path routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    /// Local reasoning loop against the on-device generation capability.
    Local,
    /// Relay to a remote peer over the mesh.
    Mesh,
}

/// Conversation state owned by the orchestrator.
///
/// Single-writer: only the session controller mutates it, and only outside
/// of an in-flight reasoning or relay operation (except to record the final
/// answer at completion). `in_flight` is true for the whole duration of one
/// slow-path operation; a second request is rejected while it is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub messages: Vec<Message>,
    pub mode: SessionMode,
    pub in_flight: bool,
}

impl Session {
    pub fn new(mode: SessionMode) -> Self {
        Self {
            messages: Vec::new(),
            mode,
            in_flight: false,
        }
    }
}

// =============================================================================
// Reasoning-Loop Transcript
// =============================================================================

/// One Thought/Action/Observation step of a reasoning-loop run.
///
/// Steps are append-only within a run and discarded when the run completes;
/// only the final answer reaches the session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReActStep {
    pub thought: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
}

impl ReActStep {
    /// A step where the generation produced no action and no final answer.
    pub fn thought_only(thought: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            action: None,
            action_input: None,
            observation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle_and_empty() {
        let s = Session::new(SessionMode::Local);
        assert!(s.messages.is_empty());
        assert!(!s.in_flight);
        assert_eq!(s.mode, SessionMode::Local);
    }

    #[test]
    fn mode_serde_is_kebab_case() {
        assert_eq!(serde_json::to_string(&SessionMode::Mesh).unwrap(), "\"mesh\"");
    }

    #[test]
    fn thought_only_step_has_no_action_fields_in_json() {
        let step = ReActStep::thought_only("hmm");
        let json = serde_json::to_string(&step).unwrap();
        assert!(!json.contains("action"));
        assert!(!json.contains("observation"));
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Mesh Wire Types
// =============================================================================

/// Envelope type for chat relay messages.
pub const ENVELOPE_CHAT: &str = "chat";

/// JSON envelope exchanged with the mesh relay.
///
/// Transient: one envelope exists only for the duration of a relay
/// round-trip. `correlation_id` is optional on the wire so peers that only
/// correlate by sender identity stay compatible; replies that echo it are
/// matched precisely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshEnvelope {
    /// Envelope discriminator; chat relays use [`ENVELOPE_CHAT`].
    #[serde(rename = "type")]
    pub envelope_type: String,

    /// Sender peer id.
    pub from: String,

    /// Recipient peer id.
    pub to: String,

    /// Message body.
    pub content: String,

    /// Request/reply correlation id, echoed by cooperative peers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl MeshEnvelope {
    /// Build a chat envelope with a fresh correlation id.
    pub fn chat(from: impl Into<String>, to: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            envelope_type: ENVELOPE_CHAT.to_string(),
            from: from.into(),
            to: to.into(),
            content: content.into(),
            correlation_id: Some(Uuid::new_v4().to_string()),
        }
    }

    /// Build a reply to this envelope, echoing its correlation id.
    pub fn reply(&self, content: impl Into<String>) -> Self {
        Self {
            envelope_type: ENVELOPE_CHAT.to_string(),
            from: self.to.clone(),
            to: self.from.clone(),
            content: content.into(),
            correlation_id: self.correlation_id.clone(),
        }
    }

    /// Whether this envelope is a chat message from the given peer.
    pub fn is_chat_from(&self, peer: &str) -> bool {
        self.envelope_type == ENVELOPE_CHAT && self.from == peer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_envelope_carries_fresh_correlation_id() {
        let a = MeshEnvelope::chat("me", "brain", "hi");
        let b = MeshEnvelope::chat("me", "brain", "hi");
        assert!(a.correlation_id.is_some());
        assert_ne!(a.correlation_id, b.correlation_id);
    }

    #[test]
    fn reply_echoes_correlation_and_swaps_peers() {
        let req = MeshEnvelope::chat("watch", "brain", "ping");
        let rep = req.reply("pong");
        assert_eq!(rep.from, "brain");
        assert_eq!(rep.to, "watch");
        assert_eq!(rep.correlation_id, req.correlation_id);
        assert!(rep.is_chat_from("brain"));
    }

    #[test]
    fn wire_format_uses_type_field() {
        let env = MeshEnvelope::chat("a", "b", "x");
        let json = serde_json::to_string(&env).unwrap();
        assert!(json.contains("\"type\":\"chat\""));
    }

    #[test]
    fn envelope_without_correlation_id_deserializes() {
        let json = r#"{"type":"chat","from":"brain","to":"watch","content":"late"}"#;
        let env: MeshEnvelope = serde_json::from_str(json).unwrap();
        assert!(env.correlation_id.is_none());
        assert!(env.is_chat_from("brain"));
    }
}

//! Structured progress events.
//!
//! Progress reporting is a typed channel, not callbacks: the engine emits
//! [`EngineEvent`]s through an [`EventSink`] and has no knowledge of how the
//! presentation layer renders them. Emission never blocks and cannot alter
//! engine state; a dropped receiver is silently ignored.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Progress event emitted while handling an utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// The reasoning loop produced (or implied) a thought.
    Thought { summary: String },

    /// The reasoning loop is about to invoke a tool.
    ActionStarted { tool: String },

    /// A tool invocation finished.
    ActionFinished { tool: String, ok: bool },

    /// A mesh reply arrived after its round-trip timed out; this is the
    /// out-of-band surface for late answers.
    RelayReply { from: String, content: String },
}

/// Clonable, non-blocking sender for [`EngineEvent`]s.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<EngineEvent>>,
}

impl EventSink {
    /// Create a sink and the receiver the presentation layer consumes.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops every event; for tests and headless use.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Emit an event. Never blocks, never fails.
    pub fn emit(&self, event: EngineEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_arrive_in_emission_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.emit(EngineEvent::ActionStarted {
            tool: "vibrate_device".into(),
        });
        sink.emit(EngineEvent::ActionFinished {
            tool: "vibrate_device".into(),
            ok: true,
        });
        assert!(matches!(
            rx.recv().await,
            Some(EngineEvent::ActionStarted { .. })
        ));
        assert!(matches!(
            rx.recv().await,
            Some(EngineEvent::ActionFinished { ok: true, .. })
        ));
    }

    #[test]
    fn disabled_sink_swallows_events() {
        let sink = EventSink::disabled();
        sink.emit(EngineEvent::Thought {
            summary: "nobody listening".into(),
        });
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_fail_emit() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit(EngineEvent::Thought {
            summary: "still fine".into(),
        });
    }
}

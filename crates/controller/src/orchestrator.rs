//! Session orchestrator.
//!
//! Owns the session transcript and routes each utterance: fast path
//! (classified intent straight onto a tool), slow path (reasoning loop),
//! or mesh relay, depending on confidence, deferral, and session mode.
//! At most one slow-path operation is in flight per session; a second
//! request is rejected, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mirrorbrain_core::{
    config::AppConfig,
    traits::GenerationClient,
    types::{ActionOutcome, Message, Role, Session, SessionMode},
    Error, EventSink, Result,
};
use mirrorbrain_intent::IntentClassifier;
use mirrorbrain_mesh::MeshClient;
use mirrorbrain_skills::ToolRegistry;
use tracing::{info, warn};

use crate::executor::ActionExecutor;
use crate::history;
use crate::react::{LoopConfig, LoopState, ReasoningLoop};

const NO_MODEL_MESSAGE: &str =
    "I don't have a language model loaded right now, so I can only handle direct device commands.";
const CANCELLED_MESSAGE: &str = "Okay, I've stopped working on that.";
const MESH_DOWN_MESSAGE: &str = "I couldn't reach the mesh relay, so I can't hand this off right now.";

pub struct Orchestrator {
    classifier: IntentClassifier,
    executor: ActionExecutor,
    reasoning: ReasoningLoop,
    generation: Arc<dyn GenerationClient>,
    mesh: Option<Arc<MeshClient>>,
    config: AppConfig,
    session: Mutex<Session>,
    cancelled: Arc<AtomicBool>,
}

/// Clears `in_flight` when the turn ends, on every exit path.
struct TurnGuard<'a> {
    session: &'a Mutex<Session>,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut session) = self.session.lock() {
            session.in_flight = false;
        }
    }
}

impl Orchestrator {
    pub fn new(
        config: AppConfig,
        generation: Arc<dyn GenerationClient>,
        tools: Arc<ToolRegistry>,
        events: EventSink,
    ) -> Self {
        let loop_config = LoopConfig {
            max_iterations: config.reasoning.max_iterations,
            generation_timeout: Duration::from_millis(config.reasoning.generation_timeout_ms),
        };
        let offline = Arc::new(AtomicBool::new(false));
        Self {
            classifier: IntentClassifier::new(),
            executor: ActionExecutor::new(tools.clone()),
            reasoning: ReasoningLoop::new(
                generation.clone(),
                tools,
                loop_config,
                events,
                offline,
            ),
            generation,
            mesh: None,
            session: Mutex::new(Session::new(config.session.default_mode)),
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach a mesh client for the relay mode.
    pub fn with_mesh(mut self, mesh: Arc<MeshClient>) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Handle one user utterance and produce the assistant's reply.
    ///
    /// `knowledge_context` is an opaque prompt prefix the host assembled
    /// from its note store; the engine never searches on its own. Every
    /// routing failure comes back as a user-visible message; the only
    /// `Err` from this method is [`Error::SessionBusy`].
    pub async fn handle(&self, utterance: &str, knowledge_context: Option<&str>) -> Result<String> {
        let mode = self.begin_turn(utterance)?;
        let _guard = TurnGuard {
            session: &self.session,
        };
        self.cancelled.store(false, Ordering::SeqCst);

        let intent = self.classifier.classify(utterance);
        if intent.confidence >= self.config.classifier.fast_path_threshold {
            match self.executor.execute(&intent).await {
                ActionOutcome::Handled(output) => {
                    info!(kind = ?intent.kind, "fast path handled the utterance");
                    self.record_reply(&output.message);
                    return Ok(output.message);
                }
                ActionOutcome::Deferred { reason } => {
                    info!(kind = ?intent.kind, reason = %reason, "fast path deferred");
                }
            }
        }

        match mode {
            SessionMode::Local => self.run_local(utterance, knowledge_context).await,
            SessionMode::Mesh => self.run_mesh(utterance).await,
        }
    }

    /// Request cancellation of the in-flight slow-path operation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clear the transcript and reset the mode to the configured default.
    ///
    /// Refused while a slow-path operation is in flight.
    pub fn close_session(&self) -> Result<()> {
        let mut session = self.session.lock().expect("session lock poisoned");
        if session.in_flight {
            return Err(Error::SessionBusy);
        }
        session.messages.clear();
        session.mode = self.config.session.default_mode;
        info!("session closed");
        Ok(())
    }

    /// Switch where the slow path routes to.
    pub fn set_mode(&self, mode: SessionMode) {
        let mut session = self.session.lock().expect("session lock poisoned");
        session.mode = mode;
    }

    /// Toggle the offline gate for network-dependent tools.
    pub fn set_offline(&self, offline: bool) {
        self.reasoning.set_offline(offline);
    }

    /// Snapshot of the session transcript.
    pub fn transcript(&self) -> Vec<Message> {
        self.session
            .lock()
            .expect("session lock poisoned")
            .messages
            .clone()
    }

    /// Mark the turn in flight and record the user message.
    fn begin_turn(&self, utterance: &str) -> Result<SessionMode> {
        let mut session = self.session.lock().expect("session lock poisoned");
        if session.in_flight {
            return Err(Error::SessionBusy);
        }
        session.in_flight = true;
        let max = self.config.session.max_messages;
        history::push_bounded(&mut session, Message::new(Role::User, utterance), max);
        Ok(session.mode)
    }

    /// Append the assistant reply. Never called for a cancelled run.
    fn record_reply(&self, content: &str) {
        let mut session = self.session.lock().expect("session lock poisoned");
        let max = self.config.session.max_messages;
        history::push_bounded(&mut session, Message::new(Role::Assistant, content), max);
    }

    async fn run_local(&self, utterance: &str, knowledge_context: Option<&str>) -> Result<String> {
        if !self.generation.is_ready() {
            warn!("no generation capability ready, short-circuiting the slow path");
            self.record_reply(NO_MODEL_MESSAGE);
            return Ok(NO_MODEL_MESSAGE.to_string());
        }

        let system_prompt = self.reasoning.system_prompt(knowledge_context);
        match self
            .reasoning
            .run(utterance, &system_prompt, &self.cancelled)
            .await
        {
            // A failed run still carries its degraded answer.
            Ok(run) => {
                if run.state == LoopState::Failed {
                    warn!(iterations = run.iterations, "reasoning loop gave up");
                }
                self.record_reply(&run.answer);
                Ok(run.answer)
            }
            Err(Error::Cancelled) => Ok(CANCELLED_MESSAGE.to_string()),
            Err(err) => {
                warn!(error = %err, "reasoning loop aborted");
                let message = format!("I ran into a problem while reasoning about that: {err}");
                self.record_reply(&message);
                Ok(message)
            }
        }
    }

    async fn run_mesh(&self, utterance: &str) -> Result<String> {
        let Some(mesh) = &self.mesh else {
            self.record_reply(MESH_DOWN_MESSAGE);
            return Ok(MESH_DOWN_MESSAGE.to_string());
        };

        match mesh
            .request_reply(&self.config.mesh.brain_peer_id, utterance)
            .await
        {
            Ok(reply) => {
                self.record_reply(&reply);
                Ok(reply)
            }
            Err(err) => {
                warn!(error = %err, "mesh round-trip failed");
                self.record_reply(MESH_DOWN_MESSAGE);
                Ok(MESH_DOWN_MESSAGE.to_string())
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

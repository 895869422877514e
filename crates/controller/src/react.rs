//! Reasoning loop implementation.
//!
//! The loop alternates reasoning and acting:
//! 1. Render the transcript so far
//! 2. Ask the generation client for the next step
//! 3. Execute the chosen tool, if any
//! 4. Observe the result
//! 5. Repeat until a final answer or the iteration cap
//!
//! Tool failures become observations the next iteration can react to;
//! only a generation failure, a generation timeout, or cancellation
//! aborts the run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mirrorbrain_core::{
    traits::GenerationClient,
    types::ReActStep,
    EngineEvent, Error, EventSink, Result,
};
use mirrorbrain_skills::ToolRegistry;
use tracing::{debug, info, warn};

use crate::parser::{ActionParser, ParsedStep};

/// Answer returned when the iteration cap is reached without a final answer.
const DEGRADED_ANSWER: &str =
    "I couldn't work that out within my reasoning budget. Could you rephrase or break it into smaller steps?";

/// Reasoning loop configuration.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum iterations before giving up.
    pub max_iterations: usize,
    /// Timeout applied around each generation call.
    pub generation_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 6,
            generation_timeout: Duration::from_secs(30),
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// The generation produced a final answer.
    Done,
    /// The iteration cap was reached; the answer is a degraded fallback.
    Failed,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct LoopRun {
    pub answer: String,
    pub iterations: usize,
    pub state: LoopState,
}

/// The slow-path reasoning loop.
pub struct ReasoningLoop {
    generation: Arc<dyn GenerationClient>,
    tools: Arc<ToolRegistry>,
    config: LoopConfig,
    events: EventSink,
    /// While set, tools with `requires_network` are refused without invoking.
    offline: Arc<AtomicBool>,
}

impl ReasoningLoop {
    pub fn new(
        generation: Arc<dyn GenerationClient>,
        tools: Arc<ToolRegistry>,
        config: LoopConfig,
        events: EventSink,
        offline: Arc<AtomicBool>,
    ) -> Self {
        Self {
            generation,
            tools,
            config,
            events,
            offline,
        }
    }

    /// Flip the offline gate.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Render the system prompt, with the available tools inlined.
    pub fn system_prompt(&self, knowledge_context: Option<&str>) -> String {
        let tool_lines: Vec<String> = self
            .tools
            .list()
            .into_iter()
            .map(|def| format!("- {}: {} (parameters: {})", def.name, def.description, def.parameters))
            .collect();
        let tools_description = if tool_lines.is_empty() {
            "(none)".to_string()
        } else {
            tool_lines.join("\n")
        };

        let context_block = knowledge_context
            .filter(|c| !c.trim().is_empty())
            .map(|c| format!("\nRELEVANT NOTES:\n{c}\n"))
            .unwrap_or_default();

        format!(
            r#"You are a personal assistant that reasons step by step.
{context_block}
AVAILABLE TOOLS:
{tools_description}

RESPONSE FORMAT:
Use exactly one of these formats in each response:

For reasoning:
THOUGHT: <your reasoning>

For tool calls:
ACTION: <tool_name>
ARGS: <json arguments>

For the final answer:
FINAL ANSWER: <your complete answer>

Think before acting. Be concise."#
        )
    }

    /// Run the loop for one utterance.
    ///
    /// Returns `Ok` with a `Failed` state when the iteration cap is reached;
    /// that is a normal terminal outcome. Errors are reserved for generation
    /// failure, generation timeout, and cancellation.
    pub async fn run(
        &self,
        utterance: &str,
        system_prompt: &str,
        cancelled: &AtomicBool,
    ) -> Result<LoopRun> {
        let mut steps: Vec<ReActStep> = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            if cancelled.load(Ordering::SeqCst) {
                info!(iteration, "reasoning loop cancelled");
                return Err(Error::Cancelled);
            }

            let transcript = render_transcript(system_prompt, utterance, &steps);
            let response =
                match tokio::time::timeout(self.config.generation_timeout, self.generation.generate(&transcript))
                    .await
                {
                    Ok(Ok(response)) => response,
                    Ok(Err(err)) => {
                        warn!(iteration, error = %err, "generation failed");
                        return Err(match err {
                            Error::ModelGeneration(_) => err,
                            other => Error::generation(other.to_string()),
                        });
                    }
                    Err(_) => {
                        warn!(iteration, "generation timed out");
                        return Err(Error::generation("generation timed out"));
                    }
                };

            match ActionParser::parse(&response) {
                ParsedStep::FinalAnswer(answer) => {
                    info!(iteration, "reasoning loop finished");
                    return Ok(LoopRun {
                        answer,
                        iterations: iteration,
                        state: LoopState::Done,
                    });
                }
                ParsedStep::Thought(thought) => {
                    debug!(iteration, "no action taken");
                    self.events.emit(EngineEvent::Thought {
                        summary: thought.clone(),
                    });
                    steps.push(ReActStep::thought_only(thought));
                }
                ParsedStep::ToolCall { name, args } => {
                    self.events.emit(EngineEvent::ActionStarted { tool: name.clone() });

                    let (observation, ok) = self.run_tool(&name, &args).await;
                    self.events.emit(EngineEvent::ActionFinished {
                        tool: name.clone(),
                        ok,
                    });

                    // Recheck after the await: the tool may have been slow.
                    if cancelled.load(Ordering::SeqCst) {
                        info!(iteration, "reasoning loop cancelled after tool call");
                        return Err(Error::Cancelled);
                    }

                    let args_json = serde_json::to_string(&args).unwrap_or_default();
                    self.events.emit(EngineEvent::Thought {
                        summary: format!("{name} -> {observation}"),
                    });
                    steps.push(ReActStep {
                        thought: format!("I should use {name}."),
                        action: Some(name),
                        action_input: Some(args_json),
                        observation: Some(observation),
                    });
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "iteration cap reached without a final answer"
        );
        Ok(LoopRun {
            answer: DEGRADED_ANSWER.to_string(),
            iterations: self.config.max_iterations,
            state: LoopState::Failed,
        })
    }

    /// Resolve and invoke one tool, mapping every failure to an observation.
    async fn run_tool(&self, name: &str, args: &HashMap<String, String>) -> (String, bool) {
        let Some(tool) = self.tools.lookup(name) else {
            return (format!("Error: unknown tool '{name}'"), false);
        };

        if tool.requires_network() && self.offline.load(Ordering::SeqCst) {
            return (format!("Tool '{name}' unavailable offline"), false);
        }

        match tool.invoke(args).await {
            Ok(output) if output.ok => (output.message, true),
            Ok(output) => (format!("Error: {}", output.message), false),
            Err(err) => (format!("Error: {err}"), false),
        }
    }
}

/// Assemble the prompt sent to the generation client.
fn render_transcript(system_prompt: &str, utterance: &str, steps: &[ReActStep]) -> String {
    let mut transcript = format!("{system_prompt}\n\nUSER REQUEST: {utterance}\n");
    for step in steps {
        transcript.push_str(&format!("\nTHOUGHT: {}", step.thought));
        if let Some(action) = &step.action {
            transcript.push_str(&format!("\nACTION: {action}"));
        }
        if let Some(input) = &step.action_input {
            transcript.push_str(&format!("\nARGS: {input}"));
        }
        if let Some(observation) = &step.observation {
            transcript.push_str(&format!("\nOBSERVATION: {observation}"));
        }
    }
    transcript
}

// =============================================================================
// Tests
// =============================================================================

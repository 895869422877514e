//! Mock implementations of core traits for testing.
//!
//! Used across the workspace so loop, executor, and orchestrator tests can
//! run deterministic scripts without a model runtime or real device tools.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::traits::{GenerationClient, Tool};
use crate::types::ToolOutput;

// =============================================================================
// Mock Generation Client
// =============================================================================

/// Scripted generation client that replays predefined responses.
///
/// Responses are consumed in order; when the script runs out the last entry
/// repeats, so "never emits a final answer" is just a one-line script.
pub struct MockGeneration {
    responses: Mutex<Vec<String>>,
    call_count: Mutex<usize>,
    ready: bool,
    delay: Option<Duration>,
}

impl MockGeneration {
    /// Create a mock replaying the given script.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
            ready: true,
            delay: None,
        }
    }

    /// A mock that always returns the same response.
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// A mock whose `is_ready` reports false.
    pub fn not_ready() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
            ready: false,
            delay: None,
        }
    }

    /// Sleep this long inside each `generate` call, to hold a slow-path
    /// turn in flight while a test pokes at it from outside.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl GenerationClient for MockGeneration {
    async fn generate(&self, _transcript: &str) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(Error::generation("mock script is empty"));
        }
        let idx = (*count - 1).min(responses.len() - 1);
        Ok(responses[idx].clone())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Generation client whose every call fails, for abort-path tests.
pub struct FailingGeneration;

#[async_trait]
impl GenerationClient for FailingGeneration {
    async fn generate(&self, _transcript: &str) -> Result<String> {
        Err(Error::generation("backend connection lost"))
    }
}

// =============================================================================
// Mock Tools
// =============================================================================

/// Tool that records every invocation into a shared log.
///
/// An optional artificial delay makes it useful for observation-ordering
/// tests: even a slow first tool must observe before a fast second one.
pub struct RecordingTool {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    output: ToolOutput,
    network: bool,
}

impl RecordingTool {
    pub fn new(name: impl Into<String>, log: Arc<Mutex<Vec<String>>>) -> Self {
        let name = name.into();
        Self {
            output: ToolOutput::text(format!("{name} ok")),
            name,
            log,
            delay: None,
            network: false,
        }
    }

    /// Sleep this long inside `invoke` before recording.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fix the output returned by every invocation.
    pub fn with_output(mut self, output: ToolOutput) -> Self {
        self.output = output;
        self
    }

    /// Mark the tool as requiring connectivity.
    pub fn network(mut self) -> Self {
        self.network = true;
        self
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Recording mock tool"
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn requires_network(&self) -> bool {
        self.network
    }

    async fn invoke(&self, args: &HashMap<String, String>) -> Result<ToolOutput> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut log = self.log.lock().unwrap();
        log.push(format!(
            "{}({})",
            self.name,
            args.get("input").cloned().unwrap_or_default()
        ));
        Ok(self.output.clone())
    }
}

/// Tool that always defers, for fast-path fallthrough tests.
pub struct DeferringTool {
    name: String,
}

impl DeferringTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Tool for DeferringTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Always defers to the slow path"
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn invoke(&self, _args: &HashMap<String, String>) -> Result<ToolOutput> {
        Ok(ToolOutput::deferred("mock tool cannot resolve this"))
    }
}

/// Tool whose invocation returns an `Err`, for recovery tests.
pub struct FailingTool {
    name: String,
}

impl FailingTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn invoke(&self, _args: &HashMap<String, String>) -> Result<ToolOutput> {
        Err(Error::tool_execution("mock failure"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_generation_replays_script_and_counts() {
        let gen = MockGeneration::new(vec!["first".into(), "second".into()]);
        assert_eq!(gen.generate("").await.unwrap(), "first");
        assert_eq!(gen.generate("").await.unwrap(), "second");
        // Script exhausted: last entry repeats.
        assert_eq!(gen.generate("").await.unwrap(), "second");
        assert_eq!(gen.call_count(), 3);
    }

    #[tokio::test]
    async fn not_ready_mock_reports_unready() {
        let gen = MockGeneration::not_ready();
        assert!(!gen.is_ready());
    }

    #[tokio::test]
    async fn recording_tool_appends_to_shared_log() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tool = RecordingTool::new("probe", log.clone());
        let mut args = HashMap::new();
        args.insert("input".to_string(), "42".to_string());
        let out = tool.invoke(&args).await.unwrap();
        assert!(out.ok);
        assert_eq!(log.lock().unwrap().as_slice(), ["probe(42)"]);
    }
}

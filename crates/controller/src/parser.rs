//! Parser for generation output.
//!
//! Extracts structured steps (final answer, tool call, bare thought) from
//! raw generation text.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

const FINAL_ANSWER_MARKER: &str = "FINAL ANSWER:";
const ACTION_MARKER: &str = "ACTION:";
const ARGS_MARKER: &str = "ARGS:";
const THOUGHT_MARKER: &str = "THOUGHT:";

/// Parsed step from a generation response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStep {
    /// Final answer, run complete.
    FinalAnswer(String),
    /// Call a tool with string-valued arguments.
    ToolCall {
        name: String,
        args: HashMap<String, String>,
    },
    /// No action yet, keep reasoning.
    Thought(String),
}

/// Parser for generation responses.
pub struct ActionParser;

impl ActionParser {
    /// Parse a generation response into a structured step.
    ///
    /// A `FINAL ANSWER:` marker anywhere in the response wins, even when an
    /// action is also present. Only the first `ACTION:`/`ARGS:` pair is
    /// honored; extra action lines are logged and ignored. A response with
    /// neither marker is a bare thought.
    pub fn parse(response: &str) -> ParsedStep {
        let response = response.trim();

        if let Some(pos) = response.find(FINAL_ANSWER_MARKER) {
            let answer = response[pos + FINAL_ANSWER_MARKER.len()..].trim();
            return ParsedStep::FinalAnswer(answer.to_string());
        }

        let mut tool_name: Option<String> = None;
        let mut raw_args: Option<String> = None;

        for line in response.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix(ACTION_MARKER) {
                if tool_name.is_some() {
                    debug!(line = %line, "ignoring extra ACTION line");
                    continue;
                }
                tool_name = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix(ARGS_MARKER) {
                if raw_args.is_some() {
                    debug!(line = %line, "ignoring extra ARGS line");
                    continue;
                }
                raw_args = Some(rest.trim().to_string());
            }
        }

        if let Some(name) = tool_name.filter(|n| !n.is_empty()) {
            let args = raw_args
                .filter(|a| !a.is_empty())
                .map(|a| parse_args(&a))
                .unwrap_or_default();
            return ParsedStep::ToolCall { name, args };
        }

        let thought = response
            .strip_prefix(THOUGHT_MARKER)
            .map(str::trim)
            .unwrap_or(response);
        ParsedStep::Thought(thought.to_string())
    }
}

/// Coerce an ARGS payload into a string-valued map.
///
/// A JSON object has its values stringified (string values kept verbatim,
/// everything else rendered as JSON); anything that fails to parse as a
/// JSON object is carried whole under an `"input"` key.
fn parse_args(raw: &str) -> HashMap<String, String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        return map
            .into_iter()
            .map(|(k, v)| {
                let s = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, s)
            })
            .collect();
    }

    let mut args = HashMap::new();
    args.insert("input".to_string(), raw.to_string());
    args
}

// =============================================================================
// Tests
// =============================================================================

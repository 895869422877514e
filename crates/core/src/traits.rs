//! Core traits for MirrorBrain.
//!
//! These are the contracts the engine consumes but does not implement: the
//! language-generation runtime, device capabilities, and note retrieval all
//! live in the host.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::ToolOutput;

// =============================================================================
// Language Generation
// =============================================================================

/// Language-generation capability consumed by the reasoning loop.
///
/// The loop applies its own timeout around `generate`; implementations only
/// need to be cancel-safe (dropping the future must abort the request).
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate a continuation for the given transcript.
    async fn generate(&self, transcript: &str) -> Result<String>;

    /// Whether a model is loaded and able to serve `generate`.
    ///
    /// `false` short-circuits the slow path before any loop starts.
    fn is_ready(&self) -> bool {
        true
    }
}

// =============================================================================
// Device Tools
// =============================================================================

/// A single invocable device capability.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the unique name of the tool.
    fn name(&self) -> &str;

    /// Get the human-readable description.
    fn description(&self) -> &str;

    /// Get the JSON Schema for arguments.
    fn parameters(&self) -> Value;

    /// Whether the tool needs connectivity. Network tools are refused with
    /// an "unavailable offline" observation while the offline flag is set.
    fn requires_network(&self) -> bool {
        false
    }

    /// Invoke the tool with string-valued arguments (intent slots or parsed
    /// action input).
    async fn invoke(&self, args: &HashMap<String, String>) -> Result<ToolOutput>;
}

// =============================================================================
// Knowledge Retrieval
// =============================================================================

/// A note returned by the knowledge store, ranked by relevance.
#[derive(Debug, Clone)]
pub struct RankedNote {
    pub content: String,
    pub score: f32,
}

/// Note retrieval used by the host to assemble RAG context.
///
/// The engine itself never calls this; the host searches, formats the hits,
/// and passes the result to the orchestrator as an opaque prompt prefix.
#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    /// Search stored notes for the given query.
    async fn search(&self, query: &str) -> Result<Vec<RankedNote>>;
}

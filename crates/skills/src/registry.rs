//! Tool registry implementation.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use mirrorbrain_core::{
    traits::Tool,
    types::{ToolDefinition, ToolOutput},
    Error, Result,
};

/// Concurrent tool registry using DashMap.
///
/// Registration happens once at startup; after that the loop only reads,
/// so lookups from concurrent readers are lock-free.
pub struct ToolRegistry {
    /// Registered tools keyed by name.
    tools: DashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new, empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    /// Register a tool under its own name.
    ///
    /// A name collision is a startup configuration error, so it fails
    /// immediately instead of silently replacing the earlier tool.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        tracing::info!(tool = %name, "Registering tool");

        if self.tools.contains_key(&name) {
            return Err(Error::DuplicateTool(name));
        }

        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).map(|entry| entry.value().clone())
    }

    /// Invoke a registered tool by name.
    pub async fn invoke(&self, name: &str, args: &HashMap<String, String>) -> Result<ToolOutput> {
        let tool = self
            .lookup(name)
            .ok_or_else(|| Error::tool_not_found(name))?;

        tracing::debug!(tool = %name, "Invoking tool");
        tool.invoke(args).await
    }

    /// List definitions of all registered tools, sorted by name.
    pub fn list(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self
            .tools
            .iter()
            .map(|entry| ToolDefinition {
                name: entry.name().to_string(),
                description: entry.description().to_string(),
                parameters: entry.parameters(),
                requires_network: entry.requires_network(),
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry has no tools.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use mirrorbrain_core::mocks::RecordingTool;

    fn recording(name: &str) -> (Arc<RecordingTool>, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (Arc::new(RecordingTool::new(name, log.clone())), log)
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = ToolRegistry::new();
        registry.register(recording("echo").0).unwrap();

        let err = registry.register(recording("echo").0).unwrap_err();
        assert!(matches!(err, Error::DuplicateTool(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn invoke_unknown_tool_is_not_found() {
        let registry = ToolRegistry::new();
        let err = registry
            .invoke("missing", &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn invoke_dispatches_by_name() {
        let registry = ToolRegistry::new();
        let (tool, log) = recording("probe");
        registry.register(tool).unwrap();

        let mut args = HashMap::new();
        args.insert("input".to_string(), "hello".to_string());
        let output = registry.invoke("probe", &args).await.unwrap();
        assert!(output.ok);
        assert_eq!(log.lock().unwrap().as_slice(), ["probe(hello)"]);
    }

    #[test]
    fn list_is_sorted_by_name() {
        let registry = ToolRegistry::new();
        registry.register(recording("zeta").0).unwrap();
        registry.register(recording("alpha").0).unwrap();

        let names: Vec<_> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
    }
}

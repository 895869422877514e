//! Fast-path action executor.
//!
//! Maps a classified intent straight onto its bound tool. Anything that
//! prevents a confident, complete answer is a `Deferred` outcome, which
//! routes the utterance to the slow path instead of failing the turn.

use std::sync::Arc;

use mirrorbrain_core::types::{ActionOutcome, Intent};
use mirrorbrain_skills::ToolRegistry;
use tracing::debug;

pub struct ActionExecutor {
    registry: Arc<ToolRegistry>,
}

impl ActionExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Execute the tool bound to the intent, if any.
    ///
    /// The executor performs no side effects of its own; everything
    /// observable happens inside the tool.
    pub async fn execute(&self, intent: &Intent) -> ActionOutcome {
        let Some(tool_name) = intent.kind.bound_tool() else {
            return ActionOutcome::Deferred {
                reason: format!("no tool bound to intent {:?}", intent.kind),
            };
        };

        let Some(tool) = self.registry.lookup(tool_name) else {
            debug!(tool = %tool_name, "bound tool is not registered");
            return ActionOutcome::Deferred {
                reason: format!("tool '{tool_name}' is not registered"),
            };
        };

        match tool.invoke(&intent.slots).await {
            Ok(output) if output.deferred => ActionOutcome::Deferred {
                reason: output.message,
            },
            Ok(output) => ActionOutcome::Handled(output),
            // A failing tool is recoverable by fallthrough, never fatal.
            Err(err) => ActionOutcome::Deferred {
                reason: format!("tool '{tool_name}' failed: {err}"),
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use mirrorbrain_core::mocks::{DeferringTool, FailingTool, RecordingTool};
    use mirrorbrain_core::types::IntentKind;

    fn intent(kind: IntentKind, slots: &[(&str, &str)]) -> Intent {
        Intent {
            kind,
            confidence: 0.92,
            slots: slots
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn unknown_intent_defers() {
        let executor = ActionExecutor::new(Arc::new(ToolRegistry::new()));
        let outcome = executor
            .execute(&Intent {
                kind: IntentKind::Unknown,
                confidence: 0.0,
                slots: HashMap::new(),
            })
            .await;
        assert!(!outcome.is_handled());
    }

    #[tokio::test]
    async fn unregistered_bound_tool_defers() {
        let executor = ActionExecutor::new(Arc::new(ToolRegistry::new()));
        let outcome = executor.execute(&intent(IntentKind::BatteryStatus, &[])).await;
        assert!(!outcome.is_handled());
    }

    #[tokio::test]
    async fn registered_tool_handles_with_slots() {
        let registry = Arc::new(ToolRegistry::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        registry
            .register(Arc::new(RecordingTool::new("vibrate_device", log.clone())))
            .unwrap();

        let outcome = ActionExecutor::new(registry)
            .execute(&intent(IntentKind::HapticTest, &[("input", "250")]))
            .await;
        assert!(outcome.is_handled());
        assert_eq!(log.lock().unwrap().as_slice(), ["vibrate_device(250)"]);
    }

    #[tokio::test]
    async fn deferring_output_defers() {
        let registry = Arc::new(ToolRegistry::new());
        registry
            .register(Arc::new(DeferringTool::new("open_application")))
            .unwrap();

        let outcome = ActionExecutor::new(registry)
            .execute(&intent(IntentKind::OpenApp, &[]))
            .await;
        assert!(!outcome.is_handled());
    }

    #[tokio::test]
    async fn tool_error_defers_with_diagnostic() {
        let registry = Arc::new(ToolRegistry::new());
        registry
            .register(Arc::new(FailingTool::new("get_battery_status")))
            .unwrap();

        let outcome = ActionExecutor::new(registry)
            .execute(&intent(IntentKind::BatteryStatus, &[]))
            .await;
        let ActionOutcome::Deferred { reason } = outcome else {
            panic!("expected deferral");
        };
        assert!(reason.contains("get_battery_status"));
    }
}

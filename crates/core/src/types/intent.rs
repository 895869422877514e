use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Intent Types (Classifier Output)
// =============================================================================

/// Confidence threshold for fast-path eligibility.
///
/// At or above this value the orchestrator tries the action executor first;
/// below it the utterance goes straight to the slow path, whatever the kind.
pub const FAST_PATH_THRESHOLD: f32 = 0.6;

/// Closed set of intents the classifier can produce.
///
/// Each actionable kind is statically bound to a tool name; the binding is
/// part of the startup configuration, not something tools can change at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentKind {
    BatteryStatus,
    HapticTest,
    OpenApp,
    ListApps,
    SaveNote,
    GetEvents,
    GetWeather,
    GetContacts,
    Unknown,
}

impl IntentKind {
    /// Name of the device tool bound to this intent, if any.
    pub fn bound_tool(&self) -> Option<&'static str> {
        match self {
            Self::BatteryStatus => Some("get_battery_status"),
            Self::HapticTest => Some("vibrate_device"),
            Self::OpenApp => Some("open_application"),
            Self::ListApps => Some("list_applications"),
            Self::SaveNote => Some("save_note"),
            Self::GetEvents => Some("get_calendar_events"),
            Self::GetWeather => Some("get_weather"),
            Self::GetContacts => Some("get_contacts"),
            Self::Unknown => None,
        }
    }
}

/// Classification result for a single utterance.
///
/// Produced fresh per utterance and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// Matched intent kind.
    pub kind: IntentKind,

    /// Match specificity in `[0, 1]`: exact phrase > keyword > partial.
    pub confidence: f32,

    /// Arguments extracted from the utterance (app name, duration, ...).
    #[serde(default)]
    pub slots: HashMap<String, String>,
}

impl Intent {
    /// An unmatched utterance: `Unknown` at zero confidence, no slots.
    pub fn unknown() -> Self {
        Self {
            kind: IntentKind::Unknown,
            confidence: 0.0,
            slots: HashMap::new(),
        }
    }

    /// Whether this intent qualifies for the fast path.
    pub fn is_fast_path(&self) -> bool {
        self.confidence >= FAST_PATH_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_intent_is_not_fast_path() {
        let intent = Intent::unknown();
        assert_eq!(intent.kind, IntentKind::Unknown);
        assert!(!intent.is_fast_path());
        assert!(intent.kind.bound_tool().is_none());
    }

    #[test]
    fn threshold_is_inclusive() {
        let intent = Intent {
            kind: IntentKind::BatteryStatus,
            confidence: FAST_PATH_THRESHOLD,
            slots: HashMap::new(),
        };
        assert!(intent.is_fast_path());
    }

    #[test]
    fn kind_serde_uses_kebab_case() {
        let json = serde_json::to_string(&IntentKind::BatteryStatus).unwrap();
        assert_eq!(json, "\"battery-status\"");
        let back: IntentKind = serde_json::from_str("\"save-note\"").unwrap();
        assert_eq!(back, IntentKind::SaveNote);
    }

    #[test]
    fn every_actionable_kind_has_a_binding() {
        for kind in [
            IntentKind::BatteryStatus,
            IntentKind::HapticTest,
            IntentKind::OpenApp,
            IntentKind::ListApps,
            IntentKind::SaveNote,
            IntentKind::GetEvents,
            IntentKind::GetWeather,
            IntentKind::GetContacts,
        ] {
            assert!(kind.bound_tool().is_some(), "{kind:?} has no tool binding");
        }
    }
}

//! Static rule table for the classifier.
//!
//! Rules are ordered: when two rules score the same, the earlier one wins.
//! Confidence reflects match specificity: an exact phrase beats a keyword,
//! and a keyword beats a partial hit.

use mirrorbrain_core::types::IntentKind;

/// Confidence for an exact phrase match.
pub const PHRASE_CONFIDENCE: f32 = 0.92;
/// Confidence for a whole-word keyword match.
pub const KEYWORD_CONFIDENCE: f32 = 0.7;
/// Confidence for a keyword appearing only inside a longer word.
pub const PARTIAL_CONFIDENCE: f32 = 0.4;

/// One classification rule.
pub struct IntentRule {
    pub kind: IntentKind,
    /// Exact phrases checked as substrings of the lowercased utterance.
    pub phrases: &'static [&'static str],
    /// Keywords checked as whole words, then as partial hits.
    pub keywords: &'static [&'static str],
}

pub const RULES: &[IntentRule] = &[
    IntentRule {
        kind: IntentKind::BatteryStatus,
        phrases: &[
            "battery level",
            "battery status",
            "how much battery",
            "battery left",
            "how charged",
        ],
        keywords: &["battery", "charge"],
    },
    IntentRule {
        kind: IntentKind::HapticTest,
        phrases: &["vibrate the phone", "vibrate my phone", "haptic test", "test haptics"],
        keywords: &["vibrate", "haptic", "buzz"],
    },
    IntentRule {
        kind: IntentKind::ListApps,
        phrases: &["list my apps", "list apps", "what apps", "installed apps", "show my apps"],
        keywords: &["apps"],
    },
    IntentRule {
        kind: IntentKind::OpenApp,
        phrases: &["open the app", "launch the app"],
        keywords: &["open", "launch"],
    },
    IntentRule {
        kind: IntentKind::SaveNote,
        phrases: &["save a note", "take a note", "make a note", "note that"],
        keywords: &["note", "remember"],
    },
    IntentRule {
        kind: IntentKind::GetEvents,
        phrases: &[
            "on my calendar",
            "calendar events",
            "my schedule",
            "my agenda",
            "upcoming events",
        ],
        keywords: &["calendar", "schedule", "agenda"],
    },
    IntentRule {
        kind: IntentKind::GetWeather,
        phrases: &["the weather", "weather forecast", "is it raining", "how hot is it"],
        keywords: &["weather", "forecast", "temperature"],
    },
    IntentRule {
        kind: IntentKind::GetContacts,
        phrases: &["my contacts", "contact list", "phone number for"],
        keywords: &["contacts", "contact"],
    },
];

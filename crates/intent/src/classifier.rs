//! Rule-based intent classifier.
//!
//! Pure and deterministic: the same utterance always yields the same
//! intent. Scoring is tiered (exact phrase > whole-word keyword >
//! partial keyword); the highest-scoring rule wins, with the rule
//! table's order breaking ties. Slots are extracted only for the
//! winning kind.

use std::collections::HashMap;
use std::sync::LazyLock;

use mirrorbrain_core::types::{Intent, IntentKind};
use regex::Regex;
use tracing::debug;

use crate::rules::{IntentRule, KEYWORD_CONFIDENCE, PARTIAL_CONFIDENCE, PHRASE_CONFIDENCE, RULES};

static APP_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:open|launch)\s+(?:the\s+)?(?:app\s+)?([a-zA-Z][\w .-]*?)(?:\s+app)?\s*$")
        .expect("app name regex")
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:ms|millisecond(?:s)?)").expect("duration regex")
});

static NOTE_BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:note|remember)\s+(?:that\s+)?(.+)$").expect("note regex"));

static WEATHER_LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"weather\s+(?:in|for|at)\s+([a-zA-Z][\w .-]*?)\s*\??\s*$")
        .expect("weather location regex")
});

/// Stateless keyword/phrase classifier over the static rule table.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classifies an utterance into an [`Intent`] with a confidence score.
    ///
    /// Returns [`Intent::unknown`] (confidence 0.0) when no rule matches,
    /// which routes the utterance to the reasoning loop instead of a tool.
    pub fn classify(&self, utterance: &str) -> Intent {
        let text = utterance.to_lowercase();
        let words: Vec<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let mut best: Option<(f32, &IntentRule)> = None;
        for rule in RULES {
            let score = score_rule(rule, &text, &words);
            if score <= 0.0 {
                continue;
            }
            match best {
                Some((top, _)) if score <= top => {}
                _ => best = Some((score, rule)),
            }
        }

        let Some((confidence, rule)) = best else {
            debug!(utterance = %utterance, "no intent rule matched");
            return Intent::unknown();
        };

        let slots = extract_slots(rule.kind, &text);
        debug!(kind = ?rule.kind, confidence, "classified utterance");
        Intent { kind: rule.kind, confidence, slots }
    }
}

fn score_rule(rule: &IntentRule, text: &str, words: &[&str]) -> f32 {
    if rule.phrases.iter().any(|p| text.contains(p)) {
        return PHRASE_CONFIDENCE;
    }
    if rule.keywords.iter().any(|k| words.contains(k)) {
        return KEYWORD_CONFIDENCE;
    }
    if rule.keywords.iter().any(|k| text.contains(k)) {
        return PARTIAL_CONFIDENCE;
    }
    0.0
}

fn extract_slots(kind: IntentKind, text: &str) -> HashMap<String, String> {
    let mut slots = HashMap::new();
    match kind {
        IntentKind::OpenApp => {
            if let Some(caps) = APP_NAME_RE.captures(text) {
                slots.insert("app_name".into(), caps[1].trim().to_string());
            }
        }
        IntentKind::HapticTest => {
            if let Some(caps) = DURATION_RE.captures(text) {
                slots.insert("duration_ms".into(), caps[1].to_string());
            }
        }
        IntentKind::SaveNote => {
            if let Some(caps) = NOTE_BODY_RE.captures(text) {
                slots.insert("content".into(), caps[1].trim().to_string());
            }
        }
        IntentKind::GetWeather => {
            if let Some(caps) = WEATHER_LOCATION_RE.captures(text) {
                slots.insert("location".into(), caps[1].trim().to_string());
            }
        }
        _ => {}
    }
    slots
}

// =====================================================================
// Tests
// =====================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorbrain_core::types::FAST_PATH_THRESHOLD;

    #[test]
    fn battery_phrase_scores_high() {
        let intent = IntentClassifier::new().classify("What's my battery level?");
        assert_eq!(intent.kind, IntentKind::BatteryStatus);
        assert!(intent.confidence > 0.9);
        assert!(intent.is_fast_path());
    }

    #[test]
    fn ambiguous_advice_request_stays_unknown() {
        let intent = IntentClassifier::new()
            .classify("help me decide whether to take this job offer");
        assert_eq!(intent.kind, IntentKind::Unknown);
        assert!(intent.confidence < FAST_PATH_THRESHOLD);
    }

    #[test]
    fn keyword_match_scores_mid_tier() {
        let intent = IntentClassifier::new().classify("maybe vibrate for a bit");
        assert_eq!(intent.kind, IntentKind::HapticTest);
        assert!((intent.confidence - KEYWORD_CONFIDENCE).abs() < f32::EPSILON);
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = IntentClassifier::new();
        let a = classifier.classify("open spotify");
        let b = classifier.classify("open spotify");
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.slots, b.slots);
    }

    #[test]
    fn open_app_extracts_app_name() {
        let intent = IntentClassifier::new().classify("launch the app Spotify");
        assert_eq!(intent.kind, IntentKind::OpenApp);
        assert_eq!(intent.slots.get("app_name").map(String::as_str), Some("spotify"));
    }

    #[test]
    fn haptic_extracts_duration() {
        let intent = IntentClassifier::new().classify("vibrate for 250 ms");
        assert_eq!(intent.kind, IntentKind::HapticTest);
        assert_eq!(intent.slots.get("duration_ms").map(String::as_str), Some("250"));
    }

    #[test]
    fn note_extracts_body() {
        let intent = IntentClassifier::new().classify("note that the wifi password changed");
        assert_eq!(intent.kind, IntentKind::SaveNote);
        assert_eq!(
            intent.slots.get("content").map(String::as_str),
            Some("the wifi password changed")
        );
    }

    #[test]
    fn list_apps_beats_open_app_on_phrase() {
        let intent = IntentClassifier::new().classify("list my apps");
        assert_eq!(intent.kind, IntentKind::ListApps);
    }
}

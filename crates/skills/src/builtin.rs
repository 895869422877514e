//! Built-in device tool stubs.
//!
//! These stand in for the companion device bridge during local runs and
//! tests. Each one keeps the real tool's contract (name, parameters,
//! validation) while returning canned device state.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mirrorbrain_core::{
    traits::Tool,
    types::ToolOutput,
    Error, Result,
};
use serde_json::{json, Value};

/// Longest vibration a single invocation may request, in milliseconds.
const MAX_VIBRATE_MS: u64 = 10_000;

// =============================================================================
// Show Toast
// =============================================================================

/// Pops a short on-screen notification on the device.
pub struct ShowToastTool;

#[async_trait]
impl Tool for ShowToastTool {
    fn name(&self) -> &str {
        "show_toast"
    }

    fn description(&self) -> &str {
        "Shows a brief on-screen message on the device"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "Text to display"
                }
            },
            "required": ["message"]
        })
    }

    async fn invoke(&self, args: &HashMap<String, String>) -> Result<ToolOutput> {
        let message = args
            .get("message")
            .or_else(|| args.get("input"))
            .map(String::as_str)
            .unwrap_or("(empty)");
        Ok(ToolOutput::text(format!("Toast shown: {message}")))
    }
}

// =============================================================================
// Vibrate Device
// =============================================================================

/// Triggers device haptics for a bounded duration.
pub struct VibrateTool;

#[async_trait]
impl Tool for VibrateTool {
    fn name(&self) -> &str {
        "vibrate_device"
    }

    fn description(&self) -> &str {
        "Vibrates the device for the given number of milliseconds"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "duration_ms": {
                    "type": "integer",
                    "description": "Vibration length in milliseconds (1-10000)"
                }
            }
        })
    }

    async fn invoke(&self, args: &HashMap<String, String>) -> Result<ToolOutput> {
        let duration_ms = match args.get("duration_ms") {
            None => 500,
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::invalid_argument(format!("duration_ms must be an integer, got '{raw}'"))
            })?,
        };

        if duration_ms == 0 || duration_ms > MAX_VIBRATE_MS {
            return Err(Error::invalid_argument(format!(
                "duration_ms must be between 1 and {MAX_VIBRATE_MS}, got {duration_ms}"
            )));
        }

        Ok(ToolOutput::text(format!("Vibrated for {duration_ms} ms")))
    }
}

// =============================================================================
// Battery Status
// =============================================================================

/// Reports a fixed battery reading.
pub struct StaticBatteryTool {
    percent: u8,
    charging: bool,
}

impl StaticBatteryTool {
    pub fn new(percent: u8, charging: bool) -> Self {
        Self { percent, charging }
    }
}

impl Default for StaticBatteryTool {
    fn default() -> Self {
        Self::new(81, false)
    }
}

#[async_trait]
impl Tool for StaticBatteryTool {
    fn name(&self) -> &str {
        "get_battery_status"
    }

    fn description(&self) -> &str {
        "Returns the device battery level and charging state"
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn invoke(&self, _args: &HashMap<String, String>) -> Result<ToolOutput> {
        let output = ToolOutput::text(format!("Battery: {}%", self.percent)).with_data(json!({
            "percent": self.percent,
            "charging": self.charging,
        }));
        Ok(output)
    }
}

// =============================================================================
// Open Application
// =============================================================================

/// Launches an application on the device by name.
pub struct OpenAppTool;

#[async_trait]
impl Tool for OpenAppTool {
    fn name(&self) -> &str {
        "open_application"
    }

    fn description(&self) -> &str {
        "Opens an application on the device by name"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "app_name": {
                    "type": "string",
                    "description": "Name of the application to open"
                }
            },
            "required": ["app_name"]
        })
    }

    async fn invoke(&self, args: &HashMap<String, String>) -> Result<ToolOutput> {
        // Without an app name, picking one is a judgment call the tool
        // cannot make.
        match args.get("app_name").filter(|name| !name.trim().is_empty()) {
            Some(app) => Ok(ToolOutput::text(format!("Opening {}", app.trim()))),
            None => Ok(ToolOutput::deferred("no application named in the request")),
        }
    }
}

// =============================================================================
// Save Note
// =============================================================================

/// Appends notes to an in-memory list.
pub struct SaveNoteTool {
    notes: Mutex<Vec<String>>,
}

impl SaveNoteTool {
    pub fn new() -> Self {
        Self {
            notes: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all saved notes, oldest first.
    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().unwrap().clone()
    }
}

impl Default for SaveNoteTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SaveNoteTool {
    fn name(&self) -> &str {
        "save_note"
    }

    fn description(&self) -> &str {
        "Saves a short text note"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The note text"
                }
            },
            "required": ["content"]
        })
    }

    async fn invoke(&self, args: &HashMap<String, String>) -> Result<ToolOutput> {
        let content = args
            .get("content")
            .or_else(|| args.get("input"))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::invalid_argument("content must be a non-empty string"))?;

        let mut notes = self.notes.lock().unwrap();
        notes.push(content.to_string());
        Ok(ToolOutput::text(format!("Saved note ({} total)", notes.len())))
    }
}

// =============================================================================
// Weather
// =============================================================================

/// Canned weather lookup. Marked network-dependent so the offline gate
/// blocks it without connectivity.
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Returns the current weather for a location"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City or place name"
                }
            }
        })
    }

    fn requires_network(&self) -> bool {
        true
    }

    async fn invoke(&self, args: &HashMap<String, String>) -> Result<ToolOutput> {
        let location = args
            .get("location")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or("your location");
        Ok(ToolOutput::text(format!(
            "Weather in {location}: 18°C, partly cloudy"
        )))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn battery_reports_configured_level() {
        let out = StaticBatteryTool::new(81, false)
            .invoke(&HashMap::new())
            .await
            .unwrap();
        assert!(out.ok);
        assert_eq!(out.message, "Battery: 81%");
        assert_eq!(out.data.unwrap()["percent"], 81);
    }

    #[tokio::test]
    async fn vibrate_rejects_non_numeric_duration() {
        let err = VibrateTool
            .invoke(&args(&[("duration_ms", "very long")]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn vibrate_rejects_out_of_range_duration() {
        let err = VibrateTool
            .invoke(&args(&[("duration_ms", "60000")]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn vibrate_defaults_duration() {
        let out = VibrateTool.invoke(&HashMap::new()).await.unwrap();
        assert_eq!(out.message, "Vibrated for 500 ms");
    }

    #[tokio::test]
    async fn open_app_defers_without_app_name() {
        let out = OpenAppTool.invoke(&HashMap::new()).await.unwrap();
        assert!(out.deferred);
    }

    #[tokio::test]
    async fn open_app_opens_named_app() {
        let out = OpenAppTool
            .invoke(&args(&[("app_name", "spotify")]))
            .await
            .unwrap();
        assert!(!out.deferred);
        assert_eq!(out.message, "Opening spotify");
    }

    #[tokio::test]
    async fn save_note_accumulates() {
        let tool = SaveNoteTool::new();
        tool.invoke(&args(&[("content", "first")])).await.unwrap();
        tool.invoke(&args(&[("content", "second")])).await.unwrap();
        assert_eq!(tool.notes(), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn save_note_rejects_empty_content() {
        let err = SaveNoteTool::new()
            .invoke(&args(&[("content", "  ")]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn weather_requires_network() {
        assert!(WeatherTool.requires_network());
    }
}

//! Typed configuration for the engine.
//!
//! Loaded from an optional `config/default.*` file overlaid with
//! `MIRRORBRAIN__`-prefixed environment variables; every field has a default
//! so the binary runs without any external configuration.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::types::SessionMode;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub reasoning: ReasoningConfig,
    pub mesh: MeshConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum confidence for fast-path eligibility.
    pub fast_path_threshold: f32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Hard cap on Thought/Action/Observation iterations.
    pub max_iterations: usize,
    /// Timeout applied around each generation call.
    pub generation_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MeshConfig {
    /// Relay endpoint, host:port.
    pub relay_addr: String,
    /// Our peer id on the mesh.
    pub peer_id: String,
    /// Peer that does remote reasoning for us.
    pub brain_peer_id: String,
    /// Round-trip await before returning the placeholder reply.
    pub reply_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Mode a session starts in and resets to on closure.
    pub default_mode: SessionMode,
    /// Transcript bound; oldest messages are trimmed beyond it.
    pub max_messages: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            fast_path_threshold: 0.6,
        }
    }
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            max_iterations: 6,
            generation_timeout_ms: 30_000,
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            relay_addr: "127.0.0.1:7677".to_string(),
            peer_id: "mirrorbrain-device".to_string(),
            brain_peer_id: "mirrorbrain-desktop".to_string(),
            reply_timeout_ms: 15_000,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_mode: SessionMode::Local,
            max_messages: 200,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            reasoning: ReasoningConfig::default(),
            mesh: MeshConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config/default.*` (if present) and the
    /// environment, e.g. `MIRRORBRAIN__REASONING__MAX_ITERATIONS=4`.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("MIRRORBRAIN").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.classifier.fast_path_threshold, 0.6);
        assert_eq!(cfg.reasoning.max_iterations, 6);
        assert_eq!(cfg.mesh.reply_timeout_ms, 15_000);
        assert_eq!(cfg.session.default_mode, SessionMode::Local);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: AppConfig = Config::builder()
            .add_source(config::File::from_str(
                "[reasoning]\nmax_iterations = 3\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.reasoning.max_iterations, 3);
        assert_eq!(cfg.session.max_messages, 200);
    }
}

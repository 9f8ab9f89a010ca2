//! Configuration management for the agent.
//!
//! Settings come from two sources:
//! - Environment variables for secrets and deployment knobs:
//!   - `GEMINI_API_KEY` - Required. Your Gemini API key.
//!   - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//!   - `PORT` - Optional. Server port. Defaults to `8080`.
//!   - `LOG_LEVEL` - Optional. Log verbosity. Defaults to `INFO`.
//!   - `GEMINI_API_BASE` - Optional. Override for the Gemini REST endpoint.
//! - `config/agent_config.yaml` for the agent identity, model and prompts.
//!
//! Both the `serve` and `chat` commands build their agent from the same
//! [`Settings`], so the two modes never drift apart.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default location of the YAML settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/agent_config.yaml";

/// Default location of the A2A discovery document.
pub const DEFAULT_DISCOVERY_PATH: &str = "static/.well-known/agent.json";

/// Public Gemini REST endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const API_KEY_VAR: &str = "GEMINI_API_KEY";
const DEFAULT_MAX_ITERATIONS: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Configuration file not found at: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Agent metadata and model settings (`agent:` in the YAML file).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AgentSettings {
    /// Internal agent name (snake_case); also the `appName` accepted by `/run`.
    pub name: String,

    /// Human-readable agent name.
    pub display_name: String,

    /// Agent description for A2A discovery.
    pub description: String,

    /// Gemini model identifier, e.g. `gemini-1.5-flash`.
    pub model: String,

    /// Upper bound on model turns per invocation.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

/// Prompt templates (`prompts:` in the YAML file).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PromptSettings {
    /// The system prompt that defines the agent's behavior.
    pub system_instruction: String,
}

/// Shape of `agent_config.yaml`.
#[derive(Debug, Clone, Deserialize)]
struct YamlSettings {
    agent: AgentSettings,
    prompts: PromptSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// The single source of truth for all application settings.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Clone)]
pub struct Settings {
    /// Gemini API key. Never logged; `Debug` redacts it.
    pub gemini_api_key: String,

    /// Override for the Gemini REST endpoint.
    pub gemini_base_url: String,

    pub agent: AgentSettings,

    pub prompts: PromptSettings,

    pub server: ServerSettings,

    /// Log level as configured (`INFO`, `DEBUG`, ...).
    pub log_level: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_base_url", &self.gemini_base_url)
            .field("agent", &self.agent)
            .field("prompts", &self.prompts)
            .field("server", &self.server)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Settings {
    /// Load settings from the process environment and [`DEFAULT_CONFIG_PATH`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `GEMINI_API_KEY` is missing or empty, or if
    /// the YAML file is missing, malformed, or lacks a required key.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH), |key| std::env::var(key).ok())
    }

    /// Load settings from `path`, resolving environment variables through `env`.
    pub fn load_from<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = env(API_KEY_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(API_KEY_VAR.to_string()))?;

        let yaml = load_yaml(path)?;
        validate_yaml(&yaml)?;

        let host = env("HOST").unwrap_or_else(|| ServerSettings::default().host);

        let port = match env("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?,
            None => ServerSettings::default().port,
        };

        let log_level = env("LOG_LEVEL").unwrap_or_else(|| "INFO".to_string());
        if level_filter(&log_level).is_none() {
            return Err(ConfigError::InvalidValue(
                "LOG_LEVEL".to_string(),
                format!("unknown level: {}", log_level),
            ));
        }

        let gemini_base_url = env("GEMINI_API_BASE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

        Ok(Self {
            gemini_api_key,
            gemini_base_url,
            agent: yaml.agent,
            prompts: yaml.prompts,
            server: ServerSettings { host, port },
            log_level,
        })
    }

    /// Create settings with custom values (useful for testing).
    pub fn new(gemini_api_key: String, agent: AgentSettings, prompts: PromptSettings) -> Self {
        Self {
            gemini_api_key,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            agent,
            prompts,
            server: ServerSettings::default(),
            log_level: "INFO".to_string(),
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.agent.name
    }

    pub fn agent_display_name(&self) -> &str {
        &self.agent.display_name
    }

    pub fn agent_description(&self) -> &str {
        &self.agent.description
    }

    pub fn model_id(&self) -> &str {
        &self.agent.model
    }

    pub fn system_instruction(&self) -> &str {
        &self.prompts.system_instruction
    }

    /// `host:port` the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn load_yaml(path: &Path) -> Result<YamlSettings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_yaml(yaml: &YamlSettings) -> Result<(), ConfigError> {
    let required = [
        ("agent.name", yaml.agent.name.as_str()),
        ("agent.model", yaml.agent.model.as_str()),
        ("prompts.system_instruction", yaml.prompts.system_instruction.as_str()),
    ];
    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                key.to_string(),
                "must not be empty".to_string(),
            ));
        }
    }

    if yaml.agent.max_iterations == 0 {
        return Err(ConfigError::InvalidValue(
            "agent.max_iterations".to_string(),
            "must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Map a `LOG_LEVEL` value onto a tracing filter directive.
///
/// Accepts the Python-style names (`WARNING`, `CRITICAL`) as well.
pub fn level_filter(level: &str) -> Option<&'static str> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" => Some("error"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const VALID_YAML: &str = r#"
agent:
  name: "travel_agent"
  display_name: "Travel Agent"
  description: "Plans trips"
  model: "gemini-1.5-flash"
prompts:
  system_instruction: |
    You are a travel agent.
"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn shipped_config_file_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let settings =
            Settings::load_from(&path, env_of(&[("GEMINI_API_KEY", "k")])).expect("shipped config");

        assert_eq!(settings.agent_name(), "travel_agent");
        assert!(!settings.model_id().is_empty());
        assert!(settings.system_instruction().contains("process_user_request"));
        assert!(settings.system_instruction().contains("confirm_travel_plan"));
        assert_eq!(settings.agent.max_iterations, 10);
    }

    #[test]
    fn loads_fields_from_both_sources() {
        let file = write_config(VALID_YAML);
        let settings = Settings::load_from(
            file.path(),
            env_of(&[("GEMINI_API_KEY", "test123"), ("PORT", "9000"), ("LOG_LEVEL", "debug")]),
        )
        .expect("settings");

        assert_eq!(settings.gemini_api_key, "test123");
        assert_eq!(settings.agent_name(), "travel_agent");
        assert_eq!(settings.agent_display_name(), "Travel Agent");
        assert_eq!(settings.agent_description(), "Plans trips");
        assert_eq!(settings.model_id(), "gemini-1.5-flash");
        assert_eq!(settings.system_instruction(), "You are a travel agent.\n");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.agent.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(settings.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
    }

    #[test]
    fn defaults_port_and_log_level() {
        let file = write_config(VALID_YAML);
        let settings =
            Settings::load_from(file.path(), env_of(&[("GEMINI_API_KEY", "k")])).expect("settings");
        assert_eq!(settings.server, ServerSettings::default());
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
        assert_eq!(settings.log_level, "INFO");
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let file = write_config(VALID_YAML);
        let err = Settings::load_from(file.path(), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "GEMINI_API_KEY"));

        let err = Settings::load_from(file.path(), env_of(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn missing_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nope.yaml");
        let err = Settings::load_from(&path, env_of(&[("GEMINI_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn missing_required_keys_are_rejected() {
        let cases = [
            VALID_YAML.replace("  name: \"travel_agent\"\n", ""),
            VALID_YAML.replace("  model: \"gemini-1.5-flash\"\n", ""),
            "agent:\n  name: a\n  display_name: A\n  description: d\n  model: m\n".to_string(),
            "prompts:\n  system_instruction: hi\n".to_string(),
        ];
        for yaml in cases {
            let file = write_config(&yaml);
            let err = Settings::load_from(file.path(), env_of(&[("GEMINI_API_KEY", "k")]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::Parse { .. }), "yaml: {}", yaml);
        }
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let file = write_config("agent: [unterminated");
        let err =
            Settings::load_from(file.path(), env_of(&[("GEMINI_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_model_is_rejected() {
        let file = write_config(&VALID_YAML.replace("\"gemini-1.5-flash\"", "\"\""));
        let err =
            Settings::load_from(file.path(), env_of(&[("GEMINI_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k, _) if k == "agent.model"));
    }

    #[test]
    fn invalid_port_and_level_are_rejected() {
        let file = write_config(VALID_YAML);
        let err = Settings::load_from(
            file.path(),
            env_of(&[("GEMINI_API_KEY", "k"), ("PORT", "eighty")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k, _) if k == "PORT"));

        let err = Settings::load_from(
            file.path(),
            env_of(&[("GEMINI_API_KEY", "k"), ("LOG_LEVEL", "LOUD")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k, _) if k == "LOG_LEVEL"));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let file = write_config(VALID_YAML);
        let settings = Settings::load_from(file.path(), env_of(&[("GEMINI_API_KEY", "sekrit")]))
            .expect("settings");
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("sekrit"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn python_style_level_names_map_to_tracing() {
        assert_eq!(level_filter("WARNING"), Some("warn"));
        assert_eq!(level_filter("CRITICAL"), Some("error"));
        assert_eq!(level_filter("Info"), Some("info"));
        assert_eq!(level_filter("verbose"), None);
    }
}

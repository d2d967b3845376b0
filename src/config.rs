//! Configuration loaded from the environment
//!
//! # Environment Variables
//!
//! - `NIXPACK_PROVIDER`: completion provider (ollama|openai|anthropic|gemini|xai|groq), default "ollama"
//! - `NIXPACK_MODEL`: model name, default "qwen2.5-coder:7b" for Ollama
//! - `NIXPACK_MODE`: generation mode (template|ai|hybrid), default "template"
//! - `NIXPACK_REQUEST_TIMEOUT`: completion timeout in seconds, default "30"
//! - `NIXPACK_ANALYSIS_TIMEOUT`: analysis timeout in seconds, default "30"
//! - `NIXPACK_MAX_FILES`: file collection cap, default "1000"
//! - `NIXPACK_MIN_CONFIDENCE`: language confidence threshold, default "0.1"
//! - `NIXPACK_OUTPUT_DIR`: directory receiving generated `.nix` files, unset by default
//! - `NIXPACK_LOG_LEVEL`: logging level, default "info"
//! - `NIXPACK_API_BASE_URL`: custom endpoint for the completion provider
//!
//! Provider credentials use the provider's standard variables (`OPENAI_API_KEY`,
//! `ANTHROPIC_API_KEY`, `GEMINI_API_KEY`, `XAI_API_KEY`, `GROQ_API_KEY`).

use crate::detection::AnalysisOptions;
use crate::generation::GenerationMode;
use crate::llm::{parse_provider, BackendError, GenAIClient};
use genai::adapter::AdapterKind;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder:7b";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_FILES: usize = 1000;
const DEFAULT_MIN_CONFIDENCE: f64 = 0.1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: ollama, openai, anthropic, gemini, xai, groq")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Backend initialization failed: {0}")]
    BackendInitError(#[from] BackendError),
}

#[derive(Debug, Clone)]
pub struct NixpackConfig {
    pub provider: AdapterKind,
    pub model: String,
    pub mode: GenerationMode,
    pub request_timeout_secs: u64,
    pub analysis_timeout_secs: u64,
    pub max_files: usize,
    pub min_confidence: f64,
    pub output_dir: Option<PathBuf>,
    pub log_level: String,
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn default_model(provider: AdapterKind) -> String {
    match provider {
        AdapterKind::Ollama => DEFAULT_OLLAMA_MODEL.to_string(),
        _ => String::new(),
    }
}

impl Default for NixpackConfig {
    /// Reads `NIXPACK_*` variables, falling back to defaults for anything
    /// missing or unparseable
    fn default() -> Self {
        let provider = env::var("NIXPACK_PROVIDER")
            .ok()
            .and_then(|s| parse_provider(&s))
            .unwrap_or(AdapterKind::Ollama);

        let model = env::var("NIXPACK_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_model(provider));

        let mode = env_parsed::<GenerationMode>("NIXPACK_MODE").unwrap_or_default();

        let log_level = env::var("NIXPACK_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            provider,
            model,
            mode,
            request_timeout_secs: env_parsed("NIXPACK_REQUEST_TIMEOUT")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            analysis_timeout_secs: env_parsed("NIXPACK_ANALYSIS_TIMEOUT")
                .unwrap_or(DEFAULT_ANALYSIS_TIMEOUT_SECS),
            max_files: env_parsed("NIXPACK_MAX_FILES").unwrap_or(DEFAULT_MAX_FILES),
            min_confidence: env_parsed("NIXPACK_MIN_CONFIDENCE").unwrap_or(DEFAULT_MIN_CONFIDENCE),
            output_dir: env::var("NIXPACK_OUTPUT_DIR")
                .ok()
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from),
            log_level,
        }
    }
}

impl NixpackConfig {
    /// Overrides the provider by name, resetting the model to the new
    /// provider's default
    pub fn set_provider(&mut self, name: &str) -> Result<(), ConfigError> {
        let provider =
            parse_provider(name).ok_or_else(|| ConfigError::InvalidProvider(name.to_string()))?;
        if provider != self.provider {
            self.provider = provider;
            self.model = default_model(provider);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be between 1 second and 10 minutes".to_string(),
            ));
        }
        if self.analysis_timeout_secs == 0 || self.analysis_timeout_secs > 3600 {
            return Err(ConfigError::ValidationFailed(
                "Analysis timeout must be between 1 second and 1 hour".to_string(),
            ));
        }
        if self.max_files == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max files must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::ValidationFailed(format!(
                "Min confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.mode.needs_client() && self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(format!(
                "Mode '{}' needs a model for provider {}. Set NIXPACK_MODEL",
                self.mode,
                self.provider.as_str()
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            min_confidence: self.min_confidence,
            ..AnalysisOptions::default()
        }
        .with_max_files(self.max_files)
        .with_timeout(Duration::from_secs(self.analysis_timeout_secs))
    }

    pub async fn create_client(&self) -> Result<Arc<GenAIClient>, ConfigError> {
        let timeout = Duration::from_secs(self.request_timeout_secs);
        let client = GenAIClient::new(self.provider, self.model.clone(), timeout).await?;
        Ok(Arc::new(client))
    }

    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("provider".to_string(), self.provider.as_str().to_string());
        map.insert("model".to_string(), self.model.clone());
        map.insert("mode".to_string(), self.mode.to_string());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert(
            "analysis_timeout_secs".to_string(),
            self.analysis_timeout_secs.to_string(),
        );
        map.insert("max_files".to_string(), self.max_files.to_string());
        map.insert("min_confidence".to_string(), self.min_confidence.to_string());
        if let Some(dir) = &self.output_dir {
            map.insert("output_dir".to_string(), dir.display().to_string());
        }
        map.insert("log_level".to_string(), self.log_level.clone());
        map
    }
}

impl fmt::Display for NixpackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nixpack Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider.as_str())?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  Mode: {}", self.mode)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Analysis Timeout: {}s", self.analysis_timeout_secs)?;
        writeln!(f, "  Max Files: {}", self.max_files)?;
        writeln!(f, "  Min Confidence: {}", self.min_confidence)?;
        if let Some(dir) = &self.output_dir {
            writeln!(f, "  Output Dir: {}", dir.display())?;
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "NIXPACK_PROVIDER",
        "NIXPACK_MODEL",
        "NIXPACK_MODE",
        "NIXPACK_REQUEST_TIMEOUT",
        "NIXPACK_ANALYSIS_TIMEOUT",
        "NIXPACK_MAX_FILES",
        "NIXPACK_MIN_CONFIDENCE",
        "NIXPACK_OUTPUT_DIR",
        "NIXPACK_LOG_LEVEL",
    ];

    /// Sets or clears an environment variable, restoring it on drop
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn clean_env() -> Vec<EnvGuard> {
        VARS.iter().map(|key| EnvGuard::unset(key)).collect()
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = clean_env();

        let config = NixpackConfig::default();

        assert_eq!(config.provider, AdapterKind::Ollama);
        assert_eq!(config.model, DEFAULT_OLLAMA_MODEL);
        assert_eq!(config.mode, GenerationMode::Template);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.analysis_timeout_secs, 30);
        assert_eq!(config.max_files, 1000);
        assert!(config.output_dir.is_none());
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _clean = clean_env();
        let _guards = vec![
            EnvGuard::set("NIXPACK_PROVIDER", "claude"),
            EnvGuard::set("NIXPACK_MODEL", "claude-sonnet"),
            EnvGuard::set("NIXPACK_MODE", "hybrid"),
            EnvGuard::set("NIXPACK_REQUEST_TIMEOUT", "60"),
            EnvGuard::set("NIXPACK_ANALYSIS_TIMEOUT", "5"),
            EnvGuard::set("NIXPACK_MAX_FILES", "50"),
            EnvGuard::set("NIXPACK_MIN_CONFIDENCE", "0.25"),
            EnvGuard::set("NIXPACK_OUTPUT_DIR", "/tmp/out"),
            EnvGuard::set("NIXPACK_LOG_LEVEL", "DEBUG"),
        ];

        let config = NixpackConfig::default();

        assert_eq!(config.provider, AdapterKind::Anthropic);
        assert_eq!(config.model, "claude-sonnet");
        assert_eq!(config.mode, GenerationMode::Hybrid);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.analysis_timeout_secs, 5);
        assert_eq!(config.max_files, 50);
        assert!((config.min_confidence - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_unparseable_values_fall_back() {
        let _clean = clean_env();
        let _guards = vec![
            EnvGuard::set("NIXPACK_PROVIDER", "nonsense"),
            EnvGuard::set("NIXPACK_MODE", "magic"),
            EnvGuard::set("NIXPACK_MAX_FILES", "lots"),
        ];

        let config = NixpackConfig::default();
        assert_eq!(config.provider, AdapterKind::Ollama);
        assert_eq!(config.mode, GenerationMode::Template);
        assert_eq!(config.max_files, 1000);
    }

    #[test]
    #[serial]
    fn test_validation_failures() {
        let _guards = clean_env();

        let mut config = NixpackConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = NixpackConfig::default();
        config.min_confidence = 1.5;
        assert!(config.validate().is_err());

        let mut config = NixpackConfig::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = NixpackConfig::default();
        config.max_files = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_ai_mode_needs_model() {
        let _guards = clean_env();
        let mut config = NixpackConfig::default();
        config.set_provider("openai").unwrap();
        assert!(config.model.is_empty());
        assert!(config.validate().is_ok());

        config.mode = GenerationMode::Ai;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_set_provider_rejects_unknown() {
        let _guards = clean_env();
        let mut config = NixpackConfig::default();
        assert!(matches!(
            config.set_provider("bard"),
            Err(ConfigError::InvalidProvider(_))
        ));
        config.set_provider("ollama").unwrap();
        assert_eq!(config.model, DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    #[serial]
    fn test_analysis_options() {
        let _guards = clean_env();
        let mut config = NixpackConfig::default();
        config.max_files = 10;
        config.analysis_timeout_secs = 3;
        config.min_confidence = 0.5;

        let options = config.analysis_options();
        assert_eq!(options.max_files, 10);
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert!((options.min_confidence - 0.5).abs() < f64::EPSILON);
        assert!(!options.exclude_patterns.is_empty());
    }

    #[test]
    #[serial]
    fn test_config_display() {
        let _guards = clean_env();
        let config = NixpackConfig::default();
        let display = format!("{}", config);
        assert!(display.contains("Nixpack Configuration:"));
        assert!(display.contains("Provider: Ollama"));
        assert_eq!(config.to_display_map()["mode"], "template");
    }
}

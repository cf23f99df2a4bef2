use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{NewsProbeError, Result};

/// Main configuration structure loaded from newsprobe.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Language model settings shared by every stage
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.2,
            max_tokens: 4096,
        }
    }
}

/// Capability and HTTP behaviour for pipeline runs
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on capability invocations issued by one stage
    pub max_capability_calls: usize,
    /// Characters of scraped page text kept per URL
    pub scrape_max_chars: usize,
    /// Search results requested per query
    pub search_results: usize,
    /// Transport timeout for outbound HTTP requests
    pub http_timeout_secs: u64,
    pub search_endpoint: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_capability_calls: 8,
            scrape_max_chars: 10_000,
            search_results: 10,
            http_timeout_secs: 120,
            search_endpoint: "https://google.serper.dev/search".to_string(),
        }
    }
}

/// Where rendered reports land
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub report_path: PathBuf,
    pub error_log: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from("news_analysis.md"),
            error_log: "report_errors.log".to_string(),
        }
    }
}

/// Dashboard REST server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub title: String,
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            title: "Misinformation Analysis Dashboard".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub openai_api_key: Option<String>,
    pub serper_api_key: Option<String>,
}

impl RuntimeConfig {
    /// Load secrets from the environment
    pub fn load_from_env() -> Self {
        Self {
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            serper_api_key: non_empty_env("SERPER_API_KEY"),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses NEWSPROBE_CONFIG environment variable or defaults to "newsprobe.toml"
    pub fn load() -> Result<Self> {
        Self::load_env_file();

        let config_path =
            std::env::var("NEWSPROBE_CONFIG").unwrap_or_else(|_| "newsprobe.toml".to_string());

        let mut config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` into the process environment without overriding set variables.
    /// 1) NEWSPROBE_ENV_FILE if set
    /// 2) ./.env
    pub fn load_env_file() {
        if let Ok(env_path) = std::env::var("NEWSPROBE_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }
    }

    /// Parse a TOML document; absent sections keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Env-first overrides for the TOML-backed sections
    pub fn apply_env_overrides(&mut self) {
        if let Some(model) = non_empty_env("OPENAI_MODEL_NAME") {
            self.model.model = model;
        }
        if let Some(base_url) = non_empty_env("OPENAI_BASE_URL") {
            self.model.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(temperature) = non_empty_env("NEWSPROBE_TEMPERATURE")
            .and_then(|v| v.parse::<f32>().ok())
        {
            self.model.temperature = temperature;
        }
        if let Some(bind) = non_empty_env("NEWSPROBE_HTTP_BIND")
            .and_then(|v| v.parse::<SocketAddr>().ok())
        {
            self.server.bind = bind;
        }
        if let Some(path) = non_empty_env("NEWSPROBE_OUTPUT") {
            self.output.report_path = PathBuf::from(path);
        }
        if let Some(calls) = non_empty_env("NEWSPROBE_MAX_CAPABILITY_CALLS")
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.pipeline.max_capability_calls = calls;
        }
        if let Some(chars) = non_empty_env("NEWSPROBE_SCRAPE_MAX_CHARS")
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.pipeline.scrape_max_chars = chars;
        }
        if let Some(secs) = non_empty_env("NEWSPROBE_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.pipeline.http_timeout_secs = secs;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.model.trim().is_empty() {
            return Err(NewsProbeError::config("model name must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(NewsProbeError::config("NEWSPROBE_TEMPERATURE must be between 0.0 and 2.0"));
        }
        if !(1..=64).contains(&self.pipeline.max_capability_calls) {
            return Err(NewsProbeError::config(
                "NEWSPROBE_MAX_CAPABILITY_CALLS must be between 1 and 64",
            ));
        }
        if self.pipeline.scrape_max_chars == 0 {
            return Err(NewsProbeError::config("NEWSPROBE_SCRAPE_MAX_CHARS must be > 0"));
        }
        if self.pipeline.http_timeout_secs == 0 {
            return Err(NewsProbeError::config("NEWSPROBE_HTTP_TIMEOUT_SECS must be > 0"));
        }
        Ok(())
    }

    /// Error log for the configured report path
    pub fn error_log_path(&self) -> PathBuf {
        self.error_log_for(&self.output.report_path)
    }

    /// Error log kept in the same directory as `report_path`
    pub fn error_log_for(&self, report_path: &Path) -> PathBuf {
        let dir = report_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        dir.join(&self.output.error_log)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

//! Application settings and configuration management

use crate::error::{AppError, Result};
use crate::response::ResponseMode;
use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Workers AI REST provider shared by the text and image backends
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

fn default_timeout() -> u64 {
    60000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            account_id: String::new(),
            api_token: String::new(),
            timeout_ms: default_timeout(),
        }
    }
}

/// Prompt synthesis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptConfig {
    #[serde(default = "default_prompt_model")]
    pub model: String,
    #[serde(default = "default_instructions")]
    pub instructions: String,
    /// User instruction; `{place}` is replaced with the requested place.
    #[serde(default = "default_user_template")]
    pub user_template: String,
}

fn default_prompt_model() -> String {
    "@cf/openai/gpt-oss-20b".to_string()
}

fn default_instructions() -> String {
    "You are an expert prompt engineer. You help the user write prompts that can be used to \
     generate high quality images using AI image generation models. The style of the image \
     should always be similar to a postcard. You only return the detailed prompt. No other \
     text should be returned."
        .to_string()
}

fn default_user_template() -> String {
    "Write an image generation prompt for a postcard of {place}.".to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            model: default_prompt_model(),
            instructions: default_instructions(),
            user_template: default_user_template(),
        }
    }
}

/// Retry, backoff and throttle knobs for the image orchestrator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Minimum spacing between outbound image calls across all requests. 0 disables.
    #[serde(default)]
    pub min_interval_ms: u64,
    /// "binary" streams the image bytes, "json" wraps them in a base64 envelope.
    #[serde(default = "default_response_mode")]
    pub response_mode: String,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    30000
}

fn default_response_mode() -> String {
    "binary".to_string()
}

impl GenerationConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
            min_interval_ms: 0,
            response_mode: default_response_mode(),
        }
    }
}

/// Signatures that mark a backend failure as capacity-class
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    #[serde(
        default = "default_capacity_signatures",
        deserialize_with = "list_or_csv"
    )]
    pub capacity_signatures: Vec<String>,
    #[serde(default = "default_capacity_codes", deserialize_with = "list_or_csv")]
    pub capacity_codes: Vec<u32>,
    #[serde(default = "default_capacity_statuses", deserialize_with = "list_or_csv")]
    pub capacity_statuses: Vec<u16>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrCsv<T> {
    List(Vec<T>),
    Csv(String),
}

/// Accepts a TOML array or a comma-separated string (as set from the environment)
fn list_or_csv<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match ListOrCsv::<T>::deserialize(deserializer)? {
        ListOrCsv::List(items) => Ok(items),
        ListOrCsv::Csv(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| item.parse::<T>().map_err(serde::de::Error::custom))
            .collect(),
    }
}

fn default_capacity_signatures() -> Vec<String> {
    vec![
        "capacity".to_string(),
        "overloaded".to_string(),
        "too many requests".to_string(),
    ]
}

fn default_capacity_codes() -> Vec<u32> {
    vec![3040]
}

fn default_capacity_statuses() -> Vec<u16> {
    vec![429, 503]
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            capacity_signatures: default_capacity_signatures(),
            capacity_codes: default_capacity_codes(),
            capacity_statuses: default_capacity_statuses(),
        }
    }
}

/// Image backend configuration. List order is fallback rank.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub name: String,
    pub model: String,
    #[serde(default = "default_num_steps")]
    pub num_steps: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_num_steps() -> u32 {
    4
}

fn default_backends() -> Vec<BackendConfig> {
    vec![
        BackendConfig {
            name: "lucid-origin".to_string(),
            model: "@cf/leonardo/lucid-origin".to_string(),
            num_steps: 3,
            enabled: true,
        },
        BackendConfig {
            name: "flux-schnell".to_string(),
            model: "@cf/black-forest-labs/flux-1-schnell".to_string(),
            num_steps: 4,
            enabled: true,
        },
        BackendConfig {
            name: "sdxl".to_string(),
            model: "@cf/stabilityai/stable-diffusion-xl-base-1.0".to_string(),
            num_steps: 20,
            enabled: true,
        },
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            provider: ProviderConfig::default(),
            prompt: PromptConfig::default(),
            generation: GenerationConfig::default(),
            classifier: ClassifierConfig::default(),
            backends: default_backends(),
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_str().ok_or_else(|| {
            AppError::Config(config::ConfigError::Message(
                "Configuration path is not valid UTF-8".to_string(),
            ))
        })?;

        let config = Config::builder()
            .add_source(File::with_name(path).required(false))
            // Override with environment variables (prefixed with POSTCARD__).
            // Values stay strings so numeric-looking tokens are not coerced.
            .add_source(
                Environment::with_prefix("POSTCARD")
                    .separator("__")
                    .try_parsing(false),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Enabled backends in fallback order
    pub fn enabled_backends(&self) -> impl Iterator<Item = &BackendConfig> {
        self.backends.iter().filter(|b| b.enabled)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0"));
        }

        if self.generation.max_retries == 0 {
            return Err(invalid("generation.max_retries must be at least 1"));
        }

        if self.generation.base_delay_ms > self.generation.max_delay_ms {
            return Err(invalid(
                "generation.base_delay_ms cannot exceed generation.max_delay_ms",
            ));
        }

        if ResponseMode::parse(&self.generation.response_mode).is_none() {
            return Err(invalid(format!(
                "Invalid response mode '{}'. Must be 'binary' or 'json'",
                self.generation.response_mode
            )));
        }

        let mut seen = HashSet::new();
        for backend in &self.backends {
            if backend.name.is_empty() {
                return Err(invalid("Backend name cannot be empty"));
            }
            if backend.model.is_empty() {
                return Err(invalid(format!(
                    "Backend '{}' must name a model",
                    backend.name
                )));
            }
            if !seen.insert(backend.name.as_str()) {
                return Err(invalid(format!(
                    "Backend '{}' is configured more than once",
                    backend.name
                )));
            }
        }

        if self.enabled_backends().next().is_none() {
            return Err(invalid("At least one image backend must be enabled"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::Config(config::ConfigError::Message(message.into()))
}

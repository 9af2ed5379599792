use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub transcription: TranscriptionSettings,
    pub commands: CommandSettings,
    pub cors: CorsSettings,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub features: FeatureSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub api_version: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    pub model: String,
    pub language: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandSettings {
    pub min_confidence: f64,
    pub default_suggestion_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    pub window_secs: u64,
    pub max_requests: u32,
    /// Key clients on the first `x-forwarded-for` hop. Enable only behind a proxy that sets it.
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureSettings {
    pub voice_commands: bool,
    pub suggestions: bool,
    pub history: bool,
}

impl Settings {
    /// Defaults, then `appsettings.{environment}.toml`, then `APP_*` variables
    /// (`APP_LLM__API_KEY` sets `llm.api_key`).
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let settings: Settings = Self::builder(environment)?
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .with_list_parse_key("cors.allowed_methods")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn builder(
        environment: Environment,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.api_version", "v1")?
            .set_default("server.max_upload_bytes", 5 * 1024 * 1024)?
            .set_default("llm.api_key", "")?
            .set_default("llm.base_url", "https://api.openai.com/v1")?
            .set_default("llm.model", "gpt-4")?
            .set_default("llm.temperature", 0.7)?
            .set_default("llm.max_tokens", 2000)?
            .set_default("llm.request_timeout_secs", 30)?
            .set_default("llm.max_concurrent_requests", 8)?
            .set_default("transcription.model", "whisper-1")?
            .set_default("transcription.language", "en")?
            .set_default("transcription.request_timeout_secs", 60)?
            .set_default("commands.min_confidence", 0.5)?
            .set_default("commands.default_suggestion_limit", 5)?
            .set_default("cors.allowed_origins", vec!["*"])?
            .set_default(
                "cors.allowed_methods",
                vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"],
            )?
            .set_default("cors.allow_credentials", false)?
            .set_default("rate_limit.window_secs", 900)?
            .set_default("rate_limit.max_requests", 100)?
            .set_default("rate_limit.trust_forwarded_for", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", environment == Environment::Prod)?
            .set_default("database.max_connections", 5)?
            .set_default("features.voice_commands", true)?
            .set_default("features.suggestions", true)?
            .set_default("features.history", true)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            ))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "llm.api_key is required (set APP_LLM__API_KEY)".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.commands.min_confidence) {
            return Err(ConfigError::Message(format!(
                "commands.min_confidence must be within [0, 1], got {}",
                self.commands.min_confidence
            )));
        }
        if self.rate_limit.window_secs == 0 || self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Message(
                "rate_limit.window_secs and rate_limit.max_requests must be positive".to_string(),
            ));
        }
        if self.cors.allow_credentials && self.cors.allowed_origins.iter().any(|o| o == "*") {
            return Err(ConfigError::Message(
                "cors.allow_credentials cannot be combined with a wildcard origin".to_string(),
            ));
        }
        Ok(())
    }

    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.server.api_version.trim_matches('/'))
    }
}

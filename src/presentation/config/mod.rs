mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    CommandSettings, CorsSettings, DatabaseSettings, FeatureSettings, LlmSettings,
    LoggingSettings, RateLimitSettings, ServerSettings, Settings, TranscriptionSettings,
};

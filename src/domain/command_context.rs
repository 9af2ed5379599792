use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Where an incoming command originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandSource {
    Voice,
    Text,
    Api,
    System,
}

impl CommandSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandSource::Voice => "voice",
            CommandSource::Text => "text",
            CommandSource::Api => "api",
            CommandSource::System => "system",
        }
    }
}

impl FromStr for CommandSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voice" => Ok(CommandSource::Voice),
            "text" => Ok(CommandSource::Text),
            "api" => Ok(CommandSource::Api),
            "system" => Ok(CommandSource::System),
            _ => Err(format!("Invalid command source: {}", s)),
        }
    }
}

impl fmt::Display for CommandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request-scoped trace information carried through the whole command pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandContext {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub source: CommandSource,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_command: Option<String>,
}

impl CommandContext {
    /// Builds a context stamped with the current time and a fresh session id.
    pub fn new(user_id: impl Into<String>, source: CommandSource) -> Self {
        Self {
            user_id: user_id.into(),
            timestamp: Utc::now(),
            source,
            session_id: Uuid::new_v4().to_string(),
            metadata: None,
            previous_command: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Option<Map<String, Value>>) -> Self {
        self.metadata = metadata;
        self
    }
}

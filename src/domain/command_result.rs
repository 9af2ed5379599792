use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::ParsedCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandResultId(Uuid);

impl CommandResultId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CommandResultId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    RequiresClarification,
}

impl CommandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Pending => "pending",
            CommandStatus::Processing => "processing",
            CommandStatus::Completed => "completed",
            CommandStatus::Failed => "failed",
            CommandStatus::RequiresClarification => "requires_clarification",
        }
    }
}

impl FromStr for CommandStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CommandStatus::Pending),
            "processing" => Ok(CommandStatus::Processing),
            "completed" => Ok(CommandStatus::Completed),
            "failed" => Ok(CommandStatus::Failed),
            "requires_clarification" => Ok(CommandStatus::RequiresClarification),
            _ => Err(format!("Invalid command status: {}", s)),
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

/// The terminal record of one command invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub id: CommandResultId,
    pub status: CommandStatus,
    pub command: ParsedCommand,
    pub result: CommandOutcome,
    /// Milliseconds from `command.context.timestamp` to completion.
    pub execution_time: u64,
    pub timestamp: DateTime<Utc>,
}

impl CommandResult {
    pub fn completed(command: ParsedCommand, data: Value) -> Self {
        Self::finish(
            command,
            CommandStatus::Completed,
            CommandOutcome {
                success: true,
                data,
                error: None,
            },
        )
    }

    pub fn requires_clarification(command: ParsedCommand, message: String) -> Self {
        let details = serde_json::json!({ "confidence": command.confidence });
        Self::finish(
            command,
            CommandStatus::RequiresClarification,
            CommandOutcome {
                success: false,
                data: Value::Null,
                error: Some(OutcomeError {
                    code: "LOW_CONFIDENCE".to_string(),
                    message,
                    details: Some(details),
                }),
            },
        )
    }

    fn finish(command: ParsedCommand, status: CommandStatus, result: CommandOutcome) -> Self {
        let now = Utc::now();
        let execution_time = elapsed_millis(command.context.timestamp, now);
        Self {
            id: CommandResultId::new(),
            status,
            command,
            result,
            execution_time,
            timestamp: now,
        }
    }
}

/// Milliseconds between two instants, clamped at zero for clock skew.
pub fn elapsed_millis(since: DateTime<Utc>, until: DateTime<Utc>) -> u64 {
    u64::try_from((until - since).num_milliseconds()).unwrap_or(0)
}

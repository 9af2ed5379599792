use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CommandResult, ParsedCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryEntryId(Uuid);

impl HistoryEntryId {
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

impl Default for HistoryEntryId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandHistoryEntry {
    pub id: HistoryEntryId,
    pub user_id: String,
    pub command: ParsedCommand,
    pub result: CommandResult,
    pub timestamp: DateTime<Utc>,
}

impl CommandHistoryEntry {
    pub fn from_result(result: &CommandResult) -> Self {
        Self {
            id: HistoryEntryId::new(),
            user_id: result.command.context.user_id.clone(),
            command: result.command.clone(),
            result: result.clone(),
            timestamp: result.timestamp,
        }
    }
}

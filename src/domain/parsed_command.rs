use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CommandContext, CommandIntent};

/// A command after intent classification. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCommand {
    pub original_text: String,
    pub intent: CommandIntent,
    pub confidence: f64,
    pub entities: Map<String, Value>,
    pub context: CommandContext,
}

impl ParsedCommand {
    pub fn new(
        original_text: String,
        intent: CommandIntent,
        confidence: f64,
        entities: Map<String, Value>,
        context: CommandContext,
    ) -> Self {
        Self {
            original_text,
            intent,
            confidence: confidence.clamp(0.0, 1.0),
            entities,
            context,
        }
    }
}

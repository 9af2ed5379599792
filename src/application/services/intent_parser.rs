use std::sync::Arc;

use serde_json::{Map, Value};

use crate::application::ports::{LlmClient, LlmClientError};
use crate::domain::{CommandContext, CommandIntent, ParsedCommand};

/// Confidence assigned when the model omits one.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Turns free text into a [`ParsedCommand`] with a single JSON-mode completion.
pub struct IntentParser {
    llm_client: Arc<dyn LlmClient>,
    instruction: String,
}

impl IntentParser {
    pub fn new(llm_client: Arc<dyn LlmClient>) -> Self {
        Self {
            llm_client,
            instruction: build_instruction(),
        }
    }

    pub async fn parse(
        &self,
        text: &str,
        context: CommandContext,
    ) -> Result<ParsedCommand, ParsingError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParsingError::EmptyInput);
        }

        let raw = self
            .llm_client
            .complete_json(&self.instruction, text)
            .await
            .map_err(ParsingError::Upstream)?;

        let (intent, confidence, entities) = interpret_response(&raw)?;

        tracing::debug!(
            intent = %intent,
            confidence,
            entity_count = entities.len(),
            "Command parsed"
        );

        Ok(ParsedCommand::new(
            text.to_string(),
            intent,
            confidence,
            entities,
            context,
        ))
    }
}

fn interpret_response(
    raw: &str,
) -> Result<(CommandIntent, f64, Map<String, Value>), ParsingError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ParsingError::MalformedResponse(format!("not JSON: {}", e)))?;

    let Value::Object(mut object) = value else {
        return Err(ParsingError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    let intent = match object.get("intent") {
        Some(Value::String(s)) => s
            .parse::<CommandIntent>()
            .map_err(|_| ParsingError::UnknownIntent(s.clone()))?,
        Some(other) => return Err(ParsingError::UnknownIntent(other.to_string())),
        None => {
            return Err(ParsingError::MalformedResponse(
                "missing intent".to_string(),
            ));
        }
    };

    let confidence = match object.get("confidence") {
        None | Some(Value::Null) => DEFAULT_CONFIDENCE,
        Some(v) => v
            .as_f64()
            .filter(|c| c.is_finite())
            .ok_or_else(|| {
                ParsingError::MalformedResponse(format!("confidence is not a number: {}", v))
            })?,
    };

    let entities = match object.remove("entities") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(ParsingError::MalformedResponse(format!(
                "entities must be an object, got {}",
                other
            )));
        }
    };

    Ok((intent, confidence, entities))
}

fn build_instruction() -> String {
    let intents = CommandIntent::ALL
        .iter()
        .map(|i| i.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an assistant that parses natural language commands for an accounting system \
         into structured data. Respond with a single JSON object with the keys \"intent\", \
         \"confidence\" and \"entities\". \"intent\" must be exactly one of: {intents}. \
         \"confidence\" is a number between 0 and 1. \"entities\" is an object using camelCase \
         keys such as accountId, transactionId, amount, type, description, category, date, \
         startDate, endDate, minAmount, maxAmount, status, reportType and format. Dates use \
         the YYYY-MM-DD format."
    )
}

#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    #[error("command text is empty")]
    EmptyInput,
    #[error("language model request failed: {0}")]
    Upstream(#[source] LlmClientError),
    #[error("malformed language model response: {0}")]
    MalformedResponse(String),
    #[error("invalid intent: {0}")]
    UnknownIntent(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_full_response_when_interpreting_then_all_fields_are_kept() {
        let raw = r#"{"intent":"get_account_balance","confidence":0.93,"entities":{"accountId":"A1"}}"#;

        let (intent, confidence, entities) = interpret_response(raw).unwrap();

        assert_eq!(intent, CommandIntent::GetAccountBalance);
        assert!((confidence - 0.93).abs() < f64::EPSILON);
        assert_eq!(entities.get("accountId"), Some(&Value::from("A1")));
    }

    #[test]
    fn given_missing_confidence_when_interpreting_then_defaults() {
        let (_, confidence, entities) =
            interpret_response(r#"{"intent":"tax_query"}"#).unwrap();

        assert!((confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
        assert!(entities.is_empty());
    }

    #[test]
    fn given_string_confidence_when_interpreting_then_malformed() {
        let result = interpret_response(r#"{"intent":"tax_query","confidence":"high"}"#);

        assert!(matches!(result, Err(ParsingError::MalformedResponse(_))));
    }

    #[test]
    fn given_array_entities_when_interpreting_then_malformed() {
        let result = interpret_response(r#"{"intent":"tax_query","entities":[1,2]}"#);

        assert!(matches!(result, Err(ParsingError::MalformedResponse(_))));
    }

    #[test]
    fn given_instruction_when_built_then_lists_every_intent() {
        let instruction = build_instruction();

        for intent in CommandIntent::ALL {
            assert!(instruction.contains(intent.as_str()));
        }
    }
}

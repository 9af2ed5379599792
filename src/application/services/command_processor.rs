use std::sync::Arc;

use serde_json::{Map, Value};

use crate::application::ports::{
    AccountingCapability, CommandHistoryRepository, HistoryQuery, LlmClient, TranscriptionEngine,
    TranscriptionError,
};
use crate::domain::{
    CommandContext, CommandHistoryEntry, CommandResult, CommandSource, ParsedCommand,
};

use super::{CommandDispatcher, CommandProcessingError, IntentParser};

/// User id stamped on voice commands until authentication supplies one.
pub const VOICE_USER_ID: &str = "system";
pub const MAX_SUGGESTIONS: usize = 10;

/// Entry point of the command pipeline: transcribe, parse, dispatch, record.
pub struct CommandProcessor {
    parser: IntentParser,
    dispatcher: CommandDispatcher,
    llm_client: Arc<dyn LlmClient>,
    transcription_engine: Arc<dyn TranscriptionEngine>,
    history: Arc<dyn CommandHistoryRepository>,
    min_confidence: f64,
}

impl CommandProcessor {
    pub fn new(
        llm_client: Arc<dyn LlmClient>,
        transcription_engine: Arc<dyn TranscriptionEngine>,
        accounting: Arc<dyn AccountingCapability>,
        history: Arc<dyn CommandHistoryRepository>,
        min_confidence: f64,
    ) -> Self {
        Self {
            parser: IntentParser::new(Arc::clone(&llm_client)),
            dispatcher: CommandDispatcher::new(accounting),
            llm_client,
            transcription_engine,
            history,
            min_confidence,
        }
    }

    #[tracing::instrument(
        skip(self, text, context),
        fields(
            user_id = %context.user_id,
            session_id = %context.session_id,
            source = %context.source,
        )
    )]
    pub async fn process_text(
        &self,
        text: &str,
        context: CommandContext,
    ) -> Result<CommandResult, CommandProcessingError> {
        tracing::info!(chars = text.len(), "Processing text command");

        let command = self.parser.parse(text, context).await?;

        let result = if command.confidence < self.min_confidence {
            self.clarify(command)
        } else {
            self.dispatcher.execute(command).await?
        };

        tracing::info!(
            result_id = %result.id.as_uuid(),
            status = %result.status,
            execution_time_ms = result.execution_time,
            "Command finished"
        );

        self.record(&result).await;
        Ok(result)
    }

    #[tracing::instrument(skip(self, audio_data, metadata), fields(bytes = audio_data.len()))]
    pub async fn process_voice(
        &self,
        audio_data: &[u8],
        file_name: &str,
        metadata: Option<Map<String, Value>>,
    ) -> Result<CommandResult, CommandProcessingError> {
        let text = self
            .transcription_engine
            .transcribe(audio_data, file_name)
            .await?;
        if text.trim().is_empty() {
            return Err(TranscriptionError::TranscriptionFailed(
                "no speech recognized".to_string(),
            )
            .into());
        }

        let context =
            CommandContext::new(VOICE_USER_ID, CommandSource::Voice).with_metadata(metadata);

        self.process_text(&text, context).await
    }

    #[tracing::instrument(skip(self, context))]
    pub async fn suggestions(
        &self,
        user_id: &str,
        context: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>, CommandProcessingError> {
        let limit = limit.clamp(1, MAX_SUGGESTIONS);
        let mut instruction = String::from(
            "You are an assistant that suggests commands for an accounting system. \
             Suggest one short natural language command a user could give, such as \
             asking for an account balance or recording a transaction.",
        );
        if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
            instruction.push_str(&format!(" Context: {}", context));
        }

        let choices = self
            .llm_client
            .complete_choices(&instruction, limit)
            .await
            .map_err(CommandProcessingError::Suggestions)?;

        let suggestions: Vec<String> = choices
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .take(limit)
            .collect();

        tracing::debug!(count = suggestions.len(), "Suggestions generated");
        Ok(suggestions)
    }

    pub async fn history(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<CommandHistoryEntry>, CommandProcessingError> {
        Ok(self.history.query(query).await?)
    }

    fn clarify(&self, command: ParsedCommand) -> CommandResult {
        tracing::info!(
            confidence = command.confidence,
            threshold = self.min_confidence,
            "Confidence below threshold, asking for clarification"
        );
        let message = format!(
            "Not confident the command means `{}`; please rephrase it",
            command.intent
        );
        CommandResult::requires_clarification(command, message)
    }

    async fn record(&self, result: &CommandResult) {
        let entry = CommandHistoryEntry::from_result(result);
        if let Err(e) = self.history.record(&entry).await {
            tracing::error!(
                error = %e,
                result_id = %result.id.as_uuid(),
                "Failed to record command history"
            );
        }
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::presentation::config::TranscriptionSettings;

pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    language: String,
    timeout_secs: u64,
}

impl OpenAiWhisperEngine {
    pub fn new(api_key: String, base_url: &str, settings: &TranscriptionSettings) -> Self {
        let timeout_secs = settings.request_timeout_secs.max(1);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            language: settings.language.clone(),
            timeout_secs,
        }
    }
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    async fn transcribe(
        &self,
        audio_data: &[u8],
        file_name: &str,
    ) -> Result<String, TranscriptionError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file_part = multipart::Part::bytes(audio_data.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "text")
            .part("file", file_part);

        tracing::debug!(
            model = %self.model,
            language = %self.language,
            bytes = audio_data.len(),
            "Sending audio to Whisper API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranscriptionError::Timeout(self.timeout_secs)
                } else {
                    TranscriptionError::ApiRequestFailed(format!("request: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let transcript = response
            .text()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("body: {}", e)))?;

        tracing::info!(chars = transcript.len(), "Whisper transcription completed");

        Ok(transcript.trim().to_string())
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "mp3" | "mpga" | "mpeg" => "audio/mpeg",
        "m4a" | "mp4" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "webm" => "audio/webm",
        "flac" => "audio/flac",
        _ => "audio/wav",
    }
}

#[cfg(test)]
mod tests {
    use super::mime_for;

    #[test]
    fn given_known_extension_when_guessing_mime_then_matches() {
        assert_eq!(mime_for("memo.MP3"), "audio/mpeg");
        assert_eq!(mime_for("clip.webm"), "audio/webm");
    }

    #[test]
    fn given_no_extension_when_guessing_mime_then_defaults_to_wav() {
        assert_eq!(mime_for("recording"), "audio/wav");
    }
}

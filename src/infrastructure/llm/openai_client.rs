use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::presentation::config::LlmSettings;

const SUGGESTION_TEMPERATURE: f32 = 0.7;
const SUGGESTION_MAX_TOKENS: usize = 200;

/// OpenAI-compatible chat completions client.
///
/// Outbound calls are bounded by a per-request timeout and a semaphore shared by
/// all callers of this client.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
    timeout_secs: u64,
    permits: Semaphore,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(settings: &LlmSettings) -> Self {
        let timeout_secs = settings.request_timeout_secs.max(1);
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });

        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout_secs,
            permits: Semaphore::new(settings.max_concurrent_requests.max(1)),
        }
    }

    async fn send(
        &self,
        request: &ChatCompletionRequest<'_>,
    ) -> Result<Vec<Option<String>>, LlmClientError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        tracing::debug!(model = %self.model, n = ?request.n, "Sending chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        if completion.choices.is_empty() {
            return Err(LlmClientError::InvalidResponse("empty choices".to_string()));
        }

        Ok(completion
            .choices
            .into_iter()
            .map(|choice| choice.message.content)
            .collect())
    }

    fn request_error(&self, e: reqwest::Error) -> LlmClientError {
        if e.is_timeout() {
            LlmClientError::Timeout(self.timeout_secs)
        } else {
            LlmClientError::ApiRequestFailed(e.to_string())
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete_json(
        &self,
        instruction: &str,
        input: &str,
    ) -> Result<String, LlmClientError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instruction,
                },
                ChatMessage {
                    role: "user",
                    content: input,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            n: None,
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        };

        self.send(&request)
            .await?
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| LlmClientError::InvalidResponse("empty message content".to_string()))
    }

    async fn complete_choices(
        &self,
        instruction: &str,
        n: usize,
    ) -> Result<Vec<String>, LlmClientError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "system",
                content: instruction,
            }],
            max_tokens: SUGGESTION_MAX_TOKENS,
            temperature: SUGGESTION_TEMPERATURE,
            n: Some(n.max(1)),
            response_format: None,
        };

        Ok(self.send(&request).await?.into_iter().flatten().collect())
    }
}

//! OllamaGateway - LanguageModelGateway over an Ollama-compatible chat API.
//!
//! Posts OpenAI-compatible chat payloads to `{base_url}/api/chat` with
//! `stream: false`, and `format: "json"` when structured feedback is
//! requested. Every call carries an explicit timeout from [`GatewayConfig`].

use crate::config::GatewayConfig;
use async_trait::async_trait;
use intervo_core::conversation::Turn;
use intervo_core::error::{IntervoError, Result};
use intervo_core::gateway::prompt;
use intervo_core::gateway::{ChatMessage, FeedbackDraft, InterviewContext, LanguageModelGateway};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gateway implementation that talks to an Ollama HTTP endpoint.
#[derive(Clone)]
pub struct OllamaGateway {
    client: Client,
    config: GatewayConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Ollama's `/api/chat` returns `message.content`; older generate-style
/// deployments return a top-level `response`. Accept either.
#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
    response: Option<String>,
}

impl OllamaGateway {
    /// Creates a new gateway with the provided configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Creates a gateway configured from environment variables.
    pub fn try_from_env() -> Result<Self> {
        Ok(Self::new(GatewayConfig::try_from_env()?))
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        expect_json: bool,
        timeout: Duration,
    ) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages,
            stream: false,
            format: expect_json.then_some("json"),
        };
        let url = format!("{}/api/chat", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                IntervoError::upstream(format!("Ollama request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Ollama error body".to_string());
            return Err(IntervoError::upstream(format!(
                "Ollama returned {status}: {body_text}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|err| {
            IntervoError::upstream(format!("Failed to parse Ollama response: {err}"))
        })?;

        let content = parsed
            .message
            .map(|m| m.content)
            .or(parsed.response)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(IntervoError::upstream(
                "Ollama returned an empty completion",
            ));
        }
        Ok(content)
    }
}

#[async_trait]
impl LanguageModelGateway for OllamaGateway {
    async fn generate_opening(&self, context: &InterviewContext) -> Result<String> {
        tracing::debug!(
            "[OllamaGateway] Generating opening question for role '{}'",
            context.job_role
        );
        let messages = prompt::opening_messages(context);
        self.chat(&messages, false, self.config.opening_timeout)
            .await
    }

    async fn generate_next(&self, history: &[Turn], context: &InterviewContext) -> Result<String> {
        tracing::debug!(
            "[OllamaGateway] Generating follow-up over {} turns",
            history.len()
        );
        let messages = prompt::next_question_messages(history, context);
        self.chat(&messages, false, self.config.reply_timeout).await
    }

    async fn generate_feedback(&self, history: &[Turn]) -> Result<FeedbackDraft> {
        tracing::debug!(
            "[OllamaGateway] Generating feedback over {} turns",
            history.len()
        );
        let messages = prompt::feedback_messages(history);
        let raw = self
            .chat(&messages, true, self.config.feedback_timeout)
            .await?;
        // A malformed draft is a serialization error, distinct from an
        // unreachable gateway; the orchestrator substitutes a placeholder
        // for the former and leaves feedback absent for the latter.
        let draft: FeedbackDraft = serde_json::from_str(&raw)?;
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_omits_format_unless_json() {
        let messages = vec![ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "llama3.1",
            messages: &messages,
            stream: false,
            format: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("format").is_none());
        assert_eq!(json["stream"], false);

        let request = ChatRequest {
            model: "llama3.1",
            messages: &messages,
            stream: false,
            format: Some("json"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["format"], "json");
    }

    #[test]
    fn test_chat_response_accepts_both_shapes() {
        let chat: ChatResponse =
            serde_json::from_str(r#"{"message": {"role": "assistant", "content": "Q1"}}"#).unwrap();
        assert_eq!(chat.message.unwrap().content, "Q1");

        let generate: ChatResponse = serde_json::from_str(r#"{"response": "Q1"}"#).unwrap();
        assert_eq!(generate.response.unwrap(), "Q1");
    }
}

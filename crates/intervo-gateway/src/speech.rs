//! OpenAiSpeechGateway - speech-to-text and text-to-speech over OpenAI.
//!
//! Whisper for transcription, `tts-1-hd` for synthesis. Consumed by the
//! surrounding voice UI; the orchestrator core never calls this directly.

use async_trait::async_trait;
use intervo_core::error::{IntervoError, Result};
use intervo_core::gateway::SpeechGateway;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const TTS_URL: &str = "https://api.openai.com/v1/audio/speech";
const STT_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const DEFAULT_VOICE: &str = "alloy";
const SPEECH_TIMEOUT: Duration = Duration::from_secs(30);

/// Speech gateway backed by the OpenAI audio endpoints.
#[derive(Clone)]
pub struct OpenAiSpeechGateway {
    client: Client,
    api_key: String,
    voice: String,
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    speed: f32,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiSpeechGateway {
    /// Creates a new gateway with the provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            voice: DEFAULT_VOICE.to_string(),
        }
    }

    /// Creates a gateway from the `OPENAI_API_KEY` environment variable.
    pub fn try_from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            IntervoError::internal("OPENAI_API_KEY is not defined in environment variables")
        })?;
        Ok(Self::new(api_key))
    }

    /// Overrides the synthesis voice.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }
}

#[async_trait]
impl SpeechGateway for OpenAiSpeechGateway {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        if audio.is_empty() {
            return Err(IntervoError::validation(
                "Audio data is required for transcription",
            ));
        }

        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|err| IntervoError::internal(format!("Invalid audio part: {err}")))?;
        let form = reqwest::multipart::Form::new()
            .text("model", "whisper-1")
            .part("file", part);

        let response = self
            .client
            .post(STT_URL)
            .timeout(SPEECH_TIMEOUT)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|err| IntervoError::upstream(format!("Transcription request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(IntervoError::upstream(format!(
                "Transcription returned {}",
                response.status()
            )));
        }

        let parsed: TranscriptionResponse = response.json().await.map_err(|err| {
            IntervoError::upstream(format!("Failed to parse transcription response: {err}"))
        })?;
        Ok(parsed.text)
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(IntervoError::validation("Text is required for synthesis"));
        }

        let body = SynthesisRequest {
            model: "tts-1-hd",
            input: text,
            voice: &self.voice,
            response_format: "mp3",
            speed: 0.9,
        };

        let response = self
            .client
            .post(TTS_URL)
            .timeout(SPEECH_TIMEOUT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| IntervoError::upstream(format!("Synthesis request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(IntervoError::upstream(format!(
                "Synthesis returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| IntervoError::upstream(format!("Failed to read audio body: {err}")))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_inputs_are_rejected_before_any_request() {
        let gateway = OpenAiSpeechGateway::new("test-key");
        let err = gateway.transcribe(&[]).await.unwrap_err();
        assert!(matches!(err, IntervoError::Validation(_)));

        let err = gateway.synthesize("   ").await.unwrap_err();
        assert!(matches!(err, IntervoError::Validation(_)));
    }

    #[test]
    fn test_synthesis_payload_shape() {
        let body = SynthesisRequest {
            model: "tts-1-hd",
            input: "Hello candidate",
            voice: "alloy",
            response_format: "mp3",
            speed: 0.9,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "tts-1-hd");
        assert_eq!(json["response_format"], "mp3");
    }
}

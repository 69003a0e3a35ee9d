//! # intervo-gateway
//!
//! Provider implementations behind the `intervo-core` gateway traits: an
//! Ollama-compatible language model gateway and an OpenAI speech gateway.

pub mod config;
pub mod ollama;
pub mod speech;

pub use crate::config::GatewayConfig;
pub use crate::ollama::OllamaGateway;
pub use crate::speech::OpenAiSpeechGateway;

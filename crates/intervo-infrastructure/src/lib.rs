//! # intervo-infrastructure
//!
//! Storage implementations for the Intervo domain traits: process-local
//! in-memory repositories for tests and embedders, and TOML-file
//! repositories for durable single-node deployments.

pub mod memory_conversation_log;
pub mod memory_session_repository;
pub mod toml_conversation_log;
pub mod toml_session_repository;

pub use crate::memory_conversation_log::MemoryConversationLog;
pub use crate::memory_session_repository::MemorySessionRepository;
pub use crate::toml_conversation_log::TomlConversationLog;
pub use crate::toml_session_repository::TomlSessionRepository;

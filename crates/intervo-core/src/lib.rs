//! # intervo-core
//!
//! Domain layer of the Intervo interview orchestration system: the session
//! entity and its status state machine, the append-only conversation log,
//! the gateway contracts for language-model and speech providers, and the
//! shared error taxonomy.
//!
//! This crate holds no IO; storage and providers implement the traits
//! defined here.

pub mod conversation;
pub mod error;
pub mod gateway;
pub mod session;

// Re-export common error type
pub use error::{IntervoError, Result};

//! Conversation domain: ordered turn history and its append-only log trait.

pub mod model;
pub mod repository;

pub use model::{Turn, TurnRole};
pub use repository::ConversationLog;

//! Session domain: the interview session entity, its status state machine,
//! and the persistence trait.

pub mod model;
pub mod repository;

pub use model::{
    Difficulty, EndReason, ErrorEntry, Feedback, InterviewSession, SessionStatus,
};
pub use repository::SessionRepository;

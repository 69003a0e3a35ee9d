//! # intervo-application
//!
//! Use-case layer for Intervo. `InterviewOrchestrator` drives the session
//! state machine over the `intervo-core` repository and gateway traits; it
//! is the component a transport layer (HTTP handlers, a CLI, a desktop
//! shell) calls into.

pub mod locks;
pub mod orchestrator;
pub mod updater;

pub use crate::locks::LockRegistry;
pub use crate::orchestrator::{InitializationPoll, InterviewOrchestrator, StartAdHocRequest};
pub use crate::updater::SessionUpdater;

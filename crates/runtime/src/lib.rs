//! Session orchestration: the registry of live bot sessions, the per-event
//! pipeline, and serialized conversation state.
//!
//! The flow end to end: the [`Orchestrator`] loads bot configs from the
//! store, the [`SessionRegistry`] opens one transport subscription per bot
//! and spawns its consumption loop, and every inbound event runs through a
//! [`Pipeline`] (audit, command/text/callback dispatch, workflow trigger
//! evaluation). Replies leave through the transport; conversation context
//! lands in the store through [`Conversations`], which serializes writers
//! per chat.

pub mod conversation;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod registry;

pub use {
    conversation::Conversations,
    error::{Error, Result},
    orchestrator::{Orchestrator, StartSummary},
    pipeline::Pipeline,
    registry::{SessionInfo, SessionRegistry},
};

use {
    apiary_queue::JobQueue, apiary_responder::Responder, apiary_store::Store,
    apiary_transport::Transport, std::sync::Arc,
};

/// The capability set sessions are built from. All handles are shared;
/// cloning is cheap.
#[derive(Clone)]
pub struct Capabilities {
    pub transport: Arc<dyn Transport>,
    pub store: Arc<dyn Store>,
    pub responder: Arc<dyn Responder>,
    pub queue: Arc<dyn JobQueue>,
}

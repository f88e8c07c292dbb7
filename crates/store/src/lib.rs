//! Persistence capability: bot configs, workflow rules, conversations, and
//! the message audit log.
//!
//! The runtime only ever sees the [`Store`] trait. [`MemoryStore`] backs
//! tests and local runs; a database-backed implementation slots in behind
//! the same trait without touching the runtime.

pub mod bot;
pub mod conversation;
pub mod error;
pub mod memory;
pub mod message_log;
pub mod store;

pub use {
    bot::BotConfig,
    conversation::Conversation,
    error::{Error, Result},
    memory::MemoryStore,
    message_log::MessageLogEntry,
    store::Store,
};

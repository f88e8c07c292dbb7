//! Chat-provider capability: inbound event streams and outbound sends.
//!
//! The runtime talks to the provider exclusively through the [`Transport`]
//! trait. One transport instance serves the whole process; every bot opens
//! its own subscription with its own credential. Two implementations ship
//! here: an in-memory pair for tests and a stdin/stdout loop for local runs.

pub mod console;
pub mod error;
pub mod event;
pub mod memory;
pub mod traits;

pub use {
    console::ConsoleTransport,
    error::{Error, Result},
    event::{EventKind, InboundEvent, SenderInfo},
    memory::{MemoryTransport, SentMessage},
    traits::{EVENT_BUFFER, Sender, Subscription, Transport},
};

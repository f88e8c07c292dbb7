//! The capability seam between the runtime and a chat provider.

use {
    apiary_common::ChatId,
    async_trait::async_trait,
    secrecy::Secret,
    std::sync::Arc,
    tokio::sync::mpsc,
};

use crate::{error::Result, event::InboundEvent};

/// Capacity of the inbound event buffer handed to each session.
pub const EVENT_BUFFER: usize = 64;

/// Outbound half of one bot's link to the provider.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Send a plain text message to a chat.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;

    /// Acknowledge an inline interaction. This is a lightweight notice tied
    /// to the interaction, not a chat message.
    async fn ack_interaction(&self, interaction_id: &str, text: &str) -> Result<()>;
}

/// A live per-bot link to the provider.
///
/// The subscribing session exclusively owns `events`; dropping the receiver
/// releases the subscription. The sender half is shared and stays usable
/// for as long as anyone holds it.
pub struct Subscription {
    pub events: mpsc::Receiver<InboundEvent>,
    pub sender: Arc<dyn Sender>,
}

/// A chat provider. One implementation serves every bot in the process;
/// each credential gets its own subscription.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the event stream for one bot credential.
    async fn subscribe(&self, credential: &Secret<String>) -> Result<Subscription>;
}

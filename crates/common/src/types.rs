//! Identifier aliases shared by the whole workspace.
//!
//! Bots, accounts, workflows and conversations are addressed by UUIDs minted
//! on our side; chats and end users carry the numeric ids assigned by the
//! chat provider.

use uuid::Uuid;

/// One configured bot identity (a tenant of the host process).
pub type BotId = Uuid;

/// The account that owns one or more bots.
pub type AccountId = Uuid;

/// A workflow rule attached to a bot.
pub type WorkflowId = Uuid;

/// A durable per-chat conversation record.
pub type ConversationId = Uuid;

/// Chat identifier as assigned by the chat provider.
pub type ChatId = i64;

/// End-user identifier as assigned by the chat provider.
pub type UserId = i64;

/// Current unix time in seconds.
#[must_use]
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

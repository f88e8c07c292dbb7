//! Append-only audit records of everything said in both directions.

use {
    apiary_common::{AccountId, ChatId, UserId, unix_now},
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// One audit record. The runtime only appends; reading the log belongs to
/// whatever fronts the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageLogEntry {
    pub account_id: AccountId,
    /// The end user on the other side of the chat, for both directions.
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub text: String,
    pub from_bot: bool,
    /// Provider-side details worth keeping, e.g. the sender's username.
    pub metadata: Value,
    /// Unix seconds.
    pub created_at: i64,
}

impl MessageLogEntry {
    /// Record for an inbound end-user event.
    #[must_use]
    pub fn inbound(
        account_id: AccountId,
        user_id: UserId,
        chat_id: ChatId,
        text: impl Into<String>,
        metadata: Value,
    ) -> Self {
        Self {
            account_id,
            user_id,
            chat_id,
            text: text.into(),
            from_bot: false,
            metadata,
            created_at: unix_now(),
        }
    }

    /// Record for a message the bot sent.
    #[must_use]
    pub fn outbound(
        account_id: AccountId,
        user_id: UserId,
        chat_id: ChatId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            user_id,
            chat_id,
            text: text.into(),
            from_bot: true,
            metadata: Value::Object(serde_json::Map::new()),
            created_at: unix_now(),
        }
    }
}

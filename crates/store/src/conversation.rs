//! Durable per-chat conversation state.

use {
    apiary_common::{AccountId, ChatId, ConversationId, UserId},
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

/// One conversation row. At most one exists per `(account_id, chat_id)`;
/// it is created lazily on a chat's first contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub account_id: AccountId,
    pub user_id: UserId,
    pub chat_id: ChatId,
    /// Free-form key/value context. Written back as a whole map; merges are
    /// shallow.
    #[serde(default)]
    pub context: Map<String, Value>,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds, refreshed on every context write.
    pub updated_at: i64,
}

//! The persistence trait the runtime is written against.

use {
    apiary_common::{AccountId, BotId, ChatId, ConversationId, UserId},
    apiary_workflows::WorkflowRule,
    async_trait::async_trait,
    serde_json::{Map, Value},
};

use crate::{
    bot::BotConfig, conversation::Conversation, error::Result, message_log::MessageLogEntry,
};

#[async_trait]
pub trait Store: Send + Sync {
    /// Every bot that should have a running session.
    async fn list_active_bots(&self) -> Result<Vec<BotConfig>>;

    /// Active workflow rules of one bot, in insertion order.
    async fn list_active_workflows(&self, bot_id: BotId) -> Result<Vec<WorkflowRule>>;

    /// The conversation row for a chat, if it exists.
    async fn get_conversation(
        &self,
        account_id: AccountId,
        chat_id: ChatId,
    ) -> Result<Option<Conversation>>;

    /// Create the row for a chat's first contact, with empty context.
    /// Fails with [`Error::Conflict`](crate::Error::Conflict) when the row
    /// already exists.
    async fn create_conversation(
        &self,
        account_id: AccountId,
        user_id: UserId,
        chat_id: ChatId,
    ) -> Result<Conversation>;

    /// Overwrite a conversation's whole context map.
    async fn update_conversation(
        &self,
        id: ConversationId,
        context: Map<String, Value>,
    ) -> Result<()>;

    /// Append one audit record.
    async fn append_message_log(&self, entry: MessageLogEntry) -> Result<()>;
}

//! In-memory store for tests and local runs.

use {
    apiary_common::{AccountId, BotId, ChatId, ConversationId, UserId, unix_now},
    apiary_workflows::WorkflowRule,
    async_trait::async_trait,
    serde_json::{Map, Value},
    std::{
        collections::HashMap,
        sync::{Mutex, MutexGuard},
    },
    uuid::Uuid,
};

use crate::{
    bot::BotConfig,
    conversation::Conversation,
    error::{Error, Result},
    message_log::MessageLogEntry,
    store::Store,
};

/// `Store` backed by plain vectors behind mutexes. Everything is lost on
/// drop, which is the point.
#[derive(Default)]
pub struct MemoryStore {
    bots: Mutex<Vec<BotConfig>>,
    workflows: Mutex<HashMap<BotId, Vec<WorkflowRule>>>,
    conversations: Mutex<Vec<Conversation>>,
    log: Mutex<Vec<MessageLogEntry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one bot definition.
    pub fn add_bot(&self, config: BotConfig) {
        lock(&self.bots).push(config);
    }

    /// Seed one workflow rule for a bot. Order of insertion is the order
    /// `list_active_workflows` returns.
    pub fn add_workflow(&self, bot_id: BotId, rule: WorkflowRule) {
        lock(&self.workflows).entry(bot_id).or_default().push(rule);
    }

    /// Snapshot of the audit log, for assertions.
    #[must_use]
    pub fn log_entries(&self) -> Vec<MessageLogEntry> {
        lock(&self.log).clone()
    }

    /// Snapshot of every conversation row, for assertions.
    #[must_use]
    pub fn conversations(&self) -> Vec<Conversation> {
        lock(&self.conversations).clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_active_bots(&self) -> Result<Vec<BotConfig>> {
        Ok(lock(&self.bots).iter().filter(|b| b.enabled).cloned().collect())
    }

    async fn list_active_workflows(&self, bot_id: BotId) -> Result<Vec<WorkflowRule>> {
        Ok(lock(&self.workflows).get(&bot_id).cloned().unwrap_or_default())
    }

    async fn get_conversation(
        &self,
        account_id: AccountId,
        chat_id: ChatId,
    ) -> Result<Option<Conversation>> {
        Ok(lock(&self.conversations)
            .iter()
            .find(|c| c.account_id == account_id && c.chat_id == chat_id)
            .cloned())
    }

    async fn create_conversation(
        &self,
        account_id: AccountId,
        user_id: UserId,
        chat_id: ChatId,
    ) -> Result<Conversation> {
        let mut conversations = lock(&self.conversations);
        if conversations.iter().any(|c| c.account_id == account_id && c.chat_id == chat_id) {
            return Err(Error::conflict(format!(
                "conversation for account {account_id} chat {chat_id}"
            )));
        }
        let now = unix_now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            account_id,
            user_id,
            chat_id,
            context: Map::new(),
            created_at: now,
            updated_at: now,
        };
        conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn update_conversation(
        &self,
        id: ConversationId,
        context: Map<String, Value>,
    ) -> Result<()> {
        let mut conversations = lock(&self.conversations);
        let Some(row) = conversations.iter_mut().find(|c| c.id == id) else {
            return Err(Error::not_found(format!("conversation {id}")));
        };
        row.context = context;
        row.updated_at = unix_now();
        Ok(())
    }

    async fn append_message_log(&self, entry: MessageLogEntry) -> Result<()> {
        lock(&self.log).push(entry);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

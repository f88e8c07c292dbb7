//! Serialized access to per-chat conversation context.
//!
//! Context writes are whole-map writes, so two unserialized read/modify/
//! write cycles on the same chat can silently drop each other's keys. This
//! accessor routes every cycle through a per-chat async mutex and re-reads
//! the row inside the critical section, which makes merges of disjoint
//! keys safe without store-side versioning.

use {
    apiary_common::{AccountId, ChatId, UserId},
    apiary_store::{Conversation, Store},
    dashmap::DashMap,
    serde_json::{Map, Value},
    std::sync::Arc,
    tokio::sync::Mutex,
};

use crate::error::Result;

/// Key of one durable conversation row.
type ChatKey = (AccountId, ChatId);

/// Read/modify/write front for conversation rows.
///
/// Two bots of the same account can address the same row, so one instance
/// is shared by every session in the process. The lock table only ever
/// grows; entries are a pointer each and chats are finite in practice.
pub struct Conversations {
    store: Arc<dyn Store>,
    locks: DashMap<ChatKey, Arc<Mutex<()>>>,
}

impl Conversations {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store, locks: DashMap::new() }
    }

    fn chat_lock(&self, key: ChatKey) -> Arc<Mutex<()>> {
        self.locks.entry(key).or_default().clone()
    }

    /// Fetch the row for this chat, creating it with empty context on first
    /// contact.
    pub async fn get_or_create(
        &self,
        account_id: AccountId,
        user_id: UserId,
        chat_id: ChatId,
    ) -> Result<Conversation> {
        let guard = self.chat_lock((account_id, chat_id));
        let _held = guard.lock().await;
        self.fetch_or_create(account_id, user_id, chat_id).await
    }

    /// Shallow-merge `updates` into the chat's stored context and write the
    /// whole map back.
    ///
    /// The row is re-read under the chat lock, so `state` only supplies the
    /// key; concurrent merges of disjoint keys all survive. Returns the
    /// conversation with the merged context (`updated_at` is the store's
    /// concern and may lag in the returned copy).
    pub async fn merge(
        &self,
        state: &Conversation,
        updates: Map<String, Value>,
    ) -> Result<Conversation> {
        let guard = self.chat_lock((state.account_id, state.chat_id));
        let _held = guard.lock().await;

        let mut current =
            self.fetch_or_create(state.account_id, state.user_id, state.chat_id).await?;
        for (key, value) in updates {
            current.context.insert(key, value);
        }
        self.store.update_conversation(current.id, current.context.clone()).await?;
        Ok(current)
    }

    async fn fetch_or_create(
        &self,
        account_id: AccountId,
        user_id: UserId,
        chat_id: ChatId,
    ) -> Result<Conversation> {
        if let Some(existing) = self.store.get_conversation(account_id, chat_id).await? {
            return Ok(existing);
        }
        Ok(self.store.create_conversation(account_id, user_id, chat_id).await?)
    }
}

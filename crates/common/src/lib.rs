//! Shared primitives used across every apiary crate.

pub mod types;

pub use types::{
    AccountId, BotId, ChatId, ConversationId, UserId, WorkflowId, unix_now,
};

//! Inbound events as the runtime sees them, already normalized away from any
//! provider-specific update shape.

use {
    apiary_common::{ChatId, UserId},
    serde::{Deserialize, Serialize},
};

/// Who sent an inbound event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderInfo {
    pub user_id: UserId,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

/// The payload of one inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventKind {
    /// A slash command. `name` is the bare match token (`/start`); `text`
    /// keeps the full message body.
    Command { name: String, text: String },
    /// Free-form text.
    Text { body: String },
    /// An inline-interaction callback carrying an opaque payload.
    Callback { interaction_id: String, payload: String },
}

/// One inbound event from the chat provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    pub sender: SenderInfo,
    pub kind: EventKind,
}

impl InboundEvent {
    /// Classify a raw message body as a command or free text.
    ///
    /// A body whose first token starts with `/` is a command. A trailing
    /// `@botname` suffix on the token (group-chat addressing) is stripped
    /// from the match token but kept in `text`.
    pub fn from_text(chat_id: ChatId, sender: SenderInfo, body: impl Into<String>) -> Self {
        let body = body.into();
        let kind = match command_token(&body) {
            Some(name) => EventKind::Command { name, text: body },
            None => EventKind::Text { body },
        };
        Self { chat_id, sender, kind }
    }

    /// Build a callback event.
    pub fn callback(
        chat_id: ChatId,
        sender: SenderInfo,
        interaction_id: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            chat_id,
            sender,
            kind: EventKind::Callback {
                interaction_id: interaction_id.into(),
                payload: payload.into(),
            },
        }
    }
}

/// Extract the leading `/command` token, if any.
fn command_token(body: &str) -> Option<String> {
    let first = body.split_whitespace().next()?;
    let token = first.split('@').next().unwrap_or(first);
    if token.len() > 1 && token.starts_with('/') {
        Some(token.to_owned())
    } else {
        None
    }
}

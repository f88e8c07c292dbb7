//! Per-event handling for one bot session.
//!
//! Stages, in order: audit the inbound event, dispatch on its kind
//! (built-in command, free text, callback), evaluate workflow triggers,
//! send replies. The pipeline holds no per-event state of its own; every
//! durable effect goes through the store.

use {
    apiary_queue::JobQueue,
    apiary_responder::Responder,
    apiary_store::{BotConfig, MessageLogEntry, Store},
    apiary_transport::{EventKind, InboundEvent, Sender},
    apiary_workflows::{TriggerEvent, fires},
    serde_json::{Map, Value, json},
    std::sync::Arc,
    tracing::{debug, info, warn},
};

use crate::{Capabilities, conversation::Conversations, error::Result};

/// Welcome reply when the bot config leaves `welcome_message` unset.
pub const DEFAULT_WELCOME: &str = "Hi! I'm your business assistant.";
/// Help reply when the bot config leaves `help_text` unset.
pub const DEFAULT_HELP: &str =
    "Available commands:\n/start - get started\n/help - show this help";
/// System prompt when the bot config leaves `system_prompt` unset.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful business assistant.";
/// Sent instead of a generated reply when the responder fails.
pub const APOLOGY: &str = "Sorry, something went wrong while handling your request.";
/// Acknowledgement text for inline interactions.
pub const CALLBACK_ACK: &str = "Got it";

/// Context key holding the payload of the most recent callback.
const CALLBACK_CONTEXT_KEY: &str = "last_callback";

/// Event handler for one bot. Cheap to clone; all fields are shared
/// handles except the config.
#[derive(Clone)]
pub struct Pipeline {
    pub config: BotConfig,
    pub sender: Arc<dyn Sender>,
    pub store: Arc<dyn Store>,
    pub conversations: Arc<Conversations>,
    /// Present only when the config enables AI replies, so a disabled bot
    /// structurally cannot reach the responder.
    pub responder: Option<Arc<dyn Responder>>,
    /// Deferred workflow execution. Carried for the execution engine;
    /// nothing in the current stages enqueues.
    pub queue: Arc<dyn JobQueue>,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        caps: &Capabilities,
        conversations: Arc<Conversations>,
        sender: Arc<dyn Sender>,
        config: BotConfig,
    ) -> Self {
        let responder = config.ai_enabled.then(|| Arc::clone(&caps.responder));
        Self {
            sender,
            store: Arc::clone(&caps.store),
            conversations,
            responder,
            queue: Arc::clone(&caps.queue),
            config,
        }
    }

    /// Handle one inbound event start to finish.
    ///
    /// Recoverable trouble (send failures, responder failures, audit
    /// failures) is logged and absorbed here; only conversation-state
    /// writes that the caller must know about propagate as errors.
    pub async fn handle_event(&self, event: InboundEvent) -> Result<()> {
        self.audit_inbound(&event).await;
        match &event.kind {
            EventKind::Command { name, text } => match name.as_str() {
                "/start" => {
                    let reply =
                        self.config.welcome_message.as_deref().unwrap_or(DEFAULT_WELCOME);
                    self.handle_command(&event, name, reply).await
                },
                "/help" => {
                    let reply = self.config.help_text.as_deref().unwrap_or(DEFAULT_HELP);
                    self.handle_command(&event, name, reply).await
                },
                // Anything else slash-shaped is treated as free text.
                _ => self.handle_text(&event, text).await,
            },
            EventKind::Text { body } => self.handle_text(&event, body).await,
            EventKind::Callback { interaction_id, payload } => {
                self.handle_callback(&event, interaction_id, payload).await
            },
        }
    }

    /// Built-in command: static reply, then command triggers.
    async fn handle_command(&self, event: &InboundEvent, command: &str, reply: &str) -> Result<()> {
        debug!(bot_id = %self.config.id, command, chat_id = event.chat_id, "inbound command");
        if let Err(e) = self.send_and_log(event, reply).await {
            warn!(bot_id = %self.config.id, command, error = %e, "command reply failed");
        }
        self.fire_triggers(event, TriggerEvent::Command(command)).await;
        Ok(())
    }

    /// Free text: detached message-trigger evaluation plus, when enabled,
    /// a generated reply with the conversation context updated after it.
    async fn handle_text(&self, event: &InboundEvent, body: &str) -> Result<()> {
        debug!(bot_id = %self.config.id, chat_id = event.chat_id, "inbound text");
        self.spawn_message_triggers(event, body);

        let Some(responder) = &self.responder else {
            return Ok(());
        };

        let conversation = match self
            .conversations
            .get_or_create(self.config.account_id, event.sender.user_id, event.chat_id)
            .await
        {
            Ok(conversation) => conversation,
            Err(e) => {
                warn!(bot_id = %self.config.id, chat_id = event.chat_id, error = %e,
                    "conversation lookup failed");
                self.send_apology(event).await;
                return Ok(());
            },
        };

        let system_prompt =
            self.config.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
        // Retrieval is not assembled yet; the responder contract already
        // takes the slot.
        let reply = match responder.generate(system_prompt, body, "").await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(bot_id = %self.config.id, chat_id = event.chat_id, error = %e,
                    "responder failed");
                self.send_apology(event).await;
                return Ok(());
            },
        };

        if let Err(e) = self.send_and_log(event, &reply).await {
            warn!(bot_id = %self.config.id, chat_id = event.chat_id, error = %e,
                "reply send failed");
        }

        let mut updates = Map::new();
        updates.insert("last_user_message".into(), Value::String(body.to_owned()));
        updates.insert("last_ai_response".into(), Value::String(reply));
        self.conversations.merge(&conversation, updates).await?;
        Ok(())
    }

    /// Callback: record the payload in the conversation context, then
    /// acknowledge the interaction. The ack goes out even when the context
    /// write fails.
    async fn handle_callback(
        &self,
        event: &InboundEvent,
        interaction_id: &str,
        payload: &str,
    ) -> Result<()> {
        debug!(bot_id = %self.config.id, chat_id = event.chat_id, "inbound callback");

        let merge_result = async {
            let conversation = self
                .conversations
                .get_or_create(self.config.account_id, event.sender.user_id, event.chat_id)
                .await?;
            let mut updates = Map::new();
            updates.insert(CALLBACK_CONTEXT_KEY.into(), Value::String(payload.to_owned()));
            self.conversations.merge(&conversation, updates).await?;
            Ok(())
        }
        .await;

        if let Err(e) = self.sender.ack_interaction(interaction_id, CALLBACK_ACK).await {
            warn!(bot_id = %self.config.id, error = %e, "interaction ack failed");
        }
        merge_result
    }

    /// Evaluate triggers of the given shape against every active rule and
    /// announce each match. Failures here never disturb the main reply
    /// path.
    async fn fire_triggers(&self, event: &InboundEvent, trigger_event: TriggerEvent<'_>) {
        let rules = match self.store.list_active_workflows(self.config.id).await {
            Ok(rules) => rules,
            Err(e) => {
                warn!(bot_id = %self.config.id, error = %e, "workflow rules unavailable");
                return;
            },
        };
        for rule in &rules {
            if fires(&rule.trigger, trigger_event) {
                info!(bot_id = %self.config.id, workflow = %rule.name, chat_id = event.chat_id,
                    "workflow fired");
                if let Err(e) = self.send_and_log(event, &rule.describe()).await {
                    warn!(bot_id = %self.config.id, workflow = %rule.name, error = %e,
                        "workflow announcement failed");
                }
            }
        }
    }

    /// Message triggers run detached so trigger latency never delays the
    /// reply path.
    fn spawn_message_triggers(&self, event: &InboundEvent, body: &str) {
        let pipeline = self.clone();
        let event = event.clone();
        let body = body.to_owned();
        tokio::spawn(async move {
            pipeline.fire_triggers(&event, TriggerEvent::Message(&body)).await;
        });
    }

    async fn send_apology(&self, event: &InboundEvent) {
        if let Err(e) = self.send_and_log(event, APOLOGY).await {
            warn!(bot_id = %self.config.id, error = %e, "apology send failed");
        }
    }

    /// One outbound send plus its audit record. Every sent non-empty text
    /// gets exactly one log entry; the entry itself is best-effort.
    async fn send_and_log(&self, event: &InboundEvent, text: &str) -> Result<()> {
        self.sender.send_text(event.chat_id, text).await?;
        if !text.is_empty() {
            let entry = MessageLogEntry::outbound(
                self.config.account_id,
                event.sender.user_id,
                event.chat_id,
                text,
            );
            if let Err(e) = self.store.append_message_log(entry).await {
                warn!(bot_id = %self.config.id, error = %e, "outbound audit write failed");
            }
        }
        Ok(())
    }

    /// Append the inbound audit record. Best-effort: a failed write is
    /// logged and handling continues.
    async fn audit_inbound(&self, event: &InboundEvent) {
        let text = match &event.kind {
            EventKind::Command { text, .. } => text.as_str(),
            EventKind::Text { body } => body.as_str(),
            EventKind::Callback { payload, .. } => payload.as_str(),
        };
        let metadata = json!({
            "username": event.sender.username,
            "display_name": event.sender.display_name,
        });
        let entry = MessageLogEntry::inbound(
            self.config.account_id,
            event.sender.user_id,
            event.chat_id,
            text,
            metadata,
        );
        if let Err(e) = self.store.append_message_log(entry).await {
            warn!(bot_id = %self.config.id, error = %e, "inbound audit write failed");
        }
    }
}

//! In-memory transport for tests.
//!
//! Subscriptions are keyed by the exposed credential so a test can inject
//! inbound events per bot with [`MemoryTransport::push`] and inspect
//! everything the bots sent back.

use {
    apiary_common::ChatId,
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    std::{
        collections::HashMap,
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, Ordering},
        },
    },
    tokio::sync::mpsc,
};

use crate::{
    error::{Error, Result},
    event::InboundEvent,
    traits::{EVENT_BUFFER, Sender, Subscription, Transport},
};

/// One recorded outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Credential of the subscription that sent it.
    pub credential: String,
    pub chat_id: ChatId,
    pub text: String,
}

#[derive(Default)]
struct Shared {
    // A credential can briefly hold two feeds when a duplicate start races;
    // push() prunes the closed ones.
    feeds: Mutex<HashMap<String, Vec<mpsc::Sender<InboundEvent>>>>,
    sent: Mutex<Vec<SentMessage>>,
    acks: Mutex<Vec<(String, String)>>,
    fail_sends: AtomicBool,
}

/// Test transport backed by channels and vectors.
#[derive(Default)]
pub struct MemoryTransport {
    shared: Arc<Shared>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject one inbound event for the bot holding `credential`. Returns
    /// `false` when no live subscription exists for it.
    pub async fn push(&self, credential: &str, event: InboundEvent) -> bool {
        let targets: Vec<mpsc::Sender<InboundEvent>> = {
            let mut feeds = lock(&self.shared.feeds);
            let Some(senders) = feeds.get_mut(credential) else {
                return false;
            };
            senders.retain(|tx| !tx.is_closed());
            senders.clone()
        };
        for tx in targets {
            if tx.send(event.clone()).await.is_ok() {
                return true;
            }
        }
        false
    }

    /// Whether `credential` currently has a live subscription.
    #[must_use]
    pub fn is_subscribed(&self, credential: &str) -> bool {
        lock(&self.shared.feeds)
            .get(credential)
            .is_some_and(|senders| senders.iter().any(|tx| !tx.is_closed()))
    }

    /// Snapshot of every message sent so far, in send order.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.shared.sent).clone()
    }

    /// Texts sent to one chat, in send order.
    #[must_use]
    pub fn sent_texts(&self, chat_id: ChatId) -> Vec<String> {
        lock(&self.shared.sent)
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .map(|m| m.text.clone())
            .collect()
    }

    /// Recorded interaction acknowledgements as `(interaction_id, text)`.
    #[must_use]
    pub fn acks(&self) -> Vec<(String, String)> {
        lock(&self.shared.acks).clone()
    }

    /// Make every subsequent send and ack fail until turned off again.
    pub fn set_send_failures(&self, fail: bool) {
        self.shared.fail_sends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn subscribe(&self, credential: &Secret<String>) -> Result<Subscription> {
        let credential = credential.expose_secret().clone();
        if credential.is_empty() {
            return Err(Error::subscribe_rejected("empty credential"));
        }
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        lock(&self.shared.feeds).entry(credential.clone()).or_default().push(tx);
        let sender = Arc::new(MemorySender { credential, shared: Arc::clone(&self.shared) });
        Ok(Subscription { events: rx, sender })
    }
}

struct MemorySender {
    credential: String,
    shared: Arc<Shared>,
}

#[async_trait]
impl Sender for MemorySender {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        if self.shared.fail_sends.load(Ordering::SeqCst) {
            return Err(Error::UnknownChat { chat_id });
        }
        lock(&self.shared.sent).push(SentMessage {
            credential: self.credential.clone(),
            chat_id,
            text: text.to_owned(),
        });
        Ok(())
    }

    async fn ack_interaction(&self, interaction_id: &str, text: &str) -> Result<()> {
        if self.shared.fail_sends.load(Ordering::SeqCst) {
            return Err(Error::Closed);
        }
        lock(&self.shared.acks).push((interaction_id.to_owned(), text.to_owned()));
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::event::SenderInfo};

    fn token(s: &str) -> Secret<String> {
        Secret::new(s.to_owned())
    }

    #[tokio::test]
    async fn push_reaches_the_subscriber() {
        let transport = MemoryTransport::new();
        let mut sub = transport.subscribe(&token("t1")).await.unwrap();

        let event = InboundEvent::from_text(5, SenderInfo::default(), "hi");
        assert!(transport.push("t1", event.clone()).await);
        assert_eq!(sub.events.recv().await, Some(event));
    }

    #[tokio::test]
    async fn push_without_subscription_reports_failure() {
        let transport = MemoryTransport::new();
        let event = InboundEvent::from_text(5, SenderInfo::default(), "hi");
        assert!(!transport.push("nobody", event).await);
    }

    #[tokio::test]
    async fn dropping_the_receiver_closes_the_subscription() {
        let transport = MemoryTransport::new();
        let sub = transport.subscribe(&token("t1")).await.unwrap();
        assert!(transport.is_subscribed("t1"));

        drop(sub);
        assert!(!transport.is_subscribed("t1"));
        let event = InboundEvent::from_text(5, SenderInfo::default(), "hi");
        assert!(!transport.push("t1", event).await);
    }

    #[tokio::test]
    async fn sends_and_acks_are_recorded() {
        let transport = MemoryTransport::new();
        let sub = transport.subscribe(&token("t1")).await.unwrap();

        sub.sender.send_text(9, "hello").await.unwrap();
        sub.sender.ack_interaction("cb-1", "ok").await.unwrap();

        assert_eq!(transport.sent_texts(9), vec!["hello".to_owned()]);
        assert_eq!(transport.acks(), vec![("cb-1".to_owned(), "ok".to_owned())]);
    }

    #[tokio::test]
    async fn empty_credential_is_rejected() {
        let transport = MemoryTransport::new();
        let err = transport.subscribe(&token("")).await.err().unwrap();
        assert!(matches!(err, Error::SubscribeRejected { .. }));
    }

    #[tokio::test]
    async fn injected_failures_surface_on_send() {
        let transport = MemoryTransport::new();
        let sub = transport.subscribe(&token("t1")).await.unwrap();

        transport.set_send_failures(true);
        assert!(sub.sender.send_text(9, "hello").await.is_err());
        transport.set_send_failures(false);
        assert!(sub.sender.send_text(9, "hello").await.is_ok());
    }
}
